// Melody generation: one ornamented figure per chord.
//
// For each chord a base pitch is drawn from the chord's pitch range and
// decorated with a passing tone, a neighbor tone, or a suspension. The
// result is a `Melody` whose sections each hold a single `Event::Figure`;
// downstream annotators expand figures into notes.
//
// Pitch ranges are keyed by the structured chord (root + quality), never by
// the extension, so `maj7`, `maj79`, and `maj713` share a range.

use crate::chord::{Accidental, ChordProgression, ChordSymbol, Quality, Root};
use crate::error::Result;
use crate::event::{Composition, Event, Melody, OrnamentFigure, OrnamentKind, Section};
use sonatina_prng::RandomSource;
use std::ops::Range;

/// Range used when no table entry matches the chord.
pub const DEFAULT_PITCH_RANGE: Range<u8> = 40..80;

/// Half-open MIDI pitch range for a chord.
///
/// Degree-rooted chords match their exact (degree, quality) entry. Unrooted
/// and letter-rooted chords match by quality alone.
pub fn pitch_range(chord: &ChordSymbol) -> Range<u8> {
    use Accidental::Flat;
    match (chord.root, chord.quality) {
        (Some(Root::Degree(3, Flat)), Quality::Min7) => 56..69,
        (Some(Root::Degree(2, Flat)), Quality::Dom7) => 58..71,
        (Some(Root::Degree(6, Flat)), Quality::Min7) => 53..66,
        (Some(Root::Degree(6, Flat)), Quality::Dom7) => 54..67,
        (Some(Root::Degree(..)), _) => DEFAULT_PITCH_RANGE,
        (None | Some(Root::Letter(..)), quality) => match quality {
            Quality::Maj7 => 60..73,
            Quality::Min7 => 58..71,
            Quality::Dom7 => 57..70,
            Quality::Min7b5 => 55..68,
            Quality::Min6 => 57..70,
            Quality::Min11 => 58..71,
            Quality::Dim7 => 51..64,
            Quality::Aug7 => 60..73,
            Quality::Major => DEFAULT_PITCH_RANGE,
        },
    }
}

#[derive(Debug, Clone, Default)]
pub struct MelodyGenerator;

impl MelodyGenerator {
    pub fn new() -> Self {
        MelodyGenerator
    }

    pub fn generate(
        &self,
        progression: &ChordProgression,
        rng: &mut impl RandomSource,
    ) -> Result<Melody> {
        let sections = progression
            .chords
            .iter()
            .map(|chord| Section::new(vec![Event::Figure(ornament(chord, rng))]))
            .collect();
        let melody = Composition::new(sections);
        log::debug!("melody: {} sections", melody.len());
        Ok(melody)
    }
}

fn ornament(chord: &ChordSymbol, rng: &mut impl RandomSource) -> OrnamentFigure {
    let range = pitch_range(chord);
    let base = rng
        .range_u8(range.start, range.end)
        .clamp(range.start, range.end - 1);

    let kind = rng
        .pick(&OrnamentKind::ALL)
        .copied()
        .unwrap_or(OrnamentKind::Passing);
    let ornament_pitch = match kind {
        OrnamentKind::Passing | OrnamentKind::Neighbor => rng.range_u8(range.start, range.end),
        OrnamentKind::Suspension => base.saturating_sub(1),
    };

    OrnamentFigure {
        kind,
        pitches: [base, ornament_pitch, base],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chord::Letter;
    use sonatina_prng::SonatinaRng;
    use sonatina_prng::scripted::ScriptedSource;

    #[test]
    fn one_section_per_chord() {
        let prog = ChordProgression::parse(&["maj7", "bIIdom79", "Cmin7", "dim7", "xyz"]).unwrap();
        let mut rng = SonatinaRng::new(3);
        let melody = MelodyGenerator::new().generate(&prog, &mut rng).unwrap();
        assert_eq!(melody.len(), prog.len());
        for section in &melody.sections {
            assert_eq!(section.len(), 1);
            assert!(matches!(section.events[0], Event::Figure(_)));
        }
    }

    #[test]
    fn range_ignores_extension() {
        let plain: ChordSymbol = "maj7".parse().unwrap();
        let extended: ChordSymbol = "maj713".parse().unwrap();
        assert_eq!(pitch_range(&plain), 60..73);
        assert_eq!(pitch_range(&extended), 60..73);
    }

    #[test]
    fn degree_rooted_entries_and_fallback() {
        assert_eq!(pitch_range(&"bIIImin7".parse().unwrap()), 56..69);
        assert_eq!(pitch_range(&"bVImin7".parse().unwrap()), 53..66);
        assert_eq!(pitch_range(&"bVIIdom7".parse().unwrap()), DEFAULT_PITCH_RANGE);
        assert_eq!(pitch_range(&"G7".parse().unwrap()), DEFAULT_PITCH_RANGE);
        let letter = ChordSymbol::new(Some(Root::letter(Letter::D)), Quality::Dim7, "");
        assert_eq!(pitch_range(&letter), 51..64);
    }

    #[test]
    fn pitches_stay_in_range() {
        let prog = ChordProgression::parse(&["maj7", "min7b5", "bVIdom711", "aug7"]).unwrap();
        let mut rng = SonatinaRng::new(99);
        for _ in 0..100 {
            let melody = MelodyGenerator::new().generate(&prog, &mut rng).unwrap();
            for (chord, section) in prog.chords.iter().zip(&melody.sections) {
                let range = pitch_range(chord);
                let Event::Figure(figure) = &section.events[0] else {
                    panic!("expected figure");
                };
                assert!(range.contains(&figure.pitches[0]));
                assert_eq!(figure.pitches[0], figure.pitches[2]);
                match figure.kind {
                    OrnamentKind::Suspension => {
                        assert_eq!(figure.pitches[1], figure.pitches[0] - 1)
                    }
                    _ => assert!(range.contains(&figure.pitches[1])),
                }
            }
        }
    }

    #[test]
    fn suspension_steps_down_a_semitone() {
        // Index 2 picks the suspension; base is range.start + 2.
        let prog = ChordProgression::parse(&["maj7"]).unwrap();
        let mut rng = ScriptedSource::constant(2, 0.5);
        let melody = MelodyGenerator::new().generate(&prog, &mut rng).unwrap();
        assert_eq!(
            melody.sections[0].events[0],
            Event::Figure(OrnamentFigure {
                kind: OrnamentKind::Suspension,
                pitches: [62, 61, 62],
            })
        );
    }
}
