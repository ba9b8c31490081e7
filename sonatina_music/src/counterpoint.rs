// Counterpoint: a second voice derived from the phrased melody.
//
// Every note is transposed by a signed interval drawn from the configured
// table and clamped to the playable range (24..=88 by default). The derived
// note keeps the source note's duration, dynamic, and articulation.
//
// Precondition: the input has been through the dynamics and phrasing stages.
// A raw figure, or a note missing any of duration/dynamic/articulation, is
// rejected with `InvalidInput` rather than filled in here.

use crate::config::CounterpointParams;
use crate::error::{ComposeError, Result};
use crate::event::{Composition, Event, Melody, NoteEvent, Section};
use sonatina_prng::RandomSource;

#[derive(Debug, Clone)]
pub struct CounterpointGenerator {
    params: CounterpointParams,
}

impl CounterpointGenerator {
    pub fn new(params: CounterpointParams) -> Self {
        Self { params }
    }

    pub fn generate(&self, melody: &Melody, rng: &mut impl RandomSource) -> Result<Melody> {
        let (low, high) = (self.params.lowest_pitch, self.params.highest_pitch);
        if low > high {
            return Err(ComposeError::UnsupportedTable(format!(
                "counterpoint range {low}..={high} is empty"
            )));
        }

        let mut sections = Vec::with_capacity(melody.len());
        for (si, section) in melody.sections.iter().enumerate() {
            let mut events = Vec::with_capacity(section.len());
            for (ei, event) in section.events.iter().enumerate() {
                let derived = match event {
                    Event::Note(note) => Event::Note(self.derive(note, si, ei, rng)?),
                    Event::Marker(marker) => Event::Marker(marker.clone()),
                    Event::Figure(_) => {
                        return Err(ComposeError::InvalidInput(format!(
                            "section {si} event {ei}: ornament figure reached counterpoint \
                             without being expanded into notes"
                        )));
                    }
                };
                events.push(derived);
            }
            sections.push(Section::new(events));
        }

        log::debug!("counterpoint: derived {} sections", sections.len());
        Ok(Composition::new(sections))
    }

    fn derive(
        &self,
        note: &NoteEvent,
        si: usize,
        ei: usize,
        rng: &mut impl RandomSource,
    ) -> Result<NoteEvent> {
        let missing = |field: &str| {
            ComposeError::InvalidInput(format!("section {si} event {ei}: note has no {field}"))
        };
        let duration = note.duration.ok_or_else(|| missing("duration"))?;
        let dynamic = note.dynamic.ok_or_else(|| missing("dynamic"))?;
        let articulation = note.articulation.ok_or_else(|| missing("articulation"))?;

        let interval = *rng
            .pick(&self.params.intervals)
            .ok_or_else(|| ComposeError::UnsupportedTable("no counterpoint intervals".into()))?;
        let pitch = (note.note as i16 + interval as i16).clamp(
            self.params.lowest_pitch as i16,
            self.params.highest_pitch as i16,
        ) as u8;

        Ok(NoteEvent::new(pitch)
            .with_duration(duration)
            .with_dynamic(dynamic)
            .with_articulation(articulation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Articulation, Dynamic, Marker, OrnamentFigure, OrnamentKind};
    use sonatina_prng::SonatinaRng;
    use sonatina_prng::scripted::ScriptedSource;

    fn full_note(pitch: u8) -> Event {
        NoteEvent::new(pitch)
            .with_duration(0.5)
            .with_dynamic(Dynamic::Mf)
            .with_articulation(Articulation::Legato)
            .into()
    }

    #[test]
    fn upward_interval_clamps_to_88() {
        let melody = Composition::new(vec![Section::new(vec![full_note(85)])]);
        // Index 9 is +9.
        let mut rng = ScriptedSource::constant(9, 0.5);
        let out = CounterpointGenerator::new(CounterpointParams::default())
            .generate(&melody, &mut rng)
            .unwrap();
        let note = out.sections[0].notes().next().unwrap();
        assert_eq!(note.note, 88);
        assert_eq!(note.duration, Some(0.5));
        assert_eq!(note.dynamic, Some(Dynamic::Mf));
        assert_eq!(note.articulation, Some(Articulation::Legato));
    }

    #[test]
    fn downward_interval_clamps_to_24() {
        let melody = Composition::new(vec![Section::new(vec![full_note(26)])]);
        let mut rng = ScriptedSource::constant(0, 0.5);
        let out = CounterpointGenerator::new(CounterpointParams::default())
            .generate(&melody, &mut rng)
            .unwrap();
        assert_eq!(out.sections[0].notes().next().unwrap().note, 24);
    }

    #[test]
    fn all_pitches_within_range_and_shape_preserved() {
        let melody = Composition::new(vec![
            Section::new((0..=127).step_by(7).map(full_note).collect()),
            Section::new(vec![full_note(0), full_note(127)]),
        ]);
        let generator = CounterpointGenerator::new(CounterpointParams::default());
        let mut rng = SonatinaRng::new(17);
        for _ in 0..20 {
            let out = generator.generate(&melody, &mut rng).unwrap();
            assert_eq!(out.len(), melody.len());
            for (a, b) in out.sections.iter().zip(&melody.sections) {
                assert_eq!(a.len(), b.len());
                for note in a.notes() {
                    assert!((24..=88).contains(&note.note), "pitch {} escaped", note.note);
                }
            }
        }
    }

    #[test]
    fn missing_articulation_is_invalid_input() {
        let note = NoteEvent::new(60).with_duration(0.5).with_dynamic(Dynamic::P);
        let melody = Composition::new(vec![Section::new(vec![note.into()])]);
        let mut rng = SonatinaRng::new(1);
        let err = CounterpointGenerator::new(CounterpointParams::default())
            .generate(&melody, &mut rng)
            .unwrap_err();
        match err {
            ComposeError::InvalidInput(msg) => assert!(msg.contains("articulation")),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn raw_figure_is_invalid_input() {
        let melody = Composition::new(vec![Section::new(vec![Event::Figure(OrnamentFigure {
            kind: OrnamentKind::Neighbor,
            pitches: [60, 62, 60],
        })])]);
        let mut rng = SonatinaRng::new(1);
        let result = CounterpointGenerator::new(CounterpointParams::default())
            .generate(&melody, &mut rng);
        assert!(matches!(result, Err(ComposeError::InvalidInput(_))));
    }

    #[test]
    fn markers_pass_through() {
        let marker = Event::Marker(Marker::Tempo { bpm: 80 });
        let melody = Composition::new(vec![Section::new(vec![full_note(60), marker.clone()])]);
        let mut rng = SonatinaRng::new(1);
        let out = CounterpointGenerator::new(CounterpointParams::default())
            .generate(&melody, &mut rng)
            .unwrap();
        assert_eq!(out.sections[0].events[1], marker);
    }
}
