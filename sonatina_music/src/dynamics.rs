// Dynamics and articulation annotation.
//
// Expands ornament figures into notes, then gives every note a dynamic
// marking and an articulation, each drawn uniformly. Markers pass through
// untouched.

use crate::event::{Articulation, Dynamic, Event, Melody};
use sonatina_prng::RandomSource;

#[derive(Debug, Clone, Default)]
pub struct DynamicsAnnotator;

impl DynamicsAnnotator {
    pub fn new() -> Self {
        DynamicsAnnotator
    }

    pub fn annotate(&self, mut melody: Melody, rng: &mut impl RandomSource) -> Melody {
        melody.normalize_figures();

        let mut annotated = 0usize;
        for section in &mut melody.sections {
            for event in &mut section.events {
                if let Event::Note(note) = event {
                    note.dynamic = rng.pick(&Dynamic::ALL).copied();
                    note.articulation = rng.pick(&Articulation::ALL).copied();
                    annotated += 1;
                }
            }
        }

        log::debug!("dynamics: annotated {annotated} notes");
        melody
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Composition, Marker, NoteEvent, OrnamentFigure, OrnamentKind, Section};
    use sonatina_prng::SonatinaRng;
    use sonatina_prng::scripted::ScriptedSource;

    #[test]
    fn every_note_gets_dynamic_and_articulation() {
        let melody = Composition::new(vec![
            Section::new(vec![NoteEvent::new(60).into(), NoteEvent::new(62).into()]),
            Section::new(vec![Event::Figure(OrnamentFigure {
                kind: OrnamentKind::Passing,
                pitches: [63, 65, 63],
            })]),
        ]);
        let mut rng = SonatinaRng::new(5);
        let annotated = DynamicsAnnotator::new().annotate(melody, &mut rng);

        assert_eq!(annotated.sections[1].len(), 3);
        for section in &annotated.sections {
            for note in section.notes() {
                assert!(note.dynamic.is_some());
                assert!(note.articulation.is_some());
            }
        }
    }

    #[test]
    fn markers_are_left_unchanged() {
        let marker = Event::Marker(Marker::TimeSignature {
            label: "3/4".into(),
            beats: 3,
        });
        let melody = Composition::new(vec![Section::new(vec![
            marker.clone(),
            NoteEvent::new(60).with_duration(0.5).into(),
        ])]);
        let mut rng = SonatinaRng::new(5);
        let annotated = DynamicsAnnotator::new().annotate(melody, &mut rng);
        assert_eq!(annotated.sections[0].events[0], marker);
        assert_eq!(annotated.sections[0].notes().next().unwrap().duration, Some(0.5));
    }

    #[test]
    fn forced_draws_pick_the_softest_marking() {
        let melody = Composition::new(vec![Section::new(vec![NoteEvent::new(60).into()])]);
        let mut rng = ScriptedSource::constant(0, 0.0);
        let annotated = DynamicsAnnotator::new().annotate(melody, &mut rng);
        let note = annotated.sections[0].notes().next().unwrap();
        assert_eq!(note.dynamic, Some(Dynamic::Pp));
        assert_eq!(note.articulation, Some(Articulation::Legato));
    }
}
