// Rhythmic phrasing.
//
// Each section gets one rhythm pattern, drawn uniformly from the configured
// set, and every note in the section takes its duration from the pattern at
// its event index (cycling). Figures are expanded to notes first; markers
// keep their duration of zero and still count toward the index.

use crate::config::{PhrasingParams, check_patterns};
use crate::error::{ComposeError, Result};
use crate::event::{Event, Melody};
use sonatina_prng::RandomSource;

#[derive(Debug, Clone)]
pub struct PhrasingAnnotator {
    params: PhrasingParams,
}

impl PhrasingAnnotator {
    pub fn new(params: PhrasingParams) -> Self {
        Self { params }
    }

    pub fn apply(&self, mut melody: Melody, rng: &mut impl RandomSource) -> Result<Melody> {
        check_patterns(&self.params.patterns)?;
        melody.normalize_figures();

        for (si, section) in melody.sections.iter_mut().enumerate() {
            let pattern = rng
                .pick(&self.params.patterns)
                .ok_or_else(|| ComposeError::UnsupportedTable("no rhythm patterns".into()))?;
            log::debug!("phrasing: section {si} uses '{}'", pattern.name);
            let durations = &pattern.durations;
            for (i, event) in section.events.iter_mut().enumerate() {
                if let Event::Note(note) = event {
                    note.duration = Some(durations[i % durations.len()]);
                }
            }
        }
        Ok(melody)
    }
}
