// Tempo and time-signature changes.
//
// Each section independently may gain a tempo marker and then a
// time-signature marker, appended after its existing events. Both are
// zero-duration; the exporter applies them at the time cursor reached by
// the section's preceding notes.

use crate::config::TempoParams;
use crate::error::{ComposeError, Result};
use crate::event::{Composition, Event, Marker};
use sonatina_prng::RandomSource;

#[derive(Debug, Clone)]
pub struct TempoChangeGenerator {
    params: TempoParams,
}

impl TempoChangeGenerator {
    pub fn new(params: TempoParams) -> Self {
        Self { params }
    }

    pub fn apply(
        &self,
        mut composition: Composition,
        rng: &mut impl RandomSource,
    ) -> Result<Composition> {
        let p = &self.params;
        let mut added = 0usize;

        for section in &mut composition.sections {
            if rng.random_bool(p.tempo_probability) {
                let bpm = *rng
                    .pick(&p.tempos_bpm)
                    .ok_or_else(|| ComposeError::UnsupportedTable("no tempo choices".into()))?;
                section.events.push(Event::Marker(Marker::Tempo { bpm }));
                added += 1;
            }
            if rng.random_bool(p.time_signature_probability) {
                let choice = rng.pick(&p.time_signatures).ok_or_else(|| {
                    ComposeError::UnsupportedTable("no time signature choices".into())
                })?;
                section.events.push(Event::Marker(Marker::TimeSignature {
                    label: choice.label.clone(),
                    beats: choice.beats,
                }));
                added += 1;
            }
        }

        log::debug!("tempo: added {added} markers");
        Ok(composition)
    }
}
