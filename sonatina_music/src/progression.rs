// Chord progression generation.
//
// Builds a fixed-length progression from the quality/extension table and
// the borrowed-chord table in chord.rs. Each slot draws, in order: a quality
// entry, one of its extensions, a borrowed-chord coin, and (only if the coin
// lands) a borrowed entry that replaces the first two draws.

use crate::chord::{BORROWED_TABLE, ChordProgression, ChordSymbol, QUALITY_TABLE};
use crate::config::ProgressionParams;
use crate::error::{ComposeError, Result};
use sonatina_prng::RandomSource;

#[derive(Debug, Clone)]
pub struct ChordProgressionGenerator {
    params: ProgressionParams,
}

impl ChordProgressionGenerator {
    pub fn new(params: ProgressionParams) -> Self {
        Self { params }
    }

    pub fn generate(&self, rng: &mut impl RandomSource) -> Result<ChordProgression> {
        let mut chords = Vec::with_capacity(self.params.length);

        for _ in 0..self.params.length {
            let entry = rng
                .pick(&QUALITY_TABLE)
                .ok_or_else(|| ComposeError::UnsupportedTable("quality table is empty".into()))?;
            let extension = rng.pick(entry.extensions).ok_or_else(|| {
                ComposeError::UnsupportedTable(format!(
                    "no extensions for {:?}",
                    entry.quality
                ))
            })?;

            let chord = if rng.random_bool(self.params.borrowed_probability) {
                let (root, quality) = rng.pick(&BORROWED_TABLE).ok_or_else(|| {
                    ComposeError::UnsupportedTable("borrowed table is empty".into())
                })?;
                ChordSymbol::new(Some(*root), *quality, "")
            } else {
                ChordSymbol::new(entry.root, entry.quality, extension)
            };
            chords.push(chord);
        }

        let progression = ChordProgression::new(chords);
        log::debug!("progression: {progression}");
        Ok(progression)
    }
}
