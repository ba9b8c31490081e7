// Cadences and key changes.
//
// One unit draw per chord decides what happens to it. The configured
// probabilities split [0, 1) into bands, in order:
//
//   [0, authentic)                  root -> random natural letter (key change)
//   [.., authentic + plagal)        root -> degree IV
//   [.., .. + deceptive)            root -> degree VI
//   otherwise                       chord kept as is
//
// Quality and extension always survive a root change. The input progression
// is not modified; a new one of equal length is returned.

use crate::chord::{ChordProgression, ChordSymbol, Letter, Root};
use crate::config::CadenceParams;
use crate::error::{ComposeError, Result};
use sonatina_prng::RandomSource;

/// What happened to one chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CadenceKind {
    Authentic,
    Plagal,
    Deceptive,
}

#[derive(Debug, Clone)]
pub struct CadenceGenerator {
    params: CadenceParams,
}

impl CadenceGenerator {
    pub fn new(params: CadenceParams) -> Self {
        Self { params }
    }

    pub fn apply(
        &self,
        progression: &ChordProgression,
        rng: &mut impl RandomSource,
    ) -> Result<ChordProgression> {
        let p = &self.params;
        if p.authentic + p.plagal + p.deceptive > 1.0 {
            return Err(ComposeError::UnsupportedTable(
                "cadence probabilities sum to more than 1".into(),
            ));
        }

        let mut chords = Vec::with_capacity(progression.len());
        for (i, chord) in progression.chords.iter().enumerate() {
            let new_chord = match self.classify(rng.next_f64()) {
                Some(kind) => {
                    let moved = self.substitute(chord, kind, rng)?;
                    log::debug!("cadence: chord {i} {chord} -> {moved} ({kind:?})");
                    moved
                }
                None => chord.clone(),
            };
            chords.push(new_chord);
        }
        Ok(ChordProgression::new(chords))
    }

    fn classify(&self, r: f64) -> Option<CadenceKind> {
        let p = &self.params;
        if r < p.authentic {
            Some(CadenceKind::Authentic)
        } else if r < p.authentic + p.plagal {
            Some(CadenceKind::Plagal)
        } else if r < p.authentic + p.plagal + p.deceptive {
            Some(CadenceKind::Deceptive)
        } else {
            None
        }
    }

    fn substitute(
        &self,
        chord: &ChordSymbol,
        kind: CadenceKind,
        rng: &mut impl RandomSource,
    ) -> Result<ChordSymbol> {
        let root = match kind {
            CadenceKind::Authentic => {
                let letter = rng
                    .pick(&Letter::ALL)
                    .ok_or_else(|| ComposeError::UnsupportedTable("no key letters".into()))?;
                Root::letter(*letter)
            }
            CadenceKind::Plagal => Root::degree(4),
            CadenceKind::Deceptive => Root::degree(6),
        };
        Ok(chord.with_root(root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sonatina_prng::SonatinaRng;
    use sonatina_prng::scripted::ScriptedSource;

    fn sample() -> ChordProgression {
        ChordProgression::parse(&["Cmaj7", "Dmin7", "G7", "Cmaj7"]).unwrap()
    }

    #[test]
    fn untriggered_draws_leave_progression_unchanged() {
        let generator = CadenceGenerator::new(CadenceParams::default());
        let mut rng = ScriptedSource::constant(0, 0.99);
        let out = generator.apply(&sample(), &mut rng).unwrap();
        assert_eq!(out, sample());
        assert_eq!(out.to_string(), "[Cmaj7, Dmin7, G7, Cmaj7]");
    }

    #[test]
    fn authentic_band_swaps_root_letter() {
        let generator = CadenceGenerator::new(CadenceParams::default());
        // Unit 0.1 lands in the authentic band; index 4 picks G.
        let mut rng = ScriptedSource::constant(4, 0.1);
        let out = generator.apply(&sample(), &mut rng).unwrap();
        assert_eq!(out.to_string(), "[Gmaj7, Gmin7, G7, Gmaj7]");
    }

    #[test]
    fn plagal_and_deceptive_bands_use_degrees() {
        let generator = CadenceGenerator::new(CadenceParams {
            authentic: 0.4,
            plagal: 0.2,
            deceptive: 0.1,
        });
        let prog = ChordProgression::parse(&["Dmin7", "Dmin7"]).unwrap();
        let mut rng = ScriptedSource::new(vec![0], vec![0.5, 0.65]);
        let out = generator.apply(&prog, &mut rng).unwrap();
        assert_eq!(out.to_string(), "[IVmin7, VImin7]");
    }

    #[test]
    fn default_keeps_chords_outside_the_authentic_band() {
        let generator = CadenceGenerator::new(CadenceParams::default());
        let mut rng = ScriptedSource::constant(0, 0.5);
        assert_eq!(generator.apply(&sample(), &mut rng).unwrap(), sample());
    }

    #[test]
    fn length_preserved_and_input_untouched() {
        let generator = CadenceGenerator::new(CadenceParams::default());
        let input = sample();
        let snapshot = input.clone();
        let mut rng = SonatinaRng::new(8);
        for _ in 0..50 {
            let out = generator.apply(&input, &mut rng).unwrap();
            assert_eq!(out.len(), input.len());
            for (a, b) in out.chords.iter().zip(&input.chords) {
                assert_eq!(a.quality, b.quality);
                assert_eq!(a.extension, b.extension);
            }
        }
        assert_eq!(input, snapshot);
    }

    #[test]
    fn probabilities_over_one_rejected() {
        let generator = CadenceGenerator::new(CadenceParams {
            authentic: 0.9,
            plagal: 0.2,
            deceptive: 0.0,
        });
        let mut rng = SonatinaRng::new(1);
        assert!(matches!(
            generator.apply(&sample(), &mut rng),
            Err(ComposeError::UnsupportedTable(_))
        ));
    }
}
