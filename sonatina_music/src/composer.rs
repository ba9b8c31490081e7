// The composer: runs every stage in order on one random source.
//
//   progression -> melody -> dynamics -> phrasing -> counterpoint
//               -> form -> tempo
//
// The cadence stage always runs on the freshly generated progression. With
// `CadenceRouting::Report` its output is returned beside the composition;
// with `CadenceRouting::Reharmonize` it replaces the progression before the
// melody is built.
//
// A failing stage aborts the run and its error is returned as is; nothing
// partial comes back and nothing is retried. The composer holds only its
// stage instances, so repeated calls are independent.

use crate::cadence::CadenceGenerator;
use crate::chord::ChordProgression;
use crate::config::{CadenceRouting, GeneratorConfig};
use crate::counterpoint::CounterpointGenerator;
use crate::dynamics::DynamicsAnnotator;
use crate::error::Result;
use crate::event::Composition;
use crate::form::{FormStructureGenerator, MacroForm};
use crate::melody::MelodyGenerator;
use crate::phrasing::PhrasingAnnotator;
use crate::progression::ChordProgressionGenerator;
use crate::tempo::TempoChangeGenerator;
use serde::Serialize;
use sonatina_prng::RandomSource;

/// Everything one run produces.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedPiece {
    pub progression: ChordProgression,
    pub cadenced_progression: ChordProgression,
    pub form: MacroForm,
    pub composition: Composition,
}

#[derive(Debug, Clone)]
pub struct Composer {
    progression: ChordProgressionGenerator,
    melody: MelodyGenerator,
    dynamics: DynamicsAnnotator,
    phrasing: PhrasingAnnotator,
    cadence: CadenceGenerator,
    counterpoint: CounterpointGenerator,
    form: FormStructureGenerator,
    tempo: TempoChangeGenerator,
    routing: CadenceRouting,
}

impl Composer {
    /// Build every stage from `config` after validating it.
    pub fn new(config: &GeneratorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Composer {
            progression: ChordProgressionGenerator::new(config.progression.clone()),
            melody: MelodyGenerator::new(),
            dynamics: DynamicsAnnotator::new(),
            phrasing: PhrasingAnnotator::new(config.phrasing.clone()),
            cadence: CadenceGenerator::new(config.cadence.clone()),
            counterpoint: CounterpointGenerator::new(config.counterpoint.clone()),
            form: FormStructureGenerator::new(),
            tempo: TempoChangeGenerator::new(config.tempo.clone()),
            routing: config.cadence_routing,
        })
    }

    pub fn generate(&self, rng: &mut impl RandomSource) -> Result<GeneratedPiece> {
        let progression = self.progression.generate(rng)?;
        let cadenced_progression = self.cadence.apply(&progression, rng)?;

        let harmony = match self.routing {
            CadenceRouting::Report => &progression,
            CadenceRouting::Reharmonize => &cadenced_progression,
        };
        let melody = self.melody.generate(harmony, rng)?;
        let melody = self.dynamics.annotate(melody, rng);
        let melody = self.phrasing.apply(melody, rng)?;
        let counterpoint = self.counterpoint.generate(&melody, rng)?;
        let (formed, form) = self.form.apply(counterpoint, rng);
        let composition = self.tempo.apply(formed, rng)?;

        log::info!(
            "composed {} sections, {} notes, {:.2}s, form {form}, progression {progression}",
            composition.len(),
            composition.note_count(),
            composition.total_duration(),
        );

        Ok(GeneratedPiece {
            progression,
            cadenced_progression,
            form,
            composition,
        })
    }
}
