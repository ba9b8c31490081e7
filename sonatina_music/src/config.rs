// Data-driven generator configuration.
//
// Every tunable probability and table used by the pipeline lives in
// `GeneratorConfig`, grouped per stage. Defaults reproduce the reference
// policy (8 chords, 0.5 borrowed-chord chance, 0.4 authentic cadence, 0.3
// tempo / 0.2 time-signature changes, counterpoint clamped to 24..=88).
// A JSON file may override any subset of fields: every group is
// `#[serde(default)]`.
//
// `validate()` rejects tables that cannot drive their stage; stages also
// re-check the parts they consume, so a hand-built config cannot bypass it.
//
// Chord quality, extension, and pitch-range tables are musical vocabulary
// rather than tuning, and live in chord.rs and melody.rs.

use crate::error::{ComposeError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Slowest tempo whose quarter-note period (60,000,000 / bpm microseconds)
/// fits the 24-bit MIDI tempo field.
pub const MIN_TEMPO_BPM: u16 = 4;

/// Where the cadence stage's output goes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CadenceRouting {
    /// Computed from the generated progression and returned next to the
    /// composition; the melody is built from the generated progression.
    #[default]
    Report,
    /// The cadenced progression replaces the generated one before melody generation.
    Reharmonize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionParams {
    /// Number of chords per progression.
    pub length: usize,
    /// Chance that a slot uses a borrowed chord instead of the quality table.
    pub borrowed_probability: f64,
}

impl Default for ProgressionParams {
    fn default() -> Self {
        Self {
            length: 8,
            borrowed_probability: 0.5,
        }
    }
}

/// Per-chord cadence probabilities. They partition a single unit draw, so
/// their sum must not exceed 1. Plagal and deceptive substitution are off
/// unless configured.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CadenceParams {
    /// Root replaced by a random natural letter (a key change).
    pub authentic: f64,
    /// Root replaced by degree IV.
    pub plagal: f64,
    /// Root replaced by degree VI.
    pub deceptive: f64,
}

impl Default for CadenceParams {
    fn default() -> Self {
        Self {
            authentic: 0.4,
            plagal: 0.0,
            deceptive: 0.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RhythmPattern {
    pub name: String,
    /// Note lengths in seconds, cycled across a section's events.
    pub durations: Vec<f64>,
}

impl RhythmPattern {
    pub fn new(name: &str, durations: &[f64]) -> Self {
        Self {
            name: name.to_string(),
            durations: durations.to_vec(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PhrasingParams {
    pub patterns: Vec<RhythmPattern>,
}

impl Default for PhrasingParams {
    fn default() -> Self {
        Self {
            patterns: vec![
                RhythmPattern::new("regular", &[0.5, 0.5]),
                RhythmPattern::new("syncopated", &[0.25, 0.75]),
                RhythmPattern::new("dotted", &[0.75, 0.25]),
                RhythmPattern::new("swing", &[0.375, 0.125, 0.375, 0.125]),
            ],
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterpointParams {
    /// Signed semitone offsets; one is drawn per note.
    pub intervals: Vec<i8>,
    pub lowest_pitch: u8,
    pub highest_pitch: u8,
}

impl Default for CounterpointParams {
    fn default() -> Self {
        Self {
            intervals: vec![-9, -7, -5, -4, -2, 2, 4, 5, 7, 9],
            lowest_pitch: 24,
            highest_pitch: 88,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignatureChoice {
    pub label: String,
    pub beats: u8,
}

impl TimeSignatureChoice {
    pub fn new(label: &str, beats: u8) -> Self {
        Self {
            label: label.to_string(),
            beats,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TempoParams {
    pub tempo_probability: f64,
    pub time_signature_probability: f64,
    pub tempos_bpm: Vec<u16>,
    pub time_signatures: Vec<TimeSignatureChoice>,
}

impl Default for TempoParams {
    fn default() -> Self {
        Self {
            tempo_probability: 0.3,
            time_signature_probability: 0.2,
            tempos_bpm: vec![80, 100, 120],
            time_signatures: vec![
                TimeSignatureChoice::new("4/4", 4),
                TimeSignatureChoice::new("3/4", 3),
                TimeSignatureChoice::new("6/8", 6),
            ],
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportParams {
    pub file_name: String,
    pub velocity: u8,
    /// General MIDI program for the piano track (0 = Acoustic Grand Piano).
    pub program: u8,
    pub ticks_per_quarter: u16,
    /// Tempo in effect before the first tempo marker.
    pub initial_tempo_bpm: u16,
}

impl Default for ExportParams {
    fn default() -> Self {
        Self {
            file_name: "generated_music.mid".to_string(),
            velocity: 64,
            program: 0,
            ticks_per_quarter: 480,
            initial_tempo_bpm: 120,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub progression: ProgressionParams,
    pub cadence: CadenceParams,
    pub cadence_routing: CadenceRouting,
    pub phrasing: PhrasingParams,
    pub counterpoint: CounterpointParams,
    pub tempo: TempoParams,
    pub export: ExportParams,
}

impl GeneratorConfig {
    /// Load from a JSON file and validate.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ComposeError::Config(format!("reading {}: {e}", path.display())))?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: GeneratorConfig =
            serde_json::from_str(json).map_err(|e| ComposeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        check_probability("progression.borrowed_probability", self.progression.borrowed_probability)?;

        let c = &self.cadence;
        check_probability("cadence.authentic", c.authentic)?;
        check_probability("cadence.plagal", c.plagal)?;
        check_probability("cadence.deceptive", c.deceptive)?;
        if c.authentic + c.plagal + c.deceptive > 1.0 {
            return Err(ComposeError::UnsupportedTable(format!(
                "cadence probabilities sum to {} (> 1)",
                c.authentic + c.plagal + c.deceptive
            )));
        }

        check_patterns(&self.phrasing.patterns)?;

        let cp = &self.counterpoint;
        if cp.intervals.is_empty() {
            return Err(ComposeError::UnsupportedTable(
                "counterpoint.intervals is empty".into(),
            ));
        }
        if cp.lowest_pitch > cp.highest_pitch || cp.highest_pitch > 127 {
            return Err(ComposeError::UnsupportedTable(format!(
                "counterpoint range {}..={} is not a valid MIDI range",
                cp.lowest_pitch, cp.highest_pitch
            )));
        }

        let t = &self.tempo;
        check_probability("tempo.tempo_probability", t.tempo_probability)?;
        check_probability("tempo.time_signature_probability", t.time_signature_probability)?;
        if t.tempo_probability > 0.0 && t.tempos_bpm.is_empty() {
            return Err(ComposeError::UnsupportedTable("tempo.tempos_bpm is empty".into()));
        }
        if let Some(bpm) = t.tempos_bpm.iter().find(|&&bpm| bpm < MIN_TEMPO_BPM) {
            return Err(ComposeError::UnsupportedTable(format!(
                "tempo of {bpm} BPM is below {MIN_TEMPO_BPM}"
            )));
        }
        if t.time_signature_probability > 0.0 && t.time_signatures.is_empty() {
            return Err(ComposeError::UnsupportedTable(
                "tempo.time_signatures is empty".into(),
            ));
        }

        let e = &self.export;
        if e.velocity > 127 || e.program > 127 {
            return Err(ComposeError::UnsupportedTable(
                "export velocity and program must be 0..=127".into(),
            ));
        }
        if e.ticks_per_quarter == 0 || e.ticks_per_quarter > 0x7fff {
            return Err(ComposeError::UnsupportedTable(format!(
                "ticks_per_quarter {} out of range",
                e.ticks_per_quarter
            )));
        }
        if e.initial_tempo_bpm < MIN_TEMPO_BPM {
            return Err(ComposeError::UnsupportedTable(format!(
                "initial tempo of {} BPM is below {MIN_TEMPO_BPM}",
                e.initial_tempo_bpm
            )));
        }
        Ok(())
    }
}

fn check_probability(name: &str, p: f64) -> Result<()> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(ComposeError::UnsupportedTable(format!(
            "{name} = {p} is not a probability"
        )))
    }
}

/// Shared by config validation and the phrasing stage.
pub(crate) fn check_patterns(patterns: &[RhythmPattern]) -> Result<()> {
    if patterns.is_empty() {
        return Err(ComposeError::UnsupportedTable("no rhythm patterns".into()));
    }
    for pattern in patterns {
        if pattern.durations.is_empty() {
            return Err(ComposeError::UnsupportedTable(format!(
                "rhythm pattern '{}' has no durations",
                pattern.name
            )));
        }
        if pattern.durations.iter().any(|&d| !(d > 0.0 && d.is_finite())) {
            return Err(ComposeError::UnsupportedTable(format!(
                "rhythm pattern '{}' has a non-positive duration",
                pattern.name
            )));
        }
    }
    Ok(())
}
