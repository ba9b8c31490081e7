// Sonatina Music Generator
//
// A procedural piano composer. A random chord progression seeds a melody
// built from ornament figures; the melody is annotated with dynamics,
// articulation, and rhythm, turned into a counterpoint voice, expanded by a
// macro-form, sprinkled with tempo and meter changes, and written to a
// Standard MIDI File.
//
// Architecture:
// - chord.rs: Chord symbols (root + quality + extension) and their tables
// - event.rs: Notes, markers, ornament figures, sections, compositions
// - config.rs: Tunable stage parameters, loaded from JSON
// - progression.rs: Random chord progressions with modal borrowing
// - melody.rs: One ornament figure per chord, pitched from the chord's range
// - dynamics.rs: Dynamic and articulation per note
// - phrasing.rs: Rhythm patterns cycled over each section
// - cadence.rs: Authentic, plagal, and deceptive chord substitution
// - counterpoint.rs: Interval-shifted second voice, clamped to range
// - form.rs: AABA / rondo / theme-and-variations section repeats
// - tempo.rs: Tempo and time-signature markers
// - composer.rs: Runs the stages in order
// - midi.rs: Timeline layout and SMF output
// - error.rs: The crate's error type
//
// Every stage draws from an injected `RandomSource`, so a seeded run is
// reproducible end to end.

pub mod cadence;
pub mod chord;
pub mod composer;
pub mod config;
pub mod counterpoint;
pub mod dynamics;
pub mod error;
pub mod event;
pub mod form;
pub mod melody;
pub mod midi;
pub mod phrasing;
pub mod progression;
pub mod tempo;

pub use composer::{Composer, GeneratedPiece};
pub use config::GeneratorConfig;
pub use error::{ComposeError, Result};
pub use midi::MidiExporter;
