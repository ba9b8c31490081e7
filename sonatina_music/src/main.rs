// Sonatina Music Generator: CLI entry point.
//
// Composes one piano piece and writes it to MIDI.
// The pipeline: configuration -> composer stages -> MIDI output.
//
// Usage:
//   cargo run -p sonatina_music --bin generate -- [--output-dir DIR] [--seed N]
//     [--config FILE] [--json]
//
// Set RUST_LOG=debug to see per-stage logging.

use clap::Parser;
use sonatina_music::{ComposeError, Composer, GeneratedPiece, GeneratorConfig, MidiExporter};
use sonatina_prng::SonatinaRng;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Parser, Debug)]
#[command(name = "generate", about = "Procedurally compose a piano piece and export it to MIDI")]
struct Cli {
    /// Directory the MIDI file is written into
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Seed for reproducible output (defaults to the system clock)
    #[arg(long)]
    seed: Option<u64>,

    /// JSON file overriding generator parameters
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the generated piece as JSON instead of text
    #[arg(long)]
    json: bool,
}

/// Progress lines go to stdout, or to stderr under `--json` so stdout holds
/// only the JSON document.
macro_rules! progress {
    ($cli:expr, $($arg:tt)*) => {
        if $cli.json {
            eprintln!($($arg)*);
        } else {
            println!($($arg)*);
        }
    };
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), ComposeError> {
    let seed = cli.seed.unwrap_or_else(clock_seed);

    progress!(cli, "=== Sonatina Music Generator ===");
    progress!(cli, "Seed: {seed}");

    progress!(cli, "[1/3] Loading configuration...");
    let config = match &cli.config {
        Some(path) => {
            progress!(cli, "  Reading {}", path.display());
            GeneratorConfig::load(path)?
        }
        None => {
            progress!(cli, "  Using defaults.");
            GeneratorConfig::default()
        }
    };

    progress!(cli, "[2/3] Composing...");
    let composer = Composer::new(&config)?;
    let mut rng = SonatinaRng::new(seed);
    let piece = composer.generate(&mut rng)?;

    if cli.json {
        let json = serde_json::to_string_pretty(&piece)
            .map_err(|e| ComposeError::ExportFailure(format!("serializing piece: {e}")))?;
        println!("{json}");
    } else {
        print_piece(&piece)?;
    }

    progress!(cli, "[3/3] Writing MIDI to {}...", cli.output_dir.display());
    let path = MidiExporter::new(config.export.clone()).export(&piece.composition, &cli.output_dir)?;
    progress!(
        cli,
        "  Done! {} sections, {:.1}s of music.",
        piece.composition.len(),
        piece.composition.total_duration()
    );
    progress!(cli, "MIDI file saved to {}", path.display());
    Ok(())
}

fn print_piece(piece: &GeneratedPiece) -> Result<(), ComposeError> {
    println!("Generated Chord Progression: {}", piece.progression);
    println!("Progression with Cadences: {}", piece.cadenced_progression);
    println!("Macro-form: {}", piece.form);
    println!("Final Composition:");
    for (i, section) in piece.composition.sections.iter().enumerate() {
        let events = serde_json::to_string(section)
            .map_err(|e| ComposeError::ExportFailure(format!("serializing section {i}: {e}")))?;
        println!("  Section {}: {events}", i + 1);
    }
    Ok(())
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
