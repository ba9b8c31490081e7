// Runs the `generate` binary and checks what it writes to stdout.

use std::process::Command;

fn generate(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_generate"))
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn json_mode_stdout_is_one_json_document() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().to_str().unwrap();
    let output = generate(&["--json", "--seed", "11", "--output-dir", out_dir]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let piece: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(piece["progression"].as_array().map(Vec::len), Some(8));

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("[3/3] Writing MIDI"));
    assert!(dir.path().join("generated_music.mid").exists());
}

#[test]
fn text_mode_prints_progress_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().to_str().unwrap();
    let output = generate(&["--seed", "11", "--output-dir", out_dir]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Generated Chord Progression:"));
    assert!(stdout.contains("MIDI file saved to"));
}

#[test]
fn missing_output_dir_exits_with_failure() {
    let output = generate(&["--seed", "1", "--output-dir", "/nonexistent/sonatina"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("export failed"));
}
