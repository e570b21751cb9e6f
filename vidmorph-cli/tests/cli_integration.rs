use assert_cmd::Command;
use predicates::str::contains;
use std::error::Error;
use tempfile::tempdir;

// Helper function to get the path to the compiled binary
fn vidmorph_cmd() -> Command {
    Command::cargo_bin("vidmorph").expect("Failed to find vidmorph binary")
}

#[test]
fn test_help_lists_subcommands() -> Result<(), Box<dyn Error>> {
    vidmorph_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("run"))
        .stdout(contains("probe"))
        .stdout(contains("apply"));
    Ok(())
}

#[test]
fn test_run_requires_input_and_output() -> Result<(), Box<dyn Error>> {
    vidmorph_cmd()
        .arg("run")
        .assert()
        .failure()
        .stderr(contains("--input"));
    Ok(())
}

#[test]
fn test_run_non_existent_input() -> Result<(), Box<dyn Error>> {
    let output_dir = tempdir()?;

    vidmorph_cmd()
        .arg("run")
        .arg("--input")
        .arg("surely/this/does/not/exist")
        .arg("--output")
        .arg(output_dir.path())
        .assert()
        .failure()
        .stderr(contains("Failed to access input directory"));

    // Nothing was created for a job that never started.
    assert_eq!(std::fs::read_dir(output_dir.path())?.count(), 0);
    Ok(())
}

#[test]
fn test_run_input_must_be_directory() -> Result<(), Box<dyn Error>> {
    let input_dir = tempdir()?;
    let output_dir = tempdir()?;
    let input_file = input_dir.path().join("clip.mp4");
    std::fs::write(&input_file, "dummy content")?;

    vidmorph_cmd()
        .arg("run")
        .arg("-i")
        .arg(&input_file)
        .arg("-o")
        .arg(output_dir.path())
        .assert()
        .failure()
        .stderr(contains("is not a directory"));
    Ok(())
}

#[test]
fn test_run_invalid_copies() -> Result<(), Box<dyn Error>> {
    let input_dir = tempdir()?;
    let output_dir = tempdir()?;

    for copies in ["0", "6"] {
        vidmorph_cmd()
            .arg("run")
            .arg("-i")
            .arg(input_dir.path())
            .arg("-o")
            .arg(output_dir.path())
            .arg("--copies")
            .arg(copies)
            .assert()
            .failure()
            .stderr(contains(format!("invalid value '{copies}'")));
    }
    Ok(())
}

#[test]
fn test_run_invalid_orientation() -> Result<(), Box<dyn Error>> {
    let input_dir = tempdir()?;
    let output_dir = tempdir()?;

    vidmorph_cmd()
        .arg("run")
        .arg("-i")
        .arg(input_dir.path())
        .arg("-o")
        .arg(output_dir.path())
        .arg("--orientation")
        .arg("diagonal")
        .assert()
        .failure()
        .stderr(contains("invalid value 'diagonal'"));
    Ok(())
}

#[test]
fn test_apply_unknown_transform() -> Result<(), Box<dyn Error>> {
    vidmorph_cmd()
        .arg("apply")
        .arg("-t")
        .arg("warp-drive")
        .arg("-i")
        .arg("in.mp4")
        .arg("-o")
        .arg("out.mp4")
        .assert()
        .failure()
        .stderr(contains("Unknown transform 'warp-drive'"));
    Ok(())
}

#[test]
fn test_probe_requires_file() -> Result<(), Box<dyn Error>> {
    vidmorph_cmd().arg("probe").assert().failure();
    Ok(())
}
