use std::{fs, path::PathBuf};

use tempfile::tempdir;

use vignette::Config;

/// Collects all .ucd files from a directory
fn collect_ucd_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("ucd")
            })
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    files.sort();
    files
}

fn config_for(input: &PathBuf, output: &PathBuf) -> Config {
    Config {
        log_level: "off".to_string(),
        file: input.to_string_lossy().to_string(),
        output: output.to_string_lossy().to_string(),
        title: None,
        axis: None,
        format: None,
        config: None,
    }
}

#[test]
fn e2e_smoke_test_svg_output() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let demos = collect_ucd_files(PathBuf::from("demos"));
    assert!(!demos.is_empty(), "No demo inputs found in demos/");

    let mut failed = Vec::new();

    for demo_path in &demos {
        let output_filename =
            format!("{}.svg", demo_path.file_stem().unwrap().to_string_lossy());
        let output_path = temp_dir.path().join(output_filename);

        if let Err(e) = vignette::run(&config_for(demo_path, &output_path)) {
            failed.push((demo_path.clone(), e));
            continue;
        }

        let content = fs::read_to_string(&output_path).expect("output file missing");
        assert!(content.starts_with("<svg"), "output is not an SVG document");
        assert!(content.contains("<ellipse"), "SVG contains no nodes");
    }

    if !failed.is_empty() {
        eprintln!("\nDemos that failed:");
        for (path, err) in &failed {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} demo(s) failed unexpectedly", failed.len());
    }
}

#[test]
fn e2e_smoke_test_png_output() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let input = PathBuf::from("demos/minimal.ucd");
    let output_path = temp_dir.path().join("minimal.png");

    vignette::run(&config_for(&input, &output_path)).expect("PNG export failed");

    let bytes = fs::read(&output_path).expect("output file missing");
    assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"), "output is not a PNG");
}

#[test]
fn empty_input_is_rejected() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let input_path = temp_dir.path().join("empty.ucd");
    fs::write(&input_path, "\n\n   \n").expect("failed to write input");
    let output_path = temp_dir.path().join("empty.svg");

    let result = vignette::run(&config_for(&input_path, &output_path));
    assert!(result.is_err(), "empty input must not produce a diagram");
    assert!(!output_path.exists(), "no output may be written on error");
}

#[test]
fn missing_input_file_is_an_error() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let input_path = temp_dir.path().join("does_not_exist.ucd");
    let output_path = temp_dir.path().join("out.svg");

    let result = vignette::run(&config_for(&input_path, &output_path));
    assert!(result.is_err());
}
