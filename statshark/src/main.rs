use anyhow::{Context, bail};
use clap::{App, Arg};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use rs2_gamestats::convert_lines;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let matches = App::new("statshark")
        .about("Converts GameStatsCollector server logs to JSON")
        .arg(
            Arg::with_name("INPUT")
                .help("A GameStats*.txt file, or a directory of them (e.g. ROGame/Stats)")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("OUTPUT")
                .help("Output JSON file (or directory when INPUT is a directory)")
                .required(true)
                .index(2),
        )
        .get_matches();

    let input = Path::new(matches.value_of("INPUT").unwrap());
    let output = Path::new(matches.value_of("OUTPUT").unwrap());

    if input.is_dir() {
        convert_directory(input, output)
    } else {
        convert_file(input, output)
    }
}

fn convert_file(input: &Path, output: &Path) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;

    let conversion = convert_lines(text.lines())
        .with_context(|| format!("failed to convert {}", input.display()))?;

    for skipped in &conversion.skipped {
        eprintln!(
            "{}:{}: skipped: {}: {:?}",
            input.display(),
            skipped.line_number,
            skipped.error,
            skipped.raw
        );
    }

    let encoded = serde_json::to_vec_pretty(&conversion.document)?;
    std::fs::write(output, encoded)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!(
        "{}: {} events ({} skipped) -> {}",
        input.display(),
        conversion.document.events.len(),
        conversion.skipped.len(),
        output.display()
    );
    Ok(())
}

fn convert_directory(input: &Path, output: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(output)
        .with_context(|| format!("failed to create {}", output.display()))?;

    let mut converted = 0usize;
    let mut failed = 0usize;
    for entry in WalkDir::new(input) {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_stats_file(entry.path()) {
            continue;
        }

        let stem = entry
            .path()
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("GameStats");
        let destination: PathBuf = output.join(format!("{}.json", stem));

        // One bad file (e.g. truncated header from a server crash) should not
        // sink the rest of the batch.
        match convert_file(entry.path(), &destination) {
            Ok(()) => converted += 1,
            Err(error) => {
                tracing::error!(path = %entry.path().display(), %error, "conversion failed");
                failed += 1;
            }
        }
    }

    if converted == 0 && failed == 0 {
        bail!("no GameStats*.txt files under {}", input.display());
    }
    println!("{} file(s) converted, {} failed", converted, failed);
    Ok(())
}

fn is_stats_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with("GameStats") && name.ends_with(".txt"))
        .unwrap_or(false)
}
