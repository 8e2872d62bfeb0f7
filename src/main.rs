use anyhow::{Context, Result};
use clap::Parser;
use codescope::core::Language;
use codescope::{analyze, AnalysisConfig, SourceFile};
use std::fs;
use std::path::PathBuf;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(
    name = "codescope",
    version,
    about = "Multi-dimensional static analyzer for JavaScript and TypeScript"
)]
struct Cli {
    /// Files or directories to analyze
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// JSON configuration file with thresholds and rule toggles
    #[arg(short, long, env = "CODESCOPE_CONFIG")]
    config: Option<PathBuf>,

    /// Emit compact JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => AnalysisConfig::default(),
    };

    let files = collect_sources(&cli.paths);
    let report = analyze(&files, &config);

    let rendered = if cli.compact {
        serde_json::to_string(&report)?
    } else {
        serde_json::to_string_pretty(&report)?
    };
    println!("{rendered}");
    Ok(())
}

/// Gather JS/TS sources under the given paths. An unreadable file is kept
/// with empty content so it still counts in the summary, per the input
/// contract.
fn collect_sources(paths: &[PathBuf]) -> Vec<SourceFile> {
    let mut files = Vec::new();
    for root in paths {
        for entry in WalkDir::new(root).into_iter().filter_map(Result::ok) {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.into_path();
            if Language::from_path(&path) == Language::Unknown {
                continue;
            }
            let content = fs::read_to_string(&path).unwrap_or_else(|e| {
                log::warn!("failed to read {}: {e}", path.display());
                String::new()
            });
            files.push(SourceFile::new(path, content));
        }
    }
    files.sort_by(|a, b| a.path.cmp(&b.path));
    files
}
