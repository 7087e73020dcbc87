//! mmlroll - Replays piano-roll edits and prints the resulting MML.
//!
//! Reads an edit script (a JSON array of commands, see [`mmlroll::script`])
//! from a file or stdin, applies it to a fresh timeline, and writes the
//! compiled MML to stdout.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- edits.json
//! cargo run -- --bars 1 --volume 100 < edits.json
//! cargo run -- --notes-json edits.json   # print the note snapshot instead
//! ```

use anyhow::{Context, Result};
use mmlroll::script::{load_script, parse_script, run_script};
use mmlroll::{LayoutConfig, Timeline};
use std::io::{self, Read};
use std::path::PathBuf;

/// Command-line options for the application.
struct CliOptions {
    /// Grid layout of the timeline.
    layout: LayoutConfig,
    /// Initial volume (0-100).
    volume: Option<u8>,
    /// Print the note snapshot as JSON instead of MML.
    notes_json: bool,
    /// Script file; stdin when absent.
    script: Option<PathBuf>,
}

fn print_help(program: &str) {
    eprintln!("mmlroll - Piano-roll MML generator");
    eprintln!();
    eprintln!("Usage: {} [OPTIONS] [SCRIPT.json]", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --bars N            Number of bars (default 8)");
    eprintln!("  --steps-per-bar N   Steps per bar, multiple of 4 (default 16)");
    eprintln!("  --keys N            Number of keys (default 49)");
    eprintln!("  --pitch-start N     Pitch index of the lowest key (default 0)");
    eprintln!("  --volume N          Initial volume 0-100 (default 80)");
    eprintln!("  --notes-json        Print the resulting notes as JSON");
    eprintln!("  -h, --help          Print this help message");
    eprintln!();
    eprintln!("The script is read from stdin when no file is given.");
}

impl CliOptions {
    /// Parses command-line arguments.
    fn parse() -> Result<Self> {
        let args: Vec<String> = std::env::args().collect();
        let program = args.first().map(String::as_str).unwrap_or("mmlroll");
        let defaults = LayoutConfig::default();
        let mut bars = defaults.bars;
        let mut steps_per_bar = defaults.steps_per_bar;
        let mut key_count = defaults.key_count;
        let mut pitch_range_start = defaults.pitch_range_start;
        let mut volume = None;
        let mut notes_json = false;
        let mut script = None;

        let mut iter = args.iter().skip(1);
        while let Some(arg) = iter.next() {
            let mut value = |name: &str| -> Result<u32> {
                let raw = iter
                    .next()
                    .with_context(|| format!("{} requires a value", name))?;
                raw.parse()
                    .with_context(|| format!("invalid value for {}: {}", name, raw))
            };
            match arg.as_str() {
                "--bars" => bars = value("--bars")?,
                "--steps-per-bar" => steps_per_bar = value("--steps-per-bar")?,
                "--keys" => key_count = value("--keys")?,
                "--pitch-start" => pitch_range_start = value("--pitch-start")?,
                "--volume" => {
                    let v = value("--volume")?;
                    volume = Some(u8::try_from(v.min(100)).unwrap_or(100));
                }
                "--notes-json" => notes_json = true,
                "--help" | "-h" => {
                    print_help(program);
                    std::process::exit(0);
                }
                other if other.starts_with('-') => {
                    eprintln!("Unknown option: {}", other);
                    eprintln!("Use --help for usage information");
                    std::process::exit(1);
                }
                other => script = Some(PathBuf::from(other)),
            }
        }

        let layout = LayoutConfig::new(bars, steps_per_bar, key_count, pitch_range_start)
            .context("Invalid layout")?;

        Ok(Self {
            layout,
            volume,
            notes_json,
            script,
        })
    }
}

/// Main entry point.
fn main() -> Result<()> {
    let cli = CliOptions::parse()?;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let commands = match &cli.script {
        Some(path) => load_script(path)
            .with_context(|| format!("Failed to load script {}", path.display()))?,
        None => {
            let mut json = String::new();
            io::stdin()
                .read_to_string(&mut json)
                .context("Failed to read script from stdin")?;
            parse_script(&json).context("Failed to parse script from stdin")?
        }
    };

    let mut timeline = match cli.volume {
        Some(volume) => Timeline::with_volume(cli.layout, volume),
        None => Timeline::new(cli.layout),
    };
    run_script(&mut timeline, &commands);
    tracing::info!(
        commands = commands.len(),
        notes = timeline.note_count(),
        "script applied"
    );

    if cli.notes_json {
        let json =
            serde_json::to_string_pretty(timeline.notes()).context("Failed to serialize notes")?;
        println!("{}", json);
    } else {
        println!("{}", timeline.mml());
    }
    Ok(())
}
