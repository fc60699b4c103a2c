// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanwerk — command-line document scanner
//
// Entry point. Initialises logging, loads settings, and dispatches to the
// detect / rectify / framing commands.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use scanwerk_core::human_errors::humanize_error;
use scanwerk_core::{DocumentCorners, Point, ScanConfig};

#[derive(Debug, Parser)]
#[command(name = "scanwerk", version)]
#[command(about = "Find, flatten and clean up photographed documents")]
struct Cli {
    /// JSON settings file; missing fields take their defaults
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the detected corners as JSON (`null` when none are found)
    Detect {
        #[arg(value_name = "IMAGE")]
        image: PathBuf,
    },
    /// Flatten a document photo into a scan
    Rectify(RectifyArgs),
    /// Report whether the document is well framed for capture
    Framing {
        #[arg(value_name = "IMAGE")]
        image: PathBuf,
    },
}

#[derive(Debug, Args)]
struct RectifyArgs {
    #[arg(value_name = "IMAGE")]
    image: PathBuf,

    /// Where to write the scan
    #[arg(short, long, value_name = "OUT")]
    output: PathBuf,

    /// Corners as x,y pairs (top-left, top-right, bottom-right, bottom-left);
    /// detected when omitted
    #[arg(long, value_name = "X,Y,...", value_parser = parse_corners, allow_hyphen_values = true)]
    corners: Option<DocumentCorners>,

    /// Output width in pixels
    #[arg(long, value_name = "N")]
    width: Option<u32>,

    /// Convert to black-and-white
    #[arg(long)]
    enhance: bool,

    /// JPEG quality in (0, 1]
    #[arg(long, value_name = "Q")]
    quality: Option<f64>,

    /// Write PNG instead of JPEG
    #[arg(long)]
    png: bool,
}

/// Parse eight comma-separated coordinates into corners.
fn parse_corners(raw: &str) -> Result<DocumentCorners, String> {
    let values = raw
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid coordinate: {e}"))?;
    if values.len() != 8 {
        return Err(format!("expected 8 coordinates, got {}", values.len()));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err("coordinates must be finite".into());
    }
    Ok(DocumentCorners::from_points([
        Point::new(values[0], values[1]),
        Point::new(values[2], values[3]),
        Point::new(values[4], values[5]),
        Point::new(values[6], values[7]),
    ]))
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Command::Detect { image } => commands::detect(&image, &config),
        Command::Rectify(args) => commands::rectify(&args, &config),
        Command::Framing { image } => commands::framing(&image, &config),
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "scanwerk failed");
            let human = humanize_error(&e);
            eprintln!("{}\n{}", human.message, human.suggestion);
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> scanwerk_core::Result<ScanConfig> {
    match path {
        Some(path) => {
            let config = ScanConfig::from_json_file(path)?;
            tracing::debug!(path = %path.display(), "settings loaded");
            Ok(config)
        }
        None => Ok(ScanConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_rectify_with_manual_corners() {
        let cli = Cli::try_parse_from([
            "scanwerk",
            "rectify",
            "photo.jpg",
            "-o",
            "scan.png",
            "--corners",
            "10,20,300,25,310,400,5,390",
            "--width",
            "800",
            "--enhance",
            "--png",
        ])
        .unwrap();

        let Command::Rectify(args) = cli.command else {
            panic!("expected rectify command");
        };
        assert_eq!(args.output, PathBuf::from("scan.png"));
        assert_eq!(args.width, Some(800));
        assert!(args.enhance && args.png);
        let corners = args.corners.unwrap();
        assert_eq!(corners.top_left, Point::new(10.0, 20.0));
        assert_eq!(corners.bottom_left, Point::new(5.0, 390.0));
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from([
            "scanwerk", "detect", "a.jpg", "-v", "--config", "s.json",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("s.json")));
        assert!(matches!(cli.command, Command::Detect { .. }));
    }

    #[test]
    fn rectify_requires_output() {
        assert!(Cli::try_parse_from(["scanwerk", "rectify", "photo.jpg"]).is_err());
    }

    #[test]
    fn corner_parsing_rejects_bad_input() {
        assert!(parse_corners("1,2,3").is_err());
        assert!(parse_corners("1,2,3,4,5,6,7,x").is_err());
        assert!(parse_corners("1,2,3,4,5,6,7,inf").is_err());
        assert!(parse_corners(" 1, 2, 3, 4, 5, 6, 7, 8 ").is_ok());
    }

    #[test]
    fn missing_config_path_uses_defaults() {
        assert_eq!(load_config(None).unwrap(), ScanConfig::default());
    }
}
