// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Galleria: perspective correction for gallery artwork uploads.
//
// Entry point. Initialises logging, parses the command line and reports
// failures in plain language.

mod commands;
mod services;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use galleria_core::human_errors::humanize_error;
use galleria_imaging::Quad;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "galleria")]
#[command(about = "Straighten photographed artworks and stage them for upload")]
#[command(version)]
struct Cli {
    /// Settings file. Defaults to config.json in the data directory.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print image size, default corners and the corrected output size (JSON).
    Inspect {
        /// Path to the input image.
        #[arg(long)]
        image: PathBuf,
    },

    /// Perspective-correct an image and write it as JPEG.
    Correct(CorrectArgs),

    /// Re-encode an image as JPEG without correcting it.
    Reencode(ReencodeArgs),

    /// Render the editor overlay and live preview as PNG.
    Preview(PreviewArgs),

    /// Show or initialise the settings file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Clone, Args)]
struct CorrectArgs {
    /// Path to the input image.
    #[arg(long)]
    image: PathBuf,

    /// Path to write the corrected JPEG.
    #[arg(long)]
    out: PathBuf,

    /// Corners in source pixels: "x,y;x,y;x,y;x,y" (TL, TR, BR, BL).
    /// Defaults to the inset rectangle.
    #[arg(long)]
    corners: Option<Quad>,

    /// JPEG quality in [0, 1]. Defaults to the configured quality.
    #[arg(long)]
    quality: Option<f32>,

    /// Also stage the result as an image of this work.
    #[arg(long)]
    work_id: Option<Uuid>,
}

#[derive(Debug, Clone, Args)]
struct ReencodeArgs {
    /// Path to the input image.
    #[arg(long)]
    image: PathBuf,

    /// Path to write the JPEG.
    #[arg(long)]
    out: PathBuf,

    /// JPEG quality in [0, 1]. Defaults to the configured quality.
    #[arg(long)]
    quality: Option<f32>,

    /// Also stage the result as an image of this work.
    #[arg(long)]
    work_id: Option<Uuid>,
}

#[derive(Debug, Clone, Args)]
struct PreviewArgs {
    /// Path to the input image.
    #[arg(long)]
    image: PathBuf,

    /// Path to write the editor canvas with outline and handles (PNG).
    #[arg(long)]
    overlay: PathBuf,

    /// Path to write the live preview (PNG).
    #[arg(long)]
    preview: PathBuf,

    /// Starting corners in source pixels. Defaults to the inset rectangle.
    #[arg(long)]
    corners: Option<Quad>,

    /// Simulated handle drag in display pixels, "x,y:x,y". Repeatable.
    #[arg(long = "drag", value_parser = commands::parse_drag)]
    drags: Vec<commands::Drag>,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective settings (JSON).
    Show,
    /// Write the default settings to the settings file.
    Init {
        /// Replace an existing settings file.
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match commands::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "Command failed");
            let human = humanize_error(&err);
            eprintln!("{}", human.message);
            eprintln!("{}", human.suggestion);
            ExitCode::FAILURE
        }
    }
}
