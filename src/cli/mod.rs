//! Command-line interface for card-spotter.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **serve**: Start the capture backend and web interface
//!
//! ## Usage
//!
//! ```text
//! # Start on the default port (5000)
//! card-spotter serve
//!
//! # Custom port and upload directory
//! card-spotter serve --port 3000 --upload-dir /tmp/frames
//!
//! # Reject uploads whose declared type is not image/*
//! card-spotter serve --enforce-validation
//!
//! # Open the capture page in a browser once listening
//! card-spotter serve --open
//! ```
//!
//! The serve options also bind to environment variables (`PORT`,
//! `UPLOAD_DIR`, `ENFORCE_UPLOAD_VALIDATION`) so deployment scripts can
//! configure the backend without flags.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::web::listener::DEFAULT_MAX_ATTEMPTS;

#[derive(Parser)]
#[command(name = "card-spotter")]
#[command(author)]
#[command(version)]
#[command(about = "Webcam capture backend with mock playing-card detection")]
#[command(
    long_about = "card-spotter runs the HTTP backend for a webcam capture demo.\n\nThe bundled browser page grabs a frame every two seconds and posts it here; the backend stores each frame on disk and answers with mock detection results:\n- Stored-file metadata for plain uploads\n- Fixed bounding-box sets standing in for a real card detector\n- A port-fallback bind so a busy default port does not kill the demo"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve(ServeArgs),
}

#[derive(clap::Args)]
pub struct ServeArgs {
    /// Port to listen on; the actual port may be higher if this one is busy
    #[arg(short, long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Address to bind to
    #[arg(short, long, default_value = "127.0.0.1")]
    pub address: IpAddr,

    /// Directory where uploaded frames are stored
    #[arg(long, env = "UPLOAD_DIR", default_value = "uploads")]
    pub upload_dir: PathBuf,

    /// How many consecutive ports to try before giving up
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_ATTEMPTS,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub attempts: u32,

    /// Reject uploads whose declared content type is not image/*
    ///
    /// The environment variable accepts truthy values like `1`, not
    /// just `true`.
    #[arg(
        long,
        env = "ENFORCE_UPLOAD_VALIDATION",
        value_parser = clap::builder::FalseyValueParser::new(),
        num_args = 0..=1,
        default_missing_value = "true",
        default_value = "false"
    )]
    pub enforce_validation: bool,

    /// Open browser automatically
    #[arg(long)]
    pub open: bool,
}
