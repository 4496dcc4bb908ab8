//! advise - offline advisory tool
//!
//! Reads a detection list (JSON array of {class, confidence, bbox}) from a
//! file and prints the advisory a live frame would produce, without running
//! a model or a server.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use wayfinder::{Advisor, Frame, RawDetection};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to a JSON array of detections.
    #[arg(long)]
    detections: PathBuf,
    /// Frame width in pixels.
    #[arg(long, default_value_t = 640)]
    width: u32,
    /// Frame height in pixels.
    #[arg(long, default_value_t = 480)]
    height: u32,
    /// Spoken query; omitting it runs the default advisory flow.
    #[arg(long)]
    query: Option<String>,
    /// Emit the full result as JSON instead of the advisory line.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let raw = std::fs::read_to_string(&args.detections)
        .with_context(|| format!("failed to read {}", args.detections.display()))?;
    let detections: Vec<RawDetection> = serde_json::from_str(&raw)
        .with_context(|| format!("invalid detection list in {}", args.detections.display()))?;

    let frame = Frame::new(args.width, args.height)?;
    let advisor = Advisor::default();

    match args.query {
        Some(query) => {
            let result = advisor.process_query(&detections, frame, &query);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", result.advisory);
            }
        }
        None => {
            let result = advisor.process_frame(&detections, frame);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", result.advisory);
            }
        }
    }

    Ok(())
}
