//! Prepare effect layers by removing white backgrounds
//!
//! Every pixel whose red, green and blue channels all exceed the threshold
//! becomes fully transparent. The output is written as PNG-compatible RGBA.

use std::path::PathBuf;
use anyhow::Context;
use clap::Parser;
use image::DynamicImage;
use tracing::info;

use blending_waves::engine::strip_white_background;

#[derive(Parser, Debug)]
#[command(name = "strip-background", about = "Make white image backgrounds transparent")]
struct Args {
    /// Source image
    input: PathBuf,

    /// Destination image; the format follows the extension
    output: PathBuf,

    /// Channel value above which a pixel counts as white
    #[arg(long, default_value_t = 200)]
    threshold: u8,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("strip_background=info".parse()?)
        )
        .init();

    let args = Args::parse();

    let source = image::open(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;
    let stripped = strip_white_background(&source, args.threshold);

    DynamicImage::ImageRgba8(stripped)
        .save(&args.output)
        .with_context(|| format!("Failed to save {}", args.output.display()))?;

    info!(
        input = %args.input.display(),
        output = %args.output.display(),
        threshold = args.threshold,
        "Background removed"
    );

    Ok(())
}
