use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use image::Rgb;
use tracing_subscriber::EnvFilter;

use qrmint::config::{parse_color, QrConfig};
use qrmint::helper::{generate, save_png};
use qrmint::output::{show, SystemViewer};
use qrmint::render::{to_console_string, to_svg_string, RenderOptions};
use qrmint::QrCodeEcc;

#[derive(Parser, Debug)]
#[command(name = "qrmint", version, about = "Encode text as a QR code image")]
struct Args {
    /// The text or URL to encode
    text: String,

    /// Fixed symbol version (1-40); picks the smallest that fits when omitted
    #[arg(short = 'v', long = "symbol-version")]
    symbol_version: Option<u8>,

    /// Error correction level: L, M, Q or H
    #[arg(short, long, default_value = "L")]
    error_correction: QrCodeEcc,

    /// Fixed mask pattern (0-7); chosen by penalty score when omitted
    #[arg(short, long)]
    mask: Option<u8>,

    /// Pixels per module
    #[arg(short, long, default_value_t = 10)]
    box_size: u32,

    /// Quiet zone width in modules
    #[arg(long, default_value_t = 4)]
    border: u32,

    /// Module color: a name or #rrggbb
    #[arg(long, default_value = "black", value_parser = parse_color)]
    fill: Rgb<u8>,

    /// Background color: a name or #rrggbb
    #[arg(long, default_value = "white", value_parser = parse_color)]
    back: Rgb<u8>,

    /// PNG output path
    #[arg(short, long, default_value = "qrcode.png")]
    output: PathBuf,

    /// Also write an SVG to this path
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Print the symbol to the terminal
    #[arg(long)]
    print: bool,

    /// Open the PNG in the default image viewer
    #[arg(long)]
    show: bool,
}

impl Args {
    fn config(&self) -> QrConfig {
        QrConfig {
            version: self.symbol_version,
            error_correction: self.error_correction,
            mask: self.mask,
            box_size: self.box_size,
            border: self.border,
            foreground: self.fill,
            background: self.back,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = args.config();

    let qr = generate(&args.text, &config).context("Failed to encode QR code")?;
    tracing::info!(
        version = qr.version().value(),
        size = qr.size(),
        mask = qr.mask().value(),
        "encoded"
    );

    let raster = save_png(&qr, &config, &args.output)
        .with_context(|| format!("Failed to save QR code to {}", args.output.display()))?;

    if let Some(svg_path) = &args.svg {
        std::fs::write(svg_path, to_svg_string(&qr, &RenderOptions::from(&config)))
            .with_context(|| format!("Failed to write SVG to {}", svg_path.display()))?;
    }

    if args.print {
        print!("{}", to_console_string(&qr, config.border.min(4)));
    }

    if args.show {
        show(&SystemViewer::default(), &raster);
    }

    Ok(())
}
