//! # Netfie CLI
//!
//! Headless shell around the Netfie editing session.
//!
//! ```bash
//! netfie render edits.json -o out.png --scale 2
//! netfie validate photo.webp --kind image
//! netfie presets
//! ```

pub mod script;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use netfie_core::{
    CanvasPreset, EditorSession, MediaFile, MediaKind, MediaSlot, MemoryUrlStore, RasterFormat,
    RasterOptions, SessionConfig, ShapePreset,
};
use netfie_render::SvgSurface;
use script::EditScript;
use std::path::{Path, PathBuf};

/// Command-line arguments.
#[derive(Debug, Clone, Parser)]
#[command(name = "netfie")]
#[command(about = "Netfie image editor, headless")]
#[command(version)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Replay an edit script and export the canvas.
    Render(RenderArgs),
    /// Check a file against a media kind.
    Validate(ValidateArgs),
    /// List shape-library and canvas-size presets.
    Presets,
}

#[derive(Debug, Clone, clap::Args)]
pub struct RenderArgs {
    /// Edit script (JSON).
    pub script: PathBuf,

    /// Output file.
    #[arg(short, long)]
    pub output: PathBuf,

    /// png or jpeg. Defaults to the output extension.
    #[arg(short, long)]
    pub format: Option<RasterFormat>,

    /// Output pixels per canvas pixel.
    #[arg(long, default_value = "1.0")]
    pub scale: f32,

    /// JPEG quality, 1-100.
    #[arg(long, default_value = "100")]
    pub quality: u8,

    /// Session configuration (JSON).
    #[arg(long, env = "NETFIE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Saved scene to start from.
    #[arg(long)]
    pub load: Option<PathBuf>,

    /// Also save the resulting scene as JSON.
    #[arg(long)]
    pub save_json: Option<PathBuf>,
}

#[derive(Debug, Clone, clap::Args)]
pub struct ValidateArgs {
    pub file: PathBuf,

    /// image, audio or video.
    #[arg(short, long, default_value = "image")]
    pub kind: MediaKind,

    /// MIME type. Guessed from the extension when omitted.
    #[arg(long)]
    pub mime: Option<String>,
}

pub fn run(args: CliArgs) -> Result<()> {
    match args.command {
        Command::Render(args) => render(&args).map(|_| ()),
        Command::Validate(args) => {
            let url = validate(&args)?;
            println!("{} accepted as {} ({url})", args.file.display(), args.kind);
            Ok(())
        }
        Command::Presets => {
            print!("{}", presets());
            Ok(())
        }
    }
}

/// Load a session configuration, or the default one.
pub fn load_config(path: Option<&Path>) -> Result<SessionConfig> {
    let Some(path) = path else {
        return Ok(SessionConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    SessionConfig::from_json(&json).with_context(|| format!("parsing config {}", path.display()))
}

/// Output format from the flag, else from the output extension.
fn output_format(args: &RenderArgs) -> Result<RasterFormat> {
    if let Some(format) = args.format {
        return Ok(format);
    }
    match args.output.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => ext
            .parse()
            .map_err(|e: String| anyhow::anyhow!("{e}; pass --format")),
        None => Ok(RasterFormat::Png),
    }
}

/// Run an edit script and write the export. Returns the bytes written.
pub fn render(args: &RenderArgs) -> Result<usize> {
    let config = load_config(args.config.as_deref())?;
    let script = EditScript::load(&args.script)?;
    let format = output_format(args)?;

    let mut session = EditorSession::new(config, SvgSurface::new());
    if let Some(path) = &args.load {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading scene {}", path.display()))?;
        session.load_json(&json)?;
    }

    let base_dir = args.script.parent().unwrap_or(Path::new("."));
    script::apply(&mut session, &script, base_dir)?;

    let options = RasterOptions::new(format)
        .with_scale(args.scale)
        .with_quality(args.quality);
    let bytes = session.export_with(&options)?;
    std::fs::write(&args.output, &bytes)
        .with_context(|| format!("writing {}", args.output.display()))?;
    log::info!("Wrote {}", args.output.display());

    if let Some(path) = &args.save_json {
        std::fs::write(path, session.to_json()?)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(bytes.len())
}

/// Validate a file and return the object URL it would be shown under.
pub fn validate(args: &ValidateArgs) -> Result<String> {
    let bytes =
        std::fs::read(&args.file).with_context(|| format!("reading {}", args.file.display()))?;
    let mime = args
        .mime
        .clone()
        .unwrap_or_else(|| script::guess_mime(&args.file));
    let name = args.file.display().to_string();
    let file = MediaFile::new(name, mime, bytes);

    let mut store = MemoryUrlStore::new();
    let mut slot = MediaSlot::new(args.kind, &mut store);
    let url = slot.replace(&file)?.to_string();
    Ok(url)
}

/// Human-readable preset listing.
pub fn presets() -> String {
    let mut out = String::from("Shapes:\n");
    for preset in ShapePreset::ALL {
        out.push_str(&format!("  {}\n", preset.name()));
    }
    out.push_str("Canvas sizes:\n");
    for preset in CanvasPreset::ALL {
        let (width, height) = preset.dimensions();
        out.push_str(&format!("  {:<20} {width}x{height}\n", preset.label()));
    }
    out
}
