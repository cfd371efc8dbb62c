use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use hearth_core::{
    build_gallery, match_frame, FacePipeline, NearestMatcher, W600K_R50_DISTANCE_THRESHOLD,
};
use std::path::PathBuf;

mod annotate;

#[derive(Parser)]
#[command(name = "hearth", about = "Hearth home monitoring CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the reference gallery from a photo directory and report it
    Gallery {
        /// Gallery root: one subdirectory per role, one photo per person
        dir: PathBuf,
        /// Directory holding det_10g.onnx and w600k_r50.onnx
        #[arg(long, default_value = "models")]
        model_dir: PathBuf,
    },
    /// Recognize faces in a single image against a gallery
    Recognize {
        /// Image to scan
        image: PathBuf,
        /// Gallery root directory
        #[arg(long)]
        gallery_dir: PathBuf,
        /// Directory holding det_10g.onnx and w600k_r50.onnx
        #[arg(long, default_value = "models")]
        model_dir: PathBuf,
        /// Embedding distance threshold for a match
        #[arg(long, default_value_t = W600K_R50_DISTANCE_THRESHOLD)]
        threshold: f32,
        /// Detect on a 1/N scale copy of the image (1 = full resolution)
        #[arg(long, default_value_t = 1)]
        downscale: u32,
        /// Write an annotated copy of the image here
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Send an image to the hosted vision model and scan it for weapons
    Analyze {
        /// Image to analyze (JPEG or PNG)
        image: PathBuf,
    },
    /// List V4L2 capture devices
    Devices,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Gallery { dir, model_dir } => cmd_gallery(&dir, &model_dir),
        Commands::Recognize {
            image,
            gallery_dir,
            model_dir,
            threshold,
            downscale,
            output,
        } => cmd_recognize(
            &image,
            &gallery_dir,
            &model_dir,
            threshold,
            downscale,
            output.as_deref(),
        ),
        Commands::Analyze { image } => cmd_analyze(&image),
        Commands::Devices => {
            cmd_devices();
            Ok(())
        }
    }
}

fn cmd_gallery(dir: &std::path::Path, model_dir: &std::path::Path) -> Result<()> {
    let mut pipeline = FacePipeline::load(model_dir)
        .with_context(|| format!("loading models from {}", model_dir.display()))?;

    let (gallery, report) = build_gallery(&mut pipeline, dir)
        .with_context(|| format!("building gallery from {}", dir.display()))?;

    println!("Loaded {} reference faces:", gallery.len());
    for entry in gallery.entries() {
        println!("  {} ({})", entry.label, entry.role);
    }
    if !report.skipped.is_empty() {
        println!("Skipped {} photos:", report.skipped_count());
        for skip in &report.skipped {
            println!("  {}: {}", skip.path.display(), skip.reason);
        }
    }
    Ok(())
}

fn cmd_recognize(
    image_path: &std::path::Path,
    gallery_dir: &std::path::Path,
    model_dir: &std::path::Path,
    threshold: f32,
    downscale: u32,
    output: Option<&std::path::Path>,
) -> Result<()> {
    let mut pipeline = FacePipeline::load(model_dir)
        .with_context(|| format!("loading models from {}", model_dir.display()))?;

    let (gallery, report) = build_gallery(&mut pipeline, gallery_dir)
        .with_context(|| format!("building gallery from {}", gallery_dir.display()))?;
    tracing::info!(
        entries = gallery.len(),
        skipped = report.skipped_count(),
        "reference gallery ready"
    );

    let img = image::open(image_path)
        .with_context(|| format!("reading {}", image_path.display()))?
        .to_rgb8();
    let (width, height) = img.dimensions();

    let matcher = NearestMatcher::new(threshold);
    let observations = match_frame(
        &mut pipeline,
        img.as_raw(),
        width,
        height,
        &gallery,
        &matcher,
        downscale,
    )
    .context("matching faces")?;

    if observations.is_empty() {
        println!("No faces found in {}", image_path.display());
    }
    for obs in &observations {
        if obs.outcome.is_unknown() {
            println!(
                "[ALERT] Unknown person at ({:.0}, {:.0})",
                obs.face.x, obs.face.y
            );
        } else {
            println!(
                "[RECOGNIZED] {} - Category: {}",
                obs.outcome.display_label(),
                obs.outcome.display_role()
            );
        }
    }

    if let Some(out) = output {
        let mut annotated = img;
        annotate::draw_observations(&mut annotated, &observations);
        annotated
            .save(out)
            .with_context(|| format!("writing {}", out.display()))?;
        println!("Annotated image written to {}", out.display());
    }

    Ok(())
}

fn cmd_analyze(image_path: &std::path::Path) -> Result<()> {
    let alerts = hearth_alert::AlertConfig::from_env();
    let Some(vision) = alerts.vision()? else {
        bail!("HEARTH_API_KEY is not set");
    };

    let mime_type = match image_path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        other => bail!("unsupported image extension: {other:?}"),
    };

    let bytes = std::fs::read(image_path)
        .with_context(|| format!("reading {}", image_path.display()))?;

    let findings = vision
        .analyze_image(&bytes, mime_type, hearth_alert::WEAPON_SCAN_INSTRUCTION)
        .context("vision analysis")?;

    println!("Analysis results:\n{findings}");

    if hearth_alert::findings_indicate_weapons(&findings) {
        println!("Weapons detected.");
        match alerts.telegram()? {
            Some(notifier) => {
                notifier.send(&hearth_alert::TelegramNotifier::weapons_message(&findings))?;
                println!("Telegram alert sent.");
            }
            None => println!("Telegram not configured; no alert sent."),
        }
    } else {
        println!("No weapons detected.");
    }

    Ok(())
}

fn cmd_devices() {
    let devices = hearth_hw::Camera::list_devices();
    if devices.is_empty() {
        println!("No V4L2 capture devices found");
        return;
    }
    for dev in devices {
        println!("{}: {} ({} on {})", dev.path, dev.name, dev.driver, dev.bus);
    }
}
