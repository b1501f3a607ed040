//! Command-line front end for panoview
//!
//! ```bash
//! # Render a view with its annotations composited
//! panoview render pano.jpg --annotations faces.yml --azimuth 30 --zoom 80 -o view.png
//!
//! # Export one crop per annotation
//! panoview crop pano.jpg faces.yml --producer detector
//!
//! # Rewrite a detector file in the canonical four-corner form
//! panoview convert faces.yml reviewed.yml --producer detector
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use panoview::codec::{self, Producer};
use panoview::domain::{Annotation, deg_to_rad};
use panoview::{PanoramaViewer, ViewerConfig, render};

/// Crops are rendered from their own frames; the live view only needs to be valid
const CROP_PREVIEW_SIZE: (u32, u32) = (320, 180);

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ProducerArg {
    Detector,
    Validator,
}

impl From<ProducerArg> for Producer {
    fn from(arg: ProducerArg) -> Self {
        match arg {
            ProducerArg::Detector => Producer::Detector,
            ProducerArg::Validator => Producer::Validator,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Render one view of a panorama
    Render {
        panorama: PathBuf,
        /// Annotation file to overlay
        #[arg(short, long)]
        annotations: Option<PathBuf>,
        #[arg(short, long, value_enum, default_value = "validator")]
        producer: ProducerArg,
        /// Look direction, degrees east of the panorama centre
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        azimuth: f64,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        elevation: f64,
        /// Horizontal field of view in degrees (configured default if omitted)
        #[arg(short, long)]
        zoom: Option<f64>,
        #[arg(long, default_value_t = 1280)]
        width: u32,
        #[arg(long, default_value_t = 720)]
        height: u32,
        /// Outline the sight rectangle
        #[arg(long)]
        sight: bool,
        #[arg(short, long, default_value = "view.png")]
        output: PathBuf,
    },
    /// Export one image per annotation at source resolution
    Crop {
        panorama: PathBuf,
        annotations: PathBuf,
        #[arg(short, long, value_enum, default_value = "validator")]
        producer: ProducerArg,
        /// Output directory (defaults to a timestamped one)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Rewrite an annotation file in canonical form
    Convert {
        input: PathBuf,
        output: PathBuf,
        #[arg(short, long, value_enum, default_value = "validator")]
        producer: ProducerArg,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = ViewerConfig::load();

    match cli.command {
        Commands::Render {
            panorama,
            annotations,
            producer,
            azimuth,
            elevation,
            zoom,
            width,
            height,
            sight,
            output,
        } => {
            let mut viewer = open_viewer(&panorama, width, height, &config)?;
            if let Some(path) = annotations {
                viewer.add_annotations(load_annotations(&path, producer)?);
            }
            viewer.set_zoom(zoom.unwrap_or(config.zoom_default))?;
            viewer.set_view(deg_to_rad(azimuth), deg_to_rad(elevation))?;

            let image = render::compose(&viewer, sight);
            image
                .save(&output)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("{}", output.display());
        }
        Commands::Crop {
            panorama,
            annotations,
            producer,
            output,
        } => {
            let viewer = open_viewer(&panorama, CROP_PREVIEW_SIZE.0, CROP_PREVIEW_SIZE.1, &config)?;
            let annotations = load_annotations(&annotations, producer)?;
            let dir = output.unwrap_or_else(|| {
                PathBuf::from(
                    chrono::Local::now()
                        .format("crops_%Y-%m-%d_%H-%M-%S")
                        .to_string(),
                )
            });
            std::fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;

            let stem = panorama
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "panorama".to_string());
            let mut written = 0;
            for (index, annotation) in annotations.iter().enumerate() {
                match viewer.crop_object(annotation) {
                    Ok(crop) => {
                        let path = dir.join(format!(
                            "{}_{:04}_{}.png",
                            stem,
                            index,
                            annotation.object_type.as_str()
                        ));
                        crop.save(&path)
                            .with_context(|| format!("Failed to write {}", path.display()))?;
                        written += 1;
                    }
                    Err(err) => log::warn!("Skipping annotation {}: {}", index, err),
                }
            }
            println!("Wrote {} crop(s) to {}", written, dir.display());
        }
        Commands::Convert {
            input,
            output,
            producer,
        } => {
            let annotations = load_annotations(&input, producer)?;
            codec::save(&output, &annotations)
                .with_context(|| format!("Failed to convert {}", input.display()))?;
            println!("{}", output.display());
        }
    }
    Ok(())
}

fn open_viewer(panorama: &Path, width: u32, height: u32, config: &ViewerConfig) -> Result<PanoramaViewer> {
    let mut viewer = PanoramaViewer::new(config.clone());
    viewer.setup(width, height, config);
    viewer
        .load_panorama(panorama)
        .with_context(|| format!("Failed to open panorama {}", panorama.display()))?;
    Ok(viewer)
}

fn load_annotations(path: &Path, producer: ProducerArg) -> Result<Vec<Annotation>> {
    codec::load(path, producer.into()).with_context(|| format!("Failed to load annotations {}", path.display()))
}
