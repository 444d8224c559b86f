use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glint::{config, evaluate, Classification, Classifier};
use log::{info, warn};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "glint")]
#[command(version, about = "Detect overexposed photos by their large bright regions")]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify one or more images, printing one JSON line each
    Classify {
        #[arg(required = true)]
        images: Vec<PathBuf>,
        /// Where annotated copies go when show_result is enabled
        #[arg(short, long)]
        annotate_dir: Option<PathBuf>,
    },
    /// Measure precision/recall/accuracy over labelled directories
    Evaluate {
        /// Directory of images known to be well exposed
        #[arg(long)]
        normal: PathBuf,
        /// Directory of images known to be overexposed
        #[arg(long)]
        exposure: PathBuf,
        /// Also write the full report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Open config file in editor
    Config {
        /// Write the default configuration instead of editing
        #[arg(long)]
        init: bool,
    },
}

#[derive(Serialize)]
struct ClassifyLine<'a> {
    path: &'a Path,
    #[serde(flatten)]
    result: Classification,
}

fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_target(false)
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Classify {
            images,
            annotate_dir,
        } => {
            let cfg = config::load_config(config_path)?;
            let classifier = cfg.classifier()?;
            classify(&classifier, &images, annotate_dir.as_deref())
        }
        Commands::Evaluate {
            normal,
            exposure,
            report,
        } => {
            let cfg = config::load_config(config_path)?;
            let classifier = cfg.classifier()?;
            run_evaluation(&classifier, &normal, &exposure, report.as_deref())
        }
        Commands::Config { init } => {
            let path = config_path.unwrap_or(&config::CONFIG_PATH);
            if init {
                init_config(path)
            } else {
                open_config(path)
            }
        }
    }
}

fn classify(classifier: &Classifier, images: &[PathBuf], annotate_dir: Option<&Path>) -> Result<()> {
    let annotate_dir = annotate_dir.unwrap_or_else(|| Path::new("."));
    if classifier.show_result() {
        std::fs::create_dir_all(annotate_dir)
            .with_context(|| format!("creating {}", annotate_dir.display()))?;
    }

    let mut failed = 0usize;
    for path in images {
        let analysis = match classifier.analyze(path.as_path()) {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!("{}", e);
                failed += 1;
                continue;
            }
        };

        let line = ClassifyLine {
            path,
            result: analysis.classification,
        };
        println!("{}", serde_json::to_string(&line)?);

        for region in &analysis.regions {
            info!(
                "{}: region #{} at ({:.0}, {:.0}), radius {:.1}",
                path.display(),
                region.index,
                region.center.0,
                region.center.1,
                region.radius
            );
        }

        if let Some(annotated) = analysis.annotated {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "image".to_string());
            let out = annotate_dir.join(format!("{}_annotated.png", stem));
            annotated
                .save(&out)
                .with_context(|| format!("saving {}", out.display()))?;
            info!("Annotated image written to {}", out.display());
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} image(s) could not be classified", failed, images.len());
    }
    Ok(())
}

fn run_evaluation(
    classifier: &Classifier,
    normal: &Path,
    exposure: &Path,
    report_path: Option<&Path>,
) -> Result<()> {
    let report = evaluate::evaluate(classifier, normal, exposure)?;
    println!("{}", report);

    if let Some(path) = report_path {
        report.write_json(path)?;
        info!("Report written to {}", path.display());
    }
    Ok(())
}

fn init_config(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }
    config::save_config(&config::Config::default(), Some(path))?;
    info!("✓ Default config written to {}", path.display());
    Ok(())
}

fn open_config(path: &Path) -> Result<()> {
    let editor = env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
    info!("Editing {} with {}", path.display(), editor);

    let status = std::process::Command::new(&editor)
        .arg(path)
        .status()
        .with_context(|| format!("could not launch {}", editor))?;
    anyhow::ensure!(status.success(), "{} quit with {}", editor, status);
    Ok(())
}
