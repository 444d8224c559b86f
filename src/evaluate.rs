use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use glint_vision::Classifier;
use log::{info, warn};
use ndarray::Array2;
use serde::Serialize;
use walkdir::WalkDir;

/// Outcome for one image that decoded.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub path: PathBuf,
    pub overexposed_truth: bool,
    pub overexposed: bool,
    pub light_region_num: usize,
}

/// Image that could not be classified.
#[derive(Debug, Clone, Serialize)]
pub struct Failure {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    /// Rows are ground truth, columns predictions: `[[TN, FP], [FN, TP]]`
    pub confusion_matrix: Array2<usize>,
    pub precision: f64,
    pub recall: f64,
    pub accuracy: f64,
    pub images_per_second: f64,
    pub elapsed_secs: f64,
    pub predictions: Vec<Prediction>,
    pub failures: Vec<Failure>,
}

impl EvaluationReport {
    fn new(predictions: Vec<Prediction>, failures: Vec<Failure>, elapsed_secs: f64) -> Self {
        let mut confusion_matrix = Array2::<usize>::zeros((2, 2));
        for p in &predictions {
            confusion_matrix[[p.overexposed_truth as usize, p.overexposed as usize]] += 1;
        }

        let tn = confusion_matrix[[0, 0]];
        let fp = confusion_matrix[[0, 1]];
        let fn_ = confusion_matrix[[1, 0]];
        let tp = confusion_matrix[[1, 1]];

        let attempted = predictions.len() + failures.len();
        let images_per_second = if elapsed_secs > 0.0 {
            attempted as f64 / elapsed_secs
        } else {
            0.0
        };

        Self {
            confusion_matrix,
            precision: ratio(tp, tp + fp),
            recall: ratio(tp, tp + fn_),
            accuracy: ratio(tp + tn, tp + tn + fp + fn_),
            images_per_second,
            elapsed_secs,
            predictions,
            failures,
        }
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data).with_context(|| format!("writing report {}", path.display()))
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.confusion_matrix;
        writeln!(f, "confusion matrix (rows = truth, cols = prediction):")?;
        writeln!(f, "  [[{}, {}]", m[[0, 0]], m[[0, 1]])?;
        writeln!(f, "   [{}, {}]]", m[[1, 0]], m[[1, 1]])?;
        writeln!(f, "Precision = {:.6}", self.precision)?;
        writeln!(f, "Recall = {:.6}", self.recall)?;
        writeln!(f, "Accuracy = {:.6}", self.accuracy)?;
        write!(
            f,
            "FPS = {:.2} ({} classified, {} failed)",
            self.images_per_second,
            self.predictions.len(),
            self.failures.len()
        )
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Regular files directly inside `dir`, sorted by name.
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    anyhow::ensure!(dir.is_dir(), "{} is not a directory", dir.display());

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("listing {}", dir.display()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Classify every image under `normal_dir` (truth: not overexposed) and
/// `exposure_dir` (truth: overexposed). Undecodable images are recorded and skipped.
pub fn evaluate(
    classifier: &Classifier,
    normal_dir: &Path,
    exposure_dir: &Path,
) -> Result<EvaluationReport> {
    let labelled: Vec<(PathBuf, bool)> = list_images(normal_dir)?
        .into_iter()
        .map(|p| (p, false))
        .chain(list_images(exposure_dir)?.into_iter().map(|p| (p, true)))
        .collect();

    info!("Evaluating {} image(s)", labelled.len());

    let mut predictions = Vec::with_capacity(labelled.len());
    let mut failures = Vec::new();

    let start = Instant::now();
    for (path, truth) in labelled {
        match classifier.classify(path.as_path()) {
            Ok(result) => {
                info!(
                    "{}: light_region_num={} overexposed={}",
                    path.display(),
                    result.light_region_num,
                    result.overexposed
                );
                predictions.push(Prediction {
                    path,
                    overexposed_truth: truth,
                    overexposed: result.overexposed,
                    light_region_num: result.light_region_num,
                });
            }
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                failures.push(Failure {
                    path,
                    error: e.to_string(),
                });
            }
        }
    }
    let elapsed_secs = start.elapsed().as_secs_f64();

    Ok(EvaluationReport::new(predictions, failures, elapsed_secs))
}
