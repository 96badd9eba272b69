use std::path::Path;
use std::sync::{Arc, OnceLock};

use crate::classification::infrastructure::model_locator;
use crate::classification::infrastructure::onnx_accent_model::OnnxAccentModel;
use crate::classification::infrastructure::working_dir::WorkingDirGuard;
use crate::classification::ClassifierError;

use super::accent_model::AccentModel;
use super::prediction::{rank_top_k, Prediction};

/// Accent classifier over a loaded model.
///
/// Construction is fallible and all-or-nothing: a missing bundle or a
/// broken load yields an error and no instance. Once built, `classify`
/// never errors; every per-call failure is logged and absorbed into an
/// empty result set, so callers need no error handling around it.
pub struct AccentClassifier {
    model: Box<dyn AccentModel>,
}

impl AccentClassifier {
    pub fn new(model: Box<dyn AccentModel>) -> Self {
        Self { model }
    }

    /// Load the classifier from the pretrained bundle location.
    ///
    /// `model_dir` overrides the well-known search path. Fails with
    /// [`ClassifierError::ModelNotFound`] before any load is attempted
    /// when the bundle directory is absent.
    pub fn load(model_dir: Option<&Path>) -> Result<Self, ClassifierError> {
        let bundle_dir = model_locator::locate(model_dir)?;
        let model = OnnxAccentModel::load(&bundle_dir)?;
        Ok(Self::new(Box::new(model)))
    }

    /// Process-wide shared instance.
    ///
    /// Loaded at most once (model loading is expensive), read-only
    /// afterwards, and kept until process teardown; never reloaded per
    /// request.
    pub fn shared(model_dir: Option<&Path>) -> Result<Arc<AccentClassifier>, ClassifierError> {
        static SHARED: OnceLock<Arc<AccentClassifier>> = OnceLock::new();
        if let Some(classifier) = SHARED.get() {
            return Ok(Arc::clone(classifier));
        }
        let loaded = Arc::new(Self::load(model_dir)?);
        Ok(Arc::clone(SHARED.get_or_init(|| loaded)))
    }

    pub fn num_labels(&self) -> usize {
        self.model.labels().len()
    }

    /// Classify the accent of a mono PCM waveform file.
    ///
    /// Returns the `top_k` predictions descending by score (clamped to the
    /// label count), or an empty vector when the file is missing or
    /// inference fails; both outcomes are logged.
    ///
    /// The underlying inference path resolves audio files against the
    /// process working directory, so the call runs inside a scoped
    /// directory change to the file's parent and passes the base name
    /// only; the original directory is restored on every exit path.
    pub fn classify(&self, audio_path: &Path, top_k: usize) -> Vec<Prediction> {
        if !audio_path.is_file() {
            log::error!(
                "audio file not found for classification: {}",
                audio_path.display()
            );
            return Vec::new();
        }
        let Some(file_name) = audio_path.file_name() else {
            log::error!("audio path has no file name: {}", audio_path.display());
            return Vec::new();
        };
        let audio_dir = match audio_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let _guard = match WorkingDirGuard::change_to(audio_dir) {
            Ok(guard) => guard,
            Err(e) => {
                log::error!(
                    "cannot enter audio directory {}: {e}",
                    audio_dir.display()
                );
                return Vec::new();
            }
        };

        log::info!(
            "classifying {} (from directory {})",
            file_name.to_string_lossy(),
            audio_dir.display()
        );
        match self.model.score(Path::new(file_name)) {
            Ok(probabilities) => {
                let results = rank_top_k(&probabilities, self.model.labels(), top_k);
                if let Some(top) = results.first() {
                    log::info!(
                        "classification successful; top prediction: {} ({:.2})",
                        top.label,
                        top.score
                    );
                }
                results
            }
            Err(e) => {
                log::error!("accent classification failed: {e}");
                Vec::new()
            }
        }
    }
}
