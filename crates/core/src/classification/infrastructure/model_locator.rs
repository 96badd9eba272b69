use std::path::{Path, PathBuf};

use crate::classification::ClassifierError;
use crate::shared::constants::{LABELS_FILENAME, MODEL_DIR_NAME, MODEL_FILENAME};

/// Locate the pretrained model bundle directory.
///
/// Resolution order:
/// 1. Explicit override (e.g. `--model-dir`); when given, nothing else is
///    probed.
/// 2. `models/accent-id` under the process working directory.
/// 3. User data directory fallback (platform-specific).
///
/// Fails with [`ClassifierError::ModelNotFound`] before any load attempt
/// when no candidate exists; the inference library's own missing-model
/// error is far less diagnosable.
pub fn locate(override_dir: Option<&Path>) -> Result<PathBuf, ClassifierError> {
    if let Some(dir) = override_dir {
        if dir.is_dir() {
            return Ok(dir.to_path_buf());
        }
        return Err(ClassifierError::ModelNotFound {
            searched: vec![dir.to_path_buf()],
        });
    }

    let mut searched = Vec::new();

    let bundled = PathBuf::from("models").join(MODEL_DIR_NAME);
    if bundled.is_dir() {
        return Ok(bundled);
    }
    searched.push(bundled);

    if let Some(data_dir) = dirs::data_dir() {
        let user = data_dir
            .join("AccentCheck")
            .join("models")
            .join(MODEL_DIR_NAME);
        if user.is_dir() {
            return Ok(user);
        }
        searched.push(user);
    }

    Err(ClassifierError::ModelNotFound { searched })
}

pub fn model_file(bundle_dir: &Path) -> PathBuf {
    bundle_dir.join(MODEL_FILENAME)
}

pub fn labels_file(bundle_dir: &Path) -> PathBuf {
    bundle_dir.join(LABELS_FILENAME)
}
