use std::path::Path;

use super::label_table::LabelTable;

/// Domain interface for a loaded accent-classification model.
///
/// `score` consumes a waveform file and returns the probability
/// distribution over every known label, index-aligned with `labels`. The
/// raw model output is an opaque numeric vector; callers convert it into
/// typed predictions immediately and nothing downstream depends on the
/// inference library's native result shape.
pub trait AccentModel: Send + Sync {
    fn labels(&self) -> &LabelTable;

    /// Score one waveform file.
    ///
    /// The path is resolved against the process working directory, so
    /// callers pass a base name from inside a scoped directory change.
    fn score(&self, audio_file: &Path) -> Result<Vec<f32>, Box<dyn std::error::Error>>;
}
