use std::path::{Path, PathBuf};

/// Domain interface for pulling the audio track out of a video file.
pub trait AudioExtractor: Send {
    /// Extract the audio track of `video_path` into a mono PCM WAV at
    /// `output_path`.
    ///
    /// Returns `Ok(None)` when the input file is missing or the video has
    /// no audio track (both logged, each distinctly); decode and write
    /// failures are errors. All opened media handles are released before
    /// returning, on every path.
    fn extract(
        &self,
        video_path: &Path,
        output_path: &Path,
    ) -> Result<Option<PathBuf>, Box<dyn std::error::Error>>;
}
