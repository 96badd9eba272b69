use std::path::{Path, PathBuf};

/// Phase of a fetch reported through the progress callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchStatus {
    Downloading,
    Finished,
}

/// One progress event from the fetch stage.
#[derive(Clone, Debug, PartialEq)]
pub struct FetchEvent {
    pub status: FetchStatus,
    /// Completed fraction. Sources that cannot report a usable value send
    /// 0.0; consumers still sanitize before display.
    pub percent: f64,
    pub eta: Option<String>,
}

impl FetchEvent {
    pub fn downloading(percent: f64, eta: Option<String>) -> Self {
        Self {
            status: FetchStatus::Downloading,
            percent,
            eta,
        }
    }

    pub fn finished() -> Self {
        Self {
            status: FetchStatus::Finished,
            percent: 1.0,
            eta: None,
        }
    }
}

pub type FetchProgressFn = Box<dyn Fn(FetchEvent) + Send>;

/// Domain interface for retrieving a media file behind a URL.
pub trait MediaFetcher: Send {
    /// Retrieve the media behind `url` into `output_dir`.
    ///
    /// `Ok(None)` means no file could be produced (empty, private, or
    /// unavailable URL; logged here); errors are unexpected failures the
    /// caller logs.
    fn fetch(
        &self,
        url: &str,
        output_dir: &Path,
        on_progress: Option<&FetchProgressFn>,
    ) -> Result<Option<PathBuf>, Box<dyn std::error::Error>>;
}
