use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use crate::classification::domain::classifier::AccentClassifier;
use crate::classification::domain::prediction::Prediction;
use crate::extraction::domain::audio_extractor::AudioExtractor;
use crate::fetching::domain::media_fetcher::{
    FetchProgressFn, FetchStatus, MediaFetcher,
};

use super::progress::{sanitize_percent, ProgressReporter};
use super::stage::{PipelineError, PipelineStage};

/// Orchestrates the three-stage analysis pipeline: fetch the video,
/// extract its audio track, classify the accent.
///
/// Stages run strictly in sequence and short-circuit on the first
/// failure, each mapping to its own [`PipelineError`] variant. All
/// intermediate artifacts (downloaded media, extracted waveform) live in
/// a temporary directory reclaimed when the run returns, whichever stage
/// failed. Stage results are locals of one `run`; nothing is retained
/// across runs.
pub struct AnalyzeAccentUseCase {
    fetcher: Box<dyn MediaFetcher>,
    extractor: Box<dyn AudioExtractor>,
    classifier: Arc<AccentClassifier>,
    reporter: Arc<dyn ProgressReporter>,
    top_k: usize,
}

impl AnalyzeAccentUseCase {
    pub fn new(
        fetcher: Box<dyn MediaFetcher>,
        extractor: Box<dyn AudioExtractor>,
        classifier: Arc<AccentClassifier>,
        reporter: Arc<dyn ProgressReporter>,
        top_k: usize,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            classifier,
            reporter,
            top_k,
        }
    }

    /// Run the full pipeline for one URL.
    pub fn run(&self, url: &str) -> Result<Vec<Prediction>, PipelineError> {
        let workspace = TempDir::new().map_err(PipelineError::Workspace)?;

        let video_path = self.fetch(url, workspace.path())?;
        let audio_path = self.extract(&video_path, workspace.path())?;
        self.classify(&audio_path)
        // `workspace` drops here and on every early return above,
        // reclaiming all intermediate artifacts.
    }

    fn fetch(&self, url: &str, dir: &Path) -> Result<PathBuf, PipelineError> {
        self.reporter.stage_started(PipelineStage::Fetch);

        let reporter = Arc::clone(&self.reporter);
        let hook: FetchProgressFn = Box::new(move |event| {
            let percent = sanitize_percent(event.percent);
            match event.status {
                FetchStatus::Downloading => reporter.stage_progress(
                    PipelineStage::Fetch,
                    percent,
                    event.eta.as_deref(),
                ),
                FetchStatus::Finished => {
                    reporter.stage_progress(PipelineStage::Fetch, 1.0, None)
                }
            }
        });

        match self.fetcher.fetch(url, dir, Some(&hook)) {
            Ok(Some(path)) => {
                self.reporter.stage_finished(PipelineStage::Fetch);
                Ok(path)
            }
            Ok(None) => Err(PipelineError::DownloadFailed),
            Err(e) => {
                log::error!("unexpected error during download: {e}");
                Err(PipelineError::DownloadFailed)
            }
        }
    }

    fn extract(&self, video_path: &Path, dir: &Path) -> Result<PathBuf, PipelineError> {
        self.reporter.stage_started(PipelineStage::Extract);

        let video_name = video_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "media".to_string());
        let audio_path = dir.join(format!("{video_name}.wav"));

        match self.extractor.extract(video_path, &audio_path) {
            Ok(Some(path)) => {
                self.reporter.stage_finished(PipelineStage::Extract);
                Ok(path)
            }
            Ok(None) => Err(PipelineError::NoAudioTrack),
            Err(e) => {
                log::error!("unexpected error during audio extraction: {e}");
                Err(PipelineError::NoAudioTrack)
            }
        }
    }

    fn classify(&self, audio_path: &Path) -> Result<Vec<Prediction>, PipelineError> {
        self.reporter.stage_started(PipelineStage::Classify);

        let results = self.classifier.classify(audio_path, self.top_k);
        if results.is_empty() {
            return Err(PipelineError::NothingClassified);
        }
        self.reporter.stage_finished(PipelineStage::Classify);
        Ok(results)
    }
}
