use std::io;

use thiserror::Error;

/// One stage of the analysis pipeline, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Fetch,
    Extract,
    Classify,
}

impl PipelineStage {
    pub const COUNT: usize = 3;

    /// 1-based position for "Step N/3" style display.
    pub fn number(self) -> usize {
        match self {
            PipelineStage::Fetch => 1,
            PipelineStage::Extract => 2,
            PipelineStage::Classify => 3,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            PipelineStage::Fetch => "Downloading video",
            PipelineStage::Extract => "Extracting audio",
            PipelineStage::Classify => "Analyzing accent",
        }
    }
}

/// User-facing pipeline failures, one distinct reason per stage, so the
/// user knows what to retry: the URL, the video's audio, or the audio's
/// content.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("could not download the video; check that the URL is public and valid")]
    DownloadFailed,
    #[error("failed to extract audio; the video might not have an audio track")]
    NoAudioTrack,
    #[error("could not classify the accent; the audio may be too short or silent")]
    NothingClassified,
    #[error("failed to prepare a temporary workspace: {0}")]
    Workspace(#[source] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_numbers_are_sequential() {
        assert_eq!(PipelineStage::Fetch.number(), 1);
        assert_eq!(PipelineStage::Extract.number(), 2);
        assert_eq!(PipelineStage::Classify.number(), 3);
        assert_eq!(PipelineStage::COUNT, 3);
    }

    #[test]
    fn test_error_messages_are_stage_distinct() {
        let download = PipelineError::DownloadFailed.to_string();
        let audio = PipelineError::NoAudioTrack.to_string();
        let classify = PipelineError::NothingClassified.to_string();
        assert_ne!(download, audio);
        assert_ne!(audio, classify);
        assert!(download.contains("URL"));
        assert!(audio.contains("audio track"));
    }
}
