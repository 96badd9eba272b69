/// Directory name of the pretrained accent model bundle, looked up under
/// `models/` beside the process and in the user data directory.
pub const MODEL_DIR_NAME: &str = "accent-id";

pub const MODEL_FILENAME: &str = "accent-id.onnx";
pub const LABELS_FILENAME: &str = "labels.txt";

/// Sample rate the accent model was trained at; extraction and waveform
/// decoding both resample to this.
pub const CLASSIFY_SAMPLE_RATE: u32 = 16000;

pub const DEFAULT_TOP_K: usize = 5;

/// Downloader binary driven for non-direct URLs.
pub const YTDLP_BINARY: &str = "yt-dlp";

/// Download and fragment retry count passed to the downloader.
pub const DOWNLOAD_RETRIES: u32 = 10;

pub const MEDIA_EXTENSIONS: &[&str] = &[
    "mp4", "webm", "mkv", "mov", "avi", "m4a", "mp3", "wav", "flac", "ogg",
];
