use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::fetching::domain::media_fetcher::{FetchEvent, FetchProgressFn, MediaFetcher};
use crate::shared::constants::{DOWNLOAD_RETRIES, YTDLP_BINARY};

// Fixed output stem inside the (per-run, otherwise empty) download
// directory; the extension is whatever the downloader settles on.
const OUTPUT_STEM: &str = "media";

/// Media fetcher that drives the external `yt-dlp` binary.
///
/// Downloads best video+audio merged to mp4 into the output directory,
/// with download and fragment retries for network resilience. Progress
/// lines from `--newline` output are parsed into fetch events.
pub struct YtDlpFetcher {
    binary: String,
}

impl YtDlpFetcher {
    pub fn new() -> Self {
        Self::with_binary(YTDLP_BINARY)
    }

    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for YtDlpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaFetcher for YtDlpFetcher {
    fn fetch(
        &self,
        url: &str,
        output_dir: &Path,
        on_progress: Option<&FetchProgressFn>,
    ) -> Result<Option<PathBuf>, Box<dyn std::error::Error>> {
        if url.trim().is_empty() {
            log::error!("no URL provided");
            return Ok(None);
        }

        log::info!("attempting to download video from URL: {url}");
        let template = output_dir.join(format!("{OUTPUT_STEM}.%(ext)s"));
        let mut child = Command::new(&self.binary)
            .arg("--format")
            .arg("bestvideo+bestaudio/best")
            .arg("--merge-output-format")
            .arg("mp4")
            .arg("--output")
            .arg(&template)
            .arg("--newline")
            .arg("--no-colors")
            .arg("--no-playlist")
            .arg("--quiet")
            .arg("--progress")
            .arg("--retries")
            .arg(DOWNLOAD_RETRIES.to_string())
            .arg("--fragment-retries")
            .arg(DOWNLOAD_RETRIES.to_string())
            .arg(url)
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        if let Some(stdout) = child.stdout.take() {
            for line in BufReader::new(stdout).lines() {
                let line = line?;
                if let Some(event) = parse_progress_line(&line) {
                    if let Some(callback) = on_progress {
                        callback(event);
                    }
                }
            }
        }

        let status = child.wait()?;
        if !status.success() {
            log::warn!(
                "could not download video; it may be private, unavailable, \
                 or a network issue occurred (yt-dlp exited with {status})"
            );
            return Ok(None);
        }
        if let Some(callback) = on_progress {
            callback(FetchEvent::finished());
        }

        match find_output(output_dir) {
            Some(path) => {
                log::info!("successfully downloaded video to: {}", path.display());
                Ok(Some(path))
            }
            None => {
                log::warn!(
                    "downloader reported success but produced no file in {}",
                    output_dir.display()
                );
                Ok(None)
            }
        }
    }
}

/// Parse one `--newline` progress line, e.g.
/// `[download]  42.3% of 5.30MiB at 1.21MiB/s ETA 00:03`.
///
/// Returns `None` for non-progress lines. An unparseable percent is
/// reported as 0.0 rather than propagated.
fn parse_progress_line(line: &str) -> Option<FetchEvent> {
    let rest = line.strip_prefix("[download]")?.trim_start();
    if rest.starts_with("Destination:") || rest.contains("has already been downloaded") {
        return None;
    }

    let percent_token = rest.split_whitespace().next()?;
    let percent_str = percent_token.strip_suffix('%')?;
    let percent = match percent_str.parse::<f64>() {
        Ok(value) => value / 100.0,
        Err(_) => {
            log::warn!("could not parse percent string: {percent_str}");
            0.0
        }
    };

    let eta = rest
        .split_whitespace()
        .skip_while(|token| *token != "ETA")
        .nth(1)
        .map(str::to_string);

    Some(FetchEvent::downloading(percent, eta))
}

/// Find the downloaded file: the fixed stem with whatever extension the
/// downloader produced, preferring the merged mp4.
fn find_output(output_dir: &Path) -> Option<PathBuf> {
    let merged = output_dir.join(format!("{OUTPUT_STEM}.mp4"));
    if merged.is_file() {
        return Some(merged);
    }

    let entries = std::fs::read_dir(output_dir).ok()?;
    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .map(|stem| stem == OUTPUT_STEM)
                    .unwrap_or(false)
        })
        .collect();
    candidates.sort();
    candidates.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetching::domain::media_fetcher::FetchStatus;
    use rstest::rstest;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    // ── Progress parsing ──────────────────────────────────────────────

    #[test]
    fn test_parse_progress_line_with_eta() {
        let event =
            parse_progress_line("[download]  42.3% of 5.30MiB at 1.21MiB/s ETA 00:03").unwrap();
        assert_eq!(event.status, FetchStatus::Downloading);
        assert!((event.percent - 0.423).abs() < 1e-9);
        assert_eq!(event.eta.as_deref(), Some("00:03"));
    }

    #[test]
    fn test_parse_progress_line_complete() {
        let event = parse_progress_line("[download] 100% of 5.30MiB in 00:04").unwrap();
        assert!((event.percent - 1.0).abs() < 1e-9);
        assert_eq!(event.eta, None);
    }

    #[test]
    fn test_parse_progress_line_unparseable_percent_defaults_to_zero() {
        let event = parse_progress_line("[download]  N/A% of ~3MiB").unwrap();
        assert_eq!(event.percent, 0.0);
    }

    #[rstest]
    #[case::destination("[download] Destination: /tmp/x/media.mp4")]
    #[case::already("[download] /tmp/x/media.mp4 has already been downloaded")]
    #[case::other_tag("[info] Downloading format 137")]
    #[case::no_percent_suffix("[download] resuming at byte 1024")]
    #[case::empty("")]
    fn test_parse_progress_line_ignores(#[case] line: &str) {
        assert_eq!(parse_progress_line(line), None);
    }

    // ── Output resolution ─────────────────────────────────────────────

    #[test]
    fn test_find_output_prefers_merged_mp4() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("media.webm"), b"w").unwrap();
        std::fs::write(tmp.path().join("media.mp4"), b"m").unwrap();
        assert_eq!(
            find_output(tmp.path()).unwrap(),
            tmp.path().join("media.mp4")
        );
    }

    #[test]
    fn test_find_output_any_extension() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("media.webm"), b"w").unwrap();
        assert_eq!(
            find_output(tmp.path()).unwrap(),
            tmp.path().join("media.webm")
        );
    }

    #[test]
    fn test_find_output_empty_dir() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(find_output(tmp.path()), None);
    }

    #[test]
    fn test_find_output_ignores_other_stems() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("other.mp4"), b"x").unwrap();
        assert_eq!(find_output(tmp.path()), None);
    }

    // ── Fetch contract ────────────────────────────────────────────────

    #[test]
    fn test_fetch_empty_url_returns_none() {
        let tmp = TempDir::new().unwrap();
        let fetcher = YtDlpFetcher::new();
        let result = fetcher.fetch("  ", tmp.path(), None).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_fetch_missing_binary_is_error() {
        let tmp = TempDir::new().unwrap();
        let fetcher = YtDlpFetcher::with_binary("yt-dlp-definitely-not-installed");
        let result = fetcher.fetch("https://example.com/v", tmp.path(), None);
        assert!(result.is_err());
    }

    #[test]
    fn test_fetch_failing_binary_returns_none() {
        // `false` ignores its arguments and exits nonzero, standing in for
        // a download failure.
        let tmp = TempDir::new().unwrap();
        let fetcher = YtDlpFetcher::with_binary("false");
        let result = fetcher
            .fetch("https://example.com/v", tmp.path(), None)
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_fetch_success_without_output_file_returns_none() {
        // `true` exits zero without downloading anything.
        let tmp = TempDir::new().unwrap();
        let fetcher = YtDlpFetcher::with_binary("true");

        let events: Arc<Mutex<Vec<FetchEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let hook: FetchProgressFn = Box::new(move |event| sink.lock().unwrap().push(event));

        let result = fetcher
            .fetch("https://example.com/v", tmp.path(), Some(&hook))
            .unwrap();
        assert!(result.is_none());
        // The finished event still fires on binary success.
        assert_eq!(
            events.lock().unwrap().last().map(|e| e.status),
            Some(FetchStatus::Finished)
        );
    }
}
