use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::fetching::domain::media_fetcher::{FetchEvent, FetchProgressFn, MediaFetcher};

const CHUNK_SIZE: usize = 1024 * 1024;

/// Media fetcher for direct media URLs (e.g. a plain `.mp4` link).
///
/// Streams the response body to a `.part` file and renames it into place
/// on completion, so a failed download never leaves a half-written file
/// behind. Progress events carry the completed fraction when the server
/// sends Content-Length, 0.0 otherwise.
pub struct HttpFetcher;

impl MediaFetcher for HttpFetcher {
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

        let dest = output_dir.join(file_name_from_url(url));
        let temp_path = dest.with_extension("part");

        let result = download_inner(url, &dest, &temp_path, on_progress);

        // Never leave a .part file behind on failure.
        if !matches!(result, Ok(true)) {
            let _ = fs::remove_file(&temp_path);
        }

        match result {
            Ok(true) => {
                if let Some(callback) = on_progress {
                    callback(FetchEvent::finished());
                }
                log::info!("downloaded {url} to {}", dest.display());
                Ok(Some(dest))
            }
            Ok(false) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Returns `Ok(false)` for HTTP-level failures (logged: the URL is the
/// user's to fix), errors for filesystem failures.
fn download_inner(
    url: &str,
    dest: &Path,
    temp_path: &Path,
    on_progress: Option<&FetchProgressFn>,
) -> Result<bool, Box<dyn std::error::Error>> {
    let response = match reqwest::blocking::get(url).and_then(|r| r.error_for_status()) {
        Ok(response) => response,
        Err(e) => {
            log::warn!("could not download {url}: {e}");
            return Ok(false);
        }
    };

    let total = response.content_length().unwrap_or(0);
    let mut downloaded: u64 = 0;

    let mut file = fs::File::create(temp_path)?;

    // Stream in chunks rather than buffering the whole body; media files
    // are large and this keeps progress reporting honest.
    let mut reader = response;
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n])?;
        downloaded += n as u64;
        if let Some(callback) = on_progress {
            let percent = if total > 0 {
                downloaded as f64 / total as f64
            } else {
                0.0
            };
            callback(FetchEvent::downloading(percent, None));
        }
    }

    file.flush()?;
    drop(file);

    fs::rename(temp_path, dest)?;
    Ok(true)
}

/// Derive a file name from the URL path, ignoring query and fragment.
fn file_name_from_url(url: &str) -> String {
    let base = url.split(['?', '#']).next().unwrap_or(url);
    base.rsplit('/')
        .next()
        .filter(|name| !name.is_empty() && name.contains('.'))
        .map(str::to_string)
        .unwrap_or_else(|| "media.bin".to_string())
}
