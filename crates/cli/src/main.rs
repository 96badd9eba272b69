use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::Parser;

use accentcheck_core::classification::domain::classifier::AccentClassifier;
use accentcheck_core::classification::domain::prediction::Prediction;
use accentcheck_core::extraction::infrastructure::ffmpeg_audio_extractor::FfmpegAudioExtractor;
use accentcheck_core::fetching::domain::media_fetcher::MediaFetcher;
use accentcheck_core::fetching::domain::video_url::clean_youtube_url;
use accentcheck_core::fetching::infrastructure::http_fetcher::HttpFetcher;
use accentcheck_core::fetching::infrastructure::ytdlp_fetcher::YtDlpFetcher;
use accentcheck_core::pipeline::analyze_accent_use_case::AnalyzeAccentUseCase;
use accentcheck_core::pipeline::progress::{LogProgressReporter, ProgressReporter};
use accentcheck_core::pipeline::stage::PipelineStage;
use accentcheck_core::shared::constants::{DEFAULT_TOP_K, MEDIA_EXTENSIONS};

/// English accent classification for public video URLs.
#[derive(Parser)]
#[command(name = "accentcheck")]
struct Cli {
    /// Public video URL to analyze.
    url: String,

    /// Number of top predictions to display.
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    top_k: usize,

    /// Directory holding the pretrained model bundle.
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Print results as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    // Fail fast on a missing or broken model bundle before any download.
    let classifier = AccentClassifier::shared(cli.model_dir.as_deref())?;
    if cli.top_k > classifier.num_labels() {
        log::warn!(
            "--top-k {} exceeds the model's {} labels; showing all of them",
            cli.top_k,
            classifier.num_labels()
        );
    }

    let url = clean_youtube_url(&cli.url).unwrap_or_else(|| cli.url.clone());
    if url != cli.url {
        log::info!("canonicalized URL to {url}");
    }

    // Keep stderr clean for machine-readable runs; progress still goes to
    // the log where RUST_LOG surfaces it.
    let reporter: Arc<dyn ProgressReporter> = if cli.json {
        Arc::new(LogProgressReporter)
    } else {
        Arc::new(StderrProgressReporter)
    };

    let use_case = AnalyzeAccentUseCase::new(
        select_fetcher(&url),
        Box::new(FfmpegAudioExtractor),
        classifier,
        reporter,
        cli.top_k,
    );

    let results = use_case.run(&url)?;
    display(&results, cli.json)?;
    Ok(())
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.top_k == 0 {
        return Err("--top-k must be at least 1".into());
    }
    if !cli.url.starts_with("http://") && !cli.url.starts_with("https://") {
        return Err(format!("URL must be http(s), got '{}'", cli.url).into());
    }
    if let Some(dir) = &cli.model_dir {
        if !dir.is_dir() {
            return Err(format!("Model directory not found: {}", dir.display()).into());
        }
    }
    Ok(())
}

/// Direct links to media files download over plain HTTP; everything else
/// goes through yt-dlp.
fn select_fetcher(url: &str) -> Box<dyn MediaFetcher> {
    if is_direct_media_url(url) {
        Box::new(HttpFetcher)
    } else {
        Box::new(YtDlpFetcher::new())
    }
}

fn is_direct_media_url(url: &str) -> bool {
    let base = url.split(['?', '#']).next().unwrap_or(url);
    Path::new(base)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| MEDIA_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn display(results: &[Prediction], json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(results)?);
        return Ok(());
    }

    let Some(top) = results.first() else {
        // The use case maps an empty result to a stage failure, so this is
        // unreachable in practice; stay graceful anyway.
        println!("No predictions.");
        return Ok(());
    };
    println!("Analysis complete.");
    println!(
        "Predicted accent: {} ({:.1}% confidence)",
        top.label,
        top.score * 100.0
    );
    println!();
    println!("Top predictions:");
    for prediction in results {
        println!(
            "  {:<20} {:>5.1}%",
            prediction.label,
            prediction.score * 100.0
        );
    }
    Ok(())
}

/// Renders stage progress as single-line updates on stderr.
struct StderrProgressReporter;

impl ProgressReporter for StderrProgressReporter {
    fn stage_started(&self, stage: PipelineStage) {
        eprintln!(
            "Step {}/{}: {}...",
            stage.number(),
            PipelineStage::COUNT,
            stage.title()
        );
    }

    fn stage_progress(&self, stage: PipelineStage, percent: f64, eta: Option<&str>) {
        match eta {
            Some(eta) => eprint!("\r{}... {:.0}% (ETA {eta})", stage.title(), percent * 100.0),
            None => eprint!("\r{}... {:.0}%", stage.title(), percent * 100.0),
        }
    }

    fn stage_finished(&self, stage: PipelineStage) {
        eprintln!("\r{} complete.          ", stage.title());
    }
}
