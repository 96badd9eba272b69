use super::stage::PipelineStage;

/// Observer for pipeline progress.
///
/// Decouples the use case from any particular output mechanism (stderr,
/// log crate, embedding host) so callers can render progress without
/// changing the orchestration code. Implementations use interior
/// mutability if they accumulate state; the use case shares one reporter
/// across its stage hooks.
pub trait ProgressReporter: Send + Sync {
    fn stage_started(&self, stage: PipelineStage);

    /// `percent` has already been sanitized into [0.0, 1.0].
    fn stage_progress(&self, stage: PipelineStage, percent: f64, eta: Option<&str>);

    fn stage_finished(&self, stage: PipelineStage);
}

/// Reporter that discards all events (embedding hosts, tests).
pub struct NullProgressReporter;

impl ProgressReporter for NullProgressReporter {
    fn stage_started(&self, _stage: PipelineStage) {}
    fn stage_progress(&self, _stage: PipelineStage, _percent: f64, _eta: Option<&str>) {}
    fn stage_finished(&self, _stage: PipelineStage) {}
}

/// Reporter that forwards events to the `log` crate.
pub struct LogProgressReporter;

impl ProgressReporter for LogProgressReporter {
    fn stage_started(&self, stage: PipelineStage) {
        log::info!(
            "step {}/{}: {}...",
            stage.number(),
            PipelineStage::COUNT,
            stage.title()
        );
    }

    fn stage_progress(&self, stage: PipelineStage, percent: f64, eta: Option<&str>) {
        match eta {
            Some(eta) => log::info!("{}: {:.0}% (ETA {eta})", stage.title(), percent * 100.0),
            None => log::info!("{}: {:.0}%", stage.title(), percent * 100.0),
        }
    }

    fn stage_finished(&self, stage: PipelineStage) {
        log::info!("{} complete", stage.title());
    }
}

/// Sanitize a progress fraction from an upstream source: anything outside
/// [0.0, 1.0], or NaN, is reported as 0.0 rather than propagated as
/// invalid data.
pub fn sanitize_percent(percent: f64) -> f64 {
    if percent.is_nan() || !(0.0..=1.0).contains(&percent) {
        0.0
    } else {
        percent
    }
}
