use crate::conf::{LoaderOptions, load_config_with_env};
use crate::honeypot::aggregate::{HoneypotMatcher, HostCounts, count_hits};
use crate::honeypot::decision::decide;
use crate::honeypot::error::HoneypotError;
use crate::logs::{LogRecords, PeriodSpec, TimeWindow, locate_log_sources};
use crate::plugin::PluginOutput;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{Level, debug, enabled, error, info};

/// Everything one honeypot run needs, fixed before any file is touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoneypotSettings {
    pub config_path: PathBuf,
    pub env_file: Option<PathBuf>,
    pub vhost: Option<String>,
    pub honeypot: String,
    pub period: PeriodSpec,
}

/// Runs the pipeline against the clock value `now`.
pub fn run_at(settings: &HoneypotSettings, now: DateTime<Utc>) -> Result<HostCounts, HoneypotError> {
    ensure_file(&settings.config_path)?;

    //-------------------------------------------------------------------------
    // Configuration
    //-------------------------------------------------------------------------
    let root = settings.config_path.as_path();
    let options = LoaderOptions::for_root(root);
    let tree = load_config_with_env(root, &options, settings.env_file.as_deref())?;

    if enabled!(Level::DEBUG) {
        match serde_json::to_string(&tree) {
            Ok(json) => debug!(config = %json, "resolved configuration"),
            Err(e) => debug!(error = %e, "could not serialize resolved configuration"),
        }
    }

    //-------------------------------------------------------------------------
    // Logs
    //-------------------------------------------------------------------------
    let sources = locate_log_sources(&tree, settings.vhost.as_deref(), root)?;
    let window = TimeWindow::since(settings.period, now);
    debug!(
        sources = sources.len(),
        cutoff = %window.cutoff(),
        period = %settings.period,
        "scanning access logs"
    );

    let matcher = HoneypotMatcher::new(settings.honeypot.as_str());
    let counts = count_hits(&matcher, window.filter(LogRecords::new(sources)))?;

    if enabled!(Level::DEBUG) {
        if let Ok(json) = serde_json::to_string(&counts) {
            debug!(honeypot = matcher.path(), counts = %json, "host counts");
        }
    }

    info!(
        honeypot = matcher.path(),
        hosts = counts.len(),
        hits = counts.total(),
        "honeypot scan complete"
    );
    Ok(counts)
}

/// Runs the check and maps the result, or the error that stopped it, to
/// plugin output.
pub fn evaluate(settings: &HoneypotSettings, now: DateTime<Utc>) -> PluginOutput {
    match run_at(settings, now) {
        Ok(counts) => decide(&counts),
        Err(e) => {
            error!(error = %e, "honeypot check failed");
            PluginOutput::message(e.status(), e)
        }
    }
}

fn ensure_file(path: &Path) -> Result<(), HoneypotError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(HoneypotError::NotAFile {
            path: path.to_path_buf(),
        })
    }
}
