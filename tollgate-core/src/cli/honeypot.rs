use crate::honeypot::{HoneypotError, HoneypotSettings, evaluate};
use crate::logging::init_logging;
use crate::plugin::PluginOutput;
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;
use tracing::debug;

pub const DEFAULT_CONFIG: &str = "/etc/apache2/apache2.conf";
pub const DEFAULT_ENV_FILE: &str = "/etc/apache2/envvars";

/// Count hits on a honeypot URL in the Apache access logs
#[derive(Parser, Debug, Clone)]
#[command(name = "check_honeypot", version)]
pub struct HoneypotArgs {
    /// Debug logging on stderr
    #[arg(short, long, env = "TOLLGATE_VERBOSE")]
    pub verbose: bool,

    /// Apache main configuration file
    #[arg(short, long, env = "TOLLGATE_CONFIG", default_value = DEFAULT_CONFIG)]
    pub path: PathBuf,

    /// Shell file exporting the variables used in the configuration
    #[arg(
        short,
        long,
        env = "TOLLGATE_ENV_FILE",
        num_args = 0..=1,
        default_missing_value = DEFAULT_ENV_FILE
    )]
    pub env: Option<PathBuf>,

    /// Only read the logs of this virtual host
    #[arg(long, visible_alias = "vh", env = "TOLLGATE_VHOST")]
    pub vhost: Option<String>,

    /// Decoy URL path, e.g. /wp-login.php
    #[arg(long, visible_alias = "hp", env = "TOLLGATE_HONEYPOT")]
    pub honeypot: String,

    /// Look-back window: 1-99 followed by d, h or m
    #[arg(long, env = "TOLLGATE_PERIOD", default_value = "1h")]
    pub period: String,
}

impl TryFrom<HoneypotArgs> for HoneypotSettings {
    type Error = HoneypotError;

    fn try_from(args: HoneypotArgs) -> Result<Self, Self::Error> {
        Ok(Self {
            period: args.period.parse()?,
            config_path: args.path,
            env_file: args.env,
            vhost: args.vhost,
            honeypot: args.honeypot,
        })
    }
}

pub fn run(args: HoneypotArgs) -> PluginOutput {
    init_logging(args.verbose);
    debug!(?args, "check_honeypot arguments");

    // The period is validated before any file is opened.
    match HoneypotSettings::try_from(args) {
        Ok(settings) => evaluate(&settings, Utc::now()),
        Err(e) => PluginOutput::message(e.status(), e),
    }
}
