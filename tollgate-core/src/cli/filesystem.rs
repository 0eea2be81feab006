use crate::filesystem::{FsCheckSettings, SystemProbe, evaluate};
use crate::logging::init_logging;
use crate::plugin::PluginOutput;
use clap::Parser;
use tracing::debug;

/// Warn about kernel filesystem modules that are not disabled
#[derive(Parser, Debug, Clone)]
#[command(name = "check_fs", version)]
pub struct FsArgs {
    /// Debug logging on stderr
    #[arg(short, long, env = "TOLLGATE_VERBOSE")]
    pub verbose: bool,

    /// Filesystems allowed to stay enabled
    #[arg(
        long = "white-list",
        visible_alias = "wl",
        env = "TOLLGATE_WHITE_LIST",
        num_args = 1..,
        value_delimiter = ',',
        default_values = ["btrfs", "cifs", "nfs"]
    )]
    pub white_list: Vec<String>,
}

impl From<FsArgs> for FsCheckSettings {
    fn from(args: FsArgs) -> Self {
        Self {
            white_list: args.white_list,
        }
    }
}

pub fn run(args: FsArgs) -> PluginOutput {
    init_logging(args.verbose);
    debug!(?args, "check_fs arguments");

    evaluate(&SystemProbe::default(), &FsCheckSettings::from(args))
}
