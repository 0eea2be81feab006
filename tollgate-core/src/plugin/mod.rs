//! Monitoring-plugin contract: a status, its exit code, and the lines
//! written to stdout.

mod output;
mod status;


pub use output::PluginOutput;
pub use status::Status;
