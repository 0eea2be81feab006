//! Filesystem check
//!
//! Lists the filesystem drivers shipped with the running kernel and warns
//! about every one that is neither whitelisted nor disabled through a
//! modprobe `install /bin/true` rule.

mod check;
mod probe;


pub use check::{
    DEFAULT_WHITELIST, FsCheckSettings, NON_FILESYSTEM_ENTRIES, enabled_filesystems, evaluate,
    is_disabled_rule, module_aliases, module_name,
};
pub use probe::{ModuleProbe, ProbeError, SystemProbe, parse_lsmod};
