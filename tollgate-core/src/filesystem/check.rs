use crate::filesystem::probe::{ModuleProbe, ProbeError};
use crate::plugin::{PluginOutput, Status};
use std::collections::HashSet;
use tracing::{debug, error};

/// Entries of `kernel/fs` that are not filesystems.
pub const NON_FILESYSTEM_ENTRIES: &[&str] = &[
    "nls",
    "pstore",
    "cachefiles",
    "dlm",
    "fscache",
    "lockd",
    "nfs_common",
    "nfsd",
    "quota",
    "binfmt_misc",
];

pub const DEFAULT_WHITELIST: &[&str] = &["btrfs", "cifs", "nfs"];

const MODULE_SUFFIXES: &[&str] = &[".ko.zst", ".ko.xz", ".ko.gz", ".ko"];

/// Programs an `install` rule may run to make loading a module a no-op.
const NOOP_INSTALLERS: &[&str] = &["/bin/true", "/bin/false", "/usr/bin/true", "/usr/bin/false"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsCheckSettings {
    pub white_list: Vec<String>,
}

impl Default for FsCheckSettings {
    fn default() -> Self {
        Self {
            white_list: DEFAULT_WHITELIST.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// `vfat.ko.xz` -> `vfat`; directories come through unchanged.
pub fn module_name(entry: &str) -> &str {
    MODULE_SUFFIXES
        .iter()
        .find_map(|suffix| entry.strip_suffix(suffix))
        .unwrap_or(entry)
}

/// Kernel modules that provide a filesystem.
pub fn module_aliases(filesystem: &str) -> Vec<&str> {
    match filesystem {
        "fuse" => vec!["cuse"],
        "overlayfs" => vec!["overlay"],
        "fat" => vec!["msdos"],
        "quota" => vec!["quota_v1", "quota_v2"],
        "afs" => vec!["kafs"],
        other => vec![other],
    }
}

/// True when `modprobe -n -v` output shows loading is replaced by a no-op.
pub fn is_disabled_rule(modprobe_output: &str) -> bool {
    modprobe_output.lines().any(|line| {
        let mut words = line.split_whitespace();
        words.next() == Some("install")
            && words.next().is_some_and(|cmd| NOOP_INSTALLERS.contains(&cmd))
    })
}

/// Filesystems outside the whitelist with at least one module not disabled.
pub fn enabled_filesystems<P: ModuleProbe>(
    probe: &P,
    settings: &FsCheckSettings,
) -> Result<Vec<String>, ProbeError> {
    let available: Vec<String> = probe
        .filesystem_entries()?
        .iter()
        .map(|entry| module_name(entry))
        .filter(|name| !NON_FILESYSTEM_ENTRIES.contains(name))
        .map(str::to_string)
        .collect();
    debug!(?available, "filesystems found");

    let candidates: Vec<&String> = available
        .iter()
        .filter(|fs| !settings.white_list.contains(*fs))
        .collect();
    debug!(?candidates, "filesystems outside the whitelist");

    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let loaded: HashSet<String> = probe.loaded_modules()?.into_iter().collect();

    let mut enabled = Vec::new();
    for fs in candidates {
        let mut all_disabled = true;
        for module in module_aliases(fs) {
            let rule = probe.dry_run_install(module)?;
            let disabled = is_disabled_rule(&rule) && !loaded.contains(module);
            debug!(filesystem = %fs, module, disabled, "checked module");
            if !disabled {
                all_disabled = false;
                break;
            }
        }
        if !all_disabled {
            enabled.push(fs.clone());
        }
    }

    debug!(?enabled, "enabled filesystems");
    Ok(enabled)
}

pub fn evaluate<P: ModuleProbe>(probe: &P, settings: &FsCheckSettings) -> PluginOutput {
    match enabled_filesystems(probe, settings) {
        Ok(enabled) if enabled.is_empty() => {
            PluginOutput::message(Status::Ok, "all unused filesystems disabled")
        }
        Ok(enabled) => PluginOutput::message(
            Status::Warning,
            format!(
                "The following filesystems should be disabled: {}",
                enabled.join(", ")
            ),
        ),
        Err(e) => {
            error!(error = %e, "filesystem probe failed");
            PluginOutput::message(Status::Critical, e)
        }
    }
}
