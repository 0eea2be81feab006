use anyhow::{Context, bail};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to execute command: {command}")]
    Command {
        command: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to read kernel module directory {path}: {source}")]
    ModuleDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to determine kernel release: {0}")]
    KernelRelease(#[from] nix::Error),
}

/// What the filesystem check needs to know about kernel modules.
pub trait ModuleProbe {
    /// Entry names under the running kernel's `kernel/fs` module directory.
    fn filesystem_entries(&self) -> Result<Vec<String>, ProbeError>;

    /// Output of `modprobe -n -v <module>`.
    fn dry_run_install(&self, module: &str) -> Result<String, ProbeError>;

    /// Names of the currently loaded modules.
    fn loaded_modules(&self) -> Result<Vec<String>, ProbeError>;
}

/// Probes the live system.
#[derive(Debug, Clone)]
pub struct SystemProbe {
    modules_root: PathBuf,
}

impl SystemProbe {
    pub const MODULES_ROOT: &'static str = "/lib/modules";

    pub fn new(modules_root: impl Into<PathBuf>) -> Self {
        Self {
            modules_root: modules_root.into(),
        }
    }

    fn filesystem_dir(&self) -> Result<PathBuf, ProbeError> {
        let uts = nix::sys::utsname::uname()?;
        Ok(self
            .modules_root
            .join(uts.release())
            .join("kernel")
            .join("fs"))
    }
}

impl Default for SystemProbe {
    fn default() -> Self {
        Self::new(Self::MODULES_ROOT)
    }
}

impl ModuleProbe for SystemProbe {
    fn filesystem_entries(&self) -> Result<Vec<String>, ProbeError> {
        let dir = self.filesystem_dir()?;
        let mut entries = read_entries(&dir).map_err(|source| ProbeError::ModuleDir {
            path: dir.clone(),
            source,
        })?;
        entries.sort();
        debug!(path = %dir.display(), count = entries.len(), "listed filesystem modules");
        Ok(entries)
    }

    fn dry_run_install(&self, module: &str) -> Result<String, ProbeError> {
        run("modprobe", &["-n", "-v", module])
    }

    fn loaded_modules(&self) -> Result<Vec<String>, ProbeError> {
        run("lsmod", &[]).map(|out| parse_lsmod(&out))
    }
}

fn read_entries(dir: &Path) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        names.push(entry?.file_name().to_string_lossy().into_owned());
    }
    Ok(names)
}

/// First column of every `lsmod` row, header excluded.
pub fn parse_lsmod(output: &str) -> Vec<String> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

fn run(program: &str, args: &[&str]) -> Result<String, ProbeError> {
    let command = std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ");

    capture(program, args).map_err(|source| ProbeError::Command {
        command: command.clone(),
        source,
    })
}

fn capture(program: &str, args: &[&str]) -> anyhow::Result<String> {
    let output = Command::new(program)
        .args(args)
        .output()
        .with_context(|| format!("failed to spawn {program}"))?;

    if !output.status.success() {
        bail!(
            "{program} exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    String::from_utf8(output.stdout).with_context(|| format!("{program} printed invalid UTF-8"))
}
