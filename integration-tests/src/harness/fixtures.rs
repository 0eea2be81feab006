use chrono::{DateTime, TimeDelta, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tollgate_core::honeypot::HoneypotSettings;

/// `[10/Oct/2000:13:55:36 +0000]` body for `%t`.
pub fn clf_time(at: DateTime<Utc>) -> String {
    at.format("%d/%b/%Y:%H:%M:%S +0000").to_string()
}

/// One `combined` line for a GET of `path`, `age` before `now`.
pub fn access_line(host: &str, path: &str, status: u16, now: DateTime<Utc>, age: TimeDelta) -> String {
    format!(
        "{host} - - [{}] \"GET {path} HTTP/1.1\" {status} 512 \"-\" \"Mozilla/5.0\"\n",
        clf_time(now - age)
    )
}

/// A throwaway Apache layout: `<root>/apache2.conf` plus whatever else a
/// test writes under the same directory.
pub struct ApacheSite {
    dir: TempDir,
}

impl ApacheSite {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create site directory"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.root().join("apache2.conf")
    }

    /// Writes `rel` below the site root. `{root}` in `contents` is replaced
    /// by the site root so configs can use absolute paths.
    pub fn write(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.root().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create fixture directory");
        }
        let root = self.root().display().to_string();
        fs::write(&path, contents.replace("{root}", &root)).expect("failed to write fixture");
        path
    }

    pub fn write_config(&self, contents: &str) -> PathBuf {
        self.write("apache2.conf", contents)
    }

    pub fn write_log(&self, rel: &str, lines: &[String]) -> PathBuf {
        self.write(rel, &lines.concat())
    }

    pub fn settings(&self, honeypot: &str, period: &str) -> HoneypotSettings {
        HoneypotSettings {
            config_path: self.config_path(),
            env_file: None,
            vhost: None,
            honeypot: honeypot.to_string(),
            period: period.parse().expect("valid period"),
        }
    }
}

impl Default for ApacheSite {
    fn default() -> Self {
        Self::new()
    }
}
