use crate::conf::error::ConfigError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub type EnvMap = BTreeMap<String, String>;

static EXPORT_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*export\s+([A-Za-z_][A-Za-z0-9_]*)=(.*)$").expect("valid export regex")
});

/// Suffix expansion is not supported; the token is dropped from values.
const SUFFIX_TOKEN: &str = "$SUFFIX";

/// Loads a shell `envvars` style file (e.g. `/etc/apache2/envvars`).
pub fn load_env_file(path: &Path) -> Result<EnvMap, ConfigError> {
    let s = fs::read_to_string(path).map_err(|e| ConfigError::EnvFile {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(parse_env(&s))
}

/// Collects `export NAME=VALUE` lines. Anything else is ignored; a name
/// exported twice keeps its last value.
pub fn parse_env(text: &str) -> EnvMap {
    let mut vars = EnvMap::new();

    for line in text.lines() {
        let Some(caps) = EXPORT_LINE.captures(line) else {
            continue;
        };
        let value = caps[2].trim_end().replace(SUFFIX_TOKEN, "");
        vars.insert(caps[1].to_string(), unquote(&value).to_string());
    }

    vars
}

fn unquote(value: &str) -> &str {
    for q in ['"', '\''] {
        if let Some(inner) = value.strip_prefix(q).and_then(|v| v.strip_suffix(q)) {
            return inner;
        }
    }
    value
}
