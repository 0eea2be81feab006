use crate::conf::error::ConfigError;
use crate::conf::loader::LoaderOptions;
use glob::glob;
use std::path::{Path, PathBuf};

/// Discovers files matching a glob pattern.
///
/// Searches the filesystem for all files that match the given glob pattern
/// and returns their paths in sorted order. Directories and unreadable paths
/// are filtered out.
///
/// # Arguments
///
/// * `root` - Directory the pattern is relative to
/// * `glob_pattern` - A glob pattern string (e.g., `"conf-enabled/*.conf"`)
///
/// # Errors
///
/// Returns `ConfigError::Glob` if the pattern is malformed or cannot be parsed.
pub fn discover(root: &Path, glob_pattern: &str) -> Result<Vec<PathBuf>, ConfigError> {
    let pattern = &resolve_glob(root, glob_pattern);
    let mut paths: Vec<_> = glob(pattern)
        .map_err(|e| ConfigError::Glob {
            pattern: pattern.to_string(),
            source: e,
        })?
        .filter_map(Result::ok)
        .filter(|p| p.is_file())
        .collect();

    paths.sort();
    Ok(paths)
}

/// Resolves a glob pattern relative to a root directory.
///
/// An absolute `pattern` replaces `root` entirely, the same way
/// [`Path::join`] does.
pub fn resolve_glob(root: &Path, pattern: &str) -> String {
    root.join(pattern).to_string_lossy().into_owned()
}

pub fn has_glob_meta(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// Expands the argument of an `Include` directive into concrete files.
///
/// Relative targets are tried against the including file's directory (when
/// `include_relative` is set) and then each entry of `config_path`, first
/// hit wins. An empty result means nothing matched; the caller decides
/// whether that is an error.
pub fn expand_include(
    target: &str,
    including_file: &Path,
    options: &LoaderOptions,
) -> Result<Vec<PathBuf>, ConfigError> {
    for base in include_bases(including_file, options) {
        if has_glob_meta(target) {
            let found = discover(&base, target)?;
            if !found.is_empty() {
                return Ok(found);
            }
            continue;
        }

        let candidate = base.join(target);
        if candidate.is_dir() {
            if !options.include_directories {
                return Err(ConfigError::IncludeDirectory { target: candidate });
            }
            return discover(&candidate, "*");
        }
        if candidate.exists() {
            return Ok(vec![candidate]);
        }
    }

    Ok(Vec::new())
}

fn include_bases(including_file: &Path, options: &LoaderOptions) -> Vec<PathBuf> {
    let mut bases = Vec::new();

    if options.include_relative {
        if let Some(parent) = including_file.parent() {
            bases.push(parent.to_path_buf());
        }
    }
    bases.extend(options.config_path.iter().cloned());

    if bases.is_empty() {
        bases.push(PathBuf::from("."));
    }
    bases
}
