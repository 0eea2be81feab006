use crate::conf::discover::expand_include;
use crate::conf::env::{EnvMap, load_env_file};
use crate::conf::error::ConfigError;
use crate::conf::parse::parse_file;
use crate::conf::substitute::{substitute_text, substitute_tree};
use crate::conf::tree::{ConfigEntry, ConfigTree, ConfigValue, split_args};

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// How `Include` directives are resolved.
///
/// Built per call; there is no shared default instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderOptions {
    /// Honor `Include` / `IncludeOptional`.
    pub use_apache_include: bool,
    /// Try relative include targets against the including file's directory.
    pub include_relative: bool,
    /// Allow an include target to be a directory (all files in it, sorted).
    pub include_directories: bool,
    /// Extra directories searched for relative include targets, in order.
    pub config_path: Vec<PathBuf>,
}

impl LoaderOptions {
    /// Defaults for loading `root`: every include feature on, searching the
    /// root file's own directory.
    pub fn for_root(root: &Path) -> Self {
        let dir = root
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            use_apache_include: true,
            include_relative: true,
            include_directories: true,
            config_path: vec![dir],
        }
    }
}

struct LoadCtx<'a> {
    options: &'a LoaderOptions,
    env: Option<&'a EnvMap>,
    loading: Vec<PathBuf>,
}

/// Loads `root` and every file it transitively includes.
pub fn load_config(root: &Path, options: &LoaderOptions) -> Result<ConfigTree, ConfigError> {
    let mut ctx = LoadCtx {
        options,
        env: None,
        loading: Vec::new(),
    };
    load_file(root, &mut ctx)
}

/// Loads `root` and, when `env_file` is given, substitutes `${NAME}`
/// placeholders from it in every value of the resolved tree.
pub fn load_config_with_env(
    root: &Path,
    options: &LoaderOptions,
    env_file: Option<&Path>,
) -> Result<ConfigTree, ConfigError> {
    let Some(env_file) = env_file else {
        return load_config(root, options);
    };

    let env = load_env_file(env_file)?;
    debug!(path = %env_file.display(), vars = env.len(), "loaded environment file");

    let mut ctx = LoadCtx {
        options,
        env: Some(&env),
        loading: Vec::new(),
    };
    let mut tree = load_file(root, &mut ctx)?;
    substitute_tree(&mut tree, &env)?;
    Ok(tree)
}

fn load_file(path: &Path, ctx: &mut LoadCtx<'_>) -> Result<ConfigTree, ConfigError> {
    //--------------------------------------------------------------------------
    // Hard fail: IO and parsing
    //--------------------------------------------------------------------------
    let key = fs::canonicalize(path).map_err(|e| ConfigError::read_file(path, e))?;
    if ctx.loading.contains(&key) {
        return Err(ConfigError::IncludeCycle { path: key });
    }

    let parsed = parse_file(path)?;
    debug!(path = %path.display(), entries = parsed.len(), "parsed config file");

    if !ctx.options.use_apache_include {
        return Ok(parsed);
    }

    //--------------------------------------------------------------------------
    // Expand includes (hard fail)
    //--------------------------------------------------------------------------
    ctx.loading.push(key);
    let expanded = expand_includes(parsed, path, ctx);
    ctx.loading.pop();
    expanded
}

fn expand_includes(
    tree: ConfigTree,
    file: &Path,
    ctx: &mut LoadCtx<'_>,
) -> Result<ConfigTree, ConfigError> {
    let mut out = ConfigTree::new();

    for entry in tree.into_entries() {
        let optional = entry.is("IncludeOptional");
        if !(optional || entry.is("Include")) {
            out.push(expand_section(entry, file, ctx)?);
            continue;
        }

        let Some(raw) = entry.as_scalar() else {
            out.push(expand_section(entry, file, ctx)?);
            continue;
        };

        for target in split_args(raw) {
            let target = match ctx.env {
                Some(env) => substitute_text(&target, env)?,
                None => target,
            };

            let files = expand_include(&target, file, ctx.options)?;
            if files.is_empty() {
                if optional {
                    debug!(target = %target, "optional include matched nothing");
                    continue;
                }
                return Err(ConfigError::IncludeNotFound {
                    path: file.to_path_buf(),
                    target,
                });
            }

            for included in files {
                out.extend(load_file(&included, ctx)?);
            }
        }
    }

    Ok(out)
}

fn expand_section(
    entry: ConfigEntry,
    file: &Path,
    ctx: &mut LoadCtx<'_>,
) -> Result<ConfigEntry, ConfigError> {
    match entry.value {
        ConfigValue::Section { label, body } => Ok(ConfigEntry::section(
            entry.name,
            label,
            expand_includes(body, file, ctx)?,
        )),
        ConfigValue::Scalar(_) => Ok(entry),
    }
}
