use crate::conf::env::EnvMap;
use crate::conf::error::ConfigError;
use crate::conf::tree::ConfigTree;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid placeholder regex"));

/// Upper bound on nested expansions (a value whose substitution contains
/// another placeholder).
const MAX_DEPTH: usize = 16;

/// Rewrites every scalar value and section label of `tree` in place.
pub fn substitute_tree(tree: &mut ConfigTree, env: &EnvMap) -> Result<(), ConfigError> {
    tree.try_for_each_text_mut(&mut |text: &mut String| -> Result<(), ConfigError> {
        if PLACEHOLDER.is_match(text) {
            *text = substitute_text(text, env)?;
        }
        Ok(())
    })
}

/// Replaces each `${NAME}` in `text` with `env[NAME]`, repeating until no
/// placeholder is left.
pub fn substitute_text(text: &str, env: &EnvMap) -> Result<String, ConfigError> {
    let mut current = text.to_string();

    for _ in 0..MAX_DEPTH {
        if !PLACEHOLDER.is_match(&current) {
            return Ok(current);
        }
        current = replace_pass(&current, env)?;
    }

    match PLACEHOLDER.captures(&current) {
        Some(caps) => Err(ConfigError::RecursiveVariable {
            name: caps[1].to_string(),
        }),
        None => Ok(current),
    }
}

fn replace_pass(text: &str, env: &EnvMap) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&text[last..whole.start()]);
        out.push_str(lookup(&caps, env)?);
        last = whole.end();
    }

    out.push_str(&text[last..]);
    Ok(out)
}

fn lookup<'a>(caps: &Captures<'_>, env: &'a EnvMap) -> Result<&'a str, ConfigError> {
    let name = &caps[1];
    env.get(name)
        .map(String::as_str)
        .ok_or_else(|| ConfigError::UndefinedVariable {
            name: name.to_string(),
        })
}
