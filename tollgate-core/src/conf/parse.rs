use crate::conf::error::ConfigError;
use crate::conf::tree::{ConfigEntry, ConfigTree};
use std::fs;
use std::path::Path;

struct OpenSection {
    name: String,
    label: String,
    line: usize,
    body: ConfigTree,
}

/// Reads and parses a single configuration file. Include directives are left
/// in the tree untouched; the loader expands them.
pub fn parse_file(path: &Path) -> Result<ConfigTree, ConfigError> {
    let s = fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
    parse_str(path, &s)
}

pub fn parse_str(path: &Path, text: &str) -> Result<ConfigTree, ConfigError> {
    let mut root = ConfigTree::new();
    let mut stack: Vec<OpenSection> = Vec::new();

    for (line_no, line) in logical_lines(text) {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        //---------------------------------------------------------------------
        // Section close
        //---------------------------------------------------------------------
        if let Some(rest) = line.strip_prefix("</") {
            let Some(name) = rest.strip_suffix('>').map(str::trim) else {
                return Err(ConfigError::parse(path, line_no, "section closer missing '>'"));
            };
            let Some(open) = stack.pop() else {
                return Err(ConfigError::parse(
                    path,
                    line_no,
                    format!("unexpected </{name}> without matching opener"),
                ));
            };
            if !open.name.eq_ignore_ascii_case(name) {
                return Err(ConfigError::parse(
                    path,
                    line_no,
                    format!("expected </{}> but found </{name}>", open.name),
                ));
            }
            current(&mut root, &mut stack).push(ConfigEntry::section(
                open.name, open.label, open.body,
            ));
            continue;
        }

        //---------------------------------------------------------------------
        // Section open
        //---------------------------------------------------------------------
        if let Some(rest) = line.strip_prefix('<') {
            let Some(inner) = rest.strip_suffix('>') else {
                return Err(ConfigError::parse(path, line_no, "section opener missing '>'"));
            };
            let (name, label) = split_directive(inner.trim());
            validate_name(path, line_no, name)?;
            stack.push(OpenSection {
                name: name.to_string(),
                label: label.to_string(),
                line: line_no,
                body: ConfigTree::new(),
            });
            continue;
        }

        //---------------------------------------------------------------------
        // Plain directive
        //---------------------------------------------------------------------
        let (name, value) = split_directive(line);
        validate_name(path, line_no, name)?;
        current(&mut root, &mut stack).push(ConfigEntry::scalar(name, value));
    }

    if let Some(open) = stack.pop() {
        return Err(ConfigError::parse(
            path,
            open.line,
            format!("unterminated section <{}>", open.name),
        ));
    }

    Ok(root)
}

fn current<'a>(root: &'a mut ConfigTree, stack: &'a mut [OpenSection]) -> &'a mut ConfigTree {
    match stack.last_mut() {
        Some(open) => &mut open.body,
        None => root,
    }
}

fn split_directive(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    }
}

fn validate_name(path: &Path, line: usize, name: &str) -> Result<(), ConfigError> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if valid_start && valid_rest {
        Ok(())
    } else {
        Err(ConfigError::parse(
            path,
            line,
            format!("invalid directive name '{name}'"),
        ))
    }
}

/// Joins backslash-continued physical lines. Yields the 1-based number of the
/// first physical line of each logical line.
fn logical_lines(text: &str) -> Vec<(usize, String)> {
    let mut out = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (idx, raw) in text.lines().enumerate() {
        let trimmed = raw.trim_end();
        let (start, mut buf) = pending.take().unwrap_or((idx + 1, String::new()));

        if let Some(head) = trimmed.strip_suffix('\\') {
            buf.push_str(head);
            buf.push(' ');
            pending = Some((start, buf));
        } else {
            buf.push_str(trimmed);
            out.push((start, buf));
        }
    }

    if let Some(last) = pending {
        out.push(last);
    }

    out
}
