use crate::conf::{ConfigEntry, ConfigTree, split_args};
use crate::logs::error::LogError;
use crate::logs::format::{COMMON, LogFormat, builtin_format};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// An access log to read and the format its lines are written in.
#[derive(Debug, Clone)]
pub struct LogSource {
    pub path: PathBuf,
    pub format: LogFormat,
}

/// Finds the access logs configured for `vhost`, or for the main server when
/// no virtual host is named.
///
/// `config_root` is the file the tree was loaded from; relative log paths
/// resolve against `ServerRoot` or, failing that, that file's directory.
pub fn locate_log_sources(
    tree: &ConfigTree,
    vhost: Option<&str>,
    config_root: &Path,
) -> Result<Vec<LogSource>, LogError> {
    let server = server_scope(tree);
    let base = server_root(&server, config_root);
    let server_formats = FormatTable::from_scope(&server);

    let sources = match vhost {
        Some(name) => {
            let bodies = find_vhosts(tree, name);
            if bodies.is_empty() {
                return Err(LogError::VirtualHostNotFound {
                    name: name.to_string(),
                });
            }
            debug!(vhost = name, blocks = bodies.len(), "matched virtual host blocks");

            let mut sources: Vec<LogSource> = Vec::new();
            for body in bodies {
                let scope = server_scope(body);
                let formats = FormatTable::from_scope(&scope).over(&server_formats);
                let mut own = collect_sources(&scope, &formats, &base)?;
                if own.is_empty() {
                    // A virtual host without its own logs writes to the main server's.
                    debug!(
                        vhost = name,
                        "virtual host block has no log directives; using main server logs"
                    );
                    own = collect_sources(&server, &server_formats, &base)?;
                }
                for source in own {
                    if !sources.iter().any(|s| s.path == source.path) {
                        sources.push(source);
                    }
                }
            }
            sources
        }
        None => collect_sources(&server, &server_formats, &base)?,
    };

    if sources.is_empty() {
        let scope = match vhost {
            Some(name) => format!("virtual host '{name}'"),
            None => "the main server".to_string(),
        };
        return Err(LogError::DirectiveMissing { scope });
    }
    Ok(sources)
}

fn collect_sources(
    scope: &[&ConfigEntry],
    formats: &FormatTable,
    base: &Path,
) -> Result<Vec<LogSource>, LogError> {
    let mut sources = Vec::new();

    for entry in scope {
        let Some(raw) = entry.as_scalar() else {
            continue;
        };
        let args = split_args(raw);

        let (target, format) = if entry.is("CustomLog") {
            match (args.first(), args.get(1)) {
                (Some(target), Some(format_arg)) => (target, formats.resolve(format_arg)?),
                _ => {
                    warn!(value = raw, "CustomLog without a format; skipping");
                    continue;
                }
            }
        } else if entry.is("TransferLog") {
            match args.first() {
                Some(target) => (target, formats.transfer_default()?),
                None => continue,
            }
        } else {
            continue;
        };

        if target.starts_with('|') {
            warn!(target = %target, "piped log target cannot be scanned; skipping");
            continue;
        }

        let path = base.join(target);
        debug!(path = %path.display(), format = format.source(), "located access log");
        sources.push(LogSource { path, format });
    }

    Ok(sources)
}

//-----------------------------------------------------------------------------
// Scopes
//-----------------------------------------------------------------------------

/// Directives that apply at this level: the entries themselves plus
/// everything inside conditional sections (`<IfModule>`, `<IfDefine>`,
/// `<Else>`, ...). Scoped sections like `<Directory>` or `<VirtualHost>`
/// are not entered.
fn server_scope(tree: &ConfigTree) -> Vec<&ConfigEntry> {
    let mut out = Vec::new();
    collect_scope(tree, &mut out);
    out
}

fn collect_scope<'a>(tree: &'a ConfigTree, out: &mut Vec<&'a ConfigEntry>) {
    for entry in tree.entries() {
        match entry.as_section() {
            Some((_, body)) if is_conditional(&entry.name) => collect_scope(body, out),
            Some(_) => {}
            None => out.push(entry),
        }
    }
}

fn is_conditional(section: &str) -> bool {
    let lower = section.to_ascii_lowercase();
    lower.starts_with("if") || lower.starts_with("else")
}

fn server_root(scope: &[&ConfigEntry], config_root: &Path) -> PathBuf {
    let configured = scope
        .iter()
        .filter(|e| e.is("ServerRoot"))
        .filter_map(|e| e.as_scalar())
        .filter_map(|raw| split_args(raw).into_iter().next())
        .last();

    match configured {
        Some(root) => PathBuf::from(root),
        None => config_root
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    }
}

//-----------------------------------------------------------------------------
// Virtual hosts
//-----------------------------------------------------------------------------

/// Every `<VirtualHost>` block serving `name`, in file order. A site often
/// has one block per port (`*:80`, `*:443`), each with its own logs.
fn find_vhosts<'a>(tree: &'a ConfigTree, name: &str) -> Vec<&'a ConfigTree> {
    let mut found = Vec::new();
    collect_vhosts(tree, name, &mut found);
    found
}

fn collect_vhosts<'a>(tree: &'a ConfigTree, name: &str, found: &mut Vec<&'a ConfigTree>) {
    for entry in tree.entries() {
        let Some((label, body)) = entry.as_section() else {
            continue;
        };
        if entry.is("VirtualHost") {
            if vhost_matches(label, body, name) {
                found.push(body);
            }
            continue;
        }
        collect_vhosts(body, name, found);
    }
}

fn vhost_matches(label: &str, body: &ConfigTree, name: &str) -> bool {
    let scope = server_scope(body);
    let names = scope
        .iter()
        .filter(|e| e.is("ServerName") || e.is("ServerAlias"))
        .filter_map(|e| e.as_scalar())
        .flat_map(split_args);

    names
        .chain(split_args(label))
        .any(|candidate| host_eq(&candidate, name))
}

/// `ServerName` may carry a scheme and port (`https://www.example.com:443`).
fn host_eq(candidate: &str, name: &str) -> bool {
    if candidate.eq_ignore_ascii_case(name) {
        return true;
    }
    let host = candidate
        .split_once("://")
        .map_or(candidate, |(_, rest)| rest);
    let host = host.rsplit_once(':').map_or(host, |(host, _)| host);
    host.eq_ignore_ascii_case(name)
}

//-----------------------------------------------------------------------------
// Formats
//-----------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
struct FormatTable {
    named: HashMap<String, String>,
    /// Last nickname-less `LogFormat`, used by `TransferLog`.
    default: Option<String>,
}

impl FormatTable {
    fn from_scope(scope: &[&ConfigEntry]) -> Self {
        let mut table = Self::default();
        for raw in scope
            .iter()
            .filter(|e| e.is("LogFormat"))
            .filter_map(|e| e.as_scalar())
        {
            let mut args = split_args(raw).into_iter();
            match (args.next(), args.next()) {
                (Some(format), Some(nickname)) => {
                    table.named.insert(nickname, format);
                }
                (Some(format), None) => table.default = Some(format),
                _ => {}
            }
        }
        table
    }

    /// Layers `self` on top of `fallback`.
    fn over(mut self, fallback: &FormatTable) -> Self {
        for (nickname, format) in &fallback.named {
            self.named
                .entry(nickname.clone())
                .or_insert_with(|| format.clone());
        }
        if self.default.is_none() {
            self.default = fallback.default.clone();
        }
        self
    }

    fn resolve(&self, format_arg: &str) -> Result<LogFormat, LogError> {
        if format_arg.contains('%') {
            return LogFormat::compile(format_arg);
        }
        let format = self
            .named
            .get(format_arg)
            .map(String::as_str)
            .or_else(|| builtin_format(format_arg))
            .ok_or_else(|| LogError::UnknownFormat {
                nickname: format_arg.to_string(),
            })?;
        LogFormat::compile(format)
    }

    fn transfer_default(&self) -> Result<LogFormat, LogError> {
        LogFormat::compile(self.default.as_deref().unwrap_or(COMMON))
    }
}
