use serde::Serialize;

/// Resolved Apache configuration.
///
/// Entries keep file order and duplicates; Apache allows most directives to
/// repeat (`CustomLog`, `LogFormat`, `ServerAlias`, ...) and several of them
/// are order sensitive. Directive names compare case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConfigTree {
    entries: Vec<ConfigEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigEntry {
    pub name: String,
    pub value: ConfigValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigValue {
    /// Raw argument text of a directive, quotes preserved.
    Scalar(String),
    /// `<Name label> ... </Name>`
    Section { label: String, body: ConfigTree },
}

impl ConfigEntry {
    pub fn scalar(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: ConfigValue::Scalar(value.into()),
        }
    }

    pub fn section(name: impl Into<String>, label: impl Into<String>, body: ConfigTree) -> Self {
        Self {
            name: name.into(),
            value: ConfigValue::Section {
                label: label.into(),
                body,
            },
        }
    }

    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match &self.value {
            ConfigValue::Scalar(value) => Some(value),
            ConfigValue::Section { .. } => None,
        }
    }

    pub fn as_section(&self) -> Option<(&str, &ConfigTree)> {
        match &self.value {
            ConfigValue::Scalar(_) => None,
            ConfigValue::Section { label, body } => Some((label, body)),
        }
    }
}

impl ConfigTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: ConfigEntry) {
        self.entries.push(entry);
    }

    pub fn extend(&mut self, other: ConfigTree) {
        self.entries.extend(other.entries);
    }

    pub fn entries(&self) -> &[ConfigEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<ConfigEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All scalar values of directives named `name`, in file order.
    pub fn values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |e| e.is(name))
            .filter_map(ConfigEntry::as_scalar)
    }

    /// Last scalar value of `name`. Apache lets later single-valued
    /// directives override earlier ones.
    pub fn last(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .filter(|e| e.is(name))
            .find_map(ConfigEntry::as_scalar)
    }

    /// Sections named `name` at this level only, as `(label, body)`.
    pub fn sections<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a ConfigTree)> + 'a {
        self.entries
            .iter()
            .filter(move |e| e.is(name))
            .filter_map(ConfigEntry::as_section)
    }

    /// Applies `f` to every scalar value and every section label, depth first.
    pub fn try_for_each_text_mut<E>(
        &mut self,
        f: &mut impl FnMut(&mut String) -> Result<(), E>,
    ) -> Result<(), E> {
        for entry in &mut self.entries {
            match &mut entry.value {
                ConfigValue::Scalar(value) => f(value)?,
                ConfigValue::Section { label, body } => {
                    f(label)?;
                    body.try_for_each_text_mut(f)?;
                }
            }
        }
        Ok(())
    }
}

/// Splits raw directive arguments into words.
///
/// Double or single quotes group words; inside double quotes `\"` and `\\`
/// are unescaped. Other backslash sequences are kept verbatim so log
/// formats like `\t` survive.
pub fn split_args(raw: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        match quote {
            Some(q) if c == q => {
                quote = None;
            }
            Some('"') if c == '\\' => match chars.peek() {
                Some(&next @ ('"' | '\\')) => {
                    current.push(next);
                    chars.next();
                }
                _ => current.push(c),
            },
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    args.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if in_word {
        args.push(current);
    }

    args
}
