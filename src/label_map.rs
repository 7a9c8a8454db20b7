use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Renames applied to labels, both in the class list and on every shape.
///
/// Labels without an entry pass through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelMapping {
    renames: HashMap<String, String>,
}

impl LabelMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a mapping file. `.json` files hold a flat object of
    /// `"old": "new"` pairs, anything else is read as text with one pair per
    /// line.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let mapping = if is_json {
            Self::parse_json(&content).map_err(|source| Error::Json {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            Self::parse_text(&content)?
        };

        log::info!(
            "Loaded {} label renames from {}",
            mapping.len(),
            path.display()
        );
        Ok(mapping)
    }

    pub fn parse_json(content: &str) -> std::result::Result<Self, serde_json::Error> {
        let renames: HashMap<String, String> = serde_json::from_str(content)?;
        Ok(Self { renames })
    }

    /// Parse `old new` pairs separated by whitespace, `,` or `:`.
    /// Blank lines and `#` comments are ignored.
    pub fn parse_text(content: &str) -> Result<Self> {
        let mut renames = HashMap::new();

        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = line
                .split(|c: char| c == ',' || c == ':' || c.is_whitespace())
                .filter(|field| !field.is_empty())
                .collect();
            let [from, to] = fields.as_slice() else {
                return Err(Error::MalformedMapping {
                    line: idx + 1,
                    reason: format!("expected two labels, found `{}`", line),
                });
            };

            if renames.insert(from.to_string(), to.to_string()).is_some() {
                return Err(Error::MalformedMapping {
                    line: idx + 1,
                    reason: format!("label `{}` is mapped more than once", from),
                });
            }
        }

        Ok(Self { renames })
    }

    /// Name to use for `label`: its replacement if one exists, else itself.
    pub fn resolve<'a>(&'a self, label: &'a str) -> &'a str {
        self.renames.get(label).map_or(label, String::as_str)
    }

    pub fn len(&self) -> usize {
        self.renames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renames.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LabelMapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            renames: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
