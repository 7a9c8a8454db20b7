use clap::ValueEnum;
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::error::{Error, Result};

static DIGITS: OnceLock<Regex> = OnceLock::new();

/// How a record's output base name is derived from its JSON path.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
pub enum BaseNamer {
    /// File stem, used verbatim
    #[default]
    Stem,
    /// File stem with characters unsafe in file names replaced
    Sanitized,
    /// First run of digits in the file stem, e.g. "擦花20180830172530对照样本" -> "20180830172530"
    Digits,
}

impl BaseNamer {
    pub fn base_name(self, path: &Path) -> String {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        match self {
            BaseNamer::Stem => stem,
            BaseNamer::Sanitized => sanitize_filename::sanitize(&stem),
            BaseNamer::Digits => {
                let digits = DIGITS.get_or_init(|| Regex::new(r"\d+").expect("valid regex"));
                match digits.find(&stem) {
                    Some(m) => m.as_str().to_string(),
                    None => stem,
                }
            }
        }
    }
}

/// Pair every record with its base name, refusing names that would collide
/// in the output tree.
pub fn plan_base_names(paths: Vec<PathBuf>, namer: BaseNamer) -> Result<Vec<(PathBuf, String)>> {
    let mut seen: HashMap<String, PathBuf> = HashMap::with_capacity(paths.len());
    let mut planned = Vec::with_capacity(paths.len());

    for path in paths {
        let base = namer.base_name(&path);
        if let Some(first) = seen.get(&base) {
            return Err(Error::DuplicateBaseName {
                base,
                first: first.clone(),
                second: path,
            });
        }
        seen.insert(base.clone(), path.clone());
        planned.push((path, base));
    }

    Ok(planned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stem_is_verbatim() {
        let path = Path::new("/in/擦花20180830172530对照样本.json");
        assert_eq!(
            BaseNamer::Stem.base_name(path),
            "擦花20180830172530对照样本"
        );
        assert_eq!(BaseNamer::Stem.base_name(Path::new("a.b.json")), "a.b");
    }

    #[test]
    fn test_digits() {
        let path = Path::new("/in/擦花20180830172530对照样本.json");
        assert_eq!(BaseNamer::Digits.base_name(path), "20180830172530");
        assert_eq!(BaseNamer::Digits.base_name(Path::new("cat.json")), "cat");
    }

    #[test]
    fn test_sanitized() {
        assert_eq!(
            BaseNamer::Sanitized.base_name(Path::new("/in/a?b*c.json")),
            "abc"
        );
    }

    #[test]
    fn test_plan_rejects_collisions() {
        let paths = vec![
            PathBuf::from("in/img_001_left.json"),
            PathBuf::from("in/img_001_right.json"),
        ];
        assert_eq!(
            plan_base_names(paths.clone(), BaseNamer::Stem).unwrap()[1].1,
            "img_001_right"
        );
        let err = plan_base_names(paths, BaseNamer::Digits).unwrap_err();
        assert!(matches!(err, Error::DuplicateBaseName { ref base, .. } if base == "001"));
    }
}
