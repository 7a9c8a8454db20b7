//! Ordered class list shared by every record of a run.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::label_map::LabelMapping;

/// First line of a label file; never becomes a class.
pub const IGNORE_MARKER: &str = "__ignore__";
/// Second line of a label file; always class id 0.
pub const BACKGROUND_NAME: &str = "_background_";

/// Class names in id order. Built once, then only read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    names: Vec<String>,
    ids: HashMap<String, usize>,
}

impl Vocabulary {
    /// Read a label file and build the vocabulary from it.
    pub fn load(path: &Path, mapping: &LabelMapping) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let vocabulary = Self::from_lines(content.lines(), mapping)?;
        log::info!("class_names: {:?}", vocabulary.names);
        Ok(vocabulary)
    }

    /// Build from label-file lines. Lines are trimmed; the first two must be
    /// the ignore marker and the background name, later blank lines are
    /// skipped and every other one is renamed through `mapping`.
    pub fn from_lines<I, S>(lines: I, mapping: &LabelMapping) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names = Vec::new();
        let mut line_count = 0;

        for (idx, raw) in lines.into_iter().enumerate() {
            let label = raw.as_ref().trim();
            line_count = idx + 1;

            match line_count {
                1 => expect_reserved(line_count, label, IGNORE_MARKER)?,
                // The background keeps its reserved name regardless of mapping.
                2 => {
                    expect_reserved(line_count, label, BACKGROUND_NAME)?;
                    names.push(BACKGROUND_NAME.to_string());
                }
                _ if label.is_empty() => {}
                _ => names.push(mapping.resolve(label).to_string()),
            }
        }

        match line_count {
            0 => expect_reserved(1, "", IGNORE_MARKER)?,
            1 => expect_reserved(2, "", BACKGROUND_NAME)?,
            _ => {}
        }

        Ok(Self::from_names(names))
    }

    fn from_names(names: Vec<String>) -> Self {
        let mut ids = HashMap::with_capacity(names.len());
        for (id, name) in names.iter().enumerate() {
            // first occurrence wins
            ids.entry(name.clone()).or_insert(id);
        }
        Self { names, ids }
    }

    /// Write the names to `path`, one per line.
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.names.join("\n")).map_err(|e| Error::io(path, e))?;
        log::info!("Saved class_names: {}", path.display());
        Ok(())
    }

    pub fn class_id(&self, name: &str) -> Option<usize> {
        self.ids.get(name).copied()
    }

    pub fn name(&self, class_id: usize) -> Option<&str> {
        self.names.get(class_id).map(String::as_str)
    }

    /// Rename `label` through `mapping` and look up its class id.
    pub fn resolve<'a>(&'a self, label: &str, mapping: &LabelMapping) -> Result<(usize, &'a str)> {
        let resolved = mapping.resolve(label);
        match self.class_id(resolved) {
            Some(id) => Ok((id, self.names[id].as_str())),
            None => Err(Error::UnknownLabel {
                label: label.to_string(),
                resolved: resolved.to_string(),
            }),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn expect_reserved(line: usize, found: &str, expected: &'static str) -> Result<()> {
    if found == expected {
        Ok(())
    } else {
        Err(Error::MalformedLabels {
            line,
            expected,
            found: found.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(lines: &[&str]) -> Result<Vocabulary> {
        Vocabulary::from_lines(lines.iter(), &LabelMapping::new())
    }

    #[test]
    fn test_background_first_ignore_dropped() {
        let vocabulary = build(&["__ignore__", "_background_", "dog", "bird", "cat"]).unwrap();
        assert_eq!(vocabulary.len(), 4);
        assert_eq!(vocabulary.name(0), Some(BACKGROUND_NAME));
        assert_eq!(vocabulary.class_id("cat"), Some(3));
        assert_eq!(vocabulary.class_id(IGNORE_MARKER), None);
    }

    #[test]
    fn test_only_reserved_lines() {
        let vocabulary = build(&["__ignore__", "_background_"]).unwrap();
        assert_eq!(vocabulary.names(), &[BACKGROUND_NAME.to_string()]);
    }

    #[test]
    fn test_length_is_line_count_minus_one() {
        for extra in 0..6 {
            let mut lines = vec!["__ignore__".to_string(), "_background_".to_string()];
            lines.extend((0..extra).map(|i| format!("class{}", i)));
            let vocabulary = Vocabulary::from_lines(&lines, &LabelMapping::new()).unwrap();
            assert_eq!(vocabulary.len(), lines.len() - 1);
            assert_eq!(vocabulary.name(0), Some(BACKGROUND_NAME));
        }
    }

    #[test]
    fn test_rejects_bad_reserved_lines() {
        let err = build(&["_background_", "__ignore__", "cat"]).unwrap_err();
        assert!(matches!(err, Error::MalformedLabels { line: 1, .. }));

        let err = build(&["__ignore__", "cat", "_background_"]).unwrap_err();
        assert!(matches!(err, Error::MalformedLabels { line: 2, .. }));

        assert!(matches!(
            build(&[]).unwrap_err(),
            Error::MalformedLabels { line: 1, .. }
        ));
        assert!(matches!(
            build(&["__ignore__"]).unwrap_err(),
            Error::MalformedLabels { line: 2, .. }
        ));
    }

    #[test]
    fn test_trims_and_skips_blank_lines() {
        let vocabulary =
            build(&[" __ignore__ ", "_background_\r", "", "cat  ", "", "dog"]).unwrap();
        assert_eq!(vocabulary.names(), &["_background_", "cat", "dog"]);
    }

    #[test]
    fn test_blank_reserved_line_is_malformed() {
        let err = build(&["", "__ignore__", "_background_", "cat"]).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedLabels { line: 1, ref found, .. } if found.is_empty()
        ));

        let err = build(&["__ignore__", "", "_background_", "cat"]).unwrap_err();
        assert!(matches!(err, Error::MalformedLabels { line: 2, .. }));
    }

    #[test]
    fn test_mapping_renames_classes() {
        let mapping: LabelMapping = [("defect_a", "defect"), ("_background_", "bg")]
            .into_iter()
            .collect();
        let vocabulary = Vocabulary::from_lines(
            ["__ignore__", "_background_", "defect_a", "scratch"],
            &mapping,
        )
        .unwrap();

        assert_eq!(vocabulary.names(), &["_background_", "defect", "scratch"]);
        assert_eq!(vocabulary.class_id("defect_a"), None);
        assert_eq!(vocabulary.resolve("defect_a", &mapping).unwrap(), (1, "defect"));
        assert_eq!(vocabulary.resolve("defect", &mapping).unwrap(), (1, "defect"));
    }

    #[test]
    fn test_duplicates_resolve_to_first_id() {
        let mapping: LabelMapping = [("b", "a")].into_iter().collect();
        let vocabulary =
            Vocabulary::from_lines(["__ignore__", "_background_", "a", "b"], &mapping).unwrap();
        assert_eq!(vocabulary.len(), 3);
        assert_eq!(vocabulary.class_id("a"), Some(1));
        assert_eq!(vocabulary.resolve("b", &mapping).unwrap().0, 1);
    }

    #[test]
    fn test_resolve_unknown_label() {
        let vocabulary = build(&["__ignore__", "_background_", "cat"]).unwrap();
        let err = vocabulary.resolve("dog", &LabelMapping::new()).unwrap_err();
        assert!(matches!(err, Error::UnknownLabel { ref label, .. } if label == "dog"));
    }

    #[test]
    fn test_load_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let labels = dir.path().join("labels.txt");
        fs::write(&labels, "__ignore__\n_background_\ncat\ndog\n").unwrap();

        let vocabulary = Vocabulary::load(&labels, &LabelMapping::new()).unwrap();
        let saved = dir.path().join("class_names.txt");
        vocabulary.save(&saved).unwrap();

        assert_eq!(
            fs::read_to_string(saved).unwrap(),
            "_background_\ncat\ndog"
        );
    }
}
