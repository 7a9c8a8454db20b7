use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

// The Shape struct representing annotated shapes
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Shape {
    pub label: String,
    pub points: Vec<(f64, f64)>,
    #[serde(default)]
    pub group_id: Option<i64>,
    #[serde(default = "default_shape_type")]
    pub shape_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub mask: Option<String>,
}

fn default_shape_type() -> String {
    "polygon".to_string()
}

impl Shape {
    pub fn polygon(label: impl Into<String>, points: Vec<(f64, f64)>) -> Self {
        Self {
            label: label.into(),
            points,
            group_id: None,
            shape_type: default_shape_type(),
            description: None,
            mask: None,
        }
    }
}

// The ImageAnnotation struct representing one LabelMe JSON file
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ImageAnnotation {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub flags: Option<HashMap<String, bool>>,
    #[serde(default)]
    pub shapes: Vec<Shape>,
    #[serde(default)]
    pub image_path: String,
    #[serde(default)]
    pub image_data: Option<String>,
    #[serde(default)]
    pub image_height: u32,
    #[serde(default)]
    pub image_width: u32,
}

pub const IMAGES_DIR: &str = "JPEGImages";
pub const ANNOTATIONS_DIR: &str = "Annotations";
pub const VISUALIZATION_DIR: &str = "AnnotationsVisualization";
pub const CLASS_NAMES_FILE: &str = "class_names.txt";

/// Paths of the VOC dataset tree, keyed by record base name.
#[derive(Debug, Clone)]
pub struct OutputDirs {
    pub root: PathBuf,
    pub images_dir: PathBuf,
    pub annotations_dir: PathBuf,
    pub visualization_dir: PathBuf,
    pub class_names_file: PathBuf,
}

impl OutputDirs {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            images_dir: root.join(IMAGES_DIR),
            annotations_dir: root.join(ANNOTATIONS_DIR),
            visualization_dir: root.join(VISUALIZATION_DIR),
            class_names_file: root.join(CLASS_NAMES_FILE),
        }
    }

    pub fn image_path(&self, base: &str) -> PathBuf {
        self.images_dir.join(format!("{}.jpg", base))
    }

    pub fn annotation_path(&self, base: &str) -> PathBuf {
        self.annotations_dir.join(format!("{}.xml", base))
    }

    pub fn visualization_path(&self, base: &str) -> PathBuf {
        self.visualization_dir.join(format!("{}.jpg", base))
    }
}

/// Shape counts for one successfully written record
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RecordOutcome {
    pub shapes_written: usize,
    pub shapes_skipped: usize,
}

// Struct to hold processing statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessingStats {
    pub total_records: usize,
    pub successful_records: usize,
    pub failed_records: usize,
    pub shapes_written: usize,
    pub shapes_skipped: usize,
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self, outcome: RecordOutcome) {
        self.total_records += 1;
        self.successful_records += 1;
        self.shapes_written += outcome.shapes_written;
        self.shapes_skipped += outcome.shapes_skipped;
    }

    pub fn record_failure(&mut self) {
        self.total_records += 1;
        self.failed_records += 1;
    }

    pub fn print_summary(&self) {
        log::info!("=== Processing Summary ===");
        log::info!("Total records processed: {}", self.total_records);
        log::info!("Successful conversions: {}", self.successful_records);
        log::info!("Failed conversions: {}", self.failed_records);
        log::info!("Objects written: {}", self.shapes_written);

        if self.shapes_skipped > 0 {
            log::warn!(
                "Skipped {} shapes with degenerate or non-rectangular geometry",
                self.shapes_skipped
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_labelme_json() {
        let json = r#"{
            "version": "5.2.1",
            "flags": {},
            "shapes": [
                {"label": "cat", "points": [[1, 2], [3, 2], [3, 4], [1, 4]], "group_id": null, "shape_type": "polygon", "flags": {}}
            ],
            "imagePath": "cat.png",
            "imageData": null,
            "imageHeight": 80,
            "imageWidth": 100
        }"#;

        let annotation: ImageAnnotation = serde_json::from_str(json).unwrap();
        assert_eq!(annotation.shapes.len(), 1);
        assert_eq!(annotation.shapes[0].label, "cat");
        assert_eq!(annotation.shapes[0].points[2], (3.0, 4.0));
        assert_eq!(annotation.image_path, "cat.png");
        assert!(annotation.image_data.is_none());
    }

    #[test]
    fn test_output_paths() {
        let dirs = OutputDirs::new(Path::new("/data/voc"));
        assert_eq!(dirs.image_path("a"), PathBuf::from("/data/voc/JPEGImages/a.jpg"));
        assert_eq!(
            dirs.annotation_path("a"),
            PathBuf::from("/data/voc/Annotations/a.xml")
        );
        assert_eq!(
            dirs.visualization_path("a"),
            PathBuf::from("/data/voc/AnnotationsVisualization/a.jpg")
        );
        assert_eq!(
            dirs.class_names_file,
            PathBuf::from("/data/voc/class_names.txt")
        );
    }

    #[test]
    fn test_stats_accumulate() {
        let mut stats = ProcessingStats::new();
        stats.record_success(RecordOutcome {
            shapes_written: 3,
            shapes_skipped: 1,
        });
        stats.record_failure();

        assert_eq!(stats.total_records, 2);
        assert_eq!(stats.successful_records, 1);
        assert_eq!(stats.failed_records, 1);
        assert_eq!(stats.shapes_written, 3);
        assert_eq!(stats.shapes_skipped, 1);
    }
}
