use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;

use crate::dataset::ConvertOptions;
use crate::naming::BaseNamer;
use crate::visualize::{FontSource, RenderOptions};

/// Command-line arguments for converting LabelMe JSON to a VOC dataset.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct Args {
    /// Directory containing LabelMe JSON files
    pub input_dir: PathBuf,

    /// Directory to create the VOC dataset in; must not exist yet
    pub output_dir: PathBuf,

    /// Label list: `__ignore__`, `_background_`, then one class per line
    #[arg(long = "labels")]
    pub labels: PathBuf,

    /// Label renames, as `old new` lines or a JSON object
    #[arg(long = "label_dict")]
    pub label_dict: Option<PathBuf>,

    /// How output file names are derived from JSON file names
    #[arg(long = "base_name", value_enum, default_value = "stem")]
    pub base_name: BaseNamer,

    /// Keep converting after a record fails and report all failures at the end
    #[arg(long = "keep_going")]
    pub keep_going: bool,

    /// Convert records in parallel
    #[arg(long = "parallel")]
    pub parallel: bool,

    /// TrueType font for visualization captions
    #[arg(long = "font")]
    pub font: Option<PathBuf>,

    /// Caption font size in pixels
    #[arg(long = "font_size", default_value_t = 15.0, value_parser = validate_font_size)]
    pub font_size: f32,

    /// Box outline width in pixels
    #[arg(long = "line_width", default_value_t = 2, value_parser = clap::value_parser!(u32).range(1..))]
    pub line_width: u32,
}

impl Args {
    pub fn convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            base_namer: self.base_name,
            keep_going: self.keep_going,
            parallel: self.parallel,
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            line_width: self.line_width,
            font_size: self.font_size,
            font: match &self.font {
                Some(path) => FontSource::File(path.clone()),
                None => FontSource::System,
            },
        }
    }
}

// Validate that the font size is a positive number
fn validate_font_size(s: &str) -> Result<f32, String> {
    match f32::from_str(s) {
        Ok(val) if val.is_finite() && val > 0.0 => Ok(val),
        _ => Err("font size must be a positive number".to_string()),
    }
}
