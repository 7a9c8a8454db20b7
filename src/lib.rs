//! LabelMe to PASCAL VOC dataset converter
//!
//! This library turns a directory of LabelMe JSON annotations into a VOC-style
//! detection dataset: re-encoded source images, per-image XML annotations,
//! box overlays for visual checking, and the ordered class list.

pub mod assemble;
pub mod bbox;
pub mod config;
pub mod dataset;
pub mod error;
pub mod io;
pub mod label_map;
pub mod naming;
pub mod types;
pub mod utils;
pub mod visualize;
pub mod voc;
pub mod vocabulary;

// Re-export commonly used types and functions
pub use assemble::{assemble_record, AssembledRecord, Instance};
pub use bbox::{extract_bbox, BndBox};
pub use config::Args;
pub use dataset::{process_dataset, process_dataset_with, Backends, ConvertOptions, DatasetWriter};
pub use error::{Error, Result};
pub use io::{setup_output_directories, ImageDecoder, LabelmeImageDecoder};
pub use label_map::LabelMapping;
pub use naming::BaseNamer;
pub use types::{ImageAnnotation, OutputDirs, ProcessingStats, Shape};
pub use visualize::{FontSource, ImageprocRenderer, OverlayRenderer, RenderOptions};
pub use voc::{DocumentSerializer, ImageSize, VocDocument, VocObject, VocXmlSerializer};
pub use vocabulary::{Vocabulary, BACKGROUND_NAME, IGNORE_MARKER};
