use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use glob::{glob, Pattern};
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::{ImageAnnotation, OutputDirs};
use crate::utils::create_fresh_directory;
use crate::voc::ImageSize;

pub const JPEG_QUALITY: u8 = 95;

/// Create the VOC directory tree under `output_dir`, which must not exist yet.
pub fn setup_output_directories(output_dir: &Path) -> Result<OutputDirs> {
    let dirs = OutputDirs::new(output_dir);
    create_fresh_directory(&dirs.root)?;
    create_fresh_directory(&dirs.images_dir)?;
    create_fresh_directory(&dirs.annotations_dir)?;
    create_fresh_directory(&dirs.visualization_dir)?;
    Ok(dirs)
}

/// The `*.json` files directly inside `input_dir`, in path order.
pub fn collect_json_files(input_dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = Path::new(&Pattern::escape(&input_dir.to_string_lossy())).join("*.json");
    let mut paths = Vec::new();
    for entry in glob(&pattern.to_string_lossy())? {
        let path = entry.map_err(|e| {
            let path = e.path().to_path_buf();
            Error::io(path, e.into_error())
        })?;
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Read and parse a single LabelMe JSON file, streaming from disk.
pub fn read_and_parse_json(path: &Path) -> Result<ImageAnnotation> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Produces the pixels a record was annotated on.
pub trait ImageDecoder: Send + Sync {
    fn decode(&self, annotation: &ImageAnnotation, json_path: &Path) -> Result<DynamicImage>;
}

/// Uses the base64 `imageData` embedded in the JSON, falling back to
/// `imagePath` relative to the JSON file.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelmeImageDecoder;

impl ImageDecoder for LabelmeImageDecoder {
    fn decode(&self, annotation: &ImageAnnotation, json_path: &Path) -> Result<DynamicImage> {
        if let Some(data) = annotation.image_data.as_deref().map(str::trim) {
            if !data.is_empty() {
                let bytes = STANDARD.decode(data)?;
                return Ok(image::load_from_memory(&bytes)?);
            }
        }

        let image_path = referenced_image_path(json_path, &annotation.image_path);
        if !image_path.is_file() {
            return Err(Error::MissingImage(image_path));
        }
        log::debug!("Loading {} from disk", image_path.display());
        Ok(image::open(&image_path)?)
    }
}

fn referenced_image_path(json_path: &Path, image_path: &str) -> PathBuf {
    // LabelMe on Windows writes `..\\images\\a.jpg`
    let image_path = image_path.replace('\\', "/");
    json_path
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(image_path)
}

pub fn image_size(image: &DynamicImage) -> ImageSize {
    ImageSize {
        height: image.height(),
        width: image.width(),
        depth: image.color().channel_count(),
    }
}

/// Encode `image` as an RGB JPEG at `path`.
pub fn save_jpeg(image: &DynamicImage, path: &Path) -> Result<()> {
    let rgb = image.to_rgb8();
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut writer = BufWriter::new(file);
    JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY).encode_image(&rgb)?;
    writer.flush().map_err(|e| Error::io(path, e))
}

pub fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).map_err(|e| Error::io(path, e))
}
