//! Box overlays for eyeballing a converted record.

use ab_glyph::{FontVec, PxScale};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::assemble::Instance;
use crate::bbox::BndBox;
use crate::error::{Error, Result};

// Common locations of a TrueType font on Linux, macOS and Windows.
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Where caption glyphs come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSource {
    /// First readable font from a list of well-known system paths.
    System,
    /// This file; failing to load it is an error.
    File(PathBuf),
    /// No captions.
    Disabled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub line_width: u32,
    pub font_size: f32,
    pub font: FontSource,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            line_width: 2,
            font_size: 15.0,
            font: FontSource::System,
        }
    }
}

/// Draws resolved boxes over the source image.
pub trait OverlayRenderer: Send + Sync {
    fn render(&self, image: &DynamicImage, instances: &[Instance]) -> Result<RgbImage>;
}

/// Renderer backed by `imageproc`, with `ab_glyph` captions.
pub struct ImageprocRenderer {
    options: RenderOptions,
    font: Option<FontVec>,
}

impl ImageprocRenderer {
    pub fn new(options: RenderOptions) -> Result<Self> {
        let font = match &options.font {
            FontSource::File(path) => Some(load_font(path)?),
            FontSource::System => {
                let found = SYSTEM_FONTS
                    .iter()
                    .map(Path::new)
                    .find_map(|path| load_font(path).ok());
                if found.is_none() {
                    warn!("No system font found, visualizations will have no captions (use --font)");
                }
                found
            }
            FontSource::Disabled => None,
        };
        Ok(Self { options, font })
    }
}

fn load_font(path: &Path) -> Result<FontVec> {
    let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
    let font = FontVec::try_from_vec(bytes)
        .map_err(|e| Error::Font(format!("{}: {}", path.display(), e)))?;
    info!("Using caption font {}", path.display());
    Ok(font)
}

impl OverlayRenderer for ImageprocRenderer {
    fn render(&self, image: &DynamicImage, instances: &[Instance]) -> Result<RgbImage> {
        let mut canvas = image.to_rgb8();

        for instance in instances {
            let color = label_color(instance.class_id);
            // Draw the outline inwards so the box edge stays on the annotated pixels.
            for inset in 0..self.options.line_width as i64 {
                if let Some(rect) = pixel_rect(&shrink(&instance.bbox, inset)) {
                    draw_hollow_rect_mut(&mut canvas, rect, color);
                }
            }
            if let Some(font) = &self.font {
                draw_caption(
                    &mut canvas,
                    font,
                    self.options.font_size,
                    &instance.bbox,
                    &instance.class_name,
                    color,
                );
            }
        }

        Ok(canvas)
    }
}

/// Pixel rectangle covering `bbox` with both edges inclusive.
///
/// This is the only place a box changes layout on its way to the overlay, so
/// the drawn outline always sits on the same axes as the XML `bndbox`.
pub fn pixel_rect(bbox: &BndBox) -> Option<Rect> {
    if bbox.xmax < bbox.xmin || bbox.ymax < bbox.ymin {
        return None;
    }
    let x = i32::try_from(bbox.xmin).ok()?;
    let y = i32::try_from(bbox.ymin).ok()?;
    let width = u32::try_from(bbox.width() + 1).ok()?;
    let height = u32::try_from(bbox.height() + 1).ok()?;
    Some(Rect::at(x, y).of_size(width, height))
}

fn shrink(bbox: &BndBox, by: i64) -> BndBox {
    BndBox {
        xmin: bbox.xmin + by,
        ymin: bbox.ymin + by,
        xmax: bbox.xmax - by,
        ymax: bbox.ymax - by,
    }
}

fn draw_caption(
    canvas: &mut RgbImage,
    font: &FontVec,
    font_size: f32,
    bbox: &BndBox,
    text: &str,
    color: Rgb<u8>,
) {
    let scale = PxScale::from(font_size);
    let (text_w, text_h) = text_size(scale, font, text);
    let tab_w = text_w + 4;
    let tab_h = text_h + 4;

    // Above the box when there is room, otherwise just inside its top edge.
    let x = bbox.xmin.clamp(0, i32::MAX as i64) as i32;
    let top = bbox.ymin - tab_h as i64;
    let y = if top >= 0 { top } else { bbox.ymin.max(0) };
    let y = y.min(i32::MAX as i64) as i32;

    draw_filled_rect_mut(canvas, Rect::at(x, y).of_size(tab_w, tab_h), color);
    draw_text_mut(
        canvas,
        text_color(color),
        x.saturating_add(2),
        y.saturating_add(2),
        scale,
        font,
        text,
    );
}

fn text_color(background: Rgb<u8>) -> Rgb<u8> {
    let [r, g, b] = background.0;
    let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    if luma > 128.0 {
        Rgb([0, 0, 0])
    } else {
        Rgb([255, 255, 255])
    }
}

/// Color of class `class_id` in the PASCAL VOC label colormap.
pub fn label_color(class_id: usize) -> Rgb<u8> {
    let mut id = class_id;
    let (mut r, mut g, mut b) = (0u8, 0u8, 0u8);
    for shift in (0..8).rev() {
        r |= ((id & 1) as u8) << shift;
        g |= (((id >> 1) & 1) as u8) << shift;
        b |= (((id >> 2) & 1) as u8) << shift;
        id >>= 3;
    }
    Rgb([r, g, b])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer(line_width: u32) -> ImageprocRenderer {
        ImageprocRenderer::new(RenderOptions {
            line_width,
            font_size: 15.0,
            font: FontSource::Disabled,
        })
        .unwrap()
    }

    fn instance(bbox: BndBox, class_id: usize) -> Instance {
        Instance {
            bbox,
            class_id,
            class_name: format!("class{}", class_id),
        }
    }

    #[test]
    fn test_voc_colormap() {
        assert_eq!(label_color(0), Rgb([0, 0, 0]));
        assert_eq!(label_color(1), Rgb([128, 0, 0]));
        assert_eq!(label_color(2), Rgb([0, 128, 0]));
        assert_eq!(label_color(3), Rgb([128, 128, 0]));
        assert_eq!(label_color(4), Rgb([0, 0, 128]));
        assert_eq!(label_color(15), Rgb([192, 128, 128]));
    }

    #[test]
    fn test_pixel_rect_is_inclusive() {
        let rect = pixel_rect(&BndBox {
            xmin: 10,
            ymin: 10,
            xmax: 50,
            ymax: 40,
        })
        .unwrap();
        assert_eq!((rect.left(), rect.top()), (10, 10));
        assert_eq!((rect.right(), rect.bottom()), (50, 40));
        assert_eq!((rect.width(), rect.height()), (41, 31));
    }

    #[test]
    fn test_outline_lands_on_document_axes() {
        let image = DynamicImage::new_rgb8(100, 80);
        let bbox = BndBox {
            xmin: 10,
            ymin: 10,
            xmax: 50,
            ymax: 40,
        };
        let overlay = renderer(1).render(&image, &[instance(bbox, 1)]).unwrap();
        let red = label_color(1);

        assert_eq!(overlay.dimensions(), (100, 80));
        assert_eq!(*overlay.get_pixel(10, 10), red);
        assert_eq!(*overlay.get_pixel(50, 40), red);
        assert_eq!(*overlay.get_pixel(50, 25), red);
        assert_eq!(*overlay.get_pixel(30, 40), red);
        // x and y swapped would put the corner here instead
        assert_eq!(*overlay.get_pixel(40, 50), Rgb([0, 0, 0]));
        assert_eq!(*overlay.get_pixel(30, 25), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_thick_outline_grows_inwards() {
        let image = DynamicImage::new_rgb8(60, 60);
        let bbox = BndBox {
            xmin: 10,
            ymin: 10,
            xmax: 40,
            ymax: 40,
        };
        let overlay = renderer(3).render(&image, &[instance(bbox, 2)]).unwrap();
        let green = label_color(2);

        assert_eq!(*overlay.get_pixel(12, 20), green);
        assert_eq!(*overlay.get_pixel(13, 20), Rgb([0, 0, 0]));
        assert_eq!(*overlay.get_pixel(9, 20), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_render_without_instances_copies_image() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 6, Rgb([7, 8, 9])));
        let overlay = renderer(2).render(&image, &[]).unwrap();
        assert_eq!(overlay, image.to_rgb8());
    }

    #[test]
    fn test_missing_font_file_is_an_error() {
        let result = ImageprocRenderer::new(RenderOptions {
            font: FontSource::File(PathBuf::from("/nonexistent/font.ttf")),
            ..RenderOptions::default()
        });
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
