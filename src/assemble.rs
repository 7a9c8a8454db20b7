use log::{debug, warn};

use crate::bbox::{extract_bbox, BndBox};
use crate::error::Result;
use crate::label_map::LabelMapping;
use crate::types::Shape;
use crate::voc::{ImageSize, VocDocument, VocObject};
use crate::vocabulary::Vocabulary;

/// A box to draw, with the class it was resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    pub bbox: BndBox,
    pub class_id: usize,
    pub class_name: String,
}

/// Everything produced from one record's shapes. `document.objects` and
/// `instances` are parallel: same length, same order.
#[derive(Debug, Clone)]
pub struct AssembledRecord {
    pub document: VocDocument,
    pub instances: Vec<Instance>,
    pub skipped_shapes: usize,
}

/// Build the VOC document and overlay instances for one image.
///
/// Shapes without a usable rectangle are skipped before their label is
/// looked at. Every kept shape's label must resolve against `vocabulary`
/// after renaming; an unknown label fails the whole record.
pub fn assemble_record(
    vocabulary: &Vocabulary,
    mapping: &LabelMapping,
    filename: &str,
    size: ImageSize,
    shapes: &[Shape],
) -> Result<AssembledRecord> {
    let mut document = VocDocument::new(filename, size);
    let mut instances = Vec::with_capacity(shapes.len());
    let mut skipped_shapes = 0;

    for (idx, shape) in shapes.iter().enumerate() {
        let Some(bbox) = extract_bbox(&shape.points) else {
            warn!(
                "{}: skipping shape #{} `{}` with {} points, no usable rectangle",
                filename,
                idx,
                shape.label,
                shape.points.len()
            );
            skipped_shapes += 1;
            continue;
        };
        let (class_id, class_name) = vocabulary.resolve(&shape.label, mapping)?;

        document.objects.push(VocObject::new(class_name, bbox));
        instances.push(Instance {
            bbox,
            class_id,
            class_name: class_name.to_string(),
        });
    }

    debug!(
        "{}: {} objects, {} shapes skipped",
        filename,
        instances.len(),
        skipped_shapes
    );

    Ok(AssembledRecord {
        document,
        instances,
        skipped_shapes,
    })
}
