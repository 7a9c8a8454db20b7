//! PASCAL VOC annotation documents and their XML form.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;

use crate::bbox::BndBox;
use crate::error::Result;

/// Dimensions of the decoded source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub height: u32,
    pub width: u32,
    pub depth: u8,
}

/// `<source>` block; VOC consumers expect it even when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VocSource {
    pub database: String,
    pub annotation: String,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocObject {
    pub name: String,
    pub pose: String,
    pub truncated: u8,
    pub difficult: u8,
    pub bndbox: BndBox,
}

impl VocObject {
    pub fn new(name: impl Into<String>, bndbox: BndBox) -> Self {
        Self {
            name: name.into(),
            pose: String::new(),
            truncated: 0,
            difficult: 0,
            bndbox,
        }
    }
}

/// One image's annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocDocument {
    pub folder: String,
    pub filename: String,
    pub source: VocSource,
    pub size: ImageSize,
    pub segmented: u8,
    pub objects: Vec<VocObject>,
}

impl VocDocument {
    pub fn new(filename: impl Into<String>, size: ImageSize) -> Self {
        Self {
            folder: String::new(),
            filename: filename.into(),
            source: VocSource::default(),
            size,
            segmented: 0,
            objects: Vec::new(),
        }
    }
}

/// Turns a finished document into the bytes written to `Annotations/`.
pub trait DocumentSerializer: Send + Sync {
    fn serialize(&self, document: &VocDocument) -> Result<Vec<u8>>;
}

/// Pretty-printed VOC XML, without an XML declaration.
#[derive(Debug, Clone, Copy)]
pub struct VocXmlSerializer {
    pub indent: usize,
}

impl Default for VocXmlSerializer {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

impl DocumentSerializer for VocXmlSerializer {
    fn serialize(&self, document: &VocDocument) -> Result<Vec<u8>> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', self.indent);
        write_document(&mut writer, document)?;
        let mut bytes = writer.into_inner();
        bytes.push(b'\n');
        Ok(bytes)
    }
}

fn write_document<W: Write>(writer: &mut Writer<W>, doc: &VocDocument) -> quick_xml::Result<()> {
    write_parent(writer, "annotation", |w| {
        write_leaf(w, "folder", &doc.folder)?;
        write_leaf(w, "filename", &doc.filename)?;
        write_parent(w, "source", |w| {
            write_leaf(w, "database", &doc.source.database)?;
            write_leaf(w, "annotation", &doc.source.annotation)?;
            write_leaf(w, "image", &doc.source.image)
        })?;
        write_parent(w, "size", |w| {
            write_leaf(w, "height", &doc.size.height.to_string())?;
            write_leaf(w, "width", &doc.size.width.to_string())?;
            write_leaf(w, "depth", &doc.size.depth.to_string())
        })?;
        write_leaf(w, "segmented", &doc.segmented.to_string())?;
        for object in &doc.objects {
            write_object(w, object)?;
        }
        Ok(())
    })
}

fn write_object<W: Write>(writer: &mut Writer<W>, object: &VocObject) -> quick_xml::Result<()> {
    write_parent(writer, "object", |w| {
        write_leaf(w, "name", &object.name)?;
        write_leaf(w, "pose", &object.pose)?;
        write_leaf(w, "truncated", &object.truncated.to_string())?;
        write_leaf(w, "difficult", &object.difficult.to_string())?;
        let b = &object.bndbox;
        write_parent(w, "bndbox", |w| {
            write_leaf(w, "xmin", &b.xmin.to_string())?;
            write_leaf(w, "ymin", &b.ymin.to_string())?;
            write_leaf(w, "xmax", &b.xmax.to_string())?;
            write_leaf(w, "ymax", &b.ymax.to_string())
        })
    })
}

fn write_parent<W, F>(writer: &mut Writer<W>, name: &str, body: F) -> quick_xml::Result<()>
where
    W: Write,
    F: FnOnce(&mut Writer<W>) -> quick_xml::Result<()>,
{
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    body(writer)?;
    writer.write_event(Event::End(BytesEnd::new(name)))
}

// Empty text still yields an open/close pair rather than `<name/>`.
fn write_leaf<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))
}
