//! Gallery banner images.
//!
//! Every banner is shown in a 2:1 slot, so its aspect ratio must be exactly 2.
//! Raster sizes come from the `image` crate's header probing; SVG sizes come
//! from the root element's `width`/`height` attributes, falling back to the
//! `viewBox`. SVGs must not contain `<text>`: fonts differ between devices,
//! so text has to be converted to paths.

use super::{Entity, EntityError, EntityKind};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::fs;
use std::path::{Path, PathBuf};

/// Required width / height.
const ASPECT_RATIO: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Raster,
    Vector,
}

impl ImageKind {
    /// Map a file extension (with dot) to an image kind.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            ".png" | ".jpg" => Some(Self::Raster),
            ".svg" => Some(Self::Vector),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImageFile {
    path: PathBuf,
    kind: ImageKind,
}

impl ImageFile {
    pub fn new(path: impl Into<PathBuf>, kind: ImageKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Width and height in pixels (or SVG user units).
    pub fn dimensions(&self) -> Result<(f64, f64), EntityError> {
        match self.kind {
            ImageKind::Raster => {
                let (width, height) = ::image::image_dimensions(&self.path)?;
                Ok((f64::from(width), f64::from(height)))
            }
            ImageKind::Vector => {
                let source = fs::read_to_string(&self.path)?;
                svg_dimensions(&source)
            }
        }
    }
}

impl Entity for ImageFile {
    fn source_path(&self) -> Option<&Path> {
        Some(&self.path)
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Image
    }

    fn validate(&self) -> Result<(), EntityError> {
        if self.kind == ImageKind::Vector {
            let source = fs::read_to_string(&self.path)?;
            if source.contains("<text") {
                return Err(EntityError::invalid(
                    "SVG must not contain <text> elements -- please convert the text to a path. \
                     This ensures it will display correctly on all devices.",
                ));
            }
        }

        let (width, height) = self.dimensions()?;
        check_aspect_ratio(width, height)
    }
}

fn check_aspect_ratio(width: f64, height: f64) -> Result<(), EntityError> {
    let ratio = width / height;
    if ratio != ASPECT_RATIO {
        return Err(EntityError::invalid(format!(
            "Aspect ratio must be exactly 2, but found {ratio:.4} ({width}x{height})"
        )));
    }
    Ok(())
}

/// Size of an SVG document from its root element.
///
/// `width`/`height` win when both are plain numbers (an optional `px` is
/// accepted); otherwise the `viewBox` size is used.
pub fn svg_dimensions(source: &str) -> Result<(f64, f64), EntityError> {
    let mut reader = Reader::from_str(source);
    let root = loop {
        match reader.read_event() {
            Ok(Event::Start(e) | Event::Empty(e)) => break e,
            Ok(Event::Eof) => {
                return Err(EntityError::invalid("Not an SVG document: no <svg> element"));
            }
            Ok(_) => continue,
            Err(e) => return Err(EntityError::invalid(format!("Malformed SVG: {e}"))),
        }
    };
    if root.local_name().as_ref() != b"svg" {
        return Err(EntityError::invalid(
            "Not an SVG document: root element is not <svg>",
        ));
    }

    let mut width = None;
    let mut height = None;
    let mut view_box = None;
    for attr in root.attributes() {
        let attr = attr.map_err(|e| EntityError::invalid(format!("Malformed SVG: {e}")))?;
        let value = attr
            .unescape_value()
            .map_err(|e| EntityError::invalid(format!("Malformed SVG: {e}")))?;
        match attr.key.local_name().as_ref() {
            b"width" => width = parse_length(&value),
            b"height" => height = parse_length(&value),
            b"viewBox" => view_box = parse_view_box(&value),
            _ => {}
        }
    }

    if let (Some(w), Some(h)) = (width, height) {
        return Ok((w, h));
    }
    view_box.ok_or_else(|| EntityError::invalid("SVG has no usable width/height or viewBox"))
}

fn parse_length(value: &str) -> Option<f64> {
    let value = value.trim();
    value.strip_suffix("px").unwrap_or(value).trim().parse().ok()
}

fn parse_view_box(value: &str) -> Option<(f64, f64)> {
    let parts: Vec<f64> = value
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|p| !p.is_empty())
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;
    match parts.as_slice() {
        [_, _, w, h] => Some((*w, *h)),
        _ => None,
    }
}
