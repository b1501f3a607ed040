//! Annotation documents
//!
//! This module contains:
//! - Loading annotation lists written by the detector or validator tools
//! - Writing annotation lists in the canonical four-corner form
//!
//! A document looks like:
//!
//! ```yaml
//! %YAML:1.0
//! ---
//! source_image: /data/pano_0001.jpg
//! objects:
//!   - className: Face
//!     subClassName: Front
//!     area: { p1: [10.0, 20.0], p2: [30.0, 20.0], p3: [30.0, 50.0], p4: [10.0, 50.0] }
//!     params: { azimuth: 0.2, elevation: -0.1, aperture: 1.2, width: 1000, height: 800 }
//!     autoStatus: Valid
//!     manualStatus: None
//!     blurObject: Yes
//! ```

pub mod vocabulary;
pub mod yml;

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{
    Annotation, AutomaticStatus, InvalidReason, ManualStatus, Point, ProjectionParams, rigid_quad,
};
use crate::error::CodecError;

pub use vocabulary::Producer;
use yml::{Area, Document, Item, Params};

/// Read an annotation file
pub fn load(path: impl AsRef<Path>, producer: Producer) -> Result<Vec<Annotation>, CodecError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| CodecError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let annotations = from_str(&text, producer).map_err(|source| CodecError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!(
        "Loaded {} annotation(s) from {} ({})",
        annotations.len(),
        path.display(),
        producer
    );
    Ok(annotations)
}

/// Write an annotation file
pub fn save(path: impl AsRef<Path>, annotations: &[Annotation]) -> Result<(), CodecError> {
    let path = path.as_ref();
    let text = to_string(annotations)?;
    fs::write(path, text).map_err(|source| CodecError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("Saved {} annotation(s) to {}", annotations.len(), path.display());
    Ok(())
}

pub fn from_str(text: &str, producer: Producer) -> Result<Vec<Annotation>, serde_yaml::Error> {
    let body = yml::strip_directive(text);
    let document: Document = if body.trim().is_empty() {
        Document::default()
    } else {
        serde_yaml::from_str(body)?
    };

    let source_image = PathBuf::from(document.source_image.unwrap_or_default());
    let mut annotations = Vec::with_capacity(document.objects.len() + document.invalid_objects.len());

    for item in &document.objects {
        let mut annotation = decode_item(item, producer, producer == Producer::Detector);
        annotation.source_image = source_image.clone();
        annotations.push(annotation);
    }
    for item in &document.invalid_objects {
        let mut annotation = decode_item(item, producer, producer == Producer::Detector);
        if !matches!(annotation.auto_status, AutomaticStatus::Invalid(_)) {
            annotation.auto_status = AutomaticStatus::Invalid(InvalidReason::MissingOption);
        }
        annotation.source_image = source_image.clone();
        annotations.push(annotation);
    }
    Ok(annotations)
}

pub fn to_string(annotations: &[Annotation]) -> Result<String, CodecError> {
    let document = Document {
        source_image: Some(
            annotations
                .first()
                .map(|a| a.source_image.to_string_lossy().into_owned())
                .unwrap_or_default(),
        ),
        objects: annotations.iter().map(encode_item).collect(),
        invalid_objects: Vec::new(),
    };
    let body = serde_yaml::to_string(&document)?;
    Ok(format!("{}\n---\n{}", yml::DIRECTIVE, body))
}

// ============================================================================
// Decoding
// ============================================================================

fn decode_item(item: &Item, producer: Producer, two_point: bool) -> Annotation {
    let mut annotation = Annotation::new(decode_area(&item.area, two_point), decode_params(&item.params));

    if let Some((object_type, sub_type)) = vocabulary::decode_class(item.class_name.as_deref()) {
        annotation.object_type = object_type;
        if let Some(sub_type) = sub_type {
            annotation.sub_type = sub_type;
        }
    }
    if let Some(sub_type) = vocabulary::decode_sub_class(item.sub_class_name.as_deref()) {
        annotation.sub_type = sub_type;
    }

    annotation.auto_status = vocabulary::decode_auto_status(producer, item.auto_status.as_deref());
    annotation.manual_status = vocabulary::decode_manual_status(item.manual_status.as_deref());
    // Legacy flag, only meaningful for hand-drawn regions
    if annotation.auto_status.is_manual() {
        let false_positive = item.false_positive.as_deref();
        if vocabulary::is_no(false_positive) {
            annotation.manual_status = ManualStatus::Valid;
        } else if vocabulary::is_yes(false_positive) {
            annotation.manual_status = ManualStatus::Invalid;
        }
    }

    annotation.blurred = match producer {
        Producer::Detector => true,
        Producer::Validator => vocabulary::is_yes(item.blur_object.as_deref()),
    };

    annotation.children = item
        .childrens
        .iter()
        .map(|child| decode_item(child, producer, child.area.is_two_point()))
        .collect();
    annotation.set_resize_enabled(false);
    annotation
}

fn decode_area(area: &Area, two_point: bool) -> [Point; 4] {
    let point = |p: Option<[f64; 2]>| p.map_or(Point::default(), |[x, y]| Point::new(x, y));
    if two_point {
        rigid_quad(point(area.p1), point(area.p2))
    } else {
        [point(area.p1), point(area.p2), point(area.p3), point(area.p4)]
    }
}

fn decode_params(params: &Params) -> ProjectionParams {
    ProjectionParams::new(
        params.azimuth,
        params.elevation,
        params.aperture,
        params.width.round() as u32,
        params.height.round() as u32,
    )
}

// ============================================================================
// Encoding
// ============================================================================

fn encode_item(annotation: &Annotation) -> Item {
    let [p1, p2, p3, p4] = annotation.proj_points().map(|p| [p.x, p.y]);
    let params = annotation.params();
    Item {
        class_name: Some(annotation.object_type.as_str().to_string()),
        sub_class_name: Some(annotation.sub_type.as_str().to_string()),
        area: Area {
            p1: Some(p1),
            p2: Some(p2),
            p3: Some(p3),
            p4: Some(p4),
        },
        params: Params {
            azimuth: params.azimuth,
            elevation: params.elevation,
            aperture: params.aperture,
            width: params.width as f64,
            height: params.height as f64,
        },
        auto_status: Some(annotation.auto_status.as_str().to_string()),
        manual_status: Some(annotation.manual_status.as_str().to_string()),
        false_positive: None,
        blur_object: Some(vocabulary::encode_flag(annotation.blurred).to_string()),
        childrens: annotation.children.iter().map(encode_item).collect(),
    }
}
