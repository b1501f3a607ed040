//! Raw document layout, mirrored field for field
//!
//! Everything is optional on read: a missing key leaves the corresponding
//! annotation field at its default instead of failing the load.

use serde::{Deserialize, Serialize};

/// Directive line written by the pipeline tools; not valid YAML 1.2
pub const DIRECTIVE: &str = "%YAML:1.0";

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub source_image: Option<String>,
    #[serde(default)]
    pub objects: Vec<Item>,
    #[serde(default, rename = "invalidObjects", skip_serializing_if = "Vec::is_empty")]
    pub invalid_objects: Vec<Item>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub sub_class_name: Option<String>,
    #[serde(default)]
    pub area: Area,
    #[serde(default)]
    pub params: Params,
    #[serde(default)]
    pub auto_status: Option<String>,
    #[serde(default)]
    pub manual_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub false_positive: Option<String>,
    #[serde(default)]
    pub blur_object: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub childrens: Vec<Item>,
}

/// Corners as `[x, y]` pairs; two-corner areas only carry `p1` and `p2`
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Area {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p1: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p2: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p3: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p4: Option<[f64; 2]>,
}

impl Area {
    pub fn is_two_point(&self) -> bool {
        self.p3.is_none() && self.p4.is_none()
    }
}

/// Projection frame the area is expressed in; angles in radians
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Params {
    #[serde(default)]
    pub azimuth: f64,
    #[serde(default)]
    pub elevation: f64,
    #[serde(default)]
    pub aperture: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

/// Drop the directive line so the rest parses as plain YAML
pub fn strip_directive(text: &str) -> &str {
    let trimmed = text.trim_start_matches('\u{feff}');
    if trimmed.starts_with("%YAML") {
        trimmed.split_once('\n').map_or("", |(_, rest)| rest)
    } else {
        trimmed
    }
}
