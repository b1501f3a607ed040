//! String vocabularies of annotation documents
//!
//! Each producer of annotation files spells statuses its own way. The tables
//! here map those spellings (compared case-insensitively) onto the canonical
//! enums; nothing past this module sees the raw strings.

use std::fmt;
use std::str::FromStr;

use crate::domain::{AutomaticStatus, InvalidReason, ManualStatus, ObjectSubType, ObjectType};

/// Which pipeline stage wrote a document
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Producer {
    /// Raw detections: two-corner areas, always blurred
    Detector,
    /// Reviewed output: four-corner areas with an explicit blur flag
    #[default]
    Validator,
}

impl FromStr for Producer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "detector" => Ok(Producer::Detector),
            "validator" => Ok(Producer::Validator),
            other => Err(format!("unknown producer '{other}'")),
        }
    }
}

impl fmt::Display for Producer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Producer::Detector => write!(f, "detector"),
            Producer::Validator => write!(f, "validator"),
        }
    }
}

const DETECTOR_AUTO_STATUS: &[(&str, AutomaticStatus)] = &[
    ("none", AutomaticStatus::None),
    ("valid", AutomaticStatus::Valid),
    ("filtered-ratio", AutomaticStatus::Invalid(InvalidReason::Ratio)),
    ("filtered-size", AutomaticStatus::Invalid(InvalidReason::Size)),
    ("filtered-ratio-size", AutomaticStatus::Invalid(InvalidReason::RatioSize)),
];

const VALIDATOR_AUTO_STATUS: &[(&str, AutomaticStatus)] = &[
    ("none", AutomaticStatus::None),
    ("valid", AutomaticStatus::Valid),
    ("ratio", AutomaticStatus::Invalid(InvalidReason::Ratio)),
    ("size", AutomaticStatus::Invalid(InvalidReason::Size)),
    ("ratio-size", AutomaticStatus::Invalid(InvalidReason::RatioSize)),
    ("missingoption", AutomaticStatus::Invalid(InvalidReason::MissingOption)),
];

/// Class names, including the pose-encoding names of older detectors
const CLASS_NAMES: &[(&str, ObjectType, Option<ObjectSubType>)] = &[
    ("face", ObjectType::Face, None),
    ("front", ObjectType::Face, Some(ObjectSubType::Front)),
    ("front:profile", ObjectType::Face, Some(ObjectSubType::Front)),
    ("profile", ObjectType::Face, Some(ObjectSubType::Profile)),
    ("numberplate", ObjectType::NumberPlate, None),
    ("toblur", ObjectType::ToBlur, None),
    ("none", ObjectType::None, None),
];

fn lookup<T: Copy>(table: &[(&str, T)], value: &str) -> Option<T> {
    table
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(value))
        .map(|(_, v)| *v)
}

/// Empty and missing values count as "none"
fn normalized(value: Option<&str>) -> &str {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => "none",
    }
}

pub fn decode_class(value: Option<&str>) -> Option<(ObjectType, Option<ObjectSubType>)> {
    let value = value?.trim();
    CLASS_NAMES
        .iter()
        .find(|(name, _, _)| name.eq_ignore_ascii_case(value))
        .map(|(_, ty, sub)| (*ty, *sub))
}

pub fn decode_sub_class(value: Option<&str>) -> Option<ObjectSubType> {
    let value = value?.trim();
    ObjectSubType::ALL
        .into_iter()
        .find(|sub| sub.as_str().eq_ignore_ascii_case(value))
}

/// Unknown spellings decode to `None`, as if the pipeline had not run
pub fn decode_auto_status(producer: Producer, value: Option<&str>) -> AutomaticStatus {
    let table = match producer {
        Producer::Detector => DETECTOR_AUTO_STATUS,
        Producer::Validator => VALIDATOR_AUTO_STATUS,
    };
    let value = normalized(value);
    lookup(table, value).unwrap_or_else(|| {
        log::debug!("Unknown {} autoStatus '{}'", producer, value);
        AutomaticStatus::None
    })
}

pub fn decode_manual_status(value: Option<&str>) -> ManualStatus {
    let value = normalized(value);
    [ManualStatus::None, ManualStatus::Valid, ManualStatus::Invalid]
        .into_iter()
        .find(|status| status.as_str().eq_ignore_ascii_case(value))
        .unwrap_or_default()
}

pub fn is_yes(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case("yes"))
}

pub fn is_no(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case("no"))
}

pub fn encode_flag(value: bool) -> &'static str {
    if value { "Yes" } else { "No" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_producer_tables_differ() {
        assert_eq!(
            decode_auto_status(Producer::Detector, Some("Filtered-Ratio")),
            AutomaticStatus::Invalid(InvalidReason::Ratio)
        );
        assert_eq!(
            decode_auto_status(Producer::Validator, Some("filtered-ratio")),
            AutomaticStatus::None
        );
        assert_eq!(
            decode_auto_status(Producer::Validator, Some("MISSINGOPTION")),
            AutomaticStatus::Invalid(InvalidReason::MissingOption)
        );
        assert_eq!(decode_auto_status(Producer::Detector, None), AutomaticStatus::None);
        assert_eq!(decode_auto_status(Producer::Detector, Some("")), AutomaticStatus::None);
    }

    #[test]
    fn test_canonical_names_decode_with_validator_table() {
        for reason in [
            InvalidReason::Ratio,
            InvalidReason::Size,
            InvalidReason::RatioSize,
            InvalidReason::MissingOption,
        ] {
            let status = AutomaticStatus::Invalid(reason);
            assert_eq!(decode_auto_status(Producer::Validator, Some(status.as_str())), status);
        }
    }

    #[test]
    fn test_class_names() {
        assert_eq!(decode_class(Some("FACE")), Some((ObjectType::Face, None)));
        assert_eq!(
            decode_class(Some("front:profile")),
            Some((ObjectType::Face, Some(ObjectSubType::Front)))
        );
        assert_eq!(decode_class(Some("car")), None);
        assert_eq!(decode_class(None), None);
        assert_eq!(decode_sub_class(Some("eyes")), Some(ObjectSubType::Eyes));
        assert_eq!(decode_sub_class(Some("side")), None);
    }

    #[test]
    fn test_flags_and_manual_status() {
        assert!(is_yes(Some("Yes")));
        assert!(!is_yes(Some("no")));
        assert!(is_no(Some("NO")));
        assert!(!is_no(None));
        assert_eq!(decode_manual_status(Some("invalid")), ManualStatus::Invalid);
        assert_eq!(decode_manual_status(Some("maybe")), ManualStatus::None);
        assert_eq!("Detector".parse::<Producer>(), Ok(Producer::Detector));
        assert!("reviewer".parse::<Producer>().is_err());
    }
}
