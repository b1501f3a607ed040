//! Interaction mode of a viewing session

use crate::domain::{AnnotationId, Point};

/// Current pointer interaction; every variant carries only its own data
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Mode {
    #[default]
    Idle,
    /// Dragging the view; start angles are in degrees
    Pan {
        origin: Point,
        start_azimuth_deg: f64,
        start_elevation_deg: f64,
    },
    /// Drawing a new annotation; `target` is set on the first move
    CreateAnnotation {
        anchor: Point,
        target: Option<AnnotationId>,
    },
    /// Dragging a whole annotation, `offsets[i]` is pointer minus corner `i`
    MoveAnnotation {
        target: AnnotationId,
        offsets: [Point; 4],
    },
    /// Dragging the bottom-right corner
    ResizeAnnotation { target: AnnotationId, offset: Point },
}

impl Mode {
    pub fn is_idle(&self) -> bool {
        matches!(self, Mode::Idle)
    }

    /// Short name for log output
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Idle => "Idle",
            Mode::Pan { .. } => "Pan",
            Mode::CreateAnnotation { .. } => "CreateAnnotation",
            Mode::MoveAnnotation { .. } => "MoveAnnotation",
            Mode::ResizeAnnotation { .. } => "ResizeAnnotation",
        }
    }

    /// Annotation being edited, if any
    pub fn target(&self) -> Option<AnnotationId> {
        match self {
            Mode::CreateAnnotation { target, .. } => *target,
            Mode::MoveAnnotation { target, .. } | Mode::ResizeAnnotation { target, .. } => Some(*target),
            Mode::Idle | Mode::Pan { .. } => None,
        }
    }
}

/// Independent switches gating each kind of interaction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Permissions {
    /// Panning with the primary button
    pub move_enabled: bool,
    /// Wheel zoom
    pub zoom_enabled: bool,
    pub create_enabled: bool,
    /// Both double-click actions
    pub edit_enabled: bool,
}

impl Default for Permissions {
    fn default() -> Self {
        Self {
            move_enabled: true,
            zoom_enabled: true,
            create_enabled: true,
            edit_enabled: true,
        }
    }
}
