//! Message types for an interactive viewing session
//!
//! This module contains:
//! - Input enum: pointer, wheel, keyboard and resize events fed to the viewer
//! - ViewerEvent enum: signals the viewer emits back to its host

use crate::domain::{AnnotationId, Point};

// ============================================================================
// Inputs
// ============================================================================

/// Mouse button of a press or double-click
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    /// Pans the view; double-click opens the editor
    Primary,
    /// Creates, moves and resizes annotations; double-click jumps to one
    Secondary,
}

/// Modifier keys the viewer tracks
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Control,
}

/// Input event in widget coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Input {
    Press { button: PointerButton, position: Point },
    Move { position: Point },
    Release,
    DoubleClick { button: PointerButton, position: Point },
    /// Wheel rotation in notches; positive is away from the user
    Wheel { notches: i32 },
    Key { key: Key, pressed: bool },
    /// The widget was resized
    Resize { width: u32, height: u32 },
}

// ============================================================================
// Signals
// ============================================================================

/// Signal for the host after an input was handled
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewerEvent {
    /// The annotation list changed
    RefreshLabels,
    /// New scale factor, times ten
    ScaleSliderChanged(i32),
    /// Live size of the annotation being drawn, in widget pixels
    DimensionTooltip { width: i32, height: i32 },
    /// Open the editor for an annotation
    OpenEditor(AnnotationId),
}
