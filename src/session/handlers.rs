//! Input handlers for the interaction state machine
//!
//! Every handler takes the viewer and one input, and returns the signals the
//! host should act on. Geometry updates that would leave the sight, or that
//! target an annotation drawn in another view, are dropped without error:
//! the drag sticks until a later event is acceptable again.

use crate::core::PanoramaViewer;
use crate::domain::{
    Annotation, AnnotationId, ManualStatus, Point, RESIZE_CORNER, clamp, clamp_azimuth, clamp_elevation,
    deg_to_rad, rad_to_deg, rigid_quad,
};
use crate::error::ViewerError;
use crate::session::messages::{Input, Key, PointerButton, ViewerEvent};
use crate::session::state::Mode;

/// Pan speed relative to the aperture, matched to a 2:1 panorama
const PAN_SPEED: f64 = 0.1;

/// Dispatch one input event
pub fn handle_input(viewer: &mut PanoramaViewer, input: Input) -> Result<Vec<ViewerEvent>, ViewerError> {
    match input {
        Input::Press { button, position } => {
            let scene = viewer.widget_to_scene(position);
            handle_press(viewer, button, scene);
            Ok(Vec::new())
        }
        Input::Move { position } => {
            let scene = viewer.widget_to_scene(position);
            handle_move(viewer, scene)
        }
        Input::Release => Ok(handle_release(viewer)),
        Input::DoubleClick { button, position } => {
            let scene = viewer.widget_to_scene(position);
            handle_double_click(viewer, button, scene)
        }
        Input::Wheel { notches } => handle_wheel(viewer, notches),
        Input::Key {
            key: Key::Control,
            pressed,
        } => {
            viewer.control_pressed = pressed;
            Ok(Vec::new())
        }
        Input::Resize { width, height } => {
            viewer.resize(width, height)?;
            Ok(Vec::new())
        }
    }
}

fn set_mode(viewer: &mut PanoramaViewer, mode: Mode) {
    if viewer.mode.name() != mode.name() {
        log::debug!("Mode: {} -> {}", viewer.mode.name(), mode.name());
    }
    viewer.mode = mode;
}

// ============================================================================
// Press
// ============================================================================

fn handle_press(viewer: &mut PanoramaViewer, button: PointerButton, p: Point) {
    if !viewer.mode.is_idle() {
        return;
    }
    match button {
        PointerButton::Primary => {
            if !viewer.permissions.move_enabled {
                return;
            }
            let mode = Mode::Pan {
                origin: p,
                start_azimuth_deg: rad_to_deg(viewer.view.azimuth()),
                start_elevation_deg: rad_to_deg(viewer.view.elevation()),
            };
            set_mode(viewer, mode);
        }
        PointerButton::Secondary => match viewer.hit_test(p) {
            Some(id) => select_annotation(viewer, id, p),
            None => {
                if !viewer.permissions.create_enabled || !viewer.sight.contains(p, 0.0) {
                    return;
                }
                set_mode(
                    viewer,
                    Mode::CreateAnnotation {
                        anchor: p,
                        target: None,
                    },
                );
            }
        },
    }
}

/// Start moving or resizing the annotation under the pointer
fn select_annotation(viewer: &mut PanoramaViewer, id: AnnotationId, p: Point) {
    let Some(annotation) = viewer.annotation(id) else {
        return;
    };
    let offsets = annotation.points().map(|corner| p - corner);
    let mode = if annotation.is_resize_enabled() && viewer.near_resize_corner(annotation, p) {
        Mode::ResizeAnnotation {
            target: id,
            offset: offsets[RESIZE_CORNER],
        }
    } else {
        Mode::MoveAnnotation { target: id, offsets }
    };
    set_mode(viewer, mode);
}

// ============================================================================
// Move
// ============================================================================

fn handle_move(viewer: &mut PanoramaViewer, p: Point) -> Result<Vec<ViewerEvent>, ViewerError> {
    match viewer.mode {
        Mode::Idle => Ok(Vec::new()),
        Mode::Pan {
            origin,
            start_azimuth_deg,
            start_elevation_deg,
        } => {
            pan(viewer, p - origin, start_azimuth_deg, start_elevation_deg)?;
            Ok(Vec::new())
        }
        Mode::CreateAnnotation { anchor, target } => Ok(drag_creation(viewer, anchor, target, p)),
        Mode::MoveAnnotation { target, offsets } => {
            drag_move(viewer, target, &offsets, p);
            Ok(Vec::new())
        }
        Mode::ResizeAnnotation { target, offset } => Ok(drag_resize(viewer, target, offset, p)),
    }
}

fn pan(
    viewer: &mut PanoramaViewer,
    delta: Point,
    start_azimuth_deg: f64,
    start_elevation_deg: f64,
) -> Result<(), ViewerError> {
    let step = viewer.view.aperture() * PAN_SPEED / (2.0 * viewer.view.scale_factor());
    let azimuth = clamp_azimuth(start_azimuth_deg - delta.x * step, -360.0, 360.0);
    let elevation = clamp_elevation(start_elevation_deg + delta.y * step);
    viewer.set_view(deg_to_rad(azimuth), deg_to_rad(elevation))
}

fn drag_creation(
    viewer: &mut PanoramaViewer,
    anchor: Point,
    target: Option<AnnotationId>,
    p: Point,
) -> Vec<ViewerEvent> {
    if !viewer.sight.contains(p, 0.0) {
        log::debug!("Creation drag outside the sight ignored");
        return Vec::new();
    }

    let Some(id) = target else {
        let id = start_annotation(viewer, anchor);
        viewer.mode = Mode::CreateAnnotation {
            anchor,
            target: Some(id),
        };
        return vec![ViewerEvent::RefreshLabels];
    };

    let corner = clamped_corner(viewer, id, p);
    let frame = viewer.current_frame();
    let scale = viewer.view.scale_factor();
    let Some(annotation) = viewer.annotation_mut(id) else {
        return Vec::new();
    };
    if annotation.is_stale(&frame) {
        log::debug!("Creation of annotation {} ignored: view changed", id);
        return Vec::new();
    }
    annotation.set_point3_rigid(corner);
    annotation.set_projection_params(frame);
    annotation.set_projection_points();
    vec![dimension_tooltip(annotation, scale)]
}

/// Instantiate the annotation being drawn, collapsed onto the anchor
fn start_annotation(viewer: &mut PanoramaViewer, anchor: Point) -> AnnotationId {
    let mut annotation = Annotation::new([anchor; 4], viewer.current_frame());
    annotation.id = viewer.next_annotation_id();
    annotation.manual_status = ManualStatus::Valid;
    annotation.blurred = true;
    annotation.border_width = viewer.config.default_border_width;
    if let Some(panorama) = &viewer.panorama {
        annotation.source_image = panorama.path.clone();
    }
    let id = annotation.id;
    log::debug!("Created annotation {} at ({}, {})", id, anchor.x, anchor.y);
    viewer.annotations.push(annotation);
    id
}

fn drag_move(viewer: &mut PanoramaViewer, id: AnnotationId, offsets: &[Point; 4], p: Point) {
    let frame = viewer.current_frame();
    let sight = viewer.sight;
    let Some(annotation) = viewer.annotation_mut(id) else {
        return;
    };
    if !sight.contains_quad(&annotation.simulate_move(p, offsets)) {
        log::debug!("Move of annotation {} would leave the sight", id);
        return;
    }
    if annotation.is_stale(&frame) {
        log::debug!("Move of annotation {} ignored: view changed", id);
        return;
    }
    annotation.move_to(p, offsets);
    annotation.set_projection_params(frame);
    annotation.set_projection_points();
}

fn drag_resize(viewer: &mut PanoramaViewer, id: AnnotationId, offset: Point, p: Point) -> Vec<ViewerEvent> {
    let corner = clamped_corner(viewer, id, p - offset);
    let frame = viewer.current_frame();
    let sight = viewer.sight;
    let scale = viewer.view.scale_factor();
    let Some(annotation) = viewer.annotation_mut(id) else {
        return Vec::new();
    };
    if !sight.contains_quad(&rigid_quad(annotation.point(0), corner)) {
        log::debug!("Resize of annotation {} would leave the sight", id);
        return Vec::new();
    }
    if annotation.is_stale(&frame) {
        log::debug!("Resize of annotation {} ignored: view changed", id);
        return Vec::new();
    }
    annotation.set_point3_rigid(corner);
    annotation.set_projection_params(frame);
    annotation.set_projection_points();
    vec![dimension_tooltip(annotation, scale)]
}

/// Bottom-right corner for pointer `p`: at least the minimum size away from
/// corner 1 and no further than the widget's edge
fn clamped_corner(viewer: &PanoramaViewer, id: AnnotationId, p: Point) -> Point {
    let origin = viewer.annotation(id).map(|a| a.point(0)).unwrap_or(p);
    let (width, height) = viewer.view.widget_size();
    let min = viewer.config.min_annotation_size;
    Point::new(
        clamp(p.x, origin.x + min, width as f64),
        clamp(p.y, origin.y + min, height as f64),
    )
}

fn dimension_tooltip(annotation: &Annotation, scale: f64) -> ViewerEvent {
    let (width, height) = annotation.size();
    ViewerEvent::DimensionTooltip {
        width: (width / scale) as i32,
        height: (height / scale) as i32,
    }
}

// ============================================================================
// Release
// ============================================================================

fn handle_release(viewer: &mut PanoramaViewer) -> Vec<ViewerEvent> {
    let mut events = Vec::new();
    if let Mode::CreateAnnotation { target: Some(id), .. } = viewer.mode {
        let frame = viewer.current_frame();
        // Accepted creation moves already committed the stored corners
        if let Some(annotation) = viewer.annotation_mut(id) {
            let fresh = !annotation.is_stale(&frame);
            annotation.set_resize_enabled(fresh);
            log::debug!("Finalized annotation {}", id);
            events.push(ViewerEvent::RefreshLabels);
        }
    }
    set_mode(viewer, Mode::Idle);
    events
}

// ============================================================================
// Double-click and wheel
// ============================================================================

fn handle_double_click(
    viewer: &mut PanoramaViewer,
    button: PointerButton,
    p: Point,
) -> Result<Vec<ViewerEvent>, ViewerError> {
    if !viewer.permissions.edit_enabled {
        return Ok(Vec::new());
    }
    let Some(id) = viewer.hit_test(p) else {
        return Ok(Vec::new());
    };
    match button {
        PointerButton::Primary => Ok(vec![ViewerEvent::OpenEditor(id)]),
        PointerButton::Secondary => {
            viewer.jump_to_annotation(id)?;
            Ok(Vec::new())
        }
    }
}

fn handle_wheel(viewer: &mut PanoramaViewer, notches: i32) -> Result<Vec<ViewerEvent>, ViewerError> {
    if viewer.control_pressed {
        let scale = viewer.view.scale_factor() + notches as f64 * viewer.config.wheel_scale_step;
        viewer.set_scale_factor(scale)?;
        let slider = (viewer.view.scale_factor() * 10.0) as i32;
        return Ok(vec![ViewerEvent::ScaleSliderChanged(slider)]);
    }

    if !viewer.permissions.zoom_enabled {
        return Ok(Vec::new());
    }
    let old_zoom = viewer.view.aperture_delta();
    let zoom = clamp(
        old_zoom - notches as f64 * viewer.config.wheel_zoom_step,
        viewer.config.zoom_min,
        viewer.config.zoom_max,
    );
    if zoom != old_zoom {
        viewer.set_zoom(zoom)?;
    }
    Ok(Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use crate::domain::ObjectType;
    use approx::assert_abs_diff_eq;

    fn viewer() -> PanoramaViewer {
        let mut viewer = PanoramaViewer::default();
        viewer.setup(1000, 800, &ViewerConfig::default());
        viewer.render().unwrap();
        viewer
    }

    fn send(viewer: &mut PanoramaViewer, input: Input) -> Vec<ViewerEvent> {
        handle_input(viewer, input).unwrap()
    }

    fn press(viewer: &mut PanoramaViewer, button: PointerButton, x: f64, y: f64) {
        send(
            viewer,
            Input::Press {
                button,
                position: Point::new(x, y),
            },
        );
    }

    fn move_to(viewer: &mut PanoramaViewer, x: f64, y: f64) -> Vec<ViewerEvent> {
        send(
            viewer,
            Input::Move {
                position: Point::new(x, y),
            },
        )
    }

    /// Draw the 60x60 annotation at (500, 400) and return its id
    fn draw(viewer: &mut PanoramaViewer) -> AnnotationId {
        press(viewer, PointerButton::Secondary, 500.0, 400.0);
        move_to(viewer, 510.0, 410.0);
        move_to(viewer, 560.0, 460.0);
        send(viewer, Input::Release);
        viewer.annotations().last().map(|a| a.id).unwrap()
    }

    #[test]
    fn test_create_sequence() {
        let mut viewer = viewer();
        press(&mut viewer, PointerButton::Secondary, 500.0, 400.0);
        assert_eq!(viewer.mode().name(), "CreateAnnotation");

        assert_eq!(move_to(&mut viewer, 510.0, 410.0), vec![ViewerEvent::RefreshLabels]);
        let ann = &viewer.annotations()[0];
        assert_eq!(ann.points(), &[Point::new(500.0, 400.0); 4]);
        assert_eq!(ann.object_type, ObjectType::None);
        assert_eq!(ann.manual_status, ManualStatus::Valid);
        assert!(ann.blurred);

        let events = move_to(&mut viewer, 560.0, 460.0);
        assert_eq!(events, vec![ViewerEvent::DimensionTooltip { width: 60, height: 60 }]);
        assert_eq!(viewer.annotations()[0].point(1), Point::new(560.0, 400.0));
        assert_eq!(viewer.annotations()[0].point(3), Point::new(500.0, 460.0));

        assert_eq!(send(&mut viewer, Input::Release), vec![ViewerEvent::RefreshLabels]);
        let ann = &viewer.annotations()[0];
        assert!(viewer.mode().is_idle());
        assert_eq!(ann.proj_points(), ann.points());
        assert!(!ann.is_stale(&viewer.current_frame()));
    }

    #[test]
    fn test_creation_keeps_minimum_size() {
        let mut viewer = viewer();
        press(&mut viewer, PointerButton::Secondary, 500.0, 400.0);
        move_to(&mut viewer, 510.0, 410.0);
        move_to(&mut viewer, 450.0, 350.0);
        assert_eq!(viewer.annotations()[0].point(2), Point::new(504.0, 404.0));
    }

    #[test]
    fn test_scale_change_mid_creation_keeps_drawn_corners() {
        let mut viewer = viewer();
        press(&mut viewer, PointerButton::Secondary, 500.0, 400.0);
        move_to(&mut viewer, 510.0, 410.0);
        move_to(&mut viewer, 560.0, 460.0);
        send(
            &mut viewer,
            Input::Key {
                key: Key::Control,
                pressed: true,
            },
        );
        send(&mut viewer, Input::Wheel { notches: -25 });
        assert_eq!(viewer.view().dest_size(), (500, 400));

        // The live quad follows the smaller buffer
        let shown = viewer.annotations()[0].point(2);
        assert_abs_diff_eq!(shown.x, 280.0, epsilon = 1e-6);
        assert_abs_diff_eq!(shown.y, 230.0, epsilon = 1e-6);

        send(&mut viewer, Input::Release);
        let ann = &viewer.annotations()[0];
        assert_eq!(ann.proj_points()[0], Point::new(500.0, 400.0));
        assert_eq!(ann.proj_points()[2], Point::new(560.0, 460.0));
        assert_eq!((ann.params().width, ann.params().height), (1000, 800));
    }

    #[test]
    fn test_zoom_mid_creation_freezes_annotation() {
        let mut viewer = viewer();
        press(&mut viewer, PointerButton::Secondary, 500.0, 400.0);
        move_to(&mut viewer, 510.0, 410.0);
        move_to(&mut viewer, 560.0, 460.0);
        send(&mut viewer, Input::Wheel { notches: 1 });

        assert!(move_to(&mut viewer, 600.0, 500.0).is_empty());
        assert_eq!(send(&mut viewer, Input::Release), vec![ViewerEvent::RefreshLabels]);

        let ann = &viewer.annotations()[0];
        assert_eq!(ann.proj_points()[2], Point::new(560.0, 460.0));
        assert!(ann.is_stale(&viewer.current_frame()));
        assert!(!ann.is_resize_enabled());
    }

    #[test]
    fn test_creation_outside_sight_is_ignored() {
        let mut viewer = viewer();
        press(&mut viewer, PointerButton::Secondary, 10.0, 10.0);
        assert!(viewer.mode().is_idle());

        viewer.permissions.create_enabled = false;
        press(&mut viewer, PointerButton::Secondary, 500.0, 400.0);
        assert!(viewer.mode().is_idle());
    }

    #[test]
    fn test_pan_follows_pointer() {
        let mut viewer = viewer();
        press(&mut viewer, PointerButton::Primary, 500.0, 400.0);
        move_to(&mut viewer, 400.0, 450.0);

        let step = deg_to_rad(100.0) * PAN_SPEED / 2.0;
        assert_abs_diff_eq!(rad_to_deg(viewer.view().azimuth()), 100.0 * step, epsilon = 1e-9);
        assert_abs_diff_eq!(rad_to_deg(viewer.view().elevation()), 50.0 * step, epsilon = 1e-9);

        send(&mut viewer, Input::Release);
        viewer.permissions.move_enabled = false;
        press(&mut viewer, PointerButton::Primary, 500.0, 400.0);
        assert!(viewer.mode().is_idle());
    }

    #[test]
    fn test_move_keeps_grab_point() {
        let mut viewer = viewer();
        let id = draw(&mut viewer);
        press(&mut viewer, PointerButton::Secondary, 520.0, 420.0);
        assert_eq!(viewer.mode().name(), "MoveAnnotation");

        move_to(&mut viewer, 530.0, 440.0);
        let ann = viewer.annotation(id).unwrap();
        assert_eq!(ann.point(0), Point::new(510.0, 420.0));
        assert_eq!(ann.proj_points(), ann.points());
    }

    #[test]
    fn test_move_out_of_sight_sticks() {
        let mut viewer = viewer();
        let id = draw(&mut viewer);
        press(&mut viewer, PointerButton::Secondary, 520.0, 420.0);
        move_to(&mut viewer, 900.0, 420.0);
        assert_eq!(viewer.annotation(id).unwrap().point(0), Point::new(500.0, 400.0));

        // The drag resumes once the quad fits again
        move_to(&mut viewer, 525.0, 420.0);
        assert_eq!(viewer.annotation(id).unwrap().point(0), Point::new(505.0, 400.0));
    }

    #[test]
    fn test_move_after_view_change_is_ignored() {
        let mut viewer = viewer();
        let id = draw(&mut viewer);
        press(&mut viewer, PointerButton::Secondary, 520.0, 420.0);
        send(&mut viewer, Input::Wheel { notches: 1 });
        let before = *viewer.annotation(id).unwrap().points();

        move_to(&mut viewer, 530.0, 430.0);
        assert_eq!(viewer.annotation(id).unwrap().points(), &before);
    }

    #[test]
    fn test_resize_from_bottom_right_corner() {
        let mut viewer = viewer();
        let id = draw(&mut viewer);
        press(&mut viewer, PointerButton::Secondary, 562.0, 462.0);
        assert_eq!(viewer.mode().name(), "ResizeAnnotation");

        let events = move_to(&mut viewer, 582.0, 492.0);
        assert_eq!(events, vec![ViewerEvent::DimensionTooltip { width: 80, height: 90 }]);
        let ann = viewer.annotation(id).unwrap();
        assert_eq!(ann.point(2), Point::new(580.0, 490.0));
        assert_eq!(ann.point(0), Point::new(500.0, 400.0));
    }

    #[test]
    fn test_stale_annotation_is_moved_not_resized() {
        let mut viewer = viewer();
        let id = draw(&mut viewer);
        viewer.set_view(0.0, 0.0).unwrap();
        viewer.set_zoom(99.0).unwrap();
        assert!(!viewer.annotation(id).unwrap().is_resize_enabled());

        let corner = viewer.annotation(id).unwrap().point(2);
        press(&mut viewer, PointerButton::Secondary, corner.x - 1.0, corner.y - 1.0);
        assert_eq!(viewer.mode().name(), "MoveAnnotation");
    }

    #[test]
    fn test_wheel_zoom_and_scale() {
        let mut viewer = viewer();
        send(&mut viewer, Input::Wheel { notches: 2 });
        assert_eq!(viewer.view().aperture_delta(), 97.0);

        send(&mut viewer, Input::Wheel { notches: -100 });
        assert_eq!(viewer.view().aperture_delta(), 120.0);

        viewer.permissions.zoom_enabled = false;
        send(&mut viewer, Input::Wheel { notches: 4 });
        assert_eq!(viewer.view().aperture_delta(), 120.0);

        send(
            &mut viewer,
            Input::Key {
                key: Key::Control,
                pressed: true,
            },
        );
        let events = send(&mut viewer, Input::Wheel { notches: -25 });
        assert_eq!(events, vec![ViewerEvent::ScaleSliderChanged(5)]);
        assert_eq!(viewer.frame_image().dimensions(), (500, 400));
    }

    #[test]
    fn test_double_click_actions() {
        let mut viewer = viewer();
        let id = draw(&mut viewer);
        let events = send(
            &mut viewer,
            Input::DoubleClick {
                button: PointerButton::Primary,
                position: Point::new(520.0, 420.0),
            },
        );
        assert_eq!(events, vec![ViewerEvent::OpenEditor(id)]);

        viewer.set_zoom(60.0).unwrap();
        let rect = viewer.annotation(id).unwrap().bounding_rect();
        let inside = Point::new((rect.left + rect.right) / 2.0, (rect.top + rect.bottom) / 2.0);
        assert_eq!(viewer.hit_test(inside), Some(id));
        send(
            &mut viewer,
            Input::DoubleClick {
                button: PointerButton::Secondary,
                position: inside,
            },
        );
        assert!(viewer.annotation(id).unwrap().params().same_view(&viewer.current_frame()));
        assert_eq!(viewer.view().aperture_delta().round(), 100.0);

        viewer.permissions.edit_enabled = false;
        let events = send(
            &mut viewer,
            Input::DoubleClick {
                button: PointerButton::Primary,
                position: Point::new(520.0, 420.0),
            },
        );
        assert!(events.is_empty());
    }

    #[test]
    fn test_resize_event_rerenders() {
        let mut viewer = viewer();
        send(&mut viewer, Input::Resize { width: 640, height: 800 });
        assert_eq!(viewer.frame_image().dimensions(), (640, 800));
    }
}
