//! Annotation types for marking regions on a panorama
//!
//! An annotation keeps two copies of its corners: the displayed corners, in
//! the frame currently shown, and the projected corners, in the frame it was
//! drawn (or last edited) in. Only the second copy is persisted.

use std::path::PathBuf;

use super::geometry::{Point, Rect, quad_contains};
use super::view::ProjectionParams;
use crate::projection::point::{PointClass, reproject_point};

/// Identifier of an annotation within one viewer
pub type AnnotationId = u32;

/// Index of the bottom-right corner, the only one that can be dragged
pub const RESIZE_CORNER: usize = 2;

/// What the region contains
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ObjectType {
    Face,
    NumberPlate,
    ToBlur,
    #[default]
    None,
}

impl ObjectType {
    pub const ALL: [ObjectType; 4] = [
        ObjectType::Face,
        ObjectType::NumberPlate,
        ObjectType::ToBlur,
        ObjectType::None,
    ];

    /// Canonical name used in annotation documents
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectType::Face => "Face",
            ObjectType::NumberPlate => "NumberPlate",
            ObjectType::ToBlur => "ToBlur",
            ObjectType::None => "None",
        }
    }
}

/// Refinement of the object type (pose of a face, eyes region)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ObjectSubType {
    #[default]
    None,
    Front,
    Profile,
    Back,
    Top,
    Eyes,
}

impl ObjectSubType {
    pub const ALL: [ObjectSubType; 6] = [
        ObjectSubType::None,
        ObjectSubType::Front,
        ObjectSubType::Profile,
        ObjectSubType::Back,
        ObjectSubType::Top,
        ObjectSubType::Eyes,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ObjectSubType::None => "None",
            ObjectSubType::Front => "Front",
            ObjectSubType::Profile => "Profile",
            ObjectSubType::Back => "Back",
            ObjectSubType::Top => "Top",
            ObjectSubType::Eyes => "Eyes",
        }
    }
}

/// Why the automatic pipeline rejected a region
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvalidReason {
    Ratio,
    Size,
    RatioSize,
    MissingOption,
}

/// Verdict of the detection/validation pipeline
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AutomaticStatus {
    /// Not produced by the pipeline (drawn by hand)
    #[default]
    None,
    Valid,
    Invalid(InvalidReason),
}

impl AutomaticStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AutomaticStatus::None => "None",
            AutomaticStatus::Valid => "Valid",
            AutomaticStatus::Invalid(InvalidReason::Ratio) => "Ratio",
            AutomaticStatus::Invalid(InvalidReason::Size) => "Size",
            AutomaticStatus::Invalid(InvalidReason::RatioSize) => "Ratio-Size",
            AutomaticStatus::Invalid(InvalidReason::MissingOption) => "MissingOption",
        }
    }

    pub fn is_manual(self) -> bool {
        self == AutomaticStatus::None
    }
}

/// Verdict of a human reviewer
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ManualStatus {
    #[default]
    None,
    Valid,
    Invalid,
}

impl ManualStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ManualStatus::None => "None",
            ManualStatus::Valid => "Valid",
            ManualStatus::Invalid => "Invalid",
        }
    }
}

/// A quadrilateral region marked on the panorama
#[derive(Clone, Debug, PartialEq)]
pub struct Annotation {
    pub id: AnnotationId,
    points: [Point; 4],
    proj_points: [Point; 4],
    params: ProjectionParams,
    pub object_type: ObjectType,
    pub sub_type: ObjectSubType,
    pub auto_status: AutomaticStatus,
    pub manual_status: ManualStatus,
    pub blurred: bool,
    resize_enabled: bool,
    visible: bool,
    /// Pixels trimmed from each side of the bounding box when cropping
    pub border_width: f64,
    pub source_image: PathBuf,
    pub children: Vec<Annotation>,
}

impl Default for Annotation {
    fn default() -> Self {
        Self {
            id: 0,
            points: [Point::default(); 4],
            proj_points: [Point::default(); 4],
            params: ProjectionParams::default(),
            object_type: ObjectType::None,
            sub_type: ObjectSubType::None,
            auto_status: AutomaticStatus::None,
            manual_status: ManualStatus::None,
            blurred: false,
            resize_enabled: false,
            visible: true,
            border_width: 0.0,
            source_image: PathBuf::new(),
            children: Vec::new(),
        }
    }
}

impl Annotation {
    /// Annotation whose corners are already expressed in `params`
    pub fn new(points: [Point; 4], params: ProjectionParams) -> Self {
        Self {
            points,
            proj_points: points,
            params,
            ..Self::default()
        }
    }

    /// Annotation spanned by two opposite corners
    pub fn from_corners(top_left: Point, bottom_right: Point, params: ProjectionParams) -> Self {
        Self::new(rigid_quad(top_left, bottom_right), params)
    }

    /// Corners as currently displayed, clockwise from the top-left
    pub fn points(&self) -> &[Point; 4] {
        &self.points
    }

    pub fn point(&self, index: usize) -> Point {
        self.points[index]
    }

    /// Corners in the stored projection frame
    pub fn proj_points(&self) -> &[Point; 4] {
        &self.proj_points
    }

    pub fn params(&self) -> &ProjectionParams {
        &self.params
    }

    pub fn set_points(&mut self, points: [Point; 4]) {
        self.points = points;
    }

    /// Move corner 3 and re-derive corners 2 and 4 from corners 1 and 3
    pub fn set_point3_rigid(&mut self, p: Point) {
        self.points = rigid_quad(self.points[0], p);
    }

    /// Corners after a drag to `pointer`, keeping each corner's grab offset
    pub fn simulate_move(&self, pointer: Point, offsets: &[Point; 4]) -> [Point; 4] {
        [
            pointer - offsets[0],
            pointer - offsets[1],
            pointer - offsets[2],
            pointer - offsets[3],
        ]
    }

    pub fn move_to(&mut self, pointer: Point, offsets: &[Point; 4]) {
        self.points = self.simulate_move(pointer, offsets);
    }

    /// Record the frame the displayed corners are expressed in
    pub fn set_projection_params(&mut self, params: ProjectionParams) {
        self.params = params;
    }

    /// Commit the displayed corners as the stored projection corners
    pub fn set_projection_points(&mut self) {
        self.proj_points = self.points;
    }

    /// Reproject the stored corners into `frame`.
    ///
    /// Corners that land behind the camera keep their previous display
    /// position; the visibility check hides the annotation in that case.
    pub fn map_to(&mut self, frame: &ProjectionParams) {
        if self.params == *frame {
            self.points = self.proj_points;
        } else {
            for (point, proj) in self.points.iter_mut().zip(self.proj_points.iter()) {
                match reproject_point(&self.params, *proj, frame) {
                    PointClass::Visible(p) | PointClass::OutOfBounds(p) => *point = p,
                    PointClass::Behind => {}
                }
            }
        }
        for child in &mut self.children {
            child.map_to(frame);
        }
    }

    /// Width and height spanned by corners 1 and 3
    pub fn size(&self) -> (f64, f64) {
        (
            self.points[2].x - self.points[0].x,
            self.points[2].y - self.points[0].y,
        )
    }

    pub fn bounding_rect(&self) -> Rect {
        Rect::bounding(&self.points).unwrap_or_default()
    }

    /// Bounding box of the stored corners
    pub fn proj_bounding_rect(&self) -> Rect {
        Rect::bounding(&self.proj_points).unwrap_or_default()
    }

    pub fn contains(&self, p: Point) -> bool {
        quad_contains(&self.points, p)
    }

    /// True when `frame` shows a different view than the stored one
    pub fn is_stale(&self, frame: &ProjectionParams) -> bool {
        !self.params.same_view(frame)
    }

    pub fn is_resize_enabled(&self) -> bool {
        self.resize_enabled
    }

    pub fn set_resize_enabled(&mut self, enabled: bool) {
        self.resize_enabled = enabled;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

/// Axis-aligned quad from corner 1 (top-left) and corner 3 (bottom-right)
pub fn rigid_quad(p1: Point, p3: Point) -> [Point; 4] {
    [p1, Point::new(p3.x, p1.y), p3, Point::new(p1.x, p3.y)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::view::deg_to_rad;
    use approx::assert_abs_diff_eq;

    fn frame() -> ProjectionParams {
        ProjectionParams::new(0.3, -0.2, deg_to_rad(90.0), 1000, 800)
    }

    #[test]
    fn test_rigid_resize_derives_corners() {
        let anchor = Point::new(500.0, 400.0);
        let mut ann = Annotation::new([anchor; 4], frame());
        ann.set_point3_rigid(Point::new(560.0, 460.0));
        assert_eq!(
            ann.points(),
            &[
                Point::new(500.0, 400.0),
                Point::new(560.0, 400.0),
                Point::new(560.0, 460.0),
                Point::new(500.0, 460.0),
            ]
        );
        assert_eq!(ann.size(), (60.0, 60.0));
    }

    #[test]
    fn test_move_keeps_grab_offsets() {
        let ann = Annotation::from_corners(Point::new(10.0, 20.0), Point::new(30.0, 50.0), frame());
        let grab = Point::new(15.0, 25.0);
        let offsets = ann.points().map(|p| grab - p);

        let moved = ann.simulate_move(Point::new(115.0, 125.0), &offsets);
        assert_eq!(moved[0], Point::new(110.0, 120.0));
        assert_eq!(moved[2], Point::new(130.0, 150.0));
        // simulate_move never touches the annotation itself
        assert_eq!(ann.point(0), Point::new(10.0, 20.0));
    }

    #[test]
    fn test_map_to_same_frame_is_identity() {
        let corners = rigid_quad(Point::new(321.5, 200.25), Point::new(410.0, 290.0));
        let mut ann = Annotation::new(corners, frame());
        ann.set_points([Point::default(); 4]);
        ann.map_to(&frame());
        assert_eq!(ann.points(), &corners);
    }

    #[test]
    fn test_map_to_round_trip_through_other_frame() {
        let corners = rigid_quad(Point::new(450.0, 350.0), Point::new(550.0, 450.0));
        let mut ann = Annotation::new(corners, frame());

        let mut other = frame();
        other.azimuth += 0.1;
        ann.map_to(&other);
        assert!(ann.point(0).x < 450.0);

        ann.map_to(&frame());
        for (mapped, original) in ann.points().iter().zip(corners.iter()) {
            assert_abs_diff_eq!(mapped.x, original.x, epsilon = 1e-6);
            assert_abs_diff_eq!(mapped.y, original.y, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_children_follow_parent_mapping() {
        let mut parent = Annotation::from_corners(Point::new(400.0, 300.0), Point::new(600.0, 500.0), frame());
        parent.children.push(Annotation::from_corners(
            Point::new(450.0, 350.0),
            Point::new(500.0, 380.0),
            frame(),
        ));

        let shifted = ProjectionParams { azimuth: 0.35, ..frame() };
        parent.map_to(&shifted);
        assert_ne!(parent.children[0].point(0), Point::new(450.0, 350.0));
    }

    #[test]
    fn test_staleness_ignores_output_size() {
        let ann = Annotation::new([Point::default(); 4], frame());
        assert!(!ann.is_stale(&frame().with_size(10, 10)));
        let mut moved = frame();
        moved.elevation = 0.0;
        assert!(ann.is_stale(&moved));
    }

    #[test]
    fn test_canonical_names() {
        assert_eq!(AutomaticStatus::Invalid(InvalidReason::RatioSize).as_str(), "Ratio-Size");
        assert_eq!(ObjectType::NumberPlate.as_str(), "NumberPlate");
        assert_eq!(ObjectSubType::Eyes.as_str(), "Eyes");
        assert_eq!(ManualStatus::Invalid.as_str(), "Invalid");
    }
}
