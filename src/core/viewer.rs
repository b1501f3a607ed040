//! View controller for one open panorama
//!
//! This module contains:
//! - PanoramaViewer: view state, rendered frame and annotation list
//! - Rendering and the per-render annotation remapping
//! - Zoom, orientation and annotation list commands

use std::path::Path;
use std::time::Instant;

use image::RgbaImage;

use crate::config::ViewerConfig;
use crate::core::visibility::{Sight, is_visible};
use crate::domain::{Annotation, AnnotationId, Point, ProjectionParams, RESIZE_CORNER, ViewState, clamp};
use crate::error::ViewerError;
use crate::panorama::PanoramaImage;
use crate::projection::project;
use crate::session::{Input, Mode, Permissions, ViewerEvent, handlers};

/// Interactive rectilinear view of an equirectangular panorama
pub struct PanoramaViewer {
    pub(crate) config: ViewerConfig,
    pub(crate) view: ViewState,
    pub(crate) panorama: Option<PanoramaImage>,
    frame: RgbaImage,
    pub(crate) annotations: Vec<Annotation>,
    pub(crate) mode: Mode,
    pub(crate) control_pressed: bool,
    pub permissions: Permissions,
    next_id: AnnotationId,
    pub(crate) sight: Sight,
}

impl Default for PanoramaViewer {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}

impl PanoramaViewer {
    pub fn new(config: ViewerConfig) -> Self {
        let view = ViewState::new(initial_zoom(&config), config.scale_factor);
        Self {
            config,
            view,
            panorama: None,
            frame: RgbaImage::new(0, 0),
            annotations: Vec::new(),
            mode: Mode::Idle,
            control_pressed: false,
            permissions: Permissions::default(),
            next_id: 0,
            sight: Sight::default(),
        }
    }

    /// Apply a configuration and a widget size; the view is reset to its default zoom
    pub fn setup(&mut self, width: u32, height: u32, config: &ViewerConfig) {
        self.config = config.clone();
        self.view = ViewState::new(initial_zoom(config), config.scale_factor);
        self.view.set_widget_size(width, height);
        self.mode = Mode::Idle;
        self.update_sight();
        log::debug!(
            "Viewer setup: widget {}x{}, zoom {}..{} deg, {} thread(s)",
            width,
            height,
            config.zoom_min,
            config.zoom_max,
            config.threads
        );
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// The frame currently displayed
    pub fn current_frame(&self) -> ProjectionParams {
        self.view.frame()
    }

    /// Last rendered destination buffer
    pub fn frame_image(&self) -> &RgbaImage {
        &self.frame
    }

    pub fn sight(&self) -> Sight {
        self.sight
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn panorama(&self) -> Option<&PanoramaImage> {
        self.panorama.as_ref()
    }

    // ========================================================================
    // Panorama
    // ========================================================================

    pub fn load_panorama(&mut self, path: impl AsRef<Path>) -> Result<(), ViewerError> {
        let panorama = PanoramaImage::open(path)?;
        self.set_panorama(panorama)
    }

    pub fn set_panorama(&mut self, panorama: PanoramaImage) -> Result<(), ViewerError> {
        log::info!("Opened panorama {}", panorama.path.display());
        self.panorama = Some(panorama);
        self.render()
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Re-render the destination buffer and remap every annotation into it
    pub fn render(&mut self) -> Result<(), ViewerError> {
        let frame = self.view.frame();
        let started = Instant::now();

        let image = match &self.panorama {
            Some(panorama) => project(
                &panorama.rgba,
                &frame,
                self.config.interpolation,
                self.config.threads,
            )?,
            None => {
                log::debug!("No panorama loaded, rendering a blank frame");
                RgbaImage::new(frame.width, frame.height)
            }
        };
        self.frame = image;
        self.view.set_old_size(frame.width, frame.height);
        self.update_sight();

        for annotation in &mut self.annotations {
            // Pipeline annotations are never resized from the viewer
            let eligible = annotation.auto_status.is_manual() && annotation.params().same_view(&frame);
            annotation.set_resize_enabled(eligible);
            annotation.map_to(&frame);
            let visible = is_visible(annotation, &frame);
            annotation.set_visible(visible);
            for child in &mut annotation.children {
                let visible = is_visible(child, &frame);
                child.set_visible(visible);
            }
        }

        log::debug!(
            "Rendered {}x{} view in {:?}",
            frame.width,
            frame.height,
            started.elapsed()
        );
        Ok(())
    }

    fn update_sight(&mut self) {
        let (width, height) = self.view.dest_size();
        self.sight = Sight::new(
            width,
            height,
            self.config.sight_width,
            self.view.scale_factor(),
            self.view.aperture(),
        );
    }

    /// Set the zoom in degrees, clamped to the configured range
    pub fn set_zoom(&mut self, zoom_deg: f64) -> Result<(), ViewerError> {
        self.backup_position();
        let zoom = clamp(zoom_deg, self.config.zoom_min, self.config.zoom_max);
        self.view.set_aperture_delta(zoom);
        self.render()
    }

    /// Set the orientation in radians
    pub fn set_view(&mut self, azimuth: f64, elevation: f64) -> Result<(), ViewerError> {
        self.backup_position();
        self.view.set_orientation(azimuth, elevation);
        self.render()
    }

    pub fn set_scale_factor(&mut self, scale_factor: f64) -> Result<(), ViewerError> {
        self.view.set_scale_factor(scale_factor);
        self.render()
    }

    /// Snapshot the orientation before a change
    pub fn backup_position(&mut self) {
        self.view.backup();
    }

    /// Update the widget size; re-renders when the destination size changed
    pub fn resize(&mut self, width: u32, height: u32) -> Result<bool, ViewerError> {
        self.view.set_widget_size(width, height);
        if self.view.dest_size() == self.view.old_size() {
            return Ok(false);
        }
        self.render()?;
        Ok(true)
    }

    /// Snap the view to the frame an annotation was drawn in
    pub fn jump_to_annotation(&mut self, id: AnnotationId) -> Result<bool, ViewerError> {
        let Some(params) = self.annotation(id).map(|a| *a.params()) else {
            return Ok(false);
        };
        self.backup_position();
        self.view.set_orientation(params.azimuth, params.elevation);
        self.view.set_aperture(params.aperture);
        self.render()?;
        Ok(true)
    }

    /// Feed one input event through the interaction state machine
    pub fn handle_input(&mut self, input: Input) -> Result<Vec<ViewerEvent>, ViewerError> {
        handlers::handle_input(self, input)
    }

    // ========================================================================
    // Annotation list
    // ========================================================================

    /// Add loaded annotations, renumbering them from the viewer's counter
    pub fn add_annotations(&mut self, annotations: impl IntoIterator<Item = Annotation>) -> Vec<AnnotationId> {
        let mut ids = Vec::new();
        for mut annotation in annotations {
            annotation.id = self.next_annotation_id();
            annotation.set_resize_enabled(false);
            ids.push(annotation.id);
            self.annotations.push(annotation);
        }
        log::info!("Added {} annotation(s)", ids.len());
        ids
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn annotation(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    pub fn annotation_mut(&mut self, id: AnnotationId) -> Option<&mut Annotation> {
        self.annotations.iter_mut().find(|a| a.id == id)
    }

    pub fn remove_annotation(&mut self, id: AnnotationId) -> Option<Annotation> {
        let index = self.annotations.iter().position(|a| a.id == id)?;
        if self.mode.target() == Some(id) {
            self.mode = Mode::Idle;
        }
        Some(self.annotations.remove(index))
    }

    pub fn clear_annotations(&mut self) {
        if self.mode.target().is_some() {
            self.mode = Mode::Idle;
        }
        self.annotations.clear();
    }

    pub(crate) fn next_annotation_id(&mut self) -> AnnotationId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    // ========================================================================
    // Hit testing and coordinates
    // ========================================================================

    /// Map widget coordinates into destination buffer coordinates
    pub fn widget_to_scene(&self, p: Point) -> Point {
        let (widget_w, widget_h) = self.view.widget_size();
        let (dest_w, dest_h) = self.view.dest_size();
        if widget_w == 0 || widget_h == 0 {
            return p;
        }
        Point::new(
            p.x * dest_w as f64 / widget_w as f64,
            p.y * dest_h as f64 / widget_h as f64,
        )
    }

    /// Topmost visible annotation under a scene point
    pub fn hit_test(&self, p: Point) -> Option<AnnotationId> {
        self.annotations
            .iter()
            .rev()
            .filter(|a| a.is_visible())
            .find(|a| a.contains(p) || self.near_resize_corner(a, p))
            .map(|a| a.id)
    }

    pub(crate) fn near_resize_corner(&self, annotation: &Annotation, p: Point) -> bool {
        let corner = annotation.point(RESIZE_CORNER);
        let margin = self.config.resize_handle_margin;
        (p.x - corner.x).abs() <= margin && (p.y - corner.y).abs() <= margin
    }
}

fn initial_zoom(config: &ViewerConfig) -> f64 {
    clamp(config.zoom_default, config.zoom_min, config.zoom_max)
}
