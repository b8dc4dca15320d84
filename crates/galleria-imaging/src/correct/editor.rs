// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Corner editor with drag state, display scaling, live preview and overlay for
// the four correction handles.
//
// Pointer coordinates arrive in display space (the downscaled canvas the admin
// sees). Corners are stored in source space so the final export can run at
// full resolution.

use std::sync::Arc;

use galleria_core::CorrectionConfig;
use galleria_core::error::{GalleriaError, Result};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut, draw_line_segment_mut};
use tracing::{debug, instrument, warn};

use super::dewarp::dewarp;
use super::export::ExportRequest;
use super::geometry::{Point, Quad};
use crate::image::processor::ImageProcessor;

const OUTLINE_COLOR: Rgba<u8> = Rgba([0xff, 0x6b, 0x6b, 0xff]);
const ACTIVE_HANDLE_COLOR: Rgba<u8> = Rgba([0xff, 0xe6, 0x6d, 0xff]);
const HANDLE_RING_COLOR: Rgba<u8> = Rgba([0xff, 0xff, 0xff, 0xff]);

/// Whether a handle is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    /// Dragging the corner at this index (0 = top-left, clockwise).
    Dragging(usize),
}

/// Size of the display canvas and its ratio to the source image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayScale {
    pub width: u32,
    pub height: u32,
    /// Display pixels per source pixel, never above 1.
    pub scale: f64,
}

impl DisplayScale {
    /// Fit a `source_width` x `source_height` image into `max_width`.
    pub fn fit(source_width: u32, source_height: u32, max_width: u32) -> Self {
        let scale = if source_width == 0 {
            1.0
        } else {
            (f64::from(max_width) / f64::from(source_width)).min(1.0)
        };
        let width = ((f64::from(source_width) * scale).round() as u32).max(1);
        let height = ((f64::from(source_height) * scale).round() as u32).max(1);
        Self {
            width,
            height,
            scale,
        }
    }
}

/// Interactive state for one correction session.
pub struct CornerEditor {
    source: Arc<RgbaImage>,
    /// `source` resized to the display canvas; the live preview reads this.
    display_source: RgbaImage,
    display: DisplayScale,
    corners: Quad,
    state: DragState,
    preview: Option<RgbaImage>,
    config: CorrectionConfig,
}

impl CornerEditor {
    /// Start a session on `source` with the default inset corners and render
    /// the first preview.
    #[instrument(skip_all)]
    pub fn new(source: impl Into<Arc<RgbaImage>>, config: CorrectionConfig) -> Result<Self> {
        let source: Arc<RgbaImage> = source.into();
        if source.width() == 0 || source.height() == 0 {
            return Err(GalleriaError::Decode("image has no pixels".into()));
        }

        let display_scale = DisplayScale::fit(source.width(), source.height(), config.preview_max_width);
        let display_source = ImageProcessor::from_rgba((*source).clone())
            .downscale_to_width(display_scale.width)
            .into_rgba8();
        debug!(
            source_w = source.width(),
            source_h = source.height(),
            display_w = display_scale.width,
            display_h = display_scale.height,
            scale = display_scale.scale,
            "Editor display canvas prepared"
        );

        let corners = default_corners(&source, config.inset_fraction);
        let mut editor = Self {
            source,
            display_source,
            display: display_scale,
            corners,
            state: DragState::Idle,
            preview: None,
            config,
        };
        editor.refresh_preview()?;
        Ok(editor)
    }

    // -- Accessors ------------------------------------------------------------

    pub fn corners(&self) -> Quad {
        self.corners
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn display(&self) -> DisplayScale {
        self.display
    }

    /// Latest live preview, or `None` if the current corners are degenerate.
    pub fn preview(&self) -> Option<&RgbaImage> {
        self.preview.as_ref()
    }

    // -- Pointer events -------------------------------------------------------

    /// Start dragging the first handle within the hit radius of `(x, y)`.
    ///
    /// Leaves the state untouched when no handle is close enough.
    pub fn pointer_down(&mut self, x: f64, y: f64) -> DragState {
        let pointer = Point::new(x, y);
        let radius = self.config.handle_radius_px;
        let hit = self
            .corners
            .scaled(self.display.scale)
            .corners()
            .iter()
            .position(|handle| handle.distance(pointer) <= radius);

        if let Some(index) = hit {
            debug!(index, "Corner drag started");
            self.state = DragState::Dragging(index);
        }
        self.state
    }

    /// Move the dragged corner to `(x, y)` and refresh the preview.
    ///
    /// Does nothing while idle. If the new corners are degenerate the move is
    /// kept, the preview is cleared and the error is returned.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> Result<()> {
        match self.state {
            DragState::Idle => Ok(()),
            DragState::Dragging(index) => self.move_corner(index, x, y),
        }
    }

    /// Finish a drag at `(x, y)`. Always returns to [`DragState::Idle`].
    pub fn pointer_up(&mut self, x: f64, y: f64) -> Result<()> {
        let state = std::mem::take(&mut self.state);
        match state {
            DragState::Idle => Ok(()),
            DragState::Dragging(index) => self.move_corner(index, x, y),
        }
    }

    /// Abort a drag, keeping the corner where the last move left it.
    ///
    /// Unlike [`pointer_up`](Self::pointer_up) this applies no final
    /// position; a cancelled gesture keeps only the moves already made.
    pub fn pointer_cancel(&mut self) {
        self.state = DragState::Idle;
    }

    // -- Editing --------------------------------------------------------------

    /// Put the corners back on the default inset rectangle.
    pub fn reset(&mut self) -> Result<()> {
        self.state = DragState::Idle;
        self.corners = default_corners(&self.source, self.config.inset_fraction);
        self.refresh_preview()
    }

    /// Replace all four corners (source coordinates) and refresh the preview.
    pub fn set_corners(&mut self, corners: Quad) -> Result<()> {
        self.corners = corners;
        self.refresh_preview()
    }

    /// Recompute the live preview from the downscaled source.
    #[instrument(skip(self), fields(corners = %self.corners))]
    pub fn refresh_preview(&mut self) -> Result<()> {
        let display_corners = self.corners.scaled(self.display.scale);
        match dewarp(
            &self.display_source,
            &display_corners,
            self.config.min_output_dimension,
        ) {
            Ok(preview) => {
                debug!(
                    width = preview.width(),
                    height = preview.height(),
                    "Preview refreshed"
                );
                self.preview = Some(preview);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "Preview unavailable for current corners");
                self.preview = None;
                Err(err)
            }
        }
    }

    /// Snapshot the source and corners for an export.
    ///
    /// The request owns its own copy of the corners; later edits do not
    /// affect it.
    pub fn export_request(&self, quality: f32) -> ExportRequest {
        ExportRequest::new(
            Arc::clone(&self.source),
            self.corners,
            quality,
            self.config.min_output_dimension,
        )
    }

    // -- Rendering ------------------------------------------------------------

    /// Draw the display canvas with the quad outline and corner handles.
    pub fn render_overlay(&self) -> RgbaImage {
        let mut canvas = self.display_source.clone();
        let corners = self.corners.scaled(self.display.scale);
        let points = corners.corners();

        for i in 0..points.len() {
            let (a, b) = (points[i], points[(i + 1) % points.len()]);
            // Two passes, one pixel apart, for a 2px outline.
            for offset in [0.0f32, 1.0] {
                draw_line_segment_mut(
                    &mut canvas,
                    (a.x as f32 + offset, a.y as f32),
                    (b.x as f32 + offset, b.y as f32),
                    OUTLINE_COLOR,
                );
            }
        }

        let radius = self.config.handle_draw_radius_px;
        for (index, point) in points.iter().enumerate() {
            let center = (point.x.round() as i32, point.y.round() as i32);
            let fill = if self.state == DragState::Dragging(index) {
                ACTIVE_HANDLE_COLOR
            } else {
                OUTLINE_COLOR
            };
            draw_filled_circle_mut(&mut canvas, center, radius, fill);
            draw_hollow_circle_mut(&mut canvas, center, radius, HANDLE_RING_COLOR);
            draw_hollow_circle_mut(&mut canvas, center, radius + 1, HANDLE_RING_COLOR);
        }
        canvas
    }

    // -- Internals ------------------------------------------------------------

    fn move_corner(&mut self, index: usize, x: f64, y: f64) -> Result<()> {
        if !(x.is_finite() && y.is_finite()) {
            return Ok(());
        }
        let point = self.display_to_source(x, y);
        self.corners = self.corners.with_corner(index, point);
        self.refresh_preview()
    }

    /// Clamp a display coordinate to the canvas, then map it to source space.
    fn display_to_source(&self, x: f64, y: f64) -> Point {
        let (dw, dh) = (f64::from(self.display.width), f64::from(self.display.height));
        let x = x.clamp(0.0, dw);
        let y = y.clamp(0.0, dh);
        Point::new(
            x / dw * f64::from(self.source.width()),
            y / dh * f64::from(self.source.height()),
        )
    }
}

/// Default corners: an inset rectangle `fraction` in from every edge.
pub fn default_corners(source: &RgbaImage, fraction: f64) -> Quad {
    Quad::inset(source.width(), source.height(), fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor(width: u32, height: u32) -> CornerEditor {
        let source = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
        });
        CornerEditor::new(source, CorrectionConfig::default()).expect("editor")
    }

    fn assert_close(actual: Point, expected: Point) {
        assert!(
            actual.distance(expected) < 1e-9,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn starts_idle_with_inset_corners_and_preview() {
        let editor = editor(400, 300);
        assert_eq!(editor.state(), DragState::Idle);
        assert_eq!(editor.corners(), Quad::inset(400, 300, 0.08));
        let preview = editor.preview().expect("initial preview");
        assert_eq!(preview.dimensions(), (336, 252));
    }

    #[test]
    fn pointer_down_near_corner_two_starts_drag() {
        let mut editor = editor(400, 300);
        // Corner 2 sits at (368, 276); the canvas is not scaled at this size.
        assert_eq!(editor.pointer_down(360.0, 270.0), DragState::Dragging(2));
    }

    #[test]
    fn pointer_down_away_from_handles_stays_idle() {
        let mut editor = editor(400, 300);
        assert_eq!(editor.pointer_down(200.0, 150.0), DragState::Idle);
        // Just outside the 20px radius of corner 0 at (32, 24).
        assert_eq!(editor.pointer_down(32.0, 45.0), DragState::Idle);
    }

    #[test]
    fn pointer_up_always_returns_to_idle() {
        let mut editor = editor(400, 300);
        editor.pointer_down(32.0, 24.0);
        assert_eq!(editor.state(), DragState::Dragging(0));
        editor.pointer_up(10.0, 10.0).expect("up");
        assert_eq!(editor.state(), DragState::Idle);
        assert_close(editor.corners().corners()[0], Point::new(10.0, 10.0));

        editor.pointer_down(368.0, 24.0);
        editor.pointer_cancel();
        assert_eq!(editor.state(), DragState::Idle);
    }

    #[test]
    fn degenerate_release_still_ends_drag() {
        let mut editor = editor(400, 300);
        editor.pointer_down(32.0, 24.0);
        // Clamped to (400, 0), on the line through corners 1 and 3.
        let result = editor.pointer_up(5000.0, -10.0);
        assert!(matches!(result, Err(GalleriaError::DegenerateGeometry(_))));
        assert_eq!(editor.state(), DragState::Idle);
        assert!(editor.preview().is_none());
        assert_close(editor.corners().corners()[0], Point::new(400.0, 0.0));
    }

    #[test]
    fn drag_moves_corner_and_refreshes_preview() {
        let mut editor = editor(400, 300);
        editor.pointer_down(368.0, 24.0);
        editor.pointer_move(300.0, 10.0).expect("move");
        assert_close(editor.corners().corners()[1], Point::new(300.0, 10.0));
        let preview = editor.preview().expect("preview");
        assert_ne!(preview.dimensions(), (336, 252));
    }

    #[test]
    fn cancel_keeps_last_moved_position() {
        let mut editor = editor(400, 300);
        editor.pointer_down(368.0, 24.0);
        editor.pointer_move(350.0, 30.0).expect("move");
        editor.pointer_cancel();
        assert_eq!(editor.state(), DragState::Idle);
        assert_close(editor.corners().corners()[1], Point::new(350.0, 30.0));
        assert!(editor.preview().is_some());
    }

    #[test]
    fn move_while_idle_changes_nothing() {
        let mut editor = editor(400, 300);
        let before = editor.corners();
        editor.pointer_move(10.0, 10.0).expect("idle move");
        assert_eq!(editor.corners(), before);
    }

    #[test]
    fn drag_is_clamped_to_canvas() {
        let mut editor = editor(400, 300);
        editor.pointer_down(32.0, 276.0);
        editor.pointer_move(-50.0, 900.0).expect("move");
        assert_close(editor.corners().corners()[3], Point::new(0.0, 300.0));
    }

    #[test]
    fn display_coordinates_map_back_to_source() {
        // 1800px wide source is shown at 900px: scale 0.5.
        let mut editor = editor(1800, 1200);
        assert_eq!(editor.display().width, 900);
        assert_eq!(editor.display().height, 600);
        assert!((editor.display().scale - 0.5).abs() < 1e-12);

        // Corner 0 is at (144, 96) in source, (72, 48) on screen.
        assert_eq!(editor.pointer_down(72.0, 48.0), DragState::Dragging(0));
        editor.pointer_up(100.0, 50.0).expect("up");
        assert_close(editor.corners().corners()[0], Point::new(200.0, 100.0));
    }

    #[test]
    fn degenerate_drag_clears_preview_but_keeps_corner() {
        let mut editor = editor(400, 300);
        // Drag corner 3 onto corner 0.
        editor.pointer_down(32.0, 276.0);
        let result = editor.pointer_move(32.0, 24.0);
        assert!(matches!(result, Err(GalleriaError::DegenerateGeometry(_))));
        assert!(editor.preview().is_none());
        assert_close(editor.corners().corners()[3], Point::new(32.0, 24.0));
        assert_eq!(editor.state(), DragState::Dragging(3));
    }

    #[test]
    fn reset_restores_defaults() {
        let mut editor = editor(400, 300);
        editor.pointer_down(32.0, 24.0);
        editor.pointer_move(100.0, 100.0).expect("move");
        editor.reset().expect("reset");
        assert_eq!(editor.corners(), Quad::inset(400, 300, 0.08));
        assert_eq!(editor.state(), DragState::Idle);
        assert!(editor.preview().is_some());
    }

    #[test]
    fn overlay_marks_handles() {
        let mut editor = editor(400, 300);
        let overlay = editor.render_overlay();
        assert_eq!(overlay.dimensions(), (400, 300));
        assert_eq!(*overlay.get_pixel(32, 24), OUTLINE_COLOR);

        editor.pointer_down(368.0, 276.0);
        let overlay = editor.render_overlay();
        assert_eq!(*overlay.get_pixel(368, 276), ACTIVE_HANDLE_COLOR);
    }

    #[test]
    fn empty_source_is_rejected() {
        let result = CornerEditor::new(RgbaImage::new(0, 0), CorrectionConfig::default());
        assert!(result.is_err());
    }
}
