//! Renderer-facing contract for icon layers.
//!
//! Nothing here touches GPU state: these are the plain values an external
//! icon renderer reads to set up its draw call.

use std::sync::Arc;

use catalog::IconCatalog;
use foundation::color::Rgba;
use serde::Serialize;

/// Zoom level at which icon radii are expressed in meters 1:1.
pub const ZOOM_FACTOR_REFERENCE_ZOOM: f64 = 14.0;

pub const DEFAULT_RADIUS_MIN_PIXELS: f32 = 1.0;
pub const DEFAULT_RADIUS_MAX_PIXELS: f32 = 500.0;

/// Camera state the map view hands to each layer per frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewState {
    /// Multiplier applied to icon radii at the current zoom.
    pub radius_zoom_factor: f64,
    /// True while the user is rotating/pitching the map.
    pub drag_rotate: bool,
}

impl ViewState {
    pub fn new(radius_zoom_factor: f64, drag_rotate: bool) -> Self {
        Self {
            radius_zoom_factor,
            drag_rotate,
        }
    }

    pub fn from_zoom(zoom: f64, drag_rotate: bool) -> Self {
        Self::new(zoom_factor(zoom), drag_rotate)
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(1.0, false)
    }
}

/// `2^max(14 - zoom, 0)`: icons keep their on-screen size when zooming out.
pub fn zoom_factor(zoom: f64) -> f64 {
    if !zoom.is_finite() {
        return 1.0;
    }
    2f64.powf((ZOOM_FACTOR_REFERENCE_ZOOM - zoom).max(0.0))
}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Interaction {
    pub auto_highlight: bool,
}

/// Fixed per-draw parameters. Pixel units are forwarded as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderParams {
    pub opacity: f32,
    pub radius_scale: f64,
    pub radius_min_pixels: f32,
    /// `None` in fixed-radius mode: the renderer must not clamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius_max_pixels: Option<f32>,
    pub fp64: bool,
    pub pickable: bool,
    pub auto_highlight: bool,
    pub highlight_color: Rgba,
    pub depth_test: bool,
}

/// `id -> geometry` lookup handed to the renderer.
#[derive(Debug, Clone)]
pub struct IconGeometryLookup {
    catalog: Arc<IconCatalog>,
}

impl IconGeometryLookup {
    pub fn new(catalog: Arc<IconCatalog>) -> Self {
        Self { catalog }
    }

    pub fn get(&self, id: &str) -> Option<&[f32]> {
        self.catalog.geometry(id)
    }
}
