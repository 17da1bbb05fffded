//! Authoring helper that places hazard hotspots on the scene image.
//!
//! Positions are stored as fractions of the surface so they survive any
//! viewport size. Pixel inputs come from the host's pointer events.
use serde::{Deserialize, Serialize};

use crate::content::Hotspot;
use crate::numbers::{clamp_unit, round_hundredths};

/// Bounding rectangle of the scene surface in client pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl SurfaceRect {
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    fn fraction(origin: f64, extent: f64, pointer: f64) -> f64 {
        if extent > 0.0 {
            (pointer - origin) / extent
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPoint {
    pub x: f64,
    pub y: f64,
}

/// Map a pointer position to `[0, 1]` on both axes, rounded to 2 decimals.
///
/// A zero or negative extent maps that axis to 0.
#[must_use]
pub fn normalize_pointer(rect: SurfaceRect, pointer_x: f64, pointer_y: f64) -> NormalizedPoint {
    NormalizedPoint {
        x: round_hundredths(clamp_unit(SurfaceRect::fraction(
            rect.left, rect.width, pointer_x,
        ))),
        y: round_hundredths(clamp_unit(SurfaceRect::fraction(
            rect.top, rect.height, pointer_y,
        ))),
    }
}

/// Coordinate of a click on the surface for content authors.
///
/// Unlike [`normalize_pointer`] the value is not clamped, so clicks in the
/// margin show how far off the surface they landed.
#[must_use]
pub fn probe(rect: SurfaceRect, pointer_x: f64, pointer_y: f64) -> NormalizedPoint {
    let point = NormalizedPoint {
        x: round_hundredths(SurfaceRect::fraction(rect.left, rect.width, pointer_x)),
        y: round_hundredths(SurfaceRect::fraction(rect.top, rect.height, pointer_y)),
    };
    log::info!("hotspot probe x: {:.2}, y: {:.2}", point.x, point.y);
    point
}

/// Drag state over an editable copy of the hotspot list.
#[derive(Debug, Clone, Default)]
pub struct HotspotEditor {
    hotspots: Vec<Hotspot>,
    dragging: Option<String>,
}

impl HotspotEditor {
    #[must_use]
    pub const fn new(hotspots: Vec<Hotspot>) -> Self {
        Self {
            hotspots,
            dragging: None,
        }
    }

    #[must_use]
    pub fn hotspots(&self) -> &[Hotspot] {
        &self.hotspots
    }

    #[must_use]
    pub fn dragging(&self) -> Option<&str> {
        self.dragging.as_deref()
    }

    /// Bind `id` for dragging. Returns `false` for an unknown hotspot.
    pub fn drag_start(&mut self, id: &str) -> bool {
        if self.hotspots.iter().any(|spot| spot.id == id) {
            self.dragging = Some(id.to_string());
            true
        } else {
            false
        }
    }

    /// Move the bound hotspot to the pointer. `None` when nothing is bound.
    pub fn drag_move(
        &mut self,
        rect: SurfaceRect,
        pointer_x: f64,
        pointer_y: f64,
    ) -> Option<NormalizedPoint> {
        let id = self.dragging.as_deref()?;
        let spot = self.hotspots.iter_mut().find(|spot| spot.id == id)?;
        let point = normalize_pointer(rect, pointer_x, pointer_y);
        spot.x = point.x;
        spot.y = point.y;
        Some(point)
    }

    pub fn drag_end(&mut self) {
        if let Some(id) = self.dragging.take() {
            log::debug!("hotspot {id} released");
        }
    }

    /// Pretty JSON of the hotspot list, ready to paste into the content document.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.hotspots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECT: SurfaceRect = SurfaceRect::new(100.0, 50.0, 400.0, 200.0);

    fn spot(id: &str) -> Hotspot {
        Hotspot {
            id: id.to_string(),
            label: format!("Spot {id}"),
            x: 0.5,
            y: 0.5,
            hint: String::new(),
            fix: String::new(),
        }
    }

    #[test]
    fn pointer_inside_maps_to_fraction() {
        let point = normalize_pointer(RECT, 200.0, 100.0);
        assert!((point.x - 0.25).abs() < f64::EPSILON);
        assert!((point.y - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn outside_pointer_clamps_each_axis() {
        let point = normalize_pointer(RECT, 10.0, 900.0);
        assert!(point.x.abs() < f64::EPSILON);
        assert!((point.y - 1.0).abs() < f64::EPSILON);
        let point = normalize_pointer(RECT, 1_000.0, 51.0);
        assert!((point.x - 1.0).abs() < f64::EPSILON);
        assert!((point.y - 0.01).abs() < 1e-9);
    }

    #[test]
    fn rounds_to_two_decimals() {
        let point = normalize_pointer(RECT, 100.0 + 400.0 / 3.0, 50.0 + 200.0 * 0.666);
        assert!((point.x - 0.33).abs() < 1e-9);
        assert!((point.y - 0.67).abs() < 1e-9);
    }

    #[test]
    fn degenerate_surface_maps_to_zero() {
        let flat = SurfaceRect::new(0.0, 0.0, 0.0, -5.0);
        let point = normalize_pointer(flat, 30.0, 30.0);
        assert!(point.x.abs() < f64::EPSILON);
        assert!(point.y.abs() < f64::EPSILON);
    }

    #[test]
    fn probe_is_not_clamped() {
        let point = probe(RECT, 600.0, 0.0);
        assert!((point.x - 1.25).abs() < 1e-9);
        assert!((point.y + 0.25).abs() < 1e-9);
    }

    #[test]
    fn probe_rounds_negative_halves_up() {
        let point = probe(RECT, 50.0, 50.0);
        assert!((point.x + 0.12).abs() < 1e-9, "{point:?}");
        assert!(point.y.abs() < 1e-9);
    }

    #[test]
    fn drag_moves_only_bound_hotspot() {
        let mut editor = HotspotEditor::new(vec![spot("h1"), spot("h2")]);
        assert!(editor.drag_move(RECT, 0.0, 0.0).is_none());
        assert!(!editor.drag_start("missing"));
        assert!(editor.drag_start("h2"));
        editor.drag_move(RECT, 140.0, 70.0);
        let moved = editor.drag_move(RECT, 180.0, 90.0).unwrap();
        assert!((moved.x - 0.2).abs() < 1e-9);
        editor.drag_end();
        assert!(editor.dragging().is_none());
        assert!(editor.drag_move(RECT, 500.0, 250.0).is_none());

        let spots = editor.hotspots();
        assert!((spots[0].x - 0.5).abs() < f64::EPSILON);
        assert!((spots[1].x - 0.2).abs() < 1e-9);
        assert!((spots[1].y - 0.2).abs() < 1e-9);
    }

    #[test]
    fn export_is_pretty_hotspot_json() {
        let mut editor = HotspotEditor::new(vec![spot("h1")]);
        editor.drag_start("h1");
        editor.drag_move(RECT, 500.0, 250.0);
        let json = editor.export_json().unwrap();
        assert!(json.contains('\n'));
        let parsed: Vec<Hotspot> = serde_json::from_str(&json).unwrap();
        assert!((parsed[0].x - 1.0).abs() < f64::EPSILON);
        assert_eq!(parsed[0].id, "h1");
    }
}
