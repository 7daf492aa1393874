//! Star map framing: zoom level, view sector and screen projection
//!
//! The view follows the two ships. When they are far apart the whole map is
//! shown (zoom 4); as they close in the camera zooms to half (2) or a quarter
//! (1) of the map around their midpoint.

use glam::{DVec2, IVec2};
use serde::{Deserialize, Serialize};

use super::body::MapBounds;
use crate::consts::*;

/// Projection from world space into play-area screen space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewFrame {
    /// Current zoom (4.0 = whole map)
    pub zoom: f64,
    /// World-space top-left of the visible sector
    pub origin: DVec2,
    /// Sub-pixel scroll correction in screen pixels
    pub extra: IVec2,
}

impl Default for ViewFrame {
    fn default() -> Self {
        Self::full_map()
    }
}

impl ViewFrame {
    /// Whole map, no scroll
    pub fn full_map() -> Self {
        Self {
            zoom: ZOOM_FAR,
            origin: DVec2::ZERO,
            extra: IVec2::ZERO,
        }
    }

    /// Screen pixels per world pixel
    #[inline]
    pub fn scale(&self) -> f64 {
        ZOOM_FAR / self.zoom
    }

    /// World position to screen position
    pub fn project(&self, world: DVec2) -> DVec2 {
        (world - self.origin) * self.scale() + self.extra.as_dvec2()
    }
}

/// What the camera needs to know about each ship
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSubject {
    pub pos: DVec2,
    pub dead: bool,
    /// Death sequence reached its last frame
    pub finished: bool,
}

/// Duel camera
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    pub frame: ViewFrame,
    pub center: DVec2,
    bounds: MapBounds,
}

impl Camera {
    pub fn new(bounds: MapBounds) -> Self {
        Self {
            frame: ViewFrame::full_map(),
            center: DVec2::new(bounds.width / 2.0, bounds.height / 2.0),
            bounds,
        }
    }

    /// Reframe around the two ships and return the new view
    pub fn update(&mut self, one: CameraSubject, two: CameraSubject) -> ViewFrame {
        let lo = one.pos.min(two.pos);
        let span = (one.pos - two.pos).abs();
        let (w, h) = (self.bounds.width, self.bounds.height);

        let mut zoom = if span.x > w / 2.0 || span.y > h / 2.0 {
            ZOOM_FAR
        } else if span.x > w / 4.0 || span.y > h / 4.0 {
            ZOOM_MID
        } else {
            ZOOM_NEAR
        };
        // Close in on the wreck while the survivor is still around
        if (one.finished || two.finished) && !(one.dead && two.dead) {
            zoom = ZOOM_NEAR;
        }

        let mut center = if !one.dead && two.finished {
            one.pos
        } else if one.finished && !two.dead {
            two.pos
        } else {
            lo + span / 2.0
        };

        let scale = ZOOM_FAR / zoom;
        if zoom < ZOOM_FAR {
            let half = DVec2::new(w, h) / (2.0 * scale);
            center = center.clamp(half, DVec2::new(w, h) - half);
        }

        let frame = if zoom < ZOOM_FAR {
            let half = DVec2::new(w, h) / (2.0 * scale);
            ViewFrame {
                zoom,
                origin: (center - half).trunc(),
                extra: IVec2::new(
                    -(center.x.fract() * scale) as i32,
                    -(center.y.fract() * scale) as i32,
                ),
            }
        } else {
            ViewFrame::full_map()
        };

        if frame.zoom != self.frame.zoom {
            log::debug!("camera zoom {} -> {}", self.frame.zoom, frame.zoom);
        }
        self.center = center;
        self.frame = frame;
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alive(x: f64, y: f64) -> CameraSubject {
        CameraSubject {
            pos: DVec2::new(x, y),
            dead: false,
            finished: false,
        }
    }

    #[test]
    fn test_zoom_follows_separation() {
        let mut camera = Camera::new(MapBounds::default());
        assert_eq!(camera.update(alive(0.0, 0.0), alive(500.0, 0.0)).zoom, ZOOM_FAR);
        assert_eq!(camera.update(alive(300.0, 300.0), alive(550.0, 300.0)).zoom, ZOOM_MID);
        assert_eq!(camera.update(alive(400.0, 300.0), alive(450.0, 300.0)).zoom, ZOOM_NEAR);
    }

    #[test]
    fn test_center_clamped_near_edges() {
        let mut camera = Camera::new(MapBounds::default());
        let frame = camera.update(alive(10.0, 10.0), alive(20.0, 20.0));
        assert_eq!(frame.zoom, ZOOM_NEAR);
        // Quarter-map view cannot leave the map
        assert_eq!(camera.center, DVec2::new(100.0, 75.0));
        assert_eq!(frame.origin, DVec2::ZERO);
    }

    #[test]
    fn test_survivor_framed_after_wreck_finishes() {
        let mut camera = Camera::new(MapBounds::default());
        let wreck = CameraSubject {
            pos: DVec2::new(700.0, 500.0),
            dead: true,
            finished: true,
        };
        let frame = camera.update(alive(400.0, 300.0), wreck);
        assert_eq!(frame.zoom, ZOOM_NEAR);
        assert_eq!(camera.center, DVec2::new(400.0, 300.0));
    }

    #[test]
    fn test_projection_scales_and_offsets() {
        let frame = ViewFrame {
            zoom: ZOOM_MID,
            origin: DVec2::new(200.0, 150.0),
            extra: IVec2::new(-1, 0),
        };
        assert_eq!(frame.project(DVec2::new(210.0, 160.0)), DVec2::new(19.0, 20.0));
        let full = ViewFrame::full_map();
        assert_eq!(full.project(DVec2::new(12.5, 7.0)), DVec2::new(12.5, 7.0));
    }

    #[test]
    fn test_sub_pixel_extra() {
        let mut camera = Camera::new(MapBounds::default());
        let frame = camera.update(alive(400.0, 300.0), alive(450.5, 300.0));
        // Midpoint 425.25 at 4x scale leaves one screen pixel of slack
        assert_eq!(frame.extra, IVec2::new(-1, 0));
    }
}
