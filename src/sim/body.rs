//! Physical bodies: ships and projectiles share this motion model
//!
//! A body owns its kinematic state, its turn/thrust inputs and the coverage
//! mask used for overlap tests. Per frame it rotates (with a collision
//! guard), applies thrust, integrates, wraps around the map and reprojects
//! into screen space for the current camera frame.

use glam::{DVec2, IVec2};
use serde::{Deserialize, Serialize};

use super::camera::ViewFrame;
use super::mask::{BitMask, ShapeMask};
use crate::consts::*;
use crate::{clamp_speed, heading};

/// Roster-wide entity identifier
pub type EntityId = u32;

/// Size of the playable map in world pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapBounds {
    pub width: f64,
    pub height: f64,
}

impl Default for MapBounds {
    fn default() -> Self {
        Self {
            width: PLAY_WIDTH,
            height: PLAY_HEIGHT,
        }
    }
}

/// Per-frame control flags from the input collaborator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFlags {
    pub left: bool,
    pub right: bool,
    pub thrust: bool,
    pub reverse: bool,
    pub primary: bool,
    pub secondary: bool,
}

impl InputFlags {
    pub fn turning(&self) -> bool {
        self.left || self.right
    }

    pub fn accelerating(&self) -> bool {
        self.thrust || self.reverse
    }
}

/// Integer screen rectangle occupied by a body's mask
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub pos: IVec2,
    pub size: IVec2,
}

impl PixelRect {
    /// Rectangle of `size` whose centre lands on `center` (truncated)
    pub fn centered(center: DVec2, size: IVec2) -> Self {
        Self {
            pos: IVec2::new(center.x as i32 - size.x / 2, center.y as i32 - size.y / 2),
            size,
        }
    }

    pub fn center(&self) -> IVec2 {
        self.pos + self.size / 2
    }
}

/// A solid body in space
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub id: EntityId,
    /// World position (sub-pixel)
    pub pos: DVec2,
    /// Position before this frame's integration
    pub prev_pos: DVec2,
    /// World pixels per frame
    pub vel: DVec2,
    /// Sprite rotation in degrees, counterclockwise on screen
    pub angle: f64,
    /// Heading used for trig (`-90 - angle`)
    pub calc_angle: f64,
    prev_rot: (f64, f64),
    /// Degrees per frame while a turn flag is held
    pub rot_speed: f64,
    pub max_speed: f64,
    /// Velocity gained per frame of thrust
    pub accel: f64,
    /// Zero for projectiles
    pub mass: f64,
    pub life: f64,
    pub dead: bool,
    /// Crossed a map edge this frame; cleared by [`Body::finish_draw`]
    pub wrapped: bool,
    pub controls: InputFlags,
    /// Zoom the mask was last built for
    pub zoom: f64,
    silhouette: BitMask,
    pub mask: BitMask,
    pub rect: PixelRect,
    /// Velocities produced by this frame's collisions
    #[serde(skip)]
    pub collisions: Vec<DVec2>,
}

impl Body {
    /// Create a body facing `heading_deg` (clockwise from straight up)
    pub fn new(id: EntityId, pos: DVec2, heading_deg: f64, silhouette: BitMask) -> Self {
        let angle = -heading_deg;
        let calc_angle = CALC_ANGLE_BASE - angle;
        let mut body = Self {
            id,
            pos,
            prev_pos: pos,
            vel: DVec2::ZERO,
            angle,
            calc_angle,
            prev_rot: (angle, calc_angle),
            rot_speed: 0.0,
            max_speed: 0.0,
            accel: 0.0,
            mass: DEFAULT_MASS,
            life: 1.0,
            dead: false,
            wrapped: false,
            controls: InputFlags::default(),
            zoom: ZOOM_FAR,
            silhouette,
            mask: BitMask::default(),
            rect: PixelRect::centered(pos, IVec2::ZERO),
            collisions: Vec::new(),
        };
        body.rebuild_mask();
        body
    }

    pub fn with_motion(mut self, max_speed: f64, accel: f64, rot_speed: f64) -> Self {
        self.max_speed = max_speed;
        self.accel = accel;
        self.rot_speed = rot_speed;
        self
    }

    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_velocity(mut self, vel: DVec2) -> Self {
        self.vel = vel;
        self
    }

    /// Replace the turn/thrust/ability flags for this frame
    pub fn set_controls(&mut self, controls: InputFlags) {
        self.controls = controls;
    }

    /// Unrotated, unscaled shape this body's mask is derived from
    pub fn silhouette(&self) -> &BitMask {
        &self.silhouette
    }

    pub fn set_silhouette(&mut self, silhouette: BitMask) {
        self.silhouette = silhouette;
        self.rebuild_mask();
    }

    /// Regenerate the mask for the current zoom and angle, keeping the rect
    /// centred where it was. Dead bodies get an empty mask.
    pub fn rebuild_mask(&mut self) {
        let center = self.rect.center().as_dvec2();
        let mask = self.silhouette.zoomed(self.zoom).rotated(self.angle);
        self.rect = PixelRect::centered(center, mask.size());
        self.mask = mask;
        if self.dead {
            self.mask.clear();
        }
    }

    /// Turn by `rot_speed` per held flag; opposite flags cancel
    pub fn apply_rotation(&mut self) {
        self.prev_rot = (self.angle, self.calc_angle);
        if self.controls.left {
            self.angle += self.rot_speed;
            self.calc_angle -= self.rot_speed;
        }
        if self.controls.right {
            self.angle -= self.rot_speed;
            self.calc_angle += self.rot_speed;
        }
    }

    /// Undo the last [`Body::apply_rotation`] and rebuild the mask
    pub fn revert_rotation(&mut self) {
        (self.angle, self.calc_angle) = self.prev_rot;
        self.rebuild_mask();
    }

    /// Thrust adds `accel` along the heading, reverse subtracts half of it.
    /// The result is capped at `max_speed` without changing its direction.
    pub fn apply_thrust(&mut self) {
        let unit = heading(self.calc_angle);
        if self.controls.thrust {
            self.vel += unit * self.accel;
        } else if self.controls.reverse {
            self.vel -= unit * (self.accel / 2.0);
        }
        self.vel = clamp_speed(self.vel, self.max_speed);
    }

    /// Snapshot the position, then move by one frame of velocity
    pub fn integrate(&mut self) {
        self.prev_pos = self.pos;
        self.pos += self.vel;
    }

    /// Wrap across map edges.
    ///
    /// Leaving through a vertical edge re-enters on the opposite edge with y
    /// mirrored about the midline; leaving through a horizontal edge mirrors
    /// x instead. Corners go to the opposite corner. Returns whether a wrap
    /// happened.
    pub fn wrap_map(&mut self, bounds: &MapBounds) -> bool {
        let (w, h) = (bounds.width, bounds.height);
        let mut wrapped = false;

        if self.pos.x < 0.0 {
            self.pos = if self.pos.y < 0.0 {
                DVec2::new(w, h)
            } else if self.pos.y > h {
                DVec2::new(w, 0.0)
            } else {
                DVec2::new(w, h - self.pos.y)
            };
            wrapped = true;
        } else if self.pos.x > w {
            self.pos = if self.pos.y > h {
                DVec2::ZERO
            } else if self.pos.y < 0.0 {
                DVec2::new(0.0, h)
            } else {
                DVec2::new(0.0, h - self.pos.y)
            };
            wrapped = true;
        }

        if self.pos.y < 0.0 {
            self.pos = DVec2::new(w - self.pos.x, h);
            wrapped = true;
        } else if self.pos.y > h {
            self.pos = DVec2::new(w - self.pos.x, 0.0);
            wrapped = true;
        }

        if wrapped {
            self.wrapped = true;
        }
        wrapped
    }

    /// Place the mask rect at this body's projected screen position
    pub fn project(&mut self, view: &ViewFrame) {
        self.rect = PixelRect::centered(view.project(self.pos), self.mask.size());
    }

    /// Top-left screen pixel where the sprite should be drawn
    pub fn draw_position(&self, view: &ViewFrame) -> IVec2 {
        PixelRect::centered(view.project(self.pos), self.mask.size()).pos
    }

    /// Called by the renderer after drawing; ends the wrap window
    pub fn finish_draw(&mut self) {
        self.wrapped = false;
    }

    /// Adopt a new camera zoom, rebuilding the mask when it changed
    pub fn change_zoom(&mut self, view: &ViewFrame) {
        if self.zoom != view.zoom {
            self.zoom = view.zoom;
            self.rebuild_mask();
        }
        self.project(view);
    }

    /// Offset of `other`'s mask relative to ours
    #[inline]
    pub fn mask_offset(&self, other: &Body) -> IVec2 {
        other.rect.pos - self.rect.pos
    }

    /// Shared mask pixels with `other` at their current rects
    pub fn overlap_area(&self, other: &Body) -> i32 {
        self.mask.overlap_area(&other.mask, self.mask_offset(other))
    }

    /// Mark destroyed once life is gone. Returns true on the frame it dies.
    pub fn check_destroyed(&mut self) -> bool {
        if self.life <= 0.0 && !self.dead {
            self.dead = true;
            self.mask.clear();
            return true;
        }
        false
    }

    /// One frame of motion: guarded rotation, thrust, integration, wrap and
    /// projection. `others` are the rest of the roster (used only by the
    /// rotation guard). Dead bodies do not move.
    pub fn step_motion<'a>(
        &mut self,
        bounds: &MapBounds,
        view: &ViewFrame,
        others: impl IntoIterator<Item = &'a Body>,
    ) {
        self.check_destroyed();
        if self.dead {
            return;
        }

        if self.controls.turning() {
            self.apply_rotation();
            self.rebuild_mask();
            let blocked = others
                .into_iter()
                .any(|other| other.id != self.id && self.overlap_area(other) > 0);
            if blocked {
                self.revert_rotation();
            }
        }
        if self.controls.accelerating() {
            self.apply_thrust();
        }
        self.integrate();
        self.wrap_map(bounds);
        self.project(view);
    }
}
