//! Chaotic Hegemony - physics and collision core for a two-ship space duel
//!
//! Core modules:
//! - `sim`: Frame-stepped simulation (motion, wrapping, pixel-mask collisions, impulses)
//! - `settings`: Duel configuration (map bounds, ship selection)
//! - `error`: Recoverable error taxonomy
//!
//! Rendering, audio, input polling and asset loading live outside this crate.
//! A presentation layer calls [`sim::tick`] once per frame and reads back
//! body positions, health, energy and death-sequence frames.

pub mod error;
pub mod settings;
pub mod sim;

pub use error::{CombatError, ConfigError};
pub use settings::CombatSettings;

use glam::DVec2;

/// Game configuration constants
pub mod consts {
    /// Desired frames per second; one `tick` per frame
    pub const FPS: f64 = 64.0;

    /// Play area dimensions in world pixels (fully zoomed out)
    pub const PLAY_WIDTH: f64 = 800.0;
    pub const PLAY_HEIGHT: f64 = 600.0;

    /// Zoom levels. 4.0 shows the whole map, 1.0 is the closest view.
    pub const ZOOM_FAR: f64 = 4.0;
    pub const ZOOM_MID: f64 = 2.0;
    pub const ZOOM_NEAR: f64 = 1.0;

    /// Default body mass (projectiles override with 0.0)
    pub const DEFAULT_MASS: f64 = 5.0;

    /// Death sequence: frames 0..TERMINAL are explosion stages
    pub const DEATH_TERMINAL_FRAME: u8 = 5;
    /// Explosion stages with visible debris before the terminal blank frame
    pub const DEATH_VISIBLE_FRAMES: u8 = 4;
    /// Milliseconds between death sequence frames (7 per second)
    pub const DEATH_FRAME_MS: f64 = 1000.0 / 7.0;

    /// Sprite-up convention: calculation angle = CALC_ANGLE_BASE - orientation
    pub const CALC_ANGLE_BASE: f64 = -90.0;
}

/// Scale a vector down so its magnitude does not exceed `max`.
///
/// Vectors already within the cap are returned unchanged, so both sign and
/// angle survive. Direction is never snapped to an axis.
#[inline]
pub fn clamp_speed(v: DVec2, max: f64) -> DVec2 {
    if v.length_squared() > max * max {
        let angle = v.y.atan2(v.x);
        DVec2::new(max * angle.cos(), max * angle.sin())
    } else {
        v
    }
}

/// Unit vector for an angle in degrees (screen coordinates, y down)
#[inline]
pub fn heading(degrees: f64) -> DVec2 {
    let rad = degrees.to_radians();
    DVec2::new(rad.cos(), rad.sin())
}
