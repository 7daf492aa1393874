//! Frame-stepped combat simulation
//!
//! All gameplay logic lives here. This module must stay deterministic:
//! - One `tick` per rendered frame, velocities in pixels per frame
//! - Time only through the injected [`clock::Clock`]
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod body;
pub mod camera;
pub mod clock;
pub mod collision;
pub mod mask;
pub mod projectile;
pub mod ship;
pub mod state;
pub mod tick;

pub use body::{Body, EntityId, InputFlags, MapBounds, PixelRect};
pub use camera::{Camera, CameraSubject, ViewFrame};
pub use clock::{Clock, ManualClock, SystemClock};
pub use collision::{ContactFrame, collision_response, detect_collisions, estimate_normal};
pub use mask::{BitMask, ShapeMask};
pub use projectile::{Projectile, ProjectileProfile};
pub use ship::{AbilitySpec, Archetype, Armed, Controllable, DeathSequence, Ship, ShipProfile};
pub use state::{CombatState, Entity, Outcome, PlayerSlot, Role, Victory};
pub use tick::{TickInput, tick};
