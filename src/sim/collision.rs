//! Collision detection and rebound response between bodies
//!
//! Overlap comes from pixel masks. The contact normal is estimated from how
//! the overlap area changes when one mask is nudged a pixel along each axis,
//! then the 1-D elastic exchange is applied along that normal while the
//! tangential velocity carries over unchanged.
//!
//! Across a wrap discontinuity the gradient is meaningless, so the exchange
//! is applied to x and y independently instead (a head-on approximation).

use glam::{DVec2, IVec2};

use super::body::Body;
use super::mask::ShapeMask;
use crate::error::CombatError;

/// Unit normal and tangent at a contact
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactFrame {
    /// Direction in which shifting the other mask increases overlap
    pub normal: DVec2,
    /// Normal rotated a quarter turn
    pub tangent: DVec2,
}

/// Estimate the contact normal from the overlap-area gradient.
///
/// `offset` is the position of `b`'s mask relative to `a`'s.
pub fn estimate_normal(
    a: &dyn ShapeMask,
    b: &dyn ShapeMask,
    offset: IVec2,
) -> Result<ContactFrame, CombatError> {
    let dx = a.overlap_area(b, offset + IVec2::X) - a.overlap_area(b, offset - IVec2::X);
    let dy = a.overlap_area(b, offset + IVec2::Y) - a.overlap_area(b, offset - IVec2::Y);
    if dx == 0 && dy == 0 {
        return Err(CombatError::DegenerateNormal);
    }

    let (dx, dy) = (dx as f64, dy as f64);
    let mag = dx.hypot(dy);
    Ok(ContactFrame {
        normal: DVec2::new(dx / mag, dy / mag),
        tangent: DVec2::new(-dy / mag, dx / mag),
    })
}

/// 1-D elastic collision: new velocity of body 1
#[inline]
pub fn elastic_exchange(v1: f64, m1: f64, v2: f64, m2: f64) -> f64 {
    (v1 * (m1 - m2) + 2.0 * m2 * v2) / (m1 + m2)
}

/// Exchange the normal components, keep the tangential one
pub fn resolve_along_normal(
    v1: DVec2,
    m1: f64,
    v2: DVec2,
    m2: f64,
    contact: &ContactFrame,
) -> DVec2 {
    let perp = v1.dot(contact.normal);
    let perp_other = v2.dot(contact.normal);
    let prll = v1.dot(contact.tangent);
    let new_perp = elastic_exchange(perp, m1, perp_other, m2);
    contact.normal * new_perp + contact.tangent * prll
}

/// Treat each axis as the collision normal (wrap fallback)
pub fn resolve_per_axis(v1: DVec2, m1: f64, v2: DVec2, m2: f64) -> DVec2 {
    DVec2::new(
        elastic_exchange(v1.x, m1, v2.x, m2),
        elastic_exchange(v1.y, m1, v2.y, m2),
    )
}

/// Rebound velocity for `body` if it overlaps a massive `other`
pub fn collision_response(body: &Body, other: &Body) -> Option<DVec2> {
    if other.mass == 0.0 {
        return None;
    }
    let offset = body.mask_offset(other);
    if body.mask.overlap_area(&other.mask, offset) == 0 {
        return None;
    }

    if body.wrapped || other.wrapped {
        log::trace!("wrapped collision {} <- {}", body.id, other.id);
        return Some(resolve_per_axis(body.vel, body.mass, other.vel, other.mass));
    }

    match estimate_normal(&body.mask, &other.mask, offset) {
        Ok(contact) => {
            log::trace!("collision {} <- {} normal {:?}", body.id, other.id, contact.normal);
            Some(resolve_along_normal(
                body.vel, body.mass, other.vel, other.mass, &contact,
            ))
        }
        Err(err) => {
            log::trace!("collision {} <- {}: {err}, using per-axis", body.id, other.id);
            Some(resolve_per_axis(body.vel, body.mass, other.vel, other.mass))
        }
    }
}

/// Rebound velocities for `body` against every other body on the roster.
///
/// Read-only: results go into the caller's accumulator.
pub fn detect_collisions<'a>(
    body: &Body,
    roster: impl IntoIterator<Item = &'a Body>,
) -> Vec<DVec2> {
    roster
        .into_iter()
        .filter(|other| other.id != body.id)
        .filter_map(|other| collision_response(body, other))
        .collect()
}
