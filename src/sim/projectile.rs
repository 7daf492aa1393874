//! Massless projectiles fired by ship abilities

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::body::{Body, EntityId};
use super::camera::ViewFrame;
use super::mask::BitMask;

/// Weapon stat table for one projectile type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileProfile {
    /// Renderer-side sprite identifier
    pub sprite: String,
    pub silhouette: BitMask,
    /// Travel distance before expiring
    pub range: f64,
    pub damage: f64,
    /// Speed added along the heading on top of the owner's velocity
    pub muzzle_speed: f64,
    /// Can hit the ship that fired it
    #[serde(default)]
    pub hit_owner: bool,
    /// Can hit other projectiles from the same ship
    #[serde(default)]
    pub hit_siblings: bool,
}

impl ProjectileProfile {
    /// BlueWing's rapid pulse
    pub fn blue_pulse() -> Self {
        Self {
            sprite: "blue_pulse".into(),
            silhouette: BitMask::disc(40),
            range: 100.0,
            damage: 1.0,
            muzzle_speed: 3.0,
            hit_owner: false,
            hit_siblings: false,
        }
    }

    /// Triple's heavy pulse
    pub fn tri_pulse() -> Self {
        Self {
            sprite: "tri_pulse".into(),
            silhouette: BitMask::disc(60),
            range: 300.0,
            damage: 5.0,
            ..Self::blue_pulse()
        }
    }
}

/// Projectile-specific state; motion lives in the paired [`Body`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    /// Ship that fired this projectile
    pub owner: EntityId,
    pub start: DVec2,
    pub range: f64,
    pub damage: f64,
    pub hit_owner: bool,
    pub hit_siblings: bool,
    pub sprite: String,
    /// Ready for removal from the roster
    pub done: bool,
}

impl Projectile {
    pub fn new(owner: EntityId, start: DVec2, profile: &ProjectileProfile) -> Self {
        Self {
            owner,
            start,
            range: profile.range,
            damage: profile.damage,
            hit_owner: profile.hit_owner,
            hit_siblings: profile.hit_siblings,
            sprite: profile.sprite.clone(),
            done: false,
        }
    }

    /// Launch from `owner_body`: same position and heading, owner velocity
    /// plus muzzle speed, zero mass.
    pub fn spawn(
        id: EntityId,
        owner_body: &Body,
        profile: &ProjectileProfile,
        view: &ViewFrame,
    ) -> (Body, Projectile) {
        let mut body = Body::new(id, owner_body.pos, -owner_body.angle, profile.silhouette.clone())
            .with_mass(0.0);
        body.vel = owner_body.vel + crate::heading(body.calc_angle) * profile.muzzle_speed;
        body.max_speed = body.vel.length();
        body.change_zoom(view);
        (body, Projectile::new(owner_body.id, owner_body.pos, profile))
    }

    /// Straight-line displacement from the spawn point
    pub fn distance_travelled(&self, body: &Body) -> f64 {
        (body.pos - self.start).length()
    }

    /// Range exhausted
    pub fn is_spent(&self, body: &Body) -> bool {
        self.distance_travelled(body) >= self.range
    }

    /// Whether `target` (owned by `target_owner` if it is a projectile) may be hit
    pub fn valid_target(&self, target: &Body, target_owner: Option<EntityId>) -> bool {
        if target.id == self.owner {
            return self.hit_owner;
        }
        match target_owner {
            Some(owner) if owner == self.owner => self.hit_siblings,
            _ => true,
        }
    }

    /// Ids of every valid target overlapping this projectile
    pub fn find_hits<'a>(
        &self,
        body: &Body,
        candidates: impl IntoIterator<Item = (&'a Body, Option<EntityId>)>,
    ) -> Vec<EntityId> {
        candidates
            .into_iter()
            .filter(|(target, _)| target.id != body.id)
            .filter(|(target, owner)| {
                body.overlap_area(target) > 0 && self.valid_target(target, *owner)
            })
            .map(|(target, _)| target.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::body::MapBounds;

    #[test]
    fn test_range_termination_after_ten_steps() {
        let profile = ProjectileProfile::blue_pulse();
        let start = DVec2::new(100.0, 100.0);
        let mut body = Body::new(7, start, 0.0, profile.silhouette.clone())
            .with_mass(0.0)
            .with_velocity(DVec2::new(10.0, 0.0));
        let shot = Projectile::new(1, start, &profile);

        for _ in 0..9 {
            body.step_motion(&MapBounds::default(), &ViewFrame::full_map(), []);
            assert!(!shot.is_spent(&body));
        }
        body.step_motion(&MapBounds::default(), &ViewFrame::full_map(), []);
        assert!((shot.distance_travelled(&body) - 100.0).abs() < 1e-9);
        assert!(shot.is_spent(&body));
    }

    #[test]
    fn test_spawn_inherits_owner_motion() {
        let owner = Body::new(3, DVec2::new(200.0, 200.0), 90.0, BitMask::triangle(200, 200))
            .with_velocity(DVec2::new(0.5, 0.25));
        let (body, shot) = Projectile::spawn(
            9,
            &owner,
            &ProjectileProfile::blue_pulse(),
            &ViewFrame::full_map(),
        );
        assert_eq!(body.pos, owner.pos);
        assert_eq!(body.mass, 0.0);
        assert_eq!(body.angle, owner.angle);
        // Heading 90 points right on screen
        assert!((body.vel - DVec2::new(3.5, 0.25)).length() < 1e-9);
        assert_eq!(shot.owner, 3);
        assert_eq!(shot.start, owner.pos);
    }

    #[test]
    fn test_self_hit_rules() {
        let profile = ProjectileProfile::blue_pulse();
        let owner = Body::new(1, DVec2::new(100.0, 100.0), 0.0, BitMask::filled(200, 200));
        let enemy = Body::new(2, DVec2::new(100.0, 100.0), 0.0, BitMask::filled(200, 200));
        let sibling = Body::new(4, DVec2::new(100.0, 100.0), 0.0, profile.silhouette.clone());
        let shot_body = Body::new(5, DVec2::new(100.0, 100.0), 0.0, profile.silhouette.clone());

        let mut shot = Projectile::new(1, DVec2::new(100.0, 100.0), &profile);
        let candidates = [(&owner, None), (&enemy, None), (&sibling, Some(1))];
        let hits = shot.find_hits(&shot_body, candidates);
        assert_eq!(hits, vec![2]);

        shot.hit_owner = true;
        shot.hit_siblings = true;
        let candidates = [(&owner, None), (&enemy, None), (&sibling, Some(1))];
        let hits = shot.find_hits(&shot_body, candidates);
        assert_eq!(hits, vec![1, 2, 4]);
    }

    #[test]
    fn test_enemy_projectile_is_valid_target() {
        let profile = ProjectileProfile::tri_pulse();
        let shot = Projectile::new(1, DVec2::ZERO, &profile);
        let enemy_shot = Body::new(8, DVec2::ZERO, 0.0, profile.silhouette.clone());
        assert!(shot.valid_target(&enemy_shot, Some(2)));
    }
}
