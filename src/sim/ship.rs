//! Player ships: stat profiles, abilities, energy and the death sequence
//!
//! Ship archetypes differ only in their stat table and in the strategy
//! objects that map input onto the body ([`Controllable`]) and decide what a
//! weapon launch spawns ([`Armed`]).

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::body::{Body, EntityId, InputFlags};
use super::mask::BitMask;
use super::projectile::ProjectileProfile;
use super::state::PlayerSlot;
use crate::consts::*;
use crate::error::CombatError;

/// Steering capability
pub trait Controllable {
    /// Feed this frame's input into the body
    fn steer(&self, body: &mut Body, input: InputFlags) {
        body.set_controls(input);
    }
}

/// Weapon capability
pub trait Armed {
    /// Projectile launched by the primary ability, if any
    fn primary(&self) -> Option<ProjectileProfile>;

    /// Projectile launched by the secondary ability, if any
    fn secondary(&self) -> Option<ProjectileProfile> {
        None
    }
}

/// Fast interceptor with a cheap rapid-fire pulse
#[derive(Debug, Clone, Copy, Default)]
pub struct BlueWingLoadout;

impl Controllable for BlueWingLoadout {}

impl Armed for BlueWingLoadout {
    fn primary(&self) -> Option<ProjectileProfile> {
        Some(ProjectileProfile::blue_pulse())
    }
}

/// Heavy gunship with a slow, long-range pulse
#[derive(Debug, Clone, Copy, Default)]
pub struct TripleLoadout;

impl Controllable for TripleLoadout {}

impl Armed for TripleLoadout {
    fn primary(&self) -> Option<ProjectileProfile> {
        Some(ProjectileProfile::tri_pulse())
    }
}

/// Selectable ship designs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Archetype {
    BlueWing,
    Triple,
}

impl Archetype {
    pub fn armament(self) -> &'static dyn Armed {
        match self {
            Archetype::BlueWing => &BlueWingLoadout,
            Archetype::Triple => &TripleLoadout,
        }
    }

    pub fn controls(self) -> &'static dyn Controllable {
        match self {
            Archetype::BlueWing => &BlueWingLoadout,
            Archetype::Triple => &TripleLoadout,
        }
    }

    /// Stock stat table
    pub fn profile(self) -> ShipProfile {
        match self {
            Archetype::BlueWing => ShipProfile {
                archetype: self,
                sprite: "wing_blue".into(),
                hull: BitMask::triangle(200, 200),
                max_life: 8.0,
                max_energy: 10.0,
                accel: BASE_SPEED * 0.05,
                primary: AbilitySpec { cost: 1.0, rate: 7.0 },
                regen_ms: 300.0,
                ..ShipProfile::base(self)
            },
            Archetype::Triple => ShipProfile {
                archetype: self,
                sprite: "tripple".into(),
                hull: BitMask::triangle(240, 200),
                primary: AbilitySpec { cost: 5.0, rate: 3.0 },
                regen_ms: 500.0,
                ..ShipProfile::base(self)
            },
        }
    }
}

/// Radial speed cap shared by the stock hulls (px/frame)
const BASE_SPEED: f64 = 5.0 / 4.0;

/// Energy cost and uses per second of an ability
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AbilitySpec {
    pub cost: f64,
    pub rate: f64,
}

/// Ship stat table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipProfile {
    pub archetype: Archetype,
    /// Renderer-side sprite identifier
    pub sprite: String,
    /// Collision silhouette at full zoom, facing up
    pub hull: BitMask,
    pub mass: f64,
    pub max_speed: f64,
    pub accel: f64,
    /// Degrees per frame
    pub rot_speed: f64,
    pub max_life: f64,
    pub max_energy: f64,
    /// Milliseconds per regenerated energy unit
    pub regen_ms: f64,
    pub primary: AbilitySpec,
    pub secondary: AbilitySpec,
}

impl ShipProfile {
    /// Generic hull the archetypes specialise
    fn base(archetype: Archetype) -> Self {
        Self {
            archetype,
            sprite: "ship_up".into(),
            hull: BitMask::triangle(200, 200),
            mass: DEFAULT_MASS,
            max_speed: BASE_SPEED,
            accel: BASE_SPEED * 0.025,
            rot_speed: 3.0,
            max_life: 16.0,
            max_energy: 16.0,
            regen_ms: 300.0,
            primary: AbilitySpec { cost: 0.0, rate: 7.0 },
            secondary: AbilitySpec { cost: 0.0, rate: 3.0 },
        }
    }

    /// Physical body for this hull
    pub fn build_body(&self, id: EntityId, pos: DVec2, heading_deg: f64) -> Body {
        let mut body = Body::new(id, pos, heading_deg, self.hull.clone())
            .with_motion(self.max_speed, self.accel, self.rot_speed)
            .with_mass(self.mass);
        body.life = self.max_life;
        body
    }
}

/// Cooldown gate for one ability
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilityTimer {
    pub ability: AbilitySpec,
    last_used: Option<u64>,
}

impl AbilityTimer {
    pub fn new(ability: AbilitySpec) -> Self {
        Self {
            ability,
            last_used: None,
        }
    }

    pub fn cooldown_ms(&self) -> f64 {
        1000.0 / self.ability.rate
    }

    /// Debit `energy` and restart the cooldown if the ability may fire
    pub fn try_use(&mut self, energy: &mut f64, now_ms: u64) -> Result<(), CombatError> {
        if *energy - self.ability.cost < 0.0 {
            return Err(CombatError::InsufficientResource {
                cost: self.ability.cost,
                available: *energy,
            });
        }
        if let Some(last) = self.last_used {
            let elapsed = now_ms.saturating_sub(last) as f64;
            if elapsed < self.cooldown_ms() {
                return Err(CombatError::CoolingDown {
                    remaining_ms: self.cooldown_ms() - elapsed,
                });
            }
        }
        *energy -= self.ability.cost;
        self.last_used = Some(now_ms);
        Ok(())
    }
}

/// Explosion frames played after a ship is destroyed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeathSequence {
    /// 0 while alive; DEATH_TERMINAL_FRAME once finished
    pub frame: u8,
    last_advance: Option<u64>,
}

impl DeathSequence {
    /// Step the animation on its timer. Returns true when the frame changed.
    pub fn advance(&mut self, now_ms: u64) -> bool {
        if self.is_finished() {
            return false;
        }
        let due = self
            .last_advance
            .is_none_or(|t| now_ms.saturating_sub(t) as f64 > DEATH_FRAME_MS);
        if !due {
            return false;
        }
        if self.frame < DEATH_VISIBLE_FRAMES {
            self.frame += 1;
            self.last_advance = Some(now_ms);
        } else {
            self.frame = DEATH_TERMINAL_FRAME;
        }
        true
    }

    pub fn is_finished(&self) -> bool {
        self.frame == DEATH_TERMINAL_FRAME
    }
}

/// Ship state layered on top of a [`Body`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    pub slot: PlayerSlot,
    pub profile: ShipProfile,
    pub energy: f64,
    regen_timer: u64,
    pub primary: AbilityTimer,
    pub secondary: AbilityTimer,
    /// Input is ignored (set on the winner once the duel is decided)
    pub sleep: bool,
    pub death: DeathSequence,
}

impl Ship {
    pub fn new(slot: PlayerSlot, profile: ShipProfile) -> Self {
        Self {
            slot,
            energy: profile.max_energy,
            regen_timer: 0,
            primary: AbilityTimer::new(profile.primary),
            secondary: AbilityTimer::new(profile.secondary),
            sleep: false,
            death: DeathSequence::default(),
            profile,
        }
    }

    /// Route input through the archetype's steering strategy
    pub fn steer(&self, body: &mut Body, input: InputFlags) {
        if self.sleep || body.dead {
            return;
        }
        self.profile.archetype.controls().steer(body, input);
    }

    /// Put the ship to sleep and release all controls
    pub fn put_to_sleep(&mut self, body: &mut Body) {
        self.sleep = true;
        body.set_controls(InputFlags::default());
    }

    /// Regain one energy unit per interval while no ability is requested
    pub fn regen_energy(&mut self, body: &Body, now_ms: u64) {
        if body.dead || self.energy >= self.profile.max_energy {
            return;
        }
        if body.controls.primary || body.controls.secondary {
            return;
        }
        if now_ms.saturating_sub(self.regen_timer) as f64 >= self.profile.regen_ms {
            self.energy = (self.energy + 1.0).min(self.profile.max_energy);
            self.regen_timer = now_ms;
        }
    }

    /// Fire the primary ability. `Ok(None)` means it fired but spawns nothing.
    pub fn fire_primary(&mut self, now_ms: u64) -> Result<Option<ProjectileProfile>, CombatError> {
        self.primary.try_use(&mut self.energy, now_ms)?;
        Ok(self.profile.archetype.armament().primary())
    }

    pub fn fire_secondary(
        &mut self,
        now_ms: u64,
    ) -> Result<Option<ProjectileProfile>, CombatError> {
        self.secondary.try_use(&mut self.energy, now_ms)?;
        Ok(self.profile.archetype.armament().secondary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_profiles() {
        let wing = Archetype::BlueWing.profile();
        assert_eq!(wing.max_life, 8.0);
        assert_eq!(wing.max_energy, 10.0);
        assert_eq!(wing.primary, AbilitySpec { cost: 1.0, rate: 7.0 });
        assert!((wing.accel - 0.0625).abs() < 1e-12);

        let triple = Archetype::Triple.profile();
        assert_eq!(triple.max_life, 16.0);
        assert_eq!(triple.primary.cost, 5.0);
        assert_eq!(triple.regen_ms, 500.0);
        assert_eq!(triple.archetype.armament().primary().map(|p| p.range), Some(300.0));
    }

    #[test]
    fn test_cooldown_fires_once_within_window() {
        let mut ship = Ship::new(PlayerSlot::One, Archetype::BlueWing.profile());
        assert!(ship.fire_primary(1_000).is_ok());
        // 1000 / 7 ms cooldown
        assert!(matches!(
            ship.fire_primary(1_100),
            Err(CombatError::CoolingDown { .. })
        ));
        assert_eq!(ship.energy, 9.0);
        assert!(ship.fire_primary(1_143).is_ok());
        assert_eq!(ship.energy, 8.0);
    }

    #[test]
    fn test_insufficient_energy_is_rejected() {
        let mut ship = Ship::new(PlayerSlot::Two, Archetype::Triple.profile());
        ship.energy = 4.0;
        assert_eq!(
            ship.fire_primary(0),
            Err(CombatError::InsufficientResource {
                cost: 5.0,
                available: 4.0
            })
        );
        assert_eq!(ship.energy, 4.0);
    }

    #[test]
    fn test_secondary_consumes_cooldown_without_spawning() {
        let mut ship = Ship::new(PlayerSlot::One, Archetype::BlueWing.profile());
        assert_eq!(ship.fire_secondary(0), Ok(None));
        assert!(ship.fire_secondary(10).is_err());
    }

    #[test]
    fn test_regen_paused_while_ability_requested() {
        let profile = Archetype::BlueWing.profile();
        let mut body = profile.build_body(1, DVec2::new(100.0, 100.0), 0.0);
        let mut ship = Ship::new(PlayerSlot::One, profile);
        ship.energy = 5.0;

        body.controls.primary = true;
        ship.regen_energy(&body, 1_000);
        assert_eq!(ship.energy, 5.0);

        body.controls.primary = false;
        ship.regen_energy(&body, 1_000);
        assert_eq!(ship.energy, 6.0);
        ship.regen_energy(&body, 1_200);
        assert_eq!(ship.energy, 6.0);
        ship.regen_energy(&body, 1_300);
        assert_eq!(ship.energy, 7.0);
    }

    #[test]
    fn test_regen_capped_at_max() {
        let profile = Archetype::BlueWing.profile();
        let body = profile.build_body(1, DVec2::new(100.0, 100.0), 0.0);
        let mut ship = Ship::new(PlayerSlot::One, profile);
        ship.regen_energy(&body, 5_000);
        assert_eq!(ship.energy, 10.0);
    }

    #[test]
    fn test_death_sequence_timeline() {
        let mut death = DeathSequence::default();
        assert!(death.advance(1_000));
        assert_eq!(death.frame, 1);
        assert!(!death.advance(1_100));
        assert!(death.advance(1_143));
        assert!(death.advance(1_286));
        assert!(death.advance(1_429));
        assert_eq!(death.frame, 4);
        assert!(!death.is_finished());
        assert!(death.advance(1_572));
        assert!(death.is_finished());
        assert!(!death.advance(9_999));
    }

    #[test]
    fn test_sleeping_ship_ignores_input() {
        let profile = Archetype::Triple.profile();
        let mut body = profile.build_body(2, DVec2::new(100.0, 100.0), 0.0);
        let mut ship = Ship::new(PlayerSlot::Two, profile);
        ship.steer(
            &mut body,
            InputFlags {
                thrust: true,
                ..Default::default()
            },
        );
        assert!(body.controls.thrust);

        ship.put_to_sleep(&mut body);
        ship.steer(
            &mut body,
            InputFlags {
                left: true,
                ..Default::default()
            },
        );
        assert_eq!(body.controls, InputFlags::default());
    }
}
