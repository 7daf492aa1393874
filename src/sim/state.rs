//! Combat state: the roster of live bodies and duel bookkeeping
//!
//! The roster is owned here and only changed by the frame loop (weapon
//! launches add, expiry removes). Bodies never hold references to it;
//! projectiles remember their owner by id.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::body::{Body, EntityId, InputFlags, MapBounds};
use super::camera::{Camera, CameraSubject};
use super::projectile::{Projectile, ProjectileProfile};
use super::ship::{Ship, ShipProfile};
use crate::error::CombatError;
use crate::settings::CombatSettings;

/// The two duelling players
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerSlot {
    One,
    Two,
}

impl PlayerSlot {
    pub const ALL: [PlayerSlot; 2] = [PlayerSlot::One, PlayerSlot::Two];

    pub fn index(self) -> usize {
        match self {
            PlayerSlot::One => 0,
            PlayerSlot::Two => 1,
        }
    }
}

/// What a roster entry is, beyond its body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Role {
    Ship(Ship),
    Projectile(Projectile),
}

/// A roster entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub body: Body,
    pub role: Role,
}

impl Entity {
    pub fn ship(&self) -> Option<&Ship> {
        match &self.role {
            Role::Ship(ship) => Some(ship),
            Role::Projectile(_) => None,
        }
    }

    pub fn projectile(&self) -> Option<&Projectile> {
        match &self.role {
            Role::Projectile(shot) => Some(shot),
            Role::Ship(_) => None,
        }
    }

    /// Owning ship id for projectiles
    pub fn owner(&self) -> Option<EntityId> {
        self.projectile().map(|p| p.owner)
    }

    /// Ready to leave the roster
    pub fn is_done(&self) -> bool {
        match &self.role {
            Role::Projectile(shot) => shot.done,
            Role::Ship(_) => false,
        }
    }
}

/// How the duel ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    PlayerOne,
    PlayerTwo,
    MutualDestruction,
}

/// Decided outcome and when it was decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Victory {
    pub outcome: Outcome,
    pub decided_at_ms: u64,
}

/// Complete combat state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatState {
    pub bounds: MapBounds,
    pub camera: Camera,
    pub dynamic_camera: bool,
    /// Ships and live projectiles, sorted by id
    pub roster: Vec<Entity>,
    pub victory: Option<Victory>,
    /// Frames stepped so far
    pub frame_count: u64,
    next_id: EntityId,
}

impl CombatState {
    /// Empty map with no ships yet
    pub fn empty(bounds: MapBounds) -> Self {
        Self {
            bounds,
            camera: Camera::new(bounds),
            dynamic_camera: true,
            roster: Vec::new(),
            victory: None,
            frame_count: 0,
            next_id: 1,
        }
    }

    /// Map with both players' ships placed per `settings`
    pub fn new(settings: &CombatSettings) -> Self {
        let mut state = Self::empty(settings.map);
        state.dynamic_camera = settings.dynamic_camera;
        for (slot, placement) in [
            (PlayerSlot::One, &settings.player_one),
            (PlayerSlot::Two, &settings.player_two),
        ] {
            state.add_ship(slot, placement.resolved_profile(), placement.pos, placement.heading);
        }
        log::info!(
            "Duel set up: {:?} vs {:?}",
            settings.player_one.archetype,
            settings.player_two.archetype
        );
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Place a ship for `slot`, replacing any ship already in that slot
    pub fn add_ship(
        &mut self,
        slot: PlayerSlot,
        profile: ShipProfile,
        pos: DVec2,
        heading_deg: f64,
    ) -> EntityId {
        self.roster
            .retain(|e| e.ship().is_none_or(|ship| ship.slot != slot));
        let id = self.next_entity_id();
        let mut body = profile.build_body(id, pos, heading_deg);
        body.change_zoom(&self.camera.frame);
        self.roster.push(Entity {
            body,
            role: Role::Ship(Ship::new(slot, profile)),
        });
        id
    }

    /// Launch a projectile from the roster entry at `owner_index`
    pub fn spawn_projectile(
        &mut self,
        owner_index: usize,
        profile: &ProjectileProfile,
    ) -> EntityId {
        let id = self.next_entity_id();
        let owner = &self.roster[owner_index].body;
        let (body, shot) = Projectile::spawn(id, owner, profile, &self.camera.frame);
        log::debug!("projectile {} fired by {}", id, shot.owner);
        self.roster.push(Entity {
            body,
            role: Role::Projectile(shot),
        });
        id
    }

    pub fn ship_index(&self, slot: PlayerSlot) -> Option<usize> {
        self.roster
            .iter()
            .position(|e| e.ship().is_some_and(|ship| ship.slot == slot))
    }

    /// Body and ship state for a player, for the stat display
    pub fn ship(&self, slot: PlayerSlot) -> Option<(&Body, &Ship)> {
        let entity = &self.roster[self.ship_index(slot)?];
        entity.ship().map(|ship| (&entity.body, ship))
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.roster.iter().find(|e| e.body.id == id)
    }

    /// Route a player's input to their ship
    pub fn apply_input(&mut self, slot: PlayerSlot, input: InputFlags) -> Result<(), CombatError> {
        let index = self
            .ship_index(slot)
            .ok_or(CombatError::OrphanedInput { slot })?;
        let Entity { body, role } = &mut self.roster[index];
        if let Role::Ship(ship) = role {
            ship.steer(body, input);
        }
        Ok(())
    }

    /// Camera view of a player's ship
    pub fn camera_subject(&self, slot: PlayerSlot) -> Option<CameraSubject> {
        self.ship(slot).map(|(body, ship)| CameraSubject {
            pos: body.pos,
            dead: body.dead,
            finished: ship.death.is_finished(),
        })
    }

    /// Keep roster iteration order stable
    pub fn normalize_order(&mut self) {
        self.roster.sort_by_key(|e| e.body.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::ship::Archetype;

    #[test]
    fn test_new_places_both_ships() {
        let state = CombatState::new(&CombatSettings::default());
        assert_eq!(state.roster.len(), 2);
        let (body, ship) = state.ship(PlayerSlot::One).unwrap();
        assert_eq!(body.pos, DVec2::new(300.0, 100.0));
        assert_eq!(body.life, 8.0);
        assert_eq!(ship.energy, 10.0);
        let (body, _) = state.ship(PlayerSlot::Two).unwrap();
        assert_eq!(body.angle, 45.0);
    }

    #[test]
    fn test_orphaned_input_reported() {
        let mut state = CombatState::empty(MapBounds::default());
        assert_eq!(
            state.apply_input(PlayerSlot::Two, InputFlags::default()),
            Err(CombatError::OrphanedInput { slot: PlayerSlot::Two })
        );
    }

    #[test]
    fn test_add_ship_replaces_slot() {
        let mut state = CombatState::new(&CombatSettings::default());
        let id = state.add_ship(
            PlayerSlot::One,
            Archetype::Triple.profile(),
            DVec2::new(10.0, 10.0),
            0.0,
        );
        assert_eq!(state.roster.len(), 2);
        assert_eq!(state.ship(PlayerSlot::One).unwrap().0.id, id);
    }

    #[test]
    fn test_spawned_projectile_owned_by_ship() {
        let mut state = CombatState::new(&CombatSettings::default());
        let owner = state.roster[0].body.id;
        let id = state.spawn_projectile(0, &ProjectileProfile::blue_pulse());
        let shot = state.entity(id).unwrap();
        assert_eq!(shot.owner(), Some(owner));
        assert!(!shot.is_done());
    }
}
