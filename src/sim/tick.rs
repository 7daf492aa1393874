//! Frame step
//!
//! One call advances the duel by one rendered frame:
//! integrate -> detect -> resolve -> reframe camera -> lifecycle -> victory.
//! Detection reads a single post-integration snapshot; only resolve and
//! lifecycle mutate across bodies.

use glam::DVec2;

use super::body::{EntityId, InputFlags};
use super::clock::Clock;
use super::collision::detect_collisions;
use super::state::{CombatState, Outcome, PlayerSlot, Role, Victory};

/// Input commands for a single frame, per player
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// `None` leaves that player's previous flags in place
    pub players: [Option<InputFlags>; 2],
}

impl TickInput {
    pub fn for_player(mut self, slot: PlayerSlot, flags: InputFlags) -> Self {
        self.players[slot.index()] = Some(flags);
        self
    }
}

/// Advance the duel by one frame
pub fn tick(state: &mut CombatState, input: &TickInput, clock: &dyn Clock) {
    let now = clock.now_ms();
    state.frame_count += 1;

    for slot in PlayerSlot::ALL {
        if let Some(flags) = input.players[slot.index()]
            && let Err(err) = state.apply_input(slot, flags)
        {
            log::trace!("input dropped: {err}");
        }
    }

    integrate(state, now);
    detect(state);
    resolve(state);
    if state.dynamic_camera {
        reframe(state);
    }
    lifecycle(state, now);
    if state.victory.is_none() {
        check_victory(state, now);
    }

    state.normalize_order();
}

/// Move every body; ships also tick their death sequence and energy
fn integrate(state: &mut CombatState, now: u64) {
    let bounds = state.bounds;
    let view = state.camera.frame;

    for i in 0..state.roster.len() {
        let (before, rest) = state.roster.split_at_mut(i);
        let Some((entity, after)) = rest.split_first_mut() else {
            break;
        };
        let others = before.iter().chain(after.iter()).map(|e| &e.body);

        if entity.body.check_destroyed() && matches!(entity.role, Role::Ship(_)) {
            log::debug!("ship {} destroyed", entity.body.id);
        }
        entity.body.step_motion(&bounds, &view, others);

        match &mut entity.role {
            Role::Ship(ship) => {
                if entity.body.dead {
                    ship.death.advance(now);
                }
                ship.regen_energy(&entity.body, now);
            }
            Role::Projectile(shot) => {
                if shot.is_spent(&entity.body) {
                    shot.done = true;
                }
            }
        }
    }
}

/// Collect rebound velocities and projectile hits from one snapshot
fn detect(state: &mut CombatState) {
    let roster = &state.roster;

    let impulses: Vec<Vec<DVec2>> = roster
        .iter()
        .map(|entity| match &entity.role {
            Role::Ship(_) => detect_collisions(&entity.body, roster.iter().map(|e| &e.body)),
            Role::Projectile(_) => Vec::new(),
        })
        .collect();

    let hits: Vec<(usize, f64, Vec<EntityId>)> = roster
        .iter()
        .enumerate()
        .filter_map(|(i, entity)| match &entity.role {
            // A shot spent by this frame's move still lands its last hit
            Role::Projectile(shot) => {
                let targets =
                    shot.find_hits(&entity.body, roster.iter().map(|e| (&e.body, e.owner())));
                (!targets.is_empty()).then_some((i, shot.damage, targets))
            }
            _ => None,
        })
        .collect();

    for (entity, found) in state.roster.iter_mut().zip(impulses) {
        entity.body.collisions.extend(found);
    }

    for (shooter, damage, targets) in hits {
        for target in targets {
            if let Some(entity) = state.roster.iter_mut().find(|e| e.body.id == target)
                && entity.body.life > 0.0
            {
                entity.body.life -= damage;
                log::trace!("hit {} for {} ({} left)", target, damage, entity.body.life);
            }
        }
        if let Role::Projectile(shot) = &mut state.roster[shooter].role {
            shot.done = true;
        }
    }
}

/// Revert colliding bodies to their pre-frame position with the summed velocity
fn resolve(state: &mut CombatState) {
    let view = state.camera.frame;
    for entity in &mut state.roster {
        let body = &mut entity.body;
        if body.collisions.is_empty() {
            continue;
        }
        body.pos = body.prev_pos;
        body.vel = body.collisions.iter().copied().sum();
        body.collisions.clear();
        body.project(&view);
    }
}

/// Follow the ships with the camera and rescale every body
fn reframe(state: &mut CombatState) {
    let (Some(one), Some(two)) = (
        state.camera_subject(PlayerSlot::One),
        state.camera_subject(PlayerSlot::Two),
    ) else {
        return;
    };
    let view = state.camera.update(one, two);
    for entity in &mut state.roster {
        entity.body.change_zoom(&view);
    }
}

/// Fire requested abilities, then drop expired projectiles
fn lifecycle(state: &mut CombatState, now: u64) {
    let mut launches = Vec::new();

    for (i, entity) in state.roster.iter_mut().enumerate() {
        let Role::Ship(ship) = &mut entity.role else {
            continue;
        };
        if entity.body.dead || ship.sleep {
            continue;
        }
        let controls = entity.body.controls;
        if controls.primary {
            match ship.fire_primary(now) {
                Ok(Some(profile)) => launches.push((i, profile)),
                Ok(None) => {}
                Err(err) => log::trace!("primary on {}: {err}", entity.body.id),
            }
        }
        if controls.secondary {
            match ship.fire_secondary(now) {
                Ok(Some(profile)) => launches.push((i, profile)),
                Ok(None) => {}
                Err(err) => log::trace!("secondary on {}: {err}", entity.body.id),
            }
        }
    }

    for (owner, profile) in launches {
        state.spawn_projectile(owner, &profile);
    }

    for entity in &mut state.roster {
        if let Role::Projectile(shot) = &mut entity.role
            && entity.body.life <= 0.0
        {
            shot.done = true;
        }
    }

    state.roster.retain(|entity| {
        if entity.is_done() {
            log::debug!("projectile {} removed", entity.body.id);
            false
        } else {
            true
        }
    });
}

/// Decide the duel once a death sequence has played out
fn check_victory(state: &mut CombatState, now: u64) {
    let (Some(one), Some(two)) = (
        state.camera_subject(PlayerSlot::One),
        state.camera_subject(PlayerSlot::Two),
    ) else {
        return;
    };

    let (outcome, winner) = if one.finished && two.finished {
        (Outcome::MutualDestruction, None)
    } else if one.finished && !two.dead {
        (Outcome::PlayerTwo, Some(PlayerSlot::Two))
    } else if two.finished && !one.dead {
        (Outcome::PlayerOne, Some(PlayerSlot::One))
    } else {
        return;
    };

    if let Some(index) = winner.and_then(|slot| state.ship_index(slot)) {
        let entity = &mut state.roster[index];
        if let Role::Ship(ship) = &mut entity.role {
            ship.put_to_sleep(&mut entity.body);
        }
    }
    log::info!("Duel decided: {:?}", outcome);
    state.victory = Some(Victory {
        outcome,
        decided_at_ms: now,
    });
}
