//! Fixed timestep simulation tick
//!
//! Order within one tick: pause toggle, player position from the physics
//! layer, contact events, scheduled actions, platform/hazard movement, then
//! the out-of-bounds indicator. Contact results are therefore visible to the
//! same tick's bounds check.

use glam::Vec2;

use super::dispatch::{Contact, ContactOutcome, ContactWorld};
use super::entity::EntityKind;
use super::indicator::{IndicatorPlacement, place_indicator};
use super::schedule::ActionKey;
use super::state::{GameEvent, GamePhase, Session};
use crate::error::Result;

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Player position reported by the physics layer
    pub player_pos: Option<Vec2>,
    /// Contact begin/end events since the last tick
    pub contacts: Vec<Contact>,
    /// Pause toggle
    pub pause: bool,
}

/// Advance the session by one fixed timestep.
///
/// Errors come from building the next level after a level change. The
/// session is then left in `LevelChange` with nothing pending, and no
/// later tick leaves that phase; the host must call `exit` or `restart`.
pub fn tick(session: &mut Session, input: &TickInput, dt: f32) -> Result<()> {
    if input.pause {
        match session.phase {
            GamePhase::Playing => {
                session.pause();
                return Ok(());
            }
            GamePhase::Paused => session.resume(),
            _ => {}
        }
    }

    if session.paused {
        return Ok(());
    }

    session.time_ticks += 1;

    if let Some(pos) = input.player_pos {
        if let Some(player) = session.player.and_then(|id| session.scene.get_mut(id)) {
            player.pos = pos;
        }
    }

    resolve_contacts(session, &input.contacts);
    run_scheduled(session, dt)?;

    let sim_dt = dt * session.speed;
    move_platforms(session, sim_dt);
    raise_darkness(session, sim_dt);
    update_indicator(session);

    Ok(())
}

fn resolve_contacts(session: &mut Session, contacts: &[Contact]) {
    if contacts.is_empty() {
        return;
    }

    let mut outcomes = Vec::new();
    let mut world = ContactWorld {
        scene: &session.scene,
        status: &mut session.status,
        riding: &mut session.riding,
        outcomes: &mut outcomes,
    };
    for contact in contacts {
        session.dispatch.dispatch(contact, &mut world);
    }

    for outcome in outcomes {
        match outcome {
            ContactOutcome::Finish => session.finish(),
            ContactOutcome::AdvanceLevel => {
                session.begin_level_change();
            }
            ContactOutcome::NewHeight(y) => session.emit(GameEvent::NewHeight(y)),
        }
    }
}

fn run_scheduled(session: &mut Session, dt: f32) -> Result<()> {
    for step in session.scheduler.advance(dt) {
        match step.key {
            ActionKey::SlowDown => session.slow_down_to(step.progress),
            ActionKey::LevelSlide => {
                session.slide_to(step.progress);
                if step.done {
                    session.slide_finished();
                }
            }
            ActionKey::LevelLoad => {
                if step.done {
                    session.load_next_level()?;
                }
            }
        }
    }
    Ok(())
}

/// Patrol moving platforms; the platform being ridden carries the player
fn move_platforms(session: &mut Session, dt: f32) {
    if dt <= 0.0 {
        return;
    }

    let mut carried = Vec2::ZERO;
    for entity in session.scene.iter_mut() {
        if let EntityKind::Platform {
            patrol: Some(patrol),
            ..
        } = &mut entity.kind
        {
            let x = patrol.step(entity.pos.x, dt);
            let delta = x - entity.pos.x;
            entity.pos.x = x;
            if session.riding == Some(entity.id) {
                carried.x += delta;
            }
        }
    }

    if carried != Vec2::ZERO {
        if let Some(player) = session.player.and_then(|id| session.scene.get_mut(id)) {
            player.pos += carried;
        }
    }
}

fn raise_darkness(session: &mut Session, dt: f32) {
    if !matches!(session.phase, GamePhase::Playing | GamePhase::Finished) {
        return;
    }
    let rise = session.settings.effective_darkness_speed() * dt;
    if let Some(darkness) = session.darkness.and_then(|id| session.scene.get_mut(id)) {
        darkness.pos.y += rise;
    }
}

fn update_indicator(session: &mut Session) {
    let Some(player_pos) = session
        .player
        .and_then(|id| session.scene.get(id))
        .map(|p| p.pos)
    else {
        return;
    };
    let screen = session.settings.screen_size();
    let Some(indicator) = session.indicator.and_then(|id| session.scene.get_mut(id)) else {
        return;
    };

    match place_indicator(player_pos, screen, indicator.size) {
        IndicatorPlacement::Hidden => indicator.visible = false,
        IndicatorPlacement::Shown { pos, rotation, .. } => {
            indicator.visible = true;
            indicator.pos = pos;
            indicator.rotation = rotation;
        }
    }
}
