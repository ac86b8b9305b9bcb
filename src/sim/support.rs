//! Player support tracking
//!
//! A platform supports the player only when the contact lands on its top
//! face. The player's state is derived from whether anything supports it.

use std::collections::BTreeSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::EntityId;
use crate::Bounds;
use crate::consts::SUPPORT_TOLERANCE;

/// Player animation/physics state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlayerState {
    Idle,
    #[default]
    Jumping,
    /// Touched the darkness
    Dying,
}

/// Whether a contact at `point` is the player standing on `platform`.
///
/// The point must sit on the top face (no lower than `SUPPORT_TOLERANCE`
/// beneath it), strictly above the bottom edge, and strictly inside the
/// horizontal span.
pub fn stands_on(point: Vec2, platform: &Bounds) -> bool {
    point.y <= platform.top
        && point.y >= platform.top - SUPPORT_TOLERANCE
        && point.y > platform.bottom
        && point.x > platform.left
        && point.x < platform.right
}

/// Result of a contact that might be the player landing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    /// Side or glancing contact; support unchanged
    Missed,
    Supported,
    /// Supported, and higher than any platform stood on before
    NewHeight,
}

impl Landing {
    pub fn is_supported(self) -> bool {
        !matches!(self, Landing::Missed)
    }
}

/// Platforms currently holding the player up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerStatus {
    pub state: PlayerState,
    support: BTreeSet<EntityId>,
    /// Highest platform y the player has stood on this level
    pub highest_platform: Option<f32>,
    /// "No longer grounded" condition; installed whenever support is lost
    pub airborne: bool,
}

impl Default for PlayerStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerStatus {
    pub fn new() -> Self {
        Self {
            state: PlayerState::Jumping,
            support: BTreeSet::new(),
            highest_platform: None,
            airborne: true,
        }
    }

    pub fn support(&self) -> &BTreeSet<EntityId> {
        &self.support
    }

    pub fn is_grounded(&self) -> bool {
        !self.support.is_empty()
    }

    /// Contact began: add `platform` if the contact qualifies
    pub fn land(&mut self, platform: EntityId, bounds: &Bounds, platform_y: f32, point: Vec2) -> Landing {
        if !stands_on(point, bounds) {
            return Landing::Missed;
        }
        self.support.insert(platform);
        self.sync_state();

        match self.highest_platform {
            Some(h) if platform_y <= h => Landing::Supported,
            _ => {
                self.highest_platform = Some(platform_y);
                Landing::NewHeight
            }
        }
    }

    /// Contact ended: drop `platform` without any geometric check
    pub fn release(&mut self, platform: EntityId) {
        self.support.remove(&platform);
        self.sync_state();
    }

    /// Darkness reached the player; support no longer matters
    pub fn kill(&mut self) {
        self.state = PlayerState::Dying;
    }

    fn sync_state(&mut self) {
        if self.state == PlayerState::Dying {
            return;
        }
        if self.support.is_empty() {
            self.state = PlayerState::Jumping;
            self.airborne = true;
        } else {
            self.state = PlayerState::Idle;
            self.airborne = false;
        }
    }
}
