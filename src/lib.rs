//! Darkrise - a grid-built platformer with a rising darkness
//!
//! Core modules:
//! - `sim`: Deterministic simulation (level generation, contacts, game state)
//! - `settings`: Player/host preferences persisted as JSON
//! - `error`: Level-load failures

pub mod error;
pub mod settings;
pub mod sim;

pub use error::LevelError;
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Vertical slack when deciding whether a contact is on a platform's top face
    pub const SUPPORT_TOLERANCE: f32 = 2.0;

    /// Finish slow-down: simulation speed ramps 1 -> 0 over this many seconds
    pub const FINISH_SLOWDOWN_SECS: f32 = 6.0;
    /// Level slide-out duration before the next level loads
    pub const LEVEL_SLIDE_SECS: f32 = 5.0;
    /// Pause between the end of the slide and the next level appearing
    pub const LEVEL_LOAD_DELAY_SECS: f32 = 5.0;

    /// First level of every session
    pub const FIRST_LEVEL: u32 = 1;

    /// Indicator rotation when the player left through the left edge (points right)
    pub const INDICATOR_LEFT_ROTATION: f32 = -std::f32::consts::FRAC_PI_2;
    /// Indicator rotation when the player left through the right edge (points left)
    pub const INDICATOR_RIGHT_ROTATION: f32 = std::f32::consts::FRAC_PI_2;
    /// Indicator footprint in world units
    pub const INDICATOR_SIZE: f32 = 24.0;

    /// Player footprint relative to one grid cell
    pub const PLAYER_SCALE: f32 = 0.8;
    /// Controller strip height (bottom of the screen)
    pub const CONTROLLER_HEIGHT: f32 = 96.0;
    /// Darkness plane thickness
    pub const DARKNESS_HEIGHT: f32 = 400.0;
}

/// Axis-aligned extents of a centred box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
}

impl Bounds {
    /// Extents of a box centred on `pos` with full size `size`
    #[inline]
    pub fn centered(pos: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            left: pos.x - half.x,
            right: pos.x + half.x,
            bottom: pos.y - half.y,
            top: pos.y + half.y,
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }
}

/// Linear interpolation factor of `elapsed` over `duration`, clamped to [0, 1]
#[inline]
pub fn progress(elapsed: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        1.0
    } else {
        (elapsed / duration).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_centered() {
        let b = Bounds::centered(Vec2::new(2.5, 9.0), Vec2::new(5.0, 2.0));
        assert_eq!(b.left, 0.0);
        assert_eq!(b.right, 5.0);
        assert_eq!(b.bottom, 8.0);
        assert_eq!(b.top, 10.0);
        assert_eq!(b.width(), 5.0);
        assert_eq!(b.height(), 2.0);
    }

    #[test]
    fn test_progress_clamps() {
        assert_eq!(progress(-1.0, 5.0), 0.0);
        assert_eq!(progress(2.5, 5.0), 0.5);
        assert_eq!(progress(9.0, 5.0), 1.0);
        assert_eq!(progress(0.0, 0.0), 1.0);
    }
}
