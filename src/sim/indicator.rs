//! Out-of-bounds indicator placement
//!
//! Pure function of player position, screen extents and indicator size.
//! There is no lower bound check: falling is the darkness' job.

use glam::Vec2;

use crate::consts::{INDICATOR_LEFT_ROTATION, INDICATOR_RIGHT_ROTATION};

/// Which edge the indicator is pinned to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Left,
    Right,
    Top,
}

/// Indicator transform for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndicatorPlacement {
    Hidden,
    Shown { edge: Edge, pos: Vec2, rotation: f32 },
}

impl IndicatorPlacement {
    pub fn is_visible(&self) -> bool {
        matches!(self, IndicatorPlacement::Shown { .. })
    }
}

pub fn is_out_of_bounds(player: Vec2, screen: Vec2) -> bool {
    player.x < 0.0 || player.x > screen.x || player.y > screen.y
}

pub fn place_indicator(player: Vec2, screen: Vec2, indicator: Vec2) -> IndicatorPlacement {
    if !is_out_of_bounds(player, screen) {
        return IndicatorPlacement::Hidden;
    }

    let half = indicator * 0.5;
    if player.y < screen.y {
        if player.x < screen.x * 0.5 {
            IndicatorPlacement::Shown {
                edge: Edge::Left,
                pos: Vec2::new(half.x, player.y),
                rotation: INDICATOR_LEFT_ROTATION,
            }
        } else {
            IndicatorPlacement::Shown {
                edge: Edge::Right,
                pos: Vec2::new(screen.x - half.x, player.y),
                rotation: INDICATOR_RIGHT_ROTATION,
            }
        }
    } else {
        IndicatorPlacement::Shown {
            edge: Edge::Top,
            pos: Vec2::new(player.x, screen.y - half.y),
            rotation: 0.0,
        }
    }
}
