//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or physics engine dependencies; the host feeds
//!   player positions and contact events through `TickInput`

pub mod dispatch;
pub mod entity;
pub mod generator;
pub mod indicator;
pub mod level;
pub mod scene;
pub mod schedule;
pub mod state;
pub mod support;
pub mod tick;

pub use dispatch::{
    Contact, ContactHandler, ContactOutcome, ContactPhase, ContactWorld, DispatchTable, PairKey,
    ResolvedContact,
};
pub use entity::{Category, CategoryMask, Entity, EntityId, EntityKind, Patrol, PlatformRole};
pub use generator::{LevelGenerator, LevelLayout};
pub use indicator::{Edge, IndicatorPlacement, is_out_of_bounds, place_indicator};
pub use level::{LevelGrid, LevelLibrary, LevelSource, TextLevel, level_name};
pub use scene::Scene;
pub use schedule::{ActionKey, Scheduler};
pub use state::{GameEvent, GamePhase, Session, SoundCue};
pub use support::{Landing, PlayerState, PlayerStatus, stands_on};
pub use tick::{TickInput, tick};
