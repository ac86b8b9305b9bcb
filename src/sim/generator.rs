//! Level generation
//!
//! Turns deciphered grids into positioned entities. Reading and attaching
//! are separate steps: `read` fills the per-source/per-row/per-column
//! structure, `generate` attaches it to a scene.

use glam::Vec2;

use super::entity::{Entity, EntityId, EntityKind, Patrol, PlatformRole};
use super::level::{CellKind, LevelSource};
use super::scene::Scene;
use crate::consts::PLAYER_SCALE;
use crate::error::{LevelError, Result};

/// One source's entities: rows bottom-up, each row left to right
pub type LevelLayout = Vec<Vec<Option<Entity>>>;

#[derive(Debug, Clone)]
pub struct LevelGenerator {
    cell_size: Vec2,
    /// Travel and speed given to moving platforms
    patrol: (f32, f32),
    levels: Vec<LevelLayout>,
}

impl LevelGenerator {
    pub fn new(cell_size: Vec2) -> Self {
        Self {
            cell_size,
            patrol: (0.0, 0.0),
            levels: Vec::new(),
        }
    }

    pub fn with_patrol(mut self, travel: f32, speed: f32) -> Self {
        self.patrol = (travel, speed);
        self
    }

    pub fn cell_size(&self) -> Vec2 {
        self.cell_size
    }

    /// Decipher every source and position its cells.
    ///
    /// Replaces whatever a previous `read` stored.
    pub fn read<S: LevelSource + ?Sized>(&mut self, sources: &[&S]) {
        self.levels.clear();
        for source in sources {
            let deciphered = source.decipher();
            if let Some(diagnostic) = &deciphered.diagnostic {
                log::warn!("Level {}: {}", source.name(), diagnostic);
            }

            let layout: LevelLayout = deciphered
                .grid
                .rows()
                .iter()
                .rev()
                .enumerate()
                .map(|(row, cells)| {
                    cells
                        .iter()
                        .enumerate()
                        .map(|(col, cell)| cell.map(|kind| self.build(kind, col, row)))
                        .collect()
                })
                .collect();

            log::info!(
                "Level {}: {} rows x {} columns, {} entities",
                source.name(),
                deciphered.grid.row_count(),
                deciphered.grid.column_count(),
                layout.iter().flatten().flatten().count()
            );
            self.levels.push(layout);
        }
    }

    fn build(&self, kind: CellKind, col: usize, row: usize) -> Entity {
        let pos = Vec2::new(col as f32 * self.cell_size.x, row as f32 * self.cell_size.y);
        let mut entity = match kind {
            CellKind::Platform(PlatformRole::Moving) => {
                let (travel, speed) = self.patrol;
                Entity::new(
                    EntityKind::Platform {
                        role: PlatformRole::Moving,
                        patrol: Some(Patrol::new(pos.x, travel, speed)),
                    },
                    self.cell_size,
                )
            }
            CellKind::Platform(role) => Entity::platform(role, self.cell_size),
            CellKind::Player => Entity::player(self.cell_size * PLAYER_SCALE),
        };
        entity.pos = pos;
        entity
    }

    /// Attach every stored entity to `scene`, in discovery order.
    ///
    /// Attaches again on every call; call once per `read`.
    pub fn generate(&self, scene: &mut Scene) -> Vec<EntityId> {
        self.entities()
            .map(|entity| scene.attach(entity.clone()))
            .collect()
    }

    /// Per-source, per-row, per-column structure
    pub fn levels(&self) -> &[LevelLayout] {
        &self.levels
    }

    /// One source's rows
    pub fn level(&self, index: usize) -> Result<&LevelLayout> {
        self.levels
            .get(index)
            .ok_or(LevelError::SourceIndexOutOfRange {
                index,
                len: self.levels.len(),
            })
    }

    /// Every non-empty cell, flattened in discovery order
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.levels.iter().flatten().flatten().flatten()
    }
}
