//! Entities and collision categories
//!
//! Every scene object is one `Entity` record. Platform variants are a role
//! tag on the record; role-specific behavior lives in the contact dispatch
//! table rather than on the entity.

use std::ops::{BitAnd, BitOr, BitOrAssign};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::Bounds;

/// Unique identifier for an entity in a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Collision category of a physics body.
///
/// Declaration order is the canonical order inside a pair key, so `Player`
/// always resolves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Player,
    Platform,
    MovingPlatform,
    LevelChangePlatform,
    Darkness,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Player,
        Category::Platform,
        Category::MovingPlatform,
        Category::LevelChangePlatform,
        Category::Darkness,
    ];

    /// Wire-level bit flag handed to the physics layer
    pub const fn bits(self) -> u32 {
        match self {
            Category::Player => 1 << 0,
            Category::Platform => 1 << 1,
            Category::MovingPlatform => 1 << 2,
            Category::LevelChangePlatform => 1 << 3,
            Category::Darkness => 1 << 4,
        }
    }

    /// Any of the three platform categories
    pub fn is_platform(self) -> bool {
        matches!(
            self,
            Category::Platform | Category::MovingPlatform | Category::LevelChangePlatform
        )
    }
}

/// Set of categories, combinable with `|`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct CategoryMask(pub u32);

impl CategoryMask {
    pub const NONE: CategoryMask = CategoryMask(0);

    /// Every platform category
    pub const PLATFORMS: CategoryMask = CategoryMask(
        Category::Platform.bits()
            | Category::MovingPlatform.bits()
            | Category::LevelChangePlatform.bits(),
    );

    pub fn contains(self, category: Category) -> bool {
        self.0 & category.bits() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl From<Category> for CategoryMask {
    fn from(category: Category) -> Self {
        CategoryMask(category.bits())
    }
}

impl BitOr for CategoryMask {
    type Output = CategoryMask;
    fn bitor(self, rhs: Self) -> Self {
        CategoryMask(self.0 | rhs.0)
    }
}

impl BitOr<Category> for CategoryMask {
    type Output = CategoryMask;
    fn bitor(self, rhs: Category) -> Self {
        CategoryMask(self.0 | rhs.bits())
    }
}

impl BitOr for Category {
    type Output = CategoryMask;
    fn bitor(self, rhs: Self) -> CategoryMask {
        CategoryMask(self.bits() | rhs.bits())
    }
}

impl BitOrAssign<Category> for CategoryMask {
    fn bitor_assign(&mut self, rhs: Category) {
        self.0 |= rhs.bits();
    }
}

impl BitAnd for CategoryMask {
    type Output = CategoryMask;
    fn bitand(self, rhs: Self) -> Self {
        CategoryMask(self.0 & rhs.0)
    }
}

/// Platform role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformRole {
    /// Static ground
    Inert,
    /// Oscillates horizontally around its spawn point
    Moving,
    /// Touching it advances to the next level
    LevelChange,
}

impl PlatformRole {
    pub fn category(self) -> Category {
        match self {
            PlatformRole::Inert => Category::Platform,
            PlatformRole::Moving => Category::MovingPlatform,
            PlatformRole::LevelChange => Category::LevelChangePlatform,
        }
    }
}

/// Horizontal oscillation state of a moving platform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Patrol {
    /// Spawn x; the platform travels `travel` either side of it
    pub origin_x: f32,
    pub travel: f32,
    pub speed: f32,
    /// +1 right, -1 left
    pub direction: f32,
}

impl Patrol {
    pub fn new(origin_x: f32, travel: f32, speed: f32) -> Self {
        Self {
            origin_x,
            travel,
            speed,
            direction: 1.0,
        }
    }

    /// Advance from `x` by `dt` seconds, bouncing at the ends; returns the new x
    pub fn step(&mut self, x: f32, dt: f32) -> f32 {
        let mut next = x + self.direction * self.speed * dt;
        let min = self.origin_x - self.travel;
        let max = self.origin_x + self.travel;
        if next > max {
            next = max - (next - max);
            self.direction = -1.0;
        } else if next < min {
            next = min + (min - next);
            self.direction = 1.0;
        }
        next.clamp(min, max)
    }
}

/// Entity variants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    Platform {
        role: PlatformRole,
        patrol: Option<Patrol>,
    },
    Player,
    /// Rising hazard plane
    Darkness,
    /// On-screen movement controls
    Controller,
    /// Arrow pointing at an off-screen player
    Indicator,
}

/// A scene object with physics-relevant geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    /// Centre position
    pub pos: Vec2,
    /// Full extent
    pub size: Vec2,
    pub category: Option<Category>,
    /// Categories whose contacts this body reports; dispatch drops a
    /// contact unless one side asks for the other
    pub contact_mask: CategoryMask,
    pub visible: bool,
    /// Radians
    pub rotation: f32,
}

impl Entity {
    /// Unpositioned entity with the default category wiring for its kind
    pub fn new(kind: EntityKind, size: Vec2) -> Self {
        let (category, contact_mask) = match kind {
            EntityKind::Platform { role, .. } => (Some(role.category()), CategoryMask::NONE),
            EntityKind::Player => (
                Some(Category::Player),
                CategoryMask::PLATFORMS | Category::Darkness,
            ),
            EntityKind::Darkness => (Some(Category::Darkness), Category::Player.into()),
            EntityKind::Controller | EntityKind::Indicator => (None, CategoryMask::NONE),
        };
        Self {
            id: EntityId(0),
            kind,
            pos: Vec2::ZERO,
            size,
            category,
            contact_mask,
            visible: true,
            rotation: 0.0,
        }
    }

    pub fn platform(role: PlatformRole, size: Vec2) -> Self {
        Self::new(EntityKind::Platform { role, patrol: None }, size)
    }

    pub fn player(size: Vec2) -> Self {
        Self::new(EntityKind::Player, size)
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::centered(self.pos, self.size)
    }

    pub fn is_player(&self) -> bool {
        matches!(self.kind, EntityKind::Player)
    }

    pub fn platform_role(&self) -> Option<PlatformRole> {
        match self.kind {
            EntityKind::Platform { role, .. } => Some(role),
            _ => None,
        }
    }

    /// Whether this body reports contacts with `other`
    pub fn reacts_to(&self, other: Category) -> bool {
        self.contact_mask.contains(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_bits_are_distinct_flags() {
        let mut seen = 0u32;
        for c in Category::ALL {
            assert_eq!(c.bits().count_ones(), 1);
            assert_eq!(seen & c.bits(), 0);
            seen |= c.bits();
        }
    }

    #[test]
    fn test_mask_combination() {
        let mask = Category::Player | Category::Darkness;
        assert!(mask.contains(Category::Player));
        assert!(mask.contains(Category::Darkness));
        assert!(!mask.contains(Category::Platform));
        assert!((mask & CategoryMask::PLATFORMS).is_empty());
    }

    #[test]
    fn test_player_wiring() {
        let player = Entity::player(Vec2::splat(10.0));
        assert_eq!(player.category, Some(Category::Player));
        assert!(player.reacts_to(Category::MovingPlatform));
        assert!(player.reacts_to(Category::Darkness));
        assert!(!player.reacts_to(Category::Player));

        let ledge = Entity::platform(PlatformRole::LevelChange, Vec2::splat(10.0));
        assert_eq!(ledge.category, Some(Category::LevelChangePlatform));
        assert_eq!(ledge.platform_role(), Some(PlatformRole::LevelChange));
    }

    #[test]
    fn test_patrol_bounces() {
        let mut patrol = Patrol::new(100.0, 10.0, 20.0);
        let x = patrol.step(105.0, 0.5); // overshoots 115 -> reflects to 105
        assert_eq!(x, 105.0);
        assert_eq!(patrol.direction, -1.0);
        let x = patrol.step(x, 1.0); // 85 -> reflects to 95
        assert_eq!(x, 95.0);
        assert_eq!(patrol.direction, 1.0);
    }
}
