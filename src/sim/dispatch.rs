//! Contact dispatch
//!
//! Contacts are routed by the unordered pair of the two bodies' categories.
//! Roles are resolved before a handler runs, so a handler never sees which
//! body the physics layer reported first.

use std::collections::HashMap;

use glam::Vec2;

use super::entity::{Category, EntityId};
use super::scene::Scene;
use super::support::{Landing, PlayerStatus};

/// Unordered pair of categories; stored with the lower category first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairKey(Category, Category);

impl PairKey {
    pub fn new(a: Category, b: Category) -> Self {
        if a <= b { Self(a, b) } else { Self(b, a) }
    }

    pub fn first(&self) -> Category {
        self.0
    }

    pub fn second(&self) -> Category {
        self.1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactPhase {
    Begin,
    End,
}

/// A contact as reported by the physics layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub phase: ContactPhase,
    pub a: EntityId,
    pub b: EntityId,
    /// World-space contact point
    pub point: Vec2,
}

impl Contact {
    pub fn begin(a: EntityId, b: EntityId, point: Vec2) -> Self {
        Self {
            phase: ContactPhase::Begin,
            a,
            b,
            point,
        }
    }

    pub fn end(a: EntityId, b: EntityId, point: Vec2) -> Self {
        Self {
            phase: ContactPhase::End,
            a,
            b,
            point,
        }
    }
}

/// Contact with bodies ordered to match the pair key
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedContact {
    pub key: PairKey,
    /// Body whose category is `key.first()`
    pub first: EntityId,
    /// Body whose category is `key.second()`
    pub second: EntityId,
    pub point: Vec2,
}

/// Order the two bodies of `contact` by category (ties by id).
///
/// `None` if either body is gone or has no category.
pub fn resolve(contact: &Contact, scene: &Scene) -> Option<ResolvedContact> {
    let ca = scene.category_of(contact.a)?;
    let cb = scene.category_of(contact.b)?;
    let (first, second) = if (ca, contact.a) <= (cb, contact.b) {
        (contact.a, contact.b)
    } else {
        (contact.b, contact.a)
    };
    Some(ResolvedContact {
        key: PairKey::new(ca, cb),
        first,
        second,
        point: contact.point,
    })
}

/// Whether either body's contact mask asks for the other's category
fn is_reported(scene: &Scene, contact: &ResolvedContact) -> bool {
    let (Some(first), Some(second)) = (scene.get(contact.first), scene.get(contact.second)) else {
        return false;
    };
    first.reacts_to(contact.key.second()) || second.reacts_to(contact.key.first())
}

/// What a handler asks the session to do after dispatch
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContactOutcome {
    /// Player touched the darkness
    Finish,
    /// Player reached a level-change platform
    AdvanceLevel,
    /// Player stood on a new highest platform
    NewHeight(f32),
}

/// State a handler may touch
pub struct ContactWorld<'a> {
    pub scene: &'a Scene,
    pub status: &'a mut PlayerStatus,
    /// Moving platform the player is riding
    pub riding: &'a mut Option<EntityId>,
    pub outcomes: &'a mut Vec<ContactOutcome>,
}

impl ContactWorld<'_> {
    /// Try to land on `platform`; returns whether the contact qualified
    fn land(&mut self, platform: EntityId, point: Vec2) -> bool {
        let Some(entity) = self.scene.get(platform) else {
            return false;
        };
        let landing = self.status.land(platform, &entity.bounds(), entity.pos.y, point);
        if landing == Landing::NewHeight {
            log::debug!("New highest platform at y={}", entity.pos.y);
            self.outcomes.push(ContactOutcome::NewHeight(entity.pos.y));
        }
        landing.is_supported()
    }
}

/// Response to one category pair
pub trait ContactHandler {
    fn begin(&self, contact: &ResolvedContact, world: &mut ContactWorld<'_>);

    fn end(&self, _contact: &ResolvedContact, _world: &mut ContactWorld<'_>) {}
}

/// Player on an inert platform
pub struct Support;

impl ContactHandler for Support {
    fn begin(&self, contact: &ResolvedContact, world: &mut ContactWorld<'_>) {
        world.land(contact.second, contact.point);
    }

    fn end(&self, contact: &ResolvedContact, world: &mut ContactWorld<'_>) {
        world.status.release(contact.second);
    }
}

/// Player on a moving platform: support plus position tracking
pub struct Ride;

impl ContactHandler for Ride {
    fn begin(&self, contact: &ResolvedContact, world: &mut ContactWorld<'_>) {
        if world.land(contact.second, contact.point) {
            *world.riding = Some(contact.second);
        }
    }

    fn end(&self, contact: &ResolvedContact, world: &mut ContactWorld<'_>) {
        world.status.release(contact.second);
        if *world.riding == Some(contact.second) {
            *world.riding = None;
        }
    }
}

/// Player reached the level exit
pub struct LevelExit;

impl ContactHandler for LevelExit {
    fn begin(&self, contact: &ResolvedContact, world: &mut ContactWorld<'_>) {
        world.land(contact.second, contact.point);
        world.outcomes.push(ContactOutcome::AdvanceLevel);
    }

    fn end(&self, contact: &ResolvedContact, world: &mut ContactWorld<'_>) {
        world.status.release(contact.second);
    }
}

/// Player swallowed by the darkness
pub struct Swallow;

impl ContactHandler for Swallow {
    fn begin(&self, _contact: &ResolvedContact, world: &mut ContactWorld<'_>) {
        world.status.kill();
        world.outcomes.push(ContactOutcome::Finish);
    }
}

/// Category pair -> handler
#[derive(Default)]
pub struct DispatchTable {
    handlers: HashMap<PairKey, Box<dyn ContactHandler>>,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The game's wiring
    pub fn standard() -> Self {
        let mut table = Self::new();
        table.register(Category::Player, Category::Platform, Support);
        table.register(Category::Player, Category::MovingPlatform, Ride);
        table.register(Category::Player, Category::LevelChangePlatform, LevelExit);
        table.register(Category::Player, Category::Darkness, Swallow);
        table
    }

    /// Install the handler for a pair, replacing any previous one
    pub fn register(&mut self, a: Category, b: Category, handler: impl ContactHandler + 'static) {
        self.handlers.insert(PairKey::new(a, b), Box::new(handler));
    }

    pub fn is_registered(&self, a: Category, b: Category) -> bool {
        self.handlers.contains_key(&PairKey::new(a, b))
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Route a contact; returns false when it is masked out or nothing is
    /// registered for it
    pub fn dispatch(&self, contact: &Contact, world: &mut ContactWorld<'_>) -> bool {
        let Some(resolved) = resolve(contact, world.scene) else {
            return false;
        };
        if !is_reported(world.scene, &resolved) {
            return false;
        }
        let Some(handler) = self.handlers.get(&resolved.key) else {
            return false;
        };
        match contact.phase {
            ContactPhase::Begin => handler.begin(&resolved, world),
            ContactPhase::End => handler.end(&resolved, world),
        }
        true
    }
}
