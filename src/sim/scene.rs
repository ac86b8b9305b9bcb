//! Scene graph: the attached entities of the running level

use glam::Vec2;

use super::entity::{Category, Entity, EntityId, EntityKind};
use crate::error::{LevelError, Result};

/// Flat entity store with stable (attach-order) iteration.
#[derive(Debug, Clone)]
pub struct Scene {
    entities: Vec<Entity>,
    next_id: u32,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            next_id: 1,
        }
    }

    /// Attach an entity, assigning it a fresh id
    pub fn attach(&mut self, mut entity: Entity) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        entity.id = id;
        self.entities.push(entity);
        id
    }

    /// Remove every entity. Ids are never reused.
    pub fn teardown(&mut self) {
        self.entities.clear();
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    pub fn category_of(&self, id: EntityId) -> Option<Category> {
        self.get(id).and_then(|e| e.category)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// First entity matching `pred`
    pub fn find(&self, pred: impl Fn(&EntityKind) -> bool) -> Option<EntityId> {
        self.entities.iter().find(|e| pred(&e.kind)).map(|e| e.id)
    }

    /// The player of the current level
    pub fn find_player(&self, level: &str) -> Result<EntityId> {
        self.find(|k| matches!(k, EntityKind::Player))
            .ok_or_else(|| LevelError::PlayerNotFound {
                level: level.to_string(),
            })
    }

    /// Move every entity by `delta` (level slide)
    pub fn shift_all(&mut self, delta: Vec2) {
        for entity in &mut self.entities {
            entity.pos += delta;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::PlatformRole;

    #[test]
    fn test_attach_assigns_unique_ids() {
        let mut scene = Scene::new();
        let a = scene.attach(Entity::platform(PlatformRole::Inert, Vec2::ONE));
        let b = scene.attach(Entity::player(Vec2::ONE));
        assert_ne!(a, b);
        assert_eq!(scene.category_of(b), Some(Category::Player));
        assert_eq!(scene.find_player("t").unwrap(), b);

        scene.teardown();
        assert!(scene.is_empty());
        let c = scene.attach(Entity::player(Vec2::ONE));
        assert!(c > b);
    }

    #[test]
    fn test_find_player_missing() {
        let mut scene = Scene::new();
        scene.attach(Entity::platform(PlatformRole::Inert, Vec2::ONE));
        let err = scene.find_player("easy-01").unwrap_err();
        assert!(matches!(err, LevelError::PlayerNotFound { ref level } if level == "easy-01"));
    }

    #[test]
    fn test_shift_all() {
        let mut scene = Scene::new();
        let id = scene.attach(Entity::player(Vec2::ONE));
        scene.shift_all(Vec2::new(0.0, -5.0));
        assert_eq!(scene.get(id).unwrap().pos, Vec2::new(0.0, -5.0));
    }
}
