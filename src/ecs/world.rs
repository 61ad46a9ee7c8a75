//! Mob registry wrapper around hecs

use hecs::Entity;

use super::components::Kinematics;
use crate::ai::Mob;

/// Storage for every live mob, addressed by [`Entity`] handles
pub struct MobRegistry {
    /// The underlying hecs world
    pub inner: hecs::World,
}

impl MobRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            inner: hecs::World::new(),
        }
    }

    /// Add a mob with its motion state
    pub fn spawn(&mut self, kinematics: Kinematics, mob: Mob) -> Entity {
        self.inner.spawn((kinematics, mob))
    }

    /// Remove a mob
    pub fn despawn(&mut self, entity: Entity) -> Result<(), hecs::NoSuchEntity> {
        self.inner.despawn(entity)
    }

    /// Get a reference to a component
    pub fn get<T: hecs::Component>(
        &self,
        entity: Entity,
    ) -> Result<hecs::Ref<'_, T>, hecs::ComponentError> {
        self.inner.get::<&T>(entity)
    }

    /// Get a mutable reference to a component
    pub fn get_mut<T: hecs::Component>(
        &mut self,
        entity: Entity,
    ) -> Result<hecs::RefMut<'_, T>, hecs::ComponentError> {
        self.inner.get::<&mut T>(entity)
    }

    /// Committed motion state of a mob
    pub fn kinematics(&self, entity: Entity) -> Option<Kinematics> {
        self.inner.get::<&Kinematics>(entity).ok().map(|k| *k)
    }

    /// Check if a mob exists
    pub fn contains(&self, entity: Entity) -> bool {
        self.inner.contains(entity)
    }

    /// Number of live mobs
    pub fn len(&self) -> u32 {
        self.inner.len()
    }

    /// Check if no mobs are alive
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Remove every mob
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Handles of every live mob, in storage order
    pub fn entities(&self) -> Vec<Entity> {
        self.inner
            .query::<&Mob>()
            .iter()
            .map(|(entity, _)| entity)
            .collect()
    }

    /// Query for entities with specific components
    pub fn query<Q: hecs::Query>(&self) -> hecs::QueryBorrow<'_, Q> {
        self.inner.query::<Q>()
    }

    /// Query for entities with specific components (mutable)
    pub fn query_mut<Q: hecs::Query>(&mut self) -> hecs::QueryMut<'_, Q> {
        self.inner.query_mut::<Q>()
    }
}

impl Default for MobRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MobArchetype;
    use glam::Vec2;

    #[test]
    fn test_spawn_and_despawn() {
        let mut registry = MobRegistry::new();
        let a = registry.spawn(Kinematics::at(Vec2::ZERO), Mob::new(MobArchetype::default()));
        let b = registry.spawn(Kinematics::at(Vec2::ONE), Mob::new(MobArchetype::default()));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.kinematics(b).map(|k| k.position), Some(Vec2::ONE));

        registry.despawn(a).unwrap();
        assert!(!registry.contains(a));
        assert_eq!(registry.entities(), vec![b]);
        assert!(registry.kinematics(a).is_none());
        assert!(registry.despawn(a).is_err());
    }

    #[test]
    fn test_component_access() {
        let mut registry = MobRegistry::new();
        let mob = registry.spawn(Kinematics::default(), Mob::new(MobArchetype::default()));

        registry.get_mut::<Mob>(mob).unwrap().take_damage(100.0);
        assert_eq!(registry.get::<Mob>(mob).unwrap().health(), 400.0);

        registry.clear();
        assert!(registry.is_empty());
    }
}
