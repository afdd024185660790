//! Which entities may appear inside a zone.

use lobby_zone::{SpawnRules, ZoneDefinition, ZoneTable};

/// The kinds of entities the spawn rules distinguish.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum EntityCategory {
    Player,
    Item,
    ExperienceOrb,
    LightningBolt,
    FallingBlock,
    Projectile,
    Bat,
    MinecartChest,
    /// Any other living entity.
    Mob,
}

impl EntityCategory {
    /// Entities created by players or the world itself rather than by
    /// natural spawning. These are never blocked.
    pub fn is_always_allowed(self) -> bool {
        matches!(
            self,
            EntityCategory::Player
                | EntityCategory::Item
                | EntityCategory::ExperienceOrb
                | EntityCategory::LightningBolt
                | EntityCategory::FallingBlock
                | EntityCategory::Projectile
        )
    }
}

/// Spawn decisions for a single zone.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct SpawnPolicy {
    rules: SpawnRules,
}

impl SpawnPolicy {
    /// Worlds that are not zones allow everything.
    pub fn for_zone(zone: Option<&ZoneDefinition>) -> Self {
        Self {
            rules: zone.map(|zone| zone.spawn_rules).unwrap_or_default(),
        }
    }

    /// The policy of the enabled zone backed by `dimension`.
    pub fn for_dimension(table: &ZoneTable, dimension: &str) -> Self {
        Self::for_zone(table.by_dimension(dimension))
    }

    pub fn allows(&self, category: EntityCategory) -> bool {
        if category.is_always_allowed() {
            return true;
        }

        match category {
            EntityCategory::Bat => !self.rules.disable_bat_spawning,
            EntityCategory::MinecartChest => !self.rules.disable_minecart_chest_spawning,
            _ => !self.rules.disable_mob_spawning,
        }
    }

    /// Whether a mob spawner that tries to spawn something should be
    /// removed from the world.
    pub fn removes_spawners(&self) -> bool {
        self.rules.remove_spawners
    }
}
