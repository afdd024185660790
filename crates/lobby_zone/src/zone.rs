use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Largest absolute value accepted for any spawn coordinate.
pub const MAX_COORDINATE: i32 = 1000;

/// Highest command permission level.
pub const MAX_PERMISSION_LEVEL: u8 = 4;

/// Upper bound for the protection and heal durations, in ticks.
pub const MAX_PROTECTION_TICKS: u32 = 1200;

/// The identifier of a zone, such as `lobby` or `mining`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(String);

impl ZoneId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl Borrow<str> for ZoneId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ZoneId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ZoneId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// An integer block position players are placed at when they arrive in a
/// zone.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl SpawnPoint {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for SpawnPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.x, self.y, self.z)
    }
}

/// How a zone treats the access mode of players arriving in it.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneAccess {
    /// Players play in survival mode.
    #[default]
    Plain,
    /// Players are switched to adventure mode, builders to creative mode.
    Restricted,
}

/// Which entities may spawn inside a zone.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Debug)]
pub struct SpawnRules {
    pub disable_mob_spawning: bool,
    pub disable_bat_spawning: bool,
    pub disable_minecart_chest_spawning: bool,
    /// Remove mob spawners as soon as they try to spawn something.
    pub remove_spawners: bool,
}

/// Effects granted to a player right after arriving in a zone. All values
/// are durations in ticks, `0` disables the effect.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Debug)]
pub struct Protection {
    pub fall_ticks: u32,
    pub fire_ticks: u32,
    pub heal_ticks: u32,
}

impl Protection {
    pub fn is_empty(&self) -> bool {
        self.fall_ticks == 0 && self.fire_ticks == 0 && self.heal_ticks == 0
    }
}

/// A fully validated zone. Immutable once it is part of a
/// [`ZoneTable`](crate::ZoneTable).
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ZoneDefinition {
    pub id: ZoneId,
    pub enabled: bool,
    /// The host dimension backing this zone, e.g. `lobby:lobby_dimension`.
    pub dimension: String,
    pub display_name: String,
    /// Command players use to teleport here, without the leading slash.
    pub command_name: String,
    pub permission_level: u8,
    /// Refuse the teleport command while the player is already in the zone.
    pub restrict_if_already_present: bool,
    pub access: ZoneAccess,
    pub use_custom_spawn: bool,
    pub spawn: SpawnPoint,
    /// Spawn point of the structure shipped with the zone. `None` means the
    /// host's shared spawn position is used.
    pub preset_spawn: Option<SpawnPoint>,
    pub builders: BTreeSet<String>,
    pub spawn_rules: SpawnRules,
    pub protection: Protection,
}

impl ZoneDefinition {
    /// Where players should be placed on arrival. `None` defers to the
    /// host's shared spawn position of the dimension.
    pub fn spawn_target(&self) -> Option<SpawnPoint> {
        if self.use_custom_spawn {
            Some(self.spawn)
        } else {
            self.preset_spawn
        }
    }

    pub fn requires_restricted_mode(&self) -> bool {
        self.access == ZoneAccess::Restricted
    }

    /// Returns `true` if `player_name` is on the builder allowlist.
    pub fn is_builder(&self, player_name: &str) -> bool {
        !player_name.is_empty() && self.builders.contains(player_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone() -> ZoneDefinition {
        ZoneDefinition {
            id: "test".into(),
            enabled: true,
            dimension: "lobby:test_dimension".into(),
            display_name: "Test".into(),
            command_name: "test".into(),
            permission_level: 0,
            restrict_if_already_present: false,
            access: ZoneAccess::Plain,
            use_custom_spawn: false,
            spawn: SpawnPoint::new(1, 2, 3),
            preset_spawn: Some(SpawnPoint::new(4, 5, 6)),
            builders: BTreeSet::new(),
            spawn_rules: SpawnRules::default(),
            protection: Protection::default(),
        }
    }

    #[test]
    fn spawn_target_prefers_custom_spawn() {
        let mut zone = zone();
        assert_eq!(zone.spawn_target(), Some(SpawnPoint::new(4, 5, 6)));

        zone.use_custom_spawn = true;
        assert_eq!(zone.spawn_target(), Some(SpawnPoint::new(1, 2, 3)));

        zone.use_custom_spawn = false;
        zone.preset_spawn = None;
        assert_eq!(zone.spawn_target(), None);
    }

    #[test]
    fn empty_names_are_never_builders() {
        let mut zone = zone();
        zone.builders.insert(String::new());
        zone.builders.insert("Alex".into());

        assert!(zone.is_builder("Alex"));
        assert!(!zone.is_builder(""));
        assert!(!zone.is_builder("alex"));
    }
}
