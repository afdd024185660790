use bevy_ecs::prelude::*;
use bevy_ecs::query::QueryData;
use derive_more::{Deref, DerefMut};
use lobby_teleport::AccessMode;
use lobby_zone::{Protection, SpawnPoint, ZoneId};
use uuid::Uuid;

/// Marks an entity as a player the lobby manages.
#[derive(Component, Clone, PartialEq, Eq, Debug)]
pub struct LobbyPlayer {
    pub id: Uuid,
    /// The player's name, matched against the builder allowlists.
    pub name: String,
}

/// The command permission level of a player.
#[derive(Component, Clone, Copy, Default, PartialEq, Eq, Debug, Deref, DerefMut)]
pub struct PermissionLevel(pub u8);

/// The zone the player is in. `None` while they are in a world that is not
/// a zone.
#[derive(Component, Clone, Default, PartialEq, Eq, Debug, Deref, DerefMut)]
pub struct CurrentZone(pub Option<ZoneId>);

#[derive(Component, Clone, Copy, Default, PartialEq, Eq, Debug, Deref, DerefMut)]
pub struct Access(pub AccessMode);

/// The position of a player inside their current world.
#[derive(Component, Clone, Copy, Default, PartialEq, Debug)]
pub struct Location {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Location {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn distance_squared(&self, other: &Location) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }
}

/// The center of the block at `pos`.
impl From<SpawnPoint> for Location {
    fn from(pos: SpawnPoint) -> Self {
        Self {
            x: f64::from(pos.x) + 0.5,
            y: f64::from(pos.y),
            z: f64::from(pos.z) + 0.5,
        }
    }
}

/// Arrival effects still running on a player, in ticks.
#[derive(Component, Clone, Copy, Default, PartialEq, Eq, Debug, Deref, DerefMut)]
pub struct ActiveProtection(pub Protection);

impl ActiveProtection {
    /// Advances all effects by one tick.
    pub fn tick(&mut self) {
        self.0.fall_ticks = self.0.fall_ticks.saturating_sub(1);
        self.0.fire_ticks = self.0.fire_ticks.saturating_sub(1);
        self.0.heal_ticks = self.0.heal_ticks.saturating_sub(1);
    }
}

/// A teleport waiting for its delay to run out.
#[derive(Component, Clone, PartialEq, Debug)]
pub struct PendingTeleport {
    pub zone: ZoneId,
    /// Where the player stood when the teleport was accepted.
    pub origin: Location,
    /// Epoch seconds at which the teleport happens.
    pub deadline: i64,
    /// The last countdown value shown to the player.
    pub announced: i64,
}

/// The components every lobby player needs.
#[derive(Bundle)]
pub struct PlayerBundle {
    pub player: LobbyPlayer,
    pub permission_level: PermissionLevel,
    pub zone: CurrentZone,
    pub access: Access,
    pub location: Location,
    pub protection: ActiveProtection,
}

impl PlayerBundle {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            player: LobbyPlayer {
                id,
                name: name.into(),
            },
            permission_level: PermissionLevel::default(),
            zone: CurrentZone::default(),
            access: Access::default(),
            location: Location::default(),
            protection: ActiveProtection::default(),
        }
    }
}

/// A convenient [`QueryData`] for the components the teleport systems
/// change.
#[derive(QueryData)]
#[query_data(mutable)]
pub struct LobbyPlayerQuery {
    pub player: &'static LobbyPlayer,
    pub permission_level: &'static PermissionLevel,
    pub zone: &'static mut CurrentZone,
    pub access: &'static mut Access,
    pub location: &'static mut Location,
    pub protection: &'static mut ActiveProtection,
}

pub(crate) fn tick_protection(mut players: Query<&mut ActiveProtection>) {
    for mut protection in &mut players {
        if !protection.is_empty() {
            protection.tick();
        }
    }
}
