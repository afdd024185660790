//! [`WorldHost`] and [`PersistenceHost`] implementations on top of the ECS.

use bevy_ecs::prelude::*;
use lobby_teleport::{
    AccessMode, HostError, PersistenceHost, WorldHost, ZoneFlags, ZoneHost,
};
use lobby_zone::{Protection, SpawnPoint, ZoneDefinition, ZoneId, ZoneTable};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;
use uuid::Uuid;

use crate::player::{LobbyPlayerQueryItem, Location};

/// The dimensions the server has loaded, with their shared spawn positions.
///
/// Zones backed by a dimension that is not listed here are unavailable.
#[derive(Resource, Default, Debug)]
pub struct LoadedDimensions {
    shared_spawns: FxHashMap<String, SpawnPoint>,
    prepared: FxHashSet<ZoneId>,
}

impl LoadedDimensions {
    pub fn load(&mut self, dimension: impl Into<String>, shared_spawn: SpawnPoint) {
        self.shared_spawns.insert(dimension.into(), shared_spawn);
    }

    /// Loads the dimension of every zone in `table`.
    pub fn load_all(&mut self, table: &ZoneTable, shared_spawn: SpawnPoint) {
        for zone in table.iter() {
            self.load(zone.dimension.clone(), shared_spawn);
        }
    }

    pub fn unload(&mut self, dimension: &str) -> bool {
        self.shared_spawns.remove(dimension).is_some()
    }

    pub fn is_loaded(&self, dimension: &str) -> bool {
        self.shared_spawns.contains_key(dimension)
    }

    /// Returns `true` if `zone` was set up when the server started.
    pub fn is_prepared(&self, zone: &str) -> bool {
        self.prepared.contains(zone)
    }
}

/// A loaded dimension backing a zone.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DimensionHandle {
    pub zone: ZoneId,
    pub shared_spawn: SpawnPoint,
}

impl ZoneHost for LoadedDimensions {
    type Handle = DimensionHandle;

    fn resolve_zone_handle(&self, zone: &ZoneDefinition) -> Option<DimensionHandle> {
        self.shared_spawns
            .get(&zone.dimension)
            .map(|&shared_spawn| DimensionHandle {
                zone: zone.id.clone(),
                shared_spawn,
            })
    }

    fn shared_spawn(&self, handle: &DimensionHandle) -> SpawnPoint {
        handle.shared_spawn
    }

    fn prepare_zone(
        &mut self,
        zone: &ZoneDefinition,
        _handle: &DimensionHandle,
    ) -> Result<(), HostError> {
        self.prepared.insert(zone.id.clone());
        Ok(())
    }
}

/// Zone flags and join records. Kept in memory, so they last as long as the
/// app does.
#[derive(Resource, Default, Debug)]
pub struct ZoneData {
    flags: FxHashMap<ZoneId, ZoneFlags>,
    joined: FxHashSet<Uuid>,
}

impl ZoneData {
    pub fn flags(&self, zone: &str) -> Option<ZoneFlags> {
        self.flags.get(zone).copied()
    }
}

impl PersistenceHost for ZoneData {
    fn load_zone_flags(&self, zone: &ZoneId) -> Result<ZoneFlags, HostError> {
        Ok(self.flags.get(zone).copied().unwrap_or_default())
    }

    fn save_zone_flags(&mut self, zone: &ZoneId, flags: ZoneFlags) -> Result<(), HostError> {
        self.flags.insert(zone.clone(), flags);
        Ok(())
    }

    fn record_join(&mut self, player: Uuid) -> bool {
        self.joined.insert(player)
    }
}

/// A [`WorldHost`] over the components of a single player.
pub(crate) struct PlayerHost<'a, 'w> {
    pub(crate) player: &'a mut LobbyPlayerQueryItem<'w>,
    pub(crate) dimensions: &'a LoadedDimensions,
}

impl PlayerHost<'_, '_> {
    fn is_self(&self, player: Uuid) -> bool {
        self.player.player.id == player
    }
}

impl ZoneHost for PlayerHost<'_, '_> {
    type Handle = DimensionHandle;

    fn resolve_zone_handle(&self, zone: &ZoneDefinition) -> Option<DimensionHandle> {
        self.dimensions.resolve_zone_handle(zone)
    }

    fn shared_spawn(&self, handle: &DimensionHandle) -> SpawnPoint {
        self.dimensions.shared_spawn(handle)
    }
}

impl WorldHost for PlayerHost<'_, '_> {
    fn move_player(
        &mut self,
        player: Uuid,
        handle: &DimensionHandle,
        position: SpawnPoint,
    ) -> Result<(), HostError> {
        if !self.is_self(player) {
            return Err(HostError::PlayerOffline(player));
        }

        debug!("moving {} to {position} in {}", self.player.player.name, handle.zone);

        self.player.zone.0 = Some(handle.zone.clone());
        *self.player.location = Location::from(position);
        Ok(())
    }

    fn access_mode(&self, player: Uuid) -> Option<AccessMode> {
        self.is_self(player).then(|| self.player.access.0)
    }

    fn set_access_mode(&mut self, player: Uuid, mode: AccessMode) {
        if self.is_self(player) {
            self.player.access.0 = mode;
        }
    }

    fn current_zone_of(&self, player: Uuid) -> Option<ZoneId> {
        if self.is_self(player) {
            self.player.zone.0.clone()
        } else {
            None
        }
    }

    fn grant_protection(&mut self, player: Uuid, protection: Protection) {
        if self.is_self(player) {
            self.player.protection.0 = protection;
        }
    }
}
