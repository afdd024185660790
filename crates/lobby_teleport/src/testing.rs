//! In-memory hosts for unit tests.

use lobby_zone::{Protection, SpawnPoint, ZoneDefinition, ZoneId, ZoneTable};
use rustc_hash::{FxHashMap, FxHashSet};
use uuid::Uuid;

use crate::arrival::AccessMode;
use crate::host::{HostError, PersistenceHost, WorldHost, ZoneFlags, ZoneHost};

pub(crate) const SHARED_SPAWN: SpawnPoint = SpawnPoint::new(0, 64, 0);

#[derive(Default, Debug)]
pub(crate) struct TestWorld {
    pub(crate) loaded_dimensions: FxHashSet<String>,
    pub(crate) players: FxHashMap<Uuid, (ZoneId, SpawnPoint)>,
    pub(crate) modes: FxHashMap<Uuid, AccessMode>,
    pub(crate) mode_changes: Vec<(Uuid, AccessMode)>,
    pub(crate) protections: Vec<(Uuid, Protection)>,
    pub(crate) prepared: Vec<ZoneId>,
    pub(crate) fail_moves: bool,
}

impl TestWorld {
    pub(crate) fn with_all_zones(table: &ZoneTable) -> Self {
        let mut world = Self::default();
        for zone in table.iter() {
            world.load(&zone.dimension);
        }
        world
    }

    pub(crate) fn load(&mut self, dimension: &str) {
        self.loaded_dimensions.insert(dimension.to_owned());
    }

    pub(crate) fn place(&mut self, player: Uuid, zone: &str) {
        self.players.insert(player, (zone.into(), SpawnPoint::default()));
    }

    pub(crate) fn position(&self, player: Uuid) -> Option<&(ZoneId, SpawnPoint)> {
        self.players.get(&player)
    }
}

impl ZoneHost for TestWorld {
    type Handle = ZoneId;

    fn resolve_zone_handle(&self, zone: &ZoneDefinition) -> Option<ZoneId> {
        self.loaded_dimensions
            .contains(&zone.dimension)
            .then(|| zone.id.clone())
    }

    fn shared_spawn(&self, _handle: &ZoneId) -> SpawnPoint {
        SHARED_SPAWN
    }

    fn prepare_zone(&mut self, zone: &ZoneDefinition, _handle: &ZoneId) -> Result<(), HostError> {
        self.prepared.push(zone.id.clone());
        Ok(())
    }
}

impl WorldHost for TestWorld {
    fn move_player(
        &mut self,
        player: Uuid,
        handle: &ZoneId,
        position: SpawnPoint,
    ) -> Result<(), HostError> {
        if self.fail_moves {
            return Err(HostError::UnsafePosition {
                zone: handle.clone(),
                position,
            });
        }

        self.players.insert(player, (handle.clone(), position));
        Ok(())
    }

    fn access_mode(&self, player: Uuid) -> Option<AccessMode> {
        Some(self.modes.get(&player).copied().unwrap_or_default())
    }

    fn set_access_mode(&mut self, player: Uuid, mode: AccessMode) {
        self.modes.insert(player, mode);
        self.mode_changes.push((player, mode));
    }

    fn current_zone_of(&self, player: Uuid) -> Option<ZoneId> {
        self.players.get(&player).map(|(zone, _)| zone.clone())
    }

    fn grant_protection(&mut self, player: Uuid, protection: Protection) {
        self.protections.push((player, protection));
    }
}

#[derive(Default, Debug)]
pub(crate) struct TestStore {
    pub(crate) flags: FxHashMap<ZoneId, ZoneFlags>,
    pub(crate) joined: FxHashSet<Uuid>,
    pub(crate) fail_saves: bool,
}

impl PersistenceHost for TestStore {
    fn load_zone_flags(&self, zone: &ZoneId) -> Result<ZoneFlags, HostError> {
        Ok(self.flags.get(zone).copied().unwrap_or_default())
    }

    fn save_zone_flags(&mut self, zone: &ZoneId, flags: ZoneFlags) -> Result<(), HostError> {
        if self.fail_saves {
            return Err(HostError::Storage("disk full".into()));
        }

        self.flags.insert(zone.clone(), flags);
        Ok(())
    }

    fn record_join(&mut self, player: Uuid) -> bool {
        self.joined.insert(player)
    }
}
