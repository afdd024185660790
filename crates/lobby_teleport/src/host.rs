//! The parts of the game server this crate relies on.
//!
//! Implementations live in the server integration. The root `lobby` crate
//! provides one on top of a bevy `World`, tests use small in-memory ones.

use lobby_zone::{Protection, SpawnPoint, ZoneDefinition, ZoneId};
use thiserror::Error;
use uuid::Uuid;

use crate::arrival::AccessMode;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("player {0} is not online")]
    PlayerOffline(Uuid),
    #[error("zone `{0}` is not loaded on this server")]
    ZoneNotLoaded(ZoneId),
    #[error("position {position} in zone `{zone}` is not safe to stand on")]
    UnsafePosition { zone: ZoneId, position: SpawnPoint },
    #[error("storage failure: {0}")]
    Storage(String),
}

/// Knows which zones the server has loaded.
pub trait ZoneHost {
    /// Whatever the server uses to refer to a loaded zone.
    type Handle;

    /// Returns the handle of the loaded world backing `zone`, or `None` if
    /// the server has not loaded it (yet).
    fn resolve_zone_handle(&self, zone: &ZoneDefinition) -> Option<Self::Handle>;

    /// The position used when a zone has no spawn point of its own.
    fn shared_spawn(&self, handle: &Self::Handle) -> SpawnPoint;

    /// One-time setup of a freshly created zone, e.g. placing its structure.
    /// Does nothing by default.
    fn prepare_zone(
        &mut self,
        _zone: &ZoneDefinition,
        _handle: &Self::Handle,
    ) -> Result<(), HostError> {
        Ok(())
    }
}

/// Moves players between zones and changes their access mode.
pub trait WorldHost: ZoneHost {
    fn move_player(
        &mut self,
        player: Uuid,
        handle: &Self::Handle,
        position: SpawnPoint,
    ) -> Result<(), HostError>;

    fn access_mode(&self, player: Uuid) -> Option<AccessMode>;

    fn set_access_mode(&mut self, player: Uuid, mode: AccessMode);

    fn current_zone_of(&self, player: Uuid) -> Option<ZoneId>;

    /// Applies arrival effects such as fall protection. Does nothing by
    /// default.
    fn grant_protection(&mut self, _player: Uuid, _protection: Protection) {}

    /// Sets the access mode of `player` unless they already have it. Returns
    /// `true` if the mode was changed.
    fn ensure_access_mode(&mut self, player: Uuid, mode: AccessMode) -> bool {
        if self.access_mode(player) == Some(mode) {
            return false;
        }

        self.set_access_mode(player, mode);
        true
    }
}

/// Small per-zone flags saved with the world.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct ZoneFlags {
    /// The zone has been prepared and must not be prepared again.
    pub loaded: bool,
    /// Epoch seconds of the last change.
    pub last_update: i64,
}

/// Durable storage owned by the server.
pub trait PersistenceHost {
    /// Returns the stored flags of `zone`, or the defaults if nothing was
    /// stored yet.
    fn load_zone_flags(&self, zone: &ZoneId) -> Result<ZoneFlags, HostError>;

    fn save_zone_flags(&mut self, zone: &ZoneId, flags: ZoneFlags) -> Result<(), HostError>;

    /// Records a join of `player`. Returns `true` if they have never joined
    /// before.
    fn record_join(&mut self, player: Uuid) -> bool;
}
