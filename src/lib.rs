#![doc = include_str!("../README.md")]
#![deny(
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
    rustdoc::missing_crate_level_docs,
    rustdoc::invalid_codeblock_attributes,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::bare_urls,
    rustdoc::invalid_html_tags
)]
#![warn(
    trivial_casts,
    trivial_numeric_casts,
    unused_lifetimes,
    unused_import_braces,
    unreachable_pub,
    clippy::dbg_macro
)]

use std::sync::Arc;

use bevy_app::prelude::*;
use bevy_ecs::prelude::*;
use derive_more::{Deref, DerefMut};
use tracing::error;

pub mod event;
pub mod host;
pub mod player;
pub mod teleport;
#[cfg(feature = "testing")]
pub mod testing;


#[cfg(feature = "log")]
pub use bevy_log as log;
pub use lobby_cooldown as cooldown;
pub use lobby_teleport as dispatch;
pub use lobby_zone as zone;

use crate::dispatch::{JoinRouter, ZoneCommand};
use crate::event::{
    LobbyMessageEvent, ReloadZonesEvent, TeleportRequestEvent, ZoneArrivalEvent, ZoneChangedEvent,
};
use crate::host::{LoadedDimensions, ZoneData};
use crate::zone::{LobbyConfig, ZoneRegistry};

/// Contains the most frequently used items of this crate.
///
/// ```
/// use lobby::prelude::*;
///
/// let mut app = App::new();
/// app.add_plugins(LobbyPlugin::default());
/// ```
pub mod prelude {
    pub use bevy_app::prelude::*;
    pub use bevy_ecs; // Needed for bevy_ecs macros to function correctly.
    pub use bevy_ecs::prelude::*;
    pub use lobby_teleport::{
        AccessMode, Arrival, DenyReason, EntityCategory, Message, MessageKey, SpawnPolicy,
        TeleportDecision,
    };
    pub use lobby_zone::{LobbyConfig, SpawnPoint, ZoneDefinition, ZoneId, ZoneRegistry};
    pub use uuid::Uuid;

    pub use super::event::{
        LobbyMessageEvent, ReloadZonesEvent, TeleportRequestEvent, ZoneArrivalEvent,
        ZoneChangedEvent,
    };
    pub use super::host::{LoadedDimensions, ZoneData};
    pub use super::player::{
        Access, ActiveProtection, CurrentZone, LobbyPlayer, Location, PendingTeleport,
        PermissionLevel, PlayerBundle,
    };
    pub use super::{Lobby, LobbyClock, LobbyPlugin, LobbySet};
}

/// Everything the teleport systems share: the zone registry, cooldowns,
/// reset marks and join records.
#[derive(Resource, Debug)]
pub struct Lobby {
    command: ZoneCommand,
    join: JoinRouter,
}

impl Lobby {
    pub fn new(registry: Arc<ZoneRegistry>) -> Self {
        Self {
            command: ZoneCommand::new(registry),
            join: JoinRouter::new(),
        }
    }

    pub fn registry(&self) -> &Arc<ZoneRegistry> {
        self.command.registry()
    }

    pub fn command(&self) -> &ZoneCommand {
        &self.command
    }

    pub fn join_router(&self) -> &JoinRouter {
        &self.join
    }
}

/// The current time in epoch seconds. The server is expected to advance it,
/// all cooldowns and delays are measured against it.
#[derive(Resource, Clone, Copy, Default, PartialEq, Eq, Debug, Deref, DerefMut)]
pub struct LobbyClock(pub i64);

/// The systems that move players between zones.
#[derive(SystemSet, Clone, PartialEq, Eq, Hash, Debug)]
pub struct LobbySet;

/// Adds zone commands, delayed teleports, join routing and arrival rules.
///
/// The server tells the plugin which dimensions exist through
/// [`LoadedDimensions`] before the first update, sends
/// [`TeleportRequestEvent`]s when players use a zone command and reads
/// [`LobbyMessageEvent`]s to show feedback.
#[derive(Default)]
pub struct LobbyPlugin {
    pub config: LobbyConfig,
}

impl LobbyPlugin {
    pub fn new(config: LobbyConfig) -> Self {
        Self { config }
    }
}

impl Plugin for LobbyPlugin {
    fn build(&self, app: &mut App) {
        let registry = ZoneRegistry::from_config(&self.config).unwrap_or_else(|e| {
            error!("invalid lobby configuration, using the built-in zones: {e}");
            ZoneRegistry::default()
        });

        app.insert_resource(Lobby::new(Arc::new(registry)))
            .init_resource::<LobbyClock>()
            .init_resource::<LoadedDimensions>()
            .init_resource::<ZoneData>()
            .add_event::<TeleportRequestEvent>()
            .add_event::<ZoneChangedEvent>()
            .add_event::<ReloadZonesEvent>()
            .add_event::<LobbyMessageEvent>()
            .add_event::<ZoneArrivalEvent>()
            .add_systems(Startup, teleport::prepare_zones_on_startup)
            .add_systems(
                Update,
                (
                    teleport::reload_zones,
                    teleport::handle_zone_changes,
                    teleport::route_joining_players,
                    teleport::handle_teleport_requests,
                    teleport::tick_pending_teleports,
                    player::tick_protection,
                    teleport::purge_cooldowns,
                )
                    .chain()
                    .in_set(LobbySet),
            );
    }
}
