use bevy_app::prelude::*;
use bevy_ecs::prelude::*;
use lobby_teleport::{AccessMode, Message};
use lobby_zone::{LobbyConfig, SpawnPoint, ZoneId};
use uuid::Uuid;

use crate::event::{LobbyMessageEvent, TeleportRequestEvent, ZoneArrivalEvent};
use crate::host::LoadedDimensions;
use crate::player::{Access, CurrentZone, Location, PlayerBundle};
use crate::{Lobby, LobbyClock, LobbyPlugin};

/// The shared spawn position of every dimension in a scenario.
pub const SHARED_SPAWN: SpawnPoint = SpawnPoint::new(0, 64, 0);

pub struct ScenarioSinglePlayer {
    /// The new bevy application.
    pub app: App,
    /// Entity handle for the single player.
    pub player: Entity,
    pub id: Uuid,
}

impl ScenarioSinglePlayer {
    /// Sets up the lobby with the default configuration, every zone loaded
    /// and a single player named `test`.
    ///
    /// The app is not updated yet, so the player has not been routed to the
    /// join zone.
    pub fn new() -> Self {
        Self::with_config(LobbyConfig::default())
    }

    /// Like [`ScenarioSinglePlayer::with_config`], parsing `toml` first.
    pub fn with_toml(toml: &str) -> Self {
        Self::with_config(LobbyConfig::from_toml_str(toml).expect("invalid test configuration"))
    }

    pub fn with_config(config: LobbyConfig) -> Self {
        let mut app = App::new();

        app.add_plugins(LobbyPlugin::new(config));

        let table = app.world().resource::<Lobby>().registry().snapshot();
        app.world_mut()
            .resource_mut::<LoadedDimensions>()
            .load_all(&table, SHARED_SPAWN);

        let id = Uuid::from_u128(1);
        let player = app.world_mut().spawn(PlayerBundle::new(id, "test")).id();

        Self { app, player, id }
    }

    pub fn set_time(&mut self, now: i64) {
        self.app.world_mut().resource_mut::<LobbyClock>().0 = now;
    }

    /// Sends a teleport request for the player and runs one update.
    pub fn request(&mut self, zone: &str) {
        self.app.world_mut().send_event(TeleportRequestEvent {
            player: self.player,
            zone: zone.into(),
        });
        self.app.update();
    }

    pub fn zone(&self) -> Option<ZoneId> {
        self.app
            .world()
            .get::<CurrentZone>(self.player)
            .and_then(|zone| zone.0.clone())
    }

    pub fn access_mode(&self) -> AccessMode {
        self.app
            .world()
            .get::<Access>(self.player)
            .map(|access| access.0)
            .unwrap_or_default()
    }

    pub fn location(&self) -> Location {
        self.app
            .world()
            .get::<Location>(self.player)
            .copied()
            .unwrap_or_default()
    }

    pub fn set_location(&mut self, location: Location) {
        if let Some(mut current) = self.app.world_mut().get_mut::<Location>(self.player) {
            *current = location;
        }
    }

    /// Removes and returns all messages sent so far.
    pub fn take_messages(&mut self) -> Vec<Message> {
        self.app
            .world_mut()
            .resource_mut::<Events<LobbyMessageEvent>>()
            .drain()
            .map(|event| event.message)
            .collect()
    }

    /// Removes and returns all arrival events sent so far.
    pub fn take_arrivals(&mut self) -> Vec<ZoneArrivalEvent> {
        self.app
            .world_mut()
            .resource_mut::<Events<ZoneArrivalEvent>>()
            .drain()
            .collect()
    }
}

impl Default for ScenarioSinglePlayer {
    fn default() -> Self {
        Self::new()
    }
}
