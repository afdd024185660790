use bevy_ecs::prelude::*;
use lobby_teleport::{Arrival, Message};
use lobby_zone::{LobbyConfig, ZoneId};

/// A player ran the command of `zone`.
#[derive(Event, Clone, PartialEq, Eq, Debug)]
pub struct TeleportRequestEvent {
    pub player: Entity,
    pub zone: ZoneId,
}

/// A player entered another world on their own, e.g. through a portal.
#[derive(Event, Clone, PartialEq, Eq, Debug)]
pub struct ZoneChangedEvent {
    pub player: Entity,
    /// The dimension the player is in now.
    pub dimension: String,
}

/// Replaces the zone table. An invalid configuration is logged and the
/// current zones stay in place.
#[derive(Event, Clone, Default, Debug)]
pub struct ReloadZonesEvent {
    pub config: LobbyConfig,
}

/// Feedback for a player.
#[derive(Event, Clone, PartialEq, Eq, Debug)]
pub struct LobbyMessageEvent {
    pub player: Entity,
    pub message: Message,
}

/// A player arrived in a zone.
#[derive(Event, Clone, PartialEq, Eq, Debug)]
pub struct ZoneArrivalEvent {
    pub player: Entity,
    pub arrival: Arrival,
}
