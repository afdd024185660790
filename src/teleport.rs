use bevy_ecs::prelude::*;
use lobby_teleport::{
    prepare_zones, Arrival, CommandRequest, Message, MessageArg, MessageKey, TeleportDecision,
    TeleportError, Tone,
};
use lobby_zone::ZoneId;
use tracing::{debug, error, warn};

use crate::event::{
    LobbyMessageEvent, ReloadZonesEvent, TeleportRequestEvent, ZoneArrivalEvent, ZoneChangedEvent,
};
use crate::host::{LoadedDimensions, PlayerHost, ZoneData};
use crate::player::{LobbyPlayer, LobbyPlayerQuery, PendingTeleport};
use crate::{Lobby, LobbyClock};

/// A player who moves further than this from where they requested a
/// delayed teleport cancels it.
pub const MAX_DRIFT: f64 = 1.0;

/// Seconds between two sweeps of expired cooldowns.
const PURGE_INTERVAL: i64 = 60;

pub(crate) fn prepare_zones_on_startup(
    lobby: Res<Lobby>,
    clock: Res<LobbyClock>,
    mut dimensions: ResMut<LoadedDimensions>,
    mut data: ResMut<ZoneData>,
) {
    let table = lobby.registry().snapshot();
    let report = prepare_zones(&table, &mut *dimensions, &mut *data, clock.0);

    debug!(
        "prepared {} zones, {} already prepared, {} missing",
        report.prepared.len(),
        report.already_loaded.len(),
        report.missing.len()
    );
}

pub(crate) fn reload_zones(lobby: Res<Lobby>, mut events: EventReader<ReloadZonesEvent>) {
    for event in events.read() {
        if let Err(e) = lobby.registry().reload(&event.config) {
            error!("failed to reload lobby zones: {e}");
        }
    }
}

pub(crate) fn handle_zone_changes(
    lobby: Res<Lobby>,
    dimensions: Res<LoadedDimensions>,
    mut events: EventReader<ZoneChangedEvent>,
    mut players: Query<LobbyPlayerQuery>,
) {
    let table = lobby.registry().snapshot();

    for event in events.read() {
        let Ok(mut player) = players.get_mut(event.player) else {
            continue;
        };

        player.zone.0 = table
            .by_dimension(&event.dimension)
            .map(|zone| zone.id.clone());

        let id = player.player.id;
        let mut host = PlayerHost {
            player: &mut player,
            dimensions: &dimensions,
        };

        if lobby.command().on_zone_change(&mut host, id, &event.dimension) {
            debug!("reset access mode of {id} after entering {}", event.dimension);
        }
    }
}

pub(crate) fn route_joining_players(
    lobby: Res<Lobby>,
    dimensions: Res<LoadedDimensions>,
    mut data: ResMut<ZoneData>,
    mut players: Query<(Entity, LobbyPlayerQuery), Added<LobbyPlayer>>,
    mut messages: EventWriter<LobbyMessageEvent>,
    mut arrivals: EventWriter<ZoneArrivalEvent>,
) {
    let table = lobby.registry().snapshot();

    for (entity, mut player) in &mut players {
        let id = player.player.id;

        let Some(zone) = lobby.join_router().on_join(&table, &mut *data, id) else {
            continue;
        };

        let name = player.player.name.clone();
        let mut host = PlayerHost {
            player: &mut player,
            dimensions: &dimensions,
        };

        match lobby.command().complete(&mut host, id, &name, zone.as_str()) {
            Ok(arrival) => announce_arrival(entity, arrival, &mut messages, &mut arrivals),
            Err(e) => warn!("unable to send joining player {name} to {zone}: {e}"),
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn handle_teleport_requests(
    mut commands: Commands,
    lobby: Res<Lobby>,
    clock: Res<LobbyClock>,
    dimensions: Res<LoadedDimensions>,
    mut requests: EventReader<TeleportRequestEvent>,
    mut players: Query<LobbyPlayerQuery>,
    mut messages: EventWriter<LobbyMessageEvent>,
    mut arrivals: EventWriter<ZoneArrivalEvent>,
) {
    for request in requests.read() {
        let Ok(mut player) = players.get_mut(request.player) else {
            debug!("ignoring teleport request of missing player {:?}", request.player);
            continue;
        };

        let command_request = CommandRequest {
            player: player.player.id,
            player_name: player.player.name.clone(),
            permission_level: player.permission_level.0,
            zone: request.zone.clone(),
            now: clock.0,
        };

        let origin = *player.location;
        let mut host = PlayerHost {
            player: &mut player,
            dimensions: &dimensions,
        };

        let feedback = lobby.command().execute(&mut host, &command_request);

        messages.send(LobbyMessageEvent {
            player: request.player,
            message: reply(&request.zone, feedback.message, feedback.arrival.as_ref()),
        });

        if let TeleportDecision::Accepted {
            immediate: false,
            delay_seconds,
        } = feedback.decision
        {
            let delay = i64::from(delay_seconds);
            commands.entity(request.player).insert(PendingTeleport {
                zone: request.zone.clone(),
                origin,
                deadline: clock.0.saturating_add(delay),
                announced: delay,
            });
        }

        if let Some(Ok(arrival)) = feedback.arrival {
            announce_arrival(request.player, arrival, &mut messages, &mut arrivals);
        }
    }
}

pub(crate) fn tick_pending_teleports(
    mut commands: Commands,
    lobby: Res<Lobby>,
    clock: Res<LobbyClock>,
    dimensions: Res<LoadedDimensions>,
    mut players: Query<(Entity, LobbyPlayerQuery, &mut PendingTeleport)>,
    mut messages: EventWriter<LobbyMessageEvent>,
    mut arrivals: EventWriter<ZoneArrivalEvent>,
) {
    let table = lobby.registry().snapshot();
    let counter_visible = table.delay().counter_visible;

    for (entity, mut player, mut pending) in &mut players {
        let zone = table.get(pending.zone.as_str());

        if player.location.distance_squared(&pending.origin) > MAX_DRIFT * MAX_DRIFT {
            commands.entity(entity).remove::<PendingTeleport>();

            let message = match zone {
                Some(zone) => Message::teleport_cancelled(zone),
                None => Message::new(MessageKey::TeleportCancelled, Tone::Warning)
                    .with_arg(MessageArg::Text(pending.zone.to_string())),
            };
            messages.send(LobbyMessageEvent {
                player: entity,
                message,
            });
            continue;
        }

        let remaining = pending.deadline.saturating_sub(clock.0);

        if remaining > 0 {
            if counter_visible && remaining < pending.announced {
                pending.announced = remaining;

                if let Some(zone) = zone {
                    let seconds = u32::try_from(remaining).unwrap_or(u32::MAX);
                    messages.send(LobbyMessageEvent {
                        player: entity,
                        message: Message::teleport_to_in(zone, seconds),
                    });
                }
            }
            continue;
        }

        commands.entity(entity).remove::<PendingTeleport>();

        let id = player.player.id;
        let name = player.player.name.clone();
        let mut host = PlayerHost {
            player: &mut player,
            dimensions: &dimensions,
        };

        match lobby.command().complete(&mut host, id, &name, pending.zone.as_str()) {
            Ok(arrival) => announce_arrival(entity, arrival, &mut messages, &mut arrivals),
            Err(e) => {
                warn!("delayed teleport of {name} failed: {e}");
                messages.send(LobbyMessageEvent {
                    player: entity,
                    message: unable_to_teleport(&pending.zone),
                });
            }
        }
    }
}

pub(crate) fn purge_cooldowns(lobby: Res<Lobby>, clock: Res<LobbyClock>, mut last: Local<i64>) {
    if clock.0 - *last < PURGE_INTERVAL {
        return;
    }
    *last = clock.0;

    let purged = lobby.command().dispatcher().cooldowns().purge_expired(clock.0);
    if purged > 0 {
        debug!("dropped {purged} expired cooldowns");
    }
}

fn announce_arrival(
    player: Entity,
    arrival: Arrival,
    messages: &mut EventWriter<LobbyMessageEvent>,
    arrivals: &mut EventWriter<ZoneArrivalEvent>,
) {
    if let Some(welcome) = arrival.welcome.clone() {
        messages.send(LobbyMessageEvent {
            player,
            message: welcome,
        });
    }

    arrivals.send(ZoneArrivalEvent { player, arrival });
}

/// The answer to a request. A failed move replaces the confirmation.
fn reply(
    zone: &ZoneId,
    message: Message,
    arrival: Option<&Result<Arrival, TeleportError>>,
) -> Message {
    match arrival {
        Some(Err(_)) => unable_to_teleport(zone),
        _ => message,
    }
}

/// Used when a teleport fails after it was accepted. The zone may be gone
/// from the table by then, so only its id is shown.
fn unable_to_teleport(zone: &ZoneId) -> Message {
    Message::new(MessageKey::UnableToTeleport, Tone::Error)
        .with_arg(MessageArg::Text(zone.to_string()))
}
