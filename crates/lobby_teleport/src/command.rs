use std::sync::Arc;

use lobby_zone::{SpawnPoint, ZoneDefinition, ZoneId, ZoneRegistry, ZoneTable};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::arrival::{AccessMode, ArrivalOutcome, ArrivalPolicy};
use crate::dispatch::{DenyReason, TeleportDecision, TeleportDispatcher};
use crate::host::{HostError, WorldHost};
use crate::message::{Message, MessageArg, MessageKey, Tone};

#[derive(Debug, Error)]
pub enum TeleportError {
    #[error("zone `{0}` is not available")]
    ZoneUnavailable(ZoneId),
    #[error("failed to move player {player} to zone `{zone}`")]
    MoveFailed {
        player: Uuid,
        zone: ZoneId,
        #[source]
        source: HostError,
    },
}

/// A player running the command of a zone.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct CommandRequest {
    pub player: Uuid,
    pub player_name: String,
    pub permission_level: u8,
    pub zone: ZoneId,
    /// Epoch seconds.
    pub now: i64,
}

/// A command the server should register.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct CommandRegistration {
    /// The command name without its leading slash.
    pub name: String,
    pub zone: ZoneId,
    pub permission_level: u8,
}

/// A completed teleport.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Arrival {
    pub zone: ZoneId,
    /// The zone the player was in before, if any.
    pub from: Option<ZoneId>,
    pub position: SpawnPoint,
    pub outcome: ArrivalOutcome,
    /// Whether the host had to change the player's access mode.
    pub access_changed: bool,
    /// Set when the player arrived from a different zone.
    pub welcome: Option<Message>,
}

/// The reply to a [`CommandRequest`].
#[derive(Debug)]
pub struct CommandFeedback {
    pub decision: TeleportDecision,
    pub message: Message,
    /// The result of the teleport when it happened right away.
    pub arrival: Option<Result<Arrival, TeleportError>>,
}

impl CommandFeedback {
    fn denied(reason: DenyReason, message: Message) -> Self {
        Self {
            decision: TeleportDecision::Denied(reason),
            message,
            arrival: None,
        }
    }
}

/// The command behind every zone.
///
/// `/lobby`, `/mining` and the others only differ in the zone they are
/// registered for, so one `ZoneCommand` serves all of them.
#[derive(Debug)]
pub struct ZoneCommand {
    dispatcher: TeleportDispatcher,
    arrival: ArrivalPolicy,
}

impl ZoneCommand {
    pub fn new(registry: Arc<ZoneRegistry>) -> Self {
        Self {
            dispatcher: TeleportDispatcher::new(registry),
            arrival: ArrivalPolicy::new(),
        }
    }

    pub fn registry(&self) -> &Arc<ZoneRegistry> {
        self.dispatcher.registry()
    }

    pub fn dispatcher(&self) -> &TeleportDispatcher {
        &self.dispatcher
    }

    pub fn arrival(&self) -> &ArrivalPolicy {
        &self.arrival
    }

    /// The commands of all enabled zones.
    pub fn registrations(&self) -> Vec<CommandRegistration> {
        self.registry()
            .list_enabled_zones()
            .iter()
            .map(|zone| CommandRegistration {
                name: zone.command_name.clone(),
                zone: zone.id.clone(),
                permission_level: zone.permission_level,
            })
            .collect()
    }

    /// Runs the command for `request.zone`.
    ///
    /// When the teleport is accepted with a delay, nothing is moved yet. The
    /// caller is expected to call [`ZoneCommand::complete`] once the delay
    /// is over, or drop the teleport if the player moved in the meantime.
    pub fn execute<W: WorldHost + ?Sized>(
        &self,
        world: &mut W,
        request: &CommandRequest,
    ) -> CommandFeedback {
        let table = self.registry().snapshot();

        let Some(zone) = table.get(request.zone.as_str()) else {
            return CommandFeedback::denied(
                DenyReason::ZoneUnavailable,
                Message::new(MessageKey::UnableToTeleport, Tone::Error)
                    .with_arg(MessageArg::Text(request.zone.to_string())),
            );
        };

        if !zone.enabled {
            return CommandFeedback::denied(
                DenyReason::ZoneUnavailable,
                Message::unable_to_teleport(zone),
            );
        }

        if request.permission_level < zone.permission_level {
            return CommandFeedback::denied(
                DenyReason::InsufficientPermission,
                Message::denied(DenyReason::InsufficientPermission, zone),
            );
        }

        if world.resolve_zone_handle(zone).is_none() {
            warn!(
                "{} zone is enabled but dimension `{}` is not loaded",
                zone.id, zone.dimension
            );
            return CommandFeedback::denied(
                DenyReason::ZoneUnavailable,
                Message::unable_to_teleport(zone),
            );
        }

        let current = world.current_zone_of(request.player);
        let decision = self.dispatcher.decide(
            &table,
            request.player,
            current.as_ref(),
            zone.id.as_str(),
            request.now,
        );

        match decision {
            TeleportDecision::Denied(reason) => {
                CommandFeedback::denied(reason, Message::denied(reason, zone))
            }
            TeleportDecision::Accepted {
                immediate: false,
                delay_seconds,
            } => CommandFeedback {
                decision,
                message: Message::teleport_to_in(zone, delay_seconds),
                arrival: None,
            },
            TeleportDecision::Accepted {
                immediate: true, ..
            } => CommandFeedback {
                decision,
                message: Message::teleport_to(zone),
                arrival: Some(self.arrive(
                    &table,
                    world,
                    request.player,
                    &request.player_name,
                    zone,
                )),
            },
        }
    }

    /// Moves `player` to `zone` and applies the arrival rules. Cooldowns are
    /// neither checked nor charged.
    pub fn complete<W: WorldHost + ?Sized>(
        &self,
        world: &mut W,
        player: Uuid,
        player_name: &str,
        zone: &str,
    ) -> Result<Arrival, TeleportError> {
        let table = self.registry().snapshot();

        let Some(def) = table.get(zone).filter(|def| def.enabled) else {
            return Err(TeleportError::ZoneUnavailable(zone.into()));
        };

        self.arrive(&table, world, player, player_name, def)
    }

    fn arrive<W: WorldHost + ?Sized>(
        &self,
        table: &ZoneTable,
        world: &mut W,
        player: Uuid,
        player_name: &str,
        zone: &ZoneDefinition,
    ) -> Result<Arrival, TeleportError> {
        let handle = world
            .resolve_zone_handle(zone)
            .ok_or_else(|| TeleportError::ZoneUnavailable(zone.id.clone()))?;

        let from = world.current_zone_of(player);
        let position = zone
            .spawn_target()
            .unwrap_or_else(|| world.shared_spawn(&handle));

        if let Some(from) = &from {
            debug!("teleport history for {player_name}: {from} -> {}", zone.id);
        }

        if let Err(source) = world.move_player(player, &handle, position) {
            error!(
                "unable to teleport {player_name} to {} zone at {position}: {source}",
                zone.id
            );
            return Err(TeleportError::MoveFailed {
                player,
                zone: zone.id.clone(),
                source,
            });
        }

        let outcome = self
            .arrival
            .on_arrival(player, zone, zone.is_builder(player_name));

        if outcome.access_mode == AccessMode::Creative {
            info!("giving builder {player_name} creative mode in {} zone", zone.id);
        }

        let access_changed = world.ensure_access_mode(player, outcome.access_mode);

        if !zone.protection.is_empty() {
            world.grant_protection(player, zone.protection);
        }

        let welcome = (from.as_ref() != Some(&zone.id)).then(|| Message::welcome(zone, table));

        Ok(Arrival {
            zone: zone.id.clone(),
            from,
            position,
            outcome,
            access_changed,
            welcome,
        })
    }

    /// Handles a player entering another world without a zone command.
    /// `dimension` is the dimension they entered. Returns `true` if their
    /// access mode was reset.
    pub fn on_zone_change<W: WorldHost + ?Sized>(
        &self,
        world: &mut W,
        player: Uuid,
        dimension: &str,
    ) -> bool {
        let table = self.registry().snapshot();

        match self
            .arrival
            .on_zone_change(player, table.by_dimension(dimension))
        {
            Some(mode) => world.ensure_access_mode(player, mode),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use lobby_zone::{LobbyConfig, Protection};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::testing::{TestWorld, SHARED_SPAWN};

    fn command(toml: &str) -> (ZoneCommand, TestWorld) {
        let config = LobbyConfig::from_toml_str(toml).unwrap();
        let registry = Arc::new(ZoneRegistry::from_config(&config).unwrap());
        let world = TestWorld::with_all_zones(&registry.snapshot());
        (ZoneCommand::new(registry), world)
    }

    fn request(player: Uuid, zone: &str, now: i64) -> CommandRequest {
        CommandRequest {
            player,
            player_name: "Steve".into(),
            permission_level: 0,
            zone: zone.into(),
            now,
        }
    }

    const NO_DELAY: &str = "[teleport_delay]\nenabled = false\n";

    #[test]
    fn immediate_teleport_moves_and_elevates() {
        let (command, mut world) = command(NO_DELAY);
        let player = Uuid::new_v4();
        world.place(player, "default");

        let feedback = command.execute(&mut world, &request(player, "lobby", 0));

        let lobby = command.registry().get_zone("lobby").unwrap();
        assert_eq!(feedback.message, Message::teleport_to(&lobby));
        let arrival = feedback.arrival.unwrap().unwrap();
        assert_eq!(arrival.from, Some("default".into()));
        assert_eq!(arrival.outcome.access_mode, AccessMode::Adventure);
        assert!(arrival.access_changed);
        assert!(arrival.welcome.is_some());
        assert_eq!(
            world.position(player),
            Some(&(ZoneId::new("lobby"), SpawnPoint::new(9, 11, 9)))
        );
        assert!(command.arrival().is_marked(player));
    }

    #[test]
    fn delayed_teleport_waits_for_complete() {
        let (command, mut world) = command("");
        let player = Uuid::new_v4();
        world.place(player, "default");

        let feedback = command.execute(&mut world, &request(player, "fishing", 0));

        assert_eq!(
            feedback.decision,
            TeleportDecision::Accepted {
                immediate: false,
                delay_seconds: 3
            }
        );
        assert_eq!(feedback.message.key, MessageKey::TeleportToIn);
        assert!(feedback.arrival.is_none());
        assert_eq!(world.current_zone_of(player), Some("default".into()));

        let arrival = command.complete(&mut world, player, "Steve", "fishing").unwrap();
        assert_eq!(arrival.position, SpawnPoint::new(42, 51, 12));
        assert_eq!(world.current_zone_of(player), Some("fishing".into()));
    }

    #[test]
    fn builders_get_creative_and_mode_changes_are_not_repeated() {
        let (command, mut world) =
            command("[teleport_delay]\nenabled = false\n[zones.lobby]\nbuilders = [\"Steve\"]\n");
        let player = Uuid::new_v4();

        let first = command.complete(&mut world, player, "Steve", "lobby").unwrap();
        let second = command.complete(&mut world, player, "Steve", "lobby").unwrap();

        assert_eq!(first.outcome.access_mode, AccessMode::Creative);
        assert!(first.access_changed);
        assert!(!second.access_changed);
        assert!(second.welcome.is_none());
        assert_eq!(world.mode_changes, [(player, AccessMode::Creative)]);
    }

    #[test]
    fn plain_zone_resets_marked_players() {
        let (command, mut world) = command(NO_DELAY);
        let player = Uuid::new_v4();

        command.complete(&mut world, player, "Steve", "fishing").unwrap();
        let arrival = command.complete(&mut world, player, "Steve", "mining").unwrap();

        assert!(arrival.outcome.cleared_reset);
        assert_eq!(
            world.mode_changes,
            [
                (player, AccessMode::Adventure),
                (player, AccessMode::Survival)
            ]
        );
    }

    #[test]
    fn default_zone_uses_shared_spawn_and_protection() {
        let (command, mut world) = command(NO_DELAY);
        let player = Uuid::new_v4();

        let arrival = command.complete(&mut world, player, "Steve", "default").unwrap();

        assert_eq!(arrival.position, SHARED_SPAWN);
        assert_eq!(
            world.protections,
            [(
                player,
                Protection {
                    fall_ticks: 200,
                    fire_ticks: 200,
                    heal_ticks: 0
                }
            )]
        );
    }

    #[test]
    fn unloaded_zone_is_unavailable_without_cooldown() {
        let (command, mut world) = command(NO_DELAY);
        world.loaded_dimensions.remove("lobby:mining_dimension");
        let player = Uuid::new_v4();

        let feedback = command.execute(&mut world, &request(player, "mining", 0));

        assert_eq!(
            feedback.decision,
            TeleportDecision::Denied(DenyReason::ZoneUnavailable)
        );
        assert_eq!(feedback.message.key, MessageKey::UnableToTeleport);
        assert!(command.dispatcher().cooldowns().is_empty());
    }

    #[test]
    fn permission_level_is_checked_first() {
        let (command, mut world) = command("[zones.mining]\npermission_level = 2\n");
        let player = Uuid::new_v4();

        let feedback = command.execute(&mut world, &request(player, "mining", 0));
        assert_eq!(
            feedback.decision,
            TeleportDecision::Denied(DenyReason::InsufficientPermission)
        );
        assert_eq!(feedback.message.key, MessageKey::NoPermission);

        let mut op = request(player, "mining", 0);
        op.permission_level = 2;
        assert!(command.execute(&mut world, &op).decision.is_accepted());
    }

    #[test]
    fn disabled_zone_is_unavailable_regardless_of_permission() {
        let (command, mut world) =
            command("[zones.mining]\nenabled = false\npermission_level = 2\n");
        let player = Uuid::new_v4();

        let feedback = command.execute(&mut world, &request(player, "mining", 0));

        assert_eq!(
            feedback.decision,
            TeleportDecision::Denied(DenyReason::ZoneUnavailable)
        );
        assert_eq!(feedback.message.key, MessageKey::UnableToTeleport);
        assert!(command.dispatcher().cooldowns().is_empty());
    }

    #[test]
    fn failed_move_keeps_the_cooldown() {
        let (command, mut world) = command(NO_DELAY);
        world.fail_moves = true;
        let player = Uuid::new_v4();

        let feedback = command.execute(&mut world, &request(player, "mining", 0));

        assert!(matches!(
            feedback.arrival,
            Some(Err(TeleportError::MoveFailed { .. }))
        ));
        assert!(!command.arrival().is_marked(player));

        world.fail_moves = false;
        assert_eq!(
            command
                .execute(&mut world, &request(player, "mining", 1))
                .decision,
            TeleportDecision::Denied(DenyReason::CooldownActive {
                retry_after_seconds: 4
            })
        );
    }

    #[test]
    fn unknown_zone() {
        let (command, mut world) = command("");

        let feedback = command.execute(&mut world, &request(Uuid::new_v4(), "nether", 0));

        assert_eq!(
            feedback.decision,
            TeleportDecision::Denied(DenyReason::ZoneUnavailable)
        );
        assert_eq!(feedback.message.args, [MessageArg::Text("nether".into())]);
        assert!(matches!(
            command.complete(&mut world, Uuid::new_v4(), "Steve", "nether"),
            Err(TeleportError::ZoneUnavailable(_))
        ));
    }

    #[test]
    fn portal_out_of_the_lobby() {
        let (command, mut world) = command(NO_DELAY);
        let player = Uuid::new_v4();

        command.complete(&mut world, player, "Steve", "lobby").unwrap();

        assert!(!command.on_zone_change(&mut world, player, "lobby:fishing_dimension"));
        assert!(command.on_zone_change(&mut world, player, "minecraft:the_nether"));
        assert!(!command.on_zone_change(&mut world, player, "minecraft:overworld"));
        assert_eq!(world.modes.get(&player), Some(&AccessMode::Survival));
    }

    #[test]
    fn registrations_cover_enabled_zones() {
        let (command, _) = command("[zones.mining]\ncommand_name = \"/mine\"\npermission_level = 1\n");

        let mining = command
            .registrations()
            .into_iter()
            .find(|r| r.zone.as_str() == "mining")
            .unwrap();

        assert_eq!(
            mining,
            CommandRegistration {
                name: "mine".into(),
                zone: "mining".into(),
                permission_level: 1,
            }
        );
        assert_eq!(command.registrations().len(), 5);
    }
}
