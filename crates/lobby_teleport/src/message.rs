//! Player facing feedback.
//!
//! Messages are sent as translation keys plus arguments so the client can
//! render them in its own language.

use std::fmt;

use lobby_zone::{ZoneDefinition, ZoneId, ZoneTable};

use crate::dispatch::DenyReason;

pub const TRANSLATION_PREFIX: &str = "text.lobby.";

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum MessageKey {
    /// Args: zone name.
    TeleportTo,
    /// Args: zone name, delay in seconds.
    TeleportToIn,
    /// Args: zone name, seconds left.
    TeleportFailedCooldown,
    /// Args: zone name.
    TeleportFailedAlreadyInDimension,
    /// Args: zone name, dimension.
    UnableToTeleport,
    /// Args: zone name.
    NoPermission,
    /// Args: zone name.
    TeleportCancelled,
    /// Args: zone name, followed by every available zone command.
    WelcomeTo(ZoneId),
}

impl MessageKey {
    pub fn translation_key(&self) -> String {
        let name = match self {
            MessageKey::TeleportTo => "teleport_to",
            MessageKey::TeleportToIn => "teleport_to_in",
            MessageKey::TeleportFailedCooldown => "teleport_failed_cooldown",
            MessageKey::TeleportFailedAlreadyInDimension => {
                "teleport_failed_already_in_dimension"
            }
            MessageKey::UnableToTeleport => "unable_to_teleport",
            MessageKey::NoPermission => "no_permission",
            MessageKey::TeleportCancelled => "teleport_cancelled",
            MessageKey::WelcomeTo(zone) => {
                return format!("{TRANSLATION_PREFIX}welcome_to_{zone}");
            }
        };

        format!("{TRANSLATION_PREFIX}{name}")
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.translation_key())
    }
}

/// How a message should be colored.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Tone {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum MessageArg {
    Text(String),
    Seconds(i64),
    /// A command name, shown with its leading slash.
    Command(String),
}

impl fmt::Display for MessageArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageArg::Text(text) => f.write_str(text),
            MessageArg::Seconds(secs) => write!(f, "{secs}"),
            MessageArg::Command(name) => write!(f, "/{name}"),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Message {
    pub key: MessageKey,
    pub args: Vec<MessageArg>,
    pub tone: Tone,
}

impl Message {
    pub fn new(key: MessageKey, tone: Tone) -> Self {
        Self {
            key,
            args: vec![],
            tone,
        }
    }

    pub fn with_arg(mut self, arg: MessageArg) -> Self {
        self.args.push(arg);
        self
    }

    fn about(key: MessageKey, tone: Tone, zone: &ZoneDefinition) -> Self {
        Self::new(key, tone).with_arg(MessageArg::Text(zone.display_name.clone()))
    }

    pub fn teleport_to(zone: &ZoneDefinition) -> Self {
        Self::about(MessageKey::TeleportTo, Tone::Success, zone)
    }

    pub fn teleport_to_in(zone: &ZoneDefinition, delay_seconds: u32) -> Self {
        Self::about(MessageKey::TeleportToIn, Tone::Success, zone)
            .with_arg(MessageArg::Seconds(delay_seconds.into()))
    }

    pub fn teleport_cancelled(zone: &ZoneDefinition) -> Self {
        Self::about(MessageKey::TeleportCancelled, Tone::Warning, zone)
    }

    pub fn unable_to_teleport(zone: &ZoneDefinition) -> Self {
        Self::about(MessageKey::UnableToTeleport, Tone::Error, zone)
            .with_arg(MessageArg::Text(zone.dimension.clone()))
    }

    /// The feedback for a refused request.
    pub fn denied(reason: DenyReason, zone: &ZoneDefinition) -> Self {
        match reason {
            DenyReason::CooldownActive {
                retry_after_seconds,
            } => Self::about(MessageKey::TeleportFailedCooldown, Tone::Error, zone)
                .with_arg(MessageArg::Seconds(retry_after_seconds)),
            DenyReason::AlreadyInZoneRestricted => {
                Self::about(MessageKey::TeleportFailedAlreadyInDimension, Tone::Warning, zone)
            }
            DenyReason::ZoneUnavailable => Self::unable_to_teleport(zone),
            DenyReason::InsufficientPermission => {
                Self::about(MessageKey::NoPermission, Tone::Error, zone)
            }
        }
    }

    /// Greets a player in `zone` and lists the zone commands they can use
    /// from there.
    pub fn welcome(zone: &ZoneDefinition, table: &ZoneTable) -> Self {
        table
            .enabled()
            .map(|other| MessageArg::Command(other.command_name.clone()))
            .fold(
                Self::about(MessageKey::WelcomeTo(zone.id.clone()), Tone::Info, zone),
                Self::with_arg,
            )
    }
}
