use serde::{Deserialize, Serialize};

use crate::zone::ZoneId;

/// Bounds of the general command cooldown, in seconds.
pub const COOLDOWN_RANGE: std::ops::RangeInclusive<i64> = 1..=300;

/// Bounds of the teleport delay, in seconds.
pub const DELAY_RANGE: std::ops::RangeInclusive<i64> = 0..=60;

/// Which teleport commands share a cooldown window.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CooldownScope {
    /// Every zone command keeps its own window. Using `/lobby` does not
    /// block `/mining`.
    #[default]
    PerZone,
    /// All zone commands share a single window per player.
    Global,
}

/// Where joining players are sent.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct JoinSettings {
    /// Send players to [`JoinSettings::zone`] on their first join after the
    /// server started.
    pub to_lobby: bool,
    /// Only send players on their very first join.
    pub once: bool,
    /// Send players on every join.
    pub always: bool,
    pub zone: ZoneId,
}

impl Default for JoinSettings {
    fn default() -> Self {
        Self {
            to_lobby: true,
            once: false,
            always: false,
            zone: "lobby".into(),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct GeneralSettings {
    /// Seconds before a teleport command can be used again.
    pub command_cooldown: u32,
    pub cooldown_scope: CooldownScope,
    pub join: JoinSettings,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            command_cooldown: 5,
            cooldown_scope: CooldownScope::PerZone,
            join: JoinSettings::default(),
        }
    }
}

/// How long players have to stand still before a teleport happens.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TeleportDelay {
    pub enabled: bool,
    pub seconds: u32,
    /// Show the countdown in chat.
    pub counter_visible: bool,
}

impl TeleportDelay {
    /// The delay that actually applies. Zero when the delay is disabled.
    pub fn effective_seconds(&self) -> u32 {
        if self.enabled {
            self.seconds
        } else {
            0
        }
    }
}

impl Default for TeleportDelay {
    fn default() -> Self {
        Self {
            enabled: true,
            seconds: 3,
            counter_visible: true,
        }
    }
}
