use std::sync::Arc;

use lobby_cooldown::{CommandFamily, CooldownTracker, CooldownVerdict};
use lobby_zone::{CooldownScope, ZoneId, ZoneRegistry, ZoneTable};
use tracing::debug;
use uuid::Uuid;

/// Why a teleport request was refused.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum DenyReason {
    /// The command was used too recently.
    CooldownActive { retry_after_seconds: i64 },
    /// The player is already in the zone and the zone refuses repeated
    /// teleports.
    AlreadyInZoneRestricted,
    /// The zone is unknown, disabled or not loaded by the server.
    ZoneUnavailable,
    /// The player's permission level is below the one the zone requires.
    InsufficientPermission,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TeleportDecision {
    Denied(DenyReason),
    /// The player may be teleported. When `immediate` is false the caller
    /// has to wait `delay_seconds` first.
    Accepted { immediate: bool, delay_seconds: u32 },
}

impl TeleportDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, TeleportDecision::Accepted { .. })
    }
}

/// The cooldown family a command for `zone` is charged to.
pub fn command_family(scope: CooldownScope, zone: &ZoneId) -> CommandFamily {
    match scope {
        CooldownScope::PerZone => CommandFamily::new(zone.as_str()),
        CooldownScope::Global => CommandFamily::global(),
    }
}

/// Decides whether a player may be teleported to a zone.
///
/// The dispatcher never moves anyone. It only checks the request against
/// the current zone table and the cooldowns, charging the cooldown of every
/// request for an available zone whose window has elapsed.
#[derive(Debug)]
pub struct TeleportDispatcher {
    registry: Arc<ZoneRegistry>,
    cooldowns: CooldownTracker,
}

impl TeleportDispatcher {
    pub fn new(registry: Arc<ZoneRegistry>) -> Self {
        Self {
            registry,
            cooldowns: CooldownTracker::new(),
        }
    }

    pub fn registry(&self) -> &Arc<ZoneRegistry> {
        &self.registry
    }

    pub fn cooldowns(&self) -> &CooldownTracker {
        &self.cooldowns
    }

    /// Decides a request against the current zone table.
    pub fn request_teleport(
        &self,
        player: Uuid,
        current: Option<&ZoneId>,
        target: &str,
        now: i64,
    ) -> TeleportDecision {
        self.decide(&self.registry.snapshot(), player, current, target, now)
    }

    /// Decides a request against `table`.
    ///
    /// The checks run in this order:
    ///
    /// 1. The zone must exist and be enabled. Nothing is charged otherwise.
    /// 2. The cooldown is acquired, charging it when the window has elapsed.
    /// 3. A zone that refuses repeated teleports refuses players already in
    ///    it. This denial is reported even when the cooldown was active.
    /// 4. An active cooldown denies the request.
    pub fn decide(
        &self,
        table: &ZoneTable,
        player: Uuid,
        current: Option<&ZoneId>,
        target: &str,
        now: i64,
    ) -> TeleportDecision {
        let Some(zone) = table.get(target).filter(|zone| zone.enabled) else {
            debug!("{player} requested unavailable zone `{target}`");
            return TeleportDecision::Denied(DenyReason::ZoneUnavailable);
        };

        let general = table.general();
        let family = command_family(general.cooldown_scope, &zone.id);
        let verdict = self
            .cooldowns
            .try_acquire(player, &family, now, general.command_cooldown);

        if zone.restrict_if_already_present && current == Some(&zone.id) {
            return TeleportDecision::Denied(DenyReason::AlreadyInZoneRestricted);
        }

        if let CooldownVerdict::Denied {
            retry_after_seconds,
        } = verdict
        {
            return TeleportDecision::Denied(DenyReason::CooldownActive {
                retry_after_seconds,
            });
        }

        let delay_seconds = table.delay().effective_seconds();

        TeleportDecision::Accepted {
            immediate: delay_seconds == 0,
            delay_seconds,
        }
    }
}
