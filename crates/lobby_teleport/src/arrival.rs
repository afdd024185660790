use dashmap::DashSet;
use lobby_zone::ZoneDefinition;
use tracing::debug;
use uuid::Uuid;

/// What a player is allowed to do with the world around them.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Debug)]
pub enum AccessMode {
    #[default]
    Survival,
    /// The player can not break or place blocks.
    Adventure,
    Creative,
}

impl AccessMode {
    /// Returns `true` for every mode other than the default.
    pub fn is_elevated(self) -> bool {
        self != AccessMode::Survival
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ArrivalOutcome {
    pub access_mode: AccessMode,
    /// The player has to be reset to survival mode once they arrive in a
    /// plain zone.
    pub marked_for_reset: bool,
    /// This arrival cleared a standing reset mark.
    pub cleared_reset: bool,
}

/// Picks the access mode of arriving players and remembers who has to be
/// switched back to survival mode later.
#[derive(Default, Debug)]
pub struct ArrivalPolicy {
    marked: DashSet<Uuid>,
}

impl ArrivalPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricted zones put builders in creative mode and everyone else in
    /// adventure mode, and mark them for a reset. Plain zones put everyone
    /// in survival mode and clear the mark.
    pub fn on_arrival(&self, player: Uuid, zone: &ZoneDefinition, is_builder: bool) -> ArrivalOutcome {
        if zone.requires_restricted_mode() {
            let access_mode = if is_builder {
                AccessMode::Creative
            } else {
                AccessMode::Adventure
            };

            self.marked.insert(player);

            ArrivalOutcome {
                access_mode,
                marked_for_reset: true,
                cleared_reset: false,
            }
        } else {
            ArrivalOutcome {
                access_mode: AccessMode::Survival,
                marked_for_reset: false,
                cleared_reset: self.marked.remove(&player).is_some(),
            }
        }
    }

    /// Handles a zone transition that did not go through a zone command,
    /// such as a portal. `to` is `None` when the player entered a world that
    /// is not a zone.
    ///
    /// Returns the access mode to apply, which is only ever survival mode
    /// for a marked player leaving the restricted zones. The mark is cleared
    /// at the same time, so the reset happens once.
    pub fn on_zone_change(&self, player: Uuid, to: Option<&ZoneDefinition>) -> Option<AccessMode> {
        if to.is_some_and(ZoneDefinition::requires_restricted_mode) {
            return None;
        }

        self.marked.remove(&player).map(|_| {
            debug!("resetting access mode of {player} after leaving the restricted zones");
            AccessMode::Survival
        })
    }

    pub fn is_marked(&self, player: Uuid) -> bool {
        self.marked.contains(&player)
    }
}
