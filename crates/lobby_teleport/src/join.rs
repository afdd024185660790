use dashmap::DashSet;
use lobby_zone::{ZoneId, ZoneTable};
use tracing::debug;
use uuid::Uuid;

use crate::host::PersistenceHost;

/// Decides whether a joining player is sent to the join zone.
///
/// Of the join settings, `always` wins over `once`, which wins over
/// `to_lobby`:
///
/// - `always` sends players on every join.
/// - `once` sends players only on their first join ever.
/// - `to_lobby` sends players on their first join since the server started.
#[derive(Default, Debug)]
pub struct JoinRouter {
    seen: DashSet<Uuid>,
}

impl JoinRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the join and returns the zone the player should be sent to,
    /// if any.
    pub fn on_join<P: PersistenceHost + ?Sized>(
        &self,
        table: &ZoneTable,
        persistence: &mut P,
        player: Uuid,
    ) -> Option<ZoneId> {
        let first_ever = persistence.record_join(player);
        let first_since_start = self.seen.insert(player);
        let join = &table.general().join;

        let send = if join.always {
            true
        } else if join.once {
            first_ever
        } else {
            join.to_lobby && first_since_start
        };

        if !send {
            return None;
        }

        match table.get(join.zone.as_str()) {
            Some(zone) if zone.enabled => Some(zone.id.clone()),
            _ => {
                debug!("join zone `{}` is disabled, leaving {player} in place", join.zone);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use lobby_zone::LobbyConfig;

    use super::*;
    use crate::testing::TestStore;

    fn table(general: &str) -> ZoneTable {
        LobbyConfig::from_toml_str(&format!("[general]\n{general}"))
            .unwrap()
            .build_table()
            .unwrap()
    }

    #[test]
    fn first_join_since_start() {
        let table = table("");
        let router = JoinRouter::new();
        let mut store = TestStore::default();
        let player = Uuid::new_v4();

        assert_eq!(router.on_join(&table, &mut store, player), Some("lobby".into()));
        assert_eq!(router.on_join(&table, &mut store, player), None);

        // A restart forgets who joined, the store does not.
        let router = JoinRouter::new();
        assert_eq!(router.on_join(&table, &mut store, player), Some("lobby".into()));
    }

    #[test]
    fn once_uses_the_persistent_record() {
        let table = table("default_to_lobby_once = true\n");
        let mut store = TestStore::default();
        let player = Uuid::new_v4();

        assert!(JoinRouter::new().on_join(&table, &mut store, player).is_some());
        assert!(JoinRouter::new().on_join(&table, &mut store, player).is_none());
    }

    #[test]
    fn always_and_never() {
        let always = table("default_to_lobby_always = true\njoin_zone = \"mining\"\n");
        let never = table("default_to_lobby = false\n");
        let router = JoinRouter::new();
        let mut store = TestStore::default();
        let player = Uuid::new_v4();

        for _ in 0..3 {
            assert_eq!(router.on_join(&always, &mut store, player), Some("mining".into()));
        }
        assert_eq!(router.on_join(&never, &mut store, Uuid::new_v4()), None);
    }

    #[test]
    fn disabled_join_zone() {
        let table = table("join_zone = \"gaming\"\n");
        let mut store = TestStore::default();

        assert_eq!(JoinRouter::new().on_join(&table, &mut store, Uuid::new_v4()), None);
    }
}
