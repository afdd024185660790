use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;
use rustc_hash::FxHashMap;
use tracing::{info, warn};

use crate::config::{ConfigError, LobbyConfig};
use crate::preset::presets;
use crate::settings::{GeneralSettings, TeleportDelay};
use crate::zone::{ZoneDefinition, ZoneId};

/// An immutable, validated set of zones together with the settings that
/// were loaded alongside them.
///
/// Tables are never modified in place. A reload builds a new table and
/// publishes it through the [`ZoneRegistry`], so anyone holding an
/// `Arc<ZoneTable>` keeps a consistent view for as long as they need it.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ZoneTable {
    zones: Vec<Arc<ZoneDefinition>>,
    by_id: FxHashMap<ZoneId, usize>,
    /// Only enabled zones are reachable by command or dimension.
    by_command: FxHashMap<String, usize>,
    by_dimension: FxHashMap<String, usize>,
    general: GeneralSettings,
    delay: TeleportDelay,
}

impl ZoneTable {
    /// Builds the lookup indices. Callers are responsible for validation.
    pub(crate) fn assemble(
        zones: Vec<ZoneDefinition>,
        general: GeneralSettings,
        delay: TeleportDelay,
    ) -> Self {
        let mut by_id = FxHashMap::default();
        let mut by_command = FxHashMap::default();
        let mut by_dimension = FxHashMap::default();

        for (idx, zone) in zones.iter().enumerate() {
            by_id.insert(zone.id.clone(), idx);

            if zone.enabled {
                by_command.insert(zone.command_name.clone(), idx);
                by_dimension.insert(zone.dimension.clone(), idx);
            }
        }

        Self {
            zones: zones.into_iter().map(Arc::new).collect(),
            by_id,
            by_command,
            by_dimension,
            general,
            delay,
        }
    }

    pub fn get(&self, id: &str) -> Option<&ZoneDefinition> {
        self.get_arc(id).map(|zone| &**zone)
    }

    pub fn get_arc(&self, id: &str) -> Option<&Arc<ZoneDefinition>> {
        self.by_id.get(id).map(|&idx| &self.zones[idx])
    }

    /// Looks up the enabled zone whose command is `/command`.
    pub fn by_command(&self, command: &str) -> Option<&ZoneDefinition> {
        let command = command.trim_start_matches('/');
        self.by_command.get(command).map(|&idx| &*self.zones[idx])
    }

    /// Looks up the enabled zone backed by the host dimension `dimension`.
    pub fn by_dimension(&self, dimension: &str) -> Option<&ZoneDefinition> {
        self.by_dimension
            .get(dimension)
            .map(|&idx| &*self.zones[idx])
    }

    /// All zones, enabled or not, in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = &ZoneDefinition> + '_ {
        self.zones.iter().map(|zone| &**zone)
    }

    pub fn enabled(&self) -> impl Iterator<Item = &ZoneDefinition> + '_ {
        self.iter().filter(|zone| zone.enabled)
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn general(&self) -> &GeneralSettings {
        &self.general
    }

    pub fn delay(&self) -> TeleportDelay {
        self.delay
    }
}

/// The built-in zones with default settings.
impl Default for ZoneTable {
    fn default() -> Self {
        Self::assemble(
            presets(),
            GeneralSettings::default(),
            TeleportDelay::default(),
        )
    }
}

/// Shared handle to the current [`ZoneTable`].
///
/// Reads are lock-free. A reload publishes a whole new table with a single
/// atomic swap, so readers see either the old table or the new one and never
/// wait for a reload to finish.
#[derive(Debug)]
pub struct ZoneRegistry {
    table: ArcSwap<ZoneTable>,
}

impl ZoneRegistry {
    pub fn new(table: ZoneTable) -> Self {
        log_table(&table);
        Self {
            table: ArcSwap::from_pointee(table),
        }
    }

    pub fn from_config(config: &LobbyConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.build_table()?))
    }

    /// Returns the current table. Decisions that need a consistent view
    /// should take one snapshot and use it throughout.
    pub fn snapshot(&self) -> Arc<ZoneTable> {
        self.table.load_full()
    }

    pub fn get_zone(&self, id: &str) -> Option<Arc<ZoneDefinition>> {
        self.table.load().get_arc(id).cloned()
    }

    pub fn list_enabled_zones(&self) -> Vec<Arc<ZoneDefinition>> {
        self.table
            .load()
            .zones
            .iter()
            .filter(|zone| zone.enabled)
            .cloned()
            .collect()
    }

    /// Replaces the whole table. On error the current table stays in place.
    pub fn reload(&self, config: &LobbyConfig) -> Result<(), ConfigError> {
        match config.build_table() {
            Ok(table) => {
                log_table(&table);
                self.table.store(Arc::new(table));
                Ok(())
            }
            Err(e) => {
                warn!("rejected zone configuration, keeping previous zones: {e}");
                Err(e)
            }
        }
    }

    pub fn reload_from_str(&self, s: &str) -> Result<(), ConfigError> {
        self.reload(&LobbyConfig::from_toml_str(s)?)
    }

    pub fn reload_from_path(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        self.reload(&LobbyConfig::load(path)?)
    }
}

impl Default for ZoneRegistry {
    fn default() -> Self {
        Self::new(ZoneTable::default())
    }
}

fn log_table(table: &ZoneTable) {
    info!(
        "loaded {} zones ({} enabled)",
        table.len(),
        table.enabled().count()
    );

    for zone in table.enabled() {
        if zone.use_custom_spawn {
            info!(
                "using custom spawn point {} for {} zone",
                zone.spawn, zone.id
            );
        }
    }
}
