//! The on-disk configuration format.
//!
//! Every key of a zone table is optional. Missing keys are taken from the
//! built-in preset of the zone, or from generic defaults for zones that have
//! no preset. Ranges are checked while building the [`ZoneTable`], not while
//! parsing, so that out-of-range values produce a descriptive
//! [`ConfigError`] instead of a generic deserialization failure.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::{fs, io};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::preset::{preset, presets, BUILTIN_ZONES};
use crate::registry::ZoneTable;
use crate::settings::{
    CooldownScope, GeneralSettings, JoinSettings, TeleportDelay, COOLDOWN_RANGE, DELAY_RANGE,
};
use crate::zone::{
    Protection, SpawnPoint, SpawnRules, ZoneAccess, ZoneDefinition, ZoneId, MAX_COORDINATE,
    MAX_PERMISSION_LEVEL, MAX_PROTECTION_TICKS,
};

/// Why a configuration could not be turned into a [`ZoneTable`]. Any of
/// these fails the whole load.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to read configuration file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("zone `{zone}` is missing required field `{field}`")]
    MissingField { zone: ZoneId, field: &'static str },
    #[error("zone `{zone}` has permission level {value}, expected 0..=4")]
    PermissionLevel { zone: ZoneId, value: i64 },
    #[error("zone `{zone}` has spawn {axis} coordinate {value}, expected -1000..=1000")]
    Coordinate { zone: ZoneId, axis: char, value: i64 },
    #[error("zone `{zone}` has a {effect} duration of {value} ticks, expected 0..=1200")]
    ProtectionTicks {
        zone: ZoneId,
        effect: &'static str,
        value: i64,
    },
    #[error("command cooldown of {0} seconds, expected 1..=300")]
    Cooldown(i64),
    #[error("teleport delay of {0} seconds, expected 0..=60")]
    Delay(i64),
    #[error("zone `{zone}` has an empty command name")]
    EmptyCommand { zone: ZoneId },
    #[error("zones `{first}` and `{second}` both use the command `/{command}`")]
    DuplicateCommand {
        command: String,
        first: ZoneId,
        second: ZoneId,
    },
    #[error("zones `{first}` and `{second}` both use the dimension `{dimension}`")]
    DuplicateDimension {
        dimension: String,
        first: ZoneId,
        second: ZoneId,
    },
    #[error("join zone `{0}` is not defined")]
    UnknownJoinZone(ZoneId),
}

/// The complete configuration document.
#[derive(Clone, PartialEq, Eq, Default, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LobbyConfig {
    pub general: GeneralConfig,
    pub teleport_delay: TeleportDelayConfig,
    pub zones: BTreeMap<String, ZoneConfig>,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneralConfig {
    pub command_cooldown: i64,
    pub cooldown_scope: CooldownScope,
    pub default_to_lobby: bool,
    pub default_to_lobby_once: bool,
    pub default_to_lobby_always: bool,
    pub join_zone: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        let general = GeneralSettings::default();
        Self {
            command_cooldown: general.command_cooldown.into(),
            cooldown_scope: general.cooldown_scope,
            default_to_lobby: general.join.to_lobby,
            default_to_lobby_once: general.join.once,
            default_to_lobby_always: general.join.always,
            join_zone: general.join.zone.as_str().to_owned(),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TeleportDelayConfig {
    pub enabled: bool,
    pub seconds: i64,
    pub counter_visible: bool,
}

impl Default for TeleportDelayConfig {
    fn default() -> Self {
        let delay = TeleportDelay::default();
        Self {
            enabled: delay.enabled,
            seconds: delay.seconds.into(),
            counter_visible: delay.counter_visible,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpawnConfig {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

/// Overrides for a single zone.
#[derive(Clone, PartialEq, Eq, Default, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ZoneConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission_level: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restrict_command: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<ZoneAccess>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_custom_spawn: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spawn: Option<SpawnConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub builders: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_mob_spawning: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_bat_spawning: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_minecart_chest_spawning: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_spawners: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fall_protection: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fire_protection: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heal: Option<i64>,
}

impl From<&ZoneDefinition> for ZoneConfig {
    fn from(zone: &ZoneDefinition) -> Self {
        Self {
            enabled: Some(zone.enabled),
            dimension: Some(zone.dimension.clone()),
            display_name: Some(zone.display_name.clone()),
            command_name: Some(zone.command_name.clone()),
            permission_level: Some(zone.permission_level.into()),
            restrict_command: Some(zone.restrict_if_already_present),
            access: Some(zone.access),
            use_custom_spawn: Some(zone.use_custom_spawn),
            spawn: Some(SpawnConfig {
                x: zone.spawn.x.into(),
                y: zone.spawn.y.into(),
                z: zone.spawn.z.into(),
            }),
            builders: Some(zone.builders.iter().cloned().collect()),
            disable_mob_spawning: Some(zone.spawn_rules.disable_mob_spawning),
            disable_bat_spawning: Some(zone.spawn_rules.disable_bat_spawning),
            disable_minecart_chest_spawning: Some(zone.spawn_rules.disable_minecart_chest_spawning),
            remove_spawners: Some(zone.spawn_rules.remove_spawners),
            fall_protection: Some(zone.protection.fall_ticks.into()),
            fire_protection: Some(zone.protection.fire_ticks.into()),
            heal: Some(zone.protection.heal_ticks.into()),
        }
    }
}

impl LobbyConfig {
    /// A configuration with every built-in zone written out in full. Useful
    /// as a starting point for server owners.
    pub fn with_defaults() -> Self {
        Self {
            general: GeneralConfig::default(),
            teleport_delay: TeleportDelayConfig::default(),
            zones: presets()
                .iter()
                .map(|zone| (zone.id.as_str().to_owned(), ZoneConfig::from(zone)))
                .collect(),
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let s = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_toml_str(&s)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Validates the configuration and builds the zone table from it.
    pub fn build_table(&self) -> Result<ZoneTable, ConfigError> {
        let general = self.general.validate()?;
        let delay = self.teleport_delay.validate()?;

        let mut zones = vec![];

        for id in BUILTIN_ZONES {
            let overrides = self.zones.get(id).cloned().unwrap_or_default();
            zones.push(overrides.resolve(id.into(), preset(id))?);
        }

        for (id, overrides) in &self.zones {
            if !BUILTIN_ZONES.contains(&id.as_str()) {
                zones.push(overrides.resolve(id.as_str().into(), None)?);
            }
        }

        check_unique(&zones)?;

        if !zones.iter().any(|z| z.id == general.join.zone) {
            return Err(ConfigError::UnknownJoinZone(general.join.zone));
        }

        Ok(ZoneTable::assemble(zones, general, delay))
    }
}

impl GeneralConfig {
    fn validate(&self) -> Result<GeneralSettings, ConfigError> {
        if !COOLDOWN_RANGE.contains(&self.command_cooldown) {
            return Err(ConfigError::Cooldown(self.command_cooldown));
        }

        Ok(GeneralSettings {
            command_cooldown: self.command_cooldown as u32,
            cooldown_scope: self.cooldown_scope,
            join: JoinSettings {
                to_lobby: self.default_to_lobby,
                once: self.default_to_lobby_once,
                always: self.default_to_lobby_always,
                zone: self.join_zone.as_str().into(),
            },
        })
    }
}

impl TeleportDelayConfig {
    fn validate(&self) -> Result<TeleportDelay, ConfigError> {
        if !DELAY_RANGE.contains(&self.seconds) {
            return Err(ConfigError::Delay(self.seconds));
        }

        Ok(TeleportDelay {
            enabled: self.enabled,
            seconds: self.seconds as u32,
            counter_visible: self.counter_visible,
        })
    }
}

impl ZoneConfig {
    fn resolve(
        &self,
        id: ZoneId,
        base: Option<ZoneDefinition>,
    ) -> Result<ZoneDefinition, ConfigError> {
        let mut zone = match base {
            Some(base) => base,
            None => ZoneDefinition {
                id: id.clone(),
                enabled: true,
                dimension: self
                    .dimension
                    .clone()
                    .ok_or_else(|| ConfigError::MissingField {
                        zone: id.clone(),
                        field: "dimension",
                    })?,
                display_name: id.as_str().to_owned(),
                command_name: id.as_str().to_owned(),
                permission_level: 0,
                restrict_if_already_present: false,
                access: ZoneAccess::Plain,
                use_custom_spawn: false,
                spawn: SpawnPoint::default(),
                preset_spawn: None,
                builders: Default::default(),
                spawn_rules: SpawnRules::default(),
                protection: Protection::default(),
            },
        };

        if let Some(enabled) = self.enabled {
            zone.enabled = enabled;
        }
        if let Some(dimension) = &self.dimension {
            zone.dimension.clone_from(dimension);
        }
        if let Some(name) = &self.display_name {
            zone.display_name.clone_from(name);
        }
        if let Some(command) = &self.command_name {
            zone.command_name = command.trim_start_matches('/').to_owned();
        }
        if zone.command_name.is_empty() {
            return Err(ConfigError::EmptyCommand { zone: id });
        }
        if let Some(level) = self.permission_level {
            if !(0..=i64::from(MAX_PERMISSION_LEVEL)).contains(&level) {
                return Err(ConfigError::PermissionLevel {
                    zone: id,
                    value: level,
                });
            }
            zone.permission_level = level as u8;
        }
        if let Some(restrict) = self.restrict_command {
            zone.restrict_if_already_present = restrict;
        }
        if let Some(access) = self.access {
            zone.access = access;
        }
        if let Some(custom) = self.use_custom_spawn {
            zone.use_custom_spawn = custom;
        }
        if let Some(spawn) = self.spawn {
            zone.spawn = SpawnPoint::new(
                coordinate(&id, 'x', spawn.x)?,
                coordinate(&id, 'y', spawn.y)?,
                coordinate(&id, 'z', spawn.z)?,
            );
        }
        if let Some(builders) = &self.builders {
            zone.builders = builders
                .iter()
                .map(|name| name.trim())
                .filter(|name| !name.is_empty())
                .map(str::to_owned)
                .collect();
        }

        let rules = &mut zone.spawn_rules;
        if let Some(v) = self.disable_mob_spawning {
            rules.disable_mob_spawning = v;
        }
        if let Some(v) = self.disable_bat_spawning {
            rules.disable_bat_spawning = v;
        }
        if let Some(v) = self.disable_minecart_chest_spawning {
            rules.disable_minecart_chest_spawning = v;
        }
        if let Some(v) = self.remove_spawners {
            rules.remove_spawners = v;
        }

        if let Some(ticks) = self.fall_protection {
            zone.protection.fall_ticks = protection_ticks(&id, "fall protection", ticks)?;
        }
        if let Some(ticks) = self.fire_protection {
            zone.protection.fire_ticks = protection_ticks(&id, "fire protection", ticks)?;
        }
        if let Some(ticks) = self.heal {
            zone.protection.heal_ticks = protection_ticks(&id, "heal", ticks)?;
        }

        Ok(zone)
    }
}

fn coordinate(zone: &ZoneId, axis: char, value: i64) -> Result<i32, ConfigError> {
    if (-i64::from(MAX_COORDINATE)..=i64::from(MAX_COORDINATE)).contains(&value) {
        Ok(value as i32)
    } else {
        Err(ConfigError::Coordinate {
            zone: zone.clone(),
            axis,
            value,
        })
    }
}

fn protection_ticks(zone: &ZoneId, effect: &'static str, value: i64) -> Result<u32, ConfigError> {
    if (0..=i64::from(MAX_PROTECTION_TICKS)).contains(&value) {
        Ok(value as u32)
    } else {
        Err(ConfigError::ProtectionTicks {
            zone: zone.clone(),
            effect,
            value,
        })
    }
}

/// Enabled zones must not share a command or a dimension, otherwise
/// commands and zone lookups would be ambiguous.
fn check_unique(zones: &[ZoneDefinition]) -> Result<(), ConfigError> {
    let mut commands = FxHashMap::<&str, &ZoneId>::default();
    let mut dimensions = FxHashMap::<&str, &ZoneId>::default();

    for zone in zones.iter().filter(|z| z.enabled) {
        if let Some(first) = commands.insert(zone.command_name.as_str(), &zone.id) {
            return Err(ConfigError::DuplicateCommand {
                command: zone.command_name.clone(),
                first: first.clone(),
                second: zone.id.clone(),
            });
        }
        if let Some(first) = dimensions.insert(zone.dimension.as_str(), &zone.id) {
            return Err(ConfigError::DuplicateDimension {
                dimension: zone.dimension.clone(),
                first: first.clone(),
                second: zone.id.clone(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn empty_document_uses_presets() {
        let table = LobbyConfig::from_toml_str("").unwrap().build_table().unwrap();

        assert_eq!(table.len(), BUILTIN_ZONES.len());
        assert_eq!(table.general(), &GeneralSettings::default());
        assert_eq!(table.delay(), TeleportDelay::default());
        assert_eq!(table.get("mining"), preset("mining").as_ref());
    }

    #[test]
    fn defaults_survive_a_round_trip() {
        let text = LobbyConfig::with_defaults().to_toml_string().unwrap();
        let parsed = LobbyConfig::from_toml_str(&text).unwrap();

        assert_eq!(parsed, LobbyConfig::with_defaults());
        assert_eq!(parsed.build_table().unwrap(), ZoneTable::default());
    }

    #[test]
    fn overrides_keep_unset_preset_values() {
        let config = LobbyConfig::from_toml_str(
            r#"
            [zones.lobby]
            restrict_command = true
            builders = ["Steve", " ", "Alex"]

            [zones.mining]
            use_custom_spawn = true
            spawn = { x = -1000, y = 64, z = 1000 }
            "#,
        )
        .unwrap();

        let table = config.build_table().unwrap();

        let lobby = table.get("lobby").unwrap();
        assert!(lobby.restrict_if_already_present);
        assert_eq!(lobby.command_name, "lobby");
        assert_eq!(lobby.builders.len(), 2);
        assert!(lobby.is_builder("Steve"));

        let mining = table.get("mining").unwrap();
        assert_eq!(mining.spawn_target(), Some(SpawnPoint::new(-1000, 64, 1000)));
        assert!(mining.spawn_rules.remove_spawners);
    }

    #[test]
    fn custom_zone_requires_dimension() {
        let config = LobbyConfig::from_toml_str("[zones.arena]\nenabled = true\n").unwrap();

        assert!(matches!(
            config.build_table(),
            Err(ConfigError::MissingField { field: "dimension", .. })
        ));
    }

    #[test]
    fn custom_zone_defaults() {
        let config =
            LobbyConfig::from_toml_str("[zones.arena]\ndimension = \"lobby:arena\"\n").unwrap();
        let table = config.build_table().unwrap();
        let arena = table.get("arena").unwrap();

        assert_eq!(arena.command_name, "arena");
        assert_eq!(arena.display_name, "arena");
        assert_eq!(arena.spawn_target(), None);
        assert_eq!(table.by_command("arena").map(|z| &z.id), Some(&arena.id));
    }

    #[test]
    fn out_of_range_values_fail() {
        let cases = [
            "[zones.lobby]\npermission_level = 5\n",
            "[zones.lobby]\npermission_level = -1\n",
            "[zones.lobby]\nspawn = { x = 0, y = 1001, z = 0 }\n",
            "[zones.default]\nheal = 1201\n",
            "[general]\ncommand_cooldown = 0\n",
            "[general]\ncommand_cooldown = -5\n",
            "[general]\ncommand_cooldown = 301\n",
            "[teleport_delay]\nseconds = 61\n",
        ];

        for case in cases {
            let config = LobbyConfig::from_toml_str(case).unwrap();
            assert!(config.build_table().is_err(), "accepted {case:?}");
        }
    }

    #[test]
    fn coordinate_error_names_the_axis() {
        let config =
            LobbyConfig::from_toml_str("[zones.fishing]\nspawn = { x = 0, y = 0, z = -1001 }\n")
                .unwrap();

        match config.build_table() {
            Err(ConfigError::Coordinate { zone, axis, value }) => {
                assert_eq!(zone.as_str(), "fishing");
                assert_eq!(axis, 'z');
                assert_eq!(value, -1001);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn duplicate_commands_among_enabled_zones() {
        let config =
            LobbyConfig::from_toml_str("[zones.fishing]\ncommand_name = \"lobby\"\n").unwrap();
        assert!(matches!(
            config.build_table(),
            Err(ConfigError::DuplicateCommand { .. })
        ));

        // A disabled zone never registers its command.
        let config = LobbyConfig::from_toml_str(
            "[zones.fishing]\ncommand_name = \"lobby\"\nenabled = false\n",
        )
        .unwrap();
        assert!(config.build_table().is_ok());
    }

    #[test]
    fn unknown_join_zone() {
        let config = LobbyConfig::from_toml_str("[general]\njoin_zone = \"hub\"\n").unwrap();
        assert!(matches!(
            config.build_table(),
            Err(ConfigError::UnknownJoinZone(_))
        ));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            LobbyConfig::from_toml_str("[zones.lobby]\nflying = true\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[general]\ncommand_cooldown = 30").unwrap();

        let config = LobbyConfig::load(file.path()).unwrap();
        assert_eq!(config.general.command_cooldown, 30);

        assert!(matches!(
            LobbyConfig::load(file.path().with_extension("missing")),
            Err(ConfigError::Io { .. })
        ));
    }
}
