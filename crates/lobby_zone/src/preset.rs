//! The zones every server starts out with.

use std::collections::BTreeSet;

use crate::zone::{Protection, SpawnPoint, SpawnRules, ZoneAccess, ZoneDefinition};

/// Identifiers of the built-in zones in the order they are listed to
/// players.
pub const BUILTIN_ZONES: [&str; 7] = [
    "default", "lobby", "mining", "fishing", "gaming", "void", "newdim",
];

struct Preset {
    id: &'static str,
    enabled: bool,
    dimension: &'static str,
    display_name: &'static str,
    command_name: &'static str,
    access: ZoneAccess,
    custom_spawn: SpawnPoint,
    preset_spawn: Option<SpawnPoint>,
    spawn_rules: SpawnRules,
    protection: Protection,
}

const NO_RULES: SpawnRules = SpawnRules {
    disable_mob_spawning: false,
    disable_bat_spawning: false,
    disable_minecart_chest_spawning: false,
    remove_spawners: false,
};

const NO_MOBS: SpawnRules = SpawnRules {
    disable_mob_spawning: true,
    ..NO_RULES
};

const NO_PROTECTION: Protection = Protection {
    fall_ticks: 0,
    fire_ticks: 0,
    heal_ticks: 0,
};

const PRESETS: [Preset; 7] = [
    Preset {
        id: "default",
        enabled: true,
        dimension: "minecraft:overworld",
        display_name: "Spawn",
        command_name: "spawn",
        access: ZoneAccess::Plain,
        custom_spawn: SpawnPoint::new(68, 65, -89),
        preset_spawn: None,
        spawn_rules: NO_RULES,
        protection: Protection {
            fall_ticks: 200,
            fire_ticks: 200,
            heal_ticks: 0,
        },
    },
    Preset {
        id: "lobby",
        enabled: true,
        dimension: "lobby:lobby_dimension",
        display_name: "Lobby",
        command_name: "lobby",
        access: ZoneAccess::Restricted,
        custom_spawn: SpawnPoint::new(9, 9, 9),
        preset_spawn: Some(SpawnPoint::new(9, 11, 9)),
        spawn_rules: NO_MOBS,
        protection: NO_PROTECTION,
    },
    Preset {
        id: "mining",
        enabled: true,
        dimension: "lobby:mining_dimension",
        display_name: "Mining",
        command_name: "mining",
        access: ZoneAccess::Plain,
        custom_spawn: SpawnPoint::new(200, 11, 558),
        preset_spawn: Some(SpawnPoint::new(203, 9, 560)),
        spawn_rules: SpawnRules {
            disable_mob_spawning: true,
            disable_bat_spawning: true,
            disable_minecart_chest_spawning: true,
            remove_spawners: true,
        },
        protection: NO_PROTECTION,
    },
    Preset {
        id: "fishing",
        enabled: true,
        dimension: "lobby:fishing_dimension",
        display_name: "Fishing",
        command_name: "fishing",
        access: ZoneAccess::Restricted,
        custom_spawn: SpawnPoint::new(42, 51, 12),
        preset_spawn: Some(SpawnPoint::new(42, 51, 12)),
        spawn_rules: NO_MOBS,
        protection: NO_PROTECTION,
    },
    Preset {
        id: "gaming",
        enabled: false,
        dimension: "lobby:gaming_dimension",
        display_name: "Gaming",
        command_name: "gaming",
        access: ZoneAccess::Restricted,
        custom_spawn: SpawnPoint::new(9, 9, 9),
        preset_spawn: Some(SpawnPoint::new(0, 4, 0)),
        spawn_rules: NO_RULES,
        protection: NO_PROTECTION,
    },
    Preset {
        id: "void",
        enabled: false,
        dimension: "lobby:void_dimension",
        display_name: "Void",
        command_name: "void",
        access: ZoneAccess::Restricted,
        custom_spawn: SpawnPoint::new(9, 9, 9),
        preset_spawn: Some(SpawnPoint::new(0, 4, 0)),
        spawn_rules: NO_RULES,
        protection: NO_PROTECTION,
    },
    Preset {
        id: "newdim",
        enabled: true,
        dimension: "lobby:newdim_dimension",
        display_name: "NewDim",
        command_name: "newdim",
        access: ZoneAccess::Restricted,
        custom_spawn: SpawnPoint::new(42, 51, 12),
        preset_spawn: Some(SpawnPoint::new(42, 51, 12)),
        spawn_rules: NO_RULES,
        protection: NO_PROTECTION,
    },
];

impl Preset {
    fn to_definition(&self) -> ZoneDefinition {
        ZoneDefinition {
            id: self.id.into(),
            enabled: self.enabled,
            dimension: self.dimension.to_owned(),
            display_name: self.display_name.to_owned(),
            command_name: self.command_name.to_owned(),
            permission_level: 0,
            restrict_if_already_present: false,
            access: self.access,
            use_custom_spawn: false,
            spawn: self.custom_spawn,
            preset_spawn: self.preset_spawn,
            builders: BTreeSet::new(),
            spawn_rules: self.spawn_rules,
            protection: self.protection,
        }
    }
}

/// Returns the built-in definition of the zone named `id`, if there is one.
pub fn preset(id: &str) -> Option<ZoneDefinition> {
    PRESETS
        .iter()
        .find(|p| p.id == id)
        .map(Preset::to_definition)
}

/// Returns all built-in zone definitions in [`BUILTIN_ZONES`] order.
pub fn presets() -> Vec<ZoneDefinition> {
    PRESETS.iter().map(Preset::to_definition).collect()
}
