#![doc = include_str!("../README.md")]
#![deny(
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
    rustdoc::missing_crate_level_docs,
    rustdoc::invalid_codeblock_attributes,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::bare_urls,
    rustdoc::invalid_html_tags
)]
#![warn(
    trivial_casts,
    trivial_numeric_casts,
    unused_lifetimes,
    unused_import_braces,
    clippy::dbg_macro
)]

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use lobby_zone::{LobbyConfig, ZoneTable};
use tracing::info;

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Prints the built-in configuration.
    Defaults,
    /// Checks a configuration file and lists the zones it enables.
    Check {
        path: PathBuf,
        /// Also list disabled zones.
        #[clap(short, long)]
        all: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Defaults => {
            let toml = LobbyConfig::with_defaults()
                .to_toml_string()
                .context("failed to serialize the built-in configuration")?;
            print!("{toml}");
        }
        Command::Check { path, all } => {
            let config = LobbyConfig::load(&path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            let table = config
                .build_table()
                .with_context(|| format!("{} is not a valid configuration", path.display()))?;

            info!("{} is valid", path.display());
            print_table(&table, all);
        }
    }

    Ok(())
}

fn print_table(table: &ZoneTable, all: bool) {
    let general = table.general();
    let delay = table.delay();

    println!(
        "cooldown: {}s ({:?}), delay: {}s",
        general.command_cooldown,
        general.cooldown_scope,
        delay.effective_seconds()
    );

    for zone in table.iter().filter(|zone| all || zone.enabled) {
        let spawn = zone
            .spawn_target()
            .map_or_else(|| "shared spawn".to_owned(), |spawn| spawn.to_string());

        println!(
            "/{:<10} {:<10} {:<28} {:?}, {spawn}{}",
            zone.command_name,
            zone.id.as_str(),
            zone.dimension,
            zone.access,
            if zone.enabled { "" } else { " (disabled)" }
        );
    }
}
