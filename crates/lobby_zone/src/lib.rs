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
    unreachable_pub,
    clippy::dbg_macro
)]

pub mod config;
pub mod preset;
mod registry;
pub mod settings;
mod zone;

pub use config::{ConfigError, LobbyConfig};
pub use registry::{ZoneRegistry, ZoneTable};
pub use settings::{CooldownScope, GeneralSettings, JoinSettings, TeleportDelay};
pub use zone::*;
