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

mod arrival;
mod command;
mod dispatch;
pub mod host;
mod join;
mod lifecycle;
pub mod message;
pub mod spawn;
#[cfg(test)]
mod testing;

pub use arrival::{AccessMode, ArrivalOutcome, ArrivalPolicy};
pub use command::{
    Arrival, CommandFeedback, CommandRegistration, CommandRequest, TeleportError, ZoneCommand,
};
pub use dispatch::{command_family, DenyReason, TeleportDecision, TeleportDispatcher};
pub use host::{HostError, PersistenceHost, WorldHost, ZoneFlags, ZoneHost};
pub use join::JoinRouter;
pub use lifecycle::{prepare_zones, Preparation};
pub use message::{Message, MessageArg, MessageKey, Tone};
pub use spawn::{EntityCategory, SpawnPolicy};
