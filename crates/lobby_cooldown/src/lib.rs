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

use std::fmt;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

/// A group of commands sharing one cooldown window.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct CommandFamily(String);

impl CommandFamily {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The family used when every teleport command shares one window.
    pub fn global() -> Self {
        Self("*".into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommandFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The result of [`CooldownTracker::try_acquire`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CooldownVerdict {
    /// The request may proceed and the window has been charged.
    Allowed,
    /// The player has to wait. Nothing was charged.
    Denied { retry_after_seconds: i64 },
}

impl CooldownVerdict {
    pub fn is_allowed(self) -> bool {
        self == Self::Allowed
    }
}

/// Remembers the earliest time, in epoch seconds, each player may issue the
/// next request of a family.
///
/// Entries live for the lifetime of the process. Stale entries are harmless
/// since they are overwritten on reuse, but [`purge_expired`] can drop them
/// to bound memory.
///
/// [`purge_expired`]: CooldownTracker::purge_expired
#[derive(Default, Debug)]
pub struct CooldownTracker {
    next_allowed: DashMap<(Uuid, CommandFamily), i64>,
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks the window of `player` for `family` and charges
    /// `cooldown_seconds` if it has elapsed. The boundary is inclusive: a
    /// request at exactly the stored time is allowed.
    ///
    /// The check and the charge happen under the same entry lock, so
    /// concurrent requests for the same key never both succeed.
    pub fn try_acquire(
        &self,
        player: Uuid,
        family: &CommandFamily,
        now: i64,
        cooldown_seconds: u32,
    ) -> CooldownVerdict {
        let next = now.saturating_add(i64::from(cooldown_seconds));

        match self.next_allowed.entry((player, family.clone())) {
            Entry::Occupied(mut entry) => {
                let stored = *entry.get();
                if stored > now {
                    let retry_after_seconds = stored.saturating_sub(now);
                    debug!("cooldown for {player} on {family} active for {retry_after_seconds}s");
                    CooldownVerdict::Denied {
                        retry_after_seconds,
                    }
                } else {
                    entry.insert(next);
                    CooldownVerdict::Allowed
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(next);
                CooldownVerdict::Allowed
            }
        }
    }

    /// Seconds until `player` may use `family` again, or `None` if they may
    /// use it right away.
    pub fn remaining(&self, player: Uuid, family: &CommandFamily, now: i64) -> Option<i64> {
        self.next_allowed
            .get(&(player, family.clone()))
            .map(|stored| stored.saturating_sub(now))
            .filter(|&secs| secs > 0)
    }

    /// Drops every entry whose window has elapsed at `now`. Returns the
    /// number of entries removed.
    pub fn purge_expired(&self, now: i64) -> usize {
        let mut removed = 0;
        self.next_allowed.retain(|_, stored| {
            let keep = *stored > now;
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    pub fn clear(&self) {
        self.next_allowed.clear();
    }

    pub fn len(&self) -> usize {
        self.next_allowed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.next_allowed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Barrier};
    use std::thread;

    use super::*;

    fn mining() -> CommandFamily {
        CommandFamily::new("mining")
    }

    #[test]
    fn window_is_exactly_cooldown_seconds() {
        let tracker = CooldownTracker::new();
        let player = Uuid::new_v4();

        assert_eq!(tracker.try_acquire(player, &mining(), 0, 5), CooldownVerdict::Allowed);
        assert_eq!(
            tracker.try_acquire(player, &mining(), 3, 5),
            CooldownVerdict::Denied {
                retry_after_seconds: 2
            }
        );
        assert_eq!(tracker.try_acquire(player, &mining(), 5, 5), CooldownVerdict::Allowed);
        assert_eq!(tracker.remaining(player, &mining(), 6), Some(4));
    }

    #[test]
    fn denial_does_not_extend_the_window() {
        let tracker = CooldownTracker::new();
        let player = Uuid::new_v4();

        assert!(tracker.try_acquire(player, &mining(), 10, 5).is_allowed());
        assert!(!tracker.try_acquire(player, &mining(), 14, 5).is_allowed());
        assert!(tracker.try_acquire(player, &mining(), 15, 5).is_allowed());
    }

    #[test]
    fn extreme_clocks_saturate() {
        let tracker = CooldownTracker::new();
        let player = Uuid::new_v4();

        assert!(tracker.try_acquire(player, &mining(), i64::MAX - 2, 5).is_allowed());
        assert_eq!(
            tracker.try_acquire(player, &mining(), i64::MAX - 1, 5),
            CooldownVerdict::Denied {
                retry_after_seconds: 1
            }
        );
        assert_eq!(
            tracker.try_acquire(player, &mining(), i64::MIN, 5),
            CooldownVerdict::Denied {
                retry_after_seconds: i64::MAX
            }
        );
        assert_eq!(tracker.remaining(player, &mining(), i64::MIN), Some(i64::MAX));
    }

    #[test]
    fn families_and_players_are_independent() {
        let tracker = CooldownTracker::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        assert!(tracker.try_acquire(alice, &mining(), 0, 5).is_allowed());
        assert!(tracker
            .try_acquire(alice, &CommandFamily::new("lobby"), 0, 5)
            .is_allowed());
        assert!(tracker.try_acquire(bob, &mining(), 0, 5).is_allowed());
        assert_eq!(tracker.len(), 3);
    }

    #[test]
    fn same_instant_requests_never_both_succeed() {
        const THREADS: usize = 8;

        for _ in 0..50 {
            let tracker = Arc::new(CooldownTracker::new());
            let barrier = Arc::new(Barrier::new(THREADS));
            let player = Uuid::new_v4();

            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    let tracker = tracker.clone();
                    let barrier = barrier.clone();
                    thread::spawn(move || {
                        barrier.wait();
                        tracker.try_acquire(player, &mining(), 100, 5).is_allowed()
                    })
                })
                .collect();

            let allowed = handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|&allowed| allowed)
                .count();

            assert_eq!(allowed, 1);
        }
    }

    #[test]
    fn purge_drops_elapsed_windows() {
        let tracker = CooldownTracker::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        tracker.try_acquire(alice, &mining(), 0, 5);
        tracker.try_acquire(bob, &mining(), 10, 5);

        assert_eq!(tracker.purge_expired(5), 1);
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.remaining(alice, &mining(), 5), None);
        assert_eq!(tracker.remaining(bob, &mining(), 5), Some(10));
    }
}
