use lobby_zone::{ZoneId, ZoneTable};
use tracing::{error, info};

use crate::host::{PersistenceHost, ZoneFlags, ZoneHost};

/// What [`prepare_zones`] did with each enabled zone.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct Preparation {
    /// Zones prepared by this call.
    pub prepared: Vec<ZoneId>,
    /// Zones that were prepared before.
    pub already_loaded: Vec<ZoneId>,
    /// Zones the server has not loaded.
    pub missing: Vec<ZoneId>,
    /// Zones whose preparation or bookkeeping failed.
    pub failed: Vec<ZoneId>,
}

/// Prepares every enabled zone that was never prepared before and records
/// that in the zone flags. Meant to run once when the server starts.
///
/// Failures are logged and reported, they never stop the other zones from
/// being prepared.
pub fn prepare_zones<W, P>(
    table: &ZoneTable,
    world: &mut W,
    persistence: &mut P,
    now: i64,
) -> Preparation
where
    W: ZoneHost + ?Sized,
    P: PersistenceHost + ?Sized,
{
    let mut report = Preparation::default();

    for zone in table.enabled() {
        let id = zone.id.clone();

        let Some(handle) = world.resolve_zone_handle(zone) else {
            error!("unable to find {} dimension `{}`", zone.display_name, zone.dimension);
            report.missing.push(id);
            continue;
        };

        let flags = match persistence.load_zone_flags(&id) {
            Ok(flags) => flags,
            Err(e) => {
                error!("unable to load data of zone `{id}`: {e}");
                report.failed.push(id);
                continue;
            }
        };

        if flags.loaded {
            report.already_loaded.push(id);
            continue;
        }

        if let Err(e) = world.prepare_zone(zone, &handle) {
            error!("unable to prepare zone `{id}`: {e}");
            report.failed.push(id);
            continue;
        }

        let flags = ZoneFlags {
            loaded: true,
            last_update: now,
        };

        if let Err(e) = persistence.save_zone_flags(&id, flags) {
            error!("prepared zone `{id}` but could not save its data: {e}");
            report.failed.push(id);
            continue;
        }

        info!("prepared {} zone `{id}`", zone.display_name);
        report.prepared.push(id);
    }

    report
}
