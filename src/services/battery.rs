//! Power poller.
//!
//! Reads the kernel power-supply class directly. No battery entry means
//! the source is absent (normal on desktops); an entry whose capacity
//! cannot be read means the source is unavailable this cycle. The check
//! re-runs every cycle so hot-plugged hardware is honored.

use crate::probe::warn_once;
use crate::status::{BatteryReading, SourceResult};
use std::fs;
use std::path::Path;

pub const POWER_SUPPLY_ROOT: &str = "/sys/class/power_supply";

/// Poll the first battery device under `root`.
///
/// Multi-battery machines are not disambiguated: the first entry in name
/// order wins.
pub fn poll(root: &Path) -> SourceResult<BatteryReading> {
    let mut entries: Vec<_> = match fs::read_dir(root) {
        Ok(dir) => dir.filter_map(|e| e.ok().map(|e| e.path())).collect(),
        Err(_) => return SourceResult::Absent,
    };
    entries.sort();

    let Some(battery) = entries
        .iter()
        .find(|path| read_trimmed(&path.join("type")).as_deref() == Some("Battery"))
    else {
        return SourceResult::Absent;
    };

    let Some(percent) = read_trimmed(&battery.join("capacity")).and_then(|s| s.parse::<u8>().ok())
    else {
        warn_once(
            "battery-capacity",
            format!("cannot read capacity from {}", battery.display()),
        );
        return SourceResult::Unavailable;
    };

    let status = read_trimmed(&battery.join("status")).unwrap_or_default();
    let charging = status == "Charging";

    // Paired AC adapter if one exists, else infer from charging status.
    let ac_online = entries
        .iter()
        .find(|path| read_trimmed(&path.join("type")).as_deref() == Some("Mains"))
        .and_then(|mains| read_trimmed(&mains.join("online")))
        .map(|online| online == "1")
        .unwrap_or(charging);

    SourceResult::Present(BatteryReading {
        percent: percent.min(100),
        charging,
        ac_online,
    })
}

fn read_trimmed(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok().map(|s| s.trim().to_string())
}
