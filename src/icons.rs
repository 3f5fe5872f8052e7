//! Glyph and text-prefix tables for the renderer.
//!
//! Glyphs are Font Awesome codepoints; whether they may be used at all is
//! decided per cycle by the capability detector.

use crate::status::{NetworkKind, SyncState};

/// Font family the capability detector looks for.
pub const GLYPH_FONT_FAMILY: &str = "Font Awesome";

pub const CHARGING: &str = "\u{f1e6}";
pub const WIFI: &str = "\u{f1eb}";
pub const WIRED: &str = "\u{f0ac}";
pub const OFFLINE: &str = "\u{f127}";
pub const CLOUD: &str = "\u{f0c2}";
pub const SYNCING: &str = "\u{f021}";
pub const VOLUME: &str = "\u{f028}";
pub const MUTED: &str = "\u{f026}";
pub const CALENDAR: &str = "\u{f073}";
pub const CLOCK: &str = "\u{f017}";

/// Discharge glyphs from empty to full.
const BATTERY_TIERS: [&str; 5] = [
    "\u{f244}",
    "\u{f243}",
    "\u{f242}",
    "\u{f241}",
    "\u{f240}",
];

/// Pick the battery glyph for a charge percent. The plug glyph overrides
/// every tier while on AC or charging.
pub fn battery_glyph(percent: u8, on_power: bool) -> &'static str {
    if on_power {
        return CHARGING;
    }
    match percent {
        95..=u8::MAX => BATTERY_TIERS[4],
        75..=94 => BATTERY_TIERS[3],
        55..=74 => BATTERY_TIERS[2],
        35..=54 => BATTERY_TIERS[1],
        _ => BATTERY_TIERS[0],
    }
}

pub fn network_glyph(kind: NetworkKind) -> &'static str {
    match kind {
        NetworkKind::Wifi => WIFI,
        NetworkKind::Wired => WIRED,
        NetworkKind::Offline => OFFLINE,
    }
}

pub fn sync_glyph(state: SyncState) -> &'static str {
    match state {
        SyncState::Syncing => SYNCING,
        _ => CLOUD,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundaries() {
        assert_eq!(battery_glyph(95, false), BATTERY_TIERS[4]);
        assert_eq!(battery_glyph(94, false), BATTERY_TIERS[3]);
        assert_eq!(battery_glyph(75, false), BATTERY_TIERS[3]);
        assert_eq!(battery_glyph(74, false), BATTERY_TIERS[2]);
        assert_eq!(battery_glyph(55, false), BATTERY_TIERS[2]);
        assert_eq!(battery_glyph(35, false), BATTERY_TIERS[1]);
        assert_eq!(battery_glyph(34, false), BATTERY_TIERS[0]);
        assert_eq!(battery_glyph(0, false), BATTERY_TIERS[0]);
    }

    #[test]
    fn charging_overrides_tier() {
        assert_eq!(battery_glyph(100, true), CHARGING);
        assert_eq!(battery_glyph(3, true), CHARGING);
    }
}
