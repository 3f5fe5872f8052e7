//! Composes one status line from the cycle's readings.
//!
//! Pure: the same readings, capability flag, and date/time strings always
//! produce byte-identical output. The scheduler injects the clock strings
//! so tests control them.

use crate::icons;
use crate::status::{BatteryReading, NetworkKind, NetworkReading, Readings, SyncState, VolumeReading};

const SEPARATOR: &str = " | ";

/// Canonical token order: Volume, Battery, Network, CloudSync, Date, Time.
/// Absent and Unavailable sources are omitted; the date/time tokens keep
/// the line non-empty.
pub fn render(readings: &Readings, icons: bool, date: &str, time: &str) -> String {
    let mut tokens: Vec<String> = Vec::with_capacity(6);

    if let Some(volume) = readings.volume.present() {
        tokens.push(volume_token(volume, icons));
    }
    if let Some(battery) = readings.battery.present() {
        tokens.push(battery_token(battery, icons));
    }
    if let Some(network) = readings.network.present() {
        tokens.push(network_token(network, icons));
    }
    if let Some(sync) = readings.sync.present() {
        tokens.push(sync_token(*sync, icons));
    }

    if icons {
        tokens.push(format!("{} {date}", icons::CALENDAR));
        tokens.push(format!("{} {time}", icons::CLOCK));
    } else {
        tokens.push(date.to_string());
        tokens.push(time.to_string());
    }

    format!("[ {} ]", tokens.join(SEPARATOR))
}

fn volume_token(volume: &VolumeReading, icons: bool) -> String {
    if icons {
        let glyph = if volume.muted { icons::MUTED } else { icons::VOLUME };
        format!("{glyph} {}%", volume.percent)
    } else if volume.muted {
        format!("VOL muted {}%", volume.percent)
    } else {
        format!("VOL {}%", volume.percent)
    }
}

fn battery_token(battery: &BatteryReading, icons: bool) -> String {
    let on_power = battery.ac_online || battery.charging;
    if icons {
        format!(
            "{} {}%",
            icons::battery_glyph(battery.percent, on_power),
            battery.percent
        )
    } else if on_power {
        format!("BAT {}%+", battery.percent)
    } else {
        format!("BAT {}%", battery.percent)
    }
}

fn network_token(network: &NetworkReading, icons: bool) -> String {
    let payload = match network.kind {
        NetworkKind::Wifi => network.name.as_deref().unwrap_or("?"),
        NetworkKind::Wired => network.name.as_deref().unwrap_or("unknown"),
        NetworkKind::Offline => "offline",
    };
    if icons {
        format!("{} {payload}", icons::network_glyph(network.kind))
    } else {
        match network.kind {
            NetworkKind::Wifi => format!("WIFI {payload}"),
            _ => format!("NET {payload}"),
        }
    }
}

fn sync_token(state: SyncState, icons: bool) -> String {
    if icons {
        format!("{} {}", icons::sync_glyph(state), state.label())
    } else {
        format!("NC {}", state.label())
    }
}
