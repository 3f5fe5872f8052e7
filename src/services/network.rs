//! Network poller.
//!
//! Wi-Fi lookup runs an ordered strategy chain (NetworkManager, iwgetid,
//! iw) with early exit, then falls back to wired-interface detection,
//! then to an explicit offline reading. This source is always present in
//! some classification: network state is always worth showing.

use crate::config::WifiSource;
use crate::probe::{CommandRunner, PROBE_TIMEOUT};
use crate::status::{NetworkKind, NetworkReading, SourceResult};
use log::debug;
use std::fs;
use std::path::Path;

pub const NET_CLASS_ROOT: &str = "/sys/class/net";

/// One step of the Wi-Fi fallback chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum WifiStrategy {
    /// `nmcli -t -f active,ssid dev wifi`, SSID of the row marked active.
    NmcliActiveWifi,
    /// `iwgetid -r`, bare SSID of the associated interface.
    Iwgetid,
    /// `iw dev`, first `ssid <name>` line across wireless interfaces.
    IwDevLink,
}

impl WifiStrategy {
    async fn try_ssid(self, runner: &dyn CommandRunner) -> Option<String> {
        match self {
            WifiStrategy::NmcliActiveWifi => {
                let out = runner
                    .run("nmcli", &["-t", "-f", "active,ssid", "dev", "wifi"], PROBE_TIMEOUT)
                    .await
                    .ok()?;
                parse_nmcli_active(&out.stdout)
            }
            WifiStrategy::Iwgetid => {
                let out = runner.run("iwgetid", &["-r"], PROBE_TIMEOUT).await.ok()?;
                let ssid = out.stdout.trim();
                (!ssid.is_empty()).then(|| ssid.to_string())
            }
            WifiStrategy::IwDevLink => {
                let out = runner.run("iw", &["dev"], PROBE_TIMEOUT).await.ok()?;
                parse_iw_dev(&out.stdout)
            }
        }
    }
}

fn chain_for(source: WifiSource) -> &'static [WifiStrategy] {
    match source {
        WifiSource::Auto => &[
            WifiStrategy::NmcliActiveWifi,
            WifiStrategy::Iwgetid,
            WifiStrategy::IwDevLink,
        ],
        WifiSource::Nmcli => &[WifiStrategy::NmcliActiveWifi],
        WifiSource::Iwgetid => &[WifiStrategy::Iwgetid],
    }
}

pub async fn poll(
    runner: &dyn CommandRunner,
    wifi_source: WifiSource,
    net_root: &Path,
) -> SourceResult<NetworkReading> {
    for strategy in chain_for(wifi_source) {
        if let Some(ssid) = strategy.try_ssid(runner).await {
            debug!("wifi ssid {ssid:?} via {strategy:?}");
            return SourceResult::Present(NetworkReading {
                kind: NetworkKind::Wifi,
                name: Some(ssid),
            });
        }
    }

    if let Some(operstate) = first_wired_operstate(net_root) {
        return SourceResult::Present(NetworkReading {
            kind: NetworkKind::Wired,
            name: Some(operstate),
        });
    }

    SourceResult::Present(NetworkReading::offline())
}

fn parse_nmcli_active(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let ssid = line.strip_prefix("yes:")?.trim();
        (!ssid.is_empty()).then(|| ssid.to_string())
    })
}

fn parse_iw_dev(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let ssid = line.trim().strip_prefix("ssid ")?.trim();
        (!ssid.is_empty()).then(|| ssid.to_string())
    })
}

/// Operstate of the first Ethernet-class interface, in name order.
/// Loopback and wireless names are skipped.
fn first_wired_operstate(net_root: &Path) -> Option<String> {
    let mut names: Vec<String> = fs::read_dir(net_root)
        .ok()?
        .filter_map(|entry| Some(entry.ok()?.file_name().to_string_lossy().into_owned()))
        .filter(|name| name != "lo" && (name.starts_with("en") || name.starts_with("eth")))
        .collect();
    names.sort();

    let name = names.first()?;
    let operstate = fs::read_to_string(net_root.join(name).join("operstate"))
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    Some(operstate)
}
