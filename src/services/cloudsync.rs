//! Cloud-sync poller for the Nextcloud desktop client.
//!
//! Ladder: client not installed → absent; installed but not running →
//! offline; else classify from the client's own status output, then from
//! a session-bus property probe, then fall back to a bare "running".
//!
//! Different client builds expose different status properties, so the
//! bus probe takes the union of every signal it can read and resolves
//! ties with a fixed precedence: Syncing > Online > Running.

use crate::probe::{CommandRunner, PROBE_TIMEOUT, has_command, warn_once};
use crate::status::{SourceResult, SyncState};
use async_trait::async_trait;
use log::debug;
use zbus::Connection;
use zbus::zvariant::{OwnedValue, Value};

pub const CLIENT_BIN: &str = "nextcloud";

/// Property names probed on each of the client's bus objects.
const CANDIDATE_PROPS: [&str; 3] = ["Status", "State", "SyncState"];

const SYNCING_MARKERS: [&str; 5] = ["SYNC", "BUSY", "RUN", "WORK", "PROGRESS"];
const ONLINE_MARKERS: [&str; 6] = ["OK", "IDLE", "READY", "TRUE", "ONLINE", "CONNECTED"];
const STATUS_SYNC_WORDS: [&str; 5] = ["sync", "busy", "indexing", "scanning", "transferring"];
const STATUS_OFFLINE_WORDS: [&str; 2] = ["disconnected", "offline"];

/// Session-bus access, seamed so the ladder is testable without a bus.
#[async_trait]
pub trait SyncBus: Send + Sync {
    /// Every status-like property value readable from the client's bus
    /// objects, or None when the bus or client objects are unreachable.
    async fn signals(&self) -> Option<Vec<String>>;
}

pub async fn poll(
    runner: &dyn CommandRunner,
    bus: &dyn SyncBus,
    ping_target: &str,
) -> SourceResult<SyncState> {
    if !has_command(runner, CLIENT_BIN).await {
        return SourceResult::Absent;
    }

    if !process_running(runner).await {
        return SourceResult::Present(SyncState::Offline);
    }

    if let Some(text) = status_command_output(runner).await {
        let reachable = if mentions_offline(&text) {
            ping(runner, ping_target).await
        } else {
            true
        };
        return SourceResult::Present(classify_status_text(&text, reachable));
    }

    if let Some(signals) = bus.signals().await {
        if !signals.is_empty() {
            debug!("sync bus signals: {signals:?}");
            return SourceResult::Present(classify_signals(&signals));
        }
    }

    // Process confirmed alive, state unknowable. Non-alarming default.
    SourceResult::Present(SyncState::Running)
}

/// Classify the client's direct status output.
///
/// "disconnected"/"offline" maps to Online when the network is reachable:
/// those strings routinely lie during normal operation, and a false
/// "offline" is worse than a hidden one.
pub fn classify_status_text(text: &str, reachable: bool) -> SyncState {
    let lower = text.to_lowercase();
    if STATUS_SYNC_WORDS.iter().any(|word| lower.contains(word)) {
        return SyncState::Syncing;
    }
    if STATUS_OFFLINE_WORDS.iter().any(|word| lower.contains(word)) {
        return if reachable {
            SyncState::Online
        } else {
            SyncState::Offline
        };
    }
    SyncState::Online
}

/// Classify the union of probed bus signals. Sync-state wins ties over
/// online-state; anything unrecognized degrades to Running.
pub fn classify_signals(signals: &[String]) -> SyncState {
    let upper: Vec<String> = signals.iter().map(|s| s.to_uppercase()).collect();
    if upper
        .iter()
        .any(|s| SYNCING_MARKERS.iter().any(|m| s.contains(m)))
    {
        return SyncState::Syncing;
    }
    if upper
        .iter()
        .any(|s| ONLINE_MARKERS.iter().any(|m| s.contains(m)))
    {
        return SyncState::Online;
    }
    SyncState::Running
}

fn mentions_offline(text: &str) -> bool {
    let lower = text.to_lowercase();
    STATUS_OFFLINE_WORDS.iter().any(|word| lower.contains(word))
}

async fn process_running(runner: &dyn CommandRunner) -> bool {
    use crate::probe::ProbeError;
    match runner.run("pgrep", &["-x", CLIENT_BIN], PROBE_TIMEOUT).await {
        Ok(_) => true,
        // Exit 1 is pgrep's definitive "no such process".
        Err(ProbeError::Failed { status: 1, .. }) => false,
        Err(e) => {
            warn_once("pgrep", format!("cannot check sync client process: {e}"));
            true
        }
    }
}

async fn status_command_output(runner: &dyn CommandRunner) -> Option<String> {
    let out = runner
        .run(CLIENT_BIN, &["--status"], PROBE_TIMEOUT)
        .await
        .ok()?;
    let text = out.stdout.trim().to_string();
    (!text.is_empty()).then_some(text)
}

async fn ping(runner: &dyn CommandRunner, target: &str) -> bool {
    runner
        .run("ping", &["-c", "1", "-W", "1", target], PROBE_TIMEOUT)
        .await
        .is_ok()
}

// === Session-bus probe ===

/// Probes the real session bus for any name owned by the client.
pub struct SessionBus;

#[async_trait]
impl SyncBus for SessionBus {
    async fn signals(&self) -> Option<Vec<String>> {
        tokio::time::timeout(PROBE_TIMEOUT, collect_signals())
            .await
            .ok()
            .flatten()
    }
}

async fn collect_signals() -> Option<Vec<String>> {
    let conn = Connection::session().await.ok()?;
    let dbus = zbus::fdo::DBusProxy::new(&conn).await.ok()?;
    let names = dbus.list_names().await.ok()?;

    let mut signals = Vec::new();
    for name in names {
        let name = name.as_str().to_string();
        if !name.to_lowercase().contains(CLIENT_BIN) {
            continue;
        }
        for path in object_paths(&conn, &name).await {
            for prop in CANDIDATE_PROPS {
                if let Some(value) = get_property(&conn, &name, &path, prop).await {
                    signals.push(value);
                }
            }
        }
    }
    Some(signals)
}

/// Object enumeration via introspection, bounded in depth and total
/// object count.
async fn object_paths(conn: &Connection, destination: &str) -> Vec<String> {
    const MAX_DEPTH: usize = 2;
    const MAX_PATHS: usize = 16;

    let mut paths = vec!["/".to_string()];
    let mut queue = vec![("/".to_string(), 0usize)];

    while let Some((path, depth)) = queue.pop() {
        if depth >= MAX_DEPTH || paths.len() >= MAX_PATHS {
            break;
        }
        let Some(xml) = introspect(conn, destination, &path).await else {
            continue;
        };
        for child in child_nodes(&xml) {
            let child_path = if path == "/" {
                format!("/{child}")
            } else {
                format!("{path}/{child}")
            };
            paths.push(child_path.clone());
            queue.push((child_path, depth + 1));
        }
    }
    paths
}

async fn introspect(conn: &Connection, destination: &str, path: &str) -> Option<String> {
    let proxy = zbus::fdo::IntrospectableProxy::builder(conn)
        .destination(destination.to_string())
        .ok()?
        .path(path.to_string())
        .ok()?
        .build()
        .await
        .ok()?;
    proxy.introspect().await.ok()
}

async fn get_property(
    conn: &Connection,
    destination: &str,
    path: &str,
    property: &str,
) -> Option<String> {
    let proxy = zbus::Proxy::new(
        conn,
        destination.to_string(),
        path.to_string(),
        "org.freedesktop.DBus.Properties",
    )
    .await
    .ok()?;
    // Empty interface: let the service search all interfaces for the name.
    let value: OwnedValue = proxy.call("Get", &("", property)).await.ok()?;
    Some(signal_from_value(&value))
}

fn signal_from_value(value: &Value<'_>) -> String {
    match value {
        Value::Str(s) => s.to_string(),
        Value::Bool(b) => b.to_string(),
        other => format!("{other:?}"),
    }
}

/// Extract child node names from introspection XML.
fn child_nodes(xml: &str) -> Vec<String> {
    xml.split("<node name=\"")
        .skip(1)
        .filter_map(|part| {
            let name = part.split('"').next()?;
            (!name.is_empty() && !name.contains('/')).then(|| name.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::testing::{Scripted, ScriptedRunner};

    struct NoBus;

    #[async_trait]
    impl SyncBus for NoBus {
        async fn signals(&self) -> Option<Vec<String>> {
            None
        }
    }

    struct StubBus(Vec<&'static str>);

    #[async_trait]
    impl SyncBus for StubBus {
        async fn signals(&self) -> Option<Vec<String>> {
            Some(self.0.iter().map(|s| s.to_string()).collect())
        }
    }

    #[test]
    fn syncing_beats_online_in_signal_precedence() {
        let signals = vec!["Busy".to_string(), "Idle".to_string()];
        assert_eq!(classify_signals(&signals), SyncState::Syncing);
    }

    #[test]
    fn online_signals_without_sync_markers() {
        let signals = vec!["connected".to_string(), "true".to_string()];
        assert_eq!(classify_signals(&signals), SyncState::Online);
    }

    #[test]
    fn unrecognized_signals_degrade_to_running() {
        let signals = vec!["ERR_NO_ACCOUNT".to_string()];
        assert_eq!(classify_signals(&signals), SyncState::Running);
    }

    #[test]
    fn status_text_sync_words_win() {
        assert_eq!(
            classify_status_text("Checking for changes, syncing folder", true),
            SyncState::Syncing
        );
        assert_eq!(classify_status_text("Indexing files", true), SyncState::Syncing);
    }

    #[test]
    fn status_text_offline_gated_on_reachability() {
        assert_eq!(classify_status_text("Disconnected", true), SyncState::Online);
        assert_eq!(classify_status_text("Disconnected", false), SyncState::Offline);
    }

    #[test]
    fn unremarkable_status_text_is_online() {
        assert_eq!(classify_status_text("Up to date", true), SyncState::Online);
    }

    #[test]
    fn child_node_extraction() {
        let xml = r#"<node><node name="Accounts"/><node name="Folders"/></node>"#;
        assert_eq!(child_nodes(xml), vec!["Accounts", "Folders"]);
        assert!(child_nodes("<node/>").is_empty());
    }

    #[tokio::test]
    async fn missing_client_binary_is_absent() {
        let runner = ScriptedRunner::new().respond("sh", Scripted::Ok("\n"));
        assert_eq!(poll(&runner, &NoBus, "1.1.1.1").await, SourceResult::Absent);
    }

    #[tokio::test]
    async fn stopped_process_is_offline() {
        let runner = ScriptedRunner::new()
            .respond("sh", Scripted::Ok("/usr/bin/nextcloud\n"))
            .respond("pgrep", Scripted::Failed(1));
        assert_eq!(
            poll(&runner, &NoBus, "1.1.1.1").await,
            SourceResult::Present(SyncState::Offline)
        );
    }

    #[tokio::test]
    async fn status_command_classifies_syncing() {
        let runner = ScriptedRunner::new()
            .respond("sh", Scripted::Ok("/usr/bin/nextcloud\n"))
            .respond("pgrep", Scripted::Ok("4242\n"))
            .respond("nextcloud", Scripted::Ok("Syncing 3 files\n"));
        assert_eq!(
            poll(&runner, &NoBus, "1.1.1.1").await,
            SourceResult::Present(SyncState::Syncing)
        );
        // No ping needed when the text never mentioned offline.
        assert!(!runner.calls().contains(&"ping".to_string()));
    }

    #[tokio::test]
    async fn offline_status_with_unreachable_network_stays_offline() {
        let runner = ScriptedRunner::new()
            .respond("sh", Scripted::Ok("/usr/bin/nextcloud\n"))
            .respond("pgrep", Scripted::Ok("4242\n"))
            .respond("nextcloud", Scripted::Ok("Disconnected from server\n"))
            .respond("ping", Scripted::Failed(1));
        assert_eq!(
            poll(&runner, &NoBus, "1.1.1.1").await,
            SourceResult::Present(SyncState::Offline)
        );
    }

    #[tokio::test]
    async fn bus_signals_used_when_status_command_fails() {
        let runner = ScriptedRunner::new()
            .respond("sh", Scripted::Ok("/usr/bin/nextcloud\n"))
            .respond("pgrep", Scripted::Ok("4242\n"))
            .respond("nextcloud", Scripted::Failed(2));
        assert_eq!(
            poll(&runner, &StubBus(vec!["Busy", "Idle"]), "1.1.1.1").await,
            SourceResult::Present(SyncState::Syncing)
        );
    }

    #[tokio::test]
    async fn alive_process_with_no_introspection_is_running() {
        let runner = ScriptedRunner::new()
            .respond("sh", Scripted::Ok("/usr/bin/nextcloud\n"))
            .respond("pgrep", Scripted::Ok("4242\n"))
            .respond("nextcloud", Scripted::Missing);
        assert_eq!(
            poll(&runner, &NoBus, "1.1.1.1").await,
            SourceResult::Present(SyncState::Running)
        );
    }
}
