//! Data model for one polling cycle.
//!
//! Every reading is built fresh each cycle and dropped after rendering;
//! nothing here is retained across cycles.

/// Outcome of polling one source.
///
/// `Absent` means the source does not apply to this machine (no battery,
/// no sync client installed). `Unavailable` means it applies but the
/// backing tool is missing, failed, or timed out this cycle. The renderer
/// omits both; the distinction matters for logging and tests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceResult<T> {
    Absent,
    Unavailable,
    Present(T),
}

impl<T> SourceResult<T> {
    pub fn present(&self) -> Option<&T> {
        match self {
            SourceResult::Present(value) => Some(value),
            _ => None,
        }
    }
}

/// Battery snapshot from the power supply class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatteryReading {
    /// Charge percent, clamped to 0..=100.
    pub percent: u8,
    pub charging: bool,
    /// AC adapter online, or inferred from charging when no adapter
    /// device exists.
    pub ac_online: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NetworkKind {
    Wifi,
    Wired,
    Offline,
}

/// Current network connection.
///
/// `name` is the SSID for Wi-Fi. For wired links it carries the interface
/// operational state (`up`/`down`/`unknown`) so the renderer can show it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkReading {
    pub kind: NetworkKind,
    pub name: Option<String>,
}

impl NetworkReading {
    pub fn offline() -> Self {
        Self {
            kind: NetworkKind::Offline,
            name: None,
        }
    }
}

/// Cloud-sync client state, ordered by display precedence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SyncState {
    Offline,
    Syncing,
    Online,
    /// Process confirmed alive but state unknown. Deliberately
    /// non-alarming.
    Running,
    #[default]
    Unknown,
}

impl SyncState {
    pub fn label(self) -> &'static str {
        match self {
            SyncState::Offline => "offline",
            SyncState::Syncing => "syncing",
            SyncState::Online => "online",
            SyncState::Running => "running",
            SyncState::Unknown => "unknown",
        }
    }
}

/// Default output sink volume.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VolumeReading {
    pub percent: u8,
    pub muted: bool,
}

/// All source results for one cycle, finalized before rendering.
#[derive(Clone, Debug)]
pub struct Readings {
    pub volume: SourceResult<VolumeReading>,
    pub battery: SourceResult<BatteryReading>,
    pub network: SourceResult<NetworkReading>,
    pub sync: SourceResult<SyncState>,
}
