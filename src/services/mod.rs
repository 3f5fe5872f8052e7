//! Source pollers.
//!
//! Each poller produces a [`crate::status::SourceResult`] and never
//! fails outward; tool errors are recovered locally into `Unavailable`.
//!
//! - `battery` - power supply class (sysfs)
//! - `network` - nmcli/iwgetid/iw fallback chain plus wired sysfs scan
//! - `cloudsync` - Nextcloud client state via status command or bus probe
//! - `volume` - default sink via the mixer CLI

pub mod battery;
pub mod cloudsync;
pub mod network;
pub mod volume;
