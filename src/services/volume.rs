//! Audio poller.
//!
//! Queries the default output sink through the mixer CLI and parses the
//! fractional volume plus the optional mute marker from the same line.
//! Works against wpctl's `Volume: 0.72 [MUTED]` shape; the older
//! `Mute: true` marker is accepted too.

use crate::probe::{CommandRunner, PROBE_TIMEOUT, warn_once};
use crate::status::{SourceResult, VolumeReading};

pub async fn poll(runner: &dyn CommandRunner) -> SourceResult<VolumeReading> {
    let out = match runner
        .run("wpctl", &["get-volume", "@DEFAULT_AUDIO_SINK@"], PROBE_TIMEOUT)
        .await
    {
        Ok(out) => out,
        Err(e) => {
            warn_once("wpctl", format!("volume source unavailable: {e}"));
            return SourceResult::Unavailable;
        }
    };

    match parse_volume_line(&out.stdout) {
        Some(reading) => SourceResult::Present(reading),
        None => {
            warn_once(
                "wpctl-parse",
                format!("unparsable volume output: {:?}", out.stdout.trim()),
            );
            SourceResult::Unavailable
        }
    }
}

/// Parse a mixer status line into percent (round half up, capped at 100)
/// and mute flag.
pub fn parse_volume_line(line: &str) -> Option<VolumeReading> {
    let fraction: f64 = line
        .split_whitespace()
        .find_map(|token| token.parse::<f64>().ok())?;
    if !(0.0..=10.0).contains(&fraction) {
        return None;
    }

    let muted = line.contains("MUTE") || line.contains("Mute: true");
    let percent = (fraction * 100.0).round() as u8;

    Some(VolumeReading {
        percent: percent.min(100),
        muted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::testing::{Scripted, ScriptedRunner};

    #[test]
    fn parses_fraction_to_percent() {
        assert_eq!(
            parse_volume_line("Volume: 0.72"),
            Some(VolumeReading {
                percent: 72,
                muted: false,
            })
        );
    }

    #[test]
    fn parses_mute_marker() {
        assert_eq!(
            parse_volume_line("Volume: 0.45 [MUTED]"),
            Some(VolumeReading {
                percent: 45,
                muted: true,
            })
        );
        assert_eq!(
            parse_volume_line("Volume: 0.45 Mute: true"),
            Some(VolumeReading {
                percent: 45,
                muted: true,
            })
        );
    }

    #[test]
    fn rounds_half_up() {
        assert_eq!(parse_volume_line("Volume: 0.675").unwrap().percent, 68);
        assert_eq!(parse_volume_line("Volume: 0.674").unwrap().percent, 67);
    }

    #[test]
    fn caps_amplified_volume_at_hundred() {
        assert_eq!(parse_volume_line("Volume: 1.50").unwrap().percent, 100);
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_volume_line("no volume here"), None);
        assert_eq!(parse_volume_line(""), None);
    }

    #[tokio::test]
    async fn missing_tool_is_unavailable() {
        let runner = ScriptedRunner::new().respond("wpctl", Scripted::Missing);
        assert_eq!(poll(&runner).await, SourceResult::Unavailable);
    }

    #[tokio::test]
    async fn tool_output_is_parsed() {
        let runner = ScriptedRunner::new().respond("wpctl", Scripted::Ok("Volume: 0.30\n"));
        assert_eq!(
            poll(&runner).await,
            SourceResult::Present(VolumeReading {
                percent: 30,
                muted: false,
            })
        );
    }
}
