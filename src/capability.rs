//! Decides whether glyph icons may be used this cycle.
//!
//! Recomputed every cycle; the font list cannot realistically change
//! mid-session, but recomputing is cheap and avoids any staleness.

use crate::config::Config;
use crate::icons::GLYPH_FONT_FAMILY;
use crate::probe::{CommandRunner, PROBE_TIMEOUT, warn_once};

/// True iff icon glyphs may be rendered.
///
/// Override order: an explicit disable wins, then "assume icons" skips
/// font detection entirely. A missing or failing font-listing tool fails
/// closed to text mode.
pub async fn detect(config: &Config, runner: &dyn CommandRunner) -> bool {
    if !config.icons_enabled {
        return false;
    }
    if config.assume_icons {
        return true;
    }

    match runner
        .run("fc-list", &[GLYPH_FONT_FAMILY, "family"], PROBE_TIMEOUT)
        .await
    {
        Ok(out) => !out.stdout.trim().is_empty(),
        Err(e) => {
            warn_once("fc-list", format!("font detection unavailable, using text mode: {e}"));
            false
        }
    }
}
