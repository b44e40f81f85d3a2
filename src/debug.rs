/*
 * Debug Information Module
 *
 * This module defines the DebugInfo struct the game loop fills in every
 * frame, for an overlay or the log.
 *
 * Includes metrics for:
 * - Fixed ticks run in the last frame and in total
 * - Frames dropped by the stale-frame guard
 * - Interpolation alpha handed to the renderer
 * - Simulated game time
 */

use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DebugInfo {
    pub ticks_last_frame: u32,
    pub total_ticks: u64,
    pub discarded_frames: u64,
    pub interpolation_alpha: f32,
    // Simulated milliseconds
    pub game_time: f64,
}

impl fmt::Display for DebugInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ticks {} ({} total), dropped frames {}, alpha {:.2}, game time {:.0}ms",
            self.ticks_last_frame,
            self.total_ticks,
            self.discarded_frames,
            self.interpolation_alpha,
            self.game_time
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_lists_every_metric() {
        let info = DebugInfo {
            ticks_last_frame: 2,
            total_ticks: 40,
            discarded_frames: 1,
            interpolation_alpha: 0.25,
            game_time: 666.6,
        };
        assert_eq!(
            info.to_string(),
            "ticks 2 (40 total), dropped frames 1, alpha 0.25, game time 667ms"
        );
    }
}
