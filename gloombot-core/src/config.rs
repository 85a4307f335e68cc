//! gloombot-core/src/config.rs
//!
//! Startup-fixed tuning for the rig. Nothing in here is mutated at
//! runtime; the whole struct is built once and shared by reference.

use std::collections::HashSet;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::channel::CHANNEL_COUNT;

/// How the depressed shake interacts with idle progression while its
/// sound cue is still playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShakePolicy {
    /// Run the shake to completion before awaiting playback end. The
    /// idle loop makes no progress until both are done.
    Block,
    /// Spawn the shake alongside playback and only await playback end.
    Concurrent,
}

impl FromStr for ShakePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "block" => Ok(ShakePolicy::Block),
            "concurrent" => Ok(ShakePolicy::Concurrent),
            other => Err(format!("unknown shake policy '{other}' (use block|concurrent)")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RigConfig {
    /// Delay before an explicit command is followed by a centering move.
    pub return_to_center_delay: Duration,
    /// How long after the last command the rig counts as idle.
    pub idle_timeout: Duration,
    /// Bounds for the random sleep between idle loop iterations.
    pub idle_interval_min: Duration,
    pub idle_interval_max: Duration,
    /// Minimum spacing between two sound cues.
    pub sound_interval: Duration,

    /// Ramp duration for an interactive move.
    pub move_duration: Duration,
    /// Ramp duration for the return-to-center move (gentler).
    pub center_duration: Duration,
    /// Ramp duration for idle gestures (slow, mopey pacing).
    pub idle_duration: Duration,
    /// Ramp duration for each step of the depressed shake.
    pub shake_duration: Duration,
    /// Intermediate actuator writes per ramp.
    pub ramp_steps: usize,

    /// Channels whose requested positions are mirrored before clamping.
    pub reverse_channels: [bool; CHANNEL_COUNT],

    /// Sound assets that trigger the depressed shake on playback.
    pub depressed_quotes: HashSet<String>,
    pub shake_policy: ShakePolicy,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            return_to_center_delay: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(5),
            idle_interval_min: Duration::from_secs(3),
            idle_interval_max: Duration::from_secs(8),
            sound_interval: Duration::from_secs(60),
            move_duration: Duration::from_millis(2000),
            center_duration: Duration::from_millis(3000),
            idle_duration: Duration::from_millis(3000),
            shake_duration: Duration::from_millis(2000),
            ramp_steps: 500,
            reverse_channels: [true; CHANNEL_COUNT],
            depressed_quotes: [
                "life.wav",
                "ohno.wav",
                "depressed.wav",
                "wretched.wav",
                "endintears.wav",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            shake_policy: ShakePolicy::Block,
        }
    }
}

impl RigConfig {
    pub fn is_reversed(&self, idx: usize) -> bool {
        self.reverse_channels.get(idx).copied().unwrap_or(false)
    }

    pub fn is_depressed_quote(&self, name: &str) -> bool {
        self.depressed_quotes.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_rig_tuning() {
        let cfg = RigConfig::default();
        assert_eq!(cfg.return_to_center_delay, Duration::from_secs(5));
        assert_eq!(cfg.idle_timeout, Duration::from_secs(5));
        assert_eq!(cfg.sound_interval, Duration::from_secs(60));
        assert_eq!(cfg.ramp_steps, 500);
        assert!(cfg.reverse_channels.iter().all(|r| *r));
        assert!(cfg.is_depressed_quote("depressed.wav"));
        assert!(!cfg.is_depressed_quote("cheerful.wav"));
        assert_eq!(cfg.shake_policy, ShakePolicy::Block);
    }

    #[test]
    fn config_round_trips_through_json() {
        let cfg = RigConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: RigConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.ramp_steps, cfg.ramp_steps);
        assert_eq!(back.reverse_channels, cfg.reverse_channels);
        assert_eq!(back.depressed_quotes, cfg.depressed_quotes);
        assert_eq!(back.shake_policy, cfg.shake_policy);
    }

    #[test]
    fn shake_policy_parses() {
        assert_eq!("block".parse::<ShakePolicy>().unwrap(), ShakePolicy::Block);
        assert_eq!(
            "Concurrent".parse::<ShakePolicy>().unwrap(),
            ShakePolicy::Concurrent
        );
        assert!("sometimes".parse::<ShakePolicy>().is_err());
    }
}
