//! gloombot-core/src/state.rs
//!
//! Shared mutable rig state: the authoritative per-channel positions
//! and the two activity timestamps the schedulers read. Each field is
//! locked independently; races between fields are tolerated by design
//! (best-effort animatronic, last writer wins).

use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::channel::{Channel, CHANNEL_COUNT, POSITION_CENTER};

pub struct RigState {
    /// Last position a completed ramp settled each channel at. Ramps
    /// read this as their starting point and write it once on finish.
    positions: Mutex<[u16; CHANNEL_COUNT]>,
    /// When the last explicit command (or center-return fire) happened.
    last_command: Mutex<Instant>,
    /// When the last sound cue played. `None` = never, so the first
    /// idle cycle is immediately eligible.
    last_sound: Mutex<Option<Instant>>,
}

impl RigState {
    pub fn new() -> Self {
        Self {
            positions: Mutex::new([POSITION_CENTER; CHANNEL_COUNT]),
            last_command: Mutex::new(Instant::now()),
            last_sound: Mutex::new(None),
        }
    }

    pub async fn position(&self, channel: Channel) -> u16 {
        self.positions.lock().await[channel.index()]
    }

    pub async fn set_position(&self, channel: Channel, position: u16) {
        self.positions.lock().await[channel.index()] = position;
    }

    pub async fn positions(&self) -> [u16; CHANNEL_COUNT] {
        *self.positions.lock().await
    }

    /// Record that an explicit command just ran, resetting the idle clock.
    pub async fn touch_command(&self) {
        *self.last_command.lock().await = Instant::now();
    }

    pub async fn since_command(&self) -> Duration {
        self.last_command.lock().await.elapsed()
    }

    /// Whether enough time has passed since the last cue to play another.
    pub async fn sound_due(&self, interval: Duration) -> bool {
        match *self.last_sound.lock().await {
            Some(at) => at.elapsed() > interval,
            None => true,
        }
    }

    pub async fn touch_sound(&self) {
        *self.last_sound.lock().await = Some(Instant::now());
    }
}

impl Default for RigState {
    fn default() -> Self {
        Self::new()
    }
}
