//! gloombot-core/src/dispatch.rs
//!
//! Explicit motion commands: reverse-map and clamp a requested target,
//! hand it to the ramp engine, and keep the return-to-center timer
//! armed behind the most recent command.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::channel::{clamp_position, invert_position, Channel, POSITION_CENTER};
use crate::config::RigConfig;
use crate::ramp::RampEngine;
use crate::state::RigState;
use crate::Result;

/// One inbound six-channel motion command. Absent channels resolve to
/// neutral center. Doubles as the `/move` query-string shape: fields
/// are wide signed ints so any numeric value parses and clamps later,
/// matching the "never reject, clamp" contract. Only non-numeric text
/// fails at parse time.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MoveCommand {
    pub pan: Option<i64>,
    pub tilt: Option<i64>,
    pub left_pan: Option<i64>,
    pub left_tilt: Option<i64>,
    pub right_pan: Option<i64>,
    pub right_tilt: Option<i64>,
}

impl MoveCommand {
    pub fn centered() -> Self {
        Self::default()
    }

    pub fn target_for(&self, channel: Channel) -> i64 {
        let requested = match channel {
            Channel::HeadPan => self.pan,
            Channel::HeadTilt => self.tilt,
            Channel::LeftArmPan => self.left_pan,
            Channel::LeftArmTilt => self.left_tilt,
            Channel::RightArmPan => self.right_pan,
            Channel::RightArmTilt => self.right_tilt,
        };
        requested.unwrap_or(i64::from(POSITION_CENTER))
    }
}

pub struct Dispatcher {
    engine: Arc<RampEngine>,
    state: Arc<RigState>,
    config: Arc<RigConfig>,
    /// The one outstanding return-to-center task, if any. Arming a new
    /// one aborts the previous so rapid commands never stack centering
    /// moves.
    pending_center: Mutex<Option<JoinHandle<()>>>,
}

impl Dispatcher {
    pub fn new(engine: Arc<RampEngine>, state: Arc<RigState>, config: Arc<RigConfig>) -> Self {
        Self {
            engine,
            state,
            config,
            pending_center: Mutex::new(None),
        }
    }

    pub fn state(&self) -> &Arc<RigState> {
        &self.state
    }

    pub fn config(&self) -> &Arc<RigConfig> {
        &self.config
    }

    /// Move one channel to a requested position: mirror it if the
    /// channel is reversed, clamp into range, then ramp. Out-of-range
    /// requests are clamped silently, never rejected.
    pub async fn move_channel(
        &self,
        channel: Channel,
        requested: impl Into<i64>,
        duration: Duration,
    ) -> Result<()> {
        let mut position = requested.into();
        if self.config.is_reversed(channel.index()) {
            position = invert_position(position);
        }
        let target = clamp_position(position);
        self.engine
            .ramp(channel, target, duration, self.config.ramp_steps)
            .await
    }

    /// Execute a full six-channel command: ramp every channel toward
    /// its target concurrently, reset the idle clock, and arm a fresh
    /// return-to-center timer. Returns once every ramp has settled.
    pub async fn dispatch(self: &Arc<Self>, cmd: MoveCommand) {
        info!(
            "Received move command: head_pan={}, head_tilt={}, left_pan={}, left_tilt={}, right_pan={}, right_tilt={}",
            cmd.target_for(Channel::HeadPan),
            cmd.target_for(Channel::HeadTilt),
            cmd.target_for(Channel::LeftArmPan),
            cmd.target_for(Channel::LeftArmTilt),
            cmd.target_for(Channel::RightArmPan),
            cmd.target_for(Channel::RightArmTilt),
        );

        let duration = self.config.move_duration;
        let ramps: Vec<JoinHandle<()>> = Channel::ALL
            .iter()
            .map(|&channel| {
                let me = self.clone();
                let requested = cmd.target_for(channel);
                tokio::spawn(async move {
                    if let Err(e) = me.move_channel(channel, requested, duration).await {
                        warn!("move failed on {channel}: {e}");
                    }
                })
            })
            .collect();

        self.state.touch_command().await;
        self.arm_return_to_center().await;

        for res in join_all(ramps).await {
            if let Err(e) = res {
                warn!("ramp task panicked: {e}");
            }
        }
    }

    /// Arm the one-shot centering timer, superseding any timer armed by
    /// an earlier command.
    async fn arm_return_to_center(self: &Arc<Self>) {
        let me = self.clone();
        let handle = tokio::spawn(async move {
            sleep(me.config.return_to_center_delay).await;
            info!("Returning to center after delay");
            me.return_to_center().await;
        });

        let mut pending = self.pending_center.lock().await;
        if let Some(prev) = pending.replace(handle) {
            prev.abort();
            debug!("superseded pending return-to-center");
        }
    }

    /// Gently ramp every channel back to neutral center. Resets the
    /// idle clock so the centering move itself does not read as idle
    /// time, but does not re-arm the timer.
    pub async fn return_to_center(self: &Arc<Self>) {
        let duration = self.config.center_duration;
        let ramps: Vec<JoinHandle<()>> = Channel::ALL
            .iter()
            .map(|&channel| {
                let me = self.clone();
                tokio::spawn(async move {
                    if let Err(e) = me.move_channel(channel, POSITION_CENTER, duration).await {
                        warn!("centering failed on {channel}: {e}");
                    }
                })
            })
            .collect();
        for res in join_all(ramps).await {
            if let Err(e) = res {
                warn!("centering task panicked: {e}");
            }
        }
        self.state.touch_command().await;
    }
}
