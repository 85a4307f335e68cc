//! gloombot-core/src/actuator.rs
//!
//! The seam between the control logic and the physical output stage.
//! Real deployments implement `Actuator` over their transport (PCA9685
//! duty cycles, serial servo controller frames, ...); the core only
//! ever hands it a channel and an already-clamped position.

use async_trait::async_trait;

use crate::channel::Channel;
use crate::Result;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Actuator: Send + Sync {
    /// Apply one position to one channel. Assumed fast; the ramp engine
    /// provides all pacing.
    async fn set_channel_position(&self, channel: Channel, position: u16) -> Result<()>;
}

/// Actuator that only logs. Useful for running the rig logic without
/// hardware attached.
pub struct LogActuator;

#[async_trait]
impl Actuator for LogActuator {
    async fn set_channel_position(&self, channel: Channel, position: u16) -> Result<()> {
        tracing::trace!("actuator: {channel} => {position}");
        Ok(())
    }
}
