//! gloombot-core/src/ramp.rs
//!
//! Smoothed position ramping. A ramp walks a channel from its last
//! settled position to a target in small fixed steps, sleeping between
//! actuator writes, then forces an exact final write so integer
//! truncation never leaves the channel short of its target.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;

use crate::actuator::Actuator;
use crate::channel::{clamp_position, Channel};
use crate::state::RigState;
use crate::Result;

pub struct RampEngine {
    actuator: Arc<dyn Actuator>,
    state: Arc<RigState>,
}

impl RampEngine {
    pub fn new(actuator: Arc<dyn Actuator>, state: Arc<RigState>) -> Self {
        Self { actuator, state }
    }

    /// Ramp `channel` from its current settled position to `target`
    /// over `duration`, issuing `steps` intermediate writes. Blocks the
    /// caller for the whole duration; run concurrent ramps on separate
    /// tasks. The target and every intermediate value are clamped into
    /// range before they reach the wire.
    pub async fn ramp(
        &self,
        channel: Channel,
        target: u16,
        duration: Duration,
        steps: usize,
    ) -> Result<()> {
        let target = clamp_position(i64::from(target));
        let start = self.state.position(channel).await;
        if start == target {
            return Ok(());
        }

        let steps = steps.max(1);
        let delta = (f64::from(target) - f64::from(start)) / steps as f64;
        let step_delay = duration / steps as u32;

        let mut current = f64::from(start);
        for _ in 0..steps {
            current += delta;
            // Truncate like the per-step integer math the hardware sees.
            self.actuator
                .set_channel_position(channel, clamp_position(current as i64))
                .await?;
            sleep(step_delay).await;
        }

        // Exact final write, then the single authoritative state update.
        self.actuator.set_channel_position(channel, target).await?;
        self.state.set_position(channel, target).await;

        tracing::debug!("ramp complete: {channel} {start} -> {target}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::POSITION_CENTER;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every write it receives, in order.
    #[derive(Default)]
    struct RecordingActuator {
        writes: Mutex<Vec<(Channel, u16)>>,
    }

    impl RecordingActuator {
        fn writes(&self) -> Vec<(Channel, u16)> {
            self.writes.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Actuator for RecordingActuator {
        async fn set_channel_position(&self, channel: Channel, position: u16) -> Result<()> {
            self.writes.lock().unwrap().push((channel, position));
            Ok(())
        }
    }

    fn engine() -> (RampEngine, Arc<RecordingActuator>, Arc<RigState>) {
        let actuator = Arc::new(RecordingActuator::default());
        let state = Arc::new(RigState::new());
        let engine = RampEngine::new(actuator.clone(), state.clone());
        (engine, actuator, state)
    }

    #[tokio::test]
    async fn ramp_is_monotonic_and_lands_exactly() {
        let (engine, actuator, state) = engine();

        engine
            .ramp(Channel::HeadPan, 1700, Duration::from_millis(20), 10)
            .await
            .unwrap();

        let writes = actuator.writes();
        // 10 intermediate writes plus the forced final one.
        assert_eq!(writes.len(), 11);
        let values: Vec<u16> = writes.iter().map(|(_, p)| *p).collect();
        for pair in values.windows(2) {
            assert!(pair[0] <= pair[1], "ramp went backwards: {values:?}");
        }
        for v in &values {
            assert!(*v >= POSITION_CENTER && *v <= 1700, "out of ramp interval: {v}");
        }
        assert_eq!(*values.last().unwrap(), 1700);
        assert_eq!(state.position(Channel::HeadPan).await, 1700);
    }

    #[tokio::test]
    async fn downward_ramp_is_monotonic() {
        let (engine, actuator, state) = engine();
        state.set_position(Channel::HeadTilt, 1900).await;

        engine
            .ramp(Channel::HeadTilt, 1200, Duration::from_millis(20), 10)
            .await
            .unwrap();

        let values: Vec<u16> = actuator.writes().iter().map(|(_, p)| *p).collect();
        for pair in values.windows(2) {
            assert!(pair[0] >= pair[1], "ramp went backwards: {values:?}");
        }
        assert_eq!(*values.last().unwrap(), 1200);
        assert_eq!(state.position(Channel::HeadTilt).await, 1200);
    }

    #[tokio::test]
    async fn truncation_drift_is_corrected_by_final_write() {
        let (engine, actuator, state) = engine();
        // 7 steps into a 100-unit span truncates on every intermediate.
        engine
            .ramp(Channel::LeftArmPan, 1600, Duration::from_millis(14), 7)
            .await
            .unwrap();

        assert_eq!(actuator.writes().last().unwrap().1, 1600);
        assert_eq!(state.position(Channel::LeftArmPan).await, 1600);
    }

    #[tokio::test]
    async fn out_of_range_target_is_clamped_including_final_write() {
        let (engine, actuator, state) = engine();
        engine
            .ramp(Channel::HeadPan, 2500, Duration::from_millis(10), 5)
            .await
            .unwrap();

        let values: Vec<u16> = actuator.writes().iter().map(|(_, p)| *p).collect();
        for v in &values {
            assert!((1000..=2000).contains(v), "unclamped write: {v}");
        }
        assert_eq!(*values.last().unwrap(), 2000);
        assert_eq!(state.position(Channel::HeadPan).await, 2000);
    }

    #[tokio::test]
    async fn ramp_to_current_position_is_a_noop() {
        let (engine, actuator, _state) = engine();
        engine
            .ramp(Channel::HeadPan, POSITION_CENTER, Duration::from_millis(20), 10)
            .await
            .unwrap();
        assert!(actuator.writes().is_empty());
    }

    #[tokio::test]
    async fn actuator_failure_aborts_ramp_without_state_update() {
        struct FailingActuator;

        #[async_trait]
        impl Actuator for FailingActuator {
            async fn set_channel_position(&self, _: Channel, _: u16) -> Result<()> {
                Err(crate::Error::Actuator("wire fell out".into()))
            }
        }

        let state = Arc::new(RigState::new());
        let engine = RampEngine::new(Arc::new(FailingActuator), state.clone());
        let res = engine
            .ramp(Channel::HeadPan, 1800, Duration::from_millis(5), 5)
            .await;
        assert!(res.is_err());
        // State keeps the pre-ramp position on failure.
        assert_eq!(state.position(Channel::HeadPan).await, POSITION_CENTER);
    }
}
