// Smooth move: linear per-joint interpolation over a fixed number of steps
//
// The pose is split into SMOOTH_STEPS equal increments. Each intermediate pose
// is truncated toward zero (plain `as` cast) before it goes to the driver, so
// the last intermediate pose may be a degree short. The store is snapped to
// the exact target once every step has run.

use std::time::Duration;

use tracing::{debug, info};

use crate::config::{SMOOTH_STEP_PACING, SMOOTH_STEPS};
use crate::joint::{JOINT_COUNT, JointVector, MAX_ANGLE, MIN_ANGLE, PositionStore};
use crate::motion::StepScheduler;
use crate::motor::{DriverError, ServoDriver};

/// Pause between interpolation steps.
///
/// Integer division: durations shorter than SMOOTH_STEPS ms give zero, i.e.
/// back-to-back steps with no pacing at all.
pub fn per_step_delay(duration_ms: u32) -> Duration {
    Duration::from_millis((duration_ms / SMOOTH_STEPS) as u64)
}

/// Intermediate poses a smooth move from `start` to `target` passes through
pub fn interpolate(start: &JointVector, target: &JointVector) -> Vec<JointVector> {
    let from = start.as_array();
    let to = target.as_array();

    let mut delta = [0.0f32; JOINT_COUNT];
    let mut working = [0.0f32; JOINT_COUNT];
    for i in 0..JOINT_COUNT {
        delta[i] = (to[i] as f32 - from[i] as f32) / SMOOTH_STEPS as f32;
        working[i] = from[i] as f32;
    }

    (0..SMOOTH_STEPS)
        .map(|_| {
            let mut pose = [0i64; JOINT_COUNT];
            for i in 0..JOINT_COUNT {
                working[i] += delta[i];
                // Truncation can land a hair outside the range after float drift
                pose[i] = (working[i] as i64).clamp(MIN_ANGLE as i64, MAX_ANGLE as i64);
            }
            // Clamped above, cannot fail
            JointVector::new(pose).unwrap_or(*target)
        })
        .collect()
}

/// Move to `target` over roughly `duration_ms`, blocking until done.
///
/// Reads the store once at the start and writes it once at the end. A driver
/// error aborts the remaining steps and leaves the store untouched.
pub fn apply_smooth<D, S>(
    driver: &mut D,
    scheduler: &mut S,
    store: &mut PositionStore,
    target: JointVector,
    duration_ms: u32,
) -> Result<(), DriverError>
where
    D: ServoDriver + ?Sized,
    S: StepScheduler + ?Sized,
{
    let start = store.current();
    let delay = per_step_delay(duration_ms);
    info!(
        "Smooth move {} -> {} over {} ms ({} steps, {:?} apart)",
        start, target, duration_ms, SMOOTH_STEPS, delay
    );

    for (step, pose) in interpolate(&start, &target).iter().enumerate() {
        debug!("Step {}/{}: {}", step + 1, SMOOTH_STEPS, pose);
        driver.coordinated_move(SMOOTH_STEP_PACING, pose)?;
        scheduler.pause(delay);
    }

    store.set(target);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::RecordingScheduler;
    use crate::motor::testing::RecordingDriver;

    fn zeros() -> JointVector {
        JointVector::new([0; JOINT_COUNT]).unwrap()
    }

    #[test]
    fn test_per_step_delay_truncates() {
        assert_eq!(per_step_delay(2000), Duration::from_millis(40));
        assert_eq!(per_step_delay(1000), Duration::from_millis(20));
        assert_eq!(per_step_delay(99), Duration::from_millis(1));
        assert_eq!(per_step_delay(49), Duration::ZERO);
        assert_eq!(per_step_delay(1), Duration::ZERO);
    }

    #[test]
    fn test_smooth_move_ends_exactly_on_target() {
        let mut driver = RecordingDriver::default();
        let mut scheduler = RecordingScheduler::default();
        let mut store = PositionStore::new(JointVector::START);

        apply_smooth(&mut driver, &mut scheduler, &mut store, zeros(), 1000).unwrap();

        assert_eq!(store.current(), zeros());
        assert_eq!(driver.moves.len(), SMOOTH_STEPS as usize);
        assert!(driver.moves.iter().all(|&(p, _)| p == SMOOTH_STEP_PACING));
        assert_eq!(scheduler.pauses.len(), SMOOTH_STEPS as usize);
        assert_eq!(scheduler.total(), Duration::from_millis(1000));
    }

    #[test]
    fn test_intermediate_poses_are_truncated_not_rounded() {
        // 0 -> 1 on one joint: increments of 0.02 never reach 1.0 before the
        // last step (float drift may even keep the last one just under)
        let start = zeros();
        let target = JointVector::new([1, 0, 0, 0, 0, 0]).unwrap();
        let poses = interpolate(&start, &target);
        assert_eq!(poses.len(), SMOOTH_STEPS as usize);
        assert!(poses[..SMOOTH_STEPS as usize - 1]
            .iter()
            .all(|p| p.as_array()[0] == 0));
    }

    #[test]
    fn test_interpolation_is_monotonic_and_bounded() {
        let start = JointVector::new([0, 180, 90, 10, 170, 73]).unwrap();
        let target = JointVector::new([180, 0, 90, 170, 10, 0]).unwrap();
        let poses = interpolate(&start, &target);

        let mut prev = start.as_array();
        for pose in &poses {
            let cur = pose.as_array();
            assert!(cur[0] >= prev[0]);
            assert!(cur[1] <= prev[1]);
            assert_eq!(cur[2], 90);
            prev = cur;
        }
        // Midpoint of 0 -> 180 after 25 of 50 steps
        assert!((89..=90).contains(&poses[24].as_array()[0]));
    }

    #[test]
    fn test_short_duration_runs_unpaced() {
        let mut driver = RecordingDriver::default();
        let mut scheduler = RecordingScheduler::default();
        let mut store = PositionStore::default();

        apply_smooth(&mut driver, &mut scheduler, &mut store, JointVector::REST, 10).unwrap();

        assert_eq!(driver.moves.len(), SMOOTH_STEPS as usize);
        assert!(scheduler.pauses.iter().all(|d| d.is_zero()));
        assert_eq!(store.current(), JointVector::REST);
    }

    #[test]
    fn test_driver_failure_mid_move_keeps_store() {
        let mut driver = RecordingDriver::failing_at(10);
        let mut scheduler = RecordingScheduler::default();
        let mut store = PositionStore::default();

        let result = apply_smooth(&mut driver, &mut scheduler, &mut store, zeros(), 1000);

        assert!(result.is_err());
        assert_eq!(driver.moves.len(), 10);
        assert_eq!(store.current(), JointVector::START);
    }
}
