// Simulated arm
//
// Behaves like a Braccio shield coordinated move: every iteration brings each
// joint one degree closer to its target, then waits `pacing` ms. A move of N
// degrees on the furthest joint therefore blocks for N * pacing ms.

use std::time::Duration;

use tracing::{debug, info};

use super::{DriverError, ServoDriver};
use crate::joint::{JOINT_COUNT, JointVector};
use crate::motion::{BlockingScheduler, StepScheduler};

pub struct SimulatedArm<S: StepScheduler = BlockingScheduler> {
    pose: [u8; JOINT_COUNT],
    scheduler: S,
}

impl SimulatedArm {
    pub fn new() -> Self {
        Self::with_scheduler(BlockingScheduler)
    }
}

impl Default for SimulatedArm {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: StepScheduler> SimulatedArm<S> {
    pub fn with_scheduler(scheduler: S) -> Self {
        Self {
            pose: JointVector::START.as_array(),
            scheduler,
        }
    }

    /// Where the simulated servos physically are
    pub fn pose(&self) -> [u8; JOINT_COUNT] {
        self.pose
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }
}

impl<S: StepScheduler> ServoDriver for SimulatedArm<S> {
    fn initialize(&mut self) -> Result<(), DriverError> {
        info!("Simulated arm ready at {:?}", self.pose);
        Ok(())
    }

    fn coordinated_move(&mut self, pacing: u8, target: &JointVector) -> Result<(), DriverError> {
        let goal = target.as_array();
        let pause = Duration::from_millis(pacing as u64);
        let mut iterations = 0u32;

        while self.pose != goal {
            for (pos, &want) in self.pose.iter_mut().zip(goal.iter()) {
                if *pos < want {
                    *pos += 1;
                } else if *pos > want {
                    *pos -= 1;
                }
            }
            iterations += 1;
            self.scheduler.pause(pause);
        }

        debug!(
            "Simulated move to {} in {} iterations (pacing {})",
            target, iterations, pacing
        );
        Ok(())
    }
}
