// Position-mode arm driver on a Feetech bus
//
// Maps the six joints onto six STS servos. A coordinated move sync-writes all
// goal positions at once and then blocks while the servos travel.

use std::io::{Read, Write};
use std::time::Duration;

use serialport::SerialPort;
use tracing::{debug, info, warn};

use super::feetech::{FeetechBus, OperatingMode, Register, angle_to_ticks, ticks_to_angle};
use super::{DriverError, ServoDriver};
use crate::joint::{JOINT_COUNT, Joint, JointVector, MAX_ANGLE, MIN_ANGLE};
use crate::motion::{BlockingScheduler, StepScheduler};

/// Servo IDs in joint order (base .. gripper)
pub const DEFAULT_SERVO_IDS: [u8; JOINT_COUNT] = [1, 2, 3, 4, 5, 6];

/// Gentle acceleration so a full-range goal jump does not slam the joint
const GOAL_ACCELERATION: u8 = 50;

pub struct FeetechArm<P: Read + Write = Box<dyn SerialPort>, S: StepScheduler = BlockingScheduler>
{
    bus: FeetechBus<P>,
    servo_ids: [u8; JOINT_COUNT],
    last_goal: JointVector,
    scheduler: S,
}

impl FeetechArm {
    /// Connect to the servo bus on the given serial port
    pub fn open(port: &str, servo_ids: [u8; JOINT_COUNT]) -> Result<Self, DriverError> {
        info!("Opening servo bus on {}", port);
        let bus = FeetechBus::open(port)?;
        Ok(Self::with_bus(bus, servo_ids, BlockingScheduler))
    }
}

impl<P: Read + Write, S: StepScheduler> FeetechArm<P, S> {
    pub fn with_bus(bus: FeetechBus<P>, servo_ids: [u8; JOINT_COUNT], scheduler: S) -> Self {
        Self {
            bus,
            servo_ids,
            last_goal: JointVector::START,
            scheduler,
        }
    }

    /// Read where each joint physically is, clamped into the joint range
    pub fn present_pose(&mut self) -> Result<JointVector, DriverError> {
        let mut angles = [0i64; JOINT_COUNT];
        for (joint, angle) in Joint::ALL.iter().zip(angles.iter_mut()) {
            let ticks = self.bus.present_position(self.servo_ids[joint.slot()])?;
            *angle = (ticks_to_angle(ticks) as i64).clamp(MIN_ANGLE as i64, MAX_ANGLE as i64);
        }
        Ok(JointVector::new(angles)?)
    }

    pub fn into_bus(self) -> FeetechBus<P> {
        self.bus
    }
}

impl<P: Read + Write, S: StepScheduler> ServoDriver for FeetechArm<P, S> {
    /// Ping every servo, switch them to position mode and enable torque
    fn initialize(&mut self) -> Result<(), DriverError> {
        info!("Initializing servos {:?} for position control", self.servo_ids);

        for &id in &self.servo_ids {
            if !self.bus.ping(id)? {
                warn!("Servo {} not responding to ping", id);
                return Err(DriverError::NotResponding { id });
            }
            debug!("Servo {} responding", id);
        }

        // Mode changes are only accepted with torque off
        for &id in &self.servo_ids {
            self.bus.disable_torque(id)?;
            self.bus.set_operating_mode(id, OperatingMode::Position)?;
            self.bus.set_acceleration(id, GOAL_ACCELERATION)?;
            self.bus.enable_torque(id)?;
        }

        // Travel time of the first move is measured from where the joints really are
        self.last_goal = self.present_pose()?;
        info!("Servos initialized at {}", self.last_goal);
        Ok(())
    }

    /// Release all joints (arm goes limp)
    fn shutdown(&mut self) -> Result<(), DriverError> {
        info!("Disabling torque on all servos");
        for &id in &self.servo_ids {
            self.bus.disable_torque(id)?;
        }
        Ok(())
    }

    fn coordinated_move(&mut self, pacing: u8, target: &JointVector) -> Result<(), DriverError> {
        let goals: Vec<(u8, u16)> = Joint::ALL
            .iter()
            .map(|&joint| (self.servo_ids[joint.slot()], angle_to_ticks(target.get(joint))))
            .collect();
        self.bus.sync_write_u16(Register::GoalPosition, &goals)?;

        // Hold the caller for as long as a paced move over the largest delta takes
        let travel = self.last_goal.max_delta(target) as u64 * pacing as u64;
        debug!("Goal {} sent, waiting {} ms", target, travel);
        self.scheduler.pause(Duration::from_millis(travel));

        self.last_goal = *target;
        Ok(())
    }
}
