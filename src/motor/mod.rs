// Actuator drivers for the 6-axis arm
//
// Provides:
// - The ServoDriver trait the motion code talks to
// - A simulated arm (default backend, no hardware needed)
// - Feetech STS serial protocol and a position-mode arm driver on top of it

mod driver;
pub mod feetech;
pub mod sim;

pub use driver::{DEFAULT_SERVO_IDS, FeetechArm};
pub use feetech::{FeetechBus, FeetechError};
pub use sim::SimulatedArm;

use crate::error::RangeError;
use crate::joint::JointVector;

#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("Servo bus error: {0}")]
    Bus(#[from] FeetechError),

    #[error("Servo {id} not responding")]
    NotResponding { id: u8 },

    #[error("Servos report an invalid pose: {0}")]
    Pose(#[from] RangeError),
}

/// Moves all six joints together.
///
/// `coordinated_move` blocks until the move is done; how long that takes
/// grows with `pacing` and with the largest angle change.
pub trait ServoDriver {
    /// Bring the hardware to a state where it accepts moves
    fn initialize(&mut self) -> Result<(), DriverError> {
        Ok(())
    }

    fn coordinated_move(&mut self, pacing: u8, target: &JointVector) -> Result<(), DriverError>;

    /// Leave the hardware safe once no more moves will come
    fn shutdown(&mut self) -> Result<(), DriverError> {
        Ok(())
    }
}

impl<D: ServoDriver + ?Sized> ServoDriver for Box<D> {
    fn initialize(&mut self) -> Result<(), DriverError> {
        (**self).initialize()
    }

    fn coordinated_move(&mut self, pacing: u8, target: &JointVector) -> Result<(), DriverError> {
        (**self).coordinated_move(pacing, target)
    }

    fn shutdown(&mut self) -> Result<(), DriverError> {
        (**self).shutdown()
    }
}

/// Driver fake that records every coordinated move
#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    #[derive(Debug, Default)]
    pub struct RecordingDriver {
        pub moves: Vec<(u8, JointVector)>,
        pub initialized: bool,
        pub shut_down: bool,
        /// Fail the move with this (0-based) number
        pub fail_at: Option<usize>,
    }

    impl RecordingDriver {
        pub fn failing_at(n: usize) -> Self {
            Self {
                fail_at: Some(n),
                ..Self::default()
            }
        }
    }

    impl ServoDriver for RecordingDriver {
        fn initialize(&mut self) -> Result<(), DriverError> {
            self.initialized = true;
            Ok(())
        }

        fn coordinated_move(
            &mut self,
            pacing: u8,
            target: &JointVector,
        ) -> Result<(), DriverError> {
            if self.fail_at == Some(self.moves.len()) {
                return Err(DriverError::NotResponding { id: 1 });
            }
            self.moves.push((pacing, *target));
            Ok(())
        }

        fn shutdown(&mut self) -> Result<(), DriverError> {
            self.shut_down = true;
            Ok(())
        }
    }
}
