// One command cycle: line -> command -> validated target -> move -> response
//
// The controller owns the position store, the driver and the step scheduler.
// Every line is validated in full before anything moves, so a rejected command
// never touches the store. Each non-blank line yields exactly one response.

use tracing::{info, warn};

use crate::config::INSTANT_PACING;
use crate::error::CommandError;
use crate::joint::{JointVector, PositionStore};
use crate::motion::{BlockingScheduler, StepScheduler, apply_instant, apply_smooth};
use crate::motor::{DriverError, ServoDriver};
use crate::protocol::{Command, Response, parse};

pub struct ArmController<D: ServoDriver, S: StepScheduler = BlockingScheduler> {
    driver: D,
    scheduler: S,
    store: PositionStore,
}

impl<D: ServoDriver> ArmController<D> {
    pub fn new(driver: D) -> Self {
        Self::with_scheduler(driver, BlockingScheduler)
    }
}

impl<D: ServoDriver, S: StepScheduler> ArmController<D, S> {
    pub fn with_scheduler(driver: D, scheduler: S) -> Self {
        Self {
            driver,
            scheduler,
            store: PositionStore::new(JointVector::START),
        }
    }

    /// Initialize the driver, put the arm in its start pose and return the ready banner
    pub fn start(&mut self) -> Result<Response, DriverError> {
        self.driver.initialize()?;
        let start = self.store.current();
        self.driver.coordinated_move(INSTANT_PACING, &start)?;
        info!("Arm ready at {}", start);
        Ok(Response::Ready)
    }

    /// Release the hardware; no moves are accepted afterwards
    pub fn shutdown(&mut self) -> Result<(), DriverError> {
        info!("Shutting down arm at {}", self.store.current());
        self.driver.shutdown()
    }

    /// Current pose
    pub fn position(&self) -> JointVector {
        self.store.current()
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Run one full cycle for a received line.
    ///
    /// Blank lines return `None` and produce no response. Smooth moves block
    /// here until the last interpolation step has run.
    pub fn handle_line(&mut self, line: &str) -> Option<Response> {
        let result = match parse(line) {
            Ok(None) => return None,
            Ok(Some(command)) => self.dispatch(command),
            Err(e) => Err(e),
        };

        Some(match result {
            Ok(response) => response,
            Err(e) => {
                warn!("Rejected {:?}: {}", line.trim(), e);
                Response::from(&e)
            }
        })
    }

    fn dispatch(&mut self, command: Command) -> Result<Response, CommandError> {
        match command {
            Command::SetSingle { joint, angle } => {
                let target = self.store.current().with(joint, angle)?;
                apply_instant(&mut self.driver, &mut self.store, target)?;
                info!("Joint {} ({}) -> {}", joint.index(), joint.name(), angle);
                Ok(Response::AckSingle { joint, angle })
            }
            Command::SetAll { vector } => {
                apply_instant(&mut self.driver, &mut self.store, vector)?;
                info!("All joints -> {}", vector);
                Ok(Response::AckAll)
            }
            Command::SetAllSmooth {
                vector,
                duration_ms,
            } => {
                apply_smooth(
                    &mut self.driver,
                    &mut self.scheduler,
                    &mut self.store,
                    vector,
                    duration_ms,
                )?;
                info!("Smooth move complete at {}", vector);
                Ok(Response::AckSmooth)
            }
            Command::Unknown { raw } => Err(CommandError::Unknown { raw }),
        }
    }
}
