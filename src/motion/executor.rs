// Instant coordinated move

use tracing::debug;

use crate::config::INSTANT_PACING;
use crate::joint::{JointVector, PositionStore};
use crate::motor::{DriverError, ServoDriver};

/// Move all six joints to `target` in one driver call.
///
/// Always a full coordinated move, even when only one joint changed. The store
/// is updated once the driver returns; on a driver error it keeps the old pose.
pub fn apply_instant<D: ServoDriver + ?Sized>(
    driver: &mut D,
    store: &mut PositionStore,
    target: JointVector,
) -> Result<(), DriverError> {
    debug!("Instant move {} -> {}", store.current(), target);
    driver.coordinated_move(INSTANT_PACING, &target)?;
    store.set(target);
    Ok(())
}
