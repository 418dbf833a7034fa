// Protocol constants, motion pacing, topics
use std::time::Duration;

// Serial link to the command source
pub const DEFAULT_BAUD_RATE: u32 = 9600;

// Read timeout on the command link; a timed out read just means "no line yet"
pub const LINK_POLL_TIMEOUT: Duration = Duration::from_millis(50);

// Pacing handed to the actuator driver for an instant coordinated move
pub const INSTANT_PACING: u8 = 20;

// Pacing for each interpolation step of a smooth move (steps are already small)
pub const SMOOTH_STEP_PACING: u8 = 10;

// Number of interpolation steps in a smooth move
pub const SMOOTH_STEPS: u32 = 50;

// Duration used when SMOOTH omits the 7th field
pub const DEFAULT_SMOOTH_DURATION_MS: u32 = 2000;

// Zenoh topics
pub const TOPIC_CMD: &str = "braccio/cmd"; // command lines in
pub const TOPIC_RSP: &str = "braccio/rsp"; // response lines out
pub const TOPIC_STATE: &str = "braccio/state/joints"; // joint snapshots

// Default port of the command link
pub const LINK_PORT: &str = "/dev/ttyACM0";

// Default port of the Feetech servo bus
pub const SERVO_BUS_PORT: &str = "/dev/ttyUSB0";

// Saved pose library of the keyboard client
pub const POSES_FILE: &str = "poses.json";

// Pause after each step of a played sequence
pub const SEQUENCE_STEP_DELAY: Duration = Duration::from_millis(1000);
