// Serial command loop
//
// Polls the command link, hands complete lines to the controller and writes
// one response per command. The controller runs on a blocking thread: a smooth
// move sleeps between steps and the link is simply not read until it is done.
// Joint snapshots are optionally published on zenoh from an async task.

use std::error::Error;
use std::io::{self, Read, Write};

use clap::{Parser, ValueEnum};
use serialport::SerialPort;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::{
    DEFAULT_BAUD_RATE, LINK_POLL_TIMEOUT, LINK_PORT, SERVO_BUS_PORT, TOPIC_STATE,
};
use crate::controller::ArmController;
use crate::joint::{JOINT_COUNT, JointVector};
use crate::messages::JointState;
use crate::motion::StepScheduler;
use crate::motor::{DEFAULT_SERVO_IDS, FeetechArm, ServoDriver, SimulatedArm};
use crate::protocol::{LineBuffer, ResponseEmitter};

pub type BoxError = Box<dyn Error + Send + Sync>;

// Snapshots waiting for the publisher; older ones are dropped when full
const STATE_QUEUE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// No hardware, moves are simulated in software
    Sim,
    /// Feetech STS servos on a serial bus
    Feetech,
}

/// Command-line options of the arm runtime
#[derive(Debug, Parser)]
#[command(version, about = "6-axis arm controller speaking the S/ALL/SMOOTH line protocol")]
pub struct RuntimeArgs {
    /// Serial port carrying commands (use "-" for stdin/stdout)
    #[arg(long, default_value = LINK_PORT)]
    pub port: String,

    /// Baud rate of the command link
    #[arg(long, default_value_t = DEFAULT_BAUD_RATE)]
    pub baud: u32,

    /// Actuator backend
    #[arg(long, value_enum, default_value_t = Backend::Sim)]
    pub backend: Backend,

    /// Serial port of the servo bus (feetech backend)
    #[arg(long, default_value = SERVO_BUS_PORT)]
    pub servo_port: String,

    /// Servo IDs in joint order, base to gripper (feetech backend)
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_SERVO_IDS)]
    pub servo_ids: Vec<u8>,

    /// Publish joint snapshots on zenoh after each accepted command
    #[arg(long)]
    pub publish_state: bool,
}

impl RuntimeArgs {
    fn servo_ids(&self) -> Result<[u8; JOINT_COUNT], BoxError> {
        self.servo_ids.as_slice().try_into().map_err(|_| {
            format!(
                "expected {} servo ids, got {}",
                JOINT_COUNT,
                self.servo_ids.len()
            )
            .into()
        })
    }
}

/// Serve commands from `reader` until the link closes.
///
/// Sends the ready banner first, then loops: poll, frame, dispatch, respond.
/// `on_accepted` sees the pose after every acknowledged command.
pub fn serve<D, S, R, W>(
    controller: &mut ArmController<D, S>,
    mut reader: R,
    writer: W,
    mut on_accepted: impl FnMut(JointVector),
) -> Result<(), BoxError>
where
    D: ServoDriver,
    S: StepScheduler,
    R: Read,
    W: Write,
{
    let mut emitter = ResponseEmitter::new(writer);
    emitter.emit(controller.start()?)?;

    let mut lines = LineBuffer::new();
    let mut chunk = [0u8; 64];

    loop {
        while let Some(line) = lines.next_line() {
            if let Some(response) = controller.handle_line(&line) {
                emitter.emit(response)?;
                if !response.is_error() {
                    on_accepted(controller.position());
                }
            }
        }

        match reader.read(&mut chunk) {
            Ok(0) => {
                info!("Command link closed");
                return Ok(());
            }
            Ok(n) => lines.extend(&chunk[..n]),
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                ) => {}
            Err(e) => return Err(e.into()),
        }
    }
}

fn build_driver(args: &RuntimeArgs) -> Result<Box<dyn ServoDriver + Send>, BoxError> {
    Ok(match args.backend {
        Backend::Sim => {
            info!("Using simulated arm");
            Box::new(SimulatedArm::new())
        }
        Backend::Feetech => Box::new(FeetechArm::open(&args.servo_port, args.servo_ids()?)?),
    })
}

/// Open the command link and run the controller on it
fn run_link(
    args: &RuntimeArgs,
    driver: Box<dyn ServoDriver + Send>,
    states: Option<mpsc::Sender<JointState>>,
) -> Result<(), BoxError> {
    let mut controller = ArmController::new(driver);
    let on_accepted = |pose: JointVector| {
        if let Some(tx) = &states {
            if let Err(e) = tx.try_send(JointState::from(&pose)) {
                debug!("State snapshot dropped: {}", e);
            }
        }
    };

    let result = if args.port == "-" {
        info!("Serving commands on stdin/stdout");
        serve(&mut controller, io::stdin().lock(), io::stdout().lock(), on_accepted)
    } else {
        open_link(args).and_then(|(reader, writer)| serve(&mut controller, reader, writer, on_accepted))
    };

    // Release the servos however the loop ended
    if let Err(e) = controller.shutdown() {
        warn!("Failed to release servos: {}", e);
    }
    result
}

fn open_link(args: &RuntimeArgs) -> Result<(Box<dyn SerialPort>, Box<dyn SerialPort>), BoxError> {
    info!("Opening command link {} at {} baud", args.port, args.baud);
    let port = serialport::new(&args.port, args.baud)
        .timeout(LINK_POLL_TIMEOUT)
        .open()?;
    let reader = port.try_clone()?;
    Ok((reader, port))
}

async fn publish_states(
    session: zenoh::Session,
    mut states: mpsc::Receiver<JointState>,
) -> Result<(), BoxError> {
    let publisher = session.declare_publisher(TOPIC_STATE).await?;
    info!("Publishing joint state to: {}", TOPIC_STATE);

    while let Some(state) = states.recv().await {
        let json = serde_json::to_string(&state)?;
        publisher.put(json).await?;
    }
    Ok(())
}

pub async fn run(args: RuntimeArgs) -> Result<(), BoxError> {
    let driver = build_driver(&args)?;

    let (states, publisher) = if args.publish_state {
        info!("Opening Zenoh session...");
        let session = zenoh::open(zenoh::Config::default()).await?;
        let (tx, rx) = mpsc::channel(STATE_QUEUE);
        (Some(tx), Some(tokio::spawn(publish_states(session, rx))))
    } else {
        (None, None)
    };

    // Blocking on purpose: the loop sleeps through smooth moves
    let result = tokio::task::spawn_blocking(move || run_link(&args, driver, states)).await?;

    // The sender went away with the loop, so the publisher drains and stops
    if let Some(handle) = publisher {
        if let Err(e) = handle.await? {
            warn!("State publisher stopped: {}", e);
        }
    }
    result
}
