// Keyboard teleop: 1-6 select, W/S nudge, R/F step, H/Z/T presets, O/C gripper, M smooth,
// P/L/X save/recall/delete poses, G/B play/stop sequence, Q quit
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{info, warn};

use braccio_runtime::config::{POSES_FILE, SEQUENCE_STEP_DELAY, TOPIC_CMD, TOPIC_RSP};
use braccio_runtime::poses::PoseLibrary;
use braccio_runtime::teleop::{Action, Teleop};

const POLL_MS: u64 = 20;

#[derive(Debug, Parser)]
#[command(about = "Drive the arm from the keyboard over zenoh")]
struct Args {
    /// Saved pose library (JSON)
    #[arg(long, default_value = POSES_FILE)]
    poses: PathBuf,

    /// Pause after each step of a played sequence
    #[arg(long, default_value_t = SEQUENCE_STEP_DELAY.as_millis() as u64)]
    step_delay_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let args = Args::parse();
    let library = PoseLibrary::load(&args.poses)?;
    let mut teleop =
        Teleop::default().with_library(library, Duration::from_millis(args.step_delay_ms));

    info!("Opening Zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;
    let publisher = session.declare_publisher(TOPIC_CMD).await?;
    let responses = session.declare_subscriber(TOPIC_RSP).await?;

    info!("Controls: 1-6=joint, W/S=nudge, R/F=step, H/Z/T=home/rest/work, O/C=gripper, M=smooth");
    info!("Poses: P=save, L=recall, X=delete, G=play, B=stop, Q=quit");

    enable_raw_mode()?;
    let result = run_teleop(&mut teleop, &args.poses, &publisher, &responses).await;
    disable_raw_mode()?;

    result
}

async fn run_teleop(
    teleop: &mut Teleop,
    poses: &Path,
    publisher: &zenoh::pubsub::Publisher<'_>,
    responses: &zenoh::pubsub::Subscriber<zenoh::handlers::FifoChannelHandler<zenoh::sample::Sample>>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    loop {
        if event::poll(Duration::from_millis(POLL_MS))? {
            if let Event::Key(KeyEvent { code, kind, .. }) = event::read()? {
                if kind != KeyEventKind::Press {
                    continue;
                }
                let key = match code {
                    KeyCode::Char(c) => c,
                    KeyCode::Esc => 'q',
                    _ => continue,
                };

                match teleop.on_key(key) {
                    Action::Quit => break,
                    Action::Nothing => {
                        if key.is_ascii_digit() {
                            info!("Selected joint {}", teleop.selected().name());
                        } else if matches!(key, 'r' | 'f' | 'R' | 'F') {
                            info!("Step: {} deg", teleop.step());
                        }
                    }
                    action => handle(action, teleop, poses, publisher).await?,
                }
            }
        }

        let action = teleop.tick(Instant::now());
        handle(action, teleop, poses, publisher).await?;

        // Show what the arm answered
        while let Ok(Some(sample)) = responses.try_recv() {
            let payload = sample.payload().to_bytes();
            info!("Arm: {}", String::from_utf8_lossy(&payload));
        }
    }

    Ok(())
}

async fn handle(
    action: Action,
    teleop: &Teleop,
    poses: &Path,
    publisher: &zenoh::pubsub::Publisher<'_>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    match action {
        Action::Send(cmd) => {
            let line = cmd.to_string();
            info!("Sending {}", line);
            publisher.put(line).await?;
        }
        Action::Saved(name) | Action::Deleted(name) => {
            info!("Pose library changed ({}), {} saved", name, teleop.library().len());
            if let Err(e) = teleop.library().save(poses) {
                warn!("Could not write {}: {}", poses.display(), e);
            }
        }
        Action::Playing(steps) => info!("Playing {} saved poses", steps),
        Action::Stopped => info!("Sequence stopped"),
        Action::Finished => info!("Sequence complete"),
        Action::Quit | Action::Nothing => {}
    }
    Ok(())
}
