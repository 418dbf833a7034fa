// Zenoh <-> serial bridge
//
// Lets remote clients drive an arm whose controller only has a serial link:
// command lines published on TOPIC_CMD are written to the port, and every
// line the controller answers with is republished on TOPIC_RSP.

use std::io::{Read, Write};
use std::time::Duration;

use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::config::{TOPIC_CMD, TOPIC_RSP};
use crate::protocol::LineBuffer;
use crate::runtime::BoxError;

// Poll rate for both directions
pub const BRIDGE_HZ: u64 = 50;

/// Write every non-blank line of a command payload to the link.
///
/// Returns how many lines were forwarded.
pub fn forward_commands<W: Write>(link: &mut W, payload: &str) -> std::io::Result<usize> {
    let mut forwarded = 0;
    for line in payload.lines().map(str::trim).filter(|l| !l.is_empty()) {
        link.write_all(line.as_bytes())?;
        link.write_all(b"\n")?;
        forwarded += 1;
    }
    link.flush()?;
    Ok(forwarded)
}

/// Forward one payload, logging instead of failing so the bridge keeps
/// relaying after a bad write. Returns how many lines went out.
fn relay_command<W: Write>(link: &mut W, payload: &str) -> usize {
    match forward_commands(link, payload) {
        Ok(n) => {
            debug!("Forwarded {} line(s): {}", n, payload.trim());
            n
        }
        Err(e) => {
            warn!("Serial write failed, command dropped: {}", e);
            0
        }
    }
}

/// Move whatever the link has buffered into `lines` without blocking
fn drain_link<R: Read>(link: &mut R, available: usize, lines: &mut LineBuffer) -> std::io::Result<()> {
    let mut chunk = vec![0u8; available];
    let n = link.read(&mut chunk)?;
    lines.extend(&chunk[..n]);
    Ok(())
}

pub async fn run(port_name: &str, baud: u32) -> Result<(), BoxError> {
    info!("Opening serial link {} at {} baud", port_name, baud);
    let mut port = serialport::new(port_name, baud)
        .timeout(Duration::from_millis(10))
        .open()?;

    info!("Opening Zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;
    let subscriber = session.declare_subscriber(TOPIC_CMD).await?;
    let pub_rsp = session.declare_publisher(TOPIC_RSP).await?;

    info!("Bridge started: {} -> {} -> {}", TOPIC_CMD, port_name, TOPIC_RSP);

    let mut lines = LineBuffer::new();
    let mut tick = interval(Duration::from_millis(1000 / BRIDGE_HZ));

    loop {
        tick.tick().await;

        // 1. Forward every pending command
        while let Ok(Some(sample)) = subscriber.try_recv() {
            let payload = sample.payload().to_bytes();
            let text = String::from_utf8_lossy(&payload);
            relay_command(&mut port, &text);
        }

        // 2. Republish responses
        let available = port.bytes_to_read()? as usize;
        if available > 0 {
            drain_link(&mut port, available, &mut lines)?;
        }
        while let Some(line) = lines.next_line() {
            if line.is_empty() {
                continue;
            }
            info!("Arm: {}", line);
            pub_rsp.put(line).await?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_forward_splits_and_terminates_lines() {
        let mut link = Vec::new();
        let n = forward_commands(&mut link, "S1:90\r\n\n  ALL:1,2,3,4,5,6  \n").unwrap();
        assert_eq!(n, 2);
        assert_eq!(link, b"S1:90\nALL:1,2,3,4,5,6\n");
    }

    #[test]
    fn test_forward_adds_missing_terminator() {
        let mut link = Vec::new();
        forward_commands(&mut link, "SMOOTH:0,0,0,0,0,0,1500").unwrap();
        assert_eq!(link, b"SMOOTH:0,0,0,0,0,0,1500\n");
    }

    /// Link that refuses the first write, then accepts everything
    #[derive(Default)]
    struct FlakyLink {
        failed: bool,
        written: Vec<u8>,
    }

    impl Write for FlakyLink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if !self.failed {
                self.failed = true;
                return Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "unplugged"));
            }
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_write_does_not_poison_later_commands() {
        let mut link = FlakyLink::default();
        assert_eq!(relay_command(&mut link, "S1:90"), 0);
        assert_eq!(relay_command(&mut link, "S2:45"), 1);
        assert_eq!(link.written, b"S2:45\n");
    }

    #[test]
    fn test_drain_link_frames_responses() {
        let mut link = Cursor::new(b"ACK:ALL_OK\nACK:S".to_vec());
        let mut lines = LineBuffer::new();
        drain_link(&mut link, 16, &mut lines).unwrap();
        assert_eq!(lines.next_line().as_deref(), Some("ACK:ALL_OK"));
        assert_eq!(lines.next_line(), None);
    }
}
