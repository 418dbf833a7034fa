// Feetech STS serial protocol, position mode
//
// Packet format: [0xFF, 0xFF, ID, Length, Instruction, Params..., Checksum]
// Length counts instruction + params + checksum. Status packets carry an
// error byte where the instruction would be.

use serialport::SerialPort;
use std::io::{Read, Write};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BAUDRATE: u32 = 1_000_000;
pub const DEFAULT_TIMEOUT_MS: u64 = 100;

const HEADER: [u8; 2] = [0xFF, 0xFF];
const BROADCAST_ID: u8 = 0xFE;

/// Encoder ticks per full turn
pub const TICKS_PER_REVOLUTION: u32 = 4096;

/// Tick value at the 90 degree mid position
const CENTER_TICKS: i32 = 2048;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Instruction {
    Ping = 0x01,
    Read = 0x02,
    Write = 0x03,
    SyncWrite = 0x83,
}

/// STS register addresses used by the arm
#[repr(u8)]
#[derive(Debug, Clone, Copy)]
pub enum Register {
    OperatingMode = 33,   // 1 byte: 0=position
    TorqueEnable = 40,    // 1 byte
    Acceleration = 41,    // 1 byte
    GoalPosition = 42,    // 2 bytes
    Lock = 55,            // 1 byte
    PresentPosition = 56, // 2 bytes, read-only
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OperatingMode {
    Position = 0,
    Velocity = 1,
}

#[derive(Debug, thiserror::Error)]
pub enum FeetechError {
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid response from servo {id}: {reason}")]
    InvalidResponse { id: u8, reason: String },

    #[error("Checksum mismatch for servo {id}")]
    ChecksumMismatch { id: u8 },

    #[error("Servo {id} returned error status: 0x{status:02X}")]
    ServoStatus { id: u8, status: u8 },

    #[error("Timeout waiting for response from servo {id}")]
    Timeout { id: u8 },
}

pub type Result<T> = std::result::Result<T, FeetechError>;

/// Convert a joint angle (0..=180 degrees) to goal position ticks
///
/// 90 degrees sits at the servo's mechanical center.
pub fn angle_to_ticks(angle: u8) -> u16 {
    let offset = (angle as i32 - 90) * TICKS_PER_REVOLUTION as i32 / 360;
    (CENTER_TICKS + offset) as u16
}

/// Convert present position ticks back to the nearest whole degree
pub fn ticks_to_angle(ticks: u16) -> i32 {
    let offset = ticks as i32 - CENTER_TICKS;
    90 + (offset * 360 + (TICKS_PER_REVOLUTION as i32 / 2)).div_euclid(TICKS_PER_REVOLUTION as i32)
}

fn checksum(data: &[u8]) -> u8 {
    let sum: u32 = data.iter().map(|&b| b as u32).sum();
    !(sum as u8)
}

fn encode_packet(id: u8, instruction: Instruction, params: &[u8]) -> Vec<u8> {
    let mut packet = Vec::with_capacity(6 + params.len());
    packet.extend_from_slice(&HEADER);
    packet.push(id);
    packet.push((params.len() + 2) as u8);
    packet.push(instruction as u8);
    packet.extend_from_slice(params);
    packet.push(checksum(&packet[2..]));
    packet
}

/// Servo bus over any byte stream; a serial port in production
pub struct FeetechBus<P: Read + Write = Box<dyn SerialPort>> {
    port: P,
}

impl FeetechBus {
    pub fn open(port_name: &str) -> Result<Self> {
        Self::open_with_baudrate(port_name, DEFAULT_BAUDRATE)
    }

    pub fn open_with_baudrate(port_name: &str, baudrate: u32) -> Result<Self> {
        let port = serialport::new(port_name, baudrate)
            .timeout(Duration::from_millis(DEFAULT_TIMEOUT_MS))
            .open()?;
        Ok(Self { port })
    }
}

impl<P: Read + Write> FeetechBus<P> {
    pub fn from_port(port: P) -> Self {
        Self { port }
    }

    pub fn into_port(self) -> P {
        self.port
    }

    fn send(&mut self, id: u8, instruction: Instruction, params: &[u8]) -> Result<()> {
        let packet = encode_packet(id, instruction, params);
        self.port.write_all(&packet)?;
        self.port.flush()?;
        Ok(())
    }

    /// Read one status packet and return its parameters
    fn read_status(&mut self, expected_id: u8) -> Result<Vec<u8>> {
        let mut head = [0u8; 4];
        self.port.read_exact(&mut head).map_err(|e| match e.kind() {
            std::io::ErrorKind::TimedOut | std::io::ErrorKind::UnexpectedEof => {
                FeetechError::Timeout { id: expected_id }
            }
            _ => FeetechError::Io(e),
        })?;

        if head[..2] != HEADER {
            return Err(FeetechError::InvalidResponse {
                id: expected_id,
                reason: format!("Invalid header: {:02X?}", &head[..2]),
            });
        }
        let (id, length) = (head[2], head[3] as usize);
        if id != expected_id {
            return Err(FeetechError::InvalidResponse {
                id: expected_id,
                reason: format!("ID mismatch: expected {}, got {}", expected_id, id),
            });
        }
        if length < 2 {
            return Err(FeetechError::InvalidResponse {
                id,
                reason: format!("Length {} too short", length),
            });
        }

        // error byte + params + checksum
        let mut body = vec![0u8; length];
        self.port.read_exact(&mut body)?;
        let (payload, received) = body.split_at(length - 1);

        let mut summed = vec![id, length as u8];
        summed.extend_from_slice(payload);
        if checksum(&summed) != received[0] {
            return Err(FeetechError::ChecksumMismatch { id });
        }
        if payload[0] != 0 {
            return Err(FeetechError::ServoStatus {
                id,
                status: payload[0],
            });
        }
        Ok(payload[1..].to_vec())
    }

    pub fn ping(&mut self, id: u8) -> Result<bool> {
        self.send(id, Instruction::Ping, &[])?;
        match self.read_status(id) {
            Ok(_) => Ok(true),
            Err(FeetechError::Timeout { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub fn write_u8(&mut self, id: u8, register: Register, value: u8) -> Result<()> {
        debug!("Write u8 to servo {}: reg={:?}, value={}", id, register, value);
        self.send(id, Instruction::Write, &[register as u8, value])?;
        self.read_status(id).map(|_| ())
    }

    pub fn read_u16(&mut self, id: u8, register: Register) -> Result<u16> {
        self.send(id, Instruction::Read, &[register as u8, 2])?;
        let params = self.read_status(id)?;
        match params[..] {
            [lo, hi, ..] => Ok(u16::from_le_bytes([lo, hi])),
            _ => Err(FeetechError::InvalidResponse {
                id,
                reason: format!("Expected 2 bytes, got {}", params.len()),
            }),
        }
    }

    /// Write the same 2-byte register on several servos in one broadcast packet.
    /// Servos do not answer a sync write.
    pub fn sync_write_u16(&mut self, register: Register, data: &[(u8, u16)]) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }
        let mut params = Vec::with_capacity(2 + data.len() * 3);
        params.push(register as u8);
        params.push(2);
        for &(id, value) in data {
            params.push(id);
            params.extend_from_slice(&value.to_le_bytes());
        }
        debug!("Sync write to {} servos: reg={:?}", data.len(), register);
        self.send(BROADCAST_ID, Instruction::SyncWrite, &params)
    }

    pub fn enable_torque(&mut self, id: u8) -> Result<()> {
        self.write_u8(id, Register::TorqueEnable, 1)?;
        self.write_u8(id, Register::Lock, 1)
    }

    pub fn disable_torque(&mut self, id: u8) -> Result<()> {
        self.write_u8(id, Register::TorqueEnable, 0)?;
        self.write_u8(id, Register::Lock, 0)
    }

    /// Torque must be off while the mode changes
    pub fn set_operating_mode(&mut self, id: u8, mode: OperatingMode) -> Result<()> {
        self.write_u8(id, Register::OperatingMode, mode as u8)
    }

    pub fn set_acceleration(&mut self, id: u8, acceleration: u8) -> Result<()> {
        self.write_u8(id, Register::Acceleration, acceleration)
    }

    pub fn present_position(&mut self, id: u8) -> Result<u16> {
        self.read_u16(id, Register::PresentPosition)
    }
}
