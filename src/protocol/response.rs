// Response lines written back on the command link
//
// Ack/error wording matches what the desktop client already prints.

use std::fmt;
use std::io::{self, Write};

use tracing::debug;

use crate::error::CommandError;
use crate::joint::Joint;

/// One response line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    Ready,
    AckSingle { joint: Joint, angle: u8 },
    AckAll,
    AckSmooth,
    Error(ErrorKind),
}

/// Failure category reported on the link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Malformed,
    OutOfRange,
    InvalidDuration,
    UnknownCommand,
    Actuator,
}

impl ErrorKind {
    fn code(self) -> &'static str {
        match self {
            ErrorKind::Malformed => "PARSEO_FALLIDO",
            ErrorKind::OutOfRange => "FUERA_DE_RANGO",
            ErrorKind::InvalidDuration => "DURACION_INVALIDA",
            ErrorKind::UnknownCommand => "COMANDO_DESCONOCIDO",
            ErrorKind::Actuator => "ACTUADOR",
        }
    }
}

impl From<&CommandError> for ErrorKind {
    fn from(err: &CommandError) -> Self {
        match err {
            CommandError::Parse(_) => ErrorKind::Malformed,
            CommandError::Range(_) => ErrorKind::OutOfRange,
            CommandError::Duration(_) => ErrorKind::InvalidDuration,
            CommandError::Unknown { .. } => ErrorKind::UnknownCommand,
            CommandError::Driver(_) => ErrorKind::Actuator,
        }
    }
}

impl From<&CommandError> for Response {
    fn from(err: &CommandError) -> Self {
        Response::Error(err.into())
    }
}

impl Response {
    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error(_))
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Ready => f.write_str("SISTEMA:CONECTADO"),
            Response::AckSingle { joint, angle } => write!(f, "ACK:S{}={}", joint.index(), angle),
            Response::AckAll => f.write_str("ACK:ALL_OK"),
            Response::AckSmooth => f.write_str("ACK:SMOOTH_OK"),
            Response::Error(kind) => write!(f, "ERROR:{}", kind.code()),
        }
    }
}

/// Writes responses as `\n` terminated lines and flushes after each one
pub struct ResponseEmitter<W: Write> {
    out: W,
}

impl<W: Write> ResponseEmitter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn emit(&mut self, response: Response) -> io::Result<()> {
        debug!("Responding: {}", response);
        writeln!(self.out, "{}", response)?;
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
