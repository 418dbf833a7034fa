// Text protocol spoken on the command link
//
// Provides:
// - Command line parsing and formatting
// - Response lines (acks, errors, ready banner)
// - Line framing for polled serial reads

pub mod command;
pub mod framing;
pub mod response;

pub use command::{Command, parse};
pub use framing::LineBuffer;
pub use response::{ErrorKind, Response, ResponseEmitter};
