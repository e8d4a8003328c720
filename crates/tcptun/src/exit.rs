use std::fmt;
use std::io;

use tcptun_frame::FrameError;
use tcptun_relay::RelayError;
use tcptun_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const HEALTH_CHECK_FAILED: i32 = 30;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

fn io_code(err: &io::Error, fallback: i32) -> i32 {
    match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        _ => fallback,
    }
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    let code = match &err {
        TransportError::InterfaceNameTooLong { .. }
        | TransportError::MtuOutOfRange { .. } => USAGE,
        other => other
            .io_source()
            .map_or(TRANSPORT_ERROR, |source| io_code(source, TRANSPORT_ERROR)),
    };
    CliError::new(code, format!("{context}: {err}"))
}

fn frame_code(err: &FrameError) -> i32 {
    match err {
        FrameError::Io(source) => io_code(source, FAILURE),
        FrameError::PacketTooLarge { .. } => DATA_INVALID,
        FrameError::ConnectionClosed | FrameError::Truncated { .. } => FAILURE,
    }
}

pub fn relay_error(context: &str, err: RelayError) -> CliError {
    let code = match &err {
        RelayError::Transfer { source, .. } => frame_code(source),
        RelayError::InvalidConfig(_) => USAGE,
        RelayError::ShortDeviceWrite { .. } => FAILURE,
        RelayError::Wait(_) | RelayError::Signal(_) => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}
