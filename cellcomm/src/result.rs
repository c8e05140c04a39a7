//! Public result taxonomy and raw driver code translation.

use std::fmt;

/// Outcome of every public communication operation.
///
/// The taxonomy is flat: discovery verdicts live next to transport failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommResult {
    /// The operation completed.
    Success,
    /// The driver reported a communication, checksum or framing error.
    Failure,
    /// Discovery found at least one board.
    PortDetected,
    /// Discovery found no board.
    PortNotDetected,
    /// The driver could not open the serial port.
    FailedToOpenPort,
    /// The operation was aborted through a cancel token.
    OperationCanceled,
    /// The driver returned a code this layer does not know.
    OtherError,
    /// The driver faulted at the call site.
    ExceptionCaught,
    /// `open` was called while a session is already open.
    AlreadyOpen,
    /// A device operation was attempted without an open session.
    NotOpen,
}

impl CommResult {
    /// Whether this is a positive outcome (`Success` or `PortDetected`).
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success | Self::PortDetected)
    }

    /// Convert into a `Result`, keeping any non-success code as the error.
    pub fn into_result(self) -> std::result::Result<(), Self> {
        if self.is_success() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for CommResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Success => "success",
            Self::Failure => "communication failure",
            Self::PortDetected => "port detected",
            Self::PortNotDetected => "port not detected",
            Self::FailedToOpenPort => "failed to open port",
            Self::OperationCanceled => "operation canceled",
            Self::OtherError => "unrecognized driver result",
            Self::ExceptionCaught => "driver fault",
            Self::AlreadyOpen => "session already open",
            Self::NotOpen => "session not open",
        };
        f.write_str(text)
    }
}

/// Raw outcome code reported by a link driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawCode(pub i32);

impl RawCode {
    /// Transaction completed.
    pub const OK: Self = Self(0);
    /// Bus communication error (no acknowledge, timeout).
    pub const COMM_ERROR: Self = Self(1);
    /// Packet error checking mismatch.
    pub const CHECKSUM_ERROR: Self = Self(2);
    /// Malformed frame on the link.
    pub const FRAMING_ERROR: Self = Self(3);
    /// The serial handle could not be opened.
    pub const PORT_OPEN_FAILED: Self = Self(4);
    /// The driver aborted the transaction on request.
    pub const CANCELED: Self = Self(5);
}

/// Map a raw driver code into the public taxonomy.
///
/// Total over `i32`; anything not listed in [`RawCode`] becomes
/// [`CommResult::OtherError`].
pub fn translate(raw: RawCode) -> CommResult {
    match raw {
        RawCode::OK => CommResult::Success,
        RawCode::COMM_ERROR | RawCode::CHECKSUM_ERROR | RawCode::FRAMING_ERROR => {
            CommResult::Failure
        },
        RawCode::PORT_OPEN_FAILED => CommResult::FailedToOpenPort,
        RawCode::CANCELED => CommResult::OperationCanceled,
        _ => CommResult::OtherError,
    }
}

impl From<RawCode> for CommResult {
    fn from(raw: RawCode) -> Self {
        translate(raw)
    }
}

/// Class of commands the board currently accepts.
///
/// Tracked for callers; the controller does not reject commands based on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OperationMode {
    /// Regular data access.
    #[default]
    Normal,
    /// Firmware update in progress.
    FlashUpdate,
    /// Sealed/protected access level.
    Protected,
    /// Board reported an error condition.
    Error,
}

impl fmt::Display for OperationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::FlashUpdate => write!(f, "flash update"),
            Self::Protected => write!(f, "protected"),
            Self::Error => write!(f, "error"),
        }
    }
}
