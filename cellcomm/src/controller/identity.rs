//! Board version retrieval.

use super::Controller;
use crate::driver::LinkDriver;
use crate::result::CommResult;
use log::debug;

/// Decode a fixed-size version buffer as a NUL-terminated narrow string.
///
/// Bytes are copied one-to-one into characters up to the first zero byte;
/// everything after it is ignored. A buffer without a zero byte is decoded
/// entirely.
pub fn decode_version_string(raw: &[u8]) -> String {
    raw.iter()
        .take_while(|&&b| b != 0)
        .map(|&b| char::from(b))
        .collect()
}

impl<D: LinkDriver> Controller<D> {
    /// Read the version string of the board behind the open session.
    pub fn board_version(&mut self) -> Result<String, CommResult> {
        let port = self.port.clone().ok_or(CommResult::NotOpen)?;
        let raw = self.call("board_version", |d| d.board_version(&port))?;
        let version = decode_version_string(&raw);
        debug!("Board on {port} reports version {version:?}");
        Ok(version)
    }
}
