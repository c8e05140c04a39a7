//! Serial session open/close.

use super::Controller;
use crate::driver::LinkDriver;
use crate::result::CommResult;
use log::{debug, info, warn};

impl<D: LinkDriver> Controller<D> {
    /// Open a session on `port`.
    ///
    /// Fails with `AlreadyOpen` (and leaves the current session untouched)
    /// if a session is already open.
    pub fn open(&mut self, port: &str) -> CommResult {
        if let Some(current) = &self.port {
            warn!("Cannot open {port}: session on {current} is still open");
            return CommResult::AlreadyOpen;
        }

        match self.call("open_serial", |d| d.open_serial(port)) {
            Ok(true) => {
                info!("Opened {port}");
                self.port = Some(port.to_string());
                CommResult::Success
            },
            Ok(false) => {
                warn!("Driver refused to open {port}");
                CommResult::FailedToOpenPort
            },
            Err(result) => result,
        }
    }

    /// Close the current session.
    ///
    /// Closing without an open session is a no-op reporting `Success`. The
    /// session is considered closed afterwards even if the driver faulted.
    pub fn close(&mut self) -> CommResult {
        let Some(port) = self.port.take() else {
            debug!("close: no open session");
            return CommResult::Success;
        };

        match self.call("close_serial", |d| d.close_serial()) {
            Ok(()) => {
                info!("Closed {port}");
                CommResult::Success
            },
            Err(result) => result,
        }
    }

    /// Whether a session is open.
    pub fn is_open(&self) -> bool {
        self.port.is_some()
    }

    /// Port of the open session.
    pub fn port(&self) -> Option<&str> {
        self.port.as_deref()
    }
}
