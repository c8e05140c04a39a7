//! Session controller for one communication board.
//!
//! A [`Controller`] exclusively owns its [`LinkDriver`]. Every operation
//! takes `&mut self`, so at most one transaction is ever in flight on the
//! link. To share a controller between threads, wrap it in a `Mutex`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use cellcomm::{CommResult, Controller, EraseRequest, LinkDriver};
//!
//! fn reflash<D: LinkDriver>(driver: D, image: &[u8]) -> Result<(), CommResult> {
//!     let mut board = Controller::new(driver);
//!     board.open("COM3").into_result()?;
//!
//!     board
//!         .erase(0x16, EraseRequest::CodeRom { start: 0, end: 3 })
//!         .into_result()?;
//!     board.page_write(0x0000, image, true).into_result()?;
//!
//!     board.close().into_result()
//! }
//! ```

mod flash;
mod identity;
mod recovery;
mod session;
mod status;
mod transfer;

pub use identity::decode_version_string;
pub use transfer::Block;

use crate::commands::CommandSet;
use crate::driver::LinkDriver;
use crate::error::Result;
use crate::result::{CommResult, OperationMode};
use crate::timing::{CancelToken, Clock, SystemClock, Timing};
use log::{debug, warn};
use std::time::Duration;

/// Controller driving one board through an exclusively owned link driver.
///
/// Generic over the driver type `D`, so tests can substitute a scripted driver.
pub struct Controller<D: LinkDriver> {
    driver: D,
    port: Option<String>,
    mode: OperationMode,
    timing: Timing,
    commands: CommandSet,
    clock: Box<dyn Clock>,
    cancel: CancelToken,
}

impl<D: LinkDriver> Controller<D> {
    /// Create a controller with default timing and command codes.
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            port: None,
            mode: OperationMode::Normal,
            timing: Timing::default(),
            commands: CommandSet::default(),
            clock: Box::new(SystemClock::new()),
            cancel: CancelToken::new(),
        }
    }

    /// Override the timing policy.
    ///
    /// A zero poll interval is raised to
    /// [`MIN_POLL_INTERVAL`](crate::timing::MIN_POLL_INTERVAL) when used.
    #[must_use]
    pub fn with_timing(mut self, timing: Timing) -> Self {
        if let Err(e) = timing.validate() {
            warn!("Timing policy is invalid: {e}");
        }
        self.timing = timing;
        self
    }

    /// Override the fixed command codes.
    #[must_use]
    pub fn with_commands(mut self, commands: CommandSet) -> Self {
        self.commands = commands;
        self
    }

    /// Replace the clock used for delays and timeouts.
    #[must_use]
    pub fn with_clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Use `token` to abort waits inside long operations.
    #[must_use]
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token aborting waits of this controller.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Active timing policy.
    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    /// Active command codes.
    pub fn commands(&self) -> &CommandSet {
        &self.commands
    }

    /// Mode the caller declared the board to be in.
    pub fn mode(&self) -> OperationMode {
        self.mode
    }

    /// Declare the board's current mode.
    pub fn set_mode(&mut self, mode: OperationMode) {
        debug!("Operation mode {} -> {mode}", self.mode);
        self.mode = mode;
    }

    /// Get a reference to the underlying driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Run one driver call, folding a fault into `ExceptionCaught`.
    fn call<T>(
        &mut self,
        op: &str,
        f: impl FnOnce(&mut D) -> Result<T>,
    ) -> std::result::Result<T, CommResult> {
        f(&mut self.driver).map_err(|e| {
            warn!("{op} faulted: {e}");
            CommResult::ExceptionCaught
        })
    }

    fn ensure_open(&self, op: &str) -> std::result::Result<(), CommResult> {
        if self.port.is_some() {
            Ok(())
        } else {
            debug!("{op} rejected: no open session");
            Err(CommResult::NotOpen)
        }
    }

    fn ensure_not_cancelled(&self, op: &str) -> std::result::Result<(), CommResult> {
        if self.cancel.is_cancelled() {
            debug!("{op} skipped: cancellation requested");
            Err(CommResult::OperationCanceled)
        } else {
            Ok(())
        }
    }

    /// Block for `duration` unless cancelled. Returns `false` when cancelled.
    fn pause(&self, duration: Duration) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        self.clock.sleep(duration);
        !self.cancel.is_cancelled()
    }
}

impl<D: LinkDriver> Drop for Controller<D> {
    fn drop(&mut self) {
        if let Some(port) = self.port.take() {
            debug!("Closing {port} on drop");
            if let Err(e) = self.driver.close_serial() {
                warn!("Failed to close {port}: {e}");
            }
        }
    }
}
