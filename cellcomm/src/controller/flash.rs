//! Flash page access and block erase.
//!
//! Erase is physically slow and occasionally flaky on the board side:
//!
//! ```text
//! erase cmd --fail--> wait retry_delay --> erase cmd --fail--> Failure
//!     |                                        |
//!     ok                                       ok
//!     +--------------------+-------------------+
//!                          v
//!        poll status every poll_interval
//!          0x00                  -> Success
//!          erase_timeout passed  -> Failure (status taken as 0xFF)
//! ```

use super::Controller;
use super::status::{STATUS_CLEAN, STATUS_INDETERMINATE};
use crate::commands::EraseRequest;
use crate::driver::LinkDriver;
use crate::result::{CommResult, translate};
use log::{debug, info, trace, warn};

impl<D: LinkDriver> Controller<D> {
    /// Read `length` bytes of flash at `address`.
    ///
    /// Reads longer than the buffering threshold wait for the page buffering
    /// delay between the prepare and fetch commands. `pec` selects the
    /// packet-error-checked variant of both commands.
    pub fn page_read(
        &mut self,
        address: u32,
        length: usize,
        pec: bool,
    ) -> Result<Vec<u8>, CommResult> {
        self.ensure_open("page_read")?;
        self.ensure_not_cancelled("page_read")?;

        let code = self.call("flash_read_prepare", |d| {
            d.flash_read_prepare(address, length, pec)
        })?;
        translate(code).into_result().inspect_err(|result| {
            debug!("Page read prepare at {address:#010x} failed: {result}");
        })?;

        if length > self.timing.page_buffer_threshold {
            let delay = self.timing.page_buffer_delay();
            trace!("Waiting {delay:?} for {length} byte(s) to buffer");
            if !self.pause(delay) {
                warn!("Page read at {address:#010x} canceled");
                return Err(CommResult::OperationCanceled);
            }
        }

        let reply = self.call("flash_read_fetch", |d| d.flash_read_fetch(length, pec))?;
        translate(reply.code).into_result().inspect_err(|result| {
            debug!("Page read fetch at {address:#010x} failed: {result}");
        })?;

        trace!("Read {} byte(s) at {address:#010x}", reply.data.len());
        Ok(reply.data)
    }

    /// Write `data` to flash at `address`.
    pub fn page_write(&mut self, address: u32, data: &[u8], pec: bool) -> CommResult {
        if let Err(result) = self.ensure_open("page_write") {
            return result;
        }
        match self.call("flash_write", |d| d.flash_write(address, data, pec)) {
            Ok(code) => {
                trace!("Wrote {} byte(s) at {address:#010x}: {code:?}", data.len());
                translate(code)
            },
            Err(result) => result,
        }
    }

    /// Erase code-ROM blocks `start..=end` on the device at `address`.
    pub fn erase_code_rom(&mut self, address: u8, start: u8, end: u8) -> CommResult {
        self.erase(address, EraseRequest::CodeRom { start, end })
    }

    /// Erase one data-flash block on the device at `address`.
    pub fn erase_data_flash(&mut self, address: u8, block: u8) -> CommResult {
        self.erase(address, EraseRequest::DataFlash { block })
    }

    /// Erase flash and wait for the board to confirm completion.
    ///
    /// The erase command is retried exactly once after the retry delay. A
    /// successful command is confirmed by polling the status register until
    /// it reads `0x00` or the erase timeout passes. Nothing is sent once the
    /// cancel token is set.
    pub fn erase(&mut self, address: u8, request: EraseRequest) -> CommResult {
        if let Err(result) = self
            .ensure_open("erase")
            .and_then(|()| self.ensure_not_cancelled("erase"))
        {
            return result;
        }
        let (command, payload) = request.encode(&self.commands);
        debug!("Erasing {request:?} on {address:#04x}");

        let mut result = self.write_block(address, command, &payload);
        if !result.is_success() {
            let delay = self.timing.retry_delay();
            warn!("Erase command failed ({result}), retrying in {delay:?}");
            if !self.pause(delay) {
                warn!("Erase of {request:?} canceled before retry");
                return CommResult::OperationCanceled;
            }
            result = self.write_block(address, command, &payload);
        }

        if !result.is_success() {
            warn!("Erase command failed twice: {result}");
            return result;
        }

        self.confirm_erase(address)
    }

    /// Poll the status register until it reads clean or the timeout passes.
    fn confirm_erase(&mut self, address: u8) -> CommResult {
        let timeout = self.timing.erase_timeout();
        let interval = self.timing.poll_interval();
        let start = self.clock.now();

        loop {
            match self.read_status(address) {
                Ok(STATUS_CLEAN) => {
                    info!(
                        "Erase confirmed after {:?}",
                        self.clock.now().saturating_sub(start)
                    );
                    return CommResult::Success;
                },
                Ok(status) => trace!("Erase pending, status {status:#04x}"),
                Err(result) => trace!("Erase pending, status read failed: {result}"),
            }

            let elapsed = self.clock.now().saturating_sub(start);
            if elapsed > timeout {
                warn!(
                    "Erase not confirmed within {timeout:?}, status taken as \
                     {STATUS_INDETERMINATE:#04x}"
                );
                return CommResult::Failure;
            }

            if !self.pause(interval) {
                warn!("Erase confirmation canceled after {elapsed:?}");
                return CommResult::OperationCanceled;
            }
        }
    }
}
