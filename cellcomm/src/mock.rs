//! Scripted link driver and manual clock for unit tests.

use crate::driver::{BlockRead, FlashRead, LinkDriver, WordRead};
use crate::error::{Error, Result};
use crate::result::RawCode;
use crate::timing::{CancelToken, Clock};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Route `log` output through the test harness.
pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// One recorded driver call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Open(String),
    Close,
    ReadWord(u8, u8),
    WriteWord(u8, u8, u16),
    ReadBlock(u8, u8),
    WriteBlock(u8, u8, Vec<u8>),
    FlashPrepare(u32, usize, bool),
    FlashFetch(usize, bool),
    FlashWrite(u32, Vec<u8>, bool),
    BoardVersion(String),
}

/// Clock that only advances when slept on.
#[derive(Debug, Clone, Default)]
pub(crate) struct ManualClock {
    millis: Arc<AtomicU64>,
    sleeps: Arc<Mutex<Vec<Duration>>>,
    cancel_on_sleep: Option<CancelToken>,
}

impl ManualClock {
    /// Clock that sets `token` the first time anything sleeps on it.
    pub(crate) fn cancelling(token: CancelToken) -> Self {
        Self {
            cancel_on_sleep: Some(token),
            ..Self::default()
        }
    }

    pub(crate) fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_millis(self.millis.load(Ordering::SeqCst))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn sleep(&self, duration: Duration) {
        self.millis
            .fetch_add(duration.as_millis() as u64, Ordering::SeqCst);
        self.sleeps.lock().unwrap().push(duration);
        if let Some(token) = &self.cancel_on_sleep {
            token.cancel();
        }
    }
}

/// Scripted replies and the call log, shared between a driver and its test.
#[derive(Debug, Default)]
pub(crate) struct Script {
    pub open: VecDeque<Result<bool>>,
    pub close: VecDeque<Result<()>>,
    pub read_word: VecDeque<Result<WordRead>>,
    pub write_word: VecDeque<Result<RawCode>>,
    pub read_block: VecDeque<Result<BlockRead>>,
    pub write_block: VecDeque<Result<RawCode>>,
    pub flash_prepare: VecDeque<Result<RawCode>>,
    pub flash_fetch: VecDeque<Result<FlashRead>>,
    pub flash_write: VecDeque<Result<RawCode>>,
    pub board_version: VecDeque<Result<Vec<u8>>>,
    /// Reply to `read_block` once its queue is empty.
    pub block_fallback: Option<BlockRead>,
    pub calls: Vec<(Duration, Call)>,
}

impl Script {
    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.iter().map(|(_, call)| call.clone()).collect()
    }

    pub(crate) fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|(_, call)| pred(call)).count()
    }
}

/// Link driver replaying a [`Script`].
///
/// Empty queues answer with a successful default; an empty `read_block`
/// queue answers with `block_fallback`, or a clean one-byte status.
#[derive(Debug, Clone, Default)]
pub(crate) struct ScriptedDriver {
    script: Arc<Mutex<Script>>,
    clock: ManualClock,
}

impl ScriptedDriver {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_clock(clock: ManualClock) -> Self {
        Self {
            script: Arc::default(),
            clock,
        }
    }

    pub(crate) fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap()
    }

    fn record(&self, call: Call) -> MutexGuard<'_, Script> {
        let mut script = self.script();
        let now = self.clock.now();
        script.calls.push((now, call));
        script
    }
}

pub(crate) fn fault() -> Error {
    Error::Driver("injected fault".into())
}

pub(crate) fn block(code: RawCode, data: &[u8]) -> BlockRead {
    BlockRead {
        code,
        data: data.to_vec(),
        check: 0,
    }
}

impl LinkDriver for ScriptedDriver {
    fn open_serial(&mut self, port: &str) -> Result<bool> {
        self.record(Call::Open(port.to_string()))
            .open
            .pop_front()
            .unwrap_or(Ok(true))
    }

    fn close_serial(&mut self) -> Result<()> {
        self.record(Call::Close).close.pop_front().unwrap_or(Ok(()))
    }

    fn read_word(&mut self, address: u8, command: u8) -> Result<WordRead> {
        self.record(Call::ReadWord(address, command))
            .read_word
            .pop_front()
            .unwrap_or(Ok(WordRead {
                code: RawCode::OK,
                value: 0,
            }))
    }

    fn write_word(&mut self, address: u8, command: u8, value: u16) -> Result<RawCode> {
        self.record(Call::WriteWord(address, command, value))
            .write_word
            .pop_front()
            .unwrap_or(Ok(RawCode::OK))
    }

    fn read_block(&mut self, address: u8, command: u8) -> Result<BlockRead> {
        let mut script = self.record(Call::ReadBlock(address, command));
        match script.read_block.pop_front() {
            Some(reply) => reply,
            None => Ok(script
                .block_fallback
                .clone()
                .unwrap_or_else(|| block(RawCode::OK, &[0x00]))),
        }
    }

    fn write_block(&mut self, address: u8, command: u8, data: &[u8]) -> Result<RawCode> {
        self.record(Call::WriteBlock(address, command, data.to_vec()))
            .write_block
            .pop_front()
            .unwrap_or(Ok(RawCode::OK))
    }

    fn flash_read_prepare(&mut self, address: u32, len: usize, pec: bool) -> Result<RawCode> {
        self.record(Call::FlashPrepare(address, len, pec))
            .flash_prepare
            .pop_front()
            .unwrap_or(Ok(RawCode::OK))
    }

    fn flash_read_fetch(&mut self, len: usize, pec: bool) -> Result<FlashRead> {
        self.record(Call::FlashFetch(len, pec))
            .flash_fetch
            .pop_front()
            .unwrap_or_else(|| {
                Ok(FlashRead {
                    code: RawCode::OK,
                    data: vec![0xFF; len],
                })
            })
    }

    fn flash_write(&mut self, address: u32, data: &[u8], pec: bool) -> Result<RawCode> {
        self.record(Call::FlashWrite(address, data.to_vec(), pec))
            .flash_write
            .pop_front()
            .unwrap_or(Ok(RawCode::OK))
    }

    fn board_version(&mut self, port: &str) -> Result<Vec<u8>> {
        self.record(Call::BoardVersion(port.to_string()))
            .board_version
            .pop_front()
            .unwrap_or_else(|| Ok(b"0.0\0".to_vec()))
    }
}
