//! Fixed board command codes and erase payload encoding.

/// Command codes used by the status, erase and recovery operations.
///
/// The codes depend on the communication board firmware, so they can be
/// overridden from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CommandSet {
    /// Write command that clears the status register (empty payload).
    pub clear_status: u8,
    /// Read command returning the one-byte status register.
    pub read_status: u8,
    /// Block write erasing a range of code-ROM blocks.
    pub erase_code_rom: u8,
    /// Block write erasing one data-flash block.
    pub erase_data_flash: u8,
    /// Block write leaving firmware-update mode.
    pub escape_update: u8,
}

impl CommandSet {
    /// Default clear-status command.
    pub const CLEAR_STATUS: u8 = 0x0A;
    /// Default read-status command.
    pub const READ_STATUS: u8 = 0x0B;
    /// Default code-ROM erase command.
    pub const ERASE_CODE_ROM: u8 = 0x0C;
    /// Default data-flash erase command.
    pub const ERASE_DATA_FLASH: u8 = 0x0D;
    /// Default escape command.
    pub const ESCAPE_UPDATE: u8 = 0x0F;
}

impl Default for CommandSet {
    fn default() -> Self {
        Self {
            clear_status: Self::CLEAR_STATUS,
            read_status: Self::READ_STATUS,
            erase_code_rom: Self::ERASE_CODE_ROM,
            erase_data_flash: Self::ERASE_DATA_FLASH,
            escape_update: Self::ESCAPE_UPDATE,
        }
    }
}

/// Area of flash targeted by an erase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EraseRequest {
    /// Code-ROM blocks `start..=end`.
    CodeRom {
        /// First block.
        start: u8,
        /// Last block (inclusive).
        end: u8,
    },
    /// A single data-flash block.
    DataFlash {
        /// Block number.
        block: u8,
    },
}

impl EraseRequest {
    /// Command code and payload for this request.
    pub fn encode(&self, commands: &CommandSet) -> (u8, Vec<u8>) {
        match *self {
            Self::CodeRom { start, end } => (commands.erase_code_rom, vec![start, end]),
            Self::DataFlash { block } => (commands.erase_data_flash, vec![block]),
        }
    }
}
