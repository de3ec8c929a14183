//! Fixed 27-byte header of the equation file format.
//!
//! Layout: MAGIC (4) | FILE_ID (8) | EQ_COUNT (8) | FLAGS (1) | EQ_OFFSET (4) | OPT_HDR_COUNT (2)
//! Numeric fields are little-endian. No field is validated on decode.

use std::fmt;
use std::io::Read;

use crate::error::{Result, TransferError};
use crate::protocol::{offsets, HEADER_LEN};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileHeader {
    pub magic_number: [u8; 4],
    pub file_id: [u8; 8],
    pub equation_count: u64,
    pub flags: u8,
    pub equation_offset: u32,
    pub optional_header_count: u16,
}

impl FileHeader {
    pub const LEN: usize = HEADER_LEN;

    /// Parse the first 27 bytes of `bytes`; anything after that is left to the caller.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(TransferError::TruncatedInput {
                needed: HEADER_LEN,
                got: bytes.len(),
            });
        }
        let mut magic_number = [0u8; 4];
        magic_number.copy_from_slice(&bytes[offsets::MAGIC]);
        let mut file_id = [0u8; 8];
        file_id.copy_from_slice(&bytes[offsets::FILE_ID]);
        let mut eq_count = [0u8; 8];
        eq_count.copy_from_slice(&bytes[offsets::EQUATION_COUNT]);
        let mut eq_offset = [0u8; 4];
        eq_offset.copy_from_slice(&bytes[offsets::EQUATION_OFFSET]);
        let mut opt_count = [0u8; 2];
        opt_count.copy_from_slice(&bytes[offsets::OPTIONAL_HEADER_COUNT]);

        Ok(Self {
            magic_number,
            file_id,
            equation_count: u64::from_le_bytes(eq_count),
            flags: bytes[offsets::FLAGS],
            equation_offset: u32::from_le_bytes(eq_offset),
            optional_header_count: u16::from_le_bytes(opt_count),
        })
    }

    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[offsets::MAGIC].copy_from_slice(&self.magic_number);
        out[offsets::FILE_ID].copy_from_slice(&self.file_id);
        out[offsets::EQUATION_COUNT].copy_from_slice(&self.equation_count.to_le_bytes());
        out[offsets::FLAGS] = self.flags;
        out[offsets::EQUATION_OFFSET].copy_from_slice(&self.equation_offset.to_le_bytes());
        out[offsets::OPTIONAL_HEADER_COUNT]
            .copy_from_slice(&self.optional_header_count.to_le_bytes());
        out
    }

    /// Read just the header region from `reader` (typically an open file).
    ///
    /// A source that ends early yields `TruncatedInput` with the number of
    /// bytes that were actually available.
    pub fn read_from<R: Read>(reader: R) -> Result<Self> {
        let mut buf = Vec::with_capacity(HEADER_LEN);
        reader.take(HEADER_LEN as u64).read_to_end(&mut buf)?;
        Self::decode(&buf)
    }

    pub fn magic_u32(&self) -> u32 {
        u32::from_le_bytes(self.magic_number)
    }

    pub fn file_id_u64(&self) -> u64 {
        u64::from_le_bytes(self.file_id)
    }

    /// Per-field hex dump in on-wire byte order.
    pub fn hex_fields(&self) -> Vec<(&'static str, String)> {
        let raw = self.encode();
        vec![
            ("magic", hex(&raw[offsets::MAGIC])),
            ("file_id", hex(&raw[offsets::FILE_ID])),
            ("equation_count", hex(&raw[offsets::EQUATION_COUNT])),
            ("flags", hex(&raw[offsets::FLAGS..offsets::FLAGS + 1])),
            ("equation_offset", hex(&raw[offsets::EQUATION_OFFSET])),
            ("optional_header_count", hex(&raw[offsets::OPTIONAL_HEADER_COUNT])),
        ]
    }
}

impl fmt::Display for FileHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<String> = self
            .hex_fields()
            .into_iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();
        write!(f, "{}", fields.join(" "))
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
