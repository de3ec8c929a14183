//! Per-file frame: textual length line, raw name bytes, packed header.

use std::io::{ErrorKind, Write};

use crate::error::{Result, SendStep, TransferError};
use crate::header::FileHeader;
use crate::protocol::LENGTH_TERMINATOR;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub name: String,
    pub header: FileHeader,
}

impl Frame {
    pub fn new<S: Into<String>>(name: S, header: FileHeader) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(TransferError::EmptyName);
        }
        Ok(Self { name, header })
    }

    /// `"<byte length of name>\n"`
    pub fn name_prefix(&self) -> Vec<u8> {
        let mut line = self.name.len().to_string().into_bytes();
        line.push(LENGTH_TERMINATOR);
        line
    }

    pub fn wire_len(&self) -> usize {
        self.name_prefix().len() + self.name.len() + FileHeader::LEN
    }

    /// Exact bytes this frame puts on the wire.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.wire_len());
        buf.extend_from_slice(&self.name_prefix());
        buf.extend_from_slice(self.name.as_bytes());
        buf.extend_from_slice(&self.header.encode());
        buf
    }

    /// Write the three parts in order, each one completely, and flush.
    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<usize> {
        let prefix = self.name_prefix();
        let mut total = write_step(w, SendStep::LengthLine, &prefix)?;
        total += write_step(w, SendStep::Name, self.name.as_bytes())?;
        total += write_step(w, SendStep::Header, &self.header.encode())?;
        w.flush()?;
        Ok(total)
    }
}

// Loop until the transport has taken every byte; a zero-length write means it never will.
fn write_step<W: Write>(w: &mut W, step: SendStep, buf: &[u8]) -> Result<usize> {
    let mut written = 0;
    while written < buf.len() {
        match w.write(&buf[written..]) {
            Ok(0) => {
                return Err(TransferError::PartialSend {
                    step,
                    written,
                    expected: buf.len(),
                })
            }
            Ok(n) => written += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(TransferError::Io(e)),
        }
    }
    Ok(written)
}
