//! Shared protocol constants for the eqxfer header transport

// Fixed header width: magic(4) | file_id(8) | eq_count(8) | flags(1) | eq_offset(4) | opt_hdr_count(2)
pub const HEADER_LEN: usize = 27;

// Default port of the receiving service
pub const DEFAULT_PORT: u16 = 5555;

// Largest greeting read from the peer on connect
pub const MAX_GREETING: usize = 1024;

// Terminator of the textual filename length line
pub const LENGTH_TERMINATOR: u8 = b'\n';

// Byte ranges of each header field within the encoded record
pub mod offsets {
    use std::ops::Range;

    pub const MAGIC: Range<usize> = 0..4;
    pub const FILE_ID: Range<usize> = 4..12;
    pub const EQUATION_COUNT: Range<usize> = 12..20;
    pub const FLAGS: usize = 20;
    pub const EQUATION_OFFSET: Range<usize> = 21..25;
    pub const OPTIONAL_HEADER_COUNT: Range<usize> = 25..27;
}

// Centralized timeout defaults; every one of them can be overridden per call
pub mod timeouts {
    // Connection establishment timeout (ms)
    pub const CONNECT_MS: u64 = 5_000;

    // Read/write timeout on an established connection (ms)
    pub const IO_MS: u64 = 30_000;

    // Delay added per retry attempt when dialing fails (ms)
    pub const RETRY_BACKOFF_MS: u64 = 200;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_cover_header_without_gaps() {
        assert_eq!(offsets::MAGIC.end, offsets::FILE_ID.start);
        assert_eq!(offsets::FILE_ID.end, offsets::EQUATION_COUNT.start);
        assert_eq!(offsets::EQUATION_COUNT.end, offsets::FLAGS);
        assert_eq!(offsets::FLAGS + 1, offsets::EQUATION_OFFSET.start);
        assert_eq!(offsets::EQUATION_OFFSET.end, offsets::OPTIONAL_HEADER_COUNT.start);
        assert_eq!(offsets::OPTIONAL_HEADER_COUNT.end, HEADER_LEN);
    }
}
