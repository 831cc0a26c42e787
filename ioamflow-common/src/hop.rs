//! # IPv6 Hop-by-Hop Options Extension Header - RFC 8200
//!
//!  0                   1                   2                   3
//! 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |  Next Header  |  Hdr Ext Len  |                               |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+                               +
//! |                                                               |
//! .                            Options                            .
//! |                                                               |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+

/// The length of the Hop-by-Hop preamble (next header + header length).
pub const HOP_FIXED_LEN: usize = 2;

/// Returns the total length of the Hop-by-Hop header in bytes.
/// The Hdr Ext Len is in 8-octet units, *excluding* the first 8 octets.
/// So, total length = (hdr_ext_len + 1) * 8.
#[inline]
pub fn total_hdr_len(hdr_ext_len: u8) -> usize {
    (hdr_ext_len as usize + 1) << 3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_hdr_len() {
        assert_eq!(total_hdr_len(0), 8);
        assert_eq!(total_hdr_len(3), 32);
    }
}
