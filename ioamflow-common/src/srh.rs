//! # IPv6 Segment Routing Header - RFC 8754
//!
//!  0                   1                   2                   3
//! 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |  Next Header  |  Hdr Ext Len  |  Routing Type | Segments Left |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |  Last Entry   |     Flags     |              Tag              |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                                                               |
//! |            Segment List[0] (128-bit IPv6 address)             |
//! |                                                               |
//! |                                                               |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!                               ...
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                                                               |
//! |            Segment List[n] (128-bit IPv6 address)             |
//! |                                                               |
//! |                                                               |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+

/// The length of the fixed (non-segment-list) portion of the SRH.
pub const SRH_FIXED_LEN: usize = 8;

/// Routing Type value identifying a Segment Routing Header.
pub const ROUTING_TYPE_SRH: u8 = 4;

/// The length of one segment-list entry.
pub const SEGMENT_LEN: usize = 16;

/// Byte offsets of the fixed SRH fields.
pub const NEXT_HDR: usize = 0;
pub const HDR_EXT_LEN: usize = 1;
pub const ROUTING_TYPE: usize = 2;
pub const SEGMENTS_LEFT: usize = 3;
pub const LAST_ENTRY: usize = 4;
pub const FLAGS: usize = 5;
pub const TAG: usize = 6;

/// Returns the total length of the SRH in bytes.
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
        // two 16-byte segments
        assert_eq!(total_hdr_len(4), 40);
        assert_eq!(total_hdr_len(255), (255 + 1) * 8);
    }

    #[test]
    fn legacy_offset_adjustment_lands_16_bytes_short() {
        // The layout computation this decoder replaced located the header
        // following the SRH at fixed-portion-end + hdr_ext_len * 8 - 16,
        // i.e. 16 bytes before the SRH's true end, for every hdr_ext_len.
        for hdr_ext_len in [2u8, 4, 6, 20] {
            let legacy = SRH_FIXED_LEN + hdr_ext_len as usize * 8 - 16;
            assert_eq!(total_hdr_len(hdr_ext_len), legacy + 16);
        }
    }
}
