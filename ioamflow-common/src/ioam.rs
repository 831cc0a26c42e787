//! # In-band OAM option and pre-allocated trace header - RFC 9197 / RFC 9486
//!
//! The IOAM option rides inside a Hop-by-Hop Options header:
//!
//!  0                   1                   2                   3
//! 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |  Option Type  |  Opt Data Len |   Reserved    |   IOAM Type   |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!
//! and, for the pre-allocated trace IOAM type, is followed by the trace
//! header:
//!
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |        Namespace-ID           |NodeLen  | Flags | RemainingLen|
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |               IOAM-Trace-Type                 |  Reserved     |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                                                               |
//! .                         node data list                        .
//! |                                                               |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!
//! Node data is prepended: the most recently written node sits RemainingLen
//! 4-octet units into the data list, NodeLen 4-octet units long. Trace-Type
//! bit 2 marks a timestamp-seconds field in each node, bit 3 a
//! timestamp-subseconds field.

/// Hop-by-Hop option type carrying IOAM data.
pub const OPT_TYPE_IOAM: u8 = 49;

/// The length of the IOAM option header.
pub const OPT_LEN: usize = 4;

/// Byte offset of the IOAM type within the option header.
pub const OPT_IOAM_TYPE: usize = 3;

/// IOAM type for the pre-allocated trace option.
pub const IOAM_TYPE_PREALLOC: u8 = 0;

/// The length of the pre-allocated trace header, up to the node data list.
pub const TRACE_FIXED_LEN: usize = 8;

/// Byte offset of the NodeLen/Flags byte within the trace header.
pub const TRACE_NODELEN: usize = 2;

/// Byte offset of the RemainingLen byte within the trace header.
pub const TRACE_REMLEN: usize = 3;

/// Byte offset of the first Trace-Type byte within the trace header.
pub const TRACE_TYPE: usize = 4;

/// Trace-Type bit 2: each node carries a timestamp-seconds field.
pub const TRACE_TYPE_TSTAMP_SEC: u8 = 0x20;

/// Trace-Type bit 3: each node carries a timestamp-subseconds field.
pub const TRACE_TYPE_TSTAMP_FRAC: u8 = 0x10;

/// Extracts NodeLen (4-octet units) from the NodeLen/Flags byte.
#[inline]
pub fn node_len(byte: u8) -> usize {
    (byte >> 3) as usize
}

/// Extracts RemainingLen (4-octet units) from the RemainingLen byte.
#[inline]
pub fn remaining_len(byte: u8) -> usize {
    (byte & 0x7f) as usize
}
