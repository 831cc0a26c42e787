use dashmap::DashMap;
use serde::Serialize;
use std::net::Ipv6Addr;
use std::sync::atomic::{AtomicI64, Ordering};

use ioamflow_common::{ProbeKey, MAX_SEGMENTLIST_ENTRIES};

/// One flow as reported by the API: the kernel-side ProbeKey rendered for
/// humans, plus its packet count.
#[derive(Debug, Clone, Serialize)]
pub struct FlowRecord {
    pub src_mac: String,
    pub dst_mac: String,
    pub src_addr: String,
    pub dst_addr: String,
    pub segments_left: u8,
    pub last_entry: u8,
    pub flags: u8,
    pub tag: u16,
    pub segments: Vec<String>,
    pub tstamp_second: u32,
    pub tstamp_subsecond: u32,
    pub packets: u64,
}

impl FlowRecord {
    /// Convert a kernel-side ProbeKey and its counter into a record.
    ///
    /// Only the meaningful `0..=last_entry` slice of the segment list is
    /// rendered; slots past the copy cap do not exist in the key.
    pub fn from_probe(key: &ProbeKey, packets: u64) -> Self {
        let segments = key
            .segments
            .iter()
            .take((key.last_entry as usize + 1).min(MAX_SEGMENTLIST_ENTRIES))
            .map(|segment| Ipv6Addr::from(*segment).to_string())
            .collect();
        Self {
            src_mac: format_mac(&key.src_mac),
            dst_mac: format_mac(&key.dst_mac),
            src_addr: Ipv6Addr::from(key.src_addr).to_string(),
            dst_addr: Ipv6Addr::from(key.dst_addr).to_string(),
            segments_left: key.segments_left,
            last_entry: key.last_entry,
            flags: key.flags,
            tag: key.tag,
            segments,
            tstamp_second: key.tstamp_second,
            tstamp_subsecond: key.tstamp_subsecond,
            packets,
        }
    }
}

fn format_mac(mac: &[u8; 6]) -> String {
    format!(
        "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
        mac[0], mac[1], mac[2], mac[3], mac[4], mac[5]
    )
}

/// Latest snapshot of the kernel flow map, shared between the poller and
/// the API handlers.
pub struct FlowState {
    flows: DashMap<ProbeKey, u64>,
    last_refresh_ms: AtomicI64,
}

impl FlowState {
    pub fn new() -> Self {
        Self {
            flows: DashMap::new(),
            last_refresh_ms: AtomicI64::new(0),
        }
    }

    /// Replace the snapshot with the latest map contents.
    pub fn replace(&self, entries: Vec<(ProbeKey, u64)>) {
        self.flows.clear();
        for (key, count) in entries {
            self.flows.insert(key, count);
        }
        self.last_refresh_ms
            .store(chrono::Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    /// All flows, most packets first.
    pub fn records(&self) -> Vec<FlowRecord> {
        let mut records: Vec<FlowRecord> = self
            .flows
            .iter()
            .map(|entry| FlowRecord::from_probe(entry.key(), *entry.value()))
            .collect();
        records.sort_by(|a, b| b.packets.cmp(&a.packets));
        records
    }

    pub fn flow_count(&self) -> usize {
        self.flows.len()
    }

    pub fn total_packets(&self) -> u64 {
        self.flows.iter().map(|entry| *entry.value()).sum()
    }

    pub fn last_refresh_ms(&self) -> i64 {
        self.last_refresh_ms.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_key() -> ProbeKey {
        let mut key = ProbeKey::zeroed();
        key.src_mac = [0x02, 0, 0, 0, 0, 0x01];
        key.dst_mac = [0x02, 0, 0, 0, 0, 0x02];
        key.src_addr[0] = 0xfc;
        key.src_addr[15] = 0x01;
        key.last_entry = 1;
        key.segments[0][15] = 0xaa;
        key.segments[1][15] = 0xbb;
        key.tag = 42;
        key
    }

    #[test]
    fn record_renders_addresses_and_segment_slice() {
        let record = FlowRecord::from_probe(&sample_key(), 7);
        assert_eq!(record.src_mac, "02:00:00:00:00:01");
        assert_eq!(record.src_addr, "fc00::1");
        assert_eq!(record.segments, vec!["::aa", "::bb"]);
        assert_eq!(record.tag, 42);
        assert_eq!(record.packets, 7);
    }

    #[test]
    fn records_sort_by_packet_count() {
        let state = FlowState::new();
        let mut busy = sample_key();
        busy.tag = 1;
        let mut quiet = sample_key();
        quiet.tag = 2;
        state.replace(vec![(quiet, 3), (busy, 90)]);

        let records = state.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].packets, 90);
        assert_eq!(records[1].packets, 3);
        assert_eq!(state.total_packets(), 93);
        assert_eq!(state.flow_count(), 2);
    }

    #[test]
    fn replace_drops_stale_entries() {
        let state = FlowState::new();
        state.replace(vec![(sample_key(), 1)]);
        state.replace(Vec::new());
        assert_eq!(state.flow_count(), 0);
        assert!(state.last_refresh_ms() > 0);
    }
}
