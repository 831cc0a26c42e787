#![no_std]
#![no_main]

use aya_ebpf::{
    bindings::{xdp_action, BPF_NOEXIST},
    helpers::bpf_ktime_get_ns,
    macros::{map, xdp},
    maps::HashMap,
    programs::XdpContext,
};
use aya_log_ebpf::warn;
use ioamflow_common::{
    decode::{decode, Layer},
    table::{observe, FlowTable},
    ProbeKey, MAX_FLOW_ENTRIES,
};

#[no_mangle]
#[link_section = "license"]
pub static _license: [u8; 4] = *b"GPL\0";

/// Per-flow packet counters, keyed by the raw ProbeKey bytes. Read by the
/// userspace agent; entries live until the map does.
#[map]
static FLOW_STATS: HashMap<ProbeKey, u64> =
    HashMap::<ProbeKey, u64>::with_max_entries(MAX_FLOW_ENTRIES, 0);

/// FlowTable over the BPF hash map. Insert-if-absent maps to BPF_NOEXIST,
/// which the kernel resolves race-free; the increment itself is a plain
/// read-modify-write and may undercount under contention.
struct FlowStatsMap;

impl FlowTable for FlowStatsMap {
    fn lookup(&mut self, key: &ProbeKey) -> Option<&mut u64> {
        FLOW_STATS
            .get_ptr_mut(key)
            .map(|count| unsafe { &mut *count })
    }

    fn insert_if_absent(&mut self, key: &ProbeKey, count: u64) -> bool {
        FLOW_STATS.insert(key, &count, BPF_NOEXIST as u64).is_ok()
    }
}

/// XDP entry point. Every frame passes through unmodified in structure;
/// SRv6 IOAM frames additionally get counted and their trace timestamps
/// refreshed in place.
#[xdp]
pub fn ioamflow(ctx: XdpContext) -> u32 {
    let data = ctx.data();
    let data_end = ctx.data_end();
    let frame = unsafe { core::slice::from_raw_parts_mut(data as *mut u8, data_end - data) };

    let mut key = ProbeKey::zeroed();
    match decode(frame, unsafe { bpf_ktime_get_ns() }, &mut key) {
        Ok(()) => {
            // a full table forfeits counting for this frame, nothing more
            let _ = observe(&mut FlowStatsMap, &key);
        }
        Err(err) => match err.layer() {
            Layer::Srh => warn!(&ctx, "failed to parse segment routing header"),
            Layer::Trace => warn!(&ctx, "failed to parse ioam trace header"),
            _ => {}
        },
    }

    xdp_action::XDP_PASS
}

#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    unsafe { core::hint::unreachable_unchecked() }
}
