use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aya::maps::{HashMap, MapData};
use aya::programs::{Xdp, XdpFlags};

use ioamflow_common::ProbeKey;

mod api;
mod config;
mod state;

use config::{CliArgs, Config, XdpMode};
use state::FlowState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliArgs::parse();

    // Load config from file if provided, otherwise use defaults.
    let mut config = if let Some(ref config_path) = cli.config {
        Config::from_file(Path::new(config_path))?
    } else {
        Config::default()
    };
    config.merge_cli(&cli);

    // Logging.
    if config.quiet {
        tracing_subscriber::registry()
            .with(tracing_subscriber::EnvFilter::new("error"))
            .with(tracing_subscriber::fmt::layer())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(tracing_subscriber::EnvFilter::new(
                std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
            ))
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // ── eBPF setup ────────────────────────────────────────────────────
    let mut bpf = aya::Ebpf::load(aya::include_bytes_aligned!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../ioamflow-ebpf/target/bpfel-unknown-none/debug/ioamflow"
    )))?;

    // Surface the probe's parse diagnostics through tracing.
    if let Err(e) = aya_log::EbpfLogger::init(&mut bpf) {
        tracing::warn!("failed to initialize eBPF logger: {}", e);
    }

    let iface = config.interface.as_deref().unwrap_or("eth0");

    let program: &mut Xdp = bpf.program_mut("ioamflow").unwrap().try_into()?;
    program.load()?;
    program.attach(iface, xdp_flags(config.xdp_mode))?;
    tracing::info!("XDP probe attached to {} ({:?} mode)", iface, config.xdp_mode);

    // ── Flow map poller ───────────────────────────────────────────────
    let flow_stats: HashMap<MapData, ProbeKey, u64> =
        HashMap::try_from(bpf.take_map("FLOW_STATS").unwrap())?;

    let flow_state = Arc::new(FlowState::new());
    let poll_state = flow_state.clone();
    let poll_interval = config.poll_interval_seconds;
    tokio::spawn(async move {
        poll_flow_stats(flow_stats, poll_state, poll_interval).await;
    });

    // ── HTTP API ──────────────────────────────────────────────────────
    let app_state = Arc::new(api::AppState {
        flows: flow_state.clone(),
        start_time: std::time::Instant::now(),
    });
    let app = api::router(app_state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!("Server running on http://0.0.0.0:{}", config.port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Periodically snapshot the kernel flow map into the shared FlowState.
///
/// The map is only ever written by the probe; a snapshot taken mid-update
/// can miss an in-flight increment, which the next poll picks up.
async fn poll_flow_stats(
    flow_stats: HashMap<MapData, ProbeKey, u64>,
    state: Arc<FlowState>,
    poll_interval_seconds: u64,
) {
    let mut ticker = interval(Duration::from_secs(poll_interval_seconds.max(1)));
    loop {
        ticker.tick().await;

        let mut entries = Vec::new();
        let mut failed = false;
        for item in flow_stats.iter() {
            match item {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    tracing::warn!("flow map iteration failed: {}", e);
                    failed = true;
                    break;
                }
            }
        }
        if !failed {
            tracing::debug!("flow map refreshed: {} flows", entries.len());
            state.replace(entries);
        }
    }
}

fn xdp_flags(mode: XdpMode) -> XdpFlags {
    match mode {
        XdpMode::Auto => XdpFlags::default(),
        XdpMode::Skb => XdpFlags::SKB_MODE,
        XdpMode::Driver => XdpFlags::DRV_MODE,
        XdpMode::Hw => XdpFlags::HW_MODE,
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to wait for shutdown signal: {}", e);
        return;
    }
    tracing::info!("shutting down");
}
