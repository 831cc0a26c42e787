use std::process::Command;

use anyhow::{ensure, Context as _};
use clap::{Args, Parser};

#[derive(Parser)]
enum Cli {
    /// Build the eBPF probe for bpfel-unknown-none.
    BuildEbpf(BuildOpts),
    /// Build the eBPF probe, then the userspace workspace.
    Build(BuildOpts),
    /// Build everything and run the agent with sudo.
    Run {
        #[command(flatten)]
        opts: BuildOpts,
        /// Extra arguments passed to the agent binary.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

#[derive(Args, Clone, Copy)]
struct BuildOpts {
    /// Build in release mode.
    #[arg(long)]
    release: bool,
}

fn main() -> anyhow::Result<()> {
    match Cli::parse() {
        Cli::BuildEbpf(opts) => build_ebpf(opts),
        Cli::Build(opts) => {
            build_ebpf(opts)?;
            build_userspace(opts)
        }
        Cli::Run { opts, args } => {
            build_ebpf(opts)?;
            build_userspace(opts)?;
            run(opts, &args)
        }
    }
}

fn build_ebpf(opts: BuildOpts) -> anyhow::Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.current_dir(concat!(env!("CARGO_MANIFEST_DIR"), "/../ioamflow-ebpf"));
    cmd.args([
        "+nightly",
        "build",
        "--target",
        "bpfel-unknown-none",
        "-Z",
        "build-std=core",
    ]);
    if opts.release {
        cmd.arg("--release");
    }
    let status = cmd.status().context("failed to run cargo build for eBPF")?;
    ensure!(status.success(), "eBPF build failed");
    Ok(())
}

fn build_userspace(opts: BuildOpts) -> anyhow::Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.args(["build", "--workspace"]);
    if opts.release {
        cmd.arg("--release");
    }
    let status = cmd
        .status()
        .context("failed to run cargo build for workspace")?;
    ensure!(status.success(), "workspace build failed");
    Ok(())
}

fn run(opts: BuildOpts, extra_args: &[String]) -> anyhow::Result<()> {
    let profile = if opts.release { "release" } else { "debug" };
    let bin = format!("target/{profile}/ioamflow");

    let mut cmd = Command::new("sudo");
    cmd.arg(&bin);
    cmd.args(extra_args);
    let status = cmd.status().context("failed to run ioamflow")?;
    ensure!(status.success(), "ioamflow exited with error");
    Ok(())
}
