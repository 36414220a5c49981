use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use flowmgr_config::FlowMgrConfig;
use flowmgr_core::ResourceKind;
use flowmgr_registry::{DeviceRegistry, NicDevice, PortSpec, RegistryError};
use flowmgr_telemetry::logging::EventLogger;
use flowmgr_telemetry::metrics::MetricsRecorder;
use tracing::info;

use crate::error::CliError;
use crate::stress;

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Configuration file; without it `config/flowmgr.yaml` and `FLOWMGR_*` are used
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Bring up the configured devices and dump their resource tables
    Inspect(InspectArgs),
    /// Allocate and release flows from many threads, then check for leaks
    Stress(StressArgs),
}

#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    /// Print Prometheus metrics even if disabled in the configuration
    #[arg(long)]
    pub metrics: bool,
}

#[derive(Args, Debug, Clone)]
pub struct StressArgs {
    /// Adapter to stress; defaults to the first configured device
    #[arg(long)]
    pub adapter: Option<u8>,
    /// Resource kind, e.g. `cat_cfn` or `RES_KM_CATEGORY`
    #[arg(long, default_value = "cat_cfn")]
    pub kind: ResourceKind,
    #[arg(long, default_value_t = 1)]
    pub alignment: usize,
    /// Worker threads (defaults to the number of CPUs)
    #[arg(long)]
    pub threads: Option<usize>,
    /// Operations per worker
    #[arg(long, default_value_t = 10_000)]
    pub iterations: usize,
    /// Percentage of new flows that share an entry instead of allocating one
    #[arg(long, default_value_t = 25)]
    pub share_percent: u32,
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}

pub fn run_command(cli: Cli) -> Result<(), CliError> {
    let config = match &cli.config {
        Some(path) => FlowMgrConfig::load_from_path(path)?,
        None => FlowMgrConfig::load()?,
    };
    EventLogger::init(&config.telemetry.log_level);
    let metrics = MetricsRecorder::new()?;

    let registry = bring_up(&config)?;
    let result = dispatch(&cli.command, &config, &registry, &metrics);
    let teardown = tear_down(&registry);
    result.and(teardown)
}

fn dispatch(
    command: &Commands,
    config: &FlowMgrConfig,
    registry: &DeviceRegistry,
    metrics: &MetricsRecorder,
) -> Result<(), CliError> {
    match command {
        Commands::Inspect(args) => inspect(
            registry,
            metrics,
            args.metrics || config.telemetry.metrics_enabled,
        ),
        Commands::Stress(args) => {
            let summary = stress::run(registry, args)?;
            print!("{}", serde_yaml::to_string(&summary)?);
            if config.telemetry.metrics_enabled {
                publish_metrics(registry, metrics);
                print!("{}", metrics.gather_metrics()?);
            }
            Ok(())
        }
    }
}

/// Creates every configured device and opens all of its ports.
pub fn bring_up(config: &FlowMgrConfig) -> Result<DeviceRegistry, CliError> {
    let registry = DeviceRegistry::new(config.profiles.clone());
    for device in &config.devices {
        let nic = registry.create_device(device.adapter_no, device.ports, device.profile)?;
        for port in (0..device.ports).filter_map(|p| u8::try_from(p).ok()) {
            registry.create_port(&nic, PortSpec::new(port))?;
        }
        EventLogger::log_event("device_up", device.adapter_no, &device.profile.to_string());
    }
    info!(devices = registry.len(), "bring-up complete");
    Ok(registry)
}

/// Closes all ports and destroys every device, newest first.
pub fn tear_down(registry: &DeviceRegistry) -> Result<(), CliError> {
    for nic in registry.devices().iter().rev() {
        close_ports(registry, nic)?;
        registry.destroy_device(nic)?;
        EventLogger::log_event("device_down", nic.adapter_no(), "destroyed");
    }
    Ok(())
}

fn close_ports(registry: &DeviceRegistry, nic: &Arc<NicDevice>) -> Result<(), RegistryError> {
    for port in nic.ports() {
        registry.delete_port(nic, port.port())?;
    }
    Ok(())
}

fn inspect(
    registry: &DeviceRegistry,
    metrics: &MetricsRecorder,
    with_metrics: bool,
) -> Result<(), CliError> {
    print!("{}", serde_yaml::to_string(&registry.snapshot())?);
    if with_metrics {
        publish_metrics(registry, metrics);
        print!("{}", metrics.gather_metrics()?);
    }
    Ok(())
}

fn publish_metrics(registry: &DeviceRegistry, metrics: &MetricsRecorder) {
    for nic in registry.devices() {
        let resources = nic.resources();
        for usage in resources.usage().iter().filter(|u| u.capacity > 0) {
            metrics.record_pool(
                nic.adapter_no(),
                usage.kind.name(),
                usage.in_use,
                usage.capacity,
            );
        }
        metrics.add_rejected(resources.stats().total_exhausted());
    }
}
