//! Multi-threaded allocation churn against one device.
//!
//! Each worker creates single-resource flows, sometimes sharing an entry
//! it already holds through `deref`, and deletes them again at random.
//! After the run every flow is gone, so the pool must be empty.

use std::time::Instant;

use flowmgr_core::{DeviceResourceManager, FlowResource, ResourceError, ResourceKind};
use flowmgr_registry::{DeviceRegistry, RegistryError};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};

use crate::commands::StressArgs;
use crate::error::CliError;

#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct WorkerReport {
    pub allocated: u64,
    pub shared: u64,
    pub rejected: u64,
    pub deleted: u64,
}

impl WorkerReport {
    fn merge(mut self, other: WorkerReport) -> Self {
        self.allocated += other.allocated;
        self.shared += other.shared;
        self.rejected += other.rejected;
        self.deleted += other.deleted;
        self
    }
}

#[derive(Debug, Serialize)]
pub struct StressSummary {
    pub adapter_no: u8,
    pub kind: ResourceKind,
    pub capacity: usize,
    pub threads: usize,
    pub elapsed_ms: u128,
    #[serde(flatten)]
    pub totals: WorkerReport,
}

pub fn run(registry: &DeviceRegistry, args: &StressArgs) -> Result<StressSummary, CliError> {
    let nic = match args.adapter {
        Some(adapter_no) => registry
            .find_device(adapter_no)
            .ok_or(RegistryError::DeviceNotFound(adapter_no))?,
        None => registry.devices().into_iter().next().ok_or(CliError::NoDevices)?,
    };
    let resources = nic.resources();
    let capacity = resources
        .usage()
        .iter()
        .find(|u| u.kind == args.kind)
        .map_or(0, |u| u.capacity);
    let threads = args.threads.unwrap_or_else(num_cpus::get).max(1);
    let port_count = usize::from(nic.port_count()).max(1);

    info!(
        adapter = nic.adapter_no(),
        kind = %args.kind,
        capacity,
        threads,
        iterations = args.iterations,
        "stress run started"
    );
    let started = Instant::now();

    let reports = crossbeam::scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|worker| {
                let port = u8::try_from(worker % port_count).unwrap_or(0);
                let seed = args.seed.wrapping_add(worker as u64);
                s.spawn(move |_| churn(resources, args, port, seed))
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().map_err(|_| CliError::WorkerPanicked))
            .collect::<Result<Vec<_>, _>>()
    })
    .map_err(|_| CliError::WorkerPanicked)??;

    let mut totals = WorkerReport::default();
    for report in reports {
        totals = totals.merge(report?);
    }

    let in_use = resources
        .usage()
        .iter()
        .find(|u| u.kind == args.kind)
        .map_or(0, |u| u.in_use);
    let flows = resources.flow_count();
    if in_use != 0 || flows != 0 {
        return Err(CliError::Leak {
            kind: args.kind,
            in_use,
            flows,
        });
    }

    let summary = StressSummary {
        adapter_no: nic.adapter_no(),
        kind: args.kind,
        capacity,
        threads,
        elapsed_ms: started.elapsed().as_millis(),
        totals,
    };
    info!(
        allocated = totals.allocated,
        shared = totals.shared,
        rejected = totals.rejected,
        elapsed_ms = summary.elapsed_ms,
        "stress run finished"
    );
    Ok(summary)
}

/// One worker's loop. Only entries backing this worker's own flows are
/// shared, so a shared index is always still allocated.
fn churn(
    resources: &DeviceResourceManager,
    args: &StressArgs,
    port: u8,
    seed: u64,
) -> Result<WorkerReport, ResourceError> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut flows: Vec<(u32, usize)> = Vec::new();
    let mut report = WorkerReport::default();

    for _ in 0..args.iterations {
        if !flows.is_empty() && rng.random_bool(0.5) {
            let (id, _) = flows.swap_remove(rng.random_range(0..flows.len()));
            resources.delete_flow(id)?;
            report.deleted += 1;
            continue;
        }

        let index = if !flows.is_empty() && rng.random_range(0..100) < args.share_percent {
            let (_, index) = flows[rng.random_range(0..flows.len())];
            resources.deref(args.kind, index)?;
            report.shared += 1;
            index
        } else {
            match resources.allocate(args.kind, args.alignment) {
                Ok(index) => {
                    report.allocated += 1;
                    index
                }
                Err(err) if err.is_exhaustion() => {
                    report.rejected += 1;
                    continue;
                }
                Err(err) => return Err(err),
            }
        };

        let id = resources.create_flow(port, vec![FlowResource::new(args.kind, index)])?;
        flows.push((id, index));
    }

    for (id, _) in flows {
        resources.delete_flow(id)?;
        report.deleted += 1;
    }
    debug!(port, seed, ?report, "stress worker done");
    Ok(report)
}
