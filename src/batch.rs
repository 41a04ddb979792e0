//! Running many simulations at once.
//!
//! With the `parallel` feature, jobs are spread over the rayon thread pool;
//! otherwise they run one after another. Results come back in job order
//! either way.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::clock::ClockConfig;
use crate::device::DeviceDescriptor;
use crate::engine::{self, SimResult};
use crate::signal::SignalVector;
use crate::waveform::Waveform;

/// One engine invocation.
#[derive(Clone, Debug)]
pub struct BatchJob {
    pub device: DeviceDescriptor,
    pub tape: Vec<SignalVector>,
    pub clock: ClockConfig,
}

impl BatchJob {
    pub fn new(device: DeviceDescriptor, tape: Vec<SignalVector>, clock: ClockConfig) -> Self {
        Self {
            device,
            tape,
            clock,
        }
    }

    pub fn run(&self) -> SimResult<Waveform> {
        engine::run(&self.device, &self.tape, self.clock)
    }
}

/// Runs every job sequentially.
#[cfg(not(feature = "parallel"))]
pub fn run_batch(jobs: &[BatchJob]) -> Vec<SimResult<Waveform>> {
    tracing::debug!(jobs = jobs.len(), "running batch sequentially");
    jobs.iter().map(BatchJob::run).collect()
}

/// Runs every job on the rayon pool.
#[cfg(feature = "parallel")]
pub fn run_batch(jobs: &[BatchJob]) -> Vec<SimResult<Waveform>> {
    tracing::debug!(jobs = jobs.len(), "running batch in parallel");
    jobs.par_iter().map(BatchJob::run).collect()
}

/// Aggregate counters over a batch, in the shape of `Waveform::export_stats`.
pub fn export_batch_stats(results: &[SimResult<Waveform>]) -> serde_json::Value {
    let ok: Vec<&Waveform> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    serde_json::json!({
        "jobs": results.len(),
        "failed": results.len() - ok.len(),
        "cycles": ok.iter().map(|w| w.stats.cycles).sum::<usize>(),
        "transitions_fired": ok.iter().map(|w| w.stats.transitions_fired).sum::<u64>(),
        "async_overrides": ok.iter().map(|w| w.stats.async_overrides).sum::<u64>(),
        "parallel": cfg!(feature = "parallel"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::create_default_catalog;
    use crate::tape::InputTape;

    #[test]
    fn test_results_in_job_order() {
        let catalog = create_default_catalog();
        let jobs: Vec<BatchJob> = catalog
            .iter()
            .map(|d| {
                let tape = InputTape::for_device(d, 4 + d.inputs().len());
                BatchJob::new(d.clone(), tape.cycles().to_vec(), ClockConfig::for_device(d))
            })
            .collect();

        let results = run_batch(&jobs);
        assert_eq!(results.len(), jobs.len());
        for (job, result) in jobs.iter().zip(&results) {
            let wave = result.as_ref().unwrap();
            assert_eq!(wave.device_id, job.device.id);
            assert_eq!(wave.len(), 2 * job.tape.len());
        }
    }

    #[test]
    fn test_failed_jobs_are_reported() {
        let catalog = create_default_catalog();
        let dff = catalog.get("d-flip-flop-pe").unwrap().clone();
        let jobs = vec![
            BatchJob::new(dff.clone(), vec![SignalVector::new()], ClockConfig::default()),
            BatchJob::new(dff, Vec::new(), ClockConfig::default()),
        ];
        let results = run_batch(&jobs);
        assert!(results[0].is_err());
        assert!(results[1].is_ok());

        let stats = export_batch_stats(&results);
        assert_eq!(stats["jobs"], 2);
        assert_eq!(stats["failed"], 1);
    }
}
