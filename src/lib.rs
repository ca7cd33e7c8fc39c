pub mod constants;
pub mod cpu_type;
pub mod energy;
pub mod error;
pub mod poller;
pub mod report;
pub mod sampler;
pub mod stats;
pub mod topology;
pub mod units;
pub mod util;

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::{debug, info, warn};

use crate::energy::RaplDomain;
use crate::error::EnvironmentError;
use crate::poller::ChangeDetectionPoller;
use crate::report::{DeltaLog, delta_log_path, dump_gaps, write_summary};
use crate::sampler::{EnergyProbe, IntervalSampler};
use crate::stats::RunStatistics;
use crate::units::RegisterUnit;
use crate::util::cpu::pin_to_core;
use crate::util::msr::{MsrDevice, RegisterSource};

/// Settings of a change-detection run
#[derive(Debug, Clone)]
pub struct PollConfig {
	/// Logical CPU to pin to and read from
	pub core: usize,

	/// Number of gaps the run collects before stopping
	pub target_gaps: usize,

	/// Where the raw gaps are dumped
	pub dump_path: PathBuf,
}

impl PollConfig {
	/// Config collecting `duration` times [`constants::MAX_GAPS`] gaps
	pub fn for_duration(core: usize, duration: usize, dump_path: PathBuf) -> Self {
		Self {
			core,
			target_gaps: duration.saturating_mul(constants::MAX_GAPS),
			dump_path,
		}
	}
}

impl Default for PollConfig {
	fn default() -> Self {
		Self::for_duration(0, 1, PathBuf::from(constants::GAPS_DUMP_PATH))
	}
}

/// Outcome of a change-detection run
#[derive(Debug, Clone)]
pub struct PollReport {
	pub stats: RunStatistics,
	pub gaps: Vec<f64>,

	/// Whether the gap dump was written
	pub dumped: bool,
}

/// Measures the update gaps of the package energy counter on `config.core`
///
/// Pinning is best-effort; register failures abort the run.
pub fn run_gap_poll(config: &PollConfig) -> Result<PollReport, EnvironmentError> {
	match pin_to_core(config.core) {
		Ok(()) => debug!("Pinned to CPU {}", config.core),
		Err(e) => warn!("Failed to set thread affinity to CPU {}: {}", config.core, e),
	}

	let device = MsrDevice::open(config.core)?;
	poll_gaps(device, config, &mut io::stdout().lock())
}

/// Calibrates `source`, polls it, prints the summary to `out` and dumps the gaps
pub fn poll_gaps<S, W>(mut source: S, config: &PollConfig, out: &mut W) -> Result<PollReport, EnvironmentError>
where
	S: RegisterSource,
	W: Write,
{
	let units = RegisterUnit::calibrate(&mut source)?;

	let mut poller = ChangeDetectionPoller::new(source, constants::MSR_PKG_ENERGY_STATUS, config.target_gaps);
	let run = poller.run()?;
	let stats = run.gaps.finalize(run.iterations, run.elapsed);

	if let Err(e) = write_summary(out, &stats) {
		warn!("Failed to write summary: {}", e);
	}
	let joules = units.joules(run.last_raw) - units.joules(run.first_raw);
	debug!(
		"Counter updated at {:.3} hz; {:.6} J consumed while polling",
		stats.update_rate_hz,
		joules
	);

	let dumped = match dump_gaps(&config.dump_path, run.gaps.gaps()) {
		Ok(()) => {
			let _ = writeln!(out, "Dumping data to {}", config.dump_path.display());
			true
		},
		Err(e) => {
			warn!("Failed to open {}: {}", config.dump_path.display(), e);
			false
		},
	};

	Ok(PollReport {
		stats,
		gaps: run.gaps.gaps().to_vec(),
		dumped,
	})
}

/// Settings of an interval-sampling run
#[derive(Debug, Clone)]
pub struct SamplerConfig {
	/// Number of logged intervals; the run takes one extra baseline tick
	pub duration: usize,

	/// Packages to monitor, starting from package 0
	pub packages: usize,

	/// Domains monitored on every package
	pub domains: Vec<RaplDomain>,

	/// Pause between ticks
	pub period: Duration,

	/// Directory receiving the `rapl_<timestamp>.txt` log
	pub log_dir: PathBuf,
}

impl Default for SamplerConfig {
	fn default() -> Self {
		Self {
			duration: 0,
			packages: constants::DEFAULT_PACKAGES,
			domains: vec![RaplDomain::Package],
			period: constants::SAMPLE_PERIOD,
			log_dir: PathBuf::from(constants::SAMPLE_LOG_DIR),
		}
	}
}

impl SamplerConfig {
	/// Baseline tick plus one tick per logged interval
	pub fn ticks(&self) -> usize {
		self.duration.saturating_add(1)
	}
}

/// Outcome of an interval-sampling run
#[derive(Debug, Clone)]
pub struct SamplingReport {
	/// Log file, if it could be written
	pub log_path: Option<PathBuf>,

	/// Number of ticks that produced records
	pub intervals: usize,
}

/// Samples the configured domains of every package once per period
pub fn run_interval_sampling(config: &SamplerConfig) -> Result<SamplingReport, EnvironmentError> {
	let cores = topology::package_cores(config.packages);
	info!("Sampling {:?} on CPUs {:?}", config.domains, cores);

	let mut probes = Vec::with_capacity(cores.len() * config.domains.len());
	for &core in &cores {
		for &domain in &config.domains {
			probes.push(EnergyProbe::new(MsrDevice::open(core)?, domain)?);
		}
	}

	sample_intervals(probes, config)
}

/// Runs the interval sampler over already calibrated probes and logs the deltas
pub fn sample_intervals<S: RegisterSource>(
	probes: Vec<EnergyProbe<S>>,
	config: &SamplerConfig,
) -> Result<SamplingReport, EnvironmentError> {
	let path = delta_log_path(&config.log_dir, current_unix_seconds());
	let mut log = match DeltaLog::create(path.clone()) {
		Ok(log) => {
			info!("Logging deltas to {}", path.display());
			Some(log)
		},
		Err(e) => {
			warn!("Failed to open {}: {}; deltas will not be saved", path.display(), e);
			None
		},
	};

	let mut intervals = 0;
	let mut sampler = IntervalSampler::new(probes, config.period);
	for (domain_id, probe) in sampler.probes().iter().enumerate() {
		debug!("column {}: {} on CPU {}", domain_id + 1, probe.domain(), probe.core());
	}
	sampler.run(config.ticks(), |records| {
		intervals += 1;
		let failed = match log.as_mut() {
			Some(log) => log.append(records).err(),
			None => None,
		};
		if let Some(e) = failed {
			warn!("Failed to write {}: {}; deltas will not be saved", path.display(), e);
			log = None;
		}
	})?;

	let log_path = match log {
		Some(log) => match log.finish() {
			Ok(()) => Some(path),
			Err(e) => {
				warn!("Failed to flush {}: {}", path.display(), e);
				None
			},
		},
		None => None,
	};

	Ok(SamplingReport { log_path, intervals })
}

/// Installs the console logger; verbosity 0 shows warnings and errors, each `-v` adds a level
pub fn init_logging(verbose: u8) -> Result<(), log::SetLoggerError> {
	loggerv::init_with_verbosity(verbose.into())
}

/// Seconds since the Unix epoch, 0 if the clock is before it
pub fn current_unix_seconds() -> u64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map(|d| d.as_secs())
		.unwrap_or_default()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sampler_runs_a_baseline_tick_before_each_interval() {
		let config = SamplerConfig {
			duration: 3,
			..SamplerConfig::default()
		};
		assert_eq!(config.ticks(), 4);
		assert_eq!(SamplerConfig::default().ticks(), 1);
	}

	#[test]
	fn unbounded_duration_does_not_overflow_tick_count() {
		let config = SamplerConfig {
			duration: usize::MAX,
			..SamplerConfig::default()
		};
		assert_eq!(config.ticks(), usize::MAX);
	}
}
