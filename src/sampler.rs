use std::thread;
use std::time::Duration;

use log::debug;

use crate::current_unix_seconds;
use crate::energy::RaplDomain;
use crate::error::EnvironmentError;
use crate::units::RegisterUnit;
use crate::util::msr::RegisterSource;

/// Energy used by one domain during one sampling interval
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeltaRecord {
	/// Unix time of the tick, in seconds
	pub timestamp: u64,

	/// Position of the domain in the sampler's probe list
	pub domain_id: usize,

	pub delta_joules: f64,
}

/// One monitored (register channel, domain) pair with its calibration
pub struct EnergyProbe<S> {
	source: S,
	domain: RaplDomain,
	units: RegisterUnit,
	previous: Option<f64>,
}

impl<S: RegisterSource> EnergyProbe<S> {
	/// Calibrates the channel and binds it to a domain
	pub fn new(mut source: S, domain: RaplDomain) -> Result<Self, EnvironmentError> {
		let units = RegisterUnit::calibrate(&mut source)?;
		Ok(Self {
			source,
			domain,
			units,
			previous: None,
		})
	}

	pub fn domain(&self) -> RaplDomain {
		self.domain
	}

	pub fn core(&self) -> usize {
		self.source.core()
	}

	/// Reads the domain's energy in joules
	fn read_joules(&mut self) -> Result<f64, EnvironmentError> {
		let raw = self.source.read(self.domain.energy_status_offset())?;
		Ok(self.units.joules(raw))
	}
}

/// Reads a fixed set of energy domains once per period and reports deltas
pub struct IntervalSampler<S> {
	probes: Vec<EnergyProbe<S>>,
	period: Duration,
}

impl<S: RegisterSource> IntervalSampler<S> {
	pub fn new(probes: Vec<EnergyProbe<S>>, period: Duration) -> Self {
		Self { probes, period }
	}

	pub fn probes(&self) -> &[EnergyProbe<S>] {
		&self.probes
	}

	/// Samples every probe once
	///
	/// The first call only stores baselines and returns no records. Later calls
	/// return one record per probe, in probe order.
	pub fn tick(&mut self, timestamp: u64) -> Result<Vec<DeltaRecord>, EnvironmentError> {
		let mut records = Vec::with_capacity(self.probes.len());

		for (domain_id, probe) in self.probes.iter_mut().enumerate() {
			let joules = probe.read_joules()?;
			if let Some(previous) = probe.previous.replace(joules) {
				records.push(DeltaRecord {
					timestamp,
					domain_id,
					delta_joules: joules - previous,
				});
			}
		}

		Ok(records)
	}

	/// Runs `ticks` sequential ticks, sleeping one period between them
	///
	/// `on_records` receives the records of every tick after the baseline.
	pub fn run<F>(&mut self, ticks: usize, mut on_records: F) -> Result<(), EnvironmentError>
	where
		F: FnMut(&[DeltaRecord]),
	{
		for i in 0..ticks {
			if i > 0 {
				thread::sleep(self.period);
			}

			let records = self.tick(current_unix_seconds())?;
			if records.is_empty() {
				continue;
			}

			debug!("tick {}: {:?}", i, records);
			on_records(&records);
		}

		Ok(())
	}
}
