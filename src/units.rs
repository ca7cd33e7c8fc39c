use log::info;

use crate::constants::*;
use crate::error::EnvironmentError;
use crate::util::msr::RegisterSource;

/// Scale factors that turn raw RAPL register units into physical units
///
/// Each factor is `2^-field`, where `field` is the matching bitfield of
/// `MSR_RAPL_POWER_UNIT`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegisterUnit {
	/// Watts per power unit
	pub power_scale: f64,

	/// Joules per energy-status increment
	pub energy_scale: f64,

	/// Seconds per time unit
	pub time_scale: f64,
}

impl RegisterUnit {
	/// Derives the three scales from a raw `MSR_RAPL_POWER_UNIT` value
	pub fn from_raw(raw: u64) -> Self {
		Self {
			power_scale: scale(raw, POWER_UNIT_MASK, POWER_UNIT_OFFSET),
			energy_scale: scale(raw, ENERGY_UNIT_MASK, ENERGY_UNIT_OFFSET),
			time_scale: scale(raw, TIME_UNIT_MASK, TIME_UNIT_OFFSET),
		}
	}

	/// Reads the unit register once and calibrates from it
	pub fn calibrate<S: RegisterSource + ?Sized>(source: &mut S) -> Result<Self, EnvironmentError> {
		let raw = source.read(MSR_RAPL_POWER_UNIT)?;
		let units = Self::from_raw(raw);
		info!(
			"CPU {}: power unit {} W, energy unit {} J, time unit {} s",
			source.core(),
			units.power_scale,
			units.energy_scale,
			units.time_scale
		);
		Ok(units)
	}

	/// Converts a raw energy-status reading to joules
	pub fn joules(&self, raw: u64) -> f64 {
		raw as f64 * self.energy_scale
	}

	/// Converts a raw time-unit quantity to seconds
	pub fn seconds(&self, raw: u64) -> f64 {
		raw as f64 * self.time_scale
	}
}

fn scale(raw: u64, mask: u64, offset: u32) -> f64 {
	let field = (raw & mask) >> offset;
	0.5f64.powi(field as i32)
}
