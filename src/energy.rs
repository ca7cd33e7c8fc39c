use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use crate::constants::*;

/// A RAPL energy domain with its own energy-status counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RaplDomain {
	/// Whole package
	Package,
	/// Power plane 0, the cores
	Pp0,
	/// Power plane 1, usually the uncore or integrated graphics
	Pp1,
	/// Memory controller
	Dram,
}

impl RaplDomain {
	/// Offset of the energy-status MSR for this domain
	pub const fn energy_status_offset(self) -> u32 {
		match self {
			RaplDomain::Package => MSR_PKG_ENERGY_STATUS,
			RaplDomain::Pp0 => MSR_PP0_ENERGY_STATUS,
			RaplDomain::Pp1 => MSR_PP1_ENERGY_STATUS,
			RaplDomain::Dram => MSR_DRAM_ENERGY_STATUS,
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			RaplDomain::Package => "package",
			RaplDomain::Pp0 => "pp0",
			RaplDomain::Pp1 => "pp1",
			RaplDomain::Dram => "dram",
		}
	}
}

impl fmt::Display for RaplDomain {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for RaplDomain {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"package" | "pkg" => Ok(RaplDomain::Package),
			"pp0" | "core" => Ok(RaplDomain::Pp0),
			"pp1" | "uncore" => Ok(RaplDomain::Pp1),
			"dram" => Ok(RaplDomain::Dram),
			other => Err(format!("unknown RAPL domain '{}' (expected package, pp0, pp1 or dram)", other)),
		}
	}
}

/// A raw energy counter value and the instant it was read
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergySample {
	pub raw: u64,
	pub at: Instant,
}

impl EnergySample {
	pub fn new(raw: u64, at: Instant) -> Self {
		Self { raw, at }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn domains_map_to_their_status_registers() {
		assert_eq!(RaplDomain::Package.energy_status_offset(), 0x611);
		assert_eq!(RaplDomain::Pp0.energy_status_offset(), 0x639);
		assert_eq!(RaplDomain::Pp1.energy_status_offset(), 0x641);
		assert_eq!(RaplDomain::Dram.energy_status_offset(), 0x619);
	}

	#[test]
	fn domain_names_parse_back() {
		for domain in [RaplDomain::Package, RaplDomain::Pp0, RaplDomain::Pp1, RaplDomain::Dram] {
			assert_eq!(domain.to_string().parse::<RaplDomain>(), Ok(domain));
		}
		assert_eq!("PKG".parse::<RaplDomain>(), Ok(RaplDomain::Package));
		assert!("gpu".parse::<RaplDomain>().is_err());
	}
}
