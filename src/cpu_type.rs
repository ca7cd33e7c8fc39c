use std::fs;

/// Represents CPU manufacturer types that can be detected
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CpuType {
	/// Intel CPU architecture
	Intel,
	/// AMD CPU architecture
	Amd,
	/// Any other CPU architecture not explicitly supported
	Unsupported,
}

impl CpuType {
	/// Whether the Intel RAPL register layout applies
	pub fn has_intel_rapl_layout(&self) -> bool {
		*self == CpuType::Intel
	}
}

/// Classifies the contents of /proc/cpuinfo
pub fn cpu_type_from_cpuinfo(cpuinfo: &str) -> CpuType {
	if cpuinfo.contains("GenuineIntel") {
		CpuType::Intel
	} else if cpuinfo.contains("AuthenticAMD") {
		CpuType::Amd
	} else {
		CpuType::Unsupported
	}
}

/// Detects the CPU manufacturer by reading /proc/cpuinfo
pub fn detect_cpu_type() -> CpuType {
	let cpuinfo = fs::read_to_string("/proc/cpuinfo").unwrap_or_default();
	cpu_type_from_cpuinfo(&cpuinfo)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn vendor_strings_are_recognized() {
		assert_eq!(cpu_type_from_cpuinfo("vendor_id\t: GenuineIntel\n"), CpuType::Intel);
		assert_eq!(cpu_type_from_cpuinfo("vendor_id\t: AuthenticAMD\n"), CpuType::Amd);
		assert_eq!(cpu_type_from_cpuinfo(""), CpuType::Unsupported);
	}

	#[test]
	fn only_intel_uses_the_enumerated_registers() {
		assert!(CpuType::Intel.has_intel_rapl_layout());
		assert!(!CpuType::Amd.has_intel_rapl_layout());
	}
}
