use std::collections::BTreeMap;
use std::path::Path;
use std::{fs, io};

use log::{debug, warn};

const SYSFS_CPU_DIR: &str = "/sys/devices/system/cpu";

/// Maps each physical package to the lowest-numbered logical CPU on it
///
/// The MSR driver is per logical CPU, and package-scoped RAPL registers read
/// the same from any CPU of the package, so one CPU per package is enough.
pub fn read_package_cores_from_sysfs(cpu_dir: &Path) -> io::Result<BTreeMap<usize, usize>> {
	let mut package_cores: BTreeMap<usize, usize> = BTreeMap::new();

	for entry in fs::read_dir(cpu_dir)?.filter_map(Result::ok) {
		let path = entry.path();
		let filename = entry.file_name();
		let filename = filename.to_string_lossy();

		// Look for cpuN directories
		let Some(cpu_id) = filename.strip_prefix("cpu").and_then(|id| id.parse::<usize>().ok()) else {
			continue;
		};

		let package_path = path.join("topology/physical_package_id");
		if let Ok(package_str) = fs::read_to_string(&package_path) {
			if let Ok(package_id) = package_str.trim().parse::<usize>() {
				package_cores
					.entry(package_id)
					.and_modify(|core| *core = (*core).min(cpu_id))
					.or_insert(cpu_id);
			}
		}
	}

	if package_cores.is_empty() {
		return Err(io::Error::new(
			io::ErrorKind::NotFound,
			"Could not read CPU package topology from sysfs",
		));
	}

	Ok(package_cores)
}

/// Evenly splits `total_threads` logical CPUs across `packages`
pub fn split_package_cores(packages: usize, total_threads: usize) -> Vec<usize> {
	let per_package = if packages > 0 {
		(total_threads / packages).max(1)
	} else {
		1
	};
	(0..packages).map(|package| package * per_package).collect()
}

/// Picks one logical CPU for each of the first `packages` packages
pub fn package_cores(packages: usize) -> Vec<usize> {
	match read_package_cores_from_sysfs(Path::new(SYSFS_CPU_DIR)) {
		Ok(map) => {
			let mut cores: Vec<usize> = map.values().copied().take(packages).collect();
			if cores.len() < packages {
				warn!(
					"Only {} package(s) found in sysfs, {} requested; guessing the rest",
					cores.len(),
					packages
				);
				let guessed = split_package_cores(packages, num_cpus::get());
				cores.extend(guessed.into_iter().skip(cores.len()));
			}
			debug!("Package cores from sysfs: {:?}", cores);
			cores
		},
		Err(e) => {
			warn!("{}; assuming packages split CPUs evenly", e);
			split_package_cores(packages, num_cpus::get())
		},
	}
}
