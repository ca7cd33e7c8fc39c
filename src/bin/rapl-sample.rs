//! Logs per-second RAPL energy deltas of every package to `/tmp/rapl_<timestamp>.txt`.

use std::process;

use clap::{ArgAction, Parser};
use log::{error, info, warn};
use rapl_latency::constants::{DEFAULT_PACKAGES, EXIT_USAGE};
use rapl_latency::cpu_type::detect_cpu_type;
use rapl_latency::energy::RaplDomain;
use rapl_latency::{SamplerConfig, current_unix_seconds, init_logging, run_interval_sampling};

/// Sample RAPL energy once per second and log the per-interval deltas.
#[derive(Parser, Debug)]
#[command(author, version)]
struct Cli {
	/// Number of one-second intervals to log
	duration: usize,

	/// Number of packages to sample, starting from package 0
	#[arg(short, long, default_value_t = DEFAULT_PACKAGES as u16, value_parser = clap::value_parser!(u16).range(1..))]
	packages: u16,

	/// Energy domain to sample on every package (package, pp0, pp1, dram); repeatable
	#[arg(short, long = "domain", default_value = "package")]
	domains: Vec<RaplDomain>,

	/// Increase the verbosity level
	#[arg(short, action = ArgAction::Count, default_value_t = 0)]
	verbose: u8,
}

impl Cli {
	fn sampler_config(&self) -> SamplerConfig {
		SamplerConfig {
			duration: self.duration,
			packages: usize::from(self.packages),
			domains: self.domains.clone(),
			..SamplerConfig::default()
		}
	}
}

fn main() {
	let cli = match Cli::try_parse() {
		Ok(cli) => cli,
		Err(e) if !e.use_stderr() => e.exit(),
		Err(e) => {
			let _ = e.print();
			process::exit(EXIT_USAGE);
		},
	};
	init_logging(cli.verbose).expect("unable to initialize the logger");

	let cpu_type = detect_cpu_type();
	if !cpu_type.has_intel_rapl_layout() {
		warn!("{:?} CPU detected; the RAPL MSR offsets used here are Intel's", cpu_type);
	}

	println!("start:{}", current_unix_seconds());
	match run_interval_sampling(&cli.sampler_config()) {
		Ok(report) => {
			if let Some(path) = report.log_path {
				info!("{} intervals written to {}", report.intervals, path.display());
			}
		},
		Err(e) => {
			error!("rdmsr: {}", e);
			process::exit(e.exit_code());
		},
	}
	println!("end:{}", current_unix_seconds());
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn duration_is_positional() {
		let cli = Cli::try_parse_from(["rapl-sample", "20"]).unwrap();
		let config = cli.sampler_config();
		assert_eq!(config.duration, 20);
		assert_eq!(config.packages, 2);
		assert_eq!(config.domains, vec![RaplDomain::Package]);
	}

	#[test]
	fn domains_are_repeatable() {
		let cli = Cli::try_parse_from(["rapl-sample", "5", "-d", "pp0", "--domain", "dram", "-p", "1"]).unwrap();
		assert_eq!(cli.domains, vec![RaplDomain::Pp0, RaplDomain::Dram]);
		assert_eq!(cli.packages, 1);
	}

	#[test]
	fn missing_or_bad_duration_is_rejected() {
		assert!(Cli::try_parse_from(["rapl-sample"]).is_err());
		assert!(Cli::try_parse_from(["rapl-sample", "ten"]).is_err());
		assert!(Cli::try_parse_from(["rapl-sample", "5", "-d", "gpu"]).is_err());
		assert!(Cli::try_parse_from(["rapl-sample", "5", "-p", "0"]).is_err());
	}
}
