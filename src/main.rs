//! Finds the gap between RAPL package energy updates by busy-polling the MSR driver.

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser};
use log::{error, warn};
use rapl_latency::constants::{EXIT_USAGE, GAPS_DUMP_PATH};
use rapl_latency::cpu_type::detect_cpu_type;
use rapl_latency::{PollConfig, init_logging, run_gap_poll};

/// Measure how often the RAPL package energy counter updates.
#[derive(Parser, Debug)]
#[command(author, version)]
struct Cli {
	/// Logical CPU to pin to and read the MSRs of
	#[arg(short = 'c', default_value_t = 0)]
	core: usize,

	/// Run length, in thousands of observed counter updates
	#[arg(short = 't', default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
	duration: u32,

	/// File receiving the raw gaps, one per line
	#[arg(short = 'o', long, default_value = GAPS_DUMP_PATH)]
	output: PathBuf,

	/// Increase the verbosity level
	#[arg(short, action = ArgAction::Count, default_value_t = 0)]
	verbose: u8,
}

impl Cli {
	fn poll_config(&self) -> PollConfig {
		PollConfig::for_duration(self.core, self.duration as usize, self.output.clone())
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
	// Warnings are always shown; each -v adds a level
	init_logging(cli.verbose).expect("unable to initialize the logger");

	let cpu_type = detect_cpu_type();
	if !cpu_type.has_intel_rapl_layout() {
		warn!("{:?} CPU detected; the RAPL MSR offsets used here are Intel's", cpu_type);
	}

	if let Err(e) = run_gap_poll(&cli.poll_config()) {
		error!("rdmsr: {}", e);
		process::exit(e.exit_code());
	}
}
