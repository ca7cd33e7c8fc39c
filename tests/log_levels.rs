use std::sync::Mutex;
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};
use rapl_latency::constants::{MSR_PKG_ENERGY_STATUS, MSR_RAPL_POWER_UNIT};
use rapl_latency::error::EnvironmentError;
use rapl_latency::util::msr::RegisterSource;
use rapl_latency::{PollConfig, poll_gaps};

/// Keeps every record so tests can check the level it was emitted at
struct CapturingLogger {
	records: Mutex<Vec<(Level, String)>>,
}

impl Log for CapturingLogger {
	fn enabled(&self, _: &Metadata) -> bool {
		true
	}

	fn log(&self, record: &Record) {
		self.records
			.lock()
			.unwrap()
			.push((record.level(), record.args().to_string()));
	}

	fn flush(&self) {}
}

static LOGGER: CapturingLogger = CapturingLogger {
	records: Mutex::new(Vec::new()),
};

struct FastCounter {
	start: Instant,
}

impl RegisterSource for FastCounter {
	fn read(&mut self, offset: u32) -> Result<u64, EnvironmentError> {
		match offset {
			MSR_RAPL_POWER_UNIT => Ok(0xA_1003),
			MSR_PKG_ENERGY_STATUS => Ok((self.start.elapsed().as_micros() / 500) as u64),
			_ => Err(EnvironmentError::ShortRead {
				core: 0,
				offset,
				got: 0,
			}),
		}
	}

	fn core(&self) -> usize {
		0
	}
}

#[test]
fn update_rate_is_reported_at_debug_level() {
	log::set_logger(&LOGGER).unwrap();
	log::set_max_level(LevelFilter::Trace);

	let dir = tempfile::tempdir().unwrap();
	let config = PollConfig {
		core: 0,
		target_gaps: 2,
		dump_path: dir.path().join("gaps_msr.txt"),
	};
	let counter = FastCounter { start: Instant::now() };
	poll_gaps(counter, &config, &mut Vec::new()).unwrap();

	let records = LOGGER.records.lock().unwrap();
	let update = records
		.iter()
		.find(|(_, message)| message.starts_with("Counter updated at"))
		.unwrap();
	assert_eq!(update.0, Level::Debug);
	assert!(records.iter().all(|(level, _)| *level != Level::Warn));
}
