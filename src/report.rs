use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::sampler::DeltaRecord;
use crate::stats::RunStatistics;

/// Writes the human-readable summary of a change-detection run
pub fn write_summary<W: Write>(out: &mut W, stats: &RunStatistics) -> io::Result<()> {
	writeln!(out, "{} iterations in {:.6} seconds.", stats.iterations, stats.elapsed_seconds)?;
	writeln!(out, "Polling rate of {:.6} hz.", stats.poll_rate_hz)?;
	writeln!(
		out,
		"MSR polling delay of {:.6} microseconds.",
		stats.poll_delay_seconds() * 1_000_000.0
	)?;
	writeln!(out, "Biggest gap was {:.6} millisecond.", stats.max_gap * 1000.0)?;
	writeln!(out, "Average gap of {:.6} milliseconds.", stats.mean_gap * 1000.0)?;
	writeln!(
		out,
		"Standard deviation of the gaps is {:.6} microseconds.",
		stats.std_dev * 1_000_000.0
	)
}

/// Writes one gap per line, in seconds with 9 decimals
pub fn write_gaps<W: Write>(out: &mut W, gaps: &[f64]) -> io::Result<()> {
	for gap in gaps {
		writeln!(out, "{:.9}", gap)?;
	}
	Ok(())
}

/// Dumps the gap sequence to `path`, replacing any previous dump
pub fn dump_gaps(path: &Path, gaps: &[f64]) -> io::Result<()> {
	let mut out = BufWriter::new(File::create(path)?);
	write_gaps(&mut out, gaps)?;
	out.flush()
}

/// Formats the records of one tick as `timestamp,delta0,delta1,...`
pub fn format_delta_line(records: &[DeltaRecord]) -> Option<String> {
	let timestamp = records.first()?.timestamp;
	let mut line = timestamp.to_string();
	for record in records {
		line.push(',');
		line.push_str(&record.delta_joules.to_string());
	}
	Some(line)
}

/// Line-per-tick log of interval deltas
pub struct DeltaLog {
	path: PathBuf,
	out: BufWriter<File>,
}

impl DeltaLog {
	pub fn create(path: impl Into<PathBuf>) -> io::Result<Self> {
		let path = path.into();
		let out = BufWriter::new(File::create(&path)?);
		Ok(Self { path, out })
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn append(&mut self, records: &[DeltaRecord]) -> io::Result<()> {
		match format_delta_line(records) {
			Some(line) => writeln!(self.out, "{}", line),
			None => Ok(()),
		}
	}

	pub fn finish(mut self) -> io::Result<()> {
		self.out.flush()
	}
}

/// Path of the delta log for a run started at `timestamp`
pub fn delta_log_path(dir: &Path, timestamp: u64) -> PathBuf {
	dir.join(format!("rapl_{}.txt", timestamp))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn stats() -> RunStatistics {
		RunStatistics {
			count: 3,
			iterations: 2000,
			elapsed_seconds: 0.5,
			poll_rate_hz: 4000.0,
			update_rate_hz: 6.0,
			mean_gap: 0.0015,
			max_gap: 0.002,
			std_dev: 0.000408,
		}
	}

	#[test]
	fn summary_uses_fixed_units() {
		let mut out = Vec::new();
		write_summary(&mut out, &stats()).unwrap();
		let text = String::from_utf8(out).unwrap();
		let lines: Vec<&str> = text.lines().collect();

		assert_eq!(lines[0], "2000 iterations in 0.500000 seconds.");
		assert_eq!(lines[1], "Polling rate of 4000.000000 hz.");
		assert_eq!(lines[2], "MSR polling delay of 250.000000 microseconds.");
		assert_eq!(lines[3], "Biggest gap was 2.000000 millisecond.");
		assert_eq!(lines[4], "Average gap of 1.500000 milliseconds.");
		assert_eq!(lines[5], "Standard deviation of the gaps is 408.000000 microseconds.");
	}

	#[test]
	fn gaps_are_written_with_nine_decimals() {
		let mut out = Vec::new();
		write_gaps(&mut out, &[0.001, 0.0123456789]).unwrap();
		assert_eq!(String::from_utf8(out).unwrap(), "0.001000000\n0.012345679\n");
	}

	#[test]
	fn delta_line_lists_domains_in_order() {
		let records = [
			DeltaRecord {
				timestamp: 1_700_000_000,
				domain_id: 0,
				delta_joules: 40.5,
			},
			DeltaRecord {
				timestamp: 1_700_000_000,
				domain_id: 1,
				delta_joules: 12.0,
			},
		];
		assert_eq!(format_delta_line(&records).as_deref(), Some("1700000000,40.5,12"));
		assert_eq!(format_delta_line(&[]), None);
	}

	#[test]
	fn delta_log_is_named_after_the_start_time() {
		assert_eq!(
			delta_log_path(Path::new("/tmp"), 1_700_000_000),
			PathBuf::from("/tmp/rapl_1700000000.txt")
		);
	}

	#[test]
	fn delta_log_writes_one_line_per_tick() {
		let dir = tempfile::tempdir().unwrap();
		let mut log = DeltaLog::create(delta_log_path(dir.path(), 42)).unwrap();
		let record = DeltaRecord {
			timestamp: 43,
			domain_id: 0,
			delta_joules: 1.25,
		};
		log.append(&[record]).unwrap();
		log.append(&[DeltaRecord { timestamp: 44, ..record }]).unwrap();
		let path = log.path().to_path_buf();
		log.finish().unwrap();

		assert_eq!(std::fs::read_to_string(path).unwrap(), "43,1.25\n44,1.25\n");
	}

	#[test]
	fn dump_into_missing_directory_fails_without_panicking() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("missing").join("gaps.txt");
		assert!(dump_gaps(&path, &[0.001]).is_err());
	}
}
