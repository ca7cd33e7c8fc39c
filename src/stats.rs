use std::time::Duration;

/// Summary of one change-detection run, computed once when the run ends
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunStatistics {
	/// Number of recorded gaps
	pub count: usize,

	/// Every poll attempt, including reads that saw no change
	pub iterations: u64,

	/// Wall-clock length of the polling loop in seconds
	pub elapsed_seconds: f64,

	/// Poll attempts per second
	pub poll_rate_hz: f64,

	/// Observed counter updates per second (`count / elapsed_seconds`)
	pub update_rate_hz: f64,

	pub mean_gap: f64,
	pub max_gap: f64,

	/// Population standard deviation of the gaps
	pub std_dev: f64,
}

impl RunStatistics {
	/// Average time spent in one poll attempt, in seconds
	pub fn poll_delay_seconds(&self) -> f64 {
		if self.iterations == 0 {
			0.0
		} else {
			self.elapsed_seconds / self.iterations as f64
		}
	}
}

/// Append-only store of the gaps seen by one run
#[derive(Debug, Clone, Default)]
pub struct GapAggregator {
	gaps: Vec<f64>,
	sum: f64,
	max: f64,
}

impl GapAggregator {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_capacity(capacity: usize) -> Self {
		Self {
			gaps: Vec::with_capacity(capacity),
			..Self::default()
		}
	}

	/// Records one gap
	pub fn push(&mut self, gap: Duration) {
		let seconds = gap.as_secs_f64();
		self.sum += seconds;
		if seconds > self.max {
			self.max = seconds;
		}
		self.gaps.push(seconds);
	}

	pub fn len(&self) -> usize {
		self.gaps.len()
	}

	pub fn is_empty(&self) -> bool {
		self.gaps.is_empty()
	}

	/// Recorded gaps in seconds, in observation order
	pub fn gaps(&self) -> &[f64] {
		&self.gaps
	}

	/// Computes the statistics snapshot for a run of `iterations` polls over `elapsed`
	pub fn finalize(&self, iterations: u64, elapsed: Duration) -> RunStatistics {
		let count = self.gaps.len();
		let elapsed_seconds = elapsed.as_secs_f64();

		let (mean_gap, std_dev) = if count == 0 {
			(0.0, 0.0)
		} else {
			let mean = self.sum / count as f64;
			let sum_squares: f64 = self.gaps.iter().map(|g| (g - mean) * (g - mean)).sum();
			(mean, (sum_squares / count as f64).sqrt())
		};

		RunStatistics {
			count,
			iterations,
			elapsed_seconds,
			poll_rate_hz: rate(iterations as f64, elapsed_seconds),
			update_rate_hz: rate(count as f64, elapsed_seconds),
			mean_gap,
			max_gap: self.max,
			std_dev,
		}
	}
}

fn rate(events: f64, seconds: f64) -> f64 {
	if seconds > 0.0 { events / seconds } else { 0.0 }
}
