use std::time::{Duration, Instant};

use log::debug;

use crate::constants::MAX_RESERVED_GAPS;
use crate::energy::EnergySample;
use crate::error::EnvironmentError;
use crate::stats::GapAggregator;
use crate::util::msr::RegisterSource;

/// What a single poll attempt turned out to be
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Observation {
	/// Same raw value as the last retained sample
	Unchanged,
	/// First transition of the run: becomes the baseline, yields no gap
	Seeded,
	/// A transition with a valid predecessor
	Gap(Duration),
}

/// Tracks the last retained counter value and turns transitions into gaps
///
/// Any inequality counts as a transition, including a counter that went
/// backwards after a wraparound.
#[derive(Debug, Clone)]
pub struct ChangeDetector {
	last_raw: u64,
	last_change: Option<EnergySample>,
}

impl ChangeDetector {
	/// Starts from an initial read that is not itself a transition
	pub fn new(initial_raw: u64) -> Self {
		Self {
			last_raw: initial_raw,
			last_change: None,
		}
	}

	/// Feeds one raw read
	///
	/// `now` is only called when the value changed, so unchanged reads cost no
	/// clock access.
	pub fn observe_with<F>(&mut self, raw: u64, now: F) -> Observation
	where
		F: FnOnce() -> Instant,
	{
		if raw == self.last_raw {
			return Observation::Unchanged;
		}

		let sample = EnergySample::new(raw, now());
		self.last_raw = raw;
		match self.last_change.replace(sample) {
			Some(previous) => Observation::Gap(sample.at.saturating_duration_since(previous.at)),
			None => Observation::Seeded,
		}
	}

	/// Last retained sample, if a transition has been seen
	pub fn last_change(&self) -> Option<EnergySample> {
		self.last_change
	}
}

/// Result of a finished polling loop
#[derive(Debug, Clone)]
pub struct PollRun {
	pub gaps: GapAggregator,
	/// Counter value read before the loop started
	pub first_raw: u64,
	/// Last retained counter value
	pub last_raw: u64,
	pub iterations: u64,
	pub elapsed: Duration,
}

/// Busy-polls one energy register until enough distinct updates were seen
pub struct ChangeDetectionPoller<S> {
	source: S,
	offset: u32,
	target_gaps: usize,
}

impl<S: RegisterSource> ChangeDetectionPoller<S> {
	pub fn new(source: S, offset: u32, target_gaps: usize) -> Self {
		Self {
			source,
			offset,
			target_gaps,
		}
	}

	/// Runs the polling loop to completion
	///
	/// The loop never sleeps or yields: any suspension would show up in the
	/// measured gaps.
	pub fn run(&mut self) -> Result<PollRun, EnvironmentError> {
		let initial = self.source.read(self.offset)?;
		let mut detector = ChangeDetector::new(initial);
		let mut gaps = GapAggregator::with_capacity(initial_capacity(self.target_gaps));
		let mut iterations: u64 = 0;

		debug!(
			"Polling MSR {:#x} on CPU {} for {} gaps",
			self.offset,
			self.source.core(),
			self.target_gaps
		);

		let start = Instant::now();
		while gaps.len() < self.target_gaps {
			let raw = self.source.read(self.offset)?;
			iterations += 1;

			if let Observation::Gap(gap) = detector.observe_with(raw, Instant::now) {
				gaps.push(gap);
			}
		}
		let elapsed = start.elapsed();

		Ok(PollRun {
			gaps,
			first_raw: initial,
			last_raw: detector.last_change().map_or(initial, |sample| sample.raw),
			iterations,
			elapsed,
		})
	}

	pub fn into_source(self) -> S {
		self.source
	}
}

/// Gap buffer reserved up front; larger runs grow it while polling
fn initial_capacity(target_gaps: usize) -> usize {
	target_gaps.min(MAX_RESERVED_GAPS)
}
