use std::fs::File;
use std::os::unix::fs::FileExt;
use std::path::PathBuf;

use crate::error::EnvironmentError;

/// Anything that can hand out raw 64-bit register values by offset
///
/// The measurement drivers only ever see this trait, so they run the same way
/// against the MSR driver and against synthetic counters in tests.
pub trait RegisterSource {
	/// Reads the 8-byte register at `offset`
	fn read(&mut self, offset: u32) -> Result<u64, EnvironmentError>;

	/// Logical CPU the register space belongs to
	fn core(&self) -> usize;
}

impl<S: RegisterSource + ?Sized> RegisterSource for &mut S {
	fn read(&mut self, offset: u32) -> Result<u64, EnvironmentError> {
		(**self).read(offset)
	}

	fn core(&self) -> usize {
		(**self).core()
	}
}

/// An open `/dev/cpu/<core>/msr` channel
///
/// The handle is kept for the whole run so the polling loop pays only for the
/// positional read, not for reopening the device.
#[derive(Debug)]
pub struct MsrDevice {
	core: usize,
	file: File,
}

impl MsrDevice {
	/// Opens the MSR device of the given logical CPU
	pub fn open(core: usize) -> Result<Self, EnvironmentError> {
		let path = msr_path(core);
		match File::open(&path) {
			Ok(file) => Ok(Self { core, file }),
			Err(e) => Err(EnvironmentError::from_open(core, path, e)),
		}
	}
}

impl RegisterSource for MsrDevice {
	fn read(&mut self, offset: u32) -> Result<u64, EnvironmentError> {
		let mut buf = [0u8; 8];
		let got = self
			.file
			.read_at(&mut buf, u64::from(offset))
			.map_err(|source| EnvironmentError::Read {
				core: self.core,
				offset,
				source,
			})?;

		if got != buf.len() {
			return Err(EnvironmentError::ShortRead {
				core: self.core,
				offset,
				got,
			});
		}

		Ok(u64::from_ne_bytes(buf))
	}

	fn core(&self) -> usize {
		self.core
	}
}

/// Device node of the MSR driver for a logical CPU
pub fn msr_path(core: usize) -> PathBuf {
	PathBuf::from(format!("/dev/cpu/{}/msr", core))
}
