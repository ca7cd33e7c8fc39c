use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::constants::{EXIT_IO_FAILURE, EXIT_NO_MSR_SUPPORT, EXIT_NO_SUCH_CORE};

/// Failure of the register channel.
///
/// Every variant means the environment is misconfigured (missing core, no MSR
/// driver, missing permissions), so none of them is retried. The binaries map
/// each one to its own exit status with [`EnvironmentError::exit_code`].
#[derive(Debug, Error)]
pub enum EnvironmentError {
	#[error("No CPU {core}")]
	NoSuchCore { core: usize },

	#[error("CPU {core} doesn't support MSRs")]
	Unsupported { core: usize },

	#[error("cannot open {}: {source}", path.display())]
	Open { path: PathBuf, source: io::Error },

	#[error("read of MSR {offset:#x} on CPU {core} failed: {source}")]
	Read { core: usize, offset: u32, source: io::Error },

	#[error("short read of MSR {offset:#x} on CPU {core}: {got} of 8 bytes")]
	ShortRead { core: usize, offset: u32, got: usize },
}

impl EnvironmentError {
	/// Classifies a failed open of `/dev/cpu/<core>/msr` by errno
	pub fn from_open(core: usize, path: PathBuf, source: io::Error) -> Self {
		match source.raw_os_error() {
			Some(libc::ENXIO) => EnvironmentError::NoSuchCore { core },
			Some(libc::EIO) => EnvironmentError::Unsupported { core },
			_ => EnvironmentError::Open { path, source },
		}
	}

	/// Process exit status documented for this failure
	pub fn exit_code(&self) -> i32 {
		match self {
			EnvironmentError::NoSuchCore { .. } => EXIT_NO_SUCH_CORE,
			EnvironmentError::Unsupported { .. } => EXIT_NO_MSR_SUPPORT,
			EnvironmentError::Open { .. } | EnvironmentError::Read { .. } | EnvironmentError::ShortRead { .. } => {
				EXIT_IO_FAILURE
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn open_errno_selects_exit_status() {
		let path = PathBuf::from("/dev/cpu/7/msr");

		let err = EnvironmentError::from_open(7, path.clone(), io::Error::from_raw_os_error(libc::ENXIO));
		assert!(matches!(err, EnvironmentError::NoSuchCore { core: 7 }));
		assert_eq!(err.exit_code(), 2);

		let err = EnvironmentError::from_open(7, path.clone(), io::Error::from_raw_os_error(libc::EIO));
		assert!(matches!(err, EnvironmentError::Unsupported { core: 7 }));
		assert_eq!(err.exit_code(), 3);

		let err = EnvironmentError::from_open(7, path, io::Error::from_raw_os_error(libc::EACCES));
		assert!(matches!(err, EnvironmentError::Open { .. }));
		assert_eq!(err.exit_code(), 127);
	}

	#[test]
	fn short_read_is_an_io_failure() {
		let err = EnvironmentError::ShortRead {
			core: 0,
			offset: 0x611,
			got: 4,
		};
		assert_eq!(err.exit_code(), 127);
		assert_eq!(err.to_string(), "short read of MSR 0x611 on CPU 0: 4 of 8 bytes");
	}
}
