use std::{io, mem};

/// Pins the calling thread to a single logical CPU
///
/// Callers treat failure as non-fatal: an unpinned run still measures, only
/// with more migration noise.
pub fn pin_to_core(core: usize) -> io::Result<()> {
	if core >= libc::CPU_SETSIZE as usize {
		return Err(io::Error::new(
			io::ErrorKind::InvalidInput,
			format!("CPU {} is outside the affinity mask", core),
		));
	}

	unsafe {
		let mut cpuset: libc::cpu_set_t = mem::zeroed();
		libc::CPU_ZERO(&mut cpuset);
		libc::CPU_SET(core, &mut cpuset);

		let thread_id = libc::pthread_self();
		let result = libc::pthread_setaffinity_np(thread_id, mem::size_of::<libc::cpu_set_t>(), &cpuset);

		if result != 0 {
			return Err(io::Error::from_raw_os_error(result));
		}
	}

	Ok(())
}
