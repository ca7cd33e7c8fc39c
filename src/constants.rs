use std::time::Duration;

// Intel RAPL MSR addresses
pub const MSR_RAPL_POWER_UNIT: u32 = 0x606;
pub const MSR_PKG_ENERGY_STATUS: u32 = 0x611;
pub const MSR_PP0_ENERGY_STATUS: u32 = 0x639;
pub const MSR_PP1_ENERGY_STATUS: u32 = 0x641;
pub const MSR_DRAM_ENERGY_STATUS: u32 = 0x619;

// RAPL unit bitfields inside MSR_RAPL_POWER_UNIT
pub const POWER_UNIT_OFFSET: u32 = 0;
pub const POWER_UNIT_MASK: u64 = 0x0F;
pub const ENERGY_UNIT_OFFSET: u32 = 0x08;
pub const ENERGY_UNIT_MASK: u64 = 0x1F00;
pub const TIME_UNIT_OFFSET: u32 = 0x10;
pub const TIME_UNIT_MASK: u64 = 0xF_0000;

/// Gaps collected per unit of the `-t` duration multiplier
pub const MAX_GAPS: usize = 1000;

/// Upper bound on the gap buffer reserved before polling starts
pub const MAX_RESERVED_GAPS: usize = MAX_GAPS * 64;

// Output locations
pub const GAPS_DUMP_PATH: &str = "/tmp/gaps_msr.txt";
pub const SAMPLE_LOG_DIR: &str = "/tmp";

// Interval sampling settings
pub const SAMPLE_PERIOD: Duration = Duration::from_secs(1);
pub const DEFAULT_PACKAGES: usize = 2;

// Process exit statuses
pub const EXIT_NO_SUCH_CORE: i32 = 2;
pub const EXIT_NO_MSR_SUPPORT: i32 = 3;
pub const EXIT_IO_FAILURE: i32 = 127;
pub const EXIT_USAGE: i32 = -1;
