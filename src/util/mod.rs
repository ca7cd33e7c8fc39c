pub mod cpu;
pub mod msr;
