//! Domain layer - pure ABI logic with no I/O

pub mod abi;
