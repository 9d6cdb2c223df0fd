//! # Architecture Abstraction Layer
//!
//! Hardware clock ports for targets without `std`. Each port provides a
//! [`Clock`](crate::time::Clock) the executive can pace frames with.

pub mod cortex_m4;
