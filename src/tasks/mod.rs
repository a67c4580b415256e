//! Background Tasks Module
//!
//! Contains the background work that runs alongside a cache instance.
//!
//! # Tasks
//! - Disk worker: applies disk tier jobs one at a time, in submission order

mod disk_worker;

pub use disk_worker::{spawn_disk_worker, DiskQueue};
