//! Control side helpers for scheduling grains.

pub mod parameter;
pub mod timer;
