//! Contract bindings used by the kernel account.

pub mod entry_point;
pub mod kernel;

pub use entry_point::EntryPoint;
