//! Best-effort runtime captures attached to chain links
//!
//! Every capture in this module returns a plain value or an `Option`, never a
//! `Result`: a failed capture degrades to sentinel or absent values so that
//! constructing a chain link cannot fail.

pub mod caller;
pub mod fragment;
pub mod process;

pub use caller::{Caller, UNKNOWN_FILE, UNKNOWN_FUNCTION, UNKNOWN_LINE};
pub use fragment::SourceFragment;
pub use process::{MemoryStats, Process, UNKNOWN_THREADS};
