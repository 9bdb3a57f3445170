//! Process snapshots taken when a chain link is created

use serde::{Deserialize, Serialize};
use std::fmt;
use sysinfo::{ProcessesToUpdate, System};

/// Thread count used when the platform does not report one
pub const UNKNOWN_THREADS: i64 = -1;

/// Memory figures for the current process and the host, in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryStats {
    pub resident_bytes: u64,
    pub virtual_bytes: u64,
    pub total_system_bytes: u64,
    pub used_system_bytes: u64,
}

impl MemoryStats {
    /// Read memory statistics, or `None` when the process cannot be inspected
    pub fn read() -> Option<Self> {
        let pid = sysinfo::get_current_pid().ok()?;
        let mut system = System::new();
        system.refresh_memory();
        system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);

        let process = system.process(pid)?;
        Some(Self {
            resident_bytes: process.memory(),
            virtual_bytes: process.virtual_memory(),
            total_system_bytes: system.total_memory(),
            used_system_bytes: system.used_memory(),
        })
    }
}

/// A snapshot of process state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Process {
    threads: i64,
    cpus: i64,
    foreign_calls: i64,
    memory: Option<MemoryStats>,
}

impl Process {
    /// Capture the current process state
    ///
    /// Every component degrades independently: an unreadable thread count
    /// becomes [`UNKNOWN_THREADS`] and unreadable memory statistics become
    /// `None`.
    pub fn capture() -> Self {
        Self {
            threads: thread_count().unwrap_or(UNKNOWN_THREADS),
            cpus: num_cpus::get() as i64,
            foreign_calls: 0,
            memory: MemoryStats::read(),
        }
    }

    /// Number of threads in the process, or -1 when unknown
    pub fn threads(&self) -> i64 {
        self.threads
    }

    /// Number of logical CPUs available to the process
    pub fn cpus(&self) -> i64 {
        self.cpus
    }

    /// Foreign function calls made by the process
    ///
    /// Rust keeps no such counter, so this is always 0.
    pub fn foreign_calls(&self) -> i64 {
        self.foreign_calls
    }

    pub fn memory(&self) -> Option<&MemoryStats> {
        self.memory.as_ref()
    }
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "threads: {}, cpus: {}, foreign calls: {}",
            self.threads, self.cpus, self.foreign_calls
        )
    }
}

#[cfg(target_os = "linux")]
fn thread_count() -> Option<i64> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    status
        .lines()
        .find_map(|line| line.strip_prefix("Threads:"))
        .and_then(|count| count.trim().parse().ok())
}

#[cfg(not(target_os = "linux"))]
fn thread_count() -> Option<i64> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_reports_cpus() {
        let process = Process::capture();
        assert!(process.cpus() >= 1);
        assert_eq!(process.foreign_calls(), 0);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_thread_count_on_linux() {
        let process = Process::capture();
        assert!(process.threads() >= 1);
    }

    #[test]
    fn test_display() {
        let process = Process {
            threads: 4,
            cpus: 8,
            foreign_calls: 0,
            memory: None,
        };
        assert_eq!(process.to_string(), "threads: 4, cpus: 8, foreign calls: 0");
    }
}
