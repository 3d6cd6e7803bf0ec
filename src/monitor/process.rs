//! The in-memory record for one PID.

use crate::collector::procfs::{self, ProcError};
use crate::collector::traits::FileSystem;

/// One live process, owned by the monitor's map.
///
/// Counters are the cumulative values from the last sample; the `_diff`
/// fields carry the per-interval movement. Tree links hold PIDs rather
/// than references: the map is the sole owner of every record, and a dead
/// child must not keep its parent's memory alive (or vice versa).
#[derive(Debug, Clone)]
pub struct Process {
    pub pid: u32,
    pub uid: u32,
    /// Resolved owner, or `"unknown"` when the UID has no passwd entry.
    pub user: String,
    pub ppid: u32,
    pub pgrp: i32,
    /// Basename of argv[0]; comm for kernel threads and zombies.
    pub name: String,
    /// Full space-joined argv. Empty for kernel threads and zombies.
    pub command: String,
    /// Cumulative user-mode jiffies at the last sample.
    pub utime: u64,
    /// Cumulative kernel-mode jiffies at the last sample.
    pub stime: u64,
    /// Resident set size in pages at the last sample.
    pub rss: u64,
    pub utime_diff: u64,
    pub stime_diff: u64,
    /// One of `RSDZTW`.
    pub state: char,
    /// Cleared at the start of every monitor update, set by a successful
    /// refresh. Records still false afterwards are pruned.
    pub alive: bool,
    /// True only until the second sample; guards the `S`→`R`
    /// reclassification against the zero-valued first deltas.
    pub initializing: bool,
    /// Child PIDs in ascending order, rebuilt each tick in tree mode.
    pub children: Vec<u32>,
    pub tree_prefix: String,
    pub is_last_child: bool,
}

impl Process {
    /// Samples a PID for the first time.
    ///
    /// Reads `stat`, `status` (ownership) and, for non-zombies, `cmdline`.
    /// Any failure surfaces as a [`ProcError`]; the caller skips the PID on
    /// transient ones.
    pub fn new<F: FileSystem>(fs: &F, proc_path: &str, pid: u32) -> Result<Self, ProcError> {
        let stat = procfs::read_pid_stat(fs, proc_path, pid)?;
        let uid = procfs::read_pid_uid(fs, proc_path, pid)?;

        // Zombies keep a stat entry but their cmdline is gone; skip the read.
        let cmdline = if stat.state == 'Z' {
            procfs::CmdlineInfo::default()
        } else {
            procfs::read_pid_cmdline(fs, proc_path, pid)?
        };

        let name = cmdline
            .arg0_basename
            .clone()
            .unwrap_or_else(|| stat.comm.clone());

        Ok(Self {
            pid,
            uid,
            user: String::new(),
            ppid: stat.ppid,
            pgrp: stat.pgrp,
            name,
            command: cmdline.command,
            utime: stat.utime,
            stime: stat.stime,
            rss: stat.rss,
            utime_diff: 0,
            stime_diff: 0,
            state: stat.state,
            alive: false,
            initializing: true,
            children: Vec::new(),
            tree_prefix: String::new(),
            is_last_child: false,
        })
    }

    /// Re-samples the process.
    ///
    /// Only `stat` is re-read: an exec changing the cmdline mid-tick is a
    /// benign drift not worth one extra file read per process per tick.
    /// Counter deltas saturate so a counter that failed to advance (or a
    /// wrapped one) yields zero, never underflow.
    pub fn refresh<F: FileSystem>(&mut self, fs: &F, proc_path: &str) -> Result<(), ProcError> {
        let stat = procfs::read_pid_stat(fs, proc_path, self.pid)?;

        self.initializing = false;
        self.utime_diff = stat.utime.saturating_sub(self.utime);
        self.stime_diff = stat.stime.saturating_sub(self.stime);
        self.utime = stat.utime;
        self.stime = stat.stime;
        self.rss = stat.rss;
        self.ppid = stat.ppid;
        self.pgrp = stat.pgrp;
        self.state = stat.state;

        // The kernel reports `S` for a process that ran and went back to
        // sleep within the interval; if its counters moved, show it
        // running. Only refreshes reclassify: a record's first sample has
        // zero deltas by definition.
        if self.state == 'S' && self.utime_diff + self.stime_diff > 0 {
            self.state = 'R';
        }

        Ok(())
    }

    /// Kernel threads live in process group 0.
    pub fn is_kernel_thread(&self) -> bool {
        self.pgrp == 0
    }

    /// Total jiffies moved this interval.
    pub fn cpu_diff(&self) -> u64 {
        self.utime_diff + self.stime_diff
    }

    /// Total cumulative jiffies.
    pub fn cpu_total(&self) -> u64 {
        self.utime + self.stime
    }
}
