//! The process table and its per-tick reconciliation with `/proc`.

pub mod process;
pub mod sort;

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, error, trace, warn};

use crate::collector::procfs::{self, ProcError, SysClock};
use crate::collector::traits::FileSystem;
use crate::config::Config;
use crate::users::{UserLookup, UserTable};

pub use process::Process;
pub use sort::SortKey;

/// Owns every process record and the system-wide counters.
///
/// `list` holds PIDs in render order; `map` owns the records. After every
/// [`update`](Monitor::update) the two agree exactly (invariant checked at
/// the end of the pass).
pub struct Monitor<F: FileSystem> {
    fs: F,
    proc_path: String,

    pub list: Vec<u32>,
    pub map: HashMap<u32, Process>,

    pub num_cpus: usize,
    /// Total physical memory in bytes.
    pub mem_total: u64,
    /// Bytes per page, for RSS math.
    pub page_size: u64,
    /// Jiffies per second (USER_HZ).
    pub clk_tck: u64,

    /// Sum of the aggregate cpu line at the last update.
    pub cpu_time_total: u64,
    /// Movement of that sum since the previous update; zero on the first
    /// pass and whenever the counter fails to advance, so percentage math
    /// never divides by zero or underflows.
    pub cpu_time_diff: u64,
}

impl<F: FileSystem> Monitor<F> {
    /// Samples the static system facts and returns an empty table.
    pub fn new(fs: F, proc_path: impl Into<String>, clock: SysClock) -> Result<Self, ProcError> {
        let proc_path = proc_path.into();
        let mem_total = procfs::read_meminfo(&fs, &proc_path)?;
        let sys = procfs::read_system_stat(&fs, &proc_path)?;

        Ok(Self {
            fs,
            proc_path,
            list: Vec::new(),
            map: HashMap::new(),
            num_cpus: sys.num_cpus,
            mem_total,
            page_size: clock.page_size,
            clk_tck: clock.clk_tck,
            cpu_time_total: 0,
            cpu_time_diff: 0,
        })
    }

    /// One tick: reconcile the table with `/proc`, prune the dead, order
    /// the survivors.
    ///
    /// Per-PID failures are swallowed (the process is exiting underneath
    /// us); a failure to read `/proc` itself or `/proc/stat` is returned
    /// and ends the program.
    pub fn update(&mut self, cfg: &Config, users: &UserTable) -> Result<(), ProcError> {
        let sys = procfs::read_system_stat(&self.fs, &self.proc_path)?;
        self.num_cpus = sys.num_cpus;
        self.cpu_time_diff = if self.cpu_time_total == 0 {
            0
        } else {
            sys.cpu_time_total.saturating_sub(self.cpu_time_total)
        };
        self.cpu_time_total = sys.cpu_time_total;

        for p in self.map.values_mut() {
            p.alive = false;
            p.children.clear();
            p.tree_prefix.clear();
            p.is_last_child = false;
        }

        let entries = self.fs.read_dir(Path::new(&self.proc_path))?;
        for entry in entries {
            let Some(name) = entry.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Ok(pid) = name.parse::<u32>() else {
                continue; // non-PID entry
            };
            if !cfg.pid_allowed(pid) {
                continue;
            }

            if let Some(p) = self.map.get_mut(&pid) {
                match p.refresh(&self.fs, &self.proc_path) {
                    Ok(()) => p.alive = true,
                    // Leave the record dead; the prune below removes it.
                    Err(e) => trace!(pid, error = %e, "refresh failed, pruning"),
                }
            } else {
                match Process::new(&self.fs, &self.proc_path, pid) {
                    Ok(mut p) => {
                        if p.is_kernel_thread() && !cfg.show_kernel {
                            continue;
                        }
                        match users.lookup(p.uid) {
                            UserLookup::User(user) => p.user = user.to_string(),
                            UserLookup::NotWhitelisted => continue,
                            UserLookup::Unknown => p.user = "unknown".to_string(),
                        }
                        p.alive = true;
                        self.list.push(pid);
                        self.map.insert(pid, p);
                    }
                    Err(e) if e.is_transient() => {
                        trace!(pid, error = %e, "process vanished during first sample")
                    }
                    Err(e) => debug!(pid, error = %e, "skipping unreadable process"),
                }
            }
        }

        self.prune_dead();

        if cfg.tree {
            self.list.sort_unstable();
            self.associate();
        } else {
            sort::sort_list(&mut self.list, &self.map, cfg.sort);
        }

        self.check_sync(cfg);
        Ok(())
    }

    fn prune_dead(&mut self) {
        let before = self.list.len();
        self.map.retain(|_, p| p.alive);
        let map = &self.map;
        self.list.retain(|pid| map.contains_key(pid));
        let removed = before - self.list.len();
        if removed > 0 {
            debug!(removed, remaining = self.list.len(), "pruned dead processes");
        }
    }

    /// Rebuilds parent/child links and reorders `list` depth-first.
    ///
    /// `list` must already be PID-ascending so every children list comes
    /// out ascending too. A process whose parent has been reaped (or
    /// filtered out) is reparented to PID 1, or treated as a root when
    /// PID 1 itself is absent.
    fn associate(&mut self) {
        let pids = self.list.clone();
        let mut roots: Vec<u32> = Vec::new();

        for &pid in &pids {
            let ppid = self.map[&pid].ppid;
            if pid == 1 || pid == 2 || ppid == 0 {
                roots.push(pid);
            } else if ppid != pid && self.map.contains_key(&ppid) {
                self.map.get_mut(&ppid).unwrap().children.push(pid);
            } else if self.map.contains_key(&1) {
                warn!(pid, ppid, "parent not in table, reparenting to init");
                self.map.get_mut(&1).unwrap().children.push(pid);
            } else {
                warn!(pid, ppid, "parent not in table, promoting to root");
                roots.push(pid);
            }
        }

        let mut order = Vec::with_capacity(pids.len());
        for &root in &roots {
            self.walk(root, String::new(), String::new(), false, &mut order);
        }
        self.list = order;
    }

    fn walk(
        &mut self,
        pid: u32,
        prefix: String,
        child_prefix: String,
        is_last: bool,
        order: &mut Vec<u32>,
    ) {
        let children = {
            let p = self.map.get_mut(&pid).unwrap();
            p.tree_prefix = prefix;
            p.is_last_child = is_last;
            p.children.clone()
        };
        order.push(pid);

        let count = children.len();
        for (i, child) in children.into_iter().enumerate() {
            let last = i + 1 == count;
            let (glyph, pad) = if last { ("└─ ", "   ") } else { ("├─ ", "│  ") };
            self.walk(
                child,
                format!("{}{}", child_prefix, glyph),
                format!("{}{}", child_prefix, pad),
                last,
                order,
            );
        }
    }

    /// List/map desync is a programming error: abort under debug, log and
    /// rebuild in release.
    fn check_sync(&mut self, cfg: &Config) {
        let in_sync = self.list.len() == self.map.len()
            && self.list.iter().all(|pid| self.map.contains_key(pid));
        debug_assert!(in_sync, "process list and map out of sync");
        if !in_sync {
            error!(
                list = self.list.len(),
                map = self.map.len(),
                "process list and map out of sync, rebuilding list"
            );
            self.list = self.map.keys().copied().collect();
            sort::sort_list(&mut self.list, &self.map, cfg.sort);
        }
    }
}
