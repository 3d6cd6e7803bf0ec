//! Synthetic `/proc` trees for tests.
//!
//! `ProcSpec` describes one process; `install` writes its `stat`, `status`
//! and `cmdline` files into a [`MockFs`]. `set_system_files` writes
//! `/proc/stat` and `/proc/meminfo`. Tests compose these instead of
//! hand-writing procfs content in every case.

use super::MockFs;

/// Passwd content shared by user-resolution tests.
pub const PASSWD: &str = "root:x:0:0:root:/root:/bin/bash\n\
                          daemon:x:1:1:daemon:/usr/sbin:/usr/sbin/nologin\n\
                          justin:x:1000:1000:Justin,,,:/home/justin:/bin/zsh\n\
                          mallory:x:1001:1001::/home/mallory:/bin/sh\n";

/// One synthetic process. Use struct-update syntax from one of the
/// constructors to vary individual fields.
#[derive(Debug, Clone)]
pub struct ProcSpec {
    pub pid: u32,
    pub comm: String,
    pub state: char,
    pub ppid: u32,
    pub pgrp: i32,
    pub utime: u64,
    pub stime: u64,
    pub rss: u64,
    pub uid: u32,
    /// Raw cmdline content, NUL separators included. Empty for kernel
    /// threads and zombies.
    pub cmdline: String,
}

impl ProcSpec {
    /// An ordinary sleeping user process named `comm`.
    pub fn user(pid: u32, comm: &str) -> Self {
        Self {
            pid,
            comm: comm.to_string(),
            state: 'S',
            ppid: 1,
            pgrp: pid as i32,
            utime: 0,
            stime: 0,
            rss: 256,
            uid: 1000,
            cmdline: format!("/usr/bin/{}\0", comm),
        }
    }

    /// A kernel thread: process group 0, empty cmdline.
    pub fn kernel(pid: u32, comm: &str) -> Self {
        Self {
            pid,
            comm: comm.to_string(),
            state: 'S',
            ppid: 2,
            pgrp: 0,
            utime: 0,
            stime: 0,
            rss: 0,
            uid: 0,
            cmdline: String::new(),
        }
    }

    /// The stat line for this process, 44 fields with comm in parens.
    pub fn stat_line(&self) -> String {
        format!(
            "{pid} ({comm}) {state} {ppid} {pgrp} {pgrp} 0 -1 4194304 100 0 0 0 \
             {utime} {stime} 0 0 20 0 1 0 12345 12345678 {rss} 18446744073709551615 \
             0 0 0 0 0 0 0 0 0 0 0 0 17 0 0 0 0 0 0",
            pid = self.pid,
            comm = self.comm,
            state = self.state,
            ppid = self.ppid,
            pgrp = self.pgrp,
            utime = self.utime,
            stime = self.stime,
            rss = self.rss,
        )
    }

    fn status_content(&self) -> String {
        format!(
            "Name:\t{comm}\nPid:\t{pid}\nPPid:\t{ppid}\n\
             Uid:\t{uid}\t{uid}\t{uid}\t{uid}\nGid:\t{uid}\t{uid}\t{uid}\t{uid}\n",
            comm = self.comm,
            pid = self.pid,
            ppid = self.ppid,
            uid = self.uid,
        )
    }
}

/// Writes the process's files under `/proc/<pid>/`.
pub fn install(fs: &mut MockFs, spec: &ProcSpec) {
    let base = format!("/proc/{}", spec.pid);
    fs.add_dir(&base);
    fs.add_file(format!("{}/stat", base), spec.stat_line());
    fs.add_file(format!("{}/status", base), spec.status_content());
    fs.add_file(format!("{}/cmdline", base), spec.cmdline.clone());
}

/// Writes `/proc/stat` and `/proc/meminfo`.
///
/// The aggregate cpu line carries `cpu_time_total` in its first field and
/// zeros elsewhere, so the sum is exactly `cpu_time_total`.
pub fn set_system_files(fs: &mut MockFs, cpu_time_total: u64, num_cpus: usize, mem_total_kb: u64) {
    let mut stat = format!("cpu  {} 0 0 0 0 0 0 0 0 0\n", cpu_time_total);
    for n in 0..num_cpus {
        stat.push_str(&format!("cpu{} 0 0 0 0 0 0 0 0 0 0\n", n));
    }
    stat.push_str("intr 0\nctxt 0\n");
    fs.add_file("/proc/stat", stat);
    fs.add_file("/proc/meminfo", format!("MemTotal:       {} kB\nMemFree: 0 kB\n", mem_total_kb));
}

/// A small but complete system: 4 CPUs, 16 GiB of memory, init plus two
/// user processes and one kernel thread.
pub fn typical_system() -> MockFs {
    let mut fs = MockFs::new();
    set_system_files(&mut fs, 1000, 4, 16 * 1024 * 1024);

    install(
        &mut fs,
        &ProcSpec {
            uid: 0,
            ppid: 0,
            cmdline: "/sbin/init\0splash\0".to_string(),
            ..ProcSpec::user(1, "init")
        },
    );
    install(&mut fs, &ProcSpec::kernel(2, "kthreadd"));
    install(
        &mut fs,
        &ProcSpec {
            utime: 10,
            stime: 5,
            ..ProcSpec::user(1000, "bash")
        },
    );
    install(
        &mut fs,
        &ProcSpec {
            uid: 1001,
            rss: 4096,
            ..ProcSpec::user(1001, "firefox")
        },
    );

    fs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::procfs::{parse_pid_stat, read_system_stat};

    #[test]
    fn spec_stat_line_round_trips_through_parser() {
        let spec = ProcSpec {
            utime: 7,
            stime: 3,
            ..ProcSpec::user(123, "worker")
        };
        let stat = parse_pid_stat(&spec.stat_line()).unwrap();
        assert_eq!(stat.pid, 123);
        assert_eq!(stat.comm, "worker");
        assert_eq!(stat.utime, 7);
        assert_eq!(stat.stime, 3);
        assert_eq!(stat.pgrp, 123);
    }

    #[test]
    fn typical_system_exposes_cpu_and_memory() {
        let fs = typical_system();
        let stat = read_system_stat(&fs, "/proc").unwrap();
        assert_eq!(stat.cpu_time_total, 1000);
        assert_eq!(stat.num_cpus, 4);
    }
}
