//! Parsers for the procfs artifacts the monitor consumes.
//!
//! These are pure functions over file content, so tests can drive them with
//! string fixtures. The `read_*` wrappers bind them to a [`FileSystem`]
//! and map the I/O errors of vanished PID directories to
//! [`ProcError::NotFound`].

use std::io;
use std::path::Path;

use crate::collector::traits::FileSystem;

/// Failure while reading or parsing a procfs file.
///
/// `NotFound` covers the race between listing `/proc` and reading a PID's
/// files: the process exited in between. `Malformed` covers unexpected
/// field counts or non-numeric fields. Both are transient at the monitor
/// level; `Io` is anything else.
#[derive(Debug)]
pub enum ProcError {
    NotFound,
    Malformed(String),
    Io(io::Error),
}

impl std::fmt::Display for ProcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcError::NotFound => write!(f, "process disappeared"),
            ProcError::Malformed(msg) => write!(f, "malformed procfs data: {}", msg),
            ProcError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ProcError {}

impl From<io::Error> for ProcError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::NotFound {
            ProcError::NotFound
        } else {
            ProcError::Io(e)
        }
    }
}

impl ProcError {
    /// True for the per-PID failures the monitor swallows (the process is
    /// simply gone or mid-teardown); false for environmental errors.
    pub fn is_transient(&self) -> bool {
        matches!(self, ProcError::NotFound | ProcError::Malformed(_))
    }
}

/// The fields of `/proc/<pid>/stat` the monitor uses.
#[derive(Debug, Clone, Default)]
pub struct PidStat {
    pub pid: u32,
    pub comm: String,
    pub state: char,
    pub ppid: u32,
    pub pgrp: i32,
    /// User-mode jiffies.
    pub utime: u64,
    /// Kernel-mode jiffies.
    pub stime: u64,
    /// Resident set size in pages.
    pub rss: u64,
}

/// Parses `/proc/<pid>/stat` content.
///
/// The comm field is delimited by the first `(` and the last `)` on the
/// line: argv[0] may itself contain spaces and parentheses, so scanning
/// for the closing paren from the right is the only correct split.
pub fn parse_pid_stat(content: &str) -> Result<PidStat, ProcError> {
    let content = content.trim();

    let open = content
        .find('(')
        .ok_or_else(|| ProcError::Malformed("missing '(' in stat".into()))?;
    let close = content
        .rfind(')')
        .ok_or_else(|| ProcError::Malformed("missing ')' in stat".into()))?;
    if close <= open {
        return Err(ProcError::Malformed("inverted parentheses in stat".into()));
    }

    let pid: u32 = content[..open]
        .trim()
        .parse()
        .map_err(|_| ProcError::Malformed("non-numeric pid field".into()))?;
    let comm = content[open + 1..close].to_string();

    let fields: Vec<&str> = content[close + 1..].split_whitespace().collect();
    if fields.len() < 42 {
        return Err(ProcError::Malformed(format!(
            "stat has {} fields after comm, expected at least 42",
            fields.len()
        )));
    }

    let state = fields[0]
        .chars()
        .next()
        .ok_or_else(|| ProcError::Malformed("empty state field".into()))?;

    fn num<T: std::str::FromStr>(fields: &[&str], idx: usize, name: &str) -> Result<T, ProcError> {
        fields[idx]
            .parse()
            .map_err(|_| ProcError::Malformed(format!("non-numeric {} field", name)))
    }

    // rss is signed in the kernel's format; clamp the sentinel negatives.
    let rss: i64 = num(&fields, 21, "rss")?;

    Ok(PidStat {
        pid,
        comm,
        state,
        ppid: num(&fields, 1, "ppid")?,
        pgrp: num(&fields, 2, "pgrp")?,
        utime: num(&fields, 11, "utime")?,
        stime: num(&fields, 12, "stime")?,
        rss: rss.max(0) as u64,
    })
}

/// Command line recovered from `/proc/<pid>/cmdline`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CmdlineInfo {
    /// Full argv, NUL bytes replaced by spaces, trimmed.
    pub command: String,
    /// Basename of argv[0]. None when the file is empty (kernel threads,
    /// zombies).
    pub arg0_basename: Option<String>,
}

/// Parses `/proc/<pid>/cmdline` content.
///
/// Arguments are NUL-separated and the buffer usually carries trailing
/// NULs; the basename is taken from argv[0] before the replacement so a
/// binary named `Web Content` is not split apart.
pub fn parse_cmdline(raw: &str) -> CmdlineInfo {
    let command = raw.replace('\0', " ").trim().to_string();
    if command.is_empty() {
        return CmdlineInfo::default();
    }

    let arg0 = raw.split('\0').next().unwrap_or("");
    let basename = arg0.rsplit('/').next().unwrap_or(arg0);

    CmdlineInfo {
        command,
        arg0_basename: Some(basename.to_string()),
    }
}

/// Parses the effective UID out of `/proc/<pid>/status`.
///
/// The `Uid:` line carries real, effective, saved and filesystem UIDs in
/// that order; the effective one decides ownership for display.
pub fn parse_status_uid(content: &str) -> Result<u32, ProcError> {
    for line in content.lines() {
        if let Some(rest) = line.strip_prefix("Uid:") {
            return rest
                .split_whitespace()
                .nth(1)
                .ok_or_else(|| ProcError::Malformed("short Uid line in status".into()))?
                .parse()
                .map_err(|_| ProcError::Malformed("non-numeric uid in status".into()));
        }
    }
    Err(ProcError::Malformed("no Uid line in status".into()))
}

/// System-wide CPU accounting from `/proc/stat`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemStat {
    /// Sum of all jiffy fields on the aggregate `cpu ` line.
    pub cpu_time_total: u64,
    /// Number of `cpuN` lines.
    pub num_cpus: usize,
}

/// Parses `/proc/stat` content.
pub fn parse_system_stat(content: &str) -> Result<SystemStat, ProcError> {
    let mut stat = SystemStat::default();
    let mut saw_aggregate = false;

    for line in content.lines() {
        if let Some(rest) = line.strip_prefix("cpu ") {
            saw_aggregate = true;
            for value in rest.split_whitespace() {
                let jiffies: u64 = value
                    .parse()
                    .map_err(|_| ProcError::Malformed("non-numeric jiffy count".into()))?;
                stat.cpu_time_total += jiffies;
            }
        } else if line.starts_with("cpu") {
            stat.num_cpus += 1;
        } else {
            // The cpu lines lead the file; nothing below them matters here.
            break;
        }
    }

    if !saw_aggregate {
        return Err(ProcError::Malformed("no aggregate cpu line in stat".into()));
    }
    stat.num_cpus = stat.num_cpus.max(1);
    Ok(stat)
}

/// Parses `MemTotal` out of `/proc/meminfo`, returned in bytes.
pub fn parse_meminfo(content: &str) -> Result<u64, ProcError> {
    for line in content.lines() {
        if let Some(rest) = line.strip_prefix("MemTotal:") {
            // The value is always expressed in kB.
            let kb: u64 = rest
                .split_whitespace()
                .next()
                .ok_or_else(|| ProcError::Malformed("empty MemTotal line".into()))?
                .parse()
                .map_err(|_| ProcError::Malformed("non-numeric MemTotal".into()))?;
            return Ok(kb * 1024);
        }
    }
    Err(ProcError::Malformed("no MemTotal line in meminfo".into()))
}

pub fn read_pid_stat<F: FileSystem>(fs: &F, proc_path: &str, pid: u32) -> Result<PidStat, ProcError> {
    let path = format!("{}/{}/stat", proc_path, pid);
    parse_pid_stat(&fs.read_to_string(Path::new(&path))?)
}

pub fn read_pid_cmdline<F: FileSystem>(
    fs: &F,
    proc_path: &str,
    pid: u32,
) -> Result<CmdlineInfo, ProcError> {
    let path = format!("{}/{}/cmdline", proc_path, pid);
    Ok(parse_cmdline(&fs.read_to_string(Path::new(&path))?))
}

pub fn read_pid_uid<F: FileSystem>(fs: &F, proc_path: &str, pid: u32) -> Result<u32, ProcError> {
    let path = format!("{}/{}/status", proc_path, pid);
    parse_status_uid(&fs.read_to_string(Path::new(&path))?)
}

pub fn read_system_stat<F: FileSystem>(fs: &F, proc_path: &str) -> Result<SystemStat, ProcError> {
    let path = format!("{}/stat", proc_path);
    parse_system_stat(&fs.read_to_string(Path::new(&path))?)
}

pub fn read_meminfo<F: FileSystem>(fs: &F, proc_path: &str) -> Result<u64, ProcError> {
    let path = format!("{}/meminfo", proc_path);
    parse_meminfo(&fs.read_to_string(Path::new(&path))?)
}

/// Kernel clock constants sampled once at startup.
///
/// `TIME+` scales by the real USER_HZ instead of assuming 100, and RSS
/// math uses the real page size.
#[derive(Debug, Clone, Copy)]
pub struct SysClock {
    /// Bytes per page, from `sysconf(_SC_PAGESIZE)`.
    pub page_size: u64,
    /// Jiffies per second (USER_HZ), from `sysconf(_SC_CLK_TCK)`.
    pub clk_tck: u64,
}

impl SysClock {
    /// Queries the running kernel. `None` when sysconf is unavailable,
    /// which callers treat as an environmental failure.
    pub fn query() -> Option<Self> {
        use nix::unistd::{SysconfVar, sysconf};

        let page_size = sysconf(SysconfVar::PAGE_SIZE).ok()??;
        let clk_tck = sysconf(SysconfVar::CLK_TCK).ok()??;
        if page_size <= 0 || clk_tck <= 0 {
            return None;
        }
        Some(Self {
            page_size: page_size as u64,
            clk_tck: clk_tck as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat_line(comm: &str) -> String {
        format!(
            "42 ({}) S 1 42 42 0 -1 4194304 100 0 0 0 10 5 0 0 20 0 1 0 12345 12345678 250 \
             18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 17 0 0 0 0 0 0 0 0 0 0 0 0 0 0",
            comm
        )
    }

    #[test]
    fn pid_stat_basic_fields() {
        let stat = parse_pid_stat(&stat_line("bash")).unwrap();
        assert_eq!(stat.pid, 42);
        assert_eq!(stat.comm, "bash");
        assert_eq!(stat.state, 'S');
        assert_eq!(stat.ppid, 1);
        assert_eq!(stat.pgrp, 42);
        assert_eq!(stat.utime, 10);
        assert_eq!(stat.stime, 5);
        assert_eq!(stat.rss, 250);
    }

    #[test]
    fn pid_stat_comm_with_spaces_and_parens() {
        // The field after the recovered comm must still parse as the state
        // byte even when comm itself contains parens and spaces.
        let stat = parse_pid_stat(&stat_line("weird (name) with spaces")).unwrap();
        assert_eq!(stat.comm, "weird (name) with spaces");
        assert_eq!(stat.state, 'S');
        assert_eq!(stat.ppid, 1);
    }

    #[test]
    fn pid_stat_rejects_short_lines() {
        let err = parse_pid_stat("42 (bash) S 1 42").unwrap_err();
        assert!(matches!(err, ProcError::Malformed(_)));
    }

    #[test]
    fn pid_stat_rejects_missing_parens() {
        assert!(matches!(
            parse_pid_stat("42 bash S 1 42"),
            Err(ProcError::Malformed(_))
        ));
    }

    #[test]
    fn pid_stat_rejects_non_numeric_counter() {
        let line = stat_line("bash").replacen(" 10 5 ", " ten 5 ", 1);
        assert!(matches!(parse_pid_stat(&line), Err(ProcError::Malformed(_))));
    }

    #[test]
    fn pid_stat_clamps_negative_rss() {
        let line = stat_line("bash").replacen(" 12345678 250 ", " 12345678 -1 ", 1);
        assert_eq!(parse_pid_stat(&line).unwrap().rss, 0);
    }

    #[test]
    fn cmdline_joins_nul_separated_argv() {
        let info = parse_cmdline("/usr/bin/foo\0--bar\0baz\0\0");
        assert_eq!(info.command, "/usr/bin/foo --bar baz");
        assert_eq!(info.arg0_basename.as_deref(), Some("foo"));
    }

    #[test]
    fn cmdline_keeps_spaces_inside_arg0() {
        let info = parse_cmdline("/usr/lib/firefox/Web Content\0-childID\x004\0");
        assert_eq!(info.arg0_basename.as_deref(), Some("Web Content"));
    }

    #[test]
    fn cmdline_empty_for_kernel_threads() {
        assert_eq!(parse_cmdline(""), CmdlineInfo::default());
        assert_eq!(parse_cmdline("\0\0"), CmdlineInfo::default());
    }

    #[test]
    fn status_uid_takes_effective() {
        let content = "Name:\tbash\nPid:\t42\nUid:\t1000\t1001\t1000\t1000\nGid:\t1000\t1000\t1000\t1000\n";
        assert_eq!(parse_status_uid(content).unwrap(), 1001);
    }

    #[test]
    fn status_uid_missing_line_is_malformed() {
        assert!(matches!(
            parse_status_uid("Name:\tbash\n"),
            Err(ProcError::Malformed(_))
        ));
    }

    #[test]
    fn system_stat_sums_aggregate_and_counts_cpus() {
        let content = "cpu  100 20 30 400 5 0 6 0 0 0\n\
                       cpu0 50 10 15 200 2 0 3 0 0 0\n\
                       cpu1 50 10 15 200 3 0 3 0 0 0\n\
                       intr 12345\n";
        let stat = parse_system_stat(content).unwrap();
        assert_eq!(stat.cpu_time_total, 561);
        assert_eq!(stat.num_cpus, 2);
    }

    #[test]
    fn system_stat_without_cpu_line_is_malformed() {
        assert!(matches!(
            parse_system_stat("intr 12345\n"),
            Err(ProcError::Malformed(_))
        ));
    }

    #[test]
    fn meminfo_converts_kb_to_bytes() {
        let content = "MemTotal:       16371752 kB\nMemFree:         8192000 kB\n";
        assert_eq!(parse_meminfo(content).unwrap(), 16371752 * 1024);
    }

    #[test]
    fn meminfo_without_total_is_malformed() {
        assert!(matches!(
            parse_meminfo("MemFree: 1 kB\n"),
            Err(ProcError::Malformed(_))
        ));
    }

    #[test]
    fn not_found_io_error_maps_to_not_found() {
        let err: ProcError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, ProcError::NotFound));
        assert!(err.is_transient());

        let err: ProcError = io::Error::new(io::ErrorKind::PermissionDenied, "nope").into();
        assert!(matches!(err, ProcError::Io(_)));
        assert!(!err.is_transient());
    }
}
