//! Sort keys for the process table.
//!
//! One enum replaces a family of named comparators; every ordering breaks
//! ties by ascending PID so the table never flickers between equal rows.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::monitor::process::Process;

/// Column the process list is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    Pid,
    User,
    Rss,
    /// Same ordering as [`SortKey::Rss`]; highlights the %MEM column.
    Mem,
    #[default]
    Cpu,
    Time,
    State,
    Command,
}

impl SortKey {
    /// All accepted flag spellings, for usage output.
    pub const NAMES: [&'static str; 8] = [
        "pid", "user", "rss", "mem", "cpu", "time", "state", "command",
    ];

    /// Compares two processes under this key, PID ascending as tiebreak.
    pub fn compare(self, a: &Process, b: &Process) -> Ordering {
        let primary = match self {
            SortKey::Pid => a.pid.cmp(&b.pid),
            SortKey::User => a.user.cmp(&b.user),
            SortKey::Rss | SortKey::Mem => b.rss.cmp(&a.rss),
            SortKey::Cpu => b.cpu_diff().cmp(&a.cpu_diff()),
            SortKey::Time => b.cpu_total().cmp(&a.cpu_total()),
            SortKey::State => a.state.cmp(&b.state),
            SortKey::Command => a.name.cmp(&b.name),
        };
        primary.then(a.pid.cmp(&b.pid))
    }

    /// Index of the column this key orders, for the header highlight.
    pub fn column_index(self) -> usize {
        match self {
            SortKey::Pid => 0,
            SortKey::User => 1,
            SortKey::Rss => 2,
            SortKey::Mem => 3,
            SortKey::Cpu => 4,
            SortKey::Time => 5,
            SortKey::State => 6,
            SortKey::Command => 7,
        }
    }
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pid" => Ok(SortKey::Pid),
            "user" => Ok(SortKey::User),
            "rss" => Ok(SortKey::Rss),
            "mem" => Ok(SortKey::Mem),
            "cpu" => Ok(SortKey::Cpu),
            "time" => Ok(SortKey::Time),
            "state" => Ok(SortKey::State),
            "command" => Ok(SortKey::Command),
            other => Err(format!(
                "{} is not a valid sort column (one of: {})",
                other,
                SortKey::NAMES.join(", ")
            )),
        }
    }
}

/// Orders `list` (PIDs into `map`) by `key`.
pub fn sort_list(list: &mut [u32], map: &HashMap<u32, Process>, key: SortKey) {
    list.sort_by(|&x, &y| key.compare(&map[&x], &map[&y]));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::scenarios::{self, ProcSpec};

    fn build(specs: &[ProcSpec]) -> (Vec<u32>, HashMap<u32, Process>) {
        let mut fs = crate::collector::mock::MockFs::new();
        scenarios::set_system_files(&mut fs, 1000, 2, 1024 * 1024);
        let mut map = HashMap::new();
        let mut list = Vec::new();
        for spec in specs {
            scenarios::install(&mut fs, spec);
            let mut p = Process::new(&fs, "/proc", spec.pid).unwrap();
            p.user = format!("u{}", spec.uid);
            list.push(spec.pid);
            map.insert(spec.pid, p);
        }
        (list, map)
    }

    fn diffs(map: &mut HashMap<u32, Process>, pid: u32, utime: u64, stime: u64) {
        let p = map.get_mut(&pid).unwrap();
        p.utime_diff = utime;
        p.stime_diff = stime;
    }

    #[test]
    fn cpu_sort_descends_with_pid_tiebreak() {
        let (mut list, mut map) = build(&[
            ProcSpec::user(10, "a"),
            ProcSpec::user(20, "b"),
            ProcSpec::user(30, "c"),
        ]);
        diffs(&mut map, 10, 5, 0);
        diffs(&mut map, 20, 0, 0);
        diffs(&mut map, 30, 2, 3);

        sort_list(&mut list, &map, SortKey::Cpu);
        // 10 and 30 tie at five jiffies; the lower PID wins.
        assert_eq!(list, vec![10, 30, 20]);
    }

    #[test]
    fn every_key_breaks_ties_by_pid() {
        let specs: Vec<ProcSpec> = [30u32, 10, 20]
            .iter()
            .map(|&pid| ProcSpec {
                rss: 100,
                utime: 4,
                stime: 4,
                ..ProcSpec::user(pid, "same")
            })
            .collect();
        let (mut list, map) = build(&specs);

        for key in [
            SortKey::Pid,
            SortKey::User,
            SortKey::Rss,
            SortKey::Mem,
            SortKey::Cpu,
            SortKey::Time,
            SortKey::State,
            SortKey::Command,
        ] {
            list.reverse();
            sort_list(&mut list, &map, key);
            assert_eq!(list, vec![10, 20, 30], "tiebreak failed for {:?}", key);
        }
    }

    #[test]
    fn rss_and_time_sort_descending() {
        let (mut list, map) = build(&[
            ProcSpec {
                rss: 10,
                utime: 100,
                stime: 0,
                ..ProcSpec::user(1, "a")
            },
            ProcSpec {
                rss: 500,
                utime: 1,
                stime: 0,
                ..ProcSpec::user(2, "b")
            },
        ]);

        sort_list(&mut list, &map, SortKey::Rss);
        assert_eq!(list, vec![2, 1]);
        sort_list(&mut list, &map, SortKey::Time);
        assert_eq!(list, vec![1, 2]);
    }

    #[test]
    fn name_and_user_sort_ascending() {
        let (mut list, mut map) = build(&[
            ProcSpec::user(5, "zsh"),
            ProcSpec::user(6, "awk"),
        ]);
        map.get_mut(&5).unwrap().user = "alice".into();
        map.get_mut(&6).unwrap().user = "bob".into();

        sort_list(&mut list, &map, SortKey::Command);
        assert_eq!(list, vec![6, 5]);
        sort_list(&mut list, &map, SortKey::User);
        assert_eq!(list, vec![5, 6]);
    }

    #[test]
    fn parses_flag_spellings() {
        assert_eq!("cpu".parse::<SortKey>().unwrap(), SortKey::Cpu);
        assert_eq!("mem".parse::<SortKey>().unwrap(), SortKey::Mem);
        assert!("bogus".parse::<SortKey>().is_err());
    }
}
