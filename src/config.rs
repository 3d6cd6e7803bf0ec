//! Runtime configuration.
//!
//! Everything the flags decide lives here, built once in `main` and passed
//! by reference into the monitor and the viewport. The only flag that
//! mutates afterwards is `verbose`, and its runtime copy belongs to the
//! viewport, not this struct.

use std::time::Duration;

use crate::monitor::sort::SortKey;

/// Immutable run configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Interval between monitor updates.
    pub delay: Duration,
    pub sort: SortKey,
    /// PID allow-list; empty means every PID.
    pub pids: Vec<u32>,
    /// Start with full command lines.
    pub verbose: bool,
    /// Render the parent/child hierarchy.
    pub tree: bool,
    /// Include kernel threads.
    pub show_kernel: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(1500),
            sort: SortKey::default(),
            pids: Vec::new(),
            verbose: false,
            tree: false,
            show_kernel: false,
        }
    }
}

impl Config {
    pub fn pid_allowed(&self, pid: u32) -> bool {
        self.pids.is_empty() || self.pids.contains(&pid)
    }
}

/// Parses a delay flag value: bare milliseconds, or a value suffixed with
/// `ms`, `s` or `m`. Zero is rejected; a paused monitor is not a monitor.
pub fn parse_delay(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    let (digits, unit_ms) = if let Some(v) = s.strip_suffix("ms") {
        (v, 1u64)
    } else if let Some(v) = s.strip_suffix('s') {
        (v, 1000)
    } else if let Some(v) = s.strip_suffix('m') {
        (v, 60_000)
    } else {
        (s, 1)
    };

    let value: u64 = digits
        .trim()
        .parse()
        .map_err(|_| format!("{} is not a valid duration", s))?;
    if value == 0 {
        return Err("delay must be positive".to_string());
    }
    Ok(Duration::from_millis(value * unit_ms))
}

/// Parses the comma-separated PID allow-list.
pub fn parse_pid_list(s: &str) -> Result<Vec<u32>, String> {
    s.split(',')
        .map(|value| {
            value
                .trim()
                .parse::<u32>()
                .map_err(|_| format!("{} is not a valid PID", value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_accepts_bare_millis_and_suffixes() {
        assert_eq!(parse_delay("1500").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_delay("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_delay("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_delay("1m").unwrap(), Duration::from_secs(60));
    }

    #[test]
    fn delay_rejects_zero_and_garbage() {
        assert!(parse_delay("0").is_err());
        assert!(parse_delay("0s").is_err());
        assert!(parse_delay("fast").is_err());
        assert!(parse_delay("-5s").is_err());
    }

    #[test]
    fn pid_list_parses_and_rejects() {
        assert_eq!(parse_pid_list("1,42, 300").unwrap(), vec![1, 42, 300]);
        assert!(parse_pid_list("1,x").is_err());
        assert!(parse_pid_list("-3").is_err());
    }

    #[test]
    fn empty_allow_list_admits_everything() {
        let cfg = Config::default();
        assert!(cfg.pid_allowed(12345));

        let cfg = Config {
            pids: vec![1, 2],
            ..Config::default()
        };
        assert!(cfg.pid_allowed(1));
        assert!(!cfg.pid_allowed(3));
    }
}
