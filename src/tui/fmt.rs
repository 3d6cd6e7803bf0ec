//! Cell formatting for the process table.
//!
//! Column arithmetic uses terminal display width, not byte or char counts,
//! so wide glyphs in usernames and commands cannot push a row out of its
//! columns.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Terminal columns occupied by `s`.
pub fn display_width(s: &str) -> usize {
    s.width()
}

/// Fits `s` into `width` columns, marking a cut with a trailing `+`.
pub fn truncate_with_plus(s: &str, width: usize) -> String {
    if s.width() <= width {
        return s.to_string();
    }
    let budget = width.saturating_sub(1);
    let mut out = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('+');
    out
}

/// Pads `s` to `width` columns; right-aligned cells pad on the left.
/// Content wider than the column is left alone, the cell clips it.
pub fn pad(s: &str, width: usize, right_align: bool) -> String {
    let w = s.width();
    if w >= width {
        return s.to_string();
    }
    let fill = " ".repeat(width - w);
    if right_align {
        format!("{}{}", fill, s)
    } else {
        format!("{}{}", s, fill)
    }
}

/// Renders a resident set size: `0`, `{n}K` below one MiB, `{n}M` above.
pub fn format_rss(rss_pages: u64, page_size: u64) -> String {
    let bytes = rss_pages * page_size;
    if bytes == 0 {
        "0".to_string()
    } else if bytes < 1024 * 1024 {
        format!("{}K", bytes / 1024)
    } else {
        format!("{}M", bytes / (1024 * 1024))
    }
}

/// Percentage of physical memory held resident.
pub fn format_mem_percent(rss_pages: u64, page_size: u64, mem_total: u64) -> String {
    if mem_total == 0 {
        return "0.0".to_string();
    }
    format!(
        "{:.1}",
        (rss_pages * page_size) as f64 / mem_total as f64 * 100.0
    )
}

/// CPU usage over the last interval, scaled by CPU count so one saturated
/// core reads 100.0 on any machine. A zero system-wide delta (first tick,
/// or a stalled counter) renders as 0.0 rather than dividing by it.
pub fn format_cpu_percent(cpu_diff: u64, cpu_time_diff: u64, num_cpus: usize) -> String {
    if cpu_time_diff == 0 {
        return "0.0".to_string();
    }
    format!(
        "{:.1}",
        cpu_diff as f64 / cpu_time_diff as f64 * 100.0 * num_cpus as f64
    )
}

/// Cumulative CPU time as `m:ss:hh`, scaled by the queried USER_HZ.
pub fn format_cpu_time(jiffies: u64, clk_tck: u64) -> String {
    let hz = clk_tck.max(1);
    let total_seconds = jiffies / hz;
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    let hundredths = (jiffies % hz) * 100 / hz;
    format!("{}:{:02}:{:02}", minutes, seconds, hundredths)
}
