//! Row and header emission for the process table.
//!
//! Cell text is produced by pure helpers so tests can assert on the exact
//! strings without a terminal; the ratatui `Table` only handles placement
//! and clipping.

use ratatui::Frame;
use ratatui::layout::Constraint;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Row, Table};

use crate::collector::traits::FileSystem;
use crate::config::Config;
use crate::monitor::{Monitor, Process};

use super::fmt;
use super::state::Viewport;
use super::style::Styles;

/// One column of the table.
pub struct Column {
    pub title: &'static str,
    /// Fixed width in cells; 0 marks the greedy trailing column.
    pub width: u16,
    pub right_align: bool,
}

pub const COLUMNS: [Column; 8] = [
    Column { title: "PID", width: 5, right_align: true },
    Column { title: "USER", width: 8, right_align: false },
    Column { title: "RSS", width: 5, right_align: true },
    Column { title: "%MEM", width: 5, right_align: true },
    Column { title: "%CPU", width: 5, right_align: true },
    Column { title: "TIME+", width: 9, right_align: true },
    Column { title: "S", width: 1, right_align: false },
    Column { title: "COMMAND", width: 0, right_align: false },
];

const STATE_COLUMN: usize = 6;
const COMMAND_COLUMN: usize = 7;

/// The COMMAND cell: the short name, or the full command line in verbose
/// mode. Kernel threads and zombies have no command line and always show
/// their name.
pub fn command_cell(p: &Process, verbose: bool) -> String {
    if verbose && !p.command.is_empty() {
        p.command.clone()
    } else {
        p.name.clone()
    }
}

/// Formats one process into its eight cells, untruncated except for the
/// username.
pub fn row_cells<F: FileSystem>(p: &Process, m: &Monitor<F>, verbose: bool) -> [String; 8] {
    [
        p.pid.to_string(),
        fmt::truncate_with_plus(&p.user, COLUMNS[1].width as usize),
        fmt::format_rss(p.rss, m.page_size),
        fmt::format_mem_percent(p.rss, m.page_size, m.mem_total),
        fmt::format_cpu_percent(p.cpu_diff(), m.cpu_time_diff, m.num_cpus),
        fmt::format_cpu_time(p.cpu_total(), m.clk_tck),
        p.state.to_string(),
        command_cell(p, verbose),
    ]
}

/// Draws the header and the visible slice of the process list.
pub fn render<F: FileSystem>(
    frame: &mut Frame,
    monitor: &Monitor<F>,
    view: &mut Viewport,
    cfg: &Config,
) {
    let area = frame.area();
    view.resize(area.width, area.height);
    let range = view.reconcile(monitor.list.len());

    // Right has no natural bound of its own; clip to the last column here.
    view.horizontal_offset = view.horizontal_offset.min(COLUMNS.len() - 1);
    let offset = view.horizontal_offset;
    let selected = view.selected;
    let verbose = view.verbose;

    let header_cells = COLUMNS[offset..].iter().enumerate().map(|(i, col)| {
        let style = if i + offset == cfg.sort.column_index() {
            Styles::header_sorted()
        } else {
            Styles::header()
        };
        let width = if col.width == 0 {
            col.title.len()
        } else {
            col.width as usize
        };
        Cell::from(fmt::pad(col.title, width, col.right_align)).style(style)
    });
    let header = Row::new(header_cells).style(Styles::header());

    let rows = monitor.list[range].iter().enumerate().map(|(i, pid)| {
        let p = &monitor.map[pid];
        let is_selected = i == selected;
        let cells = row_cells(p, monitor, verbose);

        let rendered = cells.into_iter().enumerate().skip(offset).map(|(ci, text)| {
            let col = &COLUMNS[ci];
            if ci == COMMAND_COLUMN && cfg.tree && !p.tree_prefix.is_empty() {
                Cell::from(Line::from(vec![
                    Span::styled(p.tree_prefix.clone(), Styles::tree_prefix()),
                    Span::raw(text),
                ]))
            } else if ci == STATE_COLUMN && p.state == 'R' && !is_selected {
                Cell::from(Span::styled(text, Styles::running()))
            } else {
                Cell::from(fmt::pad(&text, col.width as usize, col.right_align))
            }
        });

        let row_style = if is_selected {
            Styles::selected()
        } else {
            Styles::row()
        };
        Row::new(rendered.collect::<Vec<_>>()).style(row_style)
    });

    let widths = COLUMNS[offset..].iter().map(|col| {
        if col.width == 0 {
            Constraint::Fill(1)
        } else {
            Constraint::Length(col.width)
        }
    });

    let table = Table::new(rows.collect::<Vec<_>>(), widths)
        .header(header)
        .column_spacing(1);
    frame.render_widget(table, area);
}
