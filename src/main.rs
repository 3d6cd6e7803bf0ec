//! proctop binary: flags, validation, terminal lifecycle, exit codes.
//!
//! Exit codes: 0 on a clean quit, 1 for flag or runtime errors, 2 when the
//! terminal could not be initialized.

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use proctop::collector::{RealFs, SysClock};
use proctop::config::{self, Config};
use proctop::monitor::{Monitor, SortKey};
use proctop::tui::app::{App, restore_terminal, setup_terminal};
use proctop::users::UserTable;

/// Interactive terminal process monitor.
#[derive(Parser, Debug)]
#[command(name = "proctop", about = "Interactive terminal process monitor", version)]
struct Args {
    /// Refresh interval, e.g. 1500ms or 2s (bare numbers are milliseconds)
    #[arg(
        short = 'd',
        long = "delay",
        value_name = "DURATION",
        default_value = "1500ms",
        value_parser = config::parse_delay
    )]
    delay: std::time::Duration,

    /// Comma-separated PID allow-list
    #[arg(short = 'p', long = "pids", value_name = "LIST")]
    pids: Option<String>,

    /// Sort column: pid, user, rss, mem, cpu, time, state, command
    #[arg(
        short = 's',
        long = "sort",
        value_name = "COLUMN",
        default_value = "cpu",
        value_parser = parse_sort
    )]
    sort: SortKey,

    /// Comma-separated username allow-list
    #[arg(short = 'u', long = "users", value_name = "LIST")]
    users: Option<String>,

    /// Start with full command lines
    #[arg(long)]
    verbose: bool,

    /// Render the parent/child process tree
    #[arg(long)]
    tree: bool,

    /// Include kernel threads
    #[arg(long)]
    kernel: bool,
}

fn parse_sort(s: &str) -> Result<SortKey, String> {
    s.parse()
}

/// Flag errors print the message plus usage on stderr and exit 1.
fn usage_error(message: &str) -> ! {
    eprintln!("flag error: {}", message);
    eprintln!("{}", Args::command().render_usage());
    std::process::exit(1);
}

fn fatal(message: impl std::fmt::Display) -> ! {
    eprintln!("proctop: {}", message);
    std::process::exit(1);
}

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let pids = match args.pids.as_deref() {
        Some(list) => config::parse_pid_list(list).unwrap_or_else(|msg| usage_error(&msg)),
        None => Vec::new(),
    };

    let mut users = UserTable::load_system()
        .unwrap_or_else(|e| fatal(format_args!("cannot read /etc/passwd: {}", e)));
    if let Some(list) = args.users.as_deref()
        && let Err(name) = users.restrict_to(list.split(',').map(str::trim))
    {
        usage_error(&format!("user {} does not exist", name));
    }

    let config = Config {
        delay: args.delay,
        sort: args.sort,
        pids,
        verbose: args.verbose,
        tree: args.tree,
        show_kernel: args.kernel,
    };

    let clock = SysClock::query()
        .unwrap_or_else(|| fatal("sysconf page size / clock tick unavailable"));
    let monitor = Monitor::new(RealFs::new(), "/proc", clock)
        .unwrap_or_else(|e| fatal(format_args!("cannot read /proc: {}", e)));

    let mut terminal = match setup_terminal() {
        Ok(terminal) => terminal,
        Err(e) => {
            eprintln!("proctop: terminal init failed: {}", e);
            std::process::exit(2);
        }
    };

    let mut app = App::new(monitor, users, config);
    let result = app.run(&mut terminal);

    // Teardown strictly precedes any diagnostic.
    if let Err(e) = restore_terminal(&mut terminal) {
        eprintln!("proctop: failed to restore terminal: {}", e);
    }
    if let Err(e) = result {
        fatal(e);
    }
}
