use chrono::Local;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tunemood::report::{self, GenreSummary};
use tunemood::{BrushRange, Dashboard, Genre, Interaction, ViewConfig};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(name = "tunemood")]
#[command(author, version, about = "Linked histogram, pie and dendrogram views of music & mental-health survey data")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Survey CSV or directory of CSVs (optional in GUI mode)
    path: Option<PathBuf>,

    /// Launch GUI file picker (auto-enabled when double-clicked)
    #[arg(long)]
    gui: bool,

    /// Output report file (.html, .json, .svg, .csv)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory for auto-generated reports
    #[arg(long, default_value = "tunemood-reports")]
    report_dir: PathBuf,

    /// Don't auto-generate an HTML report
    #[arg(long)]
    no_report: bool,

    /// Don't prompt to open report
    #[arg(long)]
    no_open: bool,

    /// Number of parallel workers for directories (default: number of CPUs)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Target number of histogram bins
    #[arg(long, default_value = "20")]
    bins: usize,

    /// Pre-apply a brush before writing the report, e.g. 0:2
    #[arg(long, value_parser = parse_brush)]
    brush: Option<BrushRange>,

    /// Pre-apply a pinned genre before writing the report
    #[arg(long)]
    pin: Option<String>,

    /// Show debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Only show summary
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start interactive web UI
    Serve {
        /// Survey CSV file
        path: PathBuf,

        /// Port to listen on
        #[arg(short, long, default_value = "3001")]
        port: u16,

        /// Target number of histogram bins
        #[arg(long, default_value = "20")]
        bins: usize,
    },
}

fn parse_brush(s: &str) -> Result<BrushRange, String> {
    let (lo, hi) = s
        .split_once(':')
        .ok_or_else(|| format!("expected LO:HI, got '{}'", s))?;
    let lo: f64 = lo.trim().parse().map_err(|_| format!("invalid lower bound '{}'", lo))?;
    let hi: f64 = hi.trim().parse().map_err(|_| format!("invalid upper bound '{}'", hi))?;
    BrushRange::new(lo, hi).map_err(|e| e.to_string())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    // Handle subcommands first
    if let Some(cmd) = args.command {
        match cmd {
            Command::Serve { path, port, bins } => {
                let config = ViewConfig::new().with_bin_count(bins);
                let dashboard = match Dashboard::load(&path, config) {
                    Ok(d) => d,
                    Err(e) => {
                        eprintln!("Failed to load {}: {}", path.display(), e);
                        std::process::exit(1);
                    }
                };
                if let Err(e) = tunemood::serve::start(port, dashboard) {
                    eprintln!("Server error: {}", e);
                    std::process::exit(1);
                }
                return;
            }
        }
    }

    // With GUI feature: launch GUI if --gui flag OR no path provided
    #[cfg(feature = "gui")]
    let use_gui = args.gui || args.path.is_none();

    #[cfg(not(feature = "gui"))]
    let use_gui = false;

    #[cfg(feature = "gui")]
    let path = match args.path.clone() {
        Some(p) if !args.gui => p,
        _ => match pick_path_gui() {
            Some(p) => p,
            None => {
                eprintln!("No file or folder selected.");
                std::process::exit(0);
            }
        },
    };

    #[cfg(not(feature = "gui"))]
    let path = if let Some(p) = args.path.clone() {
        p
    } else {
        eprintln!("Usage: tunemood <PATH>");
        eprintln!("Run 'tunemood --help' for more options.");
        eprintln!("Note: GUI mode not available in this build.");
        std::process::exit(1);
    };

    // Set up thread pool
    if let Some(jobs) = args.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .ok();
    }

    let files: Vec<PathBuf> = if path.is_dir() {
        WalkDir::new(&path)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| ext.eq_ignore_ascii_case("csv"))
                    .unwrap_or(false)
            })
            .map(|e| e.path().to_path_buf())
            .collect()
    } else {
        vec![path.clone()]
    };

    if files.is_empty() {
        eprintln!("No CSV files found under {}", path.display());
        std::process::exit(1);
    }

    if !args.quiet {
        eprintln!("\x1b[1mtunemood - Music & Mental Health Views\x1b[0m");
        eprintln!("{}", "─".repeat(70));
        eprintln!("Found {} dataset(s)\n", files.len());
    }

    let pb = if !args.quiet && files.len() > 1 {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let config = ViewConfig::new().with_bin_count(args.bins);
    let pin = args.pin.as_deref().map(Genre::from);

    // Each dataset gets its own dashboard, nothing is shared between them
    let loaded: Vec<(PathBuf, tunemood::Result<Dashboard>)> = files
        .par_iter()
        .map(|file| {
            let result = Dashboard::load(file, config.clone()).map(|mut dash| {
                if args.brush.is_some() {
                    dash.dispatch(Interaction::Brush(args.brush));
                }
                if let Some(ref genre) = pin {
                    dash.dispatch(Interaction::SliceClicked(genre.clone()));
                }
                dash
            });
            if let Some(ref pb) = pb {
                pb.inc(1);
                pb.set_message(display_name(file));
            }
            (file.clone(), result)
        })
        .collect();

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    let mut failures = 0;
    let mut dashboards = Vec::new();
    for (file, result) in loaded {
        match result {
            Ok(dash) => dashboards.push((file, dash)),
            Err(e) => {
                failures += 1;
                eprintln!("\x1b[31mFailed to load {}:\x1b[0m {}", file.display(), e);
            }
        }
    }

    if !args.quiet {
        for (file, dash) in &dashboards {
            print_summary(file, dash, args.verbose);
        }
    }

    // One report per dataset; --output only applies to a single dataset
    let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let mut written = Vec::new();
    for (file, dash) in &dashboards {
        let report_path = match (&args.output, dashboards.len()) {
            (Some(output), 1) => Some(output.clone()),
            _ if args.no_report => None,
            _ => {
                std::fs::create_dir_all(&args.report_dir).ok();
                let stem = file.file_stem().and_then(|s| s.to_str()).unwrap_or("survey");
                Some(args.report_dir.join(format!("tunemood_{}_{}.html", stem, timestamp)))
            }
        };

        if let Some(report_path) = report_path {
            if let Err(e) = report::generate(&report_path, dash) {
                eprintln!("Failed to write report: {}", e);
                std::process::exit(1);
            }
            if !args.quiet {
                eprintln!("\x1b[32mReport saved: {}\x1b[0m", report_path.display());
            }
            written.push(report_path);
        }
    }

    if !args.no_open && written.len() == 1 {
        let report_path = &written[0];
        if use_gui {
            // In GUI mode, auto-open the report (no prompt)
            let _ = open::that(report_path);
        } else if !args.quiet {
            eprint!("\nOpen report in browser? [Y/n] ");
            io::stderr().flush().ok();

            let mut input = String::new();
            if io::stdin().read_line(&mut input).is_ok() {
                let input = input.trim().to_lowercase();
                if input.is_empty() || input == "y" || input == "yes" {
                    if let Err(e) = open::that(report_path) {
                        eprintln!("Failed to open report: {}", e);
                    }
                }
            }
        }
    }

    if failures > 0 {
        std::process::exit(1);
    }
}

fn print_summary(file: &Path, dash: &Dashboard, verbose: bool) {
    let store = dash.store();
    eprintln!("\x1b[1m{}\x1b[0m", file.display());
    eprintln!(
        "  {} responses, {} genres{}",
        store.len(),
        store.genres().len(),
        if store.dropped() > 0 { format!(" ({} malformed rows dropped)", store.dropped()) } else { String::new() }
    );

    if let Some(genre) = dash.selection().selected_genre() {
        eprintln!("  Pinned: {}", genre);
    }

    println!(
        "  {:<20} {:>6} {:>7}  {:>7} {:>9} {:>6}",
        "GENRE", "COUNT", "SHARE", "IMPROVE", "NO EFFECT", "WORSEN"
    );
    for row in report::summarize(dash) {
        print_row(&row);
    }

    if verbose {
        let hist = dash.histogram();
        let (lo, hi) = hist.domain();
        eprintln!("  Histogram: {} bins over [{}, {}] hours", hist.bins().len(), lo, hi);
    }
    eprintln!();
}

fn print_row(row: &GenreSummary) {
    // Faded genres print dimmed, like their shapes in the views
    let (color, reset) = if row.active { ("", "") } else { ("\x1b[90m", "\x1b[0m") };
    println!(
        "{}  {:<20} {:>6} {:>6.1}%  {:>7} {:>9} {:>6}{}",
        color,
        truncate(row.genre.as_str(), 20),
        row.count,
        row.percent,
        row.improve,
        row.no_effect,
        row.worsen,
        reset
    );
}

#[cfg(feature = "gui")]
fn pick_path_gui() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Select survey CSV")
        .add_filter("CSV files", &["csv"])
        .pick_file()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
