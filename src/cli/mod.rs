//! Command-line interface for the lab pipeline.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use crate::config::PipelineConfig;
use crate::core::table;
use crate::core::writers;
use crate::processors::{diode, hysteresis, loop_geometry::BranchPair, regression};
use crate::visualization::{self, ChartLabels};

#[derive(Parser)]
#[command(name = "lab-pipeline")]
#[command(about = "Physics-lab data reduction pipeline", version)]
pub struct Cli {
    /// Path to YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reduce hysteresis datasets: coercivity, remanence, loop area
    Hysteresis {
        /// Directory containing the measurement files
        data_dir: PathBuf,
        /// Output directory for loop plots
        #[arg(short, long, default_value = "graphs")]
        out_dir: PathBuf,
        /// Override the salience look-back window (samples)
        #[arg(long)]
        window: Option<usize>,
        /// Skip writing loop plots
        #[arg(long)]
        no_plots: bool,
    },

    /// Generate B vs I graphs for every configured dataset
    PlotLoops {
        /// Directory containing the measurement files
        data_dir: PathBuf,
        /// Output directory for PNG files
        #[arg(short, long, default_value = "graphs")]
        out_dir: PathBuf,
    },

    /// Negate every reading of a dataset file, in place
    Negate {
        /// Dataset file to rewrite
        file: PathBuf,
        /// Preview without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Diode characteristic: knee voltage and ideality factor
    Diode {
        /// Two-column file: V (mV), I (mA)
        file: PathBuf,
        /// Junction temperature in K
        #[arg(long, default_value_t = 298.0)]
        temp: f64,
        /// Knee current target in mA
        #[arg(long, default_value_t = 1.0)]
        knee_target: f64,
        /// Minimum current (mA) for the ln(I) fit region
        #[arg(long, default_value_t = 0.1)]
        min_current: f64,
        /// Output PNG path (defaults to <file>_fit.png)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Two-column linear regression with optional axis transforms
    Regress {
        /// Two-column measurement file
        file: PathBuf,
        /// Fit against ln(y)
        #[arg(long)]
        ln_y: bool,
        /// Fit against 1/x
        #[arg(long)]
        inv_x: bool,
        /// Report latent heat from the slope (Clausius-Clapeyron)
        #[arg(long)]
        clausius: bool,
        /// Report Rhc, Rydberg, and screening constants (Moseley's law)
        #[arg(long)]
        moseley: bool,
        /// Report interplanar distance d = slope/2 (electron diffraction)
        #[arg(long)]
        diffraction: bool,
        /// Plot title
        #[arg(long)]
        title: Option<String>,
        /// X axis label
        #[arg(long, default_value = "x")]
        x_label: String,
        /// Y axis label
        #[arg(long, default_value = "y")]
        y_label: String,
        /// Output PNG path (defaults to <file>_fit.png)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Create a spinner for indeterminate operations
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Print a summary box
fn print_summary(title: &str, items: &[(&str, String)]) {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║ {:<62} ║", title);
    println!("╠══════════════════════════════════════════════════════════════╣");
    for (key, value) in items {
        // Char-based truncation; values here can contain ±, ·, ³.
        let display_value = if value.chars().count() > 39 {
            let head: String = value.chars().take(36).collect();
            format!("{head}...")
        } else {
            value.clone()
        };
        println!("║ {:<20}: {:<39} ║", key, display_value);
    }
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
}

/// Format a branch pair as "mid ± unc (plus/minus)", or "undetermined".
fn format_branches(pair: Option<BranchPair>, unit: &str) -> String {
    match pair {
        Some(p) => format!(
            "{:.2} ± {:.2} {} (+{:.2}/{:.2})",
            p.midpoint(),
            p.uncertainty(),
            unit,
            p.plus,
            p.minus
        ),
        None => "undetermined (no main loop pair)".to_string(),
    }
}

/// Default output path: `<stem>_<suffix>.png` next to the input file.
fn default_png(file: &PathBuf, suffix: &str) -> PathBuf {
    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    file.with_file_name(format!("{stem}_{suffix}.png"))
}

pub fn run() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity (must come first)
    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .format_timestamp_secs()
        .init();

    // Load config
    let config = match &cli.config {
        Some(path) => match PipelineConfig::from_yaml(path) {
            Ok(cfg) => {
                info!("Loaded config from: {}", path.display());
                cfg
            }
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}, using defaults",
                    path.display(),
                    e
                );
                PipelineConfig::default()
            }
        },
        None => PipelineConfig::default(),
    };

    // Dispatch to subcommands
    match cli.command {
        Commands::Hysteresis {
            data_dir,
            out_dir,
            window,
            no_plots,
        } => {
            cmd_hysteresis(&data_dir, &out_dir, window, no_plots, config);
        }
        Commands::PlotLoops { data_dir, out_dir } => {
            cmd_plot_loops(&data_dir, &out_dir, &config);
        }
        Commands::Negate { file, dry_run } => {
            cmd_negate(&file, dry_run, &config);
        }
        Commands::Diode {
            file,
            temp,
            knee_target,
            min_current,
            output,
        } => {
            cmd_diode(&file, temp, knee_target, min_current, output, &config);
        }
        Commands::Regress {
            file,
            ln_y,
            inv_x,
            clausius,
            moseley,
            diffraction,
            title,
            x_label,
            y_label,
            output,
        } => {
            let derived = DerivedConstants {
                clausius,
                moseley,
                diffraction,
            };
            cmd_regress(
                &file, ln_y, inv_x, derived, title, &x_label, &y_label, output, &config,
            );
        }
    }
}

fn cmd_hysteresis(
    data_dir: &PathBuf,
    out_dir: &PathBuf,
    window: Option<usize>,
    no_plots: bool,
    mut config: PipelineConfig,
) {
    let start = Instant::now();

    if let Some(w) = window {
        config.loop_geometry.salience_window = w;
    }

    let spinner = create_spinner("Reducing hysteresis datasets...");
    let reports = hysteresis::analyze_batch(data_dir, &config);
    spinner.finish_and_clear();

    // Missing datasets are skip-not-fatal; an empty batch is a warning.
    if reports.is_empty() {
        warn!("no datasets could be processed under {}", data_dir.display());
        return;
    }

    if !no_plots {
        if let Err(e) = fs::create_dir_all(out_dir) {
            error!("failed to create {}: {}", out_dir.display(), e);
            std::process::exit(1);
        }
    }

    for report in &reports {
        let mut items = vec![
            ("Samples", report.loop_data.len().to_string()),
            (
                "Coercivity H_c",
                format_branches(report.summary.coercivity, "A/m"),
            ),
            (
                "Remanence B_r",
                format_branches(report.summary.remanence, "mT"),
            ),
            ("Loop area", format!("{:.2} mT·A/m", report.summary.area)),
            (
                "Energy loss",
                format!("{:.3} J/m³ per cycle", report.energy_loss),
            ),
        ];

        if !no_plots {
            let stem = report
                .path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "dataset".to_string());
            let plot_path = out_dir.join(format!("{stem}_loop.png"));

            let labels = ChartLabels::new(&report.title, "H (A/m)", "B (mT)");
            match visualization::plot_series(
                &plot_path,
                &report.loop_data.points(),
                &labels,
                &config.plot,
            ) {
                Ok(()) => items.push(("Loop plot", plot_path.display().to_string())),
                Err(e) => warn!("failed to plot {}: {}", report.title, e),
            }
        }

        items.push(("Duration", format!("{:.2?}", start.elapsed())));
        print_summary(&format!("Hysteresis: {}", report.title), &items);
    }
}

fn cmd_plot_loops(data_dir: &PathBuf, out_dir: &PathBuf, config: &PipelineConfig) {
    let start = Instant::now();

    if let Err(e) = fs::create_dir_all(out_dir) {
        error!("failed to create {}: {}", out_dir.display(), e);
        std::process::exit(1);
    }

    let mut written = Vec::new();

    for dataset in &config.datasets {
        let path = data_dir.join(&dataset.file);

        // Unlike the batch reduction, a missing dataset here is fatal.
        let series = match table::read_two_columns(&path, &config.reader) {
            Ok(s) => s,
            Err(e) => {
                error!("cannot plot '{}': {}", dataset.file, e);
                std::process::exit(1);
            }
        };

        let plot_path = out_dir.join(format!("{}_b_vs_i.png", dataset.file));
        let labels = ChartLabels::new(&dataset.title, "I (A)", "B (mT)");

        if let Err(e) =
            visualization::plot_series(&plot_path, &series.points(), &labels, &config.plot)
        {
            error!("failed to render '{}': {}", dataset.file, e);
            std::process::exit(1);
        }

        info!("wrote {}", plot_path.display());
        written.push(plot_path.display().to_string());
    }

    print_summary(
        "Loop Plots Complete",
        &[
            ("Datasets", written.len().to_string()),
            ("Output dir", out_dir.display().to_string()),
            ("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );
}

fn cmd_negate(file: &PathBuf, dry_run: bool, config: &PipelineConfig) {
    let start = Instant::now();

    if dry_run {
        println!("DRY RUN: file will not be modified");
    }

    match writers::negate_in_place(file, &config.reader, dry_run) {
        Ok(count) => {
            print_summary(
                "Negation Complete",
                &[
                    ("File", file.display().to_string()),
                    ("Rows negated", count.to_string()),
                    ("Dry run", dry_run.to_string()),
                    ("Duration", format!("{:.2?}", start.elapsed())),
                ],
            );
        }
        Err(e) => {
            error!("negation failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn cmd_diode(
    file: &PathBuf,
    temp: f64,
    knee_target: f64,
    min_current: f64,
    output: Option<PathBuf>,
    config: &PipelineConfig,
) {
    let start = Instant::now();

    let series = match table::read_two_columns(file, &config.reader) {
        Ok(s) => s,
        Err(e) => {
            error!("failed to read '{}': {}", file.display(), e);
            std::process::exit(1);
        }
    };

    let analysis = match diode::analyze_diode(&series, temp, knee_target, min_current) {
        Ok(a) => a,
        Err(e) => {
            error!("diode analysis failed: {:#}", e);
            std::process::exit(1);
        }
    };

    let output_path = output.unwrap_or_else(|| default_png(file, "fit"));
    let labels = ChartLabels::new("Diode ln(I) vs V", "V (V)", "ln(I / mA)");

    let mut items = vec![
        ("Samples", series.len().to_string()),
        (
            "Knee voltage",
            format!("{:.1} mV (I ≈ {} mA)", analysis.knee_voltage_mv, knee_target),
        ),
        (
            "Ideality factor",
            format!("{:.3} ± {:.3}", analysis.ideality, analysis.ideality_err),
        ),
        (
            "Fit slope",
            format!(
                "{:.4} ± {:.4} 1/V",
                analysis.fit.slope, analysis.fit.stderr_slope
            ),
        ),
        ("R²", format!("{:.6}", analysis.fit.r_squared())),
    ];

    match visualization::plot_fit(
        &output_path,
        &analysis.fit_points,
        &analysis.fit,
        &labels,
        &config.plot,
    ) {
        Ok(()) => items.push(("Plot", output_path.display().to_string())),
        Err(e) => warn!("failed to write plot: {}", e),
    }

    items.push(("Duration", format!("{:.2?}", start.elapsed())));
    print_summary("Diode Analysis Complete", &items);
}

/// Which experiment-specific constants to derive from a regression.
#[derive(Debug, Clone, Copy, Default)]
struct DerivedConstants {
    clausius: bool,
    moseley: bool,
    diffraction: bool,
}

#[allow(clippy::too_many_arguments)]
fn cmd_regress(
    file: &PathBuf,
    ln_y: bool,
    inv_x: bool,
    derived: DerivedConstants,
    title: Option<String>,
    x_label: &str,
    y_label: &str,
    output: Option<PathBuf>,
    config: &PipelineConfig,
) {
    let start = Instant::now();

    let series = match table::read_two_columns(file, &config.reader) {
        Ok(s) => s,
        Err(e) => {
            error!("failed to read '{}': {}", file.display(), e);
            std::process::exit(1);
        }
    };

    let tx = if inv_x {
        regression::AxisTransform::Reciprocal
    } else {
        regression::AxisTransform::Identity
    };
    let ty = if ln_y {
        regression::AxisTransform::Ln
    } else {
        regression::AxisTransform::Identity
    };

    let reg = match regression::run_regression(&series, tx, ty) {
        Ok(r) => r,
        Err(e) => {
            error!("regression failed: {:#}", e);
            std::process::exit(1);
        }
    };

    let plot_title = title.unwrap_or_else(|| {
        file.file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "Linear Fit".to_string())
    });
    let output_path = output.unwrap_or_else(|| default_png(file, "fit"));
    let labels = ChartLabels::new(&plot_title, x_label, y_label);

    let points: Vec<(f64, f64)> = reg.xs.iter().copied().zip(reg.ys.iter().copied()).collect();

    let mut items = vec![
        ("Samples", reg.fit.n.to_string()),
        (
            "Slope",
            format!("{:.6} ± {:.6}", reg.fit.slope, reg.fit.stderr_slope),
        ),
        (
            "Intercept",
            format!("{:.6} ± {:.6}", reg.fit.intercept, reg.fit.stderr_intercept),
        ),
        ("R²", format!("{:.6}", reg.fit.r_squared())),
    ];

    if derived.clausius {
        items.push((
            "Latent heat",
            format!("ΔH_vap = -R·slope = {:.2} J/mol", reg.latent_heat()),
        ));
    }

    if derived.moseley {
        let m = reg.moseley();
        items.push(("Rhc", format!("{:.3} ± {:.3} eV", m.rhc, m.rhc_err)));
        items.push((
            "Rydberg constant",
            format!("({:.3e} ± {:.3e}) 1/m", m.rydberg, m.rydberg_err),
        ));
        items.push((
            "Screening σ",
            format!("{:.3} ± {:.3}", m.screening, m.screening_err),
        ));
    }

    if derived.diffraction {
        let (d, d_err) = reg.interplanar_distance();
        items.push((
            "Interplanar d",
            format!("{:.4} ± {:.4} (slope/2)", d, d_err),
        ));
    }

    match visualization::plot_fit(&output_path, &points, &reg.fit, &labels, &config.plot) {
        Ok(()) => items.push(("Plot", output_path.display().to_string())),
        Err(e) => warn!("failed to write plot: {}", e),
    }

    items.push(("Duration", format!("{:.2?}", start.elapsed())));
    print_summary("Regression Complete", &items);
}
