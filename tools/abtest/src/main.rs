use std::io::Write;
use std::path::{Path, PathBuf};

use abtest::config::{self, DashboardConfig, CONFIG_FILE};
use abtest::render::{render_json, render_text, write_svgs};
use abtest::{interpretation, Dashboard, DashboardError};
use abtest_analysis::format::thousands;
use abtest_analysis::SampleSizePlanner;
use abtest_data::{generate_experiment, load_csv, save_csv, DEFAULT_CSV_PATH};
use clap::{Args, Parser, Subcommand};
use log::LevelFilter;

#[derive(Debug, Parser)]
#[command(
    name = "abtest",
    version,
    about = "Analyze two-arm conversion experiments",
    long_about = "abtest compares a control and a treatment group on a binary outcome.\n\n\
        Commands:\n  \
        dashboard   Simulate an experiment and show the full dashboard (default)\n  \
        generate    Write synthetic experiment data to CSV\n  \
        analyze     Analyze experiment data from CSV\n  \
        plan        Required sample size per group\n  \
        config      Create or validate abtest.toml"
)]
struct Cli {
    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (defaults to ./abtest.toml when present)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Simulate an experiment and render the dashboard
    Dashboard(DashboardArgs),
    /// Generate synthetic experiment data as CSV
    Generate(GenerateArgs),
    /// Analyze experiment data from a CSV file
    Analyze(AnalyzeArgs),
    /// Compute the required sample size per group
    Plan(PlanArgs),
    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, Args, Default)]
struct DashboardArgs {
    /// Expected conversion rate of the control group
    #[arg(long, value_name = "RATE")]
    control_rate: Option<f64>,

    /// Expected conversion rate of the treatment group
    #[arg(long, value_name = "RATE")]
    treatment_rate: Option<f64>,

    /// Number of users in each group
    #[arg(long, value_name = "N")]
    sample_size: Option<usize>,

    /// Random seed of the simulated experiment
    #[arg(long)]
    seed: Option<u64>,

    /// Significance level
    #[arg(long)]
    alpha: Option<f64>,

    /// Desired effect size (Cohen's h) for the sample size calculator
    #[arg(long, value_name = "H")]
    effect_size: Option<f64>,

    /// Desired statistical power for the sample size calculator
    #[arg(long)]
    power: Option<f64>,

    /// Also write conversion_rates.svg and distribution.svg into DIR
    #[arg(long, value_name = "DIR")]
    svg_dir: Option<PathBuf>,

    /// Print the dashboard as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct GenerateArgs {
    #[arg(long, value_name = "N")]
    users_per_arm: Option<usize>,

    #[arg(long, value_name = "RATE")]
    control_rate: Option<f64>,

    #[arg(long, value_name = "RATE")]
    treatment_rate: Option<f64>,

    /// Length of the enrolment window in days
    #[arg(long)]
    days: Option<u32>,

    #[arg(long)]
    seed: Option<u64>,

    /// Output CSV file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CSV_PATH)]
    out: PathBuf,
}

#[derive(Debug, Args)]
struct AnalyzeArgs {
    /// CSV with columns user_id,group,timestamp,conversion
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Significance level
    #[arg(long)]
    alpha: Option<f64>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct PlanArgs {
    /// Desired effect size (Cohen's h)
    #[arg(long, value_name = "H")]
    effect_size: Option<f64>,

    /// Desired statistical power
    #[arg(long)]
    power: Option<f64>,

    /// Significance level
    #[arg(long)]
    alpha: Option<f64>,
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    /// Print a commented configuration file with the defaults
    Init {
        /// Write to FILE instead of stdout
        #[arg(short, long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Validate a configuration file
    Check {
        #[arg(value_name = "FILE")]
        path: Option<PathBuf>,
    },
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {}: {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

/// Explicit `--config`, else `./abtest.toml` if it exists, else defaults.
fn resolve_config(path: Option<&Path>) -> Result<DashboardConfig, DashboardError> {
    match path {
        Some(p) => config::load_config(p),
        None if Path::new(CONFIG_FILE).exists() => config::load_config(CONFIG_FILE),
        None => Ok(DashboardConfig::default()),
    }
}

fn run_dashboard(mut cfg: DashboardConfig, args: &DashboardArgs) -> Result<(), DashboardError> {
    let e = &mut cfg.experiment;
    if let Some(v) = args.control_rate {
        e.control_rate = v;
    }
    if let Some(v) = args.treatment_rate {
        e.treatment_rate = v;
    }
    if let Some(v) = args.sample_size {
        e.sample_size = v;
    }
    if let Some(v) = args.seed {
        e.seed = v;
    }
    if let Some(v) = args.alpha {
        cfg.analysis.alpha = v;
    }
    if let Some(v) = args.effect_size {
        cfg.planner.effect_size = v;
    }
    if let Some(v) = args.power {
        cfg.planner.power = v;
    }

    let dash = Dashboard::build(cfg)?;
    if args.json {
        println!("{}", render_json(&dash)?);
    } else {
        print!("{}", render_text(&dash));
    }
    if let Some(dir) = &args.svg_dir {
        for path in write_svgs(&dash, dir)? {
            eprintln!("Chart saved to {}", path.display());
        }
    }
    Ok(())
}

fn run_generate(cfg: &DashboardConfig, args: &GenerateArgs) -> Result<(), DashboardError> {
    let mut gen_cfg = cfg.generator_config();
    if let Some(v) = args.users_per_arm {
        gen_cfg.users_per_arm = v;
    }
    if let Some(v) = args.control_rate {
        gen_cfg.control_rate = v;
    }
    if let Some(v) = args.treatment_rate {
        gen_cfg.treatment_rate = v;
    }
    if let Some(v) = args.days {
        gen_cfg.days = v;
    }
    if let Some(v) = args.seed {
        gen_cfg.seed = v;
    }

    let data = generate_experiment(&gen_cfg, chrono::Utc::now())?;
    save_csv(&data, &args.out)?;
    println!("Data saved to {}", args.out.display());
    println!();
    print!("{}", data.summary());
    Ok(())
}

fn run_analyze(cfg: &DashboardConfig, args: &AnalyzeArgs) -> Result<(), DashboardError> {
    let data = load_csv(&args.input)?;
    let alpha = args.alpha.unwrap_or(cfg.analysis.alpha);
    let analyzer = data.analyzer()?.with_alpha(alpha)?;
    let report = analyzer.report()?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{report}");
        println!();
        for line in interpretation(&report) {
            println!("{line}");
        }
    }
    Ok(())
}

fn run_plan(cfg: &DashboardConfig, args: &PlanArgs) -> Result<(), DashboardError> {
    let planner = SampleSizePlanner::new(args.alpha.unwrap_or(cfg.analysis.alpha))?;
    let effect = args.effect_size.unwrap_or(cfg.planner.effect_size);
    let power = args.power.unwrap_or(cfg.planner.power);
    let n = planner.required_sample_size(effect, power)?;
    println!("Required Sample Size per Group: {}", thousands(n));
    Ok(())
}

fn run_config(cmd: &ConfigCommand, global: Option<&Path>) -> Result<(), DashboardError> {
    match cmd {
        ConfigCommand::Init { out: Some(path) } => {
            if path.exists() {
                return Err(DashboardError::Config(format!(
                    "'{}' already exists",
                    path.display()
                )));
            }
            std::fs::write(path, config::generate_config())?;
            println!("Created {}", path.display());
        }
        ConfigCommand::Init { out: None } => print!("{}", config::generate_config()),
        ConfigCommand::Check { path } => {
            let path = path
                .as_deref()
                .or(global)
                .unwrap_or_else(|| Path::new(CONFIG_FILE));
            let cfg = config::load_config(path)?;
            println!("Configuration valid: {cfg}");
        }
    }
    Ok(())
}

fn run_cli() -> i32 {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let command = cli
        .command
        .unwrap_or_else(|| Command::Dashboard(DashboardArgs::default()));
    let result = match &command {
        Command::Config(cmd) => run_config(cmd, cli.config.as_deref()),
        other => resolve_config(cli.config.as_deref()).and_then(|cfg| match other {
            Command::Dashboard(args) => run_dashboard(cfg, args),
            Command::Generate(args) => run_generate(&cfg, args),
            Command::Analyze(args) => run_analyze(&cfg, args),
            Command::Plan(args) => run_plan(&cfg, args),
            Command::Config(_) => Ok(()),
        }),
    };

    match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    }
}

fn main() {
    std::process::exit(run_cli());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_verbose_flag() {
        let cli = Cli::parse_from(["abtest", "-vvv", "plan"]);
        assert_eq!(cli.verbose, 3);
        assert!(matches!(cli.command, Some(Command::Plan(_))));
    }

    #[test]
    fn dashboard_flags() {
        let cli = Cli::parse_from([
            "abtest",
            "dashboard",
            "--treatment-rate",
            "0.15",
            "--sample-size",
            "5000",
            "--json",
        ]);
        match cli.command {
            Some(Command::Dashboard(args)) => {
                assert_eq!(args.treatment_rate, Some(0.15));
                assert_eq!(args.sample_size, Some(5000));
                assert!(args.json);
                assert!(args.control_rate.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn generate_defaults_to_csv_name() {
        let cli = Cli::parse_from(["abtest", "generate"]);
        match cli.command {
            Some(Command::Generate(args)) => assert_eq!(args.out, PathBuf::from(DEFAULT_CSV_PATH)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn no_subcommand_means_dashboard() {
        let cli = Cli::parse_from(["abtest"]);
        assert!(cli.command.is_none());
    }
}
