use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use log::{info, warn};

use submission_monitor::monitor::{self, Monitor, MonitorConfig, MonitorOutcome};
use submission_monitor::{MatchMode, RosterParser};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MatchModeArg {
    /// Student name appears anywhere in the file name
    Substring,
    /// Student name appears as whole words in the file name
    ExactToken,
    /// File name matches --pattern with {name} substituted
    Regex,
}

#[derive(Parser, Debug)]
#[command(name = "submission-monitor")]
#[command(about = "Watch a class's submission folder and show who has handed in work", long_about = None)]
#[command(version)]
struct Cli {
    /// Roster file listing classes, their folders and students
    #[arg(short, long, value_name = "FILE")]
    roster: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Class to monitor, by number or name; prompts when omitted
    #[arg(long, value_name = "N|NAME")]
    class: Option<String>,

    /// Where to write the status page
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Seconds between scans
    #[arg(short, long, value_name = "SECS")]
    interval: Option<u64>,

    /// How files are matched to students
    #[arg(long, value_enum)]
    match_mode: Option<MatchModeArg>,

    /// Regex template for --match-mode regex, e.g. "^{name}_hw\d+"
    #[arg(long, value_name = "TEMPLATE")]
    pattern: Option<String>,

    /// Keep scanning after everyone has submitted
    #[arg(long)]
    keep_running: bool,

    /// Stop after this many scans
    #[arg(long, value_name = "N")]
    max_cycles: Option<u64>,

    /// Print the classes in the roster and exit
    #[arg(long)]
    list: bool,

    /// With --list, print the classes as JSON
    #[arg(long, requires = "list")]
    json: bool,

    /// More output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Defaults, then the config file, then the environment, then flags
    fn resolve_config(&self) -> Result<MonitorConfig> {
        let mut config = match &self.config {
            Some(path) => MonitorConfig::load(path)?,
            None => MonitorConfig::default(),
        };
        config.apply_env()?;

        if let Some(roster) = &self.roster {
            config.roster_path = roster.clone();
        }
        if let Some(output) = &self.output {
            config.output_path = output.clone();
        }
        if let Some(interval) = self.interval {
            config.poll_interval_secs = interval;
        }
        if self.keep_running {
            config.stop_when_complete = false;
        }
        if self.max_cycles.is_some() {
            config.max_cycles = self.max_cycles;
        }

        config.matching = match (self.match_mode, &self.pattern) {
            (Some(MatchModeArg::Substring), _) => MatchMode::Substring,
            (Some(MatchModeArg::ExactToken), _) => MatchMode::ExactToken,
            (Some(MatchModeArg::Regex) | None, Some(pattern)) => MatchMode::Regex {
                pattern: pattern.clone(),
            },
            (Some(MatchModeArg::Regex), None) => bail!("--match-mode regex needs --pattern"),
            (None, None) => config.matching,
        };

        Ok(config)
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.resolve_config()?;

    let mut classes = RosterParser::new()
        .parse_file(&config.roster_path)
        .with_context(|| format!("Could not load roster {}", config.roster_path.display()))?;

    if cli.list {
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&classes)?);
        } else {
            print!("{}", monitor::format_menu(&classes));
        }
        return Ok(());
    }

    if classes.is_empty() {
        bail!("{} defines no classes", config.roster_path.display());
    }

    let index = match &cli.class {
        Some(choice) => monitor::select_class(&classes, choice)?,
        None => monitor::prompt_for_class(&classes, &mut io::stdin().lock(), &mut io::stdout())?,
    };
    let class = classes.swap_remove(index);

    let mut monitor = Monitor::new(class, config)?;
    match monitor.run().await? {
        MonitorOutcome::Converged { cycles } => {
            info!("Everyone has submitted ({} scans)", cycles)
        }
        MonitorOutcome::Cancelled { cycles } => info!("Stopped after {} scans", cycles),
        MonitorOutcome::CycleLimit { cycles } => {
            let class = monitor.class();
            warn!(
                "Stopped after {} scans with {}/{} submitted",
                cycles,
                class.found_count(),
                class.student_count()
            );
        }
    }

    Ok(())
}
