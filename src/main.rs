//! Lamp Noise CLI
//!
//! Drift-independent noise analysis for lamp stability data.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use lamp_noise::{
    config::{ChannelConfig, Config},
    core::{per_file_summary, HighNoiseSelector, IntervalAggregator, NoiseStatistic},
    report::{ChannelSummary, NoiseReport, ReportBuilder},
    IntervalGroup, Sample, SelectionMode, Stitcher, VERSION,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lamp-noise")]
#[command(version = VERSION)]
#[command(about = "Drift-independent noise analysis for lamp stability data", long_about = None)]
#[command(allow_negative_numbers = true)]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze chronologically ordered data files
    Analyze {
        /// Data files, oldest first
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        window: WindowArgs,

        /// Channels to analyze (main, reference, or all)
        #[arg(long)]
        channels: Option<String>,

        /// Read every file even after the window is full
        #[arg(long)]
        no_early_stop: bool,

        /// List high-noise intervals
        #[arg(long, visible_alias = "show-high-noise-intervals")]
        intervals: bool,

        /// List every interval at or above this noise value
        #[arg(long)]
        threshold: Option<f64>,

        /// List the N noisiest intervals
        #[arg(long)]
        top: Option<i64>,

        /// Show raw sample ranges around each listed interval
        #[arg(long)]
        context: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show per-file noise without window truncation
    Files {
        /// Data files, oldest first
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Target subset duration in seconds
        #[arg(long)]
        subset_duration: Option<f64>,
    },

    /// Show configuration
    Config,
}

#[derive(clap::Args)]
struct WindowArgs {
    /// Warm-up seconds excluded from statistics
    #[arg(long)]
    warmup: Option<f64>,

    /// Analysis window length in seconds
    #[arg(long)]
    window: Option<f64>,

    /// Maximum intervals per channel
    #[arg(long)]
    max_intervals: Option<usize>,

    /// Target subset duration in seconds
    #[arg(long)]
    subset_duration: Option<f64>,
}

impl WindowArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(warmup) = self.warmup {
            config.window.warmup_secs = warmup;
        }
        if let Some(length) = self.window {
            config.window.length_secs = length;
        }
        if let Some(max) = self.max_intervals {
            config.window.max_intervals = max;
        }
        if let Some(duration) = self.subset_duration {
            config.subset_duration_secs = duration;
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => Config::load().context("loading configuration")?,
    };

    match cli.command {
        Commands::Analyze {
            files,
            window,
            channels,
            no_early_stop,
            intervals,
            threshold,
            top,
            context,
            json,
        } => {
            let mut config = config;
            window.apply(&mut config);
            if let Some(channels) = channels {
                config.channels = ChannelConfig::from_csv(&channels);
            }
            if no_early_stop {
                config.early_stop = false;
            }
            let list_intervals = intervals || context || threshold.is_some() || top.is_some();
            if threshold.is_some() || top.is_some() {
                config.selection = SelectionMode::from_options(threshold, top);
            }
            config.validate()?;
            let output = Output {
                list_intervals,
                context,
                json,
            };
            cmd_analyze(&config, &files, output)
        }
        Commands::Files {
            files,
            subset_duration,
        } => {
            let mut config = config;
            if let Some(duration) = subset_duration {
                config.subset_duration_secs = duration;
            }
            config.early_stop = false;
            config.validate()?;
            cmd_files(&config, &files);
            Ok(())
        }
        Commands::Config => cmd_config(&config, cli.config),
    }
}

/// What `analyze` prints.
struct Output {
    list_intervals: bool,
    context: bool,
    json: bool,
}

fn cmd_analyze(config: &Config, files: &[PathBuf], output: Output) -> anyhow::Result<()> {
    tracing::info!("Total files to process: {}", files.len());

    let run = IntervalAggregator::new(config).run(files);
    let channels = config.channels.enabled();
    let builder = ReportBuilder::new();

    let report = if output.list_intervals {
        let selector = HighNoiseSelector::new(&config.window, config.selection);
        let groups = selector.select(run.all_records());
        builder.build_with_groups(&run, &config.window, &channels, selector.mode(), groups)
    } else {
        builder.build(&run, &config.window, &channels)
    };

    if output.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        eprintln!("{}", run.log.summary());
        print_report(&report);
        if output.context {
            if let Some(section) = &report.high_noise {
                print_contexts(&run.stitcher, &section.groups, config.context_padding_secs);
            }
        }
    }

    if run.spans().is_empty() {
        bail!("no readable data files");
    }
    Ok(())
}

fn print_report(report: &NoiseReport) {
    println!();
    println!("{}", "=".repeat(50));
    println!("ANALYSIS RESULTS");
    println!(
        "Window: {:.0}s - {:.0}s, up to {} intervals",
        report.window.warmup_secs,
        report.window.end_secs(),
        report.window.max_intervals
    );
    println!("{}", "=".repeat(50));
    for summary in &report.channels {
        print_channel(summary);
    }

    if let Some(section) = &report.high_noise {
        println!();
        println!("{}", "=".repeat(50));
        match section.selection {
            SelectionMode::Threshold(t) => println!("HIGH NOISE INTERVALS ABOVE {t}"),
            SelectionMode::TopK(_) => {
                println!("TOP {} HIGH NOISE INTERVALS", section.groups.len())
            }
        }
        println!("{}", "=".repeat(50));
        if section.groups.is_empty() {
            println!("No high noise intervals found.");
        }
        for (i, group) in section.groups.iter().enumerate() {
            print_group(i + 1, group);
        }
    }
}

fn print_channel(summary: &ChannelSummary) {
    println!("{} Channel:", summary.channel);
    match (summary.mean, summary.max) {
        (Some(mean), Some(max)) => {
            println!("  Mean Noise: {mean:.3}");
            println!("  Max Noise:  {max:.3}");
        }
        _ => println!("  No intervals inside the analysis window"),
    }
    println!("  Intervals:  {}", summary.count);
}

fn print_group(rank: usize, group: &IntervalGroup) {
    println!(
        "{:2}. Time: {:.1} - {:.1} min ({})",
        rank,
        group.start_time / 60.0,
        group.end_time / 60.0,
        group.filename
    );
    if let Some(noise) = group.main_noise {
        println!("    Main Channel: {noise:.3}");
    }
    if let Some(noise) = group.reference_noise {
        println!("    Reference Channel: {noise:.3}");
    }
}

fn print_contexts(stitcher: &Stitcher, groups: &[IntervalGroup], padding: f64) {
    println!();
    println!("Raw samples within {padding:.0}s of each interval:");
    for (i, group) in groups.iter().enumerate() {
        let context = stitcher.context_for(group, padding);
        println!(
            "{:2}. {:.1}s - {:.1}s: Main {}, Reference {}",
            i + 1,
            context.start,
            context.end,
            sample_range(&context.main),
            sample_range(&context.reference)
        );
    }
}

fn sample_range(samples: &[Sample]) -> String {
    if samples.is_empty() {
        return "no samples".to_string();
    }
    let (min, max) = samples
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
            (lo.min(s.value), hi.max(s.value))
        });
    format!("{} samples in [{min:.2}, {max:.2}]", samples.len())
}

fn cmd_files(config: &Config, files: &[PathBuf]) {
    let run = IntervalAggregator::new(config).run(files);

    println!("Noise Analysis Results for Selected Files:");
    println!("{}", "=".repeat(60));
    for summary in per_file_summary(&run) {
        println!();
        println!("File: {}", summary.filename);
        println!("{}", "-".repeat(50));
        print_file_channel("Main", summary.main);
        print_file_channel("Reference", summary.reference);
    }
    for warning in run.warnings() {
        println!();
        println!("File: {}", warning.filename);
        println!("  Error processing file: {}", warning.reason);
    }
}

fn print_file_channel(name: &str, stat: Option<NoiseStatistic>) {
    match stat {
        Some(stat) => {
            println!("{name} Channel ({} intervals):", stat.count);
            println!("  Mean:   {:.3}", stat.mean);
            println!("  Max:    {:.3}", stat.max);
        }
        None => println!("{name} Channel (0 intervals): no full subsets"),
    }
}

fn cmd_config(config: &Config, path: Option<PathBuf>) -> anyhow::Result<()> {
    println!("Configuration");
    println!("=============");
    println!();
    println!(
        "Config file: {:?}",
        path.unwrap_or_else(Config::config_path)
    );
    println!();
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
