use anyhow::Context;
use clap::{Parser, ValueEnum};
use foldsplit::config::{AppConfig, ConfigManager};
use foldsplit::data::CsvConnector;
use foldsplit::engines::splitters::{
    FoldSplitter, ProportionalSplitter, SplitPolicy, WithholdLastKSplitter,
};
use foldsplit::engines::validation::SplitReport;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    Proportional,
    Withhold,
}

#[derive(Debug, Parser)]
#[command(name = "foldsplit", about = "Split a per-entity event log into leak-free folds")]
struct Args {
    /// Event log CSV
    #[arg(long)]
    input: PathBuf,

    /// TOML or JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides the configured policy
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,

    /// Overrides the configured fold count
    #[arg(long)]
    folds: Option<usize>,

    /// Write folds and report as JSON
    #[arg(long)]
    output: Option<PathBuf>,
}

fn load_config(args: &Args) -> anyhow::Result<AppConfig> {
    let manager = ConfigManager::new();
    if let Some(path) = &args.config {
        manager
            .load_from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?;
    }
    manager.update(|c| {
        if let Some(policy) = args.policy {
            c.split.policy = match policy {
                PolicyArg::Proportional => SplitPolicy::Proportional,
                PolicyArg::Withhold => SplitPolicy::WithholdLastK,
            };
        }
        if let Some(folds) = args.folds {
            c.split.n_splits = folds;
        }
    })?;
    Ok(manager.get()?)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = load_config(&args)?;

    let require_subtype = config.split.policy == SplitPolicy::WithholdLastK;
    let log = CsvConnector::load_event_log(&args.input, &config.columns, require_subtype)
        .with_context(|| format!("loading {}", args.input.display()))?;

    let metadata = CsvConnector::create_metadata(&args.input, &log);
    log::info!(
        "Loaded {} rows for {} entities ({} skipped)",
        metadata.num_rows,
        metadata.num_entities,
        metadata.skipped_rows
    );

    let splitter: Box<dyn FoldSplitter> = match config.split.policy {
        SplitPolicy::Proportional => Box::new(ProportionalSplitter::from_config(
            &config.split,
            &config.columns,
        )?),
        SplitPolicy::WithholdLastK => Box::new(WithholdLastKSplitter::from_config(
            &config.split,
            &config.columns,
        )?),
    };

    let folds = splitter.split_log(&log)?;
    let report = SplitReport::build(&folds, &log);

    println!("policy={}", splitter.name());
    for stats in &report.fold_stats {
        println!(
            "fold={} train_rows={} test_rows={} test_entities={}",
            stats.fold_num, stats.train_rows, stats.test_rows, stats.test_entities
        );
    }
    for violation in &report.violations {
        println!("violation {}", violation);
    }
    println!("{}", report.summary);

    if let Some(path) = &args.output {
        let payload = serde_json::json!({
            "metadata": metadata,
            "folds": folds,
            "report": report,
        });
        std::fs::write(path, serde_json::to_string_pretty(&payload)?)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    if !report.passed {
        anyhow::bail!("{} leakage violations", report.violations.len());
    }
    Ok(())
}
