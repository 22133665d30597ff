use anyhow::Context;
use clap::Parser;
use semprop::prelude::*;
use semprop_storage::write_matchings;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Combine, cancel and evaluate persisted schema-to-ontology matchings
#[derive(Parser, Debug)]
#[command(name = "semprop")]
#[command(about = "Schema-to-ontology matching combination and evaluation", long_about = None)]
struct Args {
    /// Directory holding the raw matcher results (l1, l4, ..., neg_l52)
    #[arg(short, long, default_value = "./results/raw")]
    raw_dir: PathBuf,

    /// Ground truth file to evaluate against
    #[arg(short, long)]
    ground_truth: PathBuf,

    /// JSON pipeline configuration; defaults apply to absent keys
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Class hierarchy file (`ontology %%% child %%% parent`) enabling ancestor summarization
    #[arg(long)]
    hierarchy: Option<PathBuf>,

    /// Where to write the JSON run report
    #[arg(long)]
    report: Option<PathBuf>,

    /// Where to write the final matchings
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting SemProp v{}", env!("CARGO_PKG_VERSION"));
    info!("Raw results: {:?}", args.raw_dir);

    let config = match &args.config {
        Some(path) => load_config(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    let summarizer: Arc<dyn Summarizer> = match &args.hierarchy {
        Some(path) => Arc::new(AncestorSummarizer::new(
            load_hierarchy(path).with_context(|| format!("loading hierarchy {}", path.display()))?,
        )),
        None => {
            info!("No class hierarchy given; summarization is a passthrough");
            Arc::new(Passthrough)
        }
    };

    let streams = RawResultStore::new(&args.raw_dir)?
        .load_streams()
        .context("loading raw results")?;
    let ground_truth = load_ground_truth(&args.ground_truth)
        .with_context(|| format!("loading ground truth {}", args.ground_truth.display()))?;

    let pipeline = Pipeline::new(config, summarizer)?;
    let run = pipeline.run_and_evaluate(streams, &ground_truth);

    let report = RunReport::from_run(&run);
    info!("{}", report.summary());

    if let Some(path) = &args.output {
        write_matchings(path, run.matchings())
            .with_context(|| format!("writing matchings {}", path.display()))?;
        info!("Final matchings written to {:?}", path);
    }
    if let Some(path) = &args.report {
        report.write_json(path)?;
    }

    Ok(())
}
