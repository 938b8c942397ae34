use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use keyword_network::{
    build_graph, ingest,
    pipeline::validation::ValidationEngine,
    GraphStats, NetworkConfig, NoopObserver, Pipeline, PipelineContext, PipelineOutcome, RunSpec,
    TokenCount, VisualEncoding,
};

#[derive(Parser, Debug)]
#[command(
    name = "keyword-network",
    about = "Keyword frequency and co-occurrence networks from short documents"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenize documents and write frequency, edge list and graph files.
    Run {
        /// Documents as a JSON array or JSON Lines with `title`/`description`
        #[arg(long, required_unless_present = "tokens", conflicts_with = "tokens")]
        input: Option<PathBuf>,
        /// Previously written token lists; skips tokenization. A `.csv` file
        /// is read by its `description_cleaned` column, anything else as one
        /// list per line
        #[arg(long)]
        tokens: Option<PathBuf>,
        /// Run spec (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Minimum co-occurrence count for an edge
        #[arg(long, allow_negative_numbers = true)]
        min_weight: Option<i64>,
        /// Extra stopword (repeatable)
        #[arg(long = "stopword")]
        stopwords: Vec<String>,
        /// Output directory
        #[arg(long)]
        out_dir: PathBuf,
    },

    /// Rebuild a graph from a persisted edge list and print its statistics.
    Graph {
        /// Edge list with `Source,Target,Weight` columns
        #[arg(long)]
        edges: PathBuf,
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        min_weight: i64,
        /// Also print per-node sizes and per-edge widths
        #[arg(long)]
        full: bool,
    },
}

/// Contents of `graph.json`
#[derive(Serialize)]
struct GraphSummary<'a> {
    min_weight: i64,
    stats: GraphStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_words: Option<Vec<TokenCount>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    encoding: Option<&'a VisualEncoding>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            tokens,
            config,
            min_weight,
            stopwords,
            out_dir,
        } => cmd_run(input, tokens, config, min_weight, stopwords, out_dir),
        Commands::Graph {
            edges,
            min_weight,
            full,
        } => cmd_graph(&edges, min_weight, full),
    }
}

fn load_config(
    path: Option<PathBuf>,
    min_weight: Option<i64>,
    stopwords: Vec<String>,
) -> anyhow::Result<NetworkConfig> {
    let mut spec = match path {
        Some(path) => RunSpec::from_path(&path)
            .with_context(|| format!("reading run spec {}", path.display()))?,
        None => RunSpec::default(),
    };
    if min_weight.is_some() {
        spec.graph.min_weight = min_weight;
    }
    spec.tokenizer.stopwords.extend(stopwords);

    let (config, report) = ValidationEngine::with_defaults().resolve(&spec)?;
    for warning in report.warnings() {
        warn!(%warning, "run spec warning");
    }
    Ok(config)
}

fn cmd_run(
    input: Option<PathBuf>,
    tokens: Option<PathBuf>,
    config_path: Option<PathBuf>,
    min_weight: Option<i64>,
    stopwords: Vec<String>,
    out_dir: PathBuf,
) -> anyhow::Result<()> {
    let config = load_config(config_path, min_weight, stopwords)?;
    let pipeline = Pipeline::new(config)?;

    let outcome = match (input, tokens) {
        (Some(path), _) => {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("reading documents {}", path.display()))?;
            let documents = ingest::parse_documents(&text)?;
            info!(documents = documents.len(), "loaded documents");
            pipeline.run(&documents, &mut NoopObserver)
        }
        (None, Some(path)) => {
            let file = File::open(&path)
                .with_context(|| format!("opening token lists {}", path.display()))?;
            let reader = BufReader::new(file);
            let lists = if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("csv")) {
                ingest::read_token_table(reader)?
            } else {
                ingest::read_token_lists(reader)?
            };
            info!(documents = lists.len(), "loaded token lists");
            pipeline.run_token_lists(lists, &mut NoopObserver)
        }
        (None, None) => anyhow::bail!("either --input or --tokens is required"),
    };

    for error in outcome.batch_report().malformed() {
        warn!(%error, "document skipped");
    }

    let ctx = match outcome {
        PipelineOutcome::Completed(ctx) => ctx,
        PipelineOutcome::EmptyVocabulary(report) => {
            warn!(
                documents = report.len(),
                "no keywords survived tokenization; nothing written"
            );
            return Ok(());
        }
    };

    fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;
    write_outputs(&ctx, &out_dir)?;

    let stats = ctx.stats();
    info!(
        documents = ctx.report().len(),
        skipped = ctx.report().skipped_count(),
        vocabulary = ctx.frequencies().len(),
        pairs = ctx.pairs().len(),
        nodes = stats.nodes,
        edges = stats.edges,
        average_degree = stats.average_degree,
        out_dir = %out_dir.display(),
        "run complete"
    );
    Ok(())
}

fn write_outputs(ctx: &PipelineContext, out_dir: &Path) -> anyhow::Result<()> {
    let mut out = create(&out_dir.join("tokens.jsonl"))?;
    ingest::write_token_lists(&mut out, ctx.token_lists())?;
    out.flush()?;

    let mut out = create(&out_dir.join("frequency.csv"))?;
    ingest::write_frequency_table(&mut out, ctx.frequencies())?;
    out.flush()?;

    // every pair is persisted so the threshold can be changed later
    let mut out = create(&out_dir.join("network_edge_list.csv"))?;
    ingest::write_edge_list(&mut out, ctx.pairs())?;
    out.flush()?;

    let encoding = ctx.encoding();
    let summary = GraphSummary {
        min_weight: ctx.config().min_weight,
        stats: ctx.stats(),
        top_words: Some(ctx.top_words()),
        encoding: Some(&encoding),
    };
    let mut out = create(&out_dir.join("graph.json"))?;
    serde_json::to_writer_pretty(&mut out, &summary)?;
    out.flush()?;

    Ok(())
}

fn create(path: &Path) -> anyhow::Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    Ok(BufWriter::new(file))
}

fn cmd_graph(edges: &Path, min_weight: i64, full: bool) -> anyhow::Result<()> {
    let config = NetworkConfig::default().with_min_weight(min_weight);
    config.validate()?;
    let threshold = config.edge_threshold()?;

    let file = File::open(edges).with_context(|| format!("opening {}", edges.display()))?;
    let pairs = ingest::read_edge_list(BufReader::new(file))?;
    let graph = build_graph(&pairs, threshold);

    if graph.is_empty() {
        warn!(min_weight, pairs = pairs.len(), "no pair reaches the edge threshold");
    }

    let encoding = full.then(|| VisualEncoding::encode(&graph, &config.encoding_scale()));
    let summary = GraphSummary {
        min_weight,
        stats: graph.stats(),
        top_words: None,
        encoding: encoding.as_ref(),
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, &summary)?;
    writeln!(out)?;
    Ok(())
}
