use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{error, info, Level};
use simple_logger::init_with_level;

use evidence_filter::output::{write_accepted, write_decisions};
use evidence_filter::{CandidateLoader, CandidateSummary, EvidenceFilter, FilterOptions};

/// Filter transcript-evidence alignments down to the best candidates per
/// evidence sequence.
#[derive(Parser, Debug)]
#[command(name = "evidence-filter")]
#[command(author, version, about)]
struct Cli {
    /// Log every per-candidate decision
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Filter candidate alignments and write the accepted ones as TSV
    Filter(FilterArgs),

    /// Load candidate alignments and print summary stats
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Candidate alignments (.gff/.gff3/.gtf, optionally .gz)
    #[arg(long, short)]
    input: PathBuf,

    /// Feature types that count as exons (repeatable)
    #[arg(
        long = "exon-feature-type",
        value_name = "TYPE",
        num_args = 1..,
        default_values_t = vec!["exon".to_string()]
    )]
    exon_feature_types: Vec<String>,
}

#[derive(Args, Debug)]
struct InspectArgs {
    #[command(flatten)]
    input: InputArgs,
}

#[derive(Args, Debug)]
struct FilterArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output TSV of accepted candidates (default: stdout)
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Optional TSV with the verdict for every candidate
    #[arg(long)]
    report: Option<PathBuf>,

    /// Minimum coverage of an accepted candidate
    #[arg(long, alias = "min-score", value_name = "PERCENT", default_value_t = 0.0)]
    min_coverage: f64,

    /// Minimum percent identity of an accepted candidate
    #[arg(long, value_name = "PERCENT", default_value_t = 0.0)]
    min_percent: f64,

    /// Only keep candidates whose coverage equals the best of their evidence sequence
    #[arg(long)]
    best_in_genome: bool,

    /// Reject unspliced candidates when the best candidate is spliced
    #[arg(long)]
    reject_processed_pseudos: bool,
}

impl FilterArgs {
    fn options(&self) -> FilterOptions {
        FilterOptions::new()
            .min_coverage(self.min_coverage)
            .min_percent(self.min_percent)
            .best_in_genome(self.best_in_genome)
            .reject_processed_pseudos(self.reject_processed_pseudos)
    }
}

fn open_output(path: Option<&PathBuf>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("create {}", p.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

fn loader(args: &InputArgs) -> CandidateLoader {
    let types: Vec<&str> = args.exon_feature_types.iter().map(String::as_str).collect();
    CandidateLoader::new().exon_feature_types(&types)
}

fn run(cli: Cli) -> Result<()> {
    match cli.cmd {
        Command::Filter(args) => {
            let filter = EvidenceFilter::new(args.options()).context("invalid filter options")?;

            let candidates = loader(&args.input).load_from_path(&args.input.input)?;
            let report = filter.filter_with_report(&candidates)?;

            let mut out = open_output(args.output.as_ref())?;
            write_accepted(&mut out, &report).context("write accepted candidates")?;
            out.flush()?;

            if let Some(path) = &args.report {
                let mut rep = open_output(Some(path))?;
                write_decisions(&mut rep, &report)
                    .with_context(|| format!("write report to {}", path.display()))?;
                rep.flush()?;
                info!("Report written to {}", path.display());
            }
        }

        Command::Inspect(args) => {
            let candidates = loader(&args.input).load_from_path(&args.input.input)?;
            print!("{}", CandidateSummary::from_candidates(&candidates));
        }
    }

    Ok(())
}

fn main() {
    let start = std::time::Instant::now();
    let cli = Cli::parse();

    let level = if cli.verbose { Level::Debug } else { Level::Info };
    if let Err(e) = init_with_level(level) {
        eprintln!("failed to initialise logger: {e}");
    }

    if let Err(e) = run(cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }

    info!("Elapsed time: {:.3?}", start.elapsed());
}
