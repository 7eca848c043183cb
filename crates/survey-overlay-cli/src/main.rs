use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use survey_overlay::{DocumentRole, OverlayOptions, OverlayStatistics};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "survey-overlay",
    about = "Composite a PDF template beneath alternating survey pages",
    version
)]
struct Cli {
    /// Show per-page decisions
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge a template into a survey and write the result
    Overlay {
        /// Template PDF (its first page is the background)
        #[arg(short, long)]
        template: PathBuf,

        /// Survey PDF
        #[arg(short, long)]
        survey: PathBuf,

        /// Output PDF file
        #[arg(short, long)]
        output: PathBuf,

        /// Scaling mode for pages that don't match the template size
        #[arg(long, value_enum)]
        scaling: Option<ScalingArg>,

        /// Header version of the output PDF
        #[arg(long)]
        pdf_version: Option<String>,

        /// Write uncompressed content streams
        #[arg(long)]
        no_compress: bool,

        /// Load options from a JSON file; flags override its values
        #[arg(long)]
        config: Option<PathBuf>,

        /// Show statistics only, don't generate PDF
        #[arg(long)]
        stats_only: bool,
    },

    /// Show what an overlay would produce
    Stats {
        /// Template PDF
        #[arg(short, long)]
        template: PathBuf,

        /// Survey PDF
        #[arg(short, long)]
        survey: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ScalingArg {
    Fit,
    Stretch,
}

impl From<ScalingArg> for survey_overlay::ScalingMode {
    fn from(arg: ScalingArg) -> Self {
        match arg {
            ScalingArg::Fit => Self::Fit,
            ScalingArg::Stretch => Self::Stretch,
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn load_inputs(
    template: &Path,
    survey: &Path,
) -> Result<(lopdf::Document, lopdf::Document)> {
    let template_doc = survey_overlay::load_pdf(template, DocumentRole::Template)
        .await
        .with_context(|| format!("Failed to load template {}", template.display()))?;
    let survey_doc = survey_overlay::load_pdf(survey, DocumentRole::Survey)
        .await
        .with_context(|| format!("Failed to load survey {}", survey.display()))?;
    Ok((template_doc, survey_doc))
}

fn print_statistics(stats: &OverlayStatistics) {
    println!("Overlay Statistics:");
    println!("  Survey pages: {}", stats.survey_pages);
    println!("  Composited pages: {}", stats.composited_pages);
    println!("  Passthrough pages: {}", stats.passthrough_pages);
    println!("  Template size: {}", stats.template_size);
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Overlay {
            template,
            survey,
            output,
            scaling,
            pdf_version,
            no_compress,
            config,
            stats_only,
        } => {
            let mut options = match config {
                Some(path) => OverlayOptions::load(&path)
                    .await
                    .with_context(|| format!("Failed to load config {}", path.display()))?,
                None => OverlayOptions::default(),
            };
            if let Some(scaling) = scaling {
                options.scaling_mode = scaling.into();
            }
            if let Some(version) = pdf_version {
                options.pdf_version = version;
            }
            if no_compress {
                options.compress = false;
            }
            options.validate()?;

            let (template_doc, survey_doc) = load_inputs(&template, &survey).await?;

            let stats = survey_overlay::calculate_statistics(&template_doc, &survey_doc)?;
            print_statistics(&stats);

            if stats_only {
                return Ok(());
            }

            let compress = options.compress;
            let merged = survey_overlay::overlay_async(template_doc, survey_doc, options).await?;
            survey_overlay::save_pdf(merged, &output, compress).await?;
            println!("Merged → {}", output.display());
        }

        Commands::Stats { template, survey } => {
            let (template_doc, survey_doc) = load_inputs(&template, &survey).await?;
            let stats = survey_overlay::calculate_statistics(&template_doc, &survey_doc)?;
            print_statistics(&stats);
        }
    }

    Ok(())
}
