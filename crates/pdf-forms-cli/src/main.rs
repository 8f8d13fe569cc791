mod logger;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use logger::StderrLogger;
use pdf_form_layout::{FieldValues, FormSettings};
use pdf_form_overlay::OverlayOptions;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Stands for standard input or output in path arguments
const STDIO: &str = "-";

#[derive(Parser)]
#[command(name = "pdff", about = "Interactive PDF form overlays", version)]
struct Cli {
    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a form as a standalone interactive PDF
    Create {
        /// Form definition file
        definitions: PathBuf,

        /// Name of the form to render
        form: String,

        /// Output PDF file
        #[arg(default_value = "form.pdf")]
        output: PathBuf,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Render a form and merge it onto an existing PDF
    Attach {
        /// Form definition file
        definitions: PathBuf,

        /// Name of the form to render
        form: String,

        /// Document to put the form fields on
        original: PathBuf,

        /// Output PDF file [default: result.pdf next to the original]
        result: Option<PathBuf>,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Write field values into a PDF's form fields
    Fill {
        /// PDF to fill, or '-' for standard input
        pdf: Option<String>,

        /// Field value file, or '-' for standard input
        values: Option<String>,

        /// Output PDF file, or '-' for standard output
        output: Option<String>,
    },

    /// List the field names of a form
    FieldIds {
        /// Form definition file
        definitions: PathBuf,

        /// Name of the form
        form: String,
    },

    /// Print the resolved layout of a form as JSON
    Layout {
        /// Form definition file
        definitions: PathBuf,

        /// Name of the form
        form: String,
    },
}

#[derive(Args)]
struct RenderArgs {
    /// Outline every field in red (attach: also fill each field with its name)
    #[arg(long)]
    debug: bool,

    /// Draw a millimeter grid on every page
    #[arg(long)]
    grid: bool,

    /// Paper size of generated pages
    #[arg(long, default_value = "a4", value_enum)]
    paper: PaperArg,
}

#[derive(Clone, Copy, ValueEnum)]
enum PaperArg {
    A3,
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
}

impl From<PaperArg> for pdf_form_overlay::PaperSize {
    fn from(arg: PaperArg) -> Self {
        match arg {
            PaperArg::A3 => Self::A3,
            PaperArg::A4 => Self::A4,
            PaperArg::A5 => Self::A5,
            PaperArg::Letter => Self::Letter,
            PaperArg::Legal => Self::Legal,
            PaperArg::Tabloid => Self::Tabloid,
        }
    }
}

impl From<&RenderArgs> for OverlayOptions {
    fn from(args: &RenderArgs) -> Self {
        OverlayOptions::default()
            .with_paper_size(args.paper.into())
            .with_debug(args.debug)
            .with_grid(args.grid)
    }
}

fn is_stdio(arg: Option<&str>) -> bool {
    arg.is_none_or(|a| a == STDIO)
}

async fn read_stdin() -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    tokio::io::stdin()
        .read_to_end(&mut bytes)
        .await
        .context("Failed to read standard input")?;
    Ok(bytes)
}

async fn load_settings(definitions: &Path) -> Result<FormSettings> {
    FormSettings::load(definitions)
        .await
        .with_context(|| format!("Failed to load form definitions from {}", definitions.display()))
}

fn default_result_path(original: &Path) -> PathBuf {
    original
        .parent()
        .map(|dir| dir.join("result.pdf"))
        .unwrap_or_else(|| PathBuf::from("result.pdf"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    StderrLogger::new(StderrLogger::level_for(cli.verbose))
        .init()
        .context("Failed to install logger")?;

    match cli.command {
        Commands::Create {
            definitions,
            form,
            output,
            render,
        } => {
            let settings = load_settings(&definitions).await?;
            let layout = settings.form(&form)?;
            let doc = pdf_form_overlay::render_overlay(layout, &OverlayOptions::from(&render))?;
            pdf_form_overlay::save_pdf(doc, &output).await?;
            println!(
                "Created form '{}' ({} page(s)) → {}",
                form,
                layout.page_count(),
                output.display()
            );
        }

        Commands::Attach {
            definitions,
            form,
            original,
            result,
            render,
        } => {
            let settings = load_settings(&definitions).await?;
            let layout = settings.form(&form)?;
            let source = pdf_form_overlay::load_pdf(&original)
                .await
                .with_context(|| format!("Failed to read {}", original.display()))?;

            let mut merged =
                pdf_form_overlay::attach(&source, layout, &OverlayOptions::from(&render))?;
            if render.debug {
                let names: FieldValues = layout
                    .field_names()
                    .into_iter()
                    .map(|name| (name.clone(), name))
                    .collect();
                pdf_form_overlay::fill(&mut merged, &names)?;
            }

            let result = result.unwrap_or_else(|| default_result_path(&original));
            pdf_form_overlay::save_pdf(merged, &result).await?;
            println!("Attached form '{}' → {}", form, result.display());
        }

        Commands::Fill {
            pdf,
            values,
            output,
        } => {
            if is_stdio(pdf.as_deref()) && is_stdio(values.as_deref()) {
                bail!("The PDF and the field values cannot both be read from standard input");
            }

            let mut doc = match pdf.as_deref() {
                Some(path) if path != STDIO => pdf_form_overlay::load_pdf(path)
                    .await
                    .with_context(|| format!("Failed to read {}", path))?,
                _ => pdf_form_overlay::load_pdf_bytes(read_stdin().await?).await?,
            };
            let values = match values.as_deref() {
                Some(path) if path != STDIO => FieldValues::load(path)
                    .await
                    .with_context(|| format!("Failed to load field values from {}", path))?,
                _ => FieldValues::from_reader(read_stdin().await?.as_slice())?,
            };

            let summary = pdf_form_overlay::fill(&mut doc, &values)?;
            match output.as_deref() {
                Some(path) if path != STDIO => {
                    pdf_form_overlay::save_pdf(doc, path).await?;
                    println!(
                        "Filled {} of {} field(s) → {}",
                        summary.filled, summary.widgets, path
                    );
                }
                _ => {
                    let bytes = pdf_form_overlay::pdf_to_bytes(doc).await?;
                    let mut stdout = tokio::io::stdout();
                    stdout
                        .write_all(&bytes)
                        .await
                        .context("Failed to write standard output")?;
                    stdout.flush().await?;
                }
            }
        }

        Commands::FieldIds { definitions, form } => {
            let settings = load_settings(&definitions).await?;
            for id in settings.form_field_ids(&form)? {
                println!("{}", id);
            }
        }

        Commands::Layout { definitions, form } => {
            let settings = load_settings(&definitions).await?;
            let layout = settings.form(&form)?;
            println!("{}", serde_json::to_string_pretty(layout)?);
        }
    }

    Ok(())
}
