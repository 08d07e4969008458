use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use pdf_tools::operations::{
    delete_pdf_pages, image_file_to_pdf, merge_pdf_files, reencode_pdf_file, reorder_pdf_pages,
    rotate_pdf_file, split_pdf,
};
use pdf_tools::{ocr_text, DeleteSet, Document, OrderList, RangeList, TextRecognizer};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "pdftools",
    about = "Merge, split, rotate and convert PDFs from the command line",
    version,
    author
)]
struct Cli {
    /// Log what is being done to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge multiple PDFs into one
    Merge {
        /// Input PDF files, in output order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Split a PDF into one file per page range
    Split {
        /// Input PDF file
        input: PathBuf,

        /// Page ranges, 1-based and inclusive (e.g., "1-3,4-5")
        #[arg(short, long)]
        ranges: String,

        /// Output pattern ({} is replaced by the part number)
        #[arg(short = 'p', long, default_value = "split_part{}.pdf")]
        pattern: String,
    },

    /// Rotate every page of a PDF
    Rotate {
        /// Input PDF file
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Clockwise rotation in degrees, a multiple of 90 (negative is counter-clockwise)
        #[arg(short, long, default_value = "90", allow_hyphen_values = true)]
        angle: i64,
    },

    /// Rewrite a PDF with its pages in a new order
    Reorder {
        /// Input PDF file
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// New page order, 1-based (e.g., "3,1,2"); pages may repeat
        #[arg(long)]
        order: String,
    },

    /// Remove pages from a PDF
    DeletePages {
        /// Input PDF file
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Pages to remove, 1-based (e.g., "2,4")
        #[arg(short, long)]
        pages: String,
    },

    /// Re-encode a PDF, dropping unreferenced objects
    Compress {
        /// Input PDF file
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Convert a raster image into a one-page PDF
    ImageToPdf {
        /// Input image file
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Recognise the text in an image
    Ocr {
        /// Input image file
        input: PathBuf,

        /// Output text file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Directory holding text-detection.rten and text-recognition.rten
        #[arg(long)]
        models: Option<PathBuf>,
    },

    /// Get information about a PDF file
    Info {
        /// Input PDF file
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Merge { files, output } => {
            merge_pdf_files(&files, &output)
                .with_context(|| format!("failed to merge into {}", output.display()))?;
            println!("✓ Merged {} files into {}", files.len(), output.display());
        }

        Commands::Split {
            input,
            ranges,
            pattern,
        } => {
            let ranges = RangeList::parse(&ranges)
                .with_context(|| format!("invalid page ranges '{ranges}'"))?;
            if !pattern.contains("{}") && ranges.len() > 1 {
                bail!("output pattern '{pattern}' must contain {{}} when splitting into several parts");
            }

            let outputs: Vec<PathBuf> = (1..=ranges.len())
                .map(|part| PathBuf::from(pattern.replace("{}", &part.to_string())))
                .collect();
            split_pdf(&input, &ranges, &outputs)
                .with_context(|| format!("failed to split {}", input.display()))?;

            for output in &outputs {
                println!("✓ Wrote {}", output.display());
            }
        }

        Commands::Rotate {
            input,
            output,
            angle,
        } => {
            rotate_pdf_file(&input, angle, &output)
                .with_context(|| format!("failed to rotate {}", input.display()))?;
            println!(
                "✓ Successfully rotated pages {} degrees in {}",
                angle,
                output.display()
            );
        }

        Commands::Reorder {
            input,
            output,
            order,
        } => {
            let order =
                OrderList::parse(&order).with_context(|| format!("invalid page order '{order}'"))?;
            reorder_pdf_pages(&input, &order, &output)
                .with_context(|| format!("failed to reorder {}", input.display()))?;
            println!("✓ Reordered pages into {}", output.display());
        }

        Commands::DeletePages {
            input,
            output,
            pages,
        } => {
            let pages =
                DeleteSet::parse(&pages).with_context(|| format!("invalid pages '{pages}'"))?;
            delete_pdf_pages(&input, &pages, &output)
                .with_context(|| format!("failed to delete pages from {}", input.display()))?;
            println!("✓ Deleted pages, result in {}", output.display());
        }

        Commands::Compress { input, output } => {
            reencode_pdf_file(&input, &output)
                .with_context(|| format!("failed to re-encode {}", input.display()))?;
            println!("✓ Re-encoded {} into {}", input.display(), output.display());
        }

        Commands::ImageToPdf { input, output } => {
            image_file_to_pdf(&input, &output)
                .with_context(|| format!("failed to convert {}", input.display()))?;
            println!("✓ Converted {} into {}", input.display(), output.display());
        }

        Commands::Ocr {
            input,
            output,
            models,
        } => {
            let recognizer = build_recognizer(models.as_deref())?;
            let data =
                std::fs::read(&input).with_context(|| format!("failed to read {}", input.display()))?;
            let text = ocr_text(recognizer.as_ref(), &data)
                .with_context(|| format!("failed to recognise text in {}", input.display()))?;

            if let Some(output_path) = output {
                std::fs::write(&output_path, &text)
                    .with_context(|| format!("failed to write {}", output_path.display()))?;
                println!("✓ Text extracted to: {}", output_path.display());
            } else {
                print!("{text}");
            }
        }

        Commands::Info { input } => {
            let document = Document::open(&input)
                .with_context(|| format!("failed to parse {}", input.display()))?;
            let page_count = document.page_count();

            println!("PDF Information for: {}", input.display());
            println!("==========================================");
            println!("PDF Version: {}", document.inner().version);
            println!("Pages: {page_count}");

            for (i, id) in document.page_ids().into_iter().enumerate() {
                let size = match document.media_box_of(id)? {
                    Some(media_box) if media_box.len() == 4 => format!(
                        "{:.0}x{:.0} pts",
                        media_box[2] - media_box[0],
                        media_box[3] - media_box[1]
                    ),
                    _ => "[unknown size]".to_string(),
                };
                println!(
                    "Page {}: {}, rotated {}°",
                    i + 1,
                    size,
                    document.rotation_of(id)?
                );
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "pdftools=debug,pdf_tools=debug"
    } else {
        "pdftools=warn,pdf_tools=warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[cfg(feature = "ocr")]
fn build_recognizer(models: Option<&Path>) -> Result<Box<dyn TextRecognizer>> {
    use pdf_tools::ocr::{OcrConfig, OcrsRecognizer};

    let config = models.map(OcrConfig::from_dir).unwrap_or_default();
    Ok(Box::new(OcrsRecognizer::new(&config)?))
}

#[cfg(not(feature = "ocr"))]
fn build_recognizer(models: Option<&Path>) -> Result<Box<dyn TextRecognizer>> {
    if let Some(dir) = models {
        tracing::warn!(models = %dir.display(), "Ignoring --models: built without OCR");
    }
    Ok(Box::new(pdf_tools::UnavailableRecognizer::new(
        "pdftools was built without the `ocr` feature",
    )))
}
