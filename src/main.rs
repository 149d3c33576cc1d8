use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use shelf_labels::{
    Code128Rasterizer, ConfigStore, DEFAULT_DPI, Error, LabelJob, MockCatalog, OutputFormat,
    RenderConfig, build_preview, export_job_file, export_labels, fetch_products, parse_csv_barcodes, templates,
};

#[derive(Parser)]
#[command(name = "shelf-labels", version, about = "Lay out shelf labels and export them as PDF, ZPL or TSPL")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the page layout and resolved field boxes for a job as JSON
    Layout { job: PathBuf },
    /// Export a job in one output format
    Export {
        job: PathBuf,
        #[arg(short, long, default_value = "pdf")]
        format: OutputFormat,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Printer resolution for ZPL/TSPL
        #[arg(long, default_value_t = DEFAULT_DPI)]
        dpi: u32,
        #[arg(long, env = "SHELF_LABELS_PDF_AUTHOR")]
        pdf_author: Option<String>,
    },
    /// List the built-in field templates
    Templates,
    /// Resolve a CSV list of barcodes against the mock catalog
    Lookup { csv: PathBuf },
    /// Manage saved configurations
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    List {
        #[arg(long)]
        store: PathBuf,
    },
    /// Save the layout and fields of a job file under a name
    Save {
        #[arg(long)]
        store: PathBuf,
        #[arg(long)]
        name: String,
        #[arg(long)]
        template: Option<String>,
        job: PathBuf,
    },
}

fn read_file(path: &Path) -> Result<Vec<u8>, Error> {
    std::fs::read(path).map_err(|e| {
        Error::Io(std::io::Error::new(e.kind(), format!("{}: {}", e, path.display())))
    })
}

fn print_json(value: &impl serde::Serialize) -> Result<(), Error> {
    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

fn run(cli: Cli) -> Result<(), Error> {
    match cli.command {
        Command::Layout { job } => {
            let job = LabelJob::from_json(&read_file(&job)?)?;
            let config = RenderConfig::default();
            let preview = build_preview(&job.layout, &job.fields, &config.field_layout, &job.products)?;
            print_json(&preview)
        }
        Command::Export {
            job,
            format,
            output,
            dpi,
            pdf_author,
        } => {
            let mut config = RenderConfig {
                dpi,
                ..RenderConfig::default()
            };
            if let Some(author) = pdf_author {
                config.pdf.author = author;
            }
            if let Some(path) = output {
                return export_job_file(&job, &path, format, &config);
            }
            let job = LabelJob::from_json(&read_file(&job)?)?;
            let export = export_labels(&job, format, &config, &Code128Rasterizer::default())?;
            std::io::stdout().lock().write_all(&export.bytes)?;
            Ok(())
        }
        Command::Templates => print_json(&templates()),
        Command::Lookup { csv } => {
            let content = String::from_utf8_lossy(&read_file(&csv)?).into_owned();
            let barcodes = parse_csv_barcodes(&content);
            if barcodes.is_empty() {
                return Err(Error::InvalidConfig(format!("no barcodes found in {}", csv.display())));
            }
            print_json(&fetch_products(&MockCatalog::default(), &barcodes))
        }
        Command::Config { action } => match action {
            ConfigAction::List { store } => print_json(&ConfigStore::open(store).list()?),
            ConfigAction::Save {
                store,
                name,
                template,
                job,
            } => {
                let mut job: serde_json::Value = serde_json::from_slice(&read_file(&job)?)?;
                let layout = job.get_mut("layout").map(serde_json::Value::take).unwrap_or_default();
                let fields = job.get_mut("fields").map(serde_json::Value::take).unwrap_or_default();
                let saved = ConfigStore::open(store).save(&name, layout, fields, template.as_deref())?;
                print_json(&saved)
            }
        },
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
