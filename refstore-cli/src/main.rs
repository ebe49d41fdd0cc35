use clap::{Parser, Subcommand, ValueEnum};
use refstore::{Library, LibraryConfig, Record};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

/// refstore CLI — browse and export a Zotero library from the command line
#[derive(Parser)]
#[command(name = "refstore", version, about)]
struct Cli {
    /// Path to the Zotero SQLite database
    #[arg(long, default_value = "~/Zotero/zotero.sqlite")]
    database: String,

    /// Path to the attachment storage root
    #[arg(long, default_value = "~/Zotero/storage")]
    storage: String,

    /// Output format
    #[arg(long, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// List records, optionally filtered and sorted
    List {
        /// Case-insensitive substring matched against titles and authors
        #[arg(long, default_value = "")]
        query: String,

        /// Advance the sort cycle this many times
        /// (1 = id desc, 2 = id asc, 3 = year desc, ...)
        #[arg(long, default_value_t = 0)]
        sort: usize,
    },

    /// Export records as BibTeX
    Export {
        /// Record keys to export (default: the whole library)
        keys: Vec<String>,
    },

    /// Resolve a record's attachments to absolute paths
    Attachments {
        /// Record key
        key: String,
    },

    /// Poll for external changes and reload when they happen
    Watch {
        /// Poll interval in seconds
        #[arg(long, default_value_t = 5)]
        interval: u64,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("ERROR: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = LibraryConfig {
        database: expand_tilde(&cli.database),
        storage_root: expand_tilde(&cli.storage),
    };
    let mut library = Library::open(config)?;

    match cli.command {
        Command::List { query, sort } => {
            library.load()?;
            for _ in 0..sort {
                library.advance_sort();
            }
            let records = library.filter(&query);
            print_records(&records, &cli.format)?;
        }

        Command::Export { keys } => {
            let records = library.load()?;
            let selected: Vec<&Record> = if keys.is_empty() {
                records.iter().collect()
            } else {
                records.iter().filter(|r| keys.contains(&r.key)).collect()
            };

            // One bad record must not sink the rest of the batch
            let mut failed = 0usize;
            for record in selected {
                match library.export(record) {
                    Ok(entry) => println!("{}\n", entry.to_bibtex()),
                    Err(e) => {
                        eprintln!("skipping {}: {e}", record.key);
                        failed += 1;
                    }
                }
            }
            if failed > 0 {
                log::warn!("{failed} record(s) could not be exported");
            }
        }

        Command::Attachments { key } => {
            let records = library.load()?;
            let record = records
                .iter()
                .find(|r| r.key == key)
                .ok_or_else(|| format!("no record with key '{key}'"))?;

            if record.attachments.is_empty() {
                println!("no attachments");
            }
            for attachment in &record.attachments {
                match library.resolve_attachment(attachment) {
                    Ok(path) => println!("{}", path.display()),
                    Err(e) => eprintln!("{e}"),
                }
            }
        }

        Command::Watch { interval } => {
            let records = library.load()?;
            println!("loaded {} records", records.len());
            log::info!("polling every {interval}s");

            loop {
                std::thread::sleep(Duration::from_secs(interval));
                if library.poll()? {
                    let records = library.load()?;
                    println!("library changed, reloaded {} records", records.len());
                }
            }
        }
    }

    Ok(())
}

fn print_records(
    records: &[Record],
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(records)?);
        }
        OutputFormat::Text => {
            for record in records {
                let year = if record.year > 0 {
                    record.year.to_string()
                } else {
                    "----".to_string()
                };
                println!("{year}  {:24}  {}", record.author_summary(), record.title);
            }
            eprintln!("{} record(s)", records.len());
        }
    }
    Ok(())
}

/// Expand a leading `~/` against $HOME, the way the defaults above expect.
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}
