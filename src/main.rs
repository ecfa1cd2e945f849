//! stackbook - STACK question bank to PreTeXt book

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stackbook::{BuildConfig, DiskSource, EntryOrder, TreeBuilder, plan_outputs, write_tree};

#[derive(Parser)]
#[command(name = "stackbook")]
#[command(version, about = "Assemble a STACK question bank into a PreTeXt book", long_about = None)]
#[command(after_help = "EXAMPLES:
    stackbook source/stack source                       Write main.ptx and chapters into source/
    stackbook source/stack source -t \"Stats Gold\"      Set the book title
    stackbook source/stack source --tree                Print the book structure as JSON")]
struct Cli {
    /// Root folder of the question bank
    #[arg(value_name = "SOURCE")]
    source: PathBuf,

    /// Folder to write main.ptx and the chapter folders into
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Book title, unless the bank root has a category descriptor
    #[arg(short, long, default_value = "Question Bank")]
    title: String,

    /// Visit folder entries in name order instead of filesystem order
    #[arg(long)]
    sorted: bool,

    /// List the files that would be written without writing them
    #[arg(long, conflicts_with = "tree")]
    dry_run: bool,

    /// Print the book structure as JSON without writing anything
    #[arg(long)]
    tree: bool,

    /// Log every node built and file written
    #[arg(short, long)]
    verbose: bool,

    /// Suppress output messages
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: &Cli) -> Result<(), String> {
    let order = if cli.sorted {
        EntryOrder::Sorted
    } else {
        EntryOrder::Listing
    };
    let config = BuildConfig::default().with_entry_order(order);

    let book = TreeBuilder::with_config(DiskSource, config)
        .build(&cli.source, &cli.title)
        .map_err(|e| e.to_string())?;

    info!(
        title = %book.title,
        nodes = book.node_count(),
        questions = book.question_count(),
        "built book from {}",
        cli.source.display()
    );

    if cli.tree {
        let json = serde_json::to_string_pretty(&book).map_err(|e| e.to_string())?;
        println!("{json}");
        return Ok(());
    }

    if cli.dry_run {
        for path in plan_outputs(&book, &cli.output) {
            println!("{}", path.display());
        }
        return Ok(());
    }

    std::fs::create_dir_all(&cli.output)
        .map_err(|e| format!("cannot create {}: {e}", cli.output.display()))?;
    let summary = write_tree(&book, &cli.output).map_err(|e| e.to_string())?;
    info!(
        files = summary.len(),
        "wrote book into {}",
        cli.output.display()
    );
    Ok(())
}
