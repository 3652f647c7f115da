use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use optcat_core::OptionCatalog;
use optcat_loader::CatalogDocument;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

/// Output format for parse results.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "optcat")]
#[command(version, about = "Parse argument vectors against option catalogs")]
struct Cli {
    /// Log catalog and parser decisions at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse an argument vector against a catalog and print the result.
    Parse(ParseArgs),
    /// Validate one or more catalog documents.
    Check(CheckArgs),
    /// List the options and groups of a catalog.
    Describe(DescribeArgs),
    /// Merge catalog documents into one; any shared key is an error.
    Merge(MergeArgs),
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Catalog document (.yaml, .yml or .json).
    #[arg(long)]
    catalog: PathBuf,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    /// Default for an option not given on the command line (KEY=VALUE).
    #[arg(long = "define", short = 'D', value_name = "KEY=VALUE")]
    defines: Vec<String>,
    /// Arguments to parse, after `--`.
    #[arg(last = true)]
    args: Vec<String>,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Catalog documents to validate.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct DescribeArgs {
    /// Catalog document to describe.
    #[arg(long)]
    catalog: PathBuf,
}

#[derive(Debug, Args)]
struct MergeArgs {
    /// Catalog documents, merged in order. Parser settings come from the first.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Output document path; the extension picks the format.
    #[arg(long)]
    output: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Parse(args) => run_parse(args),
        Command::Check(args) => run_check(args),
        Command::Describe(args) => run_describe(args),
        Command::Merge(args) => run_merge(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn load_catalog(path: &Path) -> Result<(CatalogDocument, OptionCatalog), String> {
    let doc = CatalogDocument::load(path)
        .map_err(|err| format!("Failed to load '{}': {err}", path.display()))?;
    let catalog = doc
        .to_catalog()
        .map_err(|err| format!("Invalid catalog '{}': {err}", path.display()))?;
    Ok((doc, catalog))
}

fn parse_define(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("Invalid define '{raw}': expected KEY=VALUE"))
}

fn run_parse(args: ParseArgs) -> Result<(), String> {
    let (doc, catalog) = load_catalog(&args.catalog)?;
    let defines = args
        .defines
        .iter()
        .map(|raw| parse_define(raw))
        .collect::<Result<Vec<_>, _>>()?;

    let result = doc
        .parser()
        .parse_with_properties(&catalog, &args.args, &defines)
        .map_err(|err| err.to_string())?;

    let raw = match args.format {
        CliOutputFormat::Json => serde_json::to_string_pretty(&result)
            .map_err(|err| format!("Failed to serialize parse result: {err}"))?,
        CliOutputFormat::Yaml => serde_yaml::to_string(&result)
            .map_err(|err| format!("Failed to serialize parse result: {err}"))?,
    };
    println!("{}", raw.trim_end());
    Ok(())
}

fn run_check(args: CheckArgs) -> Result<(), String> {
    let mut options = 0;
    for input in &args.inputs {
        let (_, catalog) = load_catalog(input)?;
        debug!(path = %input.display(), options = catalog.len(), "Checked catalog");
        options += catalog.len();
    }
    println!(
        "Validated {} catalog file(s) with {} option(s).",
        args.inputs.len(),
        options
    );
    Ok(())
}

fn run_describe(args: DescribeArgs) -> Result<(), String> {
    let (doc, catalog) = load_catalog(&args.catalog)?;

    println!("Parser: unknown options {:?}", doc.parser.unknown);
    println!("Options:");
    for option in catalog.help_options() {
        println!("  {option}");
        if option.is_deprecated() {
            println!("    {}", option.to_deprecated_string());
        }
    }

    let groups: Vec<_> = catalog.option_groups().collect();
    if !groups.is_empty() {
        println!("Groups:");
        for group in groups {
            let marker = if group.is_required() { " (required)" } else { "" };
            println!("  {group}{marker}");
        }
    }

    let required = catalog.required_options();
    if !required.is_empty() {
        println!("Required: {}", required.join(", "));
    }
    Ok(())
}

fn run_merge(args: MergeArgs) -> Result<(), String> {
    let mut inputs = args.inputs.iter();
    let first = inputs
        .next()
        .ok_or_else(|| "No catalog documents to merge".to_string())?;
    let (doc, mut catalog) = load_catalog(first)?;

    for input in inputs {
        let (_, other) = load_catalog(input)?;
        catalog
            .add_options(&other)
            .map_err(|err| format!("Cannot merge '{}': {err}", input.display()))?;
        debug!(path = %input.display(), options = other.len(), "Merged catalog");
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                format!(
                    "Failed to create output directory '{}': {err}",
                    parent.display()
                )
            })?;
        }
    }

    CatalogDocument::from_catalog(&catalog, doc.parser)
        .save(&args.output)
        .map_err(|err| format!("Failed to write '{}': {err}", args.output.display()))?;

    println!(
        "Merged {} catalog(s) with {} option(s) into '{}'.",
        args.inputs.len(),
        catalog.len(),
        args.output.display()
    );
    Ok(())
}
