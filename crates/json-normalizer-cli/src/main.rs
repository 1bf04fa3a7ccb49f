use std::{
    fs,
    io::{self, Read, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{anyhow, Context};
use clap::Parser;
use json_normalizer::{
    vendor::composer::{self, ComposerJsonNormalizer},
    Indent, Json, Normalizer, SchemaNormalizer, SchemaStorage,
};
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Parser)]
#[command(
    name = "json-normalizer",
    version,
    about = "Normalize JSON documents according to a JSON Schema"
)]
struct Cli {
    /// URI or path of the schema describing the documents.
    #[arg(short, long, value_name = "SCHEMA", required_unless_present = "composer")]
    schema: Option<String>,

    /// Also sort package links and version constraints of composer.json files.
    ///
    /// Uses the official composer.json schema unless `--schema` is given.
    #[arg(long)]
    composer: bool,

    /// Report documents that are not normalized instead of printing them.
    #[arg(long, conflicts_with = "write")]
    check: bool,

    /// Write normalized documents back to their files.
    #[arg(short, long)]
    write: bool,

    /// Number of spaces per indentation level.
    ///
    /// Defaults to the indentation detected in each document, or 4 if it has none.
    #[arg(long, value_name = "N")]
    indent: Option<usize>,

    /// Documents to normalize. `-` reads from standard input.
    #[arg(value_name = "FILES", default_value = "-")]
    files: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();
    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            let _ = writeln!(io::stderr(), "Error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<bool> {
    let normalizer = build_normalizer(cli)?;
    let mut success = true;
    for path in &cli.files {
        match process(cli, normalizer.as_ref(), path) {
            Ok(normalized) => success &= normalized,
            Err(error) => {
                writeln!(io::stderr(), "Error: {}: {error:#}", path.display())?;
                success = false;
            }
        }
    }
    Ok(success)
}

fn build_normalizer(cli: &Cli) -> anyhow::Result<Box<dyn Normalizer>> {
    let schema_uri = match &cli.schema {
        Some(schema) => schema_uri(schema)?,
        None => composer::SCHEMA_URI.to_string(),
    };
    tracing::debug!(schema_uri, composer = cli.composer, "Using schema");
    let storage = SchemaStorage::new();
    Ok(if cli.composer {
        Box::new(ComposerJsonNormalizer::new(schema_uri, storage))
    } else {
        Box::new(SchemaNormalizer::new(schema_uri, storage))
    })
}

/// Absolute URIs are used as is, anything else is a path to a local file.
fn schema_uri(schema: &str) -> anyhow::Result<String> {
    // Single-letter schemes are drive letters of Windows paths
    if let Ok(uri) = Url::parse(schema) {
        if uri.scheme().len() > 1 {
            return Ok(uri.into());
        }
    }
    let path = fs::canonicalize(schema)
        .with_context(|| format!("Schema file {schema} could not be opened"))?;
    Url::from_file_path(&path)
        .map(String::from)
        .map_err(|()| anyhow!("Schema path {} can not be used as URI", path.display()))
}

/// Normalize a single document. Returns `false` if `--check` found it not normalized.
fn process(cli: &Cli, normalizer: &dyn Normalizer, path: &Path) -> anyhow::Result<bool> {
    let stdin = path == Path::new("-");
    let original = if stdin {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read standard input")?;
        buffer
    } else {
        fs::read_to_string(path).context("Failed to read file")?
    };
    let json = Json::from_encoded(&original)?;
    let normalized = normalizer.normalize(&json)?;
    let mut format = json.format();
    if let Some(size) = cli.indent {
        format = format.with_indent(Indent::spaces(size));
    }
    let formatted = format.print(normalized.decoded()).to_string();

    if cli.check {
        if formatted == original {
            tracing::debug!(path = %path.display(), "Already normalized");
            return Ok(true);
        }
        writeln!(io::stderr(), "{} is not normalized", path.display())?;
        return Ok(false);
    }
    if cli.write && !stdin {
        if formatted != original {
            fs::write(path, &formatted).context("Failed to write file")?;
            tracing::info!(path = %path.display(), "Normalized");
        }
        return Ok(true);
    }
    io::stdout().lock().write_all(formatted.as_bytes())?;
    Ok(true)
}
