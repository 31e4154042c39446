mod logging;
mod output;

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use fixtura_core::{Error as CoreError, SchemaCatalog, validate_catalog};
use fixtura_generate::{
    FixtureRequest, GenerationError, GeneratorRegistry, check_instance_on,
};
use thiserror::Error;
use tracing::{info, warn};

use logging::init_logging;
use output::emit_json;

#[derive(Debug, Error)]
enum CliError {
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("schema error: {0}")]
    Schema(#[from] CoreError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("logging error: {0}")]
    Logging(String),
    #[error("{0} conformance violation(s) found")]
    Conformance(usize),
}

#[derive(Parser, Debug)]
#[command(name = "fixtura", version, about = "Schema-driven test fixture generator")]
struct Cli {
    /// Log filter (overrides RUST_LOG), e.g. `debug` or `fixtura_generate=trace`.
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Emit logs as JSON lines.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate fixture instances as JSON.
    Generate(GenerateArgs),
    /// Parse and validate a schema catalog.
    ValidateSchema(ValidateArgs),
    /// List the built-in generators in dispatch order.
    Generators,
    /// Print the JSON Schema of the catalog format.
    CatalogSchema,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Schema catalog (JSON).
    #[arg(long)]
    schema: PathBuf,
    /// Fixture request (TOML, or JSON with a `.json` extension).
    #[arg(long)]
    request: Option<PathBuf>,
    /// Type to generate; overrides the request.
    #[arg(long = "type", value_name = "TYPE")]
    type_name: Option<String>,
    #[arg(long)]
    count: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
    /// Root locale, e.g. `fr-FR`.
    #[arg(long)]
    locale: Option<String>,
    #[arg(long, default_value_t = false)]
    strict: bool,
    /// Date year-offset bounds are computed from (YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    reference_date: Option<NaiveDate>,
    /// Output file; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Write the generation report to this file.
    #[arg(long)]
    report: Option<PathBuf>,
    /// Re-check generated instances against declared bounds and fail on
    /// violations.
    #[arg(long, default_value_t = false)]
    check: bool,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Schema catalog (JSON).
    schema: PathBuf,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref(), cli.json_logs)?;

    match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::ValidateSchema(args) => run_validate(&args.schema),
        Command::Generators => {
            for id in GeneratorRegistry::new().generator_ids() {
                println!("{id}");
            }
            Ok(())
        }
        Command::CatalogSchema => {
            let schema = schemars::schema_for!(SchemaCatalog);
            emit_json(None, &schema)
        }
    }
}

fn load_catalog(path: &Path) -> Result<SchemaCatalog, CliError> {
    let raw = std::fs::read_to_string(path)?;
    let catalog: SchemaCatalog = serde_json::from_str(&raw)?;
    validate_catalog(&catalog)?;
    Ok(catalog)
}

fn load_request(path: &Path) -> Result<FixtureRequest, CliError> {
    let raw = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let request = if is_json {
        FixtureRequest::from_json_str(&raw)?
    } else {
        FixtureRequest::from_toml_str(&raw)?
    };
    Ok(request)
}

fn run_validate(path: &Path) -> Result<(), CliError> {
    let catalog = load_catalog(path)?;
    let types = catalog.type_names().count();
    info!(path = %path.display(), types, "schema catalog valid");
    println!("ok: {types} type(s)");
    Ok(())
}

fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    let timer = Instant::now();
    let catalog = load_catalog(&args.schema)?;

    let mut request = match (&args.request, &args.type_name) {
        (Some(path), _) => load_request(path)?,
        (None, Some(type_name)) => FixtureRequest::new(type_name),
        (None, None) => {
            return Err(CliError::InvalidConfig(
                "either --request or --type is required".to_string(),
            ));
        }
    };
    if let Some(type_name) = args.type_name {
        request.type_name = type_name;
    }
    if let Some(count) = args.count {
        request.count = count;
    }
    if args.seed.is_some() {
        request.seed = args.seed;
    }
    if args.locale.is_some() {
        request.locale = args.locale;
    }
    request.strict |= args.strict;

    let today = args
        .reference_date
        .unwrap_or_else(|| Local::now().date_naive());
    let (instances, report) = request
        .apply(&catalog)
        .with_reference_date(today)
        .build_list_with_report(request.count)?;

    if args.check {
        let mut total = 0;
        for (index, instance) in instances.iter().enumerate() {
            for violation in check_instance_on(&catalog, instance, today) {
                warn!(
                    index,
                    path = %violation.path,
                    rule = ?violation.rule,
                    detail = %violation.detail,
                    "conformance violation"
                );
                total += 1;
            }
        }
        if total > 0 {
            return Err(CliError::Conformance(total));
        }
    }

    let json: Vec<serde_json::Value> = instances.iter().map(|instance| instance.to_json()).collect();
    emit_json(args.out.as_deref(), &json)?;
    if let Some(path) = args.report.as_deref() {
        emit_json(Some(path), &report)?;
    }

    info!(
        run_id = %report.run_id,
        type_name = %report.type_name,
        instances = report.instances,
        seed = report.seed,
        duration_ms = timer.elapsed().as_millis() as u64,
        "run finished"
    );
    Ok(())
}
