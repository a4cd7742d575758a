//! `schemaui-drafts` replays a scripted add/edit session against one array
//! field of a JSON Schema and prints the resulting array.

use std::fmt::Write as FmtWrite;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use clap::{ArgAction, Parser};
use color_eyre::eyre::{Report, Result, WrapErr, eyre};
use serde_json::Value;
use tracing::debug;

use schemaui_drafts::{
    ActiveItemManager, ArrayField, CreationMethod, CreationMode, DocumentFormat,
    EditSessionController, FormatProbe, ItemSchema, OutputDestination, OutputOptions,
    SchemaValidator, SessionOptions, emit, parse_document_str,
    script::{parse_script, run_script},
};

const LOG_ENV: &str = "SCHEMAUI_DRAFTS_LOG";

#[derive(Debug, Parser)]
#[command(
    name = "schemaui-drafts",
    version,
    about = "Replay add/edit sessions against a JSON Schema array field"
)]
struct Cli {
    /// Array schema spec: file path, inline payload, or "-" for stdin
    #[arg(short = 's', long = "schema", value_name = "SPEC")]
    schema: String,

    /// JSON pointer to the array schema inside the schema document
    #[arg(long = "items-at", value_name = "POINTER", default_value = "")]
    items_at: String,

    /// Current data spec; the field starts empty when omitted
    #[arg(short = 'd', long = "data", value_name = "SPEC")]
    data: Option<String>,

    /// JSON pointer to the array inside the data document
    #[arg(long = "data-at", value_name = "POINTER", default_value = "")]
    data_at: String,

    /// Session script: a list of `{"kind": ...}` steps
    #[arg(long = "script", value_name = "SPEC")]
    script: String,

    /// Output destinations ("-" writes to stdout). Accepts multiple values per flag use.
    #[arg(short = 'o', long = "output", value_name = "DEST", num_args = 1.., action = ArgAction::Append)]
    outputs: Vec<String>,

    /// Write edits through to the array as they happen
    #[arg(long = "auto-save")]
    auto_save: bool,

    /// Keep new items out of the array until they are saved
    #[arg(long = "draft-only")]
    draft_only: bool,

    /// Insert new items at the front of the array
    #[arg(long = "prepend")]
    prepend: bool,

    /// Emit compact JSON/TOML rather than pretty formatting
    #[arg(long = "no-pretty")]
    no_pretty: bool,

    /// Overwrite output files even if they already exist
    #[arg(short = 'f', long = "force", short_alias = 'y', alias = "yes")]
    force: bool,

    /// Raise log verbosity (-v info, -vv debug); SCHEMAUI_DRAFTS_LOG takes precedence
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let mut diagnostics = DiagnosticCollector::default();
    let stdin_specs = [Some(cli.schema.as_str()), cli.data.as_deref(), Some(cli.script.as_str())]
        .into_iter()
        .filter(|spec| *spec == Some("-"))
        .count();
    if stdin_specs > 1 {
        diagnostics.push_input(
            "schema/data/script",
            "only one input can be read from stdin; provide inline content or files",
        );
    }

    let schema_doc = load_required(&cli.schema, "schema", &mut diagnostics);
    let data_doc = cli
        .data
        .as_deref()
        .and_then(|spec| load_required(spec, "data", &mut diagnostics));
    let script_doc = load_required(&cli.script, "script", &mut diagnostics);
    let output = build_output_options(&cli, &mut diagnostics);
    diagnostics.into_result()?;

    let (Some(schema_doc), Some(script_doc)) = (schema_doc, script_doc) else {
        return Err(eyre!("schema and script are required"));
    };

    let schema = ItemSchema::at_pointer(&schema_doc, &cli.items_at)
        .wrap_err_with(|| format!("no array schema at '{}'", cli.items_at))?;
    let options = session_options(&cli, &schema)?;
    let validator = SchemaValidator::new(&schema).wrap_err("failed to compile item schema")?;
    let steps = parse_script(&script_doc).wrap_err("failed to parse script")?;

    let mut data_doc = data_doc.unwrap_or(Value::Null);
    let entries = array_at(&data_doc, &cli.data_at)?;
    let collection = ArrayField::from_value(entries).wrap_err("data is not an array")?;

    debug!(steps = steps.len(), host = ?options.host, "replaying session script");
    let controller =
        EditSessionController::new(collection, validator, Rc::new(ActiveItemManager::new()))
            .with_options(options)
            .with_schema(schema);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .wrap_err("failed to start runtime")?;
    let results = runtime.block_on(run_script(&controller, &steps));
    for (position, result) in results.iter().enumerate() {
        eprintln!("[{}] {result}", position + 1);
    }
    if controller.is_open() {
        eprintln!("session left open; unsaved draft discarded");
    }

    let edited = controller.collection().to_value();
    let document = if cli.data_at.is_empty() {
        edited
    } else {
        replace_at(&mut data_doc, &cli.data_at, edited)?;
        data_doc
    };
    emit(&document, &output).map_err(|err| eyre!("{err:#}"))?;
    Ok(())
}

fn init_tracing(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|error| eyre!("failed to initialize tracing subscriber: {error}"))
}

/// Editor metadata from the schema first, then command-line overrides.
fn session_options(cli: &Cli, schema: &ItemSchema) -> Result<SessionOptions> {
    let mut options =
        SessionOptions::from_schema(schema).wrap_err("invalid x-item-editor metadata")?;
    if cli.auto_save {
        options = options.with_auto_save(true);
    }
    if cli.draft_only {
        options = options.with_creation_mode(CreationMode::DraftOnly);
    }
    if cli.prepend {
        options = options.with_creation_method(CreationMethod::Prepend);
    }
    Ok(options)
}

fn array_at(document: &Value, pointer: &str) -> Result<Value> {
    document
        .pointer(pointer)
        .cloned()
        .ok_or_else(|| eyre!("'{pointer}' not found in data"))
}

fn replace_at(document: &mut Value, pointer: &str, value: Value) -> Result<()> {
    let slot = document
        .pointer_mut(pointer)
        .ok_or_else(|| eyre!("cannot write results: '{pointer}' not found in data"))?;
    *slot = value;
    Ok(())
}

fn load_required(
    spec: &str,
    label: &str,
    diagnostics: &mut DiagnosticCollector,
) -> Option<Value> {
    let format = match spec {
        "-" => DocumentFormat::default(),
        path => match DocumentFormat::probe(Path::new(path)) {
            FormatProbe::Known(format) => format,
            FormatProbe::Unknown => DocumentFormat::default(),
            FormatProbe::Disabled(feature) => {
                diagnostics.push_input(
                    label,
                    format!("{label} '{path}' needs this build to enable the '{feature}' feature"),
                );
                return None;
            }
        },
    };
    match load_value(spec, format, label) {
        Ok(value) => Some(value),
        Err(err) => {
            diagnostics.push_input(label, format!("{err:#}"));
            None
        }
    }
}

fn load_value(spec: &str, format: DocumentFormat, label: &str) -> Result<Value> {
    if spec == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .wrap_err("failed to read from stdin")?;
        return parse_contents(&buffer, format, label);
    }

    let path = PathBuf::from(spec);
    match fs::read_to_string(&path) {
        Ok(contents) => parse_contents(&contents, format, label),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            parse_contents(spec, format, &format!("inline {label}"))
                .wrap_err_with(|| format!("{} does not exist", path.display()))
        }
        Err(err) => {
            Err(Report::new(err).wrap_err(format!("failed to read {label} from {}", path.display())))
        }
    }
}

fn parse_contents(contents: &str, format: DocumentFormat, label: &str) -> Result<Value> {
    parse_document_str(contents, format).map_err(|err| eyre!("failed to parse {label}: {err:#}"))
}

#[derive(Default)]
struct DiagnosticCollector {
    messages: Vec<String>,
}

impl DiagnosticCollector {
    fn push_input(&mut self, label: &str, message: impl Into<String>) {
        self.messages
            .push(format!("input ({label}): {}", message.into()));
    }

    fn push_output(&mut self, message: impl Into<String>) {
        self.messages.push(format!("output: {}", message.into()));
    }

    fn into_result(self) -> Result<()> {
        if self.messages.is_empty() {
            return Ok(());
        }
        let mut body = String::from("encountered input/output issues:\n");
        for (idx, msg) in self.messages.iter().enumerate() {
            let _ = writeln!(body, "  {}. {}", idx + 1, msg);
        }
        Err(eyre!(body))
    }
}

fn build_output_options(cli: &Cli, diagnostics: &mut DiagnosticCollector) -> OutputOptions {
    let mut destinations = Vec::new();
    for raw in &cli.outputs {
        if raw.trim().is_empty() {
            diagnostics.push_output("output destination cannot be empty");
            continue;
        }
        destinations.push(OutputDestination::parse(raw));
    }
    if destinations.is_empty() {
        destinations.push(OutputDestination::Stdout);
    }

    let mut format = None;
    for destination in &destinations {
        let OutputDestination::File(path) = destination else {
            continue;
        };
        if !cli.force && path.exists() {
            diagnostics.push_output(format!(
                "file {} already exists (pass --force to overwrite)",
                path.display()
            ));
        }
        match DocumentFormat::probe(path) {
            FormatProbe::Known(found) => match format {
                Some(existing) if existing != found => diagnostics.push_output(format!(
                    "output file {} uses {found} but other destinations use {existing}; align extensions",
                    path.display()
                )),
                Some(_) => {}
                None => format = Some(found),
            },
            FormatProbe::Disabled(feature) => diagnostics.push_output(format!(
                "output file {} needs this build to enable the '{feature}' feature",
                path.display()
            )),
            FormatProbe::Unknown => diagnostics.push_output(format!(
                "cannot infer format from output file {}; use .json/.yaml/.toml",
                path.display()
            )),
        }
    }

    OutputOptions::default()
        .with_format(format.unwrap_or_default())
        .with_pretty(!cli.no_pretty)
        .with_destinations(destinations)
}
