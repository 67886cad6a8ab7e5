use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use glob::glob;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use vban_core::{AnalysisOptions, Packet, Report, VbanError};

const ANALYSE_EXAMPLES: &str = "Examples:\n  vban capture analyse session.pcapng -o report.json\n  vban capture analyze 'captures/*.pcap' --stdout --port 6980\n  vban capture analyse session.pcap --stdout --stream Stream1 --strict";

#[derive(Parser, Debug)]
#[command(name = "vban")]
#[command(version)]
#[command(
    about = "VBAN packet codec and offline capture analyzer.",
    long_about = None,
    after_help = "Examples:\n  vban decode 5642414e2e0000004d4944493100000000000000000000009b000000b00270\n  vban decode 5642414e... > packet.json && vban encode packet.json\n  vban capture analyse session.pcapng -o report.json"
)]
struct Cli {
    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode one datagram given as hex and print it as JSON.
    Decode {
        /// Datagram bytes in hex; whitespace and multiple arguments are joined
        #[arg(required = true, num_args = 1..)]
        hex: Vec<String>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Encode a packet given as JSON and print the datagram as hex.
    Encode {
        /// JSON file in the layout `vban decode` prints, or `-` for stdin
        input: PathBuf,
    },
    /// Operations on PCAP/PCAPNG captures (offline).
    Capture {
        #[command(subcommand)]
        command: CaptureCommands,
    },
}

#[derive(Subcommand, Debug)]
enum CaptureCommands {
    /// Analyse VBAN traffic in a capture and generate a versioned JSON report.
    #[command(alias = "analyze")]
    #[command(after_help = ANALYSE_EXAMPLES)]
    Analyse {
        /// Path (or glob matching one file) to a .pcap or .pcapng file
        input: PathBuf,

        /// Output report path (JSON)
        #[arg(short = 'o', long, required_unless_present = "stdout")]
        report: Option<PathBuf>,

        /// Write JSON report to stdout
        #[arg(long, conflicts_with = "report")]
        stdout: bool,

        /// Only analyse datagrams to or from this UDP port (VBAN uses 6980)
        #[arg(long, value_name = "PORT")]
        port: Option<u16>,

        /// Only analyse this stream name (repeatable)
        #[arg(long = "stream", value_name = "NAME")]
        streams: Vec<String>,

        /// Pretty-print JSON output
        #[arg(long, conflicts_with = "compact")]
        pretty: bool,

        /// Compact JSON output (default)
        #[arg(long)]
        compact: bool,

        /// Exit with a non-zero code if any VBAN datagram failed to decode
        #[arg(long)]
        strict: bool,
    },
}

struct AnalyseArgs {
    input: PathBuf,
    report: Option<PathBuf>,
    stdout: bool,
    options: AnalysisOptions,
    pretty: bool,
    compact: bool,
    strict: bool,
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Decode { hex, pretty } => cmd_decode(&hex.concat(), pretty),
        Commands::Encode { input } => cmd_encode(&input),
        Commands::Capture { command } => match command {
            CaptureCommands::Analyse {
                input,
                report,
                stdout,
                port,
                streams,
                pretty,
                compact,
                strict,
            } => cmd_capture_analyse(AnalyseArgs {
                input,
                report,
                stdout,
                options: AnalysisOptions { port, streams },
                pretty,
                compact,
                strict,
                quiet: cli.quiet,
            }),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

/// `-v`/`--quiet` win over `RUST_LOG`; without either, `RUST_LOG` or warnings only.
fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Some("error"),
        (false, 0) => None,
        (false, 1) => Some("info"),
        (false, 2) => Some("debug"),
        (false, _) => Some("trace"),
    };
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}

impl From<VbanError> for CliError {
    fn from(err: VbanError) -> Self {
        let hint = match &err {
            VbanError::InvalidHeader(_) => {
                Some("datagrams start with the bytes 56 42 41 4e (\"VBAN\") and a 28-byte header")
            }
            VbanError::PayloadTooLarge { .. } => Some("split the data over several packets"),
            VbanError::Lookup(_) => Some("the field holds a reserved table index or an unsupported value"),
            _ => None,
        };
        CliError::new(err.to_string(), hint.map(str::to_string))
    }
}

fn cmd_decode(hex: &str, pretty: bool) -> Result<(), CliError> {
    let bytes = vban_core::parse_hex(hex).map_err(|err| {
        CliError::new(
            format!("invalid hex input: {err}"),
            Some("pass the datagram as pairs of hex digits, e.g. 5642414e...".to_string()),
        )
    })?;
    debug!(bytes = bytes.len(), dump = %vban_core::hex_dump(&bytes), "decoding datagram");
    let packet = vban_core::decode(&bytes)?;
    let json = to_json(&packet, pretty)?;
    println!("{json}");
    Ok(())
}

fn cmd_encode(input: &Path) -> Result<(), CliError> {
    let text = if input.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read packet JSON from stdin")?;
        text
    } else {
        fs::read_to_string(input)
            .with_context(|| format!("Failed to read packet JSON: {}", input.display()))?
    };
    let packet: Packet = serde_json::from_str(&text).map_err(|err| {
        CliError::new(
            format!("invalid packet JSON: {err}"),
            Some("use the layout printed by `vban decode`".to_string()),
        )
    })?;
    let bytes = vban_core::encode(&packet)?;
    println!("{}", vban_core::to_hex(&bytes));
    Ok(())
}

fn cmd_capture_analyse(args: AnalyseArgs) -> Result<(), CliError> {
    let resolved_input = resolve_input_path(&args.input)?;
    validate_input_file(&resolved_input)?;
    let input_abs = fs::canonicalize(&resolved_input)
        .with_context(|| format!("Failed to resolve input path: {}", resolved_input.display()))?;
    let report_path = if args.stdout {
        None
    } else {
        Some(args.report.ok_or_else(|| {
            CliError::new(
                "missing output path",
                Some("use -o/--report or --stdout".to_string()),
            )
        })?)
    };

    if let Some(report_path) = report_path.as_ref() {
        ensure_distinct_output(report_path, &input_abs)?;
    }

    let report = vban_core::analyze_pcap_file(&resolved_input, &args.options)
        .context("PCAP/PCAPNG analysis failed")?;
    let json = serialize_report(&report, args.pretty, args.compact)?;

    match report_path {
        None => print!("{}", json),
        Some(report_path) => {
            if let Some(parent) = report_path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create output directory: {}", parent.display())
                    })?;
                }
            }
            fs::write(&report_path, json)
                .with_context(|| format!("Failed to write report: {}", report_path.display()))?;
            if !args.quiet {
                eprintln!("OK: report written -> {}", report_path.display());
            }
        }
    }

    if args.strict {
        let failures = decode_failures(&report);
        if failures > 0 {
            return Err(CliError::new(
                format!("{failures} VBAN datagram(s) failed to decode"),
                Some("see decode_errors in the report".to_string()),
            ));
        }
    }
    Ok(())
}

fn ensure_distinct_output(report_path: &Path, input_abs: &Path) -> Result<(), CliError> {
    let parent = match report_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    // A directory that does not exist yet cannot hold the input.
    if !parent.exists() {
        return Ok(());
    }
    let report_dir = fs::canonicalize(parent)
        .with_context(|| format!("Failed to resolve output path: {}", report_path.display()))?;
    let file_name = report_path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid report path"))?;
    if report_dir.join(file_name) == input_abs {
        return Err(CliError::new(
            format!(
                "report path must differ from input: {}",
                report_path.display()
            ),
            Some("choose a different output path".to_string()),
        ));
    }
    Ok(())
}

fn decode_failures(report: &Report) -> u64 {
    report.decode_errors.iter().map(|entry| entry.count).sum()
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String, CliError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.context("JSON serialization failed").map_err(Into::into)
}

fn serialize_report(report: &Report, pretty: bool, compact: bool) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    to_json(report, pretty)
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("use a .pcap or .pcapng file".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("use a .pcap or .pcapng file".to_string()),
        ));
    }
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext != "pcap" && ext != "pcapng" {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some("expected a .pcap or .pcapng file".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    match matches.len() {
        0 => Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern; expected .pcap or .pcapng".to_string()),
        )),
        1 => Ok(matches.remove(0)),
        count => {
            let mut listed = matches
                .iter()
                .take(3)
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            if count > 3 {
                listed.push_str(", ...");
            }
            Err(CliError::new(
                format!("multiple files match pattern '{pattern}' ({count} matches); matches: {listed}"),
                Some("pass a single capture file, or run once per file".to_string()),
            ))
        }
    }
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
