mod debug_report;

use decklens::{AliasConfig, DeckCardRecord, RecordBin, estimate_event, parse_query_verbose, run_query};
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const LOG_ENV: &str = "DECKLENS_LOG";

fn main() {
    init_tracing();

    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    if let Err(err) = run(config) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .with_env_var(LOG_ENV)
        .from_env_lossy();

    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr).with_filter(filter))
        .try_init();
}

enum Command {
    Query { input: String, aliases: Option<PathBuf>, records: Option<PathBuf> },
    Swiss { bins: Vec<RecordBin> },
}

struct CliConfig {
    command: Command,
    json: bool,
    color: bool,
}

fn run(config: CliConfig) -> Result<(), String> {
    match config.command {
        Command::Query { input, aliases, records } => {
            let aliases = match aliases {
                Some(path) => AliasConfig::load(&path).map_err(|err| format!("error: {}: {err}", path.display()))?,
                None => AliasConfig::cards(),
            };

            match records {
                Some(path) => {
                    let records = load_records(&path)?;
                    let outcome = run_query(&input, &aliases, &records, None);
                    if config.json {
                        print_json(&outcome)?;
                    } else {
                        debug_report::print_outcome(&input, &outcome, config.color);
                    }
                }
                None => {
                    let details = parse_query_verbose(&input, &aliases);
                    if config.json {
                        print_json(&details.conditions)?;
                    } else {
                        debug_report::print_query(&details, config.color);
                    }
                }
            }
        }
        Command::Swiss { bins } => {
            let estimate = estimate_event(&bins).map_err(|err| format!("error: {err}"))?;
            if config.json {
                print_json(&estimate)?;
            } else {
                debug_report::print_estimate(&estimate, config.color);
            }
        }
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value).map_err(|err| format!("error: failed to encode output: {err}"))?;
    println!("{text}");
    Ok(())
}

fn load_records(path: &Path) -> Result<Vec<DeckCardRecord>, String> {
    let contents =
        std::fs::read_to_string(path).map_err(|err| format!("error: failed to read {}: {err}", path.display()))?;
    serde_json::from_str(&contents).map_err(|err| format!("error: invalid records in {}: {err}", path.display()))
}

fn parse_args() -> Result<CliConfig, String> {
    let mut args = std::env::args().skip(1);
    let mut json = false;
    let mut color = io::stdout().is_terminal();
    let mut aliases: Option<PathBuf> = None;
    let mut records: Option<PathBuf> = None;
    let mut words: Vec<String> = Vec::new();

    let subcommand = match args.next() {
        Some(arg) if arg == "-h" || arg == "--help" => {
            print_help();
            std::process::exit(0);
        }
        Some(arg) if arg == "-V" || arg == "--version" => {
            println!("decklens {}", env!("CARGO_PKG_VERSION"));
            std::process::exit(0);
        }
        Some(arg) if arg == "query" || arg == "swiss" => arg,
        Some(arg) => return Err(format!("error: unknown command '{arg}'\n\n{}", help_text())),
        None => return Err(format!("error: no command provided\n\n{}", help_text())),
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "--json" => json = true,
            "--color" => color = true,
            "--no-color" => color = false,
            "--config" => {
                let value = args.next().ok_or_else(|| "error: --config expects a value".to_string())?;
                aliases = Some(PathBuf::from(value));
            }
            "--records" => {
                let value = args.next().ok_or_else(|| "error: --records expects a value".to_string())?;
                records = Some(PathBuf::from(value));
            }
            "--" => {
                words.extend(args.by_ref());
                break;
            }
            _ if arg.starts_with("--config=") => aliases = Some(PathBuf::from(arg.trim_start_matches("--config="))),
            _ if arg.starts_with("--records=") => records = Some(PathBuf::from(arg.trim_start_matches("--records="))),
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => words.push(arg),
        }
    }

    let input = if words.is_empty() { read_stdin_input()? } else { words.join(" ") };

    let command = if subcommand == "query" {
        if input.trim().is_empty() {
            return Err(format!("error: no query provided\n\n{}", help_text()));
        }
        Command::Query { input, aliases, records }
    } else {
        if aliases.is_some() || records.is_some() {
            return Err("error: --config and --records only apply to 'query'".to_string());
        }
        Command::Swiss { bins: parse_bins(&input)? }
    };

    Ok(CliConfig { command, json, color })
}

/// Parse whitespace separated `W-L=count` pairs.
fn parse_bins(input: &str) -> Result<Vec<RecordBin>, String> {
    let bins = input
        .split_whitespace()
        .map(|pair| {
            let (record, count) =
                pair.split_once('=').ok_or_else(|| format!("error: invalid bin '{pair}' (expected W-L=count)"))?;
            let count = count.parse().map_err(|_| format!("error: invalid count in '{pair}'"))?;
            Ok::<_, String>(RecordBin::new(record, count))
        })
        .collect::<Result<Vec<_>, String>>()?;

    if bins.is_empty() {
        return Err(format!("error: no record bins provided\n\n{}", help_text()));
    }
    Ok(bins)
}

fn read_stdin_input() -> Result<String, String> {
    if io::stdin().is_terminal() {
        return Ok(String::new());
    }
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(|err| format!("error: failed to read stdin: {err}"))?;
    Ok(buffer)
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "decklens {version}

Decklist query and swiss attendance tool.

Usage:
  decklens query [OPTIONS] [--] <query...>
  decklens swiss [OPTIONS] [--] <W-L=count...>

Without positional arguments the query or bins are read from stdin.

Options:
  --config <file>     Alias configuration (TOML). Default: card aliases.
  --records <file>    Decklist records (JSON array). Runs the query against
                      them instead of only parsing it.
  --json              Print JSON instead of a report.
  --color             Force ANSI color output.
  --no-color          Disable ANSI color output.
  -h, --help          Show this help message.
  -V, --version       Print version information.

Environment:
  {log_env}        Log filter, e.g. decklens=debug. Default: warn.

Exit codes:
  0  Success.
  1  Failed to load input files or estimate attendance.
  2  Invalid arguments or missing input.
",
        version = env!("CARGO_PKG_VERSION"),
        log_env = LOG_ENV,
    )
}
