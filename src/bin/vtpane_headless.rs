//! vtpane headless runner
//!
//! Feeds a byte stream through the emulator without a child process or a
//! window and prints the resulting screen. Used for golden tests and for
//! reproducing rendering bugs from captured output.
//!
//! ```bash
//! printf 'Hello \x1b[31mRed\x1b[0m' | vtpane-headless --cols 40 --rows 5
//! vtpane-headless --input capture.bin --json --output snapshot.json
//! ```

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vtpane::{Config, Emulator};

struct Args {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    cols: Option<usize>,
    rows: Option<usize>,
    scrollback: Option<usize>,
    json: bool,
    help: bool,
}

fn parse_args(argv: &[String]) -> Result<Args, String> {
    let mut args = Args {
        input: None,
        output: None,
        config: None,
        cols: None,
        rows: None,
        scrollback: None,
        json: false,
        help: false,
    };

    let mut iter = argv.iter();
    while let Some(arg) = iter.next() {
        let mut value = || {
            iter.next()
                .cloned()
                .ok_or_else(|| format!("missing value for {}", arg))
        };
        match arg.as_str() {
            "-h" | "--help" => args.help = true,
            "-j" | "--json" => args.json = true,
            "-t" | "--text" => args.json = false,
            "-i" | "--input" => args.input = Some(PathBuf::from(value()?)),
            "-o" | "--output" => args.output = Some(PathBuf::from(value()?)),
            "--config" => args.config = Some(PathBuf::from(value()?)),
            "-c" | "--cols" => args.cols = Some(parse_number(arg, &value()?)?),
            "-r" | "--rows" => args.rows = Some(parse_number(arg, &value()?)?),
            "-s" | "--scrollback" => args.scrollback = Some(parse_number(arg, &value()?)?),
            other if !other.starts_with('-') && args.input.is_none() => {
                args.input = Some(PathBuf::from(other));
            }
            other => return Err(format!("unknown argument: {}", other)),
        }
    }
    Ok(args)
}

fn parse_number(name: &str, value: &str) -> Result<usize, String> {
    value
        .parse()
        .map_err(|_| format!("invalid value for {}: {}", name, value))
}

fn print_help() {
    println!("vtpane-headless: run a byte stream through the terminal emulator");
    println!();
    println!("USAGE:");
    println!("    vtpane-headless [OPTIONS] [INPUT]");
    println!();
    println!("OPTIONS:");
    println!("    -i, --input <FILE>       Read input from FILE (default: stdin)");
    println!("    -o, --output <FILE>      Write the snapshot to FILE (default: stdout)");
    println!("        --config <FILE>      Load a JSON configuration");
    println!("    -c, --cols <N>           Terminal columns");
    println!("    -r, --rows <N>           Terminal rows");
    println!("    -s, --scrollback <N>     Scrollback lines");
    println!("    -j, --json               Print the full JSON snapshot");
    println!("    -t, --text               Print the screen text (default)");
    println!("    -h, --help               Show this help");
    println!();
    println!("Set RUST_LOG=debug to see unhandled sequences.");
}

fn run(args: &Args) -> Result<(), String> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .map_err(|e| format!("failed to load config '{}': {}", path.display(), e))?,
        None => Config::default(),
    };
    if let Some(cols) = args.cols {
        config.cols = cols;
    }
    if let Some(rows) = args.rows {
        config.rows = rows;
    }
    if let Some(scrollback) = args.scrollback {
        config.scrollback_lines = scrollback;
    }

    let input = match &args.input {
        Some(path) => std::fs::read(path)
            .map_err(|e| format!("failed to read '{}': {}", path.display(), e))?,
        None => {
            let mut data = Vec::new();
            io::stdin()
                .read_to_end(&mut data)
                .map_err(|e| format!("failed to read stdin: {}", e))?;
            data
        }
    };

    let mut emulator = Emulator::from_config(&config);
    emulator.process(&input);
    tracing::debug!(bytes = input.len(), "processed input");

    let snapshot = emulator.snapshot();
    let rendered = if args.json {
        let mut json = snapshot
            .to_json()
            .map_err(|e| format!("failed to serialize snapshot: {}", e))?;
        json.push('\n');
        json
    } else {
        snapshot.to_text()
    };

    match &args.output {
        Some(path) => std::fs::write(path, rendered)
            .map_err(|e| format!("failed to write '{}': {}", path.display(), e)),
        None => {
            print!("{}", rendered);
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let args = match parse_args(&argv) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("Error: {}", err);
            eprintln!("Try --help for usage.");
            return ExitCode::FAILURE;
        }
    };
    if args.help {
        print_help();
        return ExitCode::SUCCESS;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
