//! CLI wrapper for the protobind script runner.
//!
//! Usage:
//!   protobind <file.js>              # Execute a script file
//!   protobind -e "code"              # Evaluate code and print the last value
//!   protobind                        # Start REPL (interactive mode)

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::Level;

use protobind::parser::parse_to_token_tree;
use protobind::runner::api::run_script;
use protobind::runner::config::RealmConfig;
use protobind::runner::ds::value::JsValue;
use protobind::runner::eval::types::EvalContext;
use protobind::runner::std_lib::console::format_value;

#[derive(Parser)]
#[command(name = "protobind", version, about = "Context binding and prototype delegation runner")]
struct Cli {
    /// Script file to execute
    file: Option<PathBuf>,

    /// Evaluate inline code
    #[arg(short = 'e', long = "eval")]
    eval: Option<String>,

    /// Realm configuration (JSON)
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Print the parse tree instead of running
    #[arg(long = "tokens")]
    tokens: bool,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<RealmConfig, String> {
    let mut config = match path {
        Some(p) => RealmConfig::load(p).map_err(|e| format!("{}: {}", p.display(), e))?,
        None => RealmConfig::default(),
    };
    config.echo_output = true;
    Ok(config)
}

fn print_tokens(code: &str) -> ExitCode {
    match parse_to_token_tree(code) {
        Ok(tree) => {
            println!("{}", tree);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::from(1)
        }
    }
}

fn run_file(path: &Path, config: RealmConfig) -> ExitCode {
    let source = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading {}: {}", path.display(), e);
            return ExitCode::from(1);
        }
    };
    let mut ctx = EvalContext::with_config(config);
    match run_script(&source, &mut ctx) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::from(1)
        }
    }
}

fn eval_code(code: &str, config: RealmConfig) -> ExitCode {
    let mut ctx = EvalContext::with_config(config);
    match run_script(code, &mut ctx) {
        Ok(value) => {
            if value != JsValue::Undefined {
                println!("{}", format_value(ctx.chain(), &value));
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::from(1)
        }
    }
}

fn run_repl(config: RealmConfig) -> ExitCode {
    println!("protobind v{}", env!("CARGO_PKG_VERSION"));
    println!("Type code and press Enter. Type .exit to quit.");

    let mut ctx = EvalContext::with_config(config);
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        if stdout.flush().is_err() {
            break;
        }

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                eprintln!("Read error: {}", e);
                return ExitCode::from(1);
            }
        }

        let input = line.trim();
        if input == ".exit" {
            break;
        }
        if input.is_empty() {
            continue;
        }

        match run_script(input, &mut ctx) {
            Ok(JsValue::Undefined) => {}
            Ok(value) => println!("{}", format_value(ctx.chain(), &value)),
            Err(e) => eprintln!("{}", e),
        }
    }
    ExitCode::SUCCESS
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config {}", e);
            return ExitCode::from(1);
        }
    };

    if cli.tokens {
        let source = match (&cli.eval, &cli.file) {
            (Some(code), _) => code.clone(),
            (None, Some(path)) => match fs::read_to_string(path) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Error reading {}: {}", path.display(), e);
                    return ExitCode::from(1);
                }
            },
            (None, None) => {
                eprintln!("--tokens needs a file or -e");
                return ExitCode::from(1);
            }
        };
        return print_tokens(&source);
    }

    if let Some(code) = cli.eval {
        eval_code(&code, config)
    } else if let Some(path) = cli.file {
        run_file(&path, config)
    } else {
        run_repl(config)
    }
}
