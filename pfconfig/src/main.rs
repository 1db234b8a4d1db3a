//! Read appliance configuration through the `php-cgi` interpreter.
//!
//! `pfconfig get` dumps `$config` as JSON and optionally narrows it to a
//! colon-delimited key path such as `interfaces:wan:ipaddr`.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing::debug;

use pfconfig::core::script::Script;
use pfconfig::exit_codes;
use pfconfig::io::interpreter::{Interpreter, PhpCgi};
use pfconfig::io::settings::{Settings, load_settings};
use pfconfig::logging;
use pfconfig::resolver::ConfigResolver;

#[derive(Parser)]
#[command(
    name = "pfconfig",
    version,
    about = "Read appliance configuration through its php-cgi interpreter"
)]
struct Cli {
    /// Settings file (TOML). Defaults apply when omitted or missing.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Interpreter binary, overriding the settings file.
    #[arg(long, global = true)]
    interpreter: Option<PathBuf>,

    /// Kill the interpreter after this many seconds (0 waits indefinitely).
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Log debug diagnostics to stderr when `RUST_LOG` is unset.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the configuration tree, or the subtree at a key path.
    Get {
        /// Colon-delimited key path (e.g. `interfaces:wan:enable`).
        keys: Vec<String>,
        /// Print single-line JSON.
        #[arg(long)]
        compact: bool,
    },
    /// Print the rendered script without running it.
    Script(ScriptArgs),
    /// Run a script and print the interpreter's output.
    Exec(ScriptArgs),
}

#[derive(Args)]
struct ScriptArgs {
    /// Include file; repeat for several. Replaces the configured includes.
    #[arg(short, long = "include", value_name = "FILE")]
    includes: Vec<String>,
    /// Statement fragments; separate fragments are divided by a blank line.
    fragments: Vec<String>,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let settings = resolve_settings(&cli)?;
    match cli.command {
        Command::Get { keys, compact } => cmd_get(&settings, keys, compact),
        Command::Script(args) => cmd_script(&settings, args),
        Command::Exec(args) => cmd_exec(&settings, args),
    }
}

fn resolve_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = match &cli.config {
        Some(path) => load_settings(path)?,
        None => Settings::default(),
    };
    if let Some(interpreter) = &cli.interpreter {
        settings.interpreter = interpreter.clone();
    }
    if let Some(timeout_secs) = cli.timeout_secs {
        settings.timeout_secs = timeout_secs;
    }
    settings.validate().context("validate settings")?;
    debug!(?settings, "resolved settings");
    Ok(settings)
}

fn cmd_get(settings: &Settings, keys: Vec<String>, compact: bool) -> Result<i32> {
    let resolver = ConfigResolver::with_includes(
        PhpCgi::from_settings(settings),
        settings.includes.iter().cloned(),
    );
    let args: Vec<Value> = keys.into_iter().map(Value::String).collect();
    let found = resolver.get_from_args(&args).context("get config")?;
    let Some(tree) = found else {
        let path = args.first().and_then(Value::as_str).unwrap_or_default();
        eprintln!("key path not found: {path}");
        return Ok(exit_codes::NOT_FOUND);
    };
    let rendered = if compact {
        serde_json::to_string(&tree)
    } else {
        serde_json::to_string_pretty(&tree)
    }
    .context("serialize config")?;
    println!("{rendered}");
    Ok(exit_codes::OK)
}

fn cmd_script(settings: &Settings, args: ScriptArgs) -> Result<i32> {
    println!("{}", build_script(settings, args));
    Ok(exit_codes::OK)
}

fn cmd_exec(settings: &Settings, args: ScriptArgs) -> Result<i32> {
    let script = build_script(settings, args);
    let result = PhpCgi::from_settings(settings)
        .run(&script)
        .context("run script")?;
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(result.stdout.as_bytes())
        .context("write stdout")?;
    stdout.flush().context("flush stdout")?;
    eprint!("{}", result.stderr);
    Ok(exit_codes::OK)
}

fn build_script(settings: &Settings, args: ScriptArgs) -> Script {
    let includes = if args.includes.is_empty() {
        settings.includes.clone()
    } else {
        args.includes
    };
    Script::with_includes(includes, args.fragments)
}
