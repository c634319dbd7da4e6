//! ipmatch CLI: driving adapter for the IP match operators.
//!
//! Subcommands:
//! - `check <list-file>`: validate a list file, print entry counts
//! - `eval <list-file> <address>...`: test addresses against a list file
//! - `rule <config> <address>...`: build an operator from a YAML/JSON config and evaluate
//! - `info`: print registered operator names
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `warn`).

use std::path::Path;
use std::process;

use ipmatch::{FsLoader, IpMatchFromFile, Operator, OperatorConfig};
use ipmatch_test::{error_chain, evaluate_variable, TestTransaction};

/// Variable the command-line addresses are bound to.
const VARIABLE: &str = "REMOTE_ADDR";

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "check" => cmd_check(&args[2..]),
        "eval" => cmd_eval(&args[2..]),
        "rule" => cmd_rule(&args[2..]),
        "info" => cmd_info(),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("error: unknown command \"{other}\"");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_check(args: &[String]) -> Result<(), String> {
    let [path] = args else {
        return Err("check requires exactly one list file path".into());
    };

    let list = load_list(path)?;
    let matcher = list.matcher();
    println!(
        "List valid: {} entries ({} IPv4, {} IPv6)",
        matcher.len(),
        matcher.v4_len(),
        matcher.v6_len()
    );
    Ok(())
}

fn cmd_eval(args: &[String]) -> Result<(), String> {
    let Some((path, addresses)) = args.split_first() else {
        return Err("eval requires a list file path".into());
    };
    if addresses.is_empty() {
        return Err("eval requires at least one address".into());
    }

    let list = load_list(path)?;
    print_results(&evaluate_all(&list, addresses));
    Ok(())
}

fn cmd_rule(args: &[String]) -> Result<(), String> {
    let Some((path, addresses)) = args.split_first() else {
        return Err("rule requires a config file path".into());
    };
    if addresses.is_empty() {
        return Err("rule requires at least one address".into());
    }

    let operator = load_rule(path)?;
    print_results(&evaluate_all(operator.as_ref(), addresses));
    Ok(())
}

#[allow(clippy::unnecessary_wraps)] // Uniform return type for all commands
fn cmd_info() -> Result<(), String> {
    let registry = build_registry(FsLoader::new());

    println!("Registered operators:");
    for name in registry.names() {
        println!("  @{name}");
    }

    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry assembly (composition root)
// ═══════════════════════════════════════════════════════════════════════════════

fn build_registry(loader: FsLoader) -> ipmatch::Registry<TestTransaction> {
    let builder = ipmatch::RegistryBuilder::new().loader(loader);
    ipmatch_test::register(builder).build()
}

/// Directory relative identifiers in a file resolve against.
fn base_dir(path: &str) -> &Path {
    Path::new(path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Loading
// ═══════════════════════════════════════════════════════════════════════════════

fn load_list(path: &str) -> Result<IpMatchFromFile, String> {
    IpMatchFromFile::load(path, &FsLoader::new())
        .map_err(|e| format!("list invalid: {}", error_chain(&e)))
}

fn load_config(path: &str) -> Result<OperatorConfig, String> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("failed to read \"{path}\": {e}"))?;

    let is_json = Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&content).map_err(|e| format!("JSON parse error: {e}"))
    } else {
        // Default to YAML (handles .yaml and .yml)
        serde_yaml::from_str(&content).map_err(|e| format!("YAML parse error: {e}"))
    }
}

/// Build the operator a config file describes.
///
/// List files named in the config resolve against the config's directory.
fn load_rule(path: &str) -> Result<Box<dyn Operator<TestTransaction>>, String> {
    let config = load_config(path)?;
    log::debug!("rule config from \"{path}\": {config:?}");
    let registry = build_registry(FsLoader::new().with_root(base_dir(path)));
    registry
        .load(&config)
        .map_err(|e| format!("config invalid: {}", error_chain(&e)))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Evaluation
// ═══════════════════════════════════════════════════════════════════════════════

fn evaluate_all<'a, O>(operator: &O, addresses: &'a [String]) -> Vec<(&'a str, bool)>
where
    O: Operator<TestTransaction> + ?Sized,
{
    addresses
        .iter()
        .map(|address| {
            let tx = TestTransaction::new().with(VARIABLE, address.as_str());
            (address.as_str(), evaluate_variable(operator, &tx, VARIABLE))
        })
        .collect()
}

fn print_results(results: &[(&str, bool)]) {
    for (address, matched) in results {
        println!("{address}\t{}", if *matched { "match" } else { "no match" });
    }
}

fn print_usage() {
    eprintln!(
        "Usage: ipmatch <command> [options]

Commands:
  check <list-file>                  Validate a list file (one entry per line)
  eval <list-file> <address>...      Test addresses against a list file
  rule <config> <address>...         Build an operator from YAML/JSON config and test addresses
  info                               Print registered operators
  help                               Show this help

Set RUST_LOG=info to see load diagnostics."
    );
}
