use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use contractshield::config::Config;
use contractshield::output::OutputFormat;
use contractshield::rules::{RuleEngine, Severity};
use contractshield::ScanOptions;

#[derive(Parser)]
#[command(
    name = "contractshield",
    about = "Static vulnerability scanner for Solidity smart contracts",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a directory of Solidity contracts for vulnerabilities
    Scan {
        /// Path to the contracts directory
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Config file path
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Output format (console, json)
        #[arg(long, short = 'f', default_value = "console")]
        format: String,

        /// Minimum severity to fail (info, low, medium, high, critical)
        #[arg(long)]
        fail_on: Option<String>,

        /// Glob pattern to exclude from analysis (repeatable)
        #[arg(long, short = 'e')]
        exclude: Vec<String>,

        /// Skip the external Slither analysis
        #[arg(long)]
        no_slither: bool,

        /// Write output to file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// List all available native detection rules
    ListRules {
        /// Output format (table, json)
        #[arg(long, short = 'f', default_value = "table")]
        format: String,
    },

    /// Generate a starter .contractshield.toml config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Scan {
            path,
            config,
            format,
            fail_on,
            exclude,
            no_slither,
            output,
        } => cmd_scan(path, config, format, fail_on, exclude, no_slither, output),
        Commands::ListRules { format } => cmd_list_rules(format),
        Commands::Init { force } => cmd_init(force),
    };

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}

fn cmd_scan(
    path: PathBuf,
    config: Option<PathBuf>,
    format_str: String,
    fail_on_str: Option<String>,
    exclude: Vec<String>,
    no_slither: bool,
    output_path: Option<PathBuf>,
) -> Result<i32, contractshield::error::ScanError> {
    let format = OutputFormat::from_str_lenient(&format_str).unwrap_or_else(|| {
        eprintln!("Warning: unknown format '{}', using console", format_str);
        OutputFormat::Console
    });

    let fail_on = fail_on_str.and_then(|s| {
        let sev = Severity::from_str_lenient(&s);
        if sev.is_none() {
            eprintln!("Warning: unknown severity '{}', using config default", s);
        }
        sev
    });

    let options = ScanOptions {
        config_path: config,
        format,
        fail_on_override: fail_on,
        exclude,
        skip_slither: no_slither,
    };

    let report = contractshield::scan(&path, &options)?;
    let rendered = contractshield::render_report(&report, format)?;

    match output_path {
        Some(out) => std::fs::write(&out, &rendered)?,
        None => print!("{}", rendered),
    }

    // Exit code: 0 = pass, 1 = findings above threshold
    Ok(if report.verdict.pass { 0 } else { 1 })
}

fn cmd_list_rules(format_str: String) -> Result<i32, contractshield::error::ScanError> {
    let engine = RuleEngine::with_builtin_rules()?;
    let rules = engine.rule_set().list_rules();

    match format_str.as_str() {
        "json" => {
            let json = serde_json::to_string_pretty(&rules)?;
            println!("{}", json);
        }
        _ => {
            println!(
                "{:<10} {:<42} {:<10} {:<8} CHAIN",
                "ID", "NAME", "SEVERITY", "SWC"
            );
            println!("{}", "-".repeat(80));
            for rule in &rules {
                println!(
                    "{:<10} {:<42} {:<10} {:<8} {}",
                    rule.id,
                    rule.name,
                    rule.severity.to_string(),
                    rule.weakness_ref.as_deref().unwrap_or("-"),
                    if rule.chain_specific { "evm" } else { "generic" },
                );
            }
        }
    }

    Ok(0)
}

fn cmd_init(force: bool) -> Result<i32, contractshield::error::ScanError> {
    let path = PathBuf::from(".contractshield.toml");

    if path.exists() && !force {
        eprintln!(".contractshield.toml already exists. Use --force to overwrite.");
        return Ok(1);
    }

    std::fs::write(&path, Config::starter_toml())?;
    println!("Created .contractshield.toml");

    Ok(0)
}
