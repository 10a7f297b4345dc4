mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::irr::IrrArgs;
use commands::model::ModelArgs;

/// Leveraged buyout projection engine
#[derive(Parser)]
#[command(
    name = "lbo",
    version,
    about = "Leveraged buyout projection engine",
    long_about = "Builds a complete LBO model with decimal precision: Sources & Uses, \
                  projected income statement, multi-tranche debt schedule with a cash \
                  sweep, free cash flow, credit ratios, equity returns, and \
                  sensitivity analysis."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the full LBO model from an assumptions document
    Model(ModelArgs),
    /// Solve the IRR of a cash-flow vector
    Irr(IrrArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Model(args) => commands::model::run_model(args),
        Commands::Irr(args) => commands::irr::run_irr(args),
        Commands::Version => {
            println!("lbo {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_model_flags_parse() {
        let cli = Cli::try_parse_from([
            "lbo",
            "model",
            "--ltm-ebitda",
            "250",
            "--ev-multiple",
            "9",
            "--output",
            "table",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Model(_)));
        assert!(matches!(cli.output, OutputFormat::Table));
    }

    #[test]
    fn test_irr_flags_allow_negative_flows() {
        let cli = Cli::try_parse_from(["lbo", "irr", "--cash-flows", "-100,30,30,130"]).unwrap();
        match cli.command {
            Commands::Irr(args) => assert_eq!(args.cash_flows.len(), 4),
            _ => panic!("expected irr subcommand"),
        }
    }
}
