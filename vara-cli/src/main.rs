//! Vara CLI entry point: address normalization and token amount utilities.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, ContentArrangement, Table};
use is_terminal::IsTerminal;
use serde::Serialize;
use serde_json::json;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use vara_core::{
    truncate_address, AddressCodec, AddressInfo, AgentError, AmountConverter, AmountValidation,
    BaseUnits, ConfigError, NetworkConfig, OutputMode, Ss58Codec, Ss58Prefix, SuggestedAmount,
    TokenConfig, VARA_DECIMALS, VARA_SS58_PREFIX, VARA_SYMBOL,
};

const EXIT_FAILURE: i32 = 1;
const EXIT_CONFIG: i32 = 2;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Auto,
    Json,
    Human,
}

#[derive(Debug, Parser)]
#[command(name = "vara-cli", version)]
#[command(about = "Vara address normalization and VARA amount conversion")]
struct Cli {
    /// Output format: auto (tty=human, pipe=agent), json (agent), human (operator).
    #[arg(long, value_enum, default_value = "auto", global = true)]
    output: OutputFormat,

    /// SS58 prefix addresses are normalized to.
    #[arg(long, env = "VARA_SS58_PREFIX", default_value_t = VARA_SS58_PREFIX, global = true)]
    prefix: u16,

    /// Fraction digits of one whole token.
    #[arg(long, env = "VARA_DECIMALS", default_value_t = VARA_DECIMALS, global = true)]
    decimals: u32,

    /// Token symbol used in display strings.
    #[arg(long, env = "VARA_SYMBOL", default_value = VARA_SYMBOL, global = true)]
    symbol: String,

    /// Log debug events to stderr (overridden by RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Re-encode an address under the configured prefix.
    Convert {
        address: String,
        /// Fail instead of passing malformed input through unchanged.
        #[arg(long)]
        strict: bool,
    },
    /// Report whether an address already uses the configured prefix.
    Check { address: String },
    /// Show decoded key and format details for an address.
    Inspect { address: String },
    /// Convert a token amount to base units.
    ToBase {
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },
    /// Convert base units to a token amount with six decimals.
    FromBase { units: String },
    /// Compact display formatting (K/M suffixes).
    Format {
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },
    /// Check an amount against transfer policy.
    Validate {
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },
    /// List quick-pick amounts.
    Suggest,
}

/// Whether the command produced its result or a reported failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Done,
    Failed,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Detect output mode based on CLI flags and TTY detection.
fn detect_output_mode(output: OutputFormat) -> OutputMode {
    match output {
        OutputFormat::Human => OutputMode::Human,
        OutputFormat::Json => OutputMode::Agent,
        OutputFormat::Auto => {
            if std::io::stdout().is_terminal() {
                OutputMode::Human
            } else {
                OutputMode::Agent
            }
        }
    }
}

fn build_network(cli: &Cli) -> Result<NetworkConfig, ConfigError> {
    Ok(NetworkConfig {
        ss58_prefix: Ss58Prefix::new(cli.prefix)?,
        token: TokenConfig::new(cli.symbol.clone(), cli.decimals)?,
        ..NetworkConfig::vara()
    })
}

fn human_header(title: &str) {
    println!(
        "{}",
        "╔═══════════════════════════════════════════════════════════════╗".bright_white()
    );
    println!("{}", format!("║  {title:<61}║").bright_white());
    println!(
        "{}",
        "╚═══════════════════════════════════════════════════════════════╝".bright_white()
    );
    println!();
}

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        headers
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );
    table
}

fn render_address_info(info: &AddressInfo) -> Table {
    let mut table = new_table(&["Field", "Value"]);
    let flag = |value: Option<bool>| match value {
        Some(true) => format!("{}", "yes".green()),
        Some(false) => format!("{}", "no".yellow()),
        None => "-".to_string(),
    };

    table.add_row(vec![Cell::new("Valid"), Cell::new(flag(Some(info.is_valid)))]);
    let rows = [
        ("Original", info.original.as_deref()),
        ("Formatted", info.formatted.as_deref()),
        ("Public key", info.public_key_hex.as_deref()),
        ("Error", info.error.as_deref()),
    ];
    for (label, value) in rows {
        if let Some(value) = value {
            table.add_row(vec![Cell::new(label), Cell::new(value)]);
        }
    }
    if info.is_formatted.is_some() {
        table.add_row(vec![
            Cell::new("Already formatted"),
            Cell::new(flag(info.is_formatted)),
        ]);
    }
    table
}

fn render_suggestions(suggestions: &[SuggestedAmount], amounts: &AmountConverter) -> Table {
    let mut table = new_table(&["Label", "Value", "Base units"]);
    for suggestion in suggestions {
        let units = amounts
            .to_base_units(&suggestion.value)
            .map(|units| units.to_string())
            .unwrap_or_else(|_| "-".to_string());
        table.add_row(vec![
            Cell::new(&suggestion.label),
            Cell::new(&suggestion.value),
            Cell::new(units),
        ]);
    }
    table
}

fn emit_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string(value).context("failed to serialize output")?;
    println!("{json}");
    Ok(())
}

fn emit_agent_error(err: &AgentError) -> Result<()> {
    let json = serde_json::to_string(err).context("failed to serialize agent error")?;
    eprintln!("{json}");
    Ok(())
}

fn report_failure(mode: OutputMode, error: &str, code: i32, message: &str) -> Result<Outcome> {
    match mode {
        OutputMode::Human => {
            eprintln!("{} {}", "✗".red(), message.red());
        }
        OutputMode::Agent => {
            emit_agent_error(&AgentError::new(error, code).with_details(message))?;
        }
    }
    Ok(Outcome::Failed)
}

fn run_convert(
    addresses: &AddressCodec<Ss58Codec>,
    mode: OutputMode,
    address: &str,
    strict: bool,
) -> Result<Outcome> {
    let formatted = if strict {
        match addresses.try_convert(address) {
            Ok(formatted) => formatted,
            Err(err) => {
                return report_failure(mode, "conversion_failed", EXIT_FAILURE, &err.to_string())
            }
        }
    } else {
        addresses.convert(address)
    };

    match mode {
        OutputMode::Human => println!(
            "{} {} {}",
            truncate_address(address).bright_black(),
            "→".bright_black(),
            formatted.green().bold()
        ),
        OutputMode::Agent => emit_json(&json!({
            "original": address,
            "formatted": formatted,
            "prefix": addresses.prefix().as_u16(),
        }))?,
    }
    Ok(Outcome::Done)
}

fn run_check(
    addresses: &AddressCodec<Ss58Codec>,
    mode: OutputMode,
    address: &str,
) -> Result<Outcome> {
    let formatted = addresses.is_formatted(address);
    match mode {
        OutputMode::Human => {
            if formatted {
                println!(
                    "{} {}",
                    "✓".green(),
                    format!("uses SS58 prefix {}", addresses.prefix()).green()
                );
            } else {
                println!(
                    "{} {}",
                    "✗".yellow(),
                    format!("does not use SS58 prefix {}", addresses.prefix()).yellow()
                );
            }
        }
        OutputMode::Agent => emit_json(&json!({
            "address": address,
            "isFormatted": formatted,
            "prefix": addresses.prefix().as_u16(),
        }))?,
    }
    Ok(Outcome::Done)
}

fn run_inspect(
    addresses: &AddressCodec<Ss58Codec>,
    mode: OutputMode,
    address: &str,
) -> Result<Outcome> {
    let info = addresses.inspect(address);
    match mode {
        OutputMode::Human => {
            human_header("VARA — Address Inspection");
            println!("{}", render_address_info(&info));
        }
        OutputMode::Agent => emit_json(&info)?,
    }
    Ok(if info.is_valid {
        Outcome::Done
    } else {
        Outcome::Failed
    })
}

fn run_to_base(amounts: &AmountConverter, mode: OutputMode, amount: &str) -> Result<Outcome> {
    let units = match amounts.to_base_units(amount) {
        Ok(units) => units,
        Err(err) => return report_failure(mode, "invalid_amount", EXIT_FAILURE, &err.to_string()),
    };

    match mode {
        OutputMode::Human => println!("{}", units.to_string().green().bold()),
        OutputMode::Agent => emit_json(&json!({
            "amount": amount.trim(),
            "baseUnits": units,
            "decimals": amounts.token().decimals(),
        }))?,
    }
    Ok(Outcome::Done)
}

fn run_from_base(amounts: &AmountConverter, mode: OutputMode, units: &str) -> Result<Outcome> {
    let units = match BaseUnits::try_from(units.trim().to_string()) {
        Ok(units) => units,
        Err(err) => return report_failure(mode, "invalid_units", EXIT_FAILURE, &err.to_string()),
    };
    let amount = amounts.from_base_units(units);
    let symbol = amounts.token().symbol();

    match mode {
        OutputMode::Human => println!("{}", format!("{amount} {symbol}").green().bold()),
        OutputMode::Agent => emit_json(&json!({
            "baseUnits": units,
            "amount": amount,
            "symbol": symbol,
        }))?,
    }
    Ok(Outcome::Done)
}

fn run_format(amounts: &AmountConverter, mode: OutputMode, amount: &str) -> Result<Outcome> {
    let formatted = amounts.format(amount);
    match mode {
        OutputMode::Human => println!("{}", formatted.bright_white().bold()),
        OutputMode::Agent => emit_json(&json!({
            "input": amount,
            "formatted": formatted,
        }))?,
    }
    Ok(Outcome::Done)
}

fn run_validate(amounts: &AmountConverter, mode: OutputMode, amount: &str) -> Result<Outcome> {
    let result: AmountValidation = amounts.validate(amount);
    debug!(?result, "validated amount");

    match mode {
        OutputMode::Human => match (&result.amount, &result.base_units, &result.error) {
            (Some(tokens), Some(units), _) => println!(
                "{} {}",
                "✓".green(),
                format!("Valid: {} ({} base units)", amounts.format(tokens), units).green()
            ),
            (_, _, error) => println!(
                "{} {}",
                "✗".red(),
                error.as_deref().unwrap_or("Invalid amount").red()
            ),
        },
        OutputMode::Agent => emit_json(&result)?,
    }

    Ok(if result.is_valid {
        Outcome::Done
    } else {
        Outcome::Failed
    })
}

fn run_suggest(amounts: &AmountConverter, mode: OutputMode) -> Result<Outcome> {
    let suggestions = amounts.suggested_amounts();
    match mode {
        OutputMode::Human => {
            human_header("VARA — Suggested Amounts");
            println!("{}", render_suggestions(&suggestions, amounts));
        }
        OutputMode::Agent => emit_json(&suggestions)?,
    }
    Ok(Outcome::Done)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let mode = detect_output_mode(cli.output);

    let network = match build_network(&cli) {
        Ok(network) => network,
        Err(err) => {
            report_failure(mode, "config_error", EXIT_CONFIG, &err.to_string())?;
            std::process::exit(EXIT_CONFIG);
        }
    };
    debug!(
        prefix = %network.ss58_prefix,
        symbol = network.token.symbol(),
        decimals = network.token.decimals(),
        "network configured"
    );

    let addresses = network.address_codec();
    let amounts = network.amount_converter();

    let outcome = match &cli.command {
        Command::Convert { address, strict } => run_convert(&addresses, mode, address, *strict)?,
        Command::Check { address } => run_check(&addresses, mode, address)?,
        Command::Inspect { address } => run_inspect(&addresses, mode, address)?,
        Command::ToBase { amount } => run_to_base(&amounts, mode, amount)?,
        Command::FromBase { units } => run_from_base(&amounts, mode, units)?,
        Command::Format { amount } => run_format(&amounts, mode, amount)?,
        Command::Validate { amount } => run_validate(&amounts, mode, amount)?,
        Command::Suggest => run_suggest(&amounts, mode)?,
    };

    if outcome == Outcome::Failed {
        std::process::exit(EXIT_FAILURE);
    }
    Ok(())
}
