//! batchtx command line.
//!
//! ```text
//! rows file (TOML) ──▶ AppState rows ──▶ eligibility ──▶ BatchOrchestrator
//!                                                            │
//!                          stdout report ◀── AppState ◀── BatchEvent channel
//! ```

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use alloy::primitives::{Address, U256};
use clap::{Parser, Subcommand};
use serde_json::json;

use batchtx::batch::eligibility::{select_buys, select_multi_key, select_sells, select_single_key};
use batchtx::batch::events::{self, EventReceiver};
use batchtx::batch::input::RowsFile;
use batchtx::batch::loader::{swap_addresses, swap_secrets, transfer_secrets};
use batchtx::batch::{AppState, BatchEvent, BatchOrchestrator, BatchSettings, BatchSummary, RowTable};
use batchtx::blockchain::{ChainClient, RpcClient};
use batchtx::config::{load_or_default, AppConfig, NetworkConfig};
use batchtx::observability::{logging, metrics};
use batchtx::token::{validate_token, TokenDescriptor};
use batchtx::wallets::{self, Clipboard, ExportTarget, DEFAULT_EXPORT_FILE};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "batchtx")]
#[command(about = "Batch transfers and token swaps across many EVM wallets", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Network name, overrides the configured one
    #[arg(short, long, global = true)]
    network: Option<String>,

    /// Print the final report as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured networks
    Networks,
    /// Send from one key to every transfer row
    Send {
        #[arg(short, long)]
        rows: PathBuf,
        /// Environment variable holding the shared private key
        #[arg(long, default_value = "BATCHTX_PRIVATE_KEY")]
        key_env: String,
    },
    /// Send from each transfer row's own key
    MultiSend {
        #[arg(short, long)]
        rows: PathBuf,
    },
    /// Derive addresses and fetch balances for every key in the rows file
    Load {
        #[arg(short, long)]
        rows: PathBuf,
        /// Also fetch balances of this token for the swap rows
        #[arg(short, long)]
        token: Option<String>,
    },
    /// Generate fresh wallets
    Generate {
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
        /// Export file
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Print the export instead of writing a file
        #[arg(long)]
        copy: bool,
    },
    /// Validate a token and show its metadata
    Token { address: String },
    /// Buy a token with each swap row's native amount
    Buy {
        #[arg(short, long)]
        rows: PathBuf,
        #[arg(short, long)]
        token: String,
        /// Minimum output in raw token units
        #[arg(long)]
        min_out: Option<U256>,
    },
    /// Sell a percentage of each swap row's token balance for native currency
    Sell {
        #[arg(short, long)]
        rows: PathBuf,
        #[arg(short, long)]
        token: String,
        #[arg(short, long, default_value_t = 100)]
        percent: u8,
        /// Minimum wrapped-native output in wei
        #[arg(long)]
        min_out: Option<U256>,
    },
    /// Approve the router to spend each swap row's token balance
    Approve {
        #[arg(short, long)]
        rows: PathBuf,
        #[arg(short, long)]
        token: String,
    },
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();

    let mut config = load_or_default(cli.config.as_deref())?;
    logging::init_logging(&config.observability);

    let mut state = AppState::new(config.network.clone(), config.batch.max_rows);
    if let Some(name) = &cli.network {
        if config.network(name).is_none() {
            return Err(format!("Unknown network '{}'", name).into());
        }
        state.select_network(name);
        config.network = name.clone();
    }

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics endpoint");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let network = config
        .active_network()
        .cloned()
        .ok_or_else(|| format!("Unknown network '{}'", config.network))?;

    tracing::info!(
        network = %config.network,
        chain_id = network.chain_id,
        max_rows = config.batch.max_rows,
        transfer_delay_ms = config.batch.transfer_delay_ms,
        "Configuration loaded"
    );

    match &cli.command {
        Commands::Networks => {
            print_networks(&config, cli.json)?;
            return Ok(());
        }
        Commands::Generate { count, out, copy } => {
            let generated = wallets::generate_wallets(*count, config.batch.max_generated_wallets)?;
            state.generated = generated;

            if *copy {
                let mut clipboard = Clipboard::default();
                wallets::export(&state.generated, ExportTarget::Clipboard(&mut clipboard))?;
                print!("{}", clipboard.contents().unwrap_or_default());
            } else {
                let path = out.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_FILE));
                let written = wallets::export(&state.generated, ExportTarget::File(&path))?;
                if cli.json {
                    let addresses: Vec<String> =
                        state.generated.iter().map(|w| w.address.to_string()).collect();
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&json!({
                            "count": written,
                            "path": path.display().to_string(),
                            "addresses": addresses,
                        }))?
                    );
                } else {
                    println!("Wrote {} wallets to {}", written, path.display());
                }
            }
            return Ok(());
        }
        _ => {}
    }

    let rpc = RpcClient::new(network.clone(), &config.rpc)?;
    rpc.verify_chain_id().await?;
    let client: Arc<dyn ChainClient> = Arc::new(rpc);

    let (sender, mut receiver) = events::channel();
    let settings = BatchSettings::from_config(&config, &config.network, &network);

    match cli.command {
        Commands::Networks | Commands::Generate { .. } => {}

        Commands::Send { rows, key_env } => {
            let rows = RowsFile::load(&rows)?;
            state.set_transfer_rows(rows.transfers)?;
            let secret = std::env::var(&key_env)
                .ok()
                .or(rows.secret)
                .ok_or_else(|| format!("No private key: set {} or `secret` in the rows file", key_env))?;

            let selection = select_single_key(&secret, &state.transfers)?;
            let orchestrator = BatchOrchestrator::new(client, settings, sender);
            let summary = drive(
                orchestrator.run_transfers(selection),
                &mut receiver,
                &mut state,
                cli.json,
            )
            .await?;
            print_transfer_report(&state, &network, &summary, cli.json)?;
        }

        Commands::MultiSend { rows } => {
            let rows = RowsFile::load(&rows)?;
            state.set_transfer_rows(rows.transfers)?;

            let selection = select_multi_key(&state.transfers);
            let orchestrator = BatchOrchestrator::new(client, settings, sender);
            let summary = drive(
                orchestrator.run_transfers(selection),
                &mut receiver,
                &mut state,
                cli.json,
            )
            .await?;
            print_transfer_report(&state, &network, &summary, cli.json)?;
        }

        Commands::Load { rows, token } => {
            let rows = RowsFile::load(&rows)?;
            state.set_transfer_rows(rows.transfers)?;
            state.set_swap_rows(rows.swaps)?;

            let descriptor = match token {
                Some(address) => {
                    Some(validate_token(client.as_ref(), &mut state.tokens, &address).await?)
                }
                None => None,
            };

            let orchestrator = BatchOrchestrator::new(client, settings, sender);
            let secrets = transfer_secrets(&state.transfers);
            drive(
                orchestrator.load_wallets(RowTable::Transfers, secrets),
                &mut receiver,
                &mut state,
                cli.json,
            )
            .await;
            let secrets = swap_secrets(&state.swaps);
            drive(
                orchestrator.load_wallets(RowTable::Swaps, secrets),
                &mut receiver,
                &mut state,
                cli.json,
            )
            .await;

            if let Some(descriptor) = &descriptor {
                let owners = swap_addresses(&state.swaps);
                drive(
                    orchestrator.refresh_token_balances(descriptor.address, owners),
                    &mut receiver,
                    &mut state,
                    cli.json,
                )
                .await;
            }
            state.token = descriptor;
            print_wallets(&state, cli.json)?;
        }

        Commands::Token { address } => {
            let descriptor = validate_token(client.as_ref(), &mut state.tokens, &address).await?;
            print_token(&descriptor, cli.json)?;
        }

        Commands::Buy {
            rows,
            token,
            min_out,
        } => {
            let rows = RowsFile::load(&rows)?;
            state.set_swap_rows(rows.swaps)?;
            let descriptor = validate_token(client.as_ref(), &mut state.tokens, &token).await?;
            let token = descriptor.address;
            state.token = Some(descriptor);

            warn_unbounded_output(&config, min_out.is_some());
            let settings = settings.with_amount_out_minimum(min_out.unwrap_or(U256::ZERO));
            let selection = select_buys(&state.swaps);
            let orchestrator = BatchOrchestrator::new(client, settings, sender);
            let summary = drive(
                orchestrator.run_buys(token, selection),
                &mut receiver,
                &mut state,
                cli.json,
            )
            .await?;
            print_swap_report(&state, &summary, cli.json)?;
        }

        Commands::Sell {
            rows,
            token,
            percent,
            min_out,
        } => {
            let rows = RowsFile::load(&rows)?;
            state.set_swap_rows(rows.swaps)?;
            let descriptor = validate_token(client.as_ref(), &mut state.tokens, &token).await?;
            let token = descriptor.address;
            state.token = Some(descriptor);

            warn_unbounded_output(&config, min_out.is_some());
            let settings = settings.with_amount_out_minimum(min_out.unwrap_or(U256::ZERO));
            let selection = select_sells(&state.swaps);
            let orchestrator = BatchOrchestrator::new(client, settings, sender);
            let summary = drive(
                orchestrator.run_sells(token, percent, selection),
                &mut receiver,
                &mut state,
                cli.json,
            )
            .await?;
            print_swap_report(&state, &summary, cli.json)?;
        }

        Commands::Approve { rows, token } => {
            let rows = RowsFile::load(&rows)?;
            state.set_swap_rows(rows.swaps)?;
            let descriptor = validate_token(client.as_ref(), &mut state.tokens, &token).await?;
            let token = descriptor.address;
            state.token = Some(descriptor);

            let selection = select_sells(&state.swaps);
            let orchestrator = BatchOrchestrator::new(client, settings, sender);
            let summary = drive(
                orchestrator.run_approvals(token, selection),
                &mut receiver,
                &mut state,
                cli.json,
            )
            .await?;
            print_swap_report(&state, &summary, cli.json)?;
        }
    }

    Ok(())
}

/// Run `operation` while applying its events to `state` as they arrive.
async fn drive<F: Future>(
    operation: F,
    receiver: &mut EventReceiver,
    state: &mut AppState,
    json: bool,
) -> F::Output {
    tokio::pin!(operation);

    loop {
        tokio::select! {
            output = &mut operation => {
                while let Ok(event) = receiver.try_recv() {
                    observe(&event, json);
                    state.apply(event);
                }
                return output;
            }
            Some(event) = receiver.recv() => {
                observe(&event, json);
                state.apply(event);
            }
        }
    }
}

fn warn_unbounded_output(config: &AppConfig, has_minimum: bool) {
    if config.swap.output_unbounded(has_minimum) {
        tracing::warn!(
            slippage_percent = config.swap.slippage_percent,
            "No --min-out given; router output is unbounded"
        );
    }
}

fn observe(event: &BatchEvent, json: bool) {
    if json {
        return;
    }
    match event {
        BatchEvent::RowStatus { index, status, .. } => {
            println!("row {:>2}  {}", index + 1, status);
        }
        BatchEvent::Progress { completed, total } => {
            println!("        [{}/{}]", completed, total);
        }
        _ => {}
    }
}

fn print_networks(config: &AppConfig, json: bool) -> CliResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&config.networks)?);
        return Ok(());
    }
    for (name, network) in &config.networks {
        let marker = if *name == config.network { "*" } else { " " };
        let swaps = if network.router_address.is_some() {
            "swaps"
        } else {
            "transfers only"
        };
        println!(
            "{} {:<14} {:<26} chain {:<10} {}",
            marker, name, network.label, network.chain_id, swaps
        );
    }
    Ok(())
}

fn print_transfer_report(
    state: &AppState,
    network: &NetworkConfig,
    summary: &BatchSummary,
    json: bool,
) -> CliResult<()> {
    if json {
        let rows: Vec<_> = state
            .transfers
            .iter()
            .enumerate()
            .filter(|(_, row)| !row.is_blank())
            .map(|(index, row)| json!({ "index": index, "status": row.status.to_string() }))
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "summary": summary,
                "records": state.records,
                "rows": rows,
            }))?
        );
        return Ok(());
    }

    for record in &state.records {
        let outcome = match (&record.hash, &record.error) {
            (Some(hash), None) => {
                let hash = hash.to_string();
                network.explorer_tx_url(&hash).unwrap_or(hash)
            }
            (_, Some(error)) => format!("error: {}", error),
            (None, None) => String::new(),
        };
        println!(
            "row {:>2}  {} -> {}  {}  {}",
            record.index + 1,
            record.from,
            record.to,
            record.amount,
            outcome
        );
    }
    println!("{}", summary);
    Ok(())
}

fn print_swap_report(state: &AppState, summary: &BatchSummary, json: bool) -> CliResult<()> {
    let symbol = state
        .token
        .as_ref()
        .map(TokenDescriptor::display_symbol)
        .unwrap_or_default();

    if json {
        let rows: Vec<_> = state
            .swaps
            .iter()
            .enumerate()
            .filter(|(_, row)| !row.is_blank())
            .map(|(index, row)| {
                json!({
                    "index": index,
                    "address": row.address,
                    "status": row.status.to_string(),
                    "balance": row.balance.to_string(),
                    "token_balance": token_amount(state, row.token_balance.loaded()),
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "summary": summary,
                "token": state.token,
                "rows": rows,
            }))?
        );
        return Ok(());
    }

    for (index, row) in state.swaps.iter().enumerate() {
        if row.is_blank() {
            continue;
        }
        println!(
            "row {:>2}  {}  {} {}  {}",
            index + 1,
            row.balance,
            token_amount(state, row.token_balance.loaded()),
            symbol,
            row.status
        );
    }
    println!("{}", summary);
    Ok(())
}

fn print_wallets(state: &AppState, json: bool) -> CliResult<()> {
    let transfers = state
        .transfers
        .iter()
        .enumerate()
        .filter(|(_, row)| !row.secret.trim().is_empty())
        .map(|(index, row)| (index, row.source_address, &row.balance, None, &row.status));
    let swaps = state
        .swaps
        .iter()
        .enumerate()
        .filter(|(_, row)| !row.secret.trim().is_empty())
        .map(|(index, row)| {
            (
                index,
                row.address,
                &row.balance,
                row.token_balance.loaded(),
                &row.status,
            )
        });

    if json {
        let render = |(index, address, balance, token, status): (
            usize,
            Option<Address>,
            &batchtx::batch::BalanceState,
            Option<U256>,
            &batchtx::batch::RowStatus,
        )| {
            json!({
                "index": index,
                "address": address,
                "balance": balance.to_string(),
                "token_balance": token_amount(state, token),
                "status": status.to_string(),
            })
        };
        let transfers: Vec<_> = transfers.map(render).collect();
        let swaps: Vec<_> = swaps.map(render).collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "network": state.network(),
                "token": state.token,
                "transfers": transfers,
                "swaps": swaps,
            }))?
        );
        return Ok(());
    }

    for (label, rows) in [
        ("transfers", transfers.collect::<Vec<_>>()),
        ("swaps", swaps.collect::<Vec<_>>()),
    ] {
        if rows.is_empty() {
            continue;
        }
        println!("{}:", label);
        for (index, address, balance, token, status) in rows {
            let address = address.map(|a| a.to_string()).unwrap_or_default();
            println!(
                "  row {:>2}  {:<42}  {}  {}  {}",
                index + 1,
                address,
                balance,
                token_amount(state, token),
                status
            );
        }
    }
    Ok(())
}

fn print_token(descriptor: &TokenDescriptor, json: bool) -> CliResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(descriptor)?);
    } else {
        println!(
            "{} ({})  decimals {}  {}",
            descriptor.display_name(),
            descriptor.display_symbol(),
            descriptor.decimals,
            descriptor.address
        );
    }
    Ok(())
}

fn token_amount(state: &AppState, raw: Option<U256>) -> String {
    match (raw, &state.token) {
        (Some(raw), Some(token)) => token.format_amount(raw),
        (Some(raw), None) => raw.to_string(),
        (None, _) => String::new(),
    }
}
