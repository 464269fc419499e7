//! gravity-pulse terminal entry point
//!
//! Surfaces the core operations to the operator: run the collector, request
//! a signal, execute and close trades, inspect the portfolio. Decisions and
//! errors are rendered distinctly so a fallback/AI decision can never be
//! mistaken for an error message.

use clap::{Parser, Subcommand};
use colored::*;
use std::sync::Arc;

use gravity_pulse::ai;
use gravity_pulse::apis::OneInchClient;
use gravity_pulse::collector;
use gravity_pulse::config;
use gravity_pulse::database::PriceStore;
use gravity_pulse::ledger::{CloseOutcome, Ledger, TradeRequest};
use gravity_pulse::logger::{self, LogTag};
use gravity_pulse::paths;
use gravity_pulse::types::{TradeAction, TradeMode};
use gravity_pulse::wallet_link;
use gravity_pulse::{SignalAction, TradingSignal};

#[derive(Parser)]
#[command(name = "gravity-pulse", version, about = "Paper/live crypto trading terminal core")]
struct Cli {
    /// Show detailed diagnostics
    #[arg(long, global = true)]
    debug: bool,

    /// Only show warnings and errors
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the background price collector (backfill + poll loop)
    Collect,

    /// Request an AI trading signal for a symbol
    Signal {
        /// Ticker symbol, e.g. BTC
        symbol: String,
    },

    /// Legacy spot analysis from a single quote (no history, no fallback)
    Analyze {
        #[arg(long)]
        price: f64,
        #[arg(long)]
        change_24h: f64,
        #[arg(long, default_value = "moderate")]
        risk: String,
    },

    /// Execute a trade against the ledger
    Trade {
        coin: String,
        /// buy or sell
        action: String,
        #[arg(long)]
        price: f64,
        #[arg(long)]
        amount: f64,
        #[arg(long, default_value_t = 1)]
        leverage: i64,
        #[arg(long, default_value = "paper")]
        mode: String,
        #[arg(long, default_value = "")]
        reasoning: String,
        /// Skip the funds-sufficiency check before a Paper BUY
        #[arg(long)]
        force: bool,
    },

    /// Close an open position at the given mark price
    Close {
        position_id: i64,
        #[arg(long)]
        price: f64,
    },

    /// Show open positions with P&L at a mark price
    Positions {
        #[arg(long, default_value = "paper")]
        mode: String,
        /// Mark price applied to every listed position
        #[arg(long)]
        mark: Option<f64>,
    },

    /// Show the trade audit log
    Trades,

    /// Show wallet balances
    Balance,

    /// Overwrite a wallet balance (no audit entry)
    ResetWallet {
        balance: f64,
        #[arg(long, default_value = "paper")]
        mode: String,
    },

    /// Real-time DEX execution price for a token (1inch, vs USDC)
    DexPrice {
        token_address: String,
    },

    /// Trust Wallet deep link for buying a token
    Link {
        token_address: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logger::init(cli.debug, cli.quiet);

    if let Err(e) = paths::ensure_directories() {
        logger::error(
            LogTag::System,
            &format!("Failed to create data directories: {}", e),
        );
        std::process::exit(1);
    }
    if let Err(e) = config::init() {
        logger::error(LogTag::System, &format!("Config load failed: {}", e));
        std::process::exit(1);
    }

    if let Err(e) = run(cli.command).await {
        // Errors render on their own channel, never like a decision
        eprintln!("{} {}", "error:".bright_red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Collect => {
            let store = Arc::new(PriceStore::open(&paths::prices_db_path())?);
            logger::info(LogTag::System, "Starting price collector");
            collector::run(store).await;
        }

        Command::Signal { symbol } => {
            let store = PriceStore::open(&paths::prices_db_path())?;
            match ai::get_trading_signal(&store, &symbol).await {
                Ok(signal) => print_signal(&symbol.to_uppercase(), &signal),
                Err(e) => anyhow::bail!(e.to_string()),
            }
        }

        Command::Analyze {
            price,
            change_24h,
            risk,
        } => match ai::analyze_market(price, change_24h, &risk).await {
            Ok(signal) => print_signal("SPOT", &signal),
            Err(e) => anyhow::bail!(e.to_string()),
        },

        Command::Trade {
            coin,
            action,
            price,
            amount,
            leverage,
            mode,
            reasoning,
            force,
        } => {
            let action = TradeAction::parse(&action)
                .ok_or_else(|| anyhow::anyhow!("action must be 'buy' or 'sell'"))?;
            let mode = TradeMode::parse(&mode)
                .ok_or_else(|| anyhow::anyhow!("mode must be 'paper' or 'live'"))?;

            let ledger = Ledger::open(&paths::ledger_db_path())?;

            // Sufficiency is enforced here, not in the engine: the ledger
            // itself books whatever it is told.
            if action == TradeAction::Buy && mode == TradeMode::Paper && !force {
                ledger
                    .ensure_funds(price * amount)
                    .await
                    .map_err(|e| anyhow::anyhow!(e.to_string()))?;
            }

            let request = TradeRequest {
                coin: coin.to_uppercase(),
                action,
                price,
                amount,
                leverage,
                reasoning,
                mode,
            };
            let trade_id = ledger.execute_trade(&request).await?;
            println!("Trade #{} booked: {} {} x {} @ ${:.2}", trade_id, action, request.coin, amount, price);
        }

        Command::Close { position_id, price } => {
            let ledger = Ledger::open(&paths::ledger_db_path())?;
            match ledger.close_position(position_id, price).await? {
                CloseOutcome::Closed { trade_id } => {
                    println!("Position {} closed (trade #{})", position_id, trade_id);
                }
                CloseOutcome::NotFound => {
                    println!("Position {} not found (already closed?)", position_id);
                }
            }
        }

        Command::Positions { mode, mark } => {
            let mode = TradeMode::parse(&mode)
                .ok_or_else(|| anyhow::anyhow!("mode must be 'paper' or 'live'"))?;
            let ledger = Ledger::open(&paths::ledger_db_path())?;
            let positions = ledger.open_positions(mode).await;

            if positions.is_empty() {
                println!("No open {} positions", mode);
                return Ok(());
            }
            for pos in &positions {
                match mark {
                    Some(mark_price) => {
                        let pnl = pos.unrealized_pnl(mark_price);
                        let pct = pos.pnl_pct(mark_price);
                        let pnl_str = format!("{:+.2} ({:+.2}%)", pnl, pct);
                        let colored_pnl = if pnl >= 0.0 {
                            pnl_str.bright_green()
                        } else {
                            pnl_str.bright_red()
                        };
                        println!(
                            "#{:<4} {:<6} {:>12.6} @ ${:<10.2} {}x  P&L {}",
                            pos.id, pos.coin, pos.amount, pos.avg_price, pos.leverage, colored_pnl
                        );
                    }
                    None => println!(
                        "#{:<4} {:<6} {:>12.6} @ ${:<10.2} {}x  opened {}",
                        pos.id,
                        pos.coin,
                        pos.amount,
                        pos.avg_price,
                        pos.leverage,
                        pos.opened_at.format("%Y-%m-%d %H:%M")
                    ),
                }
            }
        }

        Command::Trades => {
            let ledger = Ledger::open(&paths::ledger_db_path())?;
            let trades = ledger.trade_history().await;
            if trades.is_empty() {
                println!("No trades recorded");
                return Ok(());
            }
            for trade in &trades {
                println!(
                    "#{:<4} {} {:<5} {:<6} {:>12.6} @ ${:<10.2} {}x [{}] {}",
                    trade.id,
                    trade.timestamp.format("%Y-%m-%d %H:%M"),
                    trade.action,
                    trade.coin,
                    trade.amount,
                    trade.price,
                    trade.leverage,
                    trade.mode,
                    trade.reasoning
                );
            }
        }

        Command::Balance => {
            let ledger = Ledger::open(&paths::ledger_db_path())?;
            for mode in [TradeMode::Paper, TradeMode::Live] {
                let balance = ledger.balance(mode).await?;
                println!("{:<6} ${:.2}", mode, balance);
            }
        }

        Command::ResetWallet { balance, mode } => {
            let mode = TradeMode::parse(&mode)
                .ok_or_else(|| anyhow::anyhow!("mode must be 'paper' or 'live'"))?;
            let ledger = Ledger::open(&paths::ledger_db_path())?;
            ledger.reset_wallet(mode, balance).await?;
            println!("{} wallet reset to ${:.2}", mode, balance);
        }

        Command::DexPrice { token_address } => {
            let chain_id = config::with_config(|c| c.swap.chain_id);
            let client = OneInchClient::new(chain_id)?;
            let price = client.usd_execution_price(&token_address).await;
            if price > 0.0 {
                println!("${:.6}", price);
            } else {
                anyhow::bail!("no DEX price available for {}", token_address);
            }
        }

        Command::Link { token_address } => {
            println!("{}", wallet_link::buy_link(&token_address, 0.0));
        }
    }
    Ok(())
}

/// Render a decision. Action is color-coded; the fallback path already
/// marks itself via its "(AI Offline)" reasoning prefix.
fn print_signal(label: &str, signal: &TradingSignal) {
    let action = match signal.action {
        SignalAction::Buy => signal.action.as_str().bright_green().bold(),
        SignalAction::Sell => signal.action.as_str().bright_red().bold(),
        SignalAction::Hold => signal.action.as_str().bright_yellow().bold(),
    };
    println!("{}: {} (confidence {})", label, action, signal.confidence);
    println!("  {}", signal.reasoning);
}
