//! `miniamm` command line client

use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ethers::types::{Address, U256, U512};
use miniamm_amm::{PoolReserves, SwapDirection};
use miniamm_config::AppConfig;
use miniamm_frontend::contracts::{TokenSide, TxHandle};
use miniamm_frontend::logging::{self, LogEmoji};
use miniamm_frontend::readers::{self, LpPosition};
use miniamm_frontend::widgets::{
    AddLiquidityForm, RemoveLiquidityForm, SwapForm, TokenApproval, TokenBalanceView, TokenMinter,
};
use miniamm_frontend::{AppContext, Watcher};
use miniamm_types::{format_percent, format_token_amount, shorten_address, LP_TOKEN};
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

/// Environment variable holding the signing key
const PRIVATE_KEY_ENV: &str = "MINIAMM_PRIVATE_KEY";

#[derive(Parser, Debug)]
#[command(name = "miniamm")]
#[command(about = "Terminal client for the MiniAMM constant product pool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Hex private key used for signing; falls back to MINIAMM_PRIVATE_KEY
    #[arg(long, global = true)]
    private_key: Option<String>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Side {
    X,
    Y,
}

impl From<Side> for TokenSide {
    fn from(side: Side) -> Self {
        match side {
            Side::X => TokenSide::X,
            Side::Y => TokenSide::Y,
        }
    }
}

impl Side {
    fn selling(self) -> SwapDirection {
        match self {
            Side::X => SwapDirection::XToY,
            Side::Y => SwapDirection::YToX,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show contracts, reserves and balances
    Status {
        /// Print a JSON report instead of text
        #[arg(long)]
        json: bool,
    },
    /// Preview a swap without sending it
    Quote {
        amount: String,
        #[arg(long, value_enum, default_value = "x")]
        from: Side,
    },
    /// Mint free test tokens to the connected account
    Mint { token: Side, amount: String },
    /// Approve the AMM to spend a token (`max` for unlimited)
    Approve { token: Side, amount: String },
    /// Swap one pool asset for the other
    Swap {
        amount: String,
        #[arg(long, value_enum, default_value = "x")]
        from: Side,
    },
    /// Deposit both assets; the Y amount is derived from reserves when omitted
    AddLiquidity {
        amount_x: String,
        amount_y: Option<String>,
    },
    /// Burn LP shares for the underlying assets
    RemoveLiquidity { lp_amount: String },
    /// Print reserves and balances on every refresh until Ctrl-C
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    let config = AppConfig::load(cli.config.as_deref())?;
    let private_key = cli
        .private_key
        .clone()
        .or_else(|| std::env::var(PRIVATE_KEY_ENV).ok());
    let ctx = AppContext::connect(config, private_key.as_deref()).await?;

    match cli.command {
        Command::Status { json } => {
            let dashboard = Dashboard::new(&ctx);
            dashboard.refresh().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&dashboard.report(&ctx))?);
            } else {
                dashboard.print(&ctx);
            }
        }
        Command::Quote { amount, from } => quote(&ctx, &amount, from).await?,
        Command::Mint { token, amount } => {
            let mut minter = TokenMinter::new(&ctx, token.into());
            minter.set_amount(&amount);
            let handle = minter.mint().await?;
            print_receipt(&ctx, &handle);
        }
        Command::Approve { token, amount } => {
            let mut approval = TokenApproval::new(&ctx, token.into());
            let handle = if amount.eq_ignore_ascii_case("max") {
                approval.max_approve().await?
            } else {
                approval.set_amount(&amount);
                approval.approve().await?
            };
            print_receipt(&ctx, &handle);
            println!("Allowance: {}", approval.allowance_label());
        }
        Command::Swap { amount, from } => {
            let mut form = SwapForm::new(&ctx);
            form.set_direction(from.selling());
            form.refresh().await;
            form.set_input(&amount);
            println!(
                "Selling {} {} for ~{} {}",
                amount,
                form.from_token(),
                form.output_text(),
                form.to_token()
            );
            let handle = form.swap().await?;
            print_receipt(&ctx, &handle);
        }
        Command::AddLiquidity { amount_x, amount_y } => {
            let mut form = AddLiquidityForm::new(&ctx);
            form.refresh().await;
            match amount_y {
                Some(amount_y) => form.set_amounts(&amount_x, &amount_y),
                None => form.set_amount_x(&amount_x),
            }
            if form.amount_y().is_empty() {
                bail!("Pool has no reserves yet; provide both amounts");
            }
            println!(
                "Depositing {} {} and {} {}",
                form.amount_x(),
                TokenSide::X,
                form.amount_y(),
                TokenSide::Y
            );
            let handle = form.submit().await?;
            print_receipt(&ctx, &handle);
        }
        Command::RemoveLiquidity { lp_amount } => {
            let mut form = RemoveLiquidityForm::new(&ctx);
            form.refresh().await;
            form.set_amount(&lp_amount);
            let (x, y) = form.preview_labels();
            println!("LP balance: {}", form.lp_balance_label());
            println!(
                "Receiving ~{} {} and ~{} {}",
                x,
                TokenSide::X,
                y,
                TokenSide::Y
            );
            let handle = form.submit().await?;
            print_receipt(&ctx, &handle);
        }
        Command::Watch => watch(&ctx).await?,
    }

    Ok(())
}

async fn quote(ctx: &AppContext, amount: &str, from: Side) -> Result<()> {
    let mut form = SwapForm::new(ctx);
    form.set_direction(from.selling());
    form.refresh().await;
    form.set_input(amount);

    if form.reserves().is_empty() {
        warn!("{} Pool has no liquidity", LogEmoji::WARNING);
    }
    let Some(quote) = form.quote() else {
        bail!("Enter an amount to quote");
    };

    let display = ctx.config.ui.display_decimals;
    let to = form.to_token().info();
    println!(
        "{} {} -> {} {}",
        amount,
        form.from_token(),
        form.output_text(),
        to.symbol
    );
    println!("Price impact:     {}", format_percent(quote.price_impact, 2));
    println!(
        "Minimum received: {} {} ({} bps slippage)",
        format_token_amount(quote.minimum_received, to.decimals, display),
        to.symbol,
        ctx.config.tx.default_slippage_bps
    );
    println!("Allowance ok:     {}", form.is_approved());
    Ok(())
}

async fn watch(ctx: &AppContext) -> Result<()> {
    let dashboard = Dashboard::new(ctx);
    dashboard.refresh().await;

    let mut ticker = tokio::time::interval(ctx.pool_period());
    info!("{} Watching pool; Ctrl-C to stop", LogEmoji::REFRESH);
    loop {
        tokio::select! {
            _ = ticker.tick() => dashboard.print(ctx),
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}

fn print_receipt(ctx: &AppContext, handle: &TxHandle) {
    let hash = format!("{:?}", handle.hash);
    match handle.block_number {
        Some(block) => println!("{} Mined in block {}", LogEmoji::SUCCESS, block),
        None => println!("{} Mined", LogEmoji::SUCCESS),
    }
    println!("{}", ctx.config.explorer_tx_url(&hash));
}

/// Readouts shown by `status` and `watch`
struct Dashboard {
    balance_x: TokenBalanceView,
    balance_y: TokenBalanceView,
    pool: Watcher<PoolReserves>,
    lp: Watcher<LpPosition>,
}

impl Dashboard {
    fn new(ctx: &AppContext) -> Self {
        Self {
            balance_x: TokenBalanceView::new(ctx, TokenSide::X),
            balance_y: TokenBalanceView::new(ctx, TokenSide::Y),
            pool: readers::pool_reserves(ctx),
            lp: readers::lp_position(ctx),
        }
    }

    async fn refresh(&self) {
        futures::join!(
            self.balance_x.refresh(),
            self.balance_y.refresh(),
            self.pool.refetch(),
            self.lp.refetch()
        );
    }

    fn report(&self, ctx: &AppContext) -> StatusReport {
        let lp = self.lp.value();
        StatusReport {
            account: ctx.contracts.account,
            writable: ctx.contracts.writable,
            mini_amm: ctx.contracts.amm_address(),
            reserves: self.pool.value(),
            balance_x: self.balance_x.balance(),
            balance_y: self.balance_y.balance(),
            lp,
            pool_share: pool_share(&lp),
        }
    }

    fn print(&self, ctx: &AppContext) {
        let display = ctx.config.ui.display_decimals;
        let contracts = &ctx.contracts;

        let account = contracts
            .account
            .map(|account| shorten_address(&format!("{:?}", account), 4))
            .unwrap_or_else(|| "not connected".to_string());
        let mode = if contracts.writable { "signer" } else { "read-only" };
        println!("Account:  {} ({})", account, mode);

        match contracts.amm_address() {
            Some(amm) => println!("Pool:     {:?}", amm),
            None => println!("Pool:     not configured"),
        }

        let reserves = self.pool.snapshot();
        if reserves.error.is_some() {
            println!("Reserves: Error");
        } else {
            println!(
                "Reserves: {} {} / {} {}",
                format_token_amount(reserves.value.reserve_x, TokenSide::X.info().decimals, display),
                TokenSide::X,
                format_token_amount(reserves.value.reserve_y, TokenSide::Y.info().decimals, display),
                TokenSide::Y
            );
        }

        println!(
            "Balances: {} | {}",
            self.balance_x.label(),
            self.balance_y.label()
        );

        let position = self.lp.value();
        println!(
            "LP:       {} {} ({} of pool)",
            format_token_amount(position.balance, LP_TOKEN.decimals, display),
            LP_TOKEN.symbol,
            format_percent(pool_share(&position), 2)
        );
    }
}

/// Machine-readable `status` output
#[derive(Debug, Serialize)]
struct StatusReport {
    account: Option<Address>,
    writable: bool,
    mini_amm: Option<Address>,
    reserves: PoolReserves,
    balance_x: U256,
    balance_y: U256,
    lp: LpPosition,
    pool_share: Decimal,
}

fn pool_share(position: &LpPosition) -> Decimal {
    if position.total_supply.is_zero() {
        return Decimal::ZERO;
    }
    let bps = position.balance.full_mul(U256::from(10_000u32)) / U512::from(position.total_supply);
    let bps = U256::try_from(bps)
        .unwrap_or(U256::MAX)
        .min(U256::from(10_000u32));
    Decimal::new(bps.as_u64() as i64, 4)
}
