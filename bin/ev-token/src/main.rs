//! ev-token: drive a token ledger stored in a local JSON state file.
//!
//! Mirrors what a relayer back-end does against a deployed token: deploy,
//! query balances and nonces, mint as the owner, and submit holder-signed
//! burn authorizations on their behalf.

#![allow(missing_docs, rustdoc::missing_crate_level_docs)]

use alloy_primitives::{
    utils::{format_ether, parse_ether},
    Address, B256, U256,
};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use clap::{Parser, Subcommand};
use ev_token::{
    abi, BurnAuthorization, CallEnv, Receipt, SignedBurn, StateFile, TestToken, TokenConfig,
    VrsSignature,
};
use eyre::{bail, eyre, Result, WrapErr};
use std::{path::PathBuf, str::FromStr};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default validity window of a signed authorization.
const DEFAULT_TTL_SECS: u64 = 3_600;

/// Local token ledger with EIP-712 authorized burns.
#[derive(Parser, Debug)]
#[command(name = "ev-token", about = "Owner-minted token with signature-authorized burns")]
struct Cli {
    /// Path of the JSON state file
    #[arg(long, env = "EV_TOKEN_STATE", default_value = "ev-token-state.json")]
    state: PathBuf,

    /// Block timestamp to execute at (defaults to the current time)
    #[arg(long, global = true)]
    timestamp: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Deploy a new token; the key's account becomes owner and gets the initial supply
    Deploy {
        /// Deployer private key
        #[arg(long, env = "EV_TOKEN_KEY", hide_env_values = true)]
        key: String,
        /// JSON config file (otherwise read from EV_TOKEN_* variables)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Overwrite an existing state file
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Print token metadata
    Info,
    /// Print the balance of an account
    Balance {
        account: Address,
    },
    /// Print the nonce the next authorization of an account must carry
    Nonce {
        account: Address,
    },
    /// Mint tokens (owner only)
    Mint {
        #[arg(long, env = "EV_TOKEN_KEY", hide_env_values = true)]
        key: String,
        to: Address,
        /// Amount in whole tokens, e.g. `12.5`
        #[arg(value_parser = parse_amount)]
        amount: U256,
    },
    /// Burn tokens from the key's own balance
    Burn {
        #[arg(long, env = "EV_TOKEN_KEY", hide_env_values = true)]
        key: String,
        #[arg(value_parser = parse_amount)]
        amount: U256,
    },
    /// Transfer tokens from the key's account
    Transfer {
        #[arg(long, env = "EV_TOKEN_KEY", hide_env_values = true)]
        key: String,
        to: Address,
        #[arg(value_parser = parse_amount)]
        amount: U256,
    },
    /// Sign a burn authorization as the holder (no state change)
    SignBurn {
        /// Holder private key
        #[arg(long, env = "EV_TOKEN_KEY", hide_env_values = true)]
        key: String,
        #[arg(value_parser = parse_amount)]
        amount: U256,
        /// Absolute deadline (unix seconds)
        #[arg(long, conflicts_with = "ttl")]
        deadline: Option<u64>,
        /// Seconds from now until the authorization expires
        #[arg(long, default_value_t = DEFAULT_TTL_SECS)]
        ttl: u64,
    },
    /// Relay a holder-signed burn
    BurnWithSig {
        /// Account submitting the call
        #[arg(long)]
        relayer: Address,
        #[arg(long)]
        from: Address,
        #[arg(long, value_parser = parse_amount)]
        amount: U256,
        #[arg(long)]
        deadline: u64,
        #[arg(long)]
        v: u8,
        #[arg(long)]
        r: B256,
        #[arg(long)]
        s: B256,
    },
}

/// Parses a decimal token amount into base units.
fn parse_amount(raw: &str) -> Result<U256, String> {
    let amount = parse_ether(raw.trim()).map_err(|e| e.to_string())?;
    if amount.is_zero() {
        return Err("amount must be greater than 0".to_string());
    }
    Ok(amount)
}

fn parse_key(raw: &str) -> Result<PrivateKeySigner> {
    PrivateKeySigner::from_str(raw.trim()).wrap_err("invalid private key")
}

fn now() -> Result<u64> {
    u64::try_from(chrono::Utc::now().timestamp()).map_err(|_| eyre!("system clock before epoch"))
}

/// Initialize tracing; logs go to stderr so stdout stays machine readable.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn print_receipt(receipt: &Receipt) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(receipt)?);
    Ok(())
}

fn deploy(file: &StateFile, key: &str, config: Option<PathBuf>, force: bool) -> Result<()> {
    if file.exists() && !force {
        bail!(
            "{} already exists, pass --force to replace it",
            file.path().display()
        );
    }

    let deployer = parse_key(key)?;
    let config = match config {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .wrap_err_with(|| format!("reading {}", path.display()))?;
            TokenConfig::from_json(&raw)?
        }
        None => TokenConfig::from_env()?,
    };

    let token = TestToken::deploy(config, deployer.address())?;
    file.store(&token)?;

    println!("Token deployed to: {}", token.config().verifying_contract);
    println!("- Name:     {}", token.name());
    println!("- Symbol:   {}", token.symbol());
    println!("- Decimals: {}", token.decimals());
    println!("- Owner:    {}", token.owner());
    println!(
        "- Deployer balance: {} {}",
        format_ether(token.balance_of(deployer.address())),
        token.symbol()
    );
    Ok(())
}

fn print_info(token: &TestToken) {
    let domain = token.domain();
    println!("Name:              {}", token.name());
    println!("Symbol:            {}", token.symbol());
    println!("Decimals:          {}", token.decimals());
    println!("Owner:             {}", token.owner());
    println!(
        "Total supply:      {} {}",
        format_ether(token.total_supply()),
        token.symbol()
    );
    println!("Chain ID:          {}", domain.chain_id());
    println!("Verifying contract: {}", domain.verifying_contract());
    println!("Domain separator:  {}", token.domain_separator());
    println!("Transitions:       {}", token.sequence());
}

fn sign_burn(token: &TestToken, key: &str, amount: U256, deadline: u64) -> Result<SignedBurn> {
    let holder = parse_key(key)?;
    let authorization = BurnAuthorization {
        from: holder.address(),
        amount,
        nonce: token.nonces(holder.address()),
        deadline: U256::from(deadline),
    };

    let signature = holder
        .sign_typed_data_sync(
            &abi::Burn::from(authorization),
            &token.domain().to_eip712_domain(),
        )
        .wrap_err("signing burn authorization")?;

    Ok(SignedBurn {
        authorization,
        signature: VrsSignature::from(signature),
    })
}

fn run(cli: Cli) -> Result<()> {
    let file = StateFile::new(cli.state);
    let timestamp = match cli.timestamp {
        Some(ts) => ts,
        None => now()?,
    };

    let load = || {
        file.load()
            .wrap_err("loading token state, run `ev-token deploy` first")
    };

    match cli.command {
        Command::Deploy { key, config, force } => deploy(&file, &key, config, force)?,
        Command::Info => print_info(&load()?),
        Command::Balance { account } => {
            let balance = load()?.balance_of(account);
            println!(
                "{}",
                serde_json::json!({ "balance": format_ether(balance), "raw": balance })
            );
        }
        Command::Nonce { account } => println!("{}", load()?.nonces(account)),
        Command::Mint { key, to, amount } => {
            let owner = parse_key(&key)?;
            let mut token = load()?;
            let receipt = token.mint(&CallEnv::new(owner.address(), timestamp), to, amount)?;
            file.store(&token)?;
            print_receipt(&receipt)?;
        }
        Command::Burn { key, amount } => {
            let holder = parse_key(&key)?;
            let mut token = load()?;
            let receipt = token.burn(&CallEnv::new(holder.address(), timestamp), amount)?;
            file.store(&token)?;
            print_receipt(&receipt)?;
        }
        Command::Transfer { key, to, amount } => {
            let sender = parse_key(&key)?;
            let mut token = load()?;
            let receipt = token.transfer(&CallEnv::new(sender.address(), timestamp), to, amount)?;
            file.store(&token)?;
            print_receipt(&receipt)?;
        }
        Command::SignBurn {
            key,
            amount,
            deadline,
            ttl,
        } => {
            let deadline = deadline.unwrap_or_else(|| timestamp.saturating_add(ttl));
            let signed = sign_burn(&load()?, &key, amount, deadline)?;
            println!("{}", serde_json::to_string_pretty(&signed)?);
        }
        Command::BurnWithSig {
            relayer,
            from,
            amount,
            deadline,
            v,
            r,
            s,
        } => {
            let mut token = load()?;
            let env = CallEnv::new(relayer, timestamp);
            let signature = VrsSignature::new(v, r, s);
            let receipt =
                token.burn_with_sig(&env, from, amount, U256::from(deadline), &signature)?;
            file.store(&token)?;
            info!(?from, ?relayer, sequence = receipt.sequence, "burn relayed");
            print_receipt(&receipt)?;
        }
    }

    Ok(())
}

fn main() {
    init_tracing();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}
