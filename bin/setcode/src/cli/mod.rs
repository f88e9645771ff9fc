// This file is part of Setcode.
//
// Setcode is free software: you can redistribute it and/or modify it under the
// terms of the GNU Lesser General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later version.
//
// Setcode is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with Setcode.
// If not, see https://www.gnu.org/licenses/.

use std::time::Duration;

use alloy_primitives::{address, Address, TxHash};
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use secrecy::SecretString;
use setcode_client::{Contracts, GasSettings, LoginParams, ReceiptPolling, Session};
use setcode_provider::{AlloyConnector, ProviderSettings};
use setcode_types::chain::{ChainRegistry, ChainSpec};
use setcode_utils::retry::BackoffOpts;

mod account;
mod chain_spec;
mod token;
mod tracing;
mod transfer;

use account::{AuthorizationArgs, SignAuthorizationArgs, WatchArgs};
use token::{BalanceArgs, MintArgs};
use transfer::SendArgs;

/// BatchCallDelegation deployment on Sepolia
const DEFAULT_DELEGATION_CONTRACT: Address = address!("90489BDa2d09131471c287F3cc67EA60cf48c157");
/// Mintable test token on Sepolia
const DEFAULT_TOKEN: Address = address!("0D3c26B307115AD096d856dC4C8f95Ca2fFD4F4b");

/// Main entry point for the CLI
///
/// Parses the CLI arguments and runs the appropriate subcommand.
pub async fn run() -> anyhow::Result<()> {
    let opt = Cli::parse();
    let _guard = tracing::configure_logging(&opt.logs)?;
    tracing::debug!("Parsed CLI options: {:#?}", opt);

    let registry = chain_spec::load_registry(&opt.common.chain_spec)?;

    match opt.command {
        Command::Chains => {
            for chain in registry.chains() {
                print_chain(chain);
            }
            return Ok(());
        }
        Command::SignAuthorization(args) => {
            return account::sign_authorization(args, &opt.common).await;
        }
        _ => {}
    }

    let mut session = login(&opt.common, registry).await?;
    match opt.command {
        Command::Status => account::status(&session).await,
        Command::Watch(args) => account::watch(session, args).await,
        Command::Bind(args) => account::bind(&mut session, args).await,
        Command::Unbind(args) => account::unbind(&mut session, args).await,
        Command::Mint(args) => token::mint(&session, args).await,
        Command::Balance(args) => token::balance(&session, args).await,
        Command::SendNative(args) => transfer::send_native(&session, args).await,
        Command::SendErc20(args) => transfer::send_erc20(&session, args).await,
        Command::Chains | Command::SignAuthorization(_) => Ok(()),
    }
}

/// Open a session from the common arguments, switching chains if `--chain_id` asks for one.
async fn login(
    common: &CommonArgs,
    registry: ChainRegistry,
) -> anyhow::Result<Session<AlloyConnector>> {
    let rpc_url = common
        .rpc_url
        .clone()
        .context("RPC_URL must be set, or pass --rpc_url")?;
    let tx_account_key = common
        .tx_account_key
        .clone()
        .context("TX_ACCOUNT_PRIVATE_KEY must be set")?;

    let params = LoginParams {
        rpc_url,
        tx_account_key,
        gas_fee_payer_key: common.sponsor_key.clone(),
        contracts: common.contracts(),
        gas: GasSettings {
            gas_price_multiplier: common.gas_price_multiplier,
        },
    };
    let mut session = Session::login(common.connector(), registry, params).await?;

    if let Some(chain_id) = common.chain_id {
        if chain_id != session.chain().id {
            session.switch_chain(chain_id).await?;
        }
    }
    Ok(session)
}

/// Print a transaction hash with its explorer link, if the chain has an explorer
fn print_tx(chain: &ChainSpec, label: &str, tx_hash: TxHash) {
    match chain.tx_url(tx_hash) {
        Some(url) => println!("{label}: {tx_hash} ({url})"),
        None => println!("{label}: {tx_hash}"),
    }
}

fn print_chain(chain: &ChainSpec) {
    println!(
        "{} ({}): rpc {}, explorer {}",
        chain.name,
        chain.id,
        chain.rpc_url,
        chain.explorer_url.as_deref().unwrap_or("none")
    );
}

/// Wrap a private key as soon as it is read
fn parse_secret(s: &str) -> Result<SecretString, std::convert::Infallible> {
    Ok(SecretString::from(s.to_string()))
}

fn parse_multiplier(s: &str) -> Result<f64, String> {
    let multiplier: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if !multiplier.is_finite() || multiplier <= 0.0 {
        return Err(format!("must be a positive number, got {s}"));
    }
    Ok(multiplier)
}

/// CLI commands
#[derive(Debug, Subcommand)]
enum Command {
    /// Show the session: account, chain, delegation and balances
    #[command(name = "status")]
    Status,

    /// Poll the delegation status until interrupted
    #[command(name = "watch")]
    Watch(WatchArgs),

    /// Delegate the tx account to the batch call delegation contract
    #[command(name = "bind")]
    Bind(AuthorizationArgs),

    /// Clear the tx account's delegation
    #[command(name = "unbind")]
    Unbind(AuthorizationArgs),

    /// Sign an authorization without sending it, printing it as JSON
    #[command(name = "sign-authorization")]
    SignAuthorization(SignAuthorizationArgs),

    /// Mint test tokens
    #[command(name = "mint")]
    Mint(MintArgs),

    /// Show native and token balances
    #[command(name = "balance")]
    Balance(BalanceArgs),

    /// Send native token transfers
    #[command(name = "send-native")]
    SendNative(SendArgs),

    /// Send ERC-20 token transfers
    #[command(name = "send-erc20")]
    SendErc20(SendArgs),

    /// List the chains in the registry
    #[command(name = "chains")]
    Chains,
}

/// CLI common options
#[derive(Debug, Args)]
#[command(next_help_heading = "Common")]
pub struct CommonArgs {
    /// ETH Node HTTP URL to connect to
    #[arg(long = "rpc_url", name = "rpc_url", env = "RPC_URL", global = true)]
    rpc_url: Option<String>,

    /// Private key of the account to delegate and send from
    #[arg(
        long = "tx_account_key",
        name = "tx_account_key",
        env = "TX_ACCOUNT_PRIVATE_KEY",
        value_parser = parse_secret,
        hide_env_values = true,
        global = true
    )]
    tx_account_key: Option<SecretString>,

    /// Private key of the gas fee payer for sponsored transactions
    #[arg(
        long = "sponsor_key",
        name = "sponsor_key",
        env = "SPONSOR_PRIVATE_KEY",
        value_parser = parse_secret,
        hide_env_values = true,
        global = true
    )]
    sponsor_key: Option<SecretString>,

    /// Batch call delegation contract
    #[arg(
        long = "delegation_contract",
        name = "delegation_contract",
        env = "BATCH_CALL_DELEGATION_CONTRACT_ADDRESS",
        default_value_t = DEFAULT_DELEGATION_CONTRACT,
        global = true
    )]
    delegation_contract: Address,

    /// Mintable ERC-20 token
    #[arg(
        long = "token",
        name = "token",
        env = "ERC20_TOKEN_ADDRESS",
        default_value_t = DEFAULT_TOKEN,
        global = true
    )]
    token: Address,

    /// Switch to this registered chain after connecting
    #[arg(long = "chain_id", name = "chain_id", env = "CHAIN_ID", global = true)]
    chain_id: Option<u64>,

    /// Extra chain spec file added to the registry
    #[arg(
        long = "chain_spec",
        name = "chain_spec",
        env = "CHAIN_SPEC",
        global = true
    )]
    chain_spec: Option<String>,

    /// Timeout of a single RPC request, in seconds
    #[arg(
        long = "rpc_timeout_seconds",
        name = "rpc_timeout_seconds",
        env = "RPC_TIMEOUT_SECONDS",
        default_value = "30",
        global = true
    )]
    rpc_timeout_seconds: u64,

    /// Retries of a rate limited RPC request
    #[arg(
        long = "rpc_max_retries",
        name = "rpc_max_retries",
        env = "RPC_MAX_RETRIES",
        default_value = "3",
        global = true
    )]
    rpc_max_retries: u32,

    /// Wait before the first retry of a rate limited request, doubling after each retry
    #[arg(
        long = "rpc_retry_base_delay_millis",
        name = "rpc_retry_base_delay_millis",
        env = "RPC_RETRY_BASE_DELAY_MILLIS",
        default_value = "1000",
        global = true
    )]
    rpc_retry_base_delay_millis: u64,

    /// Multiplier applied to the node's gas price for the max fee per gas
    #[arg(
        long = "gas_price_multiplier",
        name = "gas_price_multiplier",
        env = "GAS_PRICE_MULTIPLIER",
        default_value = "1.0",
        value_parser = parse_multiplier,
        global = true
    )]
    gas_price_multiplier: f64,
}

impl CommonArgs {
    fn connector(&self) -> AlloyConnector {
        AlloyConnector::new(ProviderSettings {
            timeout: Duration::from_secs(self.rpc_timeout_seconds),
            backoff: BackoffOpts {
                max_retries: self.rpc_max_retries,
                base_delay: Duration::from_millis(self.rpc_retry_base_delay_millis),
            },
        })
    }

    fn contracts(&self) -> Contracts {
        Contracts {
            delegation: self.delegation_contract,
            token: self.token,
        }
    }
}

/// Receipt waiting options shared by sending commands
#[derive(Debug, Args)]
pub struct WaitArgs {
    /// Wait for the transaction to be mined
    #[arg(long = "wait", required = false, num_args = 0)]
    wait: bool,

    /// Interval between receipt polls, in milliseconds
    #[arg(long = "wait.interval_millis", default_value = "2000")]
    interval_millis: u64,

    /// Receipt polls before giving up
    #[arg(long = "wait.max_polls", default_value = "60")]
    max_polls: u32,
}

impl WaitArgs {
    fn polling(&self) -> Option<ReceiptPolling> {
        self.wait.then(|| ReceiptPolling {
            interval: Duration::from_millis(self.interval_millis),
            max_polls: self.max_polls,
        })
    }
}

/// CLI options for logging
#[derive(Debug, Args)]
#[command(next_help_heading = "Logging")]
pub struct LogsArgs {
    /// Log file
    ///
    /// If not provided, logs will be written to stderr
    #[arg(
        long = "log.file",
        name = "log.file",
        env = "LOG_FILE",
        default_value = None,
        global = true
    )]
    file: Option<String>,

    /// Log JSON
    ///
    /// If set, logs will be written in JSON format
    #[arg(
        long = "log.json",
        name = "log.json",
        env = "LOG_JSON",
        required = false,
        num_args = 0,
        global = true
    )]
    json: bool,
}

/// CLI options
#[derive(Debug, Parser)]
#[command(name = "setcode", version)]
pub struct Cli {
    #[clap(subcommand)]
    command: Command,

    #[clap(flatten)]
    common: CommonArgs,

    #[clap(flatten)]
    logs: LogsArgs,
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["setcode", "status"]).unwrap();
        assert_eq!(cli.common.delegation_contract, DEFAULT_DELEGATION_CONTRACT);
        assert_eq!(cli.common.token, DEFAULT_TOKEN);
        assert_eq!(cli.common.rpc_max_retries, 3);
        assert_eq!(cli.common.rpc_retry_base_delay_millis, 1000);
        assert!(matches!(cli.command, Command::Status));
    }

    #[test]
    fn test_key_is_wrapped_and_hidden() {
        let cli = Cli::try_parse_from([
            "setcode",
            "status",
            "--tx_account_key",
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
        ])
        .unwrap();
        let key = cli.common.tx_account_key.as_ref().unwrap();
        assert!(key.expose_secret().starts_with("0xac09"));
        assert!(!format!("{cli:?}").contains("ac0974bec39a17e3"));
    }

    #[test]
    fn test_send_requires_transfers() {
        assert!(Cli::try_parse_from(["setcode", "send-native"]).is_err());
        assert!(Cli::try_parse_from(["setcode", "send-native", "--transfer", "bad"]).is_err());

        let cli = Cli::try_parse_from([
            "setcode",
            "send-native",
            "--transfer",
            "0xcb98643b8786950F0461f3B0edf99D88F274574D:0.1",
            "--transfer",
            "0xf3bd3c09a1610528c393C124f449274cc47C7FC4:0.2",
            "--sponsored",
        ])
        .unwrap();
        let Command::SendNative(args) = cli.command else {
            panic!("expected send-native");
        };
        assert_eq!(args.transfers.len(), 2);
        assert!(args.sponsored);
        assert!(!args.authorize);
    }

    #[test]
    fn test_gas_price_multiplier() {
        let cli = Cli::try_parse_from(["setcode", "status", "--gas_price_multiplier", "1.25"])
            .unwrap();
        assert_eq!(cli.common.gas_price_multiplier, 1.25);

        for bad in ["0", "-1.5", "NaN", "inf", "abc"] {
            assert!(
                Cli::try_parse_from(["setcode", "status", "--gas_price_multiplier", bad]).is_err(),
                "{bad} accepted"
            );
        }
    }

    #[test]
    fn test_wait_polling() {
        let cli = Cli::try_parse_from(["setcode", "bind", "--wait"]).unwrap();
        let Command::Bind(args) = cli.command else {
            panic!("expected bind");
        };
        assert_eq!(args.wait.polling(), Some(ReceiptPolling::default()));
    }
}
