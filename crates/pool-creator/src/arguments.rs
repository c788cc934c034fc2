use {
    crate::{amount::TokenAmount, fee::FeeTier, tokens},
    alloy::{primitives::Address, signers::local::PrivateKeySigner},
    anyhow::{Context, Result},
    clap::{Parser, Subcommand},
    std::{
        fmt::{self, Display, Formatter},
        time::Duration,
    },
    url::Url,
};

#[derive(Parser)]
#[clap(name = "pool-creator", about = "Create AMM pools from the command line")]
pub struct Arguments {
    #[clap(flatten)]
    pub logging: LoggingArguments,

    /// The Ethereum node URL to connect to.
    #[clap(long, env, default_value = "http://localhost:8545")]
    pub node_url: Url,

    /// Address of the AMM contract that creates pools.
    #[clap(long, env, value_parser = tokens::normalize_address)]
    pub amm_address: Option<Address>,

    /// Hex encoded private key of the account that creates the pool.
    #[clap(long, env, hide_env_values = true, value_parser = parse_private_key)]
    pub private_key: Option<PrivateKeySigner>,

    /// Number of confirmations to wait for, including the block the
    /// transaction was mined in.
    #[clap(long, env, default_value = "1")]
    pub confirmations: u64,

    /// How many seconds to wait for a transaction before giving up.
    #[clap(
        long,
        env,
        default_value = "120",
        value_parser = duration_from_seconds,
    )]
    pub confirmation_timeout: Duration,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(clap::Parser)]
pub struct LoggingArguments {
    #[clap(long, env, default_value = "warn,pool_creator=info,ethrpc=info")]
    pub log_filter: String,

    /// At which log level logs should be printed to stderr instead of stdout.
    #[clap(long, env)]
    pub log_stderr_threshold: Option<tracing::Level>,

    /// Whether to use JSON format for the logs.
    #[clap(long, env, default_value = "false")]
    pub use_json_logs: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the EIP-55 checksummed form of an address.
    Normalize { address: String },
    /// Print two token addresses in pool order.
    Sort { token_a: String, token_b: String },
    /// Print the fee the AMM uses when none is specified.
    DefaultFee,
    /// Approve both tokens and create a new pool.
    CreatePool(CreatePoolArguments),
}

#[derive(Debug, clap::Args)]
pub struct CreatePoolArguments {
    #[clap(long)]
    pub token_a: String,

    /// Deposit of token A in whole tokens (`1.5`) or base units (`1500wei`).
    #[clap(long)]
    pub amount_a: TokenAmount,

    #[clap(long)]
    pub token_b: String,

    /// Deposit of token B in whole tokens (`1.5`) or base units (`1500wei`).
    #[clap(long)]
    pub amount_b: TokenAmount,

    /// `lowest`, `low`, `medium`, `high`, a bps value (`30`), a percentage
    /// (`0.3%`) or `default` for the AMM's default fee.
    #[clap(long, default_value = "default")]
    pub fee: FeeTier,

    /// Approve the maximum amount instead of the exact deposit.
    #[clap(long)]
    pub unlimited_approval: bool,

    /// Validate and print the pool without sending any transaction.
    #[clap(long)]
    pub dry_run: bool,

    /// Return right after submitting instead of waiting for confirmation.
    #[clap(long)]
    pub no_wait: bool,
}

pub fn duration_from_seconds(s: &str) -> Result<Duration> {
    let seconds: f64 = s.parse().context("timeout is not a number")?;
    Duration::try_from_secs_f64(seconds).context("timeout is not a valid duration")
}

pub fn parse_private_key(s: &str) -> Result<PrivateKeySigner> {
    s.trim()
        .parse()
        .context("private key is not a 32 byte hex string")
}

impl Arguments {
    pub fn amm_address(&self) -> Result<Address> {
        self.amm_address
            .context("--amm-address is required for commands that talk to the AMM")
    }
}

impl Display for LoggingArguments {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let Self {
            log_filter,
            log_stderr_threshold,
            use_json_logs,
        } = self;

        writeln!(f, "log_filter: {log_filter}")?;
        writeln!(f, "log_stderr_threshold: {log_stderr_threshold:?}")?;
        writeln!(f, "use_json_logs: {use_json_logs}")?;
        Ok(())
    }
}

impl Display for Arguments {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let Self {
            logging,
            node_url,
            amm_address,
            private_key,
            confirmations,
            confirmation_timeout,
            command,
        } = self;

        write!(f, "{logging}")?;
        writeln!(f, "node_url: {node_url}")?;
        writeln!(f, "amm_address: {amm_address:?}")?;
        writeln!(
            f,
            "private_key: {}",
            private_key
                .as_ref()
                .map(|signer| format!("SECRET (account {})", signer.address()))
                .unwrap_or_else(|| "None".to_owned())
        )?;
        writeln!(f, "confirmations: {confirmations}")?;
        writeln!(f, "confirmation_timeout: {confirmation_timeout:?}")?;
        writeln!(f, "command: {command:?}")?;
        Ok(())
    }
}
