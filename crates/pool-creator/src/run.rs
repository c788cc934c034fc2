use {
    crate::{
        amm::Amm,
        arguments::{Arguments, Command, CreatePoolArguments},
        pool_service::{CreatePoolRequest, PoolCreator},
        tokens,
        traits::{Confirmation, PoolChain},
    },
    anyhow::{Context, Result},
    clap::Parser,
    std::process::ExitCode,
};

const LABEL: &str = "pool-creator";

pub async fn start(args: impl Iterator<Item = String>) -> ExitCode {
    let args = Arguments::parse_from(args);
    let obs_config = observe::Config::new(
        args.logging.log_filter.as_str(),
        args.logging.log_stderr_threshold,
        args.logging.use_json_logs,
    );
    observe::tracing::initialize(&obs_config);
    tracing::info!("running pool-creator with validated arguments:\n{}", args);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(?err, "pool-creator failed");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Assumes tracing has already been set up.
pub async fn run(args: Arguments) -> Result<()> {
    match &args.command {
        Command::Normalize { address } => {
            let address = tokens::normalize_address(address)?;
            println!("{}", tokens::checksummed(&address));
        }
        Command::Sort { token_a, token_b } => {
            let pair = tokens::sort_token_strings(token_a, token_b)?;
            println!(
                "{}\n{}",
                tokens::checksummed(&pair.token0()),
                tokens::checksummed(&pair.token1())
            );
        }
        Command::DefaultFee => {
            let provider = ethrpc::provider(&args.node_url, LABEL);
            let amm = Amm::new(provider, args.amm_address()?, None);
            let fee = amm.default_fee_bps().await?;
            println!("{fee}");
        }
        Command::CreatePool(create) => create_pool(&args, create).await?,
    }
    Ok(())
}

async fn create_pool(args: &Arguments, create: &CreatePoolArguments) -> Result<()> {
    let signer = args
        .private_key
        .clone()
        .context("--private-key is required to create a pool")?;
    let owner = signer.address();
    let provider = ethrpc::provider_with_signer(&args.node_url, LABEL, signer);
    let amm = Amm::new(provider, args.amm_address()?, Some(owner));
    let creator = PoolCreator::new(
        amm,
        Confirmation {
            confirmations: args.confirmations,
            timeout: args.confirmation_timeout,
        },
    )
    .with_unlimited_approval(create.unlimited_approval);

    let request = CreatePoolRequest {
        token_a: create.token_a.clone(),
        amount_a: create.amount_a.clone(),
        token_b: create.token_b.clone(),
        amount_b: create.amount_b.clone(),
        fee: create.fee,
    };
    let prepared = creator.prepare(&request).await?;
    println!("{prepared}");
    if create.dry_run {
        println!("dry run, no transactions sent");
        return Ok(());
    }

    let tx = creator.create_pool(&prepared).await?;
    println!("submitted pool creation: {tx}");
    if create.no_wait {
        return Ok(());
    }

    let receipt = creator.confirm(tx).await?;
    match receipt.pool {
        Some(pool) => println!("pool created at {}", tokens::checksummed(&pool)),
        None => println!("pool creation confirmed, AMM emitted no PoolCreated event"),
    }
    if let Some(block) = receipt.block_number {
        println!("block: {block}, gas used: {}", receipt.gas_used);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(command: &[&str]) -> Arguments {
        Arguments::try_parse_from(std::iter::once("pool-creator").chain(command.iter().copied()))
            .unwrap()
    }

    #[tokio::test]
    async fn offline_commands() {
        run(args(&["normalize", "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"]))
            .await
            .unwrap();
        run(args(&[
            "sort",
            "0x2000000000000000000000000000000000000000",
            "0x1000000000000000000000000000000000000000",
        ]))
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn offline_commands_reject_bad_input() {
        assert!(run(args(&["normalize", "0x1234"])).await.is_err());
        assert!(
            run(args(&[
                "sort",
                "0x1000000000000000000000000000000000000000",
                "0x1000000000000000000000000000000000000000",
            ]))
            .await
            .is_err()
        );
    }
}
