//! rewarder-list CLI: fetch, build, compile-config.

use clap::{Parser, Subcommand};
use rewarder_list::build::{build_token_list, build_tvl, TokenListInputs};
use rewarder_list::chain::{Fetcher, Network};
use rewarder_list::output::{to_sorted_pretty, NetworkWriter};
use rewarder_list::quarry::{reconcile, KnownRewarders};
use rewarder_list::tokens::{fetch_token_lists, TokenResolver, TOKEN_LIST_URLS};
use std::path::{Path, PathBuf};
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();
    let cli = Cli::parse();
    match cli.command {
        Command::Fetch(args) => run_fetch(args),
        Command::Build(args) => run_build(args),
        Command::CompileConfig(args) => run_compile_config(args),
    }
}

#[derive(Parser)]
#[command(name = "rewarder-list")]
#[command(about = "Derive Quarry rewarder directories, token lists, and TVL summaries")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch on-chain state and write the raw rewarder artifacts for one network.
    Fetch(FetchArgs),
    /// Run the full pipeline (chain + token lists) for one or all networks.
    Build(BuildArgs),
    /// Compile Rewarders.toml into config/rewarder-list.json.
    CompileConfig(CompileConfigArgs),
}

#[derive(Parser)]
struct FetchArgs {
    #[arg(long)]
    network: Network,
    #[arg(long, default_value = "./data")]
    data_dir: PathBuf,
    /// Alternate Rewarders.toml; the bundled table is used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser)]
struct BuildArgs {
    /// Target network; every network when omitted.
    #[arg(long)]
    network: Option<Network>,
    #[arg(long, default_value = "./data")]
    data_dir: PathBuf,
    /// Alternate Rewarders.toml; the bundled table is used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser)]
struct CompileConfigArgs {
    #[arg(long, default_value = "./Rewarders.toml")]
    toml: PathBuf,
    #[arg(long, default_value = "./config/rewarder-list.json")]
    out: PathBuf,
}

fn load_known(config: Option<&Path>) -> Result<KnownRewarders, Box<dyn std::error::Error>> {
    match config {
        Some(path) => Ok(KnownRewarders::load_from_path(path)?),
        None => Ok(KnownRewarders::load()),
    }
}

fn run_fetch(args: FetchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let known = load_known(args.config.as_deref())?;
    let fetcher = Fetcher::new(args.network);
    let rt = tokio::runtime::Runtime::new()?;
    let reconciled = rt.block_on(async {
        let state = fetcher.fetch_program_state().await?;
        // chain-only run: no token lists, decimals come from mint accounts
        let resolver = TokenResolver::default();
        let decimals = fetcher
            .fetch_missing_mint_decimals(&state, &resolver, &[])
            .await?;
        Ok::<_, Box<dyn std::error::Error>>(reconcile(&state, &resolver, &decimals)?)
    })?;
    let writer = NetworkWriter::new(&args.data_dir, args.network);
    writer.write_rewarders(&reconciled, &known.for_network(args.network))?;
    info!(network = %args.network, "fetch complete");
    Ok(())
}

fn run_build(args: BuildArgs) -> Result<(), Box<dyn std::error::Error>> {
    let known = load_known(args.config.as_deref())?;
    let networks = match args.network {
        Some(network) => vec![network],
        None => Network::ALL.to_vec(),
    };
    let rt = tokio::runtime::Runtime::new()?;
    for network in networks {
        rt.block_on(build_network(network, &known, &args.data_dir))?;
        info!(%network, "build complete");
    }
    Ok(())
}

async fn build_network(
    network: Network,
    known: &KnownRewarders,
    data_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let fetcher = Fetcher::new(network);
    let (state, lists) = tokio::try_join!(
        async {
            fetcher
                .fetch_program_state()
                .await
                .map_err(Box::<dyn std::error::Error>::from)
        },
        async {
            fetch_token_lists(TOKEN_LIST_URLS)
                .await
                .map_err(Box::<dyn std::error::Error>::from)
        },
    )?;

    let resolver = TokenResolver::build(&lists, network.chain_id());
    let known_net = known.for_network(network);
    let redeemer_underlyings: Vec<String> = known_net
        .iter()
        .filter_map(|info| info.redeemer.as_ref())
        .map(|redeemer| redeemer.underlying_token.clone())
        .collect();
    let chain_decimals = fetcher
        .fetch_missing_mint_decimals(&state, &resolver, &redeemer_underlyings)
        .await?;

    let reconciled = reconcile(&state, &resolver, &chain_decimals)?;
    let token_list = build_token_list(&TokenListInputs {
        network,
        lists: &lists,
        resolver: &resolver,
        rewarders: &reconciled.rewarders,
        rewarders_by_mint: &reconciled.rewarders_by_mint,
        known: &known_net,
        chain_decimals: &chain_decimals,
    })?;
    let tvl = build_tvl(&reconciled.rewarders);

    // every fetch and join succeeded; only now touch the filesystem
    let writer = NetworkWriter::new(data_dir, network);
    writer.write_rewarders(&reconciled, &known_net)?;
    writer.write_token_list(&token_list)?;
    writer.write_tvl(&tvl)?;
    Ok(())
}

fn run_compile_config(args: CompileConfigArgs) -> Result<(), Box<dyn std::error::Error>> {
    let known = KnownRewarders::load_from_path(&args.toml)?;
    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&args.out, to_sorted_pretty(&known)?)?;
    println!(
        "Wrote {} rewarders to {}",
        known.rewarders.len(),
        args.out.display()
    );
    Ok(())
}
