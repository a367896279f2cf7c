use super::*;

#[derive(Clone, Default, Debug, Parser)]
#[command(group(
  ArgGroup::new("chains")
    .required(false)
    .args(&["chain_argument", "signet", "regtest", "testnet"]),
))]
pub struct Options {
  #[arg(
    long,
    help = "Activate execution at source-chain height <ACTIVATION_HEIGHT>. [default: chain specific]"
  )]
  pub(crate) activation_height: Option<u64>,
  #[arg(
    long,
    help = "Connect to execution backend JSON-RPC at <BACKEND_URL>. [default: http://127.0.0.1:18545]"
  )]
  pub(crate) backend_url: Option<String>,
  #[arg(
    long,
    help = "Memoize up to <CACHE_SIZE> addresses and signatures per generation. [default: 100000]"
  )]
  pub(crate) cache_size: Option<usize>,
  #[arg(long = "chain", value_enum, help = "Use <CHAIN>. [default: mainnet]")]
  pub(crate) chain_argument: Option<Chain>,
  #[arg(
    long,
    help = "Require block hash <CHECKPOINT_HASH> at height `activation_height - 1`. [default: 0x00…00]"
  )]
  pub(crate) checkpoint_hash: Option<B256>,
  #[arg(long, help = "Load configuration from <CONFIG>.")]
  pub(crate) config: Option<PathBuf>,
  #[arg(long, help = "Load configuration from <CONFIG_DIR>.")]
  pub(crate) config_dir: Option<PathBuf>,
  #[arg(long, help = "Submit controller calls to <CONTROLLER_ADDRESS>.")]
  pub(crate) controller_address: Option<Address>,
  #[arg(long, help = "Compile contracts for <EVM_VERSION>. [default: berlin]")]
  pub(crate) evm_version: Option<String>,
  #[arg(long, short, help = "Specify output format. [default: json]")]
  pub(crate) format: Option<OutputFormat>,
  #[arg(long, help = "Send deposits and withdrawals from <INDEXER_ADDRESS>.")]
  pub(crate) indexer_address: Option<Address>,
  #[arg(
    long,
    help = "Mine at most <MINE_BATCH_SIZE> empty blocks per request during initialisation. [default: 1000]"
  )]
  pub(crate) mine_batch_size: Option<u64>,
  #[arg(
    long,
    value_enum,
    help = "Submit blocks using <PROTOCOL>. [default: batched]"
  )]
  pub(crate) protocol: Option<Protocol>,
  #[arg(long, short, help = "Use regtest. Equivalent to `--chain regtest`.")]
  pub(crate) regtest: bool,
  #[arg(long, short, help = "Use signet. Equivalent to `--chain signet`.")]
  pub(crate) signet: bool,
  #[arg(long, help = "Compile contracts with solc binary at <SOLC>. [default: solc]")]
  pub(crate) solc: Option<PathBuf>,
  #[arg(long, short, help = "Use testnet. Equivalent to `--chain testnet`.")]
  pub(crate) testnet: bool,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn chain_flags() {
    assert!(Options::try_parse_from(["ordevm", "-r"]).unwrap().regtest);
    assert_eq!(
      Options::try_parse_from(["ordevm", "--chain", "signet"])
        .unwrap()
        .chain_argument,
      Some(Chain::Signet)
    );
  }

  #[test]
  fn chain_flags_conflict() {
    assert!(Options::try_parse_from(["ordevm", "--regtest", "--chain", "signet"]).is_err());
    assert!(Options::try_parse_from(["ordevm", "-r", "-t"]).is_err());
  }

  #[test]
  fn typed_values() {
    let options = Options::try_parse_from([
      "ordevm",
      "--protocol",
      "per-operation",
      "--indexer-address",
      "0x0000000000000000000000000000000000003ca6",
      "--mine-batch-size",
      "400",
    ])
    .unwrap();

    assert_eq!(options.protocol, Some(Protocol::PerOperation));
    assert_eq!(options.mine_batch_size, Some(400));
    assert_eq!(
      options.indexer_address,
      Some(INDEXER.parse().unwrap())
    );
  }

  #[test]
  fn invalid_address() {
    assert!(Options::try_parse_from(["ordevm", "--controller-address", "0x12"]).is_err());
  }
}
