use super::*;

/// Contents of `ordevm.yaml`.
#[derive(Deserialize, Default, PartialEq, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct Config {
  pub(crate) activation_height: Option<u64>,
  pub(crate) backend_url: Option<String>,
  pub(crate) cache_size: Option<usize>,
  pub(crate) chain: Option<Chain>,
  pub(crate) checkpoint_hash: Option<B256>,
  pub(crate) controller_address: Option<Address>,
  pub(crate) evm_version: Option<String>,
  pub(crate) indexer_address: Option<Address>,
  pub(crate) mine_batch_size: Option<u64>,
  pub(crate) protocol: Option<Protocol>,
  pub(crate) solc: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn example_config_file_is_valid() {
    let config = serde_yaml::from_str::<Config>(
      "
chain: regtest
backend_url: http://localhost:18545
mine_batch_size: 400
protocol: per-operation
controller_address: '0xc54dd4581af2dbf18e4d90840226756e9d2b3cdb'
checkpoint_hash: '0x0000000000000000000000000000000000000000000000000000000000000000'
",
    )
    .unwrap();

    assert_eq!(config.chain, Some(Chain::Regtest));
    assert_eq!(config.mine_batch_size, Some(400));
    assert_eq!(config.protocol, Some(Protocol::PerOperation));
    assert_eq!(config.controller_address, Some(CONTROLLER.parse().unwrap()));
    assert_eq!(config.checkpoint_hash, Some(B256::ZERO));
  }

  #[test]
  fn unknown_fields_are_rejected() {
    assert!(serde_yaml::from_str::<Config>("hidden: []").is_err());
  }
}
