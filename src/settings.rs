use super::*;

/// Resolved configuration. Each value comes from the first of: command line
/// flag, `ORDEVM_*` environment variable, config file, default.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
  activation_height: u64,
  backend_url: String,
  cache_size: usize,
  chain: Chain,
  checkpoint_hash: B256,
  controller_address: Address,
  evm_version: String,
  indexer_address: Address,
  mine_batch_size: u64,
  protocol: Protocol,
  solc: PathBuf,
}

impl Default for Settings {
  fn default() -> Self {
    let chain = Chain::default();

    Self {
      activation_height: chain.activation_height(),
      backend_url: Self::DEFAULT_BACKEND_URL.into(),
      cache_size: Self::DEFAULT_CACHE_SIZE,
      chain,
      checkpoint_hash: chain.checkpoint_hash(),
      controller_address: Self::DEFAULT_CONTROLLER_ADDRESS,
      evm_version: Self::DEFAULT_EVM_VERSION.into(),
      indexer_address: Self::DEFAULT_INDEXER_ADDRESS,
      mine_batch_size: Self::DEFAULT_MINE_BATCH_SIZE,
      protocol: Protocol::default(),
      solc: "solc".into(),
    }
  }
}

impl Settings {
  pub const DEFAULT_BACKEND_URL: &'static str = "http://127.0.0.1:18545";
  pub const DEFAULT_CACHE_SIZE: usize = 100_000;
  pub const DEFAULT_CONTROLLER_ADDRESS: Address =
    alloy_primitives::address!("c54dd4581af2dbf18e4d90840226756e9d2b3cdb");
  pub const DEFAULT_EVM_VERSION: &'static str = "berlin";
  pub const DEFAULT_INDEXER_ADDRESS: Address =
    alloy_primitives::address!("0000000000000000000000000000000000003ca6");
  pub const DEFAULT_MINE_BATCH_SIZE: u64 = 1000;

  pub fn load(options: Options) -> Result<Self> {
    let config = Self::config(&options)?;

    let chain = Self::setting_typed(
      options
        .signet
        .then_some(Chain::Signet)
        .or(options.regtest.then_some(Chain::Regtest))
        .or(options.testnet.then_some(Chain::Testnet))
        .or(options.chain_argument),
      Some("CHAIN"),
      config.chain,
      Chain::default(),
    )?;

    Ok(Self {
      activation_height: Self::setting_typed(
        options.activation_height,
        Some("ACTIVATION_HEIGHT"),
        config.activation_height,
        chain.activation_height(),
      )?,
      backend_url: Self::setting(
        options.backend_url.as_deref(),
        Some("BACKEND_URL"),
        config.backend_url.as_deref(),
        Some(Self::DEFAULT_BACKEND_URL),
      )?
      .unwrap_or_default(),
      cache_size: Self::setting_typed(
        options.cache_size,
        Some("CACHE_SIZE"),
        config.cache_size,
        Self::DEFAULT_CACHE_SIZE,
      )?,
      chain,
      checkpoint_hash: Self::setting_typed(
        options.checkpoint_hash,
        Some("CHECKPOINT_HASH"),
        config.checkpoint_hash,
        chain.checkpoint_hash(),
      )?,
      controller_address: Self::setting_typed(
        options.controller_address,
        Some("CONTROLLER_ADDRESS"),
        config.controller_address,
        Self::DEFAULT_CONTROLLER_ADDRESS,
      )?,
      evm_version: Self::setting(
        options.evm_version.as_deref(),
        Some("EVM_VERSION"),
        config.evm_version.as_deref(),
        Some(Self::DEFAULT_EVM_VERSION),
      )?
      .unwrap_or_default(),
      indexer_address: Self::setting_typed(
        options.indexer_address,
        Some("INDEXER_ADDRESS"),
        config.indexer_address,
        Self::DEFAULT_INDEXER_ADDRESS,
      )?,
      mine_batch_size: Self::setting_typed(
        options.mine_batch_size,
        Some("MINE_BATCH_SIZE"),
        config.mine_batch_size,
        Self::DEFAULT_MINE_BATCH_SIZE,
      )?,
      protocol: Self::setting_typed(
        options.protocol,
        Some("PROTOCOL"),
        config.protocol,
        Protocol::default(),
      )?,
      solc: Self::setting_typed(
        options.solc,
        Some("SOLC"),
        config.solc,
        "solc".into(),
      )?,
    })
  }

  fn config(options: &Options) -> Result<Config> {
    let path = match (&options.config, &options.config_dir) {
      (Some(path), _) => path.clone(),
      (None, Some(dir)) if dir.join("ordevm.yaml").exists() => dir.join("ordevm.yaml"),
      _ => return Ok(Config::default()),
    };

    serde_yaml::from_reader(File::open(&path).snafu_context(error::Io { path: &path })?)
      .with_context(|| format!("failed to parse config `{}`", path.display()))
  }

  fn setting_typed<T>(
    arg_value: Option<T>,
    env_key: Option<&str>,
    config_value: Option<T>,
    default_value: T,
  ) -> Result<T>
  where
    T: FromStr,
    T::Err: Into<Error>,
  {
    if let Some(arg_value) = arg_value {
      return Ok(arg_value);
    }

    if let Some(env_key) = env_key {
      let key = format!("ORDEVM_{env_key}");
      match env::var(&key) {
        Ok(env_value) => {
          return env_value
            .parse()
            .map_err(Into::<Error>::into)
            .with_context(|| format!("failed to parse `{key}`"))
        }
        Err(env::VarError::NotUnicode(value)) => {
          return Err(
            SnafuError::EnvVarUnicode {
              backtrace: Backtrace::capture(),
              value,
              variable: key,
            }
            .into(),
          )
        }
        Err(env::VarError::NotPresent) => {}
      }
    }

    Ok(config_value.unwrap_or(default_value))
  }

  fn setting(
    arg_value: Option<&str>,
    env_key: Option<&str>,
    config_value: Option<&str>,
    default_value: Option<&str>,
  ) -> Result<Option<String>> {
    if let Some(arg_value) = arg_value {
      return Ok(Some(arg_value.into()));
    }

    if let Some(env_key) = env_key {
      match env::var(format!("ORDEVM_{env_key}")) {
        Ok(env_value) => return Ok(Some(env_value)),
        Err(err @ env::VarError::NotUnicode(_)) => return Err(err.into()),
        Err(env::VarError::NotPresent) => {}
      }
    }

    Ok(config_value.or(default_value).map(str::to_string))
  }

  pub fn activation_height(&self) -> u64 {
    self.activation_height
  }

  pub fn backend_url(&self) -> &str {
    &self.backend_url
  }

  pub fn cache_size(&self) -> usize {
    self.cache_size
  }

  pub fn chain(&self) -> Chain {
    self.chain
  }

  pub fn checkpoint_hash(&self) -> B256 {
    self.checkpoint_hash
  }

  pub fn controller_address(&self) -> Address {
    self.controller_address
  }

  pub fn evm_version(&self) -> &str {
    &self.evm_version
  }

  pub fn indexer_address(&self) -> Address {
    self.indexer_address
  }

  pub fn mine_batch_size(&self) -> u64 {
    self.mine_batch_size
  }

  pub fn protocol(&self) -> Protocol {
    self.protocol
  }

  pub fn solc(&self) -> &Path {
    &self.solc
  }
}

#[cfg(test)]
mod tests {
  use {
    super::*,
    pretty_assertions::assert_eq,
    std::{fs, iter},
  };

  fn settings(args: &[&str]) -> Settings {
    Settings::load(
      Options::try_parse_from(iter::once("ordevm").chain(args.iter().copied())).unwrap(),
    )
    .unwrap()
  }

  #[test]
  fn defaults() {
    let settings = settings(&[]);
    assert_eq!(settings.chain(), Chain::Mainnet);
    assert_eq!(settings.activation_height(), 779_832);
    assert_eq!(settings.checkpoint_hash(), B256::ZERO);
    assert_eq!(settings.mine_batch_size(), 1000);
    assert_eq!(settings.evm_version(), "berlin");
    assert_eq!(settings.protocol(), Protocol::Batched);
    assert_eq!(settings.indexer_address(), INDEXER.parse::<Address>().unwrap());
    assert_eq!(
      settings.controller_address(),
      CONTROLLER.parse::<Address>().unwrap()
    );
    assert_eq!(settings, Settings::default());
  }

  #[test]
  fn chain_selects_activation_height() {
    assert_eq!(settings(&["--regtest"]).activation_height(), 1);
    assert_eq!(settings(&["--chain", "signet"]).activation_height(), 112_402);
  }

  #[test]
  fn flag_overrides_chain_default() {
    assert_eq!(
      settings(&["--regtest", "--activation-height", "1000"]).activation_height(),
      1000
    );
  }

  #[test]
  fn config_file() {
    let tempdir = tempfile::TempDir::new().unwrap();
    let path = tempdir.path().join("ordevm.yaml");
    fs::write(&path, "chain: regtest\nmine_batch_size: 7\nevm_version: cancun\n").unwrap();

    let from_file = settings(&["--config", path.to_str().unwrap()]);
    assert_eq!(from_file.chain(), Chain::Regtest);
    assert_eq!(from_file.mine_batch_size(), 7);
    assert_eq!(from_file.evm_version(), "cancun");

    assert_eq!(
      settings(&["--config-dir", tempdir.path().to_str().unwrap()]).mine_batch_size(),
      7
    );
  }

  #[test]
  fn flags_override_config_file() {
    let tempdir = tempfile::TempDir::new().unwrap();
    let path = tempdir.path().join("ordevm.yaml");
    fs::write(&path, "mine_batch_size: 7\n").unwrap();

    assert_eq!(
      settings(&[
        "--config",
        path.to_str().unwrap(),
        "--mine-batch-size",
        "9"
      ])
      .mine_batch_size(),
      9
    );
  }

  #[test]
  fn missing_config_dir_file_uses_defaults() {
    let tempdir = tempfile::TempDir::new().unwrap();
    assert_eq!(
      settings(&["--config-dir", tempdir.path().to_str().unwrap()]),
      Settings::default()
    );
  }

  #[test]
  fn missing_config_file_is_an_error() {
    assert!(Settings::load(
      Options::try_parse_from(["ordevm", "--config", "/nonexistent/ordevm.yaml"]).unwrap()
    )
    .is_err());
  }

  #[test]
  fn setting() {
    assert_eq!(Settings::setting(None, None, None, None).unwrap(), None);

    assert_eq!(
      Settings::setting(None, None, None, Some("foo")).unwrap(),
      Some("foo".into())
    );

    assert_eq!(
      Settings::setting(None, None, Some("bar"), Some("foo")).unwrap(),
      Some("bar".into())
    );

    assert_eq!(
      Settings::setting(Some("qux"), None, Some("bar"), Some("foo")).unwrap(),
      Some("qux".into())
    );
  }

  #[test]
  fn setting_typed() {
    assert_eq!(
      Settings::setting_typed::<u64>(None, None, None, 1).unwrap(),
      1
    );
    assert_eq!(
      Settings::setting_typed::<u64>(None, None, Some(2), 1).unwrap(),
      2
    );
    assert_eq!(
      Settings::setting_typed::<u64>(Some(3), None, Some(2), 1).unwrap(),
      3
    );
  }
}
