use {super::*, clap::ValueEnum};

#[derive(Default, ValueEnum, Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Chain {
  #[default]
  #[value(alias("main"))]
  Mainnet,
  #[value(alias("test"))]
  Testnet,
  Signet,
  Regtest,
}

impl Chain {
  pub fn network(self) -> bitcoin::Network {
    match self {
      Self::Mainnet => bitcoin::Network::Bitcoin,
      Self::Testnet => bitcoin::Network::Testnet,
      Self::Signet => bitcoin::Network::Signet,
      Self::Regtest => bitcoin::Network::Regtest,
    }
  }

  /// First source-chain height whose inscriptions are executed.
  pub fn activation_height(self) -> u64 {
    match self {
      Self::Mainnet => 779_832,
      Self::Testnet => 2_413_343,
      Self::Signet => 112_402,
      Self::Regtest => 1,
    }
  }

  /// Expected backend block hash at `activation_height - 1`. Empty blocks
  /// mined before activation all carry the zero hash.
  pub fn checkpoint_hash(self) -> B256 {
    B256::ZERO
  }
}

impl Display for Chain {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(
      f,
      "{}",
      match self {
        Self::Mainnet => "mainnet",
        Self::Regtest => "regtest",
        Self::Signet => "signet",
        Self::Testnet => "testnet",
      }
    )
  }
}

impl FromStr for Chain {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "mainnet" | "main" => Ok(Self::Mainnet),
      "regtest" => Ok(Self::Regtest),
      "signet" => Ok(Self::Signet),
      "testnet" | "test" => Ok(Self::Testnet),
      _ => bail!("invalid chain `{s}`"),
    }
  }
}
