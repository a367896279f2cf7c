use {super::*, bitcoin::address::NetworkUnchecked};

#[derive(Debug, Parser)]
pub(crate) struct Derive {
  #[arg(help = "Derive the execution address owned by <SCRIPT>, a hex pkscript or a bitcoin address.")]
  script: String,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Output {
  pub pkscript: String,
  pub address: Address,
}

impl Derive {
  pub(crate) fn run(self, settings: Settings) -> SubcommandResult {
    let pkscript = self.pkscript(settings.chain())?;

    Ok(Some(Box::new(Output {
      address: address::derive(&pkscript)?,
      pkscript,
    })))
  }

  fn pkscript(&self, chain: Chain) -> Result<String> {
    if !re::BITCOIN_ADDRESS.is_match(&self.script) {
      return Ok(self.script.to_lowercase());
    }

    let address = self
      .script
      .parse::<bitcoin::Address<NetworkUnchecked>>()?
      .require_network(chain.network())
      .with_context(|| format!("`{}` is not a {chain} address", self.script))?;

    Ok(hex::encode(address.script_pubkey().as_bytes()))
  }
}
