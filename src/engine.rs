use {super::*, clap::ValueEnum};

mod initializer;
mod reorg;

/// How a block's transactions are submitted to the backend.
#[derive(Default, ValueEnum, Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Protocol {
  /// One `brc20_finaliseBlockWithTxes` call per block.
  #[default]
  Batched,
  /// One call per transaction, then `brc20_finaliseBlock`. Any failure once
  /// a transaction of the block was accepted is fatal.
  PerOperation,
}

impl Display for Protocol {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    match self {
      Self::Batched => write!(f, "batched"),
      Self::PerOperation => write!(f, "per-operation"),
    }
  }
}

impl FromStr for Protocol {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "batched" => Ok(Self::Batched),
      "per-operation" => Ok(Self::PerOperation),
      _ => bail!("invalid protocol `{s}`"),
    }
  }
}

/// One raw record of a source-chain block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockInscription {
  pub inscription: Value,
  pub btc_pkscript: String,
}

/// Drives inscriptions through decoding, submission and reconciliation.
///
/// The backend sits behind a mutex held for the whole submission phase of a
/// block, so requests to it never overlap.
pub struct Engine<B> {
  backend: Mutex<B>,
  pub builder: TransactionBuilder,
  pub context: Context,
  pub activation_height: u64,
  pub checkpoint_hash: B256,
  pub mine_batch_size: u64,
  pub protocol: Protocol,
}

impl Engine<RpcBackend> {
  pub fn from_settings(settings: &Settings) -> Result<Self> {
    Ok(Self::new(
      RpcBackend::new(settings.backend_url())?,
      TransactionBuilder::new(
        Box::new(Solc::new(settings.solc(), settings.evm_version())),
        settings.indexer_address(),
        settings.controller_address(),
      ),
      settings,
    ))
  }
}

impl<B: Backend> Engine<B> {
  pub fn new(backend: B, builder: TransactionBuilder, settings: &Settings) -> Self {
    Self {
      backend: Mutex::new(backend),
      builder,
      context: Context::new(settings.cache_size()),
      activation_height: settings.activation_height(),
      checkpoint_hash: settings.checkpoint_hash(),
      mine_batch_size: settings.mine_batch_size(),
      protocol: settings.protocol(),
    }
  }

  fn backend(&self) -> MutexGuard<B> {
    self.backend.lock().unwrap()
  }

  /// Processes the inscriptions of one source-chain block, in order, and
  /// returns one reconciliation per inscription.
  pub fn process_block(
    &self,
    header: BlockHeader,
    inscriptions: &[BlockInscription],
  ) -> Result<Vec<Reconciliation>, BridgeError> {
    let results = inscriptions
      .iter()
      .map(|inscription| {
        self
          .builder
          .process(&self.context, &inscription.inscription, &inscription.btc_pkscript)
      })
      .collect::<Vec<ProcessResult>>();

    let submitted = results
      .iter()
      .filter_map(|result| Some((result, result.transaction()?)))
      .collect::<Vec<(&ProcessResult, &Transaction)>>();

    let receipts = {
      let mut backend = self.backend();

      match self.protocol {
        Protocol::Batched => backend.finalise_block_with_txes(
          &header,
          &submitted
            .iter()
            .map(|(_, transaction)| *transaction)
            .collect::<Vec<&Transaction>>(),
        )?,
        Protocol::PerOperation => {
          let mut receipts = Vec::with_capacity(submitted.len());
          let mut tx_idx = 0;

          for (result, transaction) in &submitted {
            receipts.push(
              backend
                .submit(&header, tx_idx, result, transaction)
                .map_err(|err| Self::abandon(tx_idx, err))?,
            );
            tx_idx += 1;
          }

          backend
            .finalise_block(&header, tx_idx)
            .map_err(|err| Self::abandon(tx_idx, err))?;

          receipts
        }
      }
    };

    let submitted = submitted.len();

    if receipts.len() != submitted {
      return error::ReceiptCount {
        submitted,
        received: receipts.len(),
      }
      .fail();
    }

    log::info!(
      "finalised block {} with {submitted} of {} inscriptions",
      header.hash,
      results.len(),
    );

    let mut receipts = receipts.into_iter();

    results
      .into_iter()
      .map(|result| match result.outcome {
        Err(err) => {
          log::warn!(
            "{} inscription from `{}` rejected: {err}",
            result
              .kind
              .map(|kind| kind.to_string())
              .unwrap_or_else(|| "unknown".into()),
            result.sender,
          );
          Ok(Reconciliation::rejected(&result.sender, err))
        }
        Ok(_) => {
          let receipt = receipts.next().ok_or(BridgeError::ReceiptCount {
            submitted,
            received: 0,
          })?;
          let kind = result.kind.unwrap_or(OperationKind::Call);
          Reconciliation::classify(kind, &result.sender, receipt)
        }
      })
      .collect()
  }

  /// A failure after the backend accepted part of a block leaves that part
  /// pending, so it cannot be retried.
  fn abandon(submitted: u64, err: BridgeError) -> BridgeError {
    use snafu::IntoError;

    if submitted == 0 || err.is_fatal() {
      err
    } else {
      error::IncompleteBlock { submitted }.into_error(Box::new(err))
    }
  }

  pub fn current_height(&self) -> Result<u64, BridgeError> {
    self.backend().block_number()
  }

  pub fn block(&self, height: u64) -> Result<Value, BridgeError> {
    self.backend().block(height)
  }

  pub fn block_hash(&self, height: u64) -> Result<B256, BridgeError> {
    self.backend().block_hash(height)
  }

  pub fn commit(&self) -> Result<Value, BridgeError> {
    self.backend().commit()
  }

  pub fn contract_bytecode(&self, address: Address) -> Result<Value, BridgeError> {
    self.backend().contract_bytecode(address)
  }

  /// Balance of `ticker` held by the owner of `script`, as a decimal string.
  pub fn balance(&self, script: &str, ticker: &str) -> Result<String> {
    let transaction = self.builder.balance_call(&self.context, script, ticker)?;

    let response = self.backend().call(&transaction)?;

    let output = response["callOutput"]
      .as_str()
      .with_context(|| format!("call result has no `callOutput`: {response}"))?;

    let output = output.strip_prefix("0x").unwrap_or(output);

    if output.is_empty() {
      return Ok("0".into());
    }

    Ok(U256::from_str_radix(output, 16)?.to_string())
  }

  /// Read-only call of an arbitrary view function. Returns `None` if the
  /// request is malformed.
  pub fn call_view_function_as(
    &self,
    script: &str,
    contract: &Value,
    function: &Value,
    args: &Value,
  ) -> Result<Option<Value>> {
    let Some(contract) = contract.as_str().and_then(|c| c.parse::<Address>().ok()) else {
      return Ok(None);
    };

    let Some(transaction) =
      self
        .builder
        .view_call(&self.context, script, contract, function, args)?
    else {
      return Ok(None);
    };

    Ok(Some(self.backend().call(&transaction)?))
  }
}
