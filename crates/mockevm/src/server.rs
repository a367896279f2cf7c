use super::*;

#[derive(Deserialize)]
struct BlockParams {
  block: String,
}

#[derive(Deserialize)]
struct MineParams {
  block_count: u64,
  timestamp: u64,
}

#[derive(Deserialize)]
struct GenesisParams {
  genesis_hash: String,
  genesis_timestamp: u64,
  genesis_height: u64,
}

#[derive(Deserialize)]
struct Transaction {
  from: String,
  to: Option<String>,
  data: String,
}

#[derive(Deserialize)]
struct BlockWithTxesParams {
  timestamp: u64,
  hash: String,
  txes: Vec<Transaction>,
}

#[derive(Deserialize)]
struct OperationParams {
  #[serde(alias = "to_pkscript")]
  from_pkscript: String,
  contract_address: Option<String>,
  tx_idx: u64,
}

#[derive(Deserialize)]
struct FinaliseParams {
  timestamp: u64,
  hash: String,
  block_tx_count: u64,
}

#[derive(Deserialize)]
struct ReorgParams {
  last_ok_height: u64,
}

#[derive(Deserialize)]
struct AddressParams {
  addr: String,
}

pub(crate) struct Server {
  pub(crate) state: Arc<Mutex<State>>,
}

impl Server {
  pub(crate) fn new(state: Arc<Mutex<State>>) -> Self {
    Self { state }
  }

  /// Records the request and returns the state, or the configured failure.
  fn request(
    &self,
    method: &str,
    params: &Params,
  ) -> Result<MutexGuard<State>, jsonrpc_core::Error> {
    let mut state = self.state.lock().unwrap();

    state
      .calls
      .push((method.into(), Value::from(params.clone())));

    if let Some((code, message)) = state.failures.get(method) {
      return Err(jsonrpc_core::Error {
        code: jsonrpc_core::ErrorCode::ServerError(*code),
        message: message.clone(),
        data: None,
      });
    }

    Ok(state)
  }

  fn quantity(value: &str) -> Result<u64, jsonrpc_core::Error> {
    value
      .strip_prefix("0x")
      .and_then(|hex| u64::from_str_radix(hex, 16).ok())
      .ok_or_else(|| jsonrpc_core::Error::invalid_params(format!("invalid quantity `{value}`")))
  }

  fn operation(
    &self,
    method: &str,
    params: Params,
    to: Option<&str>,
  ) -> Result<Value, jsonrpc_core::Error> {
    let mut state = self.request(method, &params)?;
    let operation = params.parse::<OperationParams>()?;

    let to = to.or(operation.contract_address.as_deref());
    let receipt = state.receipt(&operation.from_pkscript, to, operation.tx_idx);
    state.pending += 1;

    Ok(receipt)
  }
}

impl Api for Server {
  fn block_number(&self) -> Result<String, jsonrpc_core::Error> {
    let state = self.request("eth_blockNumber", &Params::None)?;
    Ok(format!("{:#x}", state.height))
  }

  fn get_block_by_number(&self, params: Params) -> Result<Value, jsonrpc_core::Error> {
    let state = self.request("eth_getBlockByNumber", &params)?;
    let height = Self::quantity(&params.parse::<BlockParams>()?.block)?;
    Ok(state.block(height).unwrap_or(Value::Null))
  }

  fn mine(&self, params: Params) -> Result<Value, jsonrpc_core::Error> {
    let mut state = self.request("brc20_mine", &params)?;
    let mine = params.parse::<MineParams>()?;
    state.mine(mine.block_count, mine.timestamp);
    Ok(Value::Null)
  }

  fn initialise(&self, params: Params) -> Result<Value, jsonrpc_core::Error> {
    let mut state = self.request("brc20_initialise", &params)?;
    let genesis = params.parse::<GenesisParams>()?;

    state.hashes.insert(genesis.genesis_height, genesis.genesis_hash.clone());
    state
      .timestamps
      .insert(genesis.genesis_height, genesis.genesis_timestamp);
    state.genesis = Some(json!({
      "hash": genesis.genesis_hash,
      "timestamp": genesis.genesis_timestamp,
      "height": genesis.genesis_height,
    }));

    Ok(Value::Null)
  }

  fn finalise_block_with_txes(&self, params: Params) -> Result<Vec<Value>, jsonrpc_core::Error> {
    let mut state = self.request("brc20_finaliseBlockWithTxes", &params)?;
    let block = params.parse::<BlockWithTxesParams>()?;

    let receipts = block
      .txes
      .iter()
      .zip(0..)
      .map(|(tx, index)| {
        if !tx.data.starts_with("0x") {
          return Err(jsonrpc_core::Error::invalid_params("data must be hex"));
        }
        Ok(state.receipt(&tx.from, tx.to.as_deref(), index))
      })
      .collect::<Result<Vec<Value>, jsonrpc_core::Error>>()?;

    state.finalise(block.timestamp, &block.hash);

    Ok(receipts)
  }

  fn deposit(&self, params: Params) -> Result<Value, jsonrpc_core::Error> {
    self.operation("brc20_deposit", params, Some(CONTROLLER))
  }

  fn withdraw(&self, params: Params) -> Result<Value, jsonrpc_core::Error> {
    self.operation("brc20_withdraw", params, Some(CONTROLLER))
  }

  fn deploy(&self, params: Params) -> Result<Value, jsonrpc_core::Error> {
    self.operation("brc20_deploy", params, None)
  }

  fn transact(&self, params: Params) -> Result<Value, jsonrpc_core::Error> {
    self.operation("brc20_transact", params, None)
  }

  fn finalise_block(&self, params: Params) -> Result<Value, jsonrpc_core::Error> {
    let mut state = self.request("brc20_finaliseBlock", &params)?;
    let block = params.parse::<FinaliseParams>()?;

    if block.block_tx_count != state.pending {
      return Err(jsonrpc_core::Error::invalid_params(format!(
        "block_tx_count is {} but {} transactions are pending",
        block.block_tx_count, state.pending
      )));
    }

    state.finalise(block.timestamp, &block.hash);

    Ok(Value::Null)
  }

  fn reorg(&self, params: Params) -> Result<Value, jsonrpc_core::Error> {
    let mut state = self.request("brc20_reorg", &params)?;
    let reorg = params.parse::<ReorgParams>()?;
    Ok(state.reorg(reorg.last_ok_height))
  }

  fn commit_to_database(&self) -> Result<Value, jsonrpc_core::Error> {
    let mut state = self.request("brc20_commitToDatabase", &Params::None)?;
    state.commits += 1;
    Ok(Value::Null)
  }

  fn call(&self, params: Params) -> Result<Value, jsonrpc_core::Error> {
    let state = self.request("brc20_call", &params)?;
    params.parse::<Transaction>()?;
    Ok(json!({
      "callOutput": state.call_output,
      "gasUsed": "0x5208",
      "txResult": "Success",
    }))
  }

  fn get_contract_bytecode(&self, params: Params) -> Result<Value, jsonrpc_core::Error> {
    let state = self.request("get_contract_bytecode", &params)?;
    let address = params.parse::<AddressParams>()?.addr.to_lowercase();
    Ok(Value::String(
      state
        .bytecode
        .get(&address)
        .cloned()
        .unwrap_or_else(|| "0x".into()),
    ))
  }
}
