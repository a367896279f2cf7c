use super::*;

pub mod rpc;

/// Identity of the source-chain block being finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlockHeader {
  pub timestamp: u64,
  pub hash: B256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Genesis {
  pub hash: B256,
  pub timestamp: u64,
  pub height: u64,
}

impl Default for Genesis {
  fn default() -> Self {
    Self {
      hash: B256::ZERO,
      timestamp: 0,
      height: 0,
    }
  }
}

/// The execution backend, reached through JSON-RPC.
///
/// Implementors provide `request`; the typed methods build the parameter
/// objects and validate results. Methods take `&mut self` so an owner holding
/// the backend behind a lock issues one request at a time.
pub trait Backend {
  fn request(&mut self, method: &str, params: Value) -> Result<Value, BridgeError>;

  fn block_number(&mut self) -> Result<u64, BridgeError> {
    let response = self.request("eth_blockNumber", Value::Null)?;
    parse_quantity(&response).ok_or_else(|| BridgeError::MalformedResponse {
      method: "eth_blockNumber".into(),
      message: format!("expected block height, got `{response}`"),
    })
  }

  fn block(&mut self, height: u64) -> Result<Value, BridgeError> {
    self.request(
      "eth_getBlockByNumber",
      json!({ "block": format!("{height:#x}") }),
    )
  }

  fn block_hash(&mut self, height: u64) -> Result<B256, BridgeError> {
    let block = self.block(height)?;
    block
      .get("hash")
      .and_then(Value::as_str)
      .and_then(|hash| hash.parse().ok())
      .ok_or_else(|| BridgeError::MalformedResponse {
        method: "eth_getBlockByNumber".into(),
        message: format!("block {height} has no valid hash: `{block}`"),
      })
  }

  fn mine(&mut self, block_count: u64, timestamp: u64) -> Result<(), BridgeError> {
    self.request(
      "brc20_mine",
      json!({
        "block_count": block_count,
        "timestamp": timestamp,
      }),
    )?;
    Ok(())
  }

  fn initialise(&mut self, genesis: &Genesis) -> Result<(), BridgeError> {
    self.request(
      "brc20_initialise",
      json!({
        "genesis_hash": genesis.hash,
        "genesis_timestamp": genesis.timestamp,
        "genesis_height": genesis.height,
      }),
    )?;
    Ok(())
  }

  /// Executes `transactions` as one block and returns their receipts.
  fn finalise_block_with_txes(
    &mut self,
    header: &BlockHeader,
    transactions: &[&Transaction],
  ) -> Result<Vec<Receipt>, BridgeError> {
    const METHOD: &str = "brc20_finaliseBlockWithTxes";

    let response = self.request(
      METHOD,
      json!({
        "timestamp": header.timestamp,
        "hash": header.hash,
        "txes": transactions,
      }),
    )?;

    serde_json::from_value(response).map_err(|err| BridgeError::MalformedResponse {
      method: METHOD.into(),
      message: format!("invalid receipts: {err}"),
    })
  }

  /// Submits one transaction of the block in progress.
  fn submit(
    &mut self,
    header: &BlockHeader,
    tx_idx: u64,
    result: &ProcessResult,
    transaction: &Transaction,
  ) -> Result<Receipt, BridgeError> {
    let mut params = Map::new();

    let method = match (result.kind, &result.transfer) {
      (Some(OperationKind::Deposit), Some(transfer)) => {
        params.insert("to_pkscript".into(), json!(result.sender));
        params.insert("ticker".into(), json!(transfer.ticker));
        params.insert("amount".into(), json!(transfer.amount.to_string()));
        "brc20_deposit"
      }
      (Some(OperationKind::Withdraw), Some(transfer)) => {
        params.insert("from_pkscript".into(), json!(result.sender));
        params.insert("ticker".into(), json!(transfer.ticker));
        params.insert("amount".into(), json!(transfer.amount.to_string()));
        "brc20_withdraw"
      }
      _ if transaction.to.is_none() => {
        params.insert("from_pkscript".into(), json!(result.sender));
        params.insert("data".into(), json!(transaction.data));
        "brc20_deploy"
      }
      _ => {
        params.insert("from_pkscript".into(), json!(result.sender));
        params.insert("contract_address".into(), json!(transaction.to));
        params.insert("data".into(), json!(transaction.data));
        "brc20_transact"
      }
    };

    params.insert("timestamp".into(), json!(header.timestamp));
    params.insert("hash".into(), json!(header.hash));
    params.insert("tx_idx".into(), json!(tx_idx));
    params.insert("inscription_id".into(), json!(result.inscription_id));

    let response = self.request(method, Value::Object(params))?;

    serde_json::from_value(response).map_err(|err| BridgeError::MalformedResponse {
      method: method.into(),
      message: format!("invalid receipt: {err}"),
    })
  }

  fn finalise_block(&mut self, header: &BlockHeader, block_tx_count: u64) -> Result<(), BridgeError> {
    self.request(
      "brc20_finaliseBlock",
      json!({
        "timestamp": header.timestamp,
        "hash": header.hash,
        "block_tx_count": block_tx_count,
      }),
    )?;
    Ok(())
  }

  fn reorg(&mut self, last_ok_height: u64) -> Result<Value, BridgeError> {
    self.request("brc20_reorg", json!({ "last_ok_height": last_ok_height }))
  }

  fn commit(&mut self) -> Result<Value, BridgeError> {
    self.request("brc20_commitToDatabase", Value::Null)
  }

  /// Read-only execution; never changes backend state.
  fn call(&mut self, transaction: &Transaction) -> Result<Value, BridgeError> {
    self.request("brc20_call", json!(transaction))
  }

  fn contract_bytecode(&mut self, address: Address) -> Result<Value, BridgeError> {
    self.request("get_contract_bytecode", json!({ "addr": address }))
  }
}

/// Parses a JSON-RPC quantity, either a `0x`-prefixed hex string or a
/// non-negative integer.
pub fn parse_quantity(value: &Value) -> Option<u64> {
  match value {
    Value::Number(n) => n.as_u64(),
    Value::String(s) => match s.strip_prefix("0x") {
      Some(hex) => u64::from_str_radix(hex, 16).ok(),
      None => s.parse().ok(),
    },
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use {super::*, pretty_assertions::assert_eq};

  #[test]
  fn quantities() {
    assert_eq!(parse_quantity(&json!("0x3e7")), Some(999));
    assert_eq!(parse_quantity(&json!(999)), Some(999));
    assert_eq!(parse_quantity(&json!("999")), Some(999));
    assert_eq!(parse_quantity(&json!("0xzz")), None);
    assert_eq!(parse_quantity(&json!(-1)), None);
    assert_eq!(parse_quantity(&json!(null)), None);
  }

  #[test]
  fn block_number() {
    let mut backend = StubBackend::default();
    backend.respond("eth_blockNumber", json!("0x10"));
    assert_eq!(backend.block_number().unwrap(), 16);

    backend.respond("eth_blockNumber", json!(true));
    assert!(backend.block_number().unwrap_err().is_fatal());
  }

  #[test]
  fn block_requested_by_hex_height() {
    let mut backend = StubBackend::default();
    backend.block(999).unwrap();
    assert_eq!(
      backend.calls(),
      [("eth_getBlockByNumber".to_string(), json!({"block": "0x3e7"}))]
    );
  }

  #[test]
  fn block_without_hash() {
    let mut backend = StubBackend::default();
    backend.respond("eth_getBlockByNumber", json!({"number": "0x1"}));
    assert!(matches!(
      backend.block_hash(1).unwrap_err(),
      BridgeError::MalformedResponse { .. }
    ));
  }

  #[test]
  fn finalise_block_with_txes_params() {
    let mut backend = StubBackend::default();
    let transaction = Transaction {
      from: Address::repeat_byte(1),
      to: None,
      data: Bytes::from(vec![0x60]),
    };

    let receipts = backend
      .finalise_block_with_txes(
        &BlockHeader {
          timestamp: 5,
          hash: B256::repeat_byte(2),
        },
        &[&transaction],
      )
      .unwrap();

    assert_eq!(receipts.len(), 1);

    let (method, params) = &backend.calls()[0];
    assert_eq!(method, "brc20_finaliseBlockWithTxes");
    assert_eq!(params["timestamp"], 5);
    assert_eq!(params["hash"], json!(B256::repeat_byte(2)));
    assert_eq!(params["txes"][0]["to"], Value::Null);
    assert_eq!(params["txes"][0]["data"], "0x60");
  }

  #[test]
  fn malformed_receipts() {
    let mut backend = StubBackend::default();
    backend.respond("brc20_finaliseBlockWithTxes", json!({"not": "a list"}));
    let err = backend
      .finalise_block_with_txes(
        &BlockHeader {
          timestamp: 0,
          hash: B256::ZERO,
        },
        &[],
      )
      .unwrap_err();
    assert!(err.is_fatal());
  }

  #[test]
  fn submit_selects_method_by_operation() {
    let mut backend = StubBackend::default();
    let header = BlockHeader {
      timestamp: 7,
      hash: B256::ZERO,
    };

    let deposit = builder().process(
      &Context::default(),
      &json!({"op": "deposit", "t": "ordi", "a": "10", "inscription_id": "i0"}),
      SENDER,
    );

    backend
      .submit(&header, 3, &deposit, deposit.transaction().unwrap())
      .unwrap();

    let call = builder().process(
      &Context::default(),
      &json!({"op": "call", "c": CONTRACT, "f": "getValue"}),
      SENDER,
    );

    backend
      .submit(&header, 4, &call, call.transaction().unwrap())
      .unwrap();

    let deploy = builder().process(
      &Context::default(),
      &json!({"op": "deploy2", "bc": "60"}),
      SENDER,
    );

    backend
      .submit(&header, 5, &deploy, deploy.transaction().unwrap())
      .unwrap();

    let calls = backend.calls();

    assert_eq!(calls[0].0, "brc20_deposit");
    assert_eq!(
      calls[0].1,
      json!({
        "to_pkscript": SENDER,
        "ticker": "ordi",
        "amount": "10",
        "timestamp": 7,
        "hash": B256::ZERO,
        "tx_idx": 3,
        "inscription_id": "i0",
      })
    );

    assert_eq!(calls[1].0, "brc20_transact");
    assert_eq!(calls[1].1["contract_address"], json!(CONTRACT.parse::<Address>().unwrap()));
    assert_eq!(calls[1].1["data"], "0x20965255");
    assert_eq!(calls[1].1["inscription_id"], Value::Null);

    assert_eq!(calls[2].0, "brc20_deploy");
    assert_eq!(calls[2].1["data"], "0x60");
    assert_eq!(calls[2].1["tx_idx"], 5);
  }

  #[test]
  fn genesis_params() {
    let mut backend = StubBackend::default();
    backend.initialise(&Genesis::default()).unwrap();
    assert_eq!(
      backend.calls()[0].1,
      json!({
        "genesis_hash": B256::ZERO,
        "genesis_timestamp": 0,
        "genesis_height": 0,
      })
    );
  }
}
