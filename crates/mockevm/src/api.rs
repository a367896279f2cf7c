use super::*;

#[doc(hidden)]
#[jsonrpc_derive::rpc(server)]
pub trait Api {
  #[rpc(name = "eth_blockNumber")]
  fn block_number(&self) -> Result<String, jsonrpc_core::Error>;

  #[rpc(name = "eth_getBlockByNumber", params = "raw")]
  fn get_block_by_number(&self, params: Params) -> Result<Value, jsonrpc_core::Error>;

  #[rpc(name = "brc20_mine", params = "raw")]
  fn mine(&self, params: Params) -> Result<Value, jsonrpc_core::Error>;

  #[rpc(name = "brc20_initialise", params = "raw")]
  fn initialise(&self, params: Params) -> Result<Value, jsonrpc_core::Error>;

  #[rpc(name = "brc20_finaliseBlockWithTxes", params = "raw")]
  fn finalise_block_with_txes(&self, params: Params) -> Result<Vec<Value>, jsonrpc_core::Error>;

  #[rpc(name = "brc20_deposit", params = "raw")]
  fn deposit(&self, params: Params) -> Result<Value, jsonrpc_core::Error>;

  #[rpc(name = "brc20_withdraw", params = "raw")]
  fn withdraw(&self, params: Params) -> Result<Value, jsonrpc_core::Error>;

  #[rpc(name = "brc20_deploy", params = "raw")]
  fn deploy(&self, params: Params) -> Result<Value, jsonrpc_core::Error>;

  #[rpc(name = "brc20_transact", params = "raw")]
  fn transact(&self, params: Params) -> Result<Value, jsonrpc_core::Error>;

  #[rpc(name = "brc20_finaliseBlock", params = "raw")]
  fn finalise_block(&self, params: Params) -> Result<Value, jsonrpc_core::Error>;

  #[rpc(name = "brc20_reorg", params = "raw")]
  fn reorg(&self, params: Params) -> Result<Value, jsonrpc_core::Error>;

  #[rpc(name = "brc20_commitToDatabase")]
  fn commit_to_database(&self) -> Result<Value, jsonrpc_core::Error>;

  #[rpc(name = "brc20_call", params = "raw")]
  fn call(&self, params: Params) -> Result<Value, jsonrpc_core::Error>;

  #[rpc(name = "get_contract_bytecode", params = "raw")]
  fn get_contract_bytecode(&self, params: Params) -> Result<Value, jsonrpc_core::Error>;
}
