use {
  self::error::{ServerError, ServerResult},
  super::*,
  axum::{
    extract::{
      rejection::{JsonRejection, QueryRejection},
      Extension, Json, Query,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
  },
  axum_server::Handle,
  serde_json::value::RawValue,
};

mod error;

type SharedEngine = Arc<Engine<RpcBackend>>;

#[derive(Deserialize)]
struct MineBlock {
  ts: Value,
  hash: B256,
  txes: Vec<BlockInscription>,
}

#[derive(Deserialize)]
struct CheckBalance {
  btc_addr: String,
  ticker: String,
}

#[derive(Deserialize)]
struct ViewCall {
  btc_addr: String,
  #[serde(default)]
  contract_addr: Value,
  #[serde(default)]
  func_name: Value,
  #[serde(default)]
  args: Value,
}

#[derive(Deserialize)]
struct BlockHeight {
  block_height: u64,
}

#[derive(Deserialize)]
struct LastOkHeight {
  last_ok_height: u64,
}

#[derive(Deserialize)]
struct ContractAddress {
  addr: Address,
}

#[derive(Serialize)]
struct Body<T> {
  error: Option<String>,
  result: T,
}

/// Successful response body. `result` is serialized as is, so raw JSON
/// values keep their exact text.
fn result(result: impl Serialize) -> ServerResult {
  Ok(
    Json(Body {
      error: None,
      result,
    })
    .into_response(),
  )
}

#[derive(Debug, Parser)]
pub struct Server {
  #[arg(
    long,
    default_value = "0.0.0.0",
    help = "Listen on <ADDRESS> for incoming requests."
  )]
  address: String,
  #[arg(
    long,
    default_value_t = 8000,
    help = "Listen on <HTTP_PORT> for incoming HTTP requests."
  )]
  http_port: u16,
}

impl Server {
  pub fn run(self, settings: Settings, handle: Handle) -> SubcommandResult {
    let engine = Arc::new(Engine::from_settings(&settings)?);

    log::info!("checking chain against {}", settings.backend_url());

    engine.initialise()?;

    if SHUTTING_DOWN.load(atomic::Ordering::Relaxed) {
      return Ok(None);
    }

    LISTENERS.lock().unwrap().push(handle.clone());

    let router = Self::router(engine.clone());

    Runtime::new()?.block_on(async {
      self.spawn(router, handle)?.await??;
      Ok::<(), Error>(())
    })?;

    // the blocking client must not be dropped inside the runtime
    drop(engine);

    Ok(None)
  }

  fn router(engine: SharedEngine) -> Router {
    Router::new()
      .route("/call_view_function_as", post(Self::call_view_function_as))
      .route("/check_balance", get(Self::check_balance))
      .route("/commit_changes_to_db", get(Self::commit_changes_to_db))
      .route("/current_block_height", get(Self::current_block_height))
      .route("/get_block_info", get(Self::get_block_info))
      .route("/get_contract_bytecode", get(Self::get_contract_bytecode))
      .route("/hash_of_height", get(Self::hash_of_height))
      .route("/mine_block", post(Self::mine_block))
      .route(
        "/restore_to_last_ok_height",
        get(Self::restore_to_last_ok_height),
      )
      .layer(Extension(engine))
  }

  fn spawn(&self, router: Router, handle: Handle) -> Result<task::JoinHandle<io::Result<()>>> {
    let addr = (self.address.as_str(), self.http_port)
      .to_socket_addrs()?
      .next()
      .ok_or_else(|| anyhow!("failed to get socket addrs"))?;

    eprintln!("Listening on http://{addr}");

    Ok(tokio::spawn(async move {
      axum_server::Server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    }))
  }

  async fn mine_block(
    Extension(engine): Extension<SharedEngine>,
    request: Result<Json<MineBlock>, JsonRejection>,
  ) -> ServerResult {
    let Json(request) = request?;

    let timestamp = backend::parse_quantity(&request.ts)
      .ok_or_else(|| anyhow!("invalid timestamp `{}`", request.ts))?;

    let responses = task::block_in_place(|| {
      engine.process_block(
        BlockHeader {
          timestamp,
          hash: request.hash,
        },
        &request.txes,
      )
    })?;

    result(json!({ "responses": responses }))
  }

  async fn check_balance(
    Extension(engine): Extension<SharedEngine>,
    query: Result<Query<CheckBalance>, QueryRejection>,
  ) -> ServerResult {
    let Query(query) = query?;

    let balance = task::block_in_place(|| engine.balance(&query.btc_addr, &query.ticker))?;

    // a uint256 does not fit a JSON number parsed as u64 or f64
    result(RawValue::from_string(balance).context("invalid balance")?)
  }

  async fn call_view_function_as(
    Extension(engine): Extension<SharedEngine>,
    request: Result<Json<ViewCall>, JsonRejection>,
  ) -> ServerResult {
    let Json(request) = request?;
    result(task::block_in_place(|| {
      engine.call_view_function_as(
        &request.btc_addr,
        &request.contract_addr,
        &request.func_name,
        &request.args,
      )
    })?)
  }

  async fn commit_changes_to_db(Extension(engine): Extension<SharedEngine>) -> ServerResult {
    result(task::block_in_place(|| engine.commit())?)
  }

  async fn current_block_height(Extension(engine): Extension<SharedEngine>) -> ServerResult {
    result(task::block_in_place(|| engine.current_height())?)
  }

  async fn hash_of_height(
    Extension(engine): Extension<SharedEngine>,
    query: Result<Query<BlockHeight>, QueryRejection>,
  ) -> ServerResult {
    let Query(query) = query?;
    let block = task::block_in_place(|| engine.block(query.block_height))?;
    result(&block["hash"])
  }

  async fn restore_to_last_ok_height(
    Extension(engine): Extension<SharedEngine>,
    query: Result<Query<LastOkHeight>, QueryRejection>,
  ) -> ServerResult {
    let Query(query) = query?;
    task::block_in_place(|| engine.rollback_to(query.last_ok_height))?;
    result(Value::Null)
  }

  async fn get_block_info(
    Extension(engine): Extension<SharedEngine>,
    query: Result<Query<BlockHeight>, QueryRejection>,
  ) -> ServerResult {
    let Query(query) = query?;
    result(task::block_in_place(|| engine.block(query.block_height))?)
  }

  async fn get_contract_bytecode(
    Extension(engine): Extension<SharedEngine>,
    query: Result<Query<ContractAddress>, QueryRejection>,
  ) -> ServerResult {
    let Query(query) = query?;
    result(task::block_in_place(|| engine.contract_bytecode(query.addr))?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults() {
    let (settings, server) = parse_server_args("ordevm server");
    assert_eq!(settings, Settings::default());
    assert_eq!(server.address, "0.0.0.0");
    assert_eq!(server.http_port, 8000);
  }

  #[test]
  fn address_and_port() {
    let (settings, server) =
      parse_server_args("ordevm --regtest server --address 127.0.0.1 --http-port 8080");
    assert_eq!(settings.chain(), Chain::Regtest);
    assert_eq!(server.address, "127.0.0.1");
    assert_eq!(server.http_port, 8080);
  }

  #[test]
  fn mine_block_request() {
    let request = serde_json::from_value::<MineBlock>(json!({
      "ts": "1700000000",
      "hash": format!("{:x}", B256::repeat_byte(1)),
      "txes": [{"inscription": {"op": "call"}, "btc_pkscript": SENDER}],
    }))
    .unwrap();

    assert_eq!(backend::parse_quantity(&request.ts), Some(1_700_000_000));
    assert_eq!(request.hash, B256::repeat_byte(1));
    assert_eq!(request.txes[0].btc_pkscript, SENDER);
  }

  #[test]
  fn view_call_request_fields_are_optional() {
    let request = serde_json::from_value::<ViewCall>(json!({"btc_addr": SENDER})).unwrap();
    assert_eq!(request.contract_addr, Value::Null);
    assert_eq!(request.args, Value::Null);
  }
}
