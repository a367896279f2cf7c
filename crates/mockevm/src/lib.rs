use {
  api::Api,
  jsonrpc_core::{IoHandler, Params, Value},
  jsonrpc_http_server::{CloseHandle, ServerBuilder},
  serde::Deserialize,
  serde_json::json,
  server::Server,
  state::State,
  std::{
    collections::{BTreeMap, BTreeSet},
    sync::{Arc, Mutex, MutexGuard},
    thread,
    time::Duration,
  },
};

mod api;
mod server;
mod state;

/// Receiver of deposits and withdrawals in per-operation mode.
pub const CONTROLLER: &str = "0xc54dd4581af2dbf18e4d90840226756e9d2b3cdb";

pub const ZERO_HASH: &str = "0x0000000000000000000000000000000000000000000000000000000000000000";

pub fn builder() -> Builder {
  Builder { height: 0 }
}

pub struct Builder {
  height: u64,
}

impl Builder {
  /// Start with `height` empty blocks already mined, as if initialised.
  pub fn height(self, height: u64) -> Self {
    Self { height }
  }

  pub fn build(self) -> Handle {
    let state = Arc::new(Mutex::new(State::new(self.height)));
    let server = Server::new(state.clone());
    let mut io = IoHandler::default();
    io.extend_with(server.to_delegate());

    let rpc_server = ServerBuilder::new(io)
      .threads(1)
      .start_http(&"127.0.0.1:0".parse().unwrap())
      .unwrap();

    let close_handle = rpc_server.close_handle();
    let port = rpc_server.address().port();

    thread::spawn(|| rpc_server.wait());

    for i in 0.. {
      match reqwest::blocking::get(format!("http://127.0.0.1:{port}/")) {
        Ok(_) => break,
        Err(err) => {
          if i == 400 {
            panic!("mock backend failed to start: {err}");
          }
        }
      }

      thread::sleep(Duration::from_millis(25));
    }

    Handle {
      close_handle: Some(close_handle),
      port,
      state,
    }
  }
}

pub fn spawn() -> Handle {
  builder().build()
}

pub struct Handle {
  close_handle: Option<CloseHandle>,
  port: u16,
  state: Arc<Mutex<State>>,
}

impl Handle {
  pub fn url(&self) -> String {
    format!("http://127.0.0.1:{}", self.port)
  }

  pub fn state(&self) -> MutexGuard<State> {
    self.state.lock().unwrap()
  }

  /// Every request received, in order, as `(method, params)`.
  pub fn calls(&self) -> Vec<(String, Value)> {
    self.state().calls.clone()
  }

  pub fn methods(&self) -> Vec<String> {
    self
      .state()
      .calls
      .iter()
      .map(|(method, _)| method.clone())
      .collect()
  }

  pub fn height(&self) -> u64 {
    self.state().height
  }

  pub fn commits(&self) -> u64 {
    self.state().commits
  }

  /// Transactions sent to `address` revert.
  pub fn revert_to(&self, address: &str) {
    self.state().reverting.insert(address.to_lowercase());
  }

  pub fn set_hash(&self, height: u64, hash: &str) {
    self.state().hashes.insert(height, hash.into());
  }

  /// Answer `brc20_reorg` with `response` instead of rolling back.
  pub fn reorg_response(&self, response: Value) {
    self.state().reorg_response = Some(response);
  }

  pub fn call_output(&self, output: &str) {
    self.state().call_output = output.into();
  }

  pub fn bytecode(&self, address: &str, bytecode: &str) {
    self
      .state()
      .bytecode
      .insert(address.to_lowercase(), bytecode.into());
  }

  /// Fail every `method` request with JSON-RPC error `code`.
  pub fn fail(&self, method: &str, code: i64, message: &str) {
    self
      .state()
      .failures
      .insert(method.into(), (code, message.into()));
  }
}

impl Drop for Handle {
  fn drop(&mut self) {
    self.close_handle.take().unwrap().close();
  }
}
