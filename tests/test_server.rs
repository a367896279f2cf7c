use {
  super::*,
  axum_server::Handle,
  ordevm::parse_server_args,
  reqwest::blocking::Response,
};

pub(crate) struct TestServer {
  handle: Handle,
  port: u16,
}

impl TestServer {
  pub(crate) fn spawn(backend: &mockevm::Handle) -> Self {
    Self::spawn_with_args(backend, &[])
  }

  pub(crate) fn spawn_with_args(backend: &mockevm::Handle, args: &[&str]) -> Self {
    let port = free_port();

    let (settings, server) = parse_server_args(&format!(
      "ordevm --regtest --backend-url {} {} server --http-port {port} --address 127.0.0.1",
      backend.url(),
      args.join(" "),
    ));

    let handle = Handle::new();

    {
      let handle = handle.clone();
      thread::spawn(|| server.run(settings, handle).unwrap());
    }

    for attempt in 0.. {
      match reqwest::blocking::get(format!("http://127.0.0.1:{port}/current_block_height")) {
        Ok(_) => break,
        Err(err) if attempt == 400 => panic!("bridge server failed to start: {err}"),
        Err(_) => thread::sleep(Duration::from_millis(25)),
      }
    }

    Self { handle, port }
  }

  pub(crate) fn url(&self, path: &str) -> String {
    format!("http://127.0.0.1:{}/{path}", self.port)
  }

  pub(crate) fn get(&self, path: &str) -> Response {
    reqwest::blocking::get(self.url(path)).unwrap()
  }

  pub(crate) fn post(&self, path: &str, body: Value) -> Response {
    reqwest::blocking::Client::new()
      .post(self.url(path))
      .json(&body)
      .send()
      .unwrap()
  }

  /// `result` of a successful response.
  #[track_caller]
  pub(crate) fn result(response: Response) -> Value {
    assert_eq!(response.status(), StatusCode::OK);
    let mut body = response.json::<Value>().unwrap();
    assert_eq!(body["error"], Value::Null);
    body["result"].take()
  }

  #[track_caller]
  pub(crate) fn assert_internal_error(response: Response) {
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    pretty_assert_eq!(
      response.json::<Value>().unwrap(),
      json!({"error": "internal error", "result": null})
    );
  }
}

impl Drop for TestServer {
  fn drop(&mut self) {
    self.handle.shutdown();
  }
}
