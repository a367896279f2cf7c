use {super::*, reqwest::blocking::Client};

/// Blocking JSON-RPC 2.0 client for the execution backend.
pub struct RpcBackend {
  client: Client,
  url: String,
}

impl RpcBackend {
  pub fn new(url: &str) -> Result<Self> {
    let url = if url.starts_with("http://") || url.starts_with("https://") {
      url.to_string()
    } else {
      format!("http://{url}")
    };

    reqwest::Url::parse(&url).with_context(|| format!("invalid backend url `{url}`"))?;

    Ok(Self {
      client: Client::builder().build()?,
      url,
    })
  }

  pub fn url(&self) -> &str {
    &self.url
  }
}

impl Backend for RpcBackend {
  fn request(&mut self, method: &str, params: Value) -> Result<Value, BridgeError> {
    let request = json!({
      "jsonrpc": "2.0",
      "id": 0,
      "method": method,
      "params": if params.is_null() { json!([]) } else { params },
    });

    log::debug!("{method} {}", request["params"]);

    let response = self
      .client
      .post(&self.url)
      .json(&request)
      .send()
      .snafu_context(error::Transport { method })?
      .text()
      .snafu_context(error::Transport { method })?;

    let malformed = |message: String| BridgeError::MalformedResponse {
      method: method.into(),
      message,
    };

    let response = serde_json::from_str::<Value>(&response)
      .map_err(|err| malformed(format!("response is not JSON: {err}")))?;

    let Value::Object(mut response) = response else {
      return Err(malformed(format!("expected object, got `{response}`")));
    };

    if response.get("jsonrpc") != Some(&json!("2.0")) {
      return Err(malformed("missing `jsonrpc: \"2.0\"`".into()));
    }

    if let Some(err) = response.get("error").filter(|err| !err.is_null()) {
      return error::Rpc {
        method,
        code: err["code"].as_i64().unwrap_or_default(),
        message: err["message"].as_str().unwrap_or_default(),
      }
      .fail();
    }

    response
      .remove("result")
      .ok_or_else(|| malformed("missing `result`".into()))
  }
}
