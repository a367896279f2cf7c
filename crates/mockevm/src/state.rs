use super::*;

#[derive(Debug)]
pub struct State {
  pub bytecode: BTreeMap<String, String>,
  pub call_output: String,
  pub calls: Vec<(String, Value)>,
  pub commits: u64,
  pub failures: BTreeMap<String, (i64, String)>,
  pub genesis: Option<Value>,
  pub hashes: BTreeMap<u64, String>,
  pub height: u64,
  pub pending: u64,
  pub reorg_response: Option<Value>,
  pub reverting: BTreeSet<String>,
  pub timestamps: BTreeMap<u64, u64>,
}

impl State {
  pub(crate) fn new(height: u64) -> Self {
    Self {
      bytecode: BTreeMap::new(),
      call_output: "0x".into(),
      calls: Vec::new(),
      commits: 0,
      failures: BTreeMap::new(),
      genesis: None,
      hashes: BTreeMap::new(),
      height,
      pending: 0,
      reorg_response: None,
      reverting: BTreeSet::new(),
      timestamps: BTreeMap::new(),
    }
  }

  pub(crate) fn block(&self, height: u64) -> Option<Value> {
    if height > self.height {
      return None;
    }

    Some(json!({
      "number": format!("{height:#x}"),
      "hash": self.hashes.get(&height).map(String::as_str).unwrap_or(ZERO_HASH),
      "timestamp": format!("{:#x}", self.timestamps.get(&height).copied().unwrap_or_default()),
    }))
  }

  pub(crate) fn mine(&mut self, block_count: u64, timestamp: u64) {
    for _ in 0..block_count {
      self.height += 1;
      self.timestamps.insert(self.height, timestamp);
    }
  }

  /// Appends a block with the given source-chain identity.
  pub(crate) fn finalise(&mut self, timestamp: u64, hash: &str) {
    self.height += 1;
    self.hashes.insert(self.height, hash.into());
    self.timestamps.insert(self.height, timestamp);
    self.pending = 0;
  }

  pub(crate) fn receipt(&self, from: &str, to: Option<&str>, index: u64) -> Value {
    let reverted = to.is_some_and(|to| self.reverting.contains(&to.to_lowercase()));

    json!({
      "txResult": if reverted { "Revert" } else { "Success" },
      "gasUsed": "0x5208",
      "from": from,
      "to": to,
      "contractAddress": Value::Null,
      "logs": [],
      "transactionIndex": format!("{index:#x}"),
    })
  }

  pub(crate) fn reorg(&mut self, last_ok_height: u64) -> Value {
    if let Some(response) = &self.reorg_response {
      return response.clone();
    }

    if last_ok_height > self.height {
      return Value::Bool(false);
    }

    self.hashes.retain(|height, _| *height <= last_ok_height);
    self.timestamps.retain(|height, _| *height <= last_ok_height);
    self.height = last_ok_height;

    Value::Bool(true)
  }
}
