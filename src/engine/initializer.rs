use super::*;

impl<B: Backend> Engine<B> {
  /// Advances the backend to `activation_height - 1` with empty blocks and
  /// verifies the checkpoint hash there. Safe to run again after an
  /// interruption: mining resumes from the current height.
  pub fn initialise(&self) -> Result<(), BridgeError> {
    let checkpoint = self.activation_height.saturating_sub(1);

    let mut backend = self.backend();

    let mut height = backend.block_number()?;

    if height == 0 {
      log::info!("initialising genesis block");
      backend.initialise(&Genesis::default())?;
    }

    let start = height;

    while height < checkpoint {
      let count = cmp::min(self.mine_batch_size.max(1), checkpoint - height);
      backend.mine(count, 0)?;
      height += count;
      log::info!(
        "mined {} of {} empty blocks",
        height - start,
        checkpoint - start
      );
    }

    let actual = backend.block_hash(checkpoint)?;

    if actual != self.checkpoint_hash {
      return error::CheckpointMismatch {
        height: checkpoint,
        expected: self.checkpoint_hash,
        actual,
      }
      .fail();
    }

    log::info!("chain initialised at height {checkpoint}");

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use {super::*, pretty_assertions::assert_eq};

  fn engine_at(backend: StubBackend, activation_height: u64, mine_batch_size: u64) -> Engine<StubBackend> {
    let mut engine = engine(backend);
    engine.activation_height = activation_height;
    engine.mine_batch_size = mine_batch_size;
    engine
  }

  fn mined(backend: &StubBackend) -> Vec<u64> {
    backend
      .calls()
      .into_iter()
      .filter(|(method, _)| method == "brc20_mine")
      .map(|(_, params)| {
        assert_eq!(params["timestamp"], 0);
        params["block_count"].as_u64().unwrap()
      })
      .collect()
  }

  #[test]
  fn mines_in_capped_batches() {
    let backend = StubBackend::default();

    engine_at(backend.clone(), 1000, 400).initialise().unwrap();

    assert_eq!(mined(&backend), [400, 400, 199]);

    let calls = backend.calls();
    assert_eq!(calls[0].0, "eth_blockNumber");
    assert_eq!(calls[1].0, "brc20_initialise");
    assert_eq!(
      calls.last().unwrap(),
      &("eth_getBlockByNumber".to_string(), json!({"block": "0x3e7"}))
    );
    assert_eq!(backend.height(), 999);
  }

  #[test]
  fn resumes_from_current_height() {
    let backend = StubBackend::default();
    backend.set_height(500);

    engine_at(backend.clone(), 1000, 400).initialise().unwrap();

    assert_eq!(mined(&backend), [400, 99]);
    assert!(!backend
      .calls()
      .iter()
      .any(|(method, _)| method == "brc20_initialise"));
  }

  #[test]
  fn already_initialised_only_checks_hash() {
    let backend = StubBackend::default();
    backend.set_height(1200);

    engine_at(backend.clone(), 1000, 400).initialise().unwrap();

    assert_eq!(
      backend
        .calls()
        .into_iter()
        .map(|(method, _)| method)
        .collect::<Vec<String>>(),
      ["eth_blockNumber", "eth_getBlockByNumber"]
    );
  }

  #[test]
  fn checkpoint_mismatch_is_fatal() {
    let backend = StubBackend::default();
    backend.set_hash(999, B256::repeat_byte(1));

    let err = engine_at(backend, 1000, 1000).initialise().unwrap_err();

    assert!(err.is_fatal());
    assert!(matches!(
      err,
      BridgeError::CheckpointMismatch { height: 999, .. }
    ));
  }

  #[test]
  fn default_batch_size() {
    let backend = StubBackend::default();

    engine_at(backend.clone(), 2500, Settings::DEFAULT_MINE_BATCH_SIZE)
      .initialise()
      .unwrap();

    assert_eq!(mined(&backend), [1000, 1000, 499]);
  }
}
