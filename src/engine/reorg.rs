use super::*;

impl<B: Backend> Engine<B> {
  /// Asks the backend to roll back to `last_ok_height`. A `false`
  /// acknowledgement is reported as an error and not retried. Anything other
  /// than a boolean is fatal.
  pub fn rollback_to(&self, last_ok_height: u64) -> Result<(), BridgeError> {
    let response = self.backend().reorg(last_ok_height)?;

    match response {
      Value::Bool(true) => {
        log::info!("rolled back to height {last_ok_height}");
        Ok(())
      }
      Value::Bool(false) => error::ReorgRejected {
        height: last_ok_height,
      }
      .fail(),
      response => error::ReorgResponse { response }.fail(),
    }
  }
}
