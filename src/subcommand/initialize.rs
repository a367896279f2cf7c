use super::*;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Output {
  pub height: u64,
  pub checkpoint_hash: B256,
}

pub(crate) fn run(settings: Settings) -> SubcommandResult {
  let engine = Engine::from_settings(&settings)?;

  engine.initialise()?;

  Ok(Some(Box::new(Output {
    height: engine.current_height()?,
    checkpoint_hash: engine.checkpoint_hash,
  })))
}
