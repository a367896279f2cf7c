use super::*;

#[derive(Debug, Parser)]
pub(crate) struct Reorg {
  #[arg(long, help = "Roll the backend back to <LAST_OK_HEIGHT>.")]
  last_ok_height: u64,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Output {
  pub last_ok_height: u64,
  pub height: u64,
}

impl Reorg {
  pub(crate) fn run(self, settings: Settings) -> SubcommandResult {
    let engine = Engine::from_settings(&settings)?;

    engine.rollback_to(self.last_ok_height)?;

    Ok(Some(Box::new(Output {
      last_ok_height: self.last_ok_height,
      height: engine.current_height()?,
    })))
  }
}
