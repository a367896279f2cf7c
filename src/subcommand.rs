use super::*;

pub mod derive;
pub mod initialize;
pub mod reorg;
pub mod server;

#[derive(Debug, Parser)]
pub(crate) enum Subcommand {
  #[command(about = "Derive the execution address of a pkscript or bitcoin address")]
  Derive(derive::Derive),
  #[command(about = "Mine empty blocks up to the activation checkpoint")]
  Initialize,
  #[command(about = "Roll the backend back to a previous height")]
  Reorg(reorg::Reorg),
  #[command(about = "Run the bridge HTTP server")]
  Server(server::Server),
}

impl Subcommand {
  pub(crate) fn run(self, settings: Settings) -> SubcommandResult {
    match self {
      Self::Derive(derive) => derive.run(settings),
      Self::Initialize => initialize::run(settings),
      Self::Reorg(reorg) => reorg.run(settings),
      Self::Server(server) => server.run(settings, axum_server::Handle::new()),
    }
  }
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub enum OutputFormat {
  #[default]
  Json,
  Yaml,
  Minify,
}

pub trait Output: Send {
  fn print(&self, format: OutputFormat);
}

impl<T> Output for T
where
  T: Serialize + Send,
{
  fn print(&self, format: OutputFormat) {
    match format {
      OutputFormat::Json => serde_json::to_writer_pretty(io::stdout(), self).ok(),
      OutputFormat::Yaml => serde_yaml::to_writer(io::stdout(), self).ok(),
      OutputFormat::Minify => serde_json::to_writer(io::stdout(), self).ok(),
    };
    println!();
  }
}

pub(crate) type SubcommandResult = Result<Option<Box<dyn Output>>>;
