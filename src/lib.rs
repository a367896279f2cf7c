#![allow(clippy::result_large_err, clippy::too_many_arguments, clippy::type_complexity)]
#![deny(
  clippy::cast_lossless,
  clippy::cast_possible_truncation,
  clippy::cast_possible_wrap,
  clippy::cast_sign_loss
)]

use {
  self::{
    arguments::Arguments,
    cache::GenerationalCache,
    config::Config,
    error::{ResultExt, SnafuError},
    signature::ADDRESS_SENTINEL,
    subcommand::{OutputFormat, Subcommand, SubcommandResult},
  },
  alloy_dyn_abi::{DynSolType, DynSolValue},
  alloy_primitives::{Address, Bytes, B256, U256},
  anyhow::{anyhow, bail, ensure, Context as _, Error},
  clap::{ArgGroup, Parser},
  lazy_static::lazy_static,
  regex::Regex,
  serde::{Deserialize, Serialize, Serializer},
  serde_json::{json, Map, Value},
  snafu::{Backtrace, ErrorCompat, Snafu},
  std::{
    backtrace::BacktraceStatus,
    cmp,
    env,
    ffi::OsString,
    fmt::{self, Display, Formatter},
    fs::File,
    hash::Hash,
    io::{self, Write},
    mem,
    net::ToSocketAddrs,
    path::{Path, PathBuf},
    process::{self, Command, Stdio},
    str::FromStr,
    sync::{
      atomic::{self, AtomicBool},
      Arc, Mutex, MutexGuard,
    },
    time::Duration,
  },
  tokio::{runtime::Runtime, task},
};

pub use self::{
  address::{AddressDeriver, InvalidScript},
  backend::{rpc::RpcBackend, Backend, BlockHeader, Genesis},
  chain::Chain,
  compiler::{Compilation, Compiler, Solc},
  context::Context,
  engine::{BlockInscription, Engine, Protocol},
  error::BridgeError,
  inscription::{Argument, DecodeError, Inscription, OperationKind, ProcessResult, Transfer},
  options::Options,
  receipt::{Failure, Receipt, Reconciliation},
  settings::Settings,
  signature::{Function, SignatureError, Synthesizer},
  transaction::{Transaction, TransactionBuilder},
};


#[cfg(test)]
use self::test::*;

pub mod address;
pub mod arguments;
pub mod backend;
mod cache;
pub mod chain;
pub mod compiler;
mod config;
pub mod context;
pub mod engine;
mod error;
pub mod inscription;
pub mod options;
mod re;
pub mod receipt;
pub mod settings;
pub mod signature;
pub mod subcommand;
pub mod transaction;

type Result<T = (), E = Error> = std::result::Result<T, E>;
type SnafuResult<T = (), E = SnafuError> = std::result::Result<T, E>;

static SHUTTING_DOWN: AtomicBool = AtomicBool::new(false);
static LISTENERS: Mutex<Vec<axum_server::Handle>> = Mutex::new(Vec::new());

pub fn parse_server_args(args: &str) -> (Settings, subcommand::server::Server) {
  match Arguments::try_parse_from(args.split_whitespace()) {
    Ok(arguments) => match arguments.subcommand {
      Subcommand::Server(server) => (Settings::load(arguments.options).unwrap(), server),
      subcommand => panic!("unexpected subcommand: {subcommand:?}"),
    },
    Err(err) => panic!("error parsing arguments: {err}"),
  }
}

pub fn shut_down() {
  SHUTTING_DOWN.store(true, atomic::Ordering::Relaxed);

  LISTENERS
    .lock()
    .unwrap()
    .iter()
    .for_each(|handle| handle.graceful_shutdown(Some(Duration::from_millis(100))));
}

/// Logs `err` and exits. Used for violations after which the backend state
/// can no longer be trusted, so the caller must restart and replay from the
/// last durable checkpoint.
pub(crate) fn fatal(err: &BridgeError) -> ! {
  log::error!("fatal: {err}");
  eprintln!("fatal: {err}");
  process::exit(1);
}

pub fn main() {
  env_logger::init();

  ctrlc::set_handler(move || {
    if SHUTTING_DOWN.fetch_or(true, atomic::Ordering::Relaxed) {
      process::exit(1);
    }

    eprintln!("Shutting down gracefully. Press <CTRL-C> again to shutdown immediately.");

    shut_down();
  })
  .expect("Error setting <CTRL-C> handler");

  let args = Arguments::parse();

  let format = args.options.format;

  match args.run() {
    Err(err) => {
      eprintln!("error: {err}");

      if let SnafuError::Anyhow { err } = err {
        for (i, err) in err.chain().skip(1).enumerate() {
          if i == 0 {
            eprintln!();
            eprintln!("because:");
          }

          eprintln!("- {err}");
        }

        if env::var_os("RUST_BACKTRACE")
          .map(|val| val == "1")
          .unwrap_or_default()
        {
          eprintln!("{}", err.backtrace());
        }
      } else {
        for (i, err) in err.iter_chain().skip(1).enumerate() {
          if i == 0 {
            eprintln!();
            eprintln!("because:");
          }

          eprintln!("- {err}");
        }

        if let Some(backtrace) = err.backtrace() {
          if backtrace.status() == BacktraceStatus::Captured {
            eprintln!("backtrace:");
            eprintln!("{backtrace}");
          }
        }
      }

      process::exit(1);
    }
    Ok(output) => {
      if let Some(output) = output {
        output.print(format.unwrap_or_default());
      }
    }
  }
}
