use super::*;

#[derive(Debug, Snafu)]
#[snafu(context(suffix(false)), visibility(pub(crate)))]
pub(crate) enum SnafuError {
  #[snafu(display("{err}"))]
  Anyhow { err: anyhow::Error },
  #[snafu(display("environment variable `{variable}` not valid unicode: `{}`", value.to_string_lossy()))]
  EnvVarUnicode {
    backtrace: Backtrace,
    value: OsString,
    variable: String,
  },
  #[snafu(display("I/O error at `{}`", path.display()))]
  Io {
    backtrace: Backtrace,
    path: PathBuf,
    source: io::Error,
  },
}

impl From<Error> for SnafuError {
  fn from(err: Error) -> SnafuError {
    Self::Anyhow { err }
  }
}

/// Failures raised while talking to the execution backend.
///
/// Some of these are fatal: they mean the backend and the indexer no longer
/// agree on ledger state, and processing must stop rather than continue on a
/// diverged chain. See [`BridgeError::is_fatal`].
#[derive(Debug, Snafu)]
#[snafu(context(suffix(false)), visibility(pub(crate)))]
pub enum BridgeError {
  #[snafu(display("block hash at height {height} is {actual} instead of {expected}"))]
  CheckpointMismatch {
    height: u64,
    expected: B256,
    actual: B256,
  },
  #[snafu(display("malformed JSON-RPC response to `{method}`: {message}"))]
  MalformedResponse { method: String, message: String },
  #[snafu(display("{kind} by indexer for `{sender}` reverted"))]
  PrivilegedRevert { kind: OperationKind, sender: String },
  #[snafu(display("block abandoned after {submitted} submitted transactions"))]
  IncompleteBlock {
    submitted: u64,
    source: Box<BridgeError>,
  },
  #[snafu(display("backend returned {received} receipts for {submitted} transactions"))]
  ReceiptCount { submitted: usize, received: usize },
  #[snafu(display(
    "rollback to height {height} rejected: snapshot is invalid or has already been used"
  ))]
  ReorgRejected { height: u64 },
  #[snafu(display("rollback response should be a boolean, got `{response}`"))]
  ReorgResponse { response: Value },
  #[snafu(display("JSON-RPC error from `{method}`: code: {code}, message: {message}"))]
  Rpc {
    method: String,
    code: i64,
    message: String,
  },
  #[snafu(display("failed to send `{method}` request"))]
  Transport {
    method: String,
    source: reqwest::Error,
  },
}

impl BridgeError {
  pub fn is_fatal(&self) -> bool {
    match self {
      Self::CheckpointMismatch { .. }
      | Self::IncompleteBlock { .. }
      | Self::MalformedResponse { .. }
      | Self::PrivilegedRevert { .. }
      | Self::ReceiptCount { .. }
      | Self::ReorgResponse { .. } => true,
      Self::ReorgRejected { .. } | Self::Rpc { .. } | Self::Transport { .. } => false,
    }
  }
}

/// We use `anyhow` for application errors and `snafu` for typed ones. This
/// trait exists to provide access to `snafu::ResultExt::{context,
/// with_context}`, which are otherwise shadowed by `anyhow::Context`.
pub(crate) trait ResultExt<T, E>: Sized {
  fn snafu_context<C, E2>(self, context: C) -> Result<T, E2>
  where
    C: snafu::IntoError<E2, Source = E>,
    E2: std::error::Error + snafu::ErrorCompat;

  #[allow(unused)]
  fn with_snafu_context<F, C, E2>(self, context: F) -> Result<T, E2>
  where
    F: FnOnce(&mut E) -> C,
    C: snafu::IntoError<E2, Source = E>,
    E2: std::error::Error + snafu::ErrorCompat;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E> {
  fn snafu_context<C, E2>(self, context: C) -> Result<T, E2>
  where
    C: snafu::IntoError<E2, Source = E>,
    E2: std::error::Error + snafu::ErrorCompat,
  {
    use snafu::ResultExt;
    self.context(context)
  }

  fn with_snafu_context<F, C, E2>(self, context: F) -> Result<T, E2>
  where
    F: FnOnce(&mut E) -> C,
    C: snafu::IntoError<E2, Source = E>,
    E2: std::error::Error + snafu::ErrorCompat,
  {
    use snafu::ResultExt;
    self.with_context(context)
  }
}
