use {super::*, alloy_json_abi::JsonAbi};

pub const SOURCE_NAME: &str = "main.sol";

/// Bytecode and ABI of one compiled contract.
#[derive(Debug, Clone, PartialEq)]
pub struct Compilation {
  pub abi: JsonAbi,
  pub bytecode: Bytes,
}

pub trait Compiler {
  fn compile(&self, source: &str, class: &str) -> Result<Compilation>;
}

/// Compiles with a `solc` binary in standard JSON mode.
#[derive(Debug, Clone)]
pub struct Solc {
  pub path: PathBuf,
  pub evm_version: String,
}

impl Solc {
  pub fn new(path: impl Into<PathBuf>, evm_version: impl Into<String>) -> Self {
    Self {
      path: path.into(),
      evm_version: evm_version.into(),
    }
  }

  fn input(&self, source: &str) -> Value {
    json!({
      "language": "Solidity",
      "sources": {
        SOURCE_NAME: {
          "content": source,
        },
      },
      "settings": {
        "evmVersion": self.evm_version,
        "outputSelection": {
          "*": {
            "*": ["abi", "evm.bytecode.object"],
          },
        },
      },
    })
  }
}

impl Compiler for Solc {
  fn compile(&self, source: &str, class: &str) -> Result<Compilation> {
    let mut child = Command::new(&self.path)
      .arg("--standard-json")
      .stdin(Stdio::piped())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .spawn()
      .with_context(|| format!("failed to run `{}`", self.path.display()))?;

    child
      .stdin
      .take()
      .context("solc stdin not captured")?
      .write_all(self.input(source).to_string().as_bytes())?;

    let output = child.wait_with_output()?;

    ensure!(
      output.status.success(),
      "`{}` exited with {}: {}",
      self.path.display(),
      output.status,
      String::from_utf8_lossy(&output.stderr).trim(),
    );

    Compilation::from_output(&serde_json::from_slice(&output.stdout)?, class)
  }
}

impl Compilation {
  /// Extracts contract `class` from `solc --standard-json` output.
  pub fn from_output(output: &Value, class: &str) -> Result<Self> {
    let errors = output
      .get("errors")
      .and_then(Value::as_array)
      .into_iter()
      .flatten()
      .filter(|error| error["severity"] == "error")
      .map(|error| {
        error["formattedMessage"]
          .as_str()
          .or(error["message"].as_str())
          .unwrap_or("unknown error")
          .trim()
          .to_string()
      })
      .collect::<Vec<String>>();

    if !errors.is_empty() {
      bail!("compilation failed:\n{}", errors.join("\n"));
    }

    let contract = output
      .get("contracts")
      .and_then(|contracts| contracts.get(SOURCE_NAME))
      .and_then(|contracts| contracts.get(class))
      .with_context(|| format!("no contract named `{class}` in {SOURCE_NAME}"))?;

    let abi = serde_json::from_value::<JsonAbi>(contract["abi"].clone())
      .with_context(|| format!("invalid ABI for `{class}`"))?;

    let object = contract["evm"]["bytecode"]["object"]
      .as_str()
      .with_context(|| format!("no bytecode for `{class}`"))?;

    ensure!(
      !object.is_empty(),
      "`{class}` has no bytecode, is it abstract or an interface?"
    );

    Ok(Self {
      abi,
      bytecode: hex::decode(object.strip_prefix("0x").unwrap_or(object))
        .with_context(|| format!("invalid bytecode for `{class}`"))?
        .into(),
    })
  }

  /// Types of the constructor parameters, empty if there is no constructor.
  pub fn constructor_inputs(&self) -> Result<Vec<DynSolType>> {
    use alloy_dyn_abi::Specifier;

    self
      .abi
      .constructor
      .iter()
      .flat_map(|constructor| &constructor.inputs)
      .map(|param| param.resolve().map_err(Error::from))
      .collect()
  }
}
