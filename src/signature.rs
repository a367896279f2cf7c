use {
  super::*,
  sha3::{Digest, Keccak256},
};

/// Argument type whose value is a source-chain locking script, resolved to a
/// derived address before encoding.
pub const ADDRESS_SENTINEL: &str = "btc_address";

#[derive(Debug, PartialEq, Snafu)]
#[snafu(context(suffix(false)), visibility(pub(crate)))]
pub enum SignatureError {
  #[snafu(display("`{ty}` is not an ABI parameter type"))]
  UnknownType { ty: String },
  #[snafu(display("`{name}` is not a valid function name"))]
  InvalidName { name: String },
}

/// Encoder/decoder pair for one function signature.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
  pub signature: String,
  pub selector: [u8; 4],
  pub inputs: Vec<DynSolType>,
}

impl Function {
  fn new(name: &str, inputs: Vec<DynSolType>) -> Self {
    let signature = format!(
      "{name}({})",
      inputs
        .iter()
        .map(|ty| ty.sol_type_name())
        .collect::<Vec<_>>()
        .join(",")
    );

    let hash = Keccak256::digest(signature.as_bytes());

    let mut selector = [0; 4];
    selector.copy_from_slice(&hash[..4]);

    Self {
      signature,
      selector,
      inputs,
    }
  }

  /// Encodes string values, coercing each to its declared parameter type.
  pub fn encode<S: AsRef<str>>(&self, values: &[S]) -> Result<Bytes> {
    ensure!(
      values.len() == self.inputs.len(),
      "`{}` takes {} arguments but {} were given",
      self.signature,
      self.inputs.len(),
      values.len(),
    );

    let values = self
      .inputs
      .iter()
      .zip(values)
      .map(|(ty, value)| {
        ty.coerce_str(value.as_ref())
          .with_context(|| format!("invalid `{ty}` value `{}`", value.as_ref()))
      })
      .collect::<Result<Vec<DynSolValue>>>()?;

    self.encode_values(values)
  }

  pub fn encode_values(&self, values: Vec<DynSolValue>) -> Result<Bytes> {
    for (ty, value) in self.inputs.iter().zip(&values) {
      ensure!(
        ty.matches(value),
        "value does not match `{ty}` in `{}`",
        self.signature
      );
    }

    ensure!(
      values.len() == self.inputs.len(),
      "`{}` takes {} arguments but {} were given",
      self.signature,
      self.inputs.len(),
      values.len(),
    );

    let mut data = self.selector.to_vec();
    data.extend(DynSolValue::Tuple(values).abi_encode_params());

    Ok(data.into())
  }

  /// Decodes call data produced by `encode`, selector included.
  pub fn decode(&self, data: &[u8]) -> Result<Vec<DynSolValue>> {
    ensure!(
      data.get(..4) == Some(&self.selector[..]),
      "call data does not start with selector of `{}`",
      self.signature
    );

    match DynSolType::Tuple(self.inputs.clone()).abi_decode_params(&data[4..])? {
      DynSolValue::Tuple(values) => Ok(values),
      value => Ok(vec![value]),
    }
  }
}

/// Builds and memoizes `Function`s by signature text.
pub struct Synthesizer {
  cache: Mutex<GenerationalCache<String, Arc<Function>>>,
}

impl Synthesizer {
  pub fn new(cache_size: usize) -> Self {
    Self {
      cache: Mutex::new(GenerationalCache::new(cache_size)),
    }
  }

  pub fn resolve<S: AsRef<str>>(
    &self,
    name: &str,
    types: &[S],
  ) -> Result<Arc<Function>, SignatureError> {
    let key = format!(
      "{name}({})",
      types
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join(",")
    );

    if let Some(function) = self.cache.lock().unwrap().get(&key) {
      return Ok(function);
    }

    if !re::IDENTIFIER.is_match(name) {
      return InvalidName { name }.fail();
    }

    let inputs = types
      .iter()
      .map(|ty| parse_type(ty.as_ref()))
      .collect::<Result<Vec<DynSolType>, SignatureError>>()?;

    let function = Arc::new(Function::new(name, inputs));

    self
      .cache
      .lock()
      .unwrap()
      .insert(key, function.clone());

    Ok(function)
  }

  pub fn cached(&self) -> usize {
    self.cache.lock().unwrap().len()
  }
}

pub fn parse_type(ty: &str) -> Result<DynSolType, SignatureError> {
  if ty == ADDRESS_SENTINEL {
    return Ok(DynSolType::Address);
  }

  DynSolType::parse(ty).map_err(|_| SignatureError::UnknownType { ty: ty.into() })
}
