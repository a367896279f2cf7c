use super::*;

/// Memo tables shared by the engine and the HTTP layer.
pub struct Context {
  pub addresses: AddressDeriver,
  pub signatures: Synthesizer,
}

impl Context {
  pub fn new(cache_size: usize) -> Self {
    Self {
      addresses: AddressDeriver::new(cache_size),
      signatures: Synthesizer::new(cache_size),
    }
  }

  pub fn derive(&self, script: &str) -> Result<Address, InvalidScript> {
    self.addresses.derive(script)
  }

  /// Rewrites address-sentinel arguments to derived addresses and returns
  /// the resulting `(types, values)`.
  pub fn resolve_arguments(
    &self,
    args: &[Argument],
  ) -> Result<(Vec<String>, Vec<String>), InvalidScript> {
    let mut types = Vec::with_capacity(args.len());
    let mut values = Vec::with_capacity(args.len());

    for arg in args {
      if arg.is_sentinel() {
        types.push("address".into());
        values.push(format!("0x{}", hex::encode(self.derive(&arg.value)?)));
      } else {
        types.push(arg.ty.clone());
        values.push(arg.value.clone());
      }
    }

    Ok((types, values))
  }
}

impl Default for Context {
  fn default() -> Self {
    Self::new(Settings::DEFAULT_CACHE_SIZE)
  }
}
