use {
  super::*,
  sha3::{Digest, Keccak256},
};

#[derive(Debug, Snafu, PartialEq)]
#[snafu(display("invalid pkscript `{script}`: not a hex byte string"))]
pub struct InvalidScript {
  script: String,
}

/// Derives the execution-layer address controlled by a source-chain locking
/// script: the low 20 bytes of the keccak256 hash of the script bytes.
///
/// Input is case-insensitive. Results are memoized by normalized script.
pub struct AddressDeriver {
  cache: Mutex<GenerationalCache<String, Address>>,
}

impl AddressDeriver {
  pub fn new(cache_size: usize) -> Self {
    Self {
      cache: Mutex::new(GenerationalCache::new(cache_size)),
    }
  }

  pub fn derive(&self, script: &str) -> Result<Address, InvalidScript> {
    let script = script.to_lowercase();

    let mut cache = self.cache.lock().unwrap();

    if let Some(address) = cache.get(&script) {
      return Ok(address);
    }

    let address = derive(&script)?;

    cache.insert(script, address);

    Ok(address)
  }

  pub fn cached(&self) -> usize {
    self.cache.lock().unwrap().len()
  }
}

pub fn derive(script: &str) -> Result<Address, InvalidScript> {
  let bytes = hex::decode(script).map_err(|_| InvalidScript {
    script: script.into(),
  })?;

  let hash = Keccak256::digest(bytes);

  Ok(Address::from_slice(&hash[12..]))
}
