use super::*;

fn re(s: &'static str) -> Regex {
  Regex::new(&format!("^{s}$")).unwrap()
}

lazy_static! {
  pub(crate) static ref BITCOIN_ADDRESS: Regex = re(
    r"((bc1|tb1|bcrt1)[qpzry9x8gf2tvdw0s3jn54khce6mua7l]{39,60}|[123mn2][a-km-zA-HJ-NP-Z1-9]{25,34})"
  );
  pub(crate) static ref DECIMAL: Regex = re(r"[0-9]+");
  pub(crate) static ref HEX: Regex = re(r"(0x)?([[:xdigit:]]{2})*");
  pub(crate) static ref IDENTIFIER: Regex = re(r"[A-Za-z_$][A-Za-z0-9_$]*");
}
