use {super::*, derive_more::Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
  #[display("call")]
  Call,
  #[display("call2")]
  Call2,
  #[display("deploy")]
  Deploy,
  #[display("deploy2")]
  Deploy2,
  #[display("deposit")]
  Deposit,
  #[display("withdraw")]
  Withdraw,
}

impl OperationKind {
  /// Classifies a raw record by its `op` tag.
  pub fn detect(inscription: &Value) -> Result<Self, DecodeError> {
    let op = match inscription.get("op") {
      Some(op) if !falsy(op) => op,
      _ => return Err(DecodeError::NoOp),
    };

    match op.as_str() {
      Some("call") => Ok(Self::Call),
      Some("call2") => Ok(Self::Call2),
      Some("deploy") => Ok(Self::Deploy),
      Some("deploy2") => Ok(Self::Deploy2),
      Some("deposit") => Ok(Self::Deposit),
      Some("withdraw") => Ok(Self::Withdraw),
      _ => Err(DecodeError::FaultyOp),
    }
  }

  /// Deposits and withdrawals are issued by the indexer and must never
  /// revert.
  pub fn is_privileged(self) -> bool {
    matches!(self, Self::Deposit | Self::Withdraw)
  }
}

/// Reason an inscription produced no transaction. Serialized as its tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DecodeError {
  #[display("no_op")]
  NoOp,
  #[display("faulty_op")]
  FaultyOp,
  #[display("no_c")]
  NoC,
  #[display("c_not_string")]
  CNotString,
  #[display("c_not_address")]
  CNotAddress,
  #[display("no_f")]
  NoF,
  #[display("f_not_string")]
  FNotString,
  #[display("a_not_array")]
  ANotArray,
  #[display("arg_not_object")]
  ArgNotObject,
  #[display("arg_no_t")]
  ArgNoT,
  #[display("arg_no_v")]
  ArgNoV,
  #[display("arg_t_not_string")]
  ArgTNotString,
  #[display("arg_v_not_string")]
  ArgVNotString,
  #[display("arg_t_not_param_type")]
  ArgTNotParamType,
  #[display("no_d")]
  NoD,
  #[display("d_not_string")]
  DNotString,
  #[display("d_not_hex")]
  DNotHex,
  #[display("no_sc")]
  NoSc,
  #[display("sc_not_string")]
  ScNotString,
  #[display("no_cls")]
  NoCls,
  #[display("cls_not_string")]
  ClsNotString,
  #[display("no_bc")]
  NoBc,
  #[display("bc_not_string")]
  BcNotString,
  #[display("bc_not_hex")]
  BcNotHex,
  #[display("no_t")]
  NoT,
  #[display("t_not_string")]
  TNotString,
  #[display("no_amount")]
  NoAmount,
  #[display("amount_not_string")]
  AmountNotString,
  #[display("invalid_amount")]
  InvalidAmount,
  #[display("invalid_pkscript")]
  InvalidPkscript,
  #[display("contract_compile")]
  ContractCompile,
  #[display("exception")]
  Exception,
}

impl std::error::Error for DecodeError {}

impl Serialize for DecodeError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    serializer.collect_str(self)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
  #[serde(rename = "t")]
  pub ty: String,
  #[serde(rename = "v")]
  pub value: String,
}

impl Argument {
  fn decode(value: &Value) -> Result<Self, DecodeError> {
    let Value::Object(object) = value else {
      return Err(DecodeError::ArgNotObject);
    };

    let ty = object.get("t").ok_or(DecodeError::ArgNoT)?;
    let value = object.get("v").ok_or(DecodeError::ArgNoV)?;

    let ty = ty.as_str().ok_or(DecodeError::ArgTNotString)?;
    let value = value.as_str().ok_or(DecodeError::ArgVNotString)?;

    if signature::parse_type(ty).is_err() {
      return Err(DecodeError::ArgTNotParamType);
    }

    Ok(Self {
      ty: ty.into(),
      value: value.into(),
    })
  }

  pub fn is_sentinel(&self) -> bool {
    self.ty == ADDRESS_SENTINEL
  }

  /// Decodes an argument list. A missing or falsy list is empty.
  pub fn decode_list(list: Option<&Value>) -> Result<Vec<Self>, DecodeError> {
    let list = match list {
      Some(list) if !falsy(list) => list,
      _ => return Ok(Vec::new()),
    };

    list
      .as_array()
      .ok_or(DecodeError::ANotArray)?
      .iter()
      .map(Self::decode)
      .collect()
  }
}

/// A validated operation record.
#[derive(Debug, Clone, PartialEq)]
pub enum Inscription {
  Call {
    contract: Address,
    function: String,
    args: Vec<Argument>,
  },
  Call2 {
    contract: Address,
    data: Bytes,
  },
  Deploy {
    source: String,
    class: String,
    args: Vec<Argument>,
  },
  Deploy2 {
    bytecode: Bytes,
  },
  Deposit(Transfer),
  Withdraw(Transfer),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transfer {
  pub ticker: String,
  pub amount: U256,
}

impl Inscription {
  pub fn decode(inscription: &Value) -> Result<Self, DecodeError> {
    Self::decode_as(OperationKind::detect(inscription)?, inscription)
  }

  pub fn decode_as(kind: OperationKind, inscription: &Value) -> Result<Self, DecodeError> {
    use DecodeError::*;

    let string = |key, missing, not_string| field(inscription, key, missing, not_string);

    match kind {
      OperationKind::Call => Ok(Self::Call {
        contract: contract(string("c", NoC, CNotString)?)?,
        function: string("f", NoF, FNotString)?.into(),
        args: Argument::decode_list(inscription.get("a"))?,
      }),
      OperationKind::Call2 => Ok(Self::Call2 {
        contract: contract(string("c", NoC, CNotString)?)?,
        data: hex_bytes(string("d", NoD, DNotString)?).ok_or(DNotHex)?,
      }),
      OperationKind::Deploy => Ok(Self::Deploy {
        source: string("sc", NoSc, ScNotString)?.into(),
        class: string("cls", NoCls, ClsNotString)?.into(),
        args: Argument::decode_list(inscription.get("a"))?,
      }),
      OperationKind::Deploy2 => Ok(Self::Deploy2 {
        bytecode: hex_bytes(string("bc", NoBc, BcNotString)?).ok_or(BcNotHex)?,
      }),
      OperationKind::Deposit | OperationKind::Withdraw => {
        let transfer = Transfer {
          ticker: string("t", NoT, TNotString)?.into(),
          amount: amount(string("a", NoAmount, AmountNotString)?)?,
        };

        Ok(if kind == OperationKind::Deposit {
          Self::Deposit(transfer)
        } else {
          Self::Withdraw(transfer)
        })
      }
    }
  }

  pub fn kind(&self) -> OperationKind {
    match self {
      Self::Call { .. } => OperationKind::Call,
      Self::Call2 { .. } => OperationKind::Call2,
      Self::Deploy { .. } => OperationKind::Deploy,
      Self::Deploy2 { .. } => OperationKind::Deploy2,
      Self::Deposit(_) => OperationKind::Deposit,
      Self::Withdraw(_) => OperationKind::Withdraw,
    }
  }

  pub fn transfer(&self) -> Option<&Transfer> {
    match self {
      Self::Deposit(transfer) | Self::Withdraw(transfer) => Some(transfer),
      _ => None,
    }
  }
}

/// Outcome of translating one inscription. Exactly one is produced per input
/// record, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessResult {
  pub kind: Option<OperationKind>,
  pub sender: String,
  pub inscription_id: Option<String>,
  pub transfer: Option<Transfer>,
  pub outcome: Result<Transaction, DecodeError>,
}

impl ProcessResult {
  pub fn transaction(&self) -> Option<&Transaction> {
    self.outcome.as_ref().ok()
  }
}

fn falsy(value: &Value) -> bool {
  match value {
    Value::Null => true,
    Value::Bool(b) => !b,
    Value::Number(n) => n.as_f64() == Some(0.0),
    Value::String(s) => s.is_empty(),
    Value::Array(_) | Value::Object(_) => false,
  }
}

fn field<'a>(
  inscription: &'a Value,
  key: &str,
  missing: DecodeError,
  not_string: DecodeError,
) -> Result<&'a str, DecodeError> {
  match inscription.get(key) {
    None | Some(Value::Null) => Err(missing),
    Some(Value::String(s)) => Ok(s),
    Some(_) => Err(not_string),
  }
}

fn contract(s: &str) -> Result<Address, DecodeError> {
  s.parse().map_err(|_| DecodeError::CNotAddress)
}

fn hex_bytes(s: &str) -> Option<Bytes> {
  if !re::HEX.is_match(s) {
    return None;
  }

  hex::decode(s.strip_prefix("0x").unwrap_or(s))
    .ok()
    .map(Bytes::from)
}

fn amount(s: &str) -> Result<U256, DecodeError> {
  if !re::DECIMAL.is_match(s) {
    return Err(DecodeError::InvalidAmount);
  }

  U256::from_str_radix(s, 10).map_err(|_| DecodeError::InvalidAmount)
}
