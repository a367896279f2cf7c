use super::*;

pub const SUCCESS: &str = "Success";

/// Backend outcome of one submitted transaction. Fields other than
/// `txResult` and `gasUsed` are kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
  #[serde(rename = "txResult")]
  pub tx_result: String,
  #[serde(rename = "gasUsed")]
  pub gas_used: Value,
  #[serde(flatten)]
  pub fields: Map<String, Value>,
}

impl Receipt {
  pub fn is_success(&self) -> bool {
    self.tx_result == SUCCESS
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
  Decode(DecodeError),
  Reverted,
}

impl Display for Failure {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    match self {
      Self::Decode(err) => write!(f, "{err}"),
      Self::Reverted => write!(f, "transaction execution reverted"),
    }
  }
}

impl Serialize for Failure {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    serializer.collect_str(self)
  }
}

/// Per-inscription result of processing a block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reconciliation {
  pub sender: String,
  pub receipt: Option<Receipt>,
  pub error: Option<Failure>,
}

impl Reconciliation {
  pub fn rejected(sender: &str, error: DecodeError) -> Self {
    Self {
      sender: sender.into(),
      receipt: None,
      error: Some(Failure::Decode(error)),
    }
  }

  /// Classifies the receipt of a submitted transaction. Failing deposits and
  /// withdrawals are fatal, other failures are recorded and tolerated.
  pub fn classify(
    kind: OperationKind,
    sender: &str,
    receipt: Receipt,
  ) -> Result<Self, BridgeError> {
    if receipt.is_success() {
      return Ok(Self {
        sender: sender.into(),
        receipt: Some(receipt),
        error: None,
      });
    }

    if kind.is_privileged() {
      return error::PrivilegedRevert { kind, sender }.fail();
    }

    log::warn!(
      "{kind} by `{sender}` reverted: {}",
      receipt.tx_result
    );

    Ok(Self {
      sender: sender.into(),
      receipt: Some(receipt),
      error: Some(Failure::Reverted),
    })
  }
}

#[cfg(test)]
mod tests {
  use {super::*, pretty_assertions::assert_eq};

  #[test]
  fn unknown_fields_are_preserved() {
    let value = json!({
      "txResult": "Success",
      "gasUsed": "0x5208",
      "logs": [],
      "contractAddress": null,
    });

    let receipt = serde_json::from_value::<Receipt>(value.clone()).unwrap();
    assert!(receipt.is_success());
    assert_eq!(receipt.fields["logs"], json!([]));
    assert_eq!(serde_json::to_value(&receipt).unwrap(), value);
  }

  #[test]
  fn missing_tx_result() {
    assert!(serde_json::from_value::<Receipt>(json!({"gasUsed": 1})).is_err());
  }

  #[test]
  fn success() {
    let reconciliation =
      Reconciliation::classify(OperationKind::Deposit, SENDER, receipt(SUCCESS)).unwrap();
    assert_eq!(reconciliation.error, None);
    assert_eq!(reconciliation.receipt, Some(receipt(SUCCESS)));
  }

  #[test]
  fn tolerated_revert() {
    for kind in [
      OperationKind::Call,
      OperationKind::Call2,
      OperationKind::Deploy,
      OperationKind::Deploy2,
    ] {
      let reconciliation = Reconciliation::classify(kind, SENDER, receipt("Revert")).unwrap();
      assert_eq!(
        serde_json::to_value(&reconciliation).unwrap()["error"],
        "transaction execution reverted"
      );
      assert_eq!(reconciliation.receipt, Some(receipt("Revert")));
    }
  }

  #[test]
  fn privileged_revert_is_fatal() {
    for kind in [OperationKind::Deposit, OperationKind::Withdraw] {
      let err = Reconciliation::classify(kind, SENDER, receipt("Revert")).unwrap_err();
      assert!(err.is_fatal());
      assert!(matches!(err, BridgeError::PrivilegedRevert { .. }));
    }
  }

  #[test]
  fn rejected_serializes_error_tag() {
    assert_eq!(
      serde_json::to_value(Reconciliation::rejected(SENDER, DecodeError::NoOp)).unwrap(),
      json!({
        "sender": SENDER,
        "receipt": null,
        "error": "no_op",
      })
    );
  }
}
