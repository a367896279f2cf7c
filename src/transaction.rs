use super::*;

/// Call envelope submitted to the backend. `to` is `None` for contract
/// creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
  pub from: Address,
  pub to: Option<Address>,
  pub data: Bytes,
}

/// Turns decoded inscriptions into transaction envelopes.
pub struct TransactionBuilder {
  compiler: Box<dyn Compiler + Send + Sync>,
  pub indexer: Address,
  pub controller: Address,
}

impl TransactionBuilder {
  pub fn new(
    compiler: Box<dyn Compiler + Send + Sync>,
    indexer: Address,
    controller: Address,
  ) -> Self {
    Self {
      compiler,
      indexer,
      controller,
    }
  }

  /// Decodes `inscription` sent by `sender` and builds its transaction.
  /// Never fails: problems are reported in the result.
  pub fn process(&self, context: &Context, inscription: &Value, sender: &str) -> ProcessResult {
    let inscription_id = inscription
      .get("inscription_id")
      .and_then(Value::as_str)
      .map(str::to_string);

    let kind = match OperationKind::detect(inscription) {
      Ok(kind) => kind,
      Err(err) => {
        return ProcessResult {
          kind: None,
          sender: sender.into(),
          inscription_id,
          transfer: None,
          outcome: Err(err),
        }
      }
    };

    let decoded = Inscription::decode_as(kind, inscription);

    ProcessResult {
      kind: Some(kind),
      sender: sender.into(),
      inscription_id,
      transfer: decoded
        .as_ref()
        .ok()
        .and_then(Inscription::transfer)
        .cloned(),
      outcome: decoded.and_then(|decoded| self.build(context, &decoded, sender)),
    }
  }

  pub fn build(
    &self,
    context: &Context,
    inscription: &Inscription,
    sender: &str,
  ) -> Result<Transaction, DecodeError> {
    let from = || {
      context
        .derive(sender)
        .map_err(|_| DecodeError::InvalidPkscript)
    };

    match inscription {
      Inscription::Call {
        contract,
        function,
        args,
      } => Ok(Transaction {
        from: from()?,
        to: Some(*contract),
        data: self.call_data(context, function, args)?,
      }),
      Inscription::Call2 { contract, data } => Ok(Transaction {
        from: from()?,
        to: Some(*contract),
        data: data.clone(),
      }),
      Inscription::Deploy {
        source,
        class,
        args,
      } => Ok(Transaction {
        from: from()?,
        to: None,
        data: self.deploy_data(context, source, class, args)?,
      }),
      Inscription::Deploy2 { bytecode } => Ok(Transaction {
        from: from()?,
        to: None,
        data: bytecode.clone(),
      }),
      Inscription::Deposit(transfer) => self.transfer(context, "mint", transfer, sender),
      Inscription::Withdraw(transfer) => self.transfer(context, "burn", transfer, sender),
    }
  }

  fn call_data(
    &self,
    context: &Context,
    function: &str,
    args: &[Argument],
  ) -> Result<Bytes, DecodeError> {
    let (types, values) = context
      .resolve_arguments(args)
      .map_err(|_| DecodeError::InvalidPkscript)?;

    let function = context.signatures.resolve(function, types.as_slice()).map_err(|err| {
      log::warn!("{err}");
      DecodeError::Exception
    })?;

    function.encode(values.as_slice()).map_err(|err| {
      log::warn!("failed to encode call to `{}`: {err}", function.signature);
      DecodeError::Exception
    })
  }

  fn deploy_data(
    &self,
    context: &Context,
    source: &str,
    class: &str,
    args: &[Argument],
  ) -> Result<Bytes, DecodeError> {
    let (_, values) = context
      .resolve_arguments(args)
      .map_err(|_| DecodeError::InvalidPkscript)?;

    let compilation = self.compiler.compile(source, class).map_err(|err| {
      log::warn!("failed to compile `{class}`: {err:#}");
      DecodeError::ContractCompile
    })?;

    let constructor_args = constructor_arguments(&compilation, &values).map_err(|err| {
      log::warn!("failed to encode constructor arguments of `{class}`: {err:#}");
      DecodeError::Exception
    })?;

    let mut data = compilation.bytecode.to_vec();
    data.extend(constructor_args);
    Ok(data.into())
  }

  fn transfer(
    &self,
    context: &Context,
    name: &str,
    transfer: &Transfer,
    sender: &str,
  ) -> Result<Transaction, DecodeError> {
    let account = context
      .derive(sender)
      .map_err(|_| DecodeError::InvalidPkscript)?;

    let data = context
      .signatures
      .resolve(name, &["string", "address", "uint256"])
      .map_err(|_| DecodeError::Exception)?
      .encode_values(vec![
        DynSolValue::String(transfer.ticker.clone()),
        DynSolValue::Address(account),
        DynSolValue::Uint(transfer.amount, 256),
      ])
      .map_err(|_| DecodeError::Exception)?;

    Ok(Transaction {
      from: self.indexer,
      to: Some(self.controller),
      data,
    })
  }

  /// Read-only `balanceOf(string,address)` call against the controller.
  pub fn balance_call(
    &self,
    context: &Context,
    script: &str,
    ticker: &str,
  ) -> Result<Transaction> {
    let account = context.derive(script)?;

    Ok(Transaction {
      from: account,
      to: Some(self.controller),
      data: context
        .signatures
        .resolve("balanceOf", &["string", "address"])?
        .encode_values(vec![
          DynSolValue::String(ticker.into()),
          DynSolValue::Address(account),
        ])?,
    })
  }

  /// Read-only call of `function` on `contract` as the owner of `script`.
  /// Returns `None` if the arguments are malformed, and an error if `script`
  /// is not a valid pkscript.
  pub fn view_call(
    &self,
    context: &Context,
    script: &str,
    contract: Address,
    function: &Value,
    args: &Value,
  ) -> Result<Option<Transaction>> {
    let from = context.derive(script)?;

    let Some(function) = function.as_str() else {
      return Ok(None);
    };

    let Some(args) = args.as_array().and_then(|args| {
      args
        .iter()
        .map(|arg| serde_json::from_value::<Argument>(arg.clone()).ok())
        .collect::<Option<Vec<Argument>>>()
    }) else {
      return Ok(None);
    };

    if args
      .iter()
      .any(|arg| signature::parse_type(&arg.ty).is_err())
    {
      return Ok(None);
    }

    Ok(
      self
        .call_data(context, function, &args)
        .ok()
        .map(|data| Transaction {
          from,
          to: Some(contract),
          data,
        }),
    )
  }
}

fn constructor_arguments(compilation: &Compilation, values: &[String]) -> Result<Vec<u8>> {
  let inputs = compilation.constructor_inputs()?;

  ensure!(
    inputs.len() == values.len(),
    "constructor takes {} arguments but {} were given",
    inputs.len(),
    values.len(),
  );

  let values = inputs
    .iter()
    .zip(values)
    .map(|(ty, value)| ty.coerce_str(value).map_err(Error::from))
    .collect::<Result<Vec<DynSolValue>>>()?;

  Ok(DynSolValue::Tuple(values).abi_encode_params())
}
