use {super::*, ordevm::subcommand::derive::Output};

#[test]
fn pkscript() {
  pretty_assert_eq!(
    CommandBuilder::new(format!("derive {SENDER}")).run_and_deserialize_output::<Output>(),
    Output {
      pkscript: SENDER.into(),
      address: ordevm::address::derive(SENDER).unwrap(),
    }
  );
}

#[test]
fn bitcoin_address() {
  let output = CommandBuilder::new("derive bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4")
    .run_and_deserialize_output::<Output>();

  assert_eq!(output.pkscript, SENDER);
  assert_eq!(output.address, ordevm::address::derive(SENDER).unwrap());
}

#[test]
fn address_for_other_chain() {
  CommandBuilder::new("--regtest derive bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4")
    .expected_exit_code(1)
    .stderr_regex("error: `bc1q.*` is not a regtest address.*")
    .run_and_extract_stdout();
}

#[test]
fn invalid_pkscript() {
  CommandBuilder::new("derive 00zz")
    .expected_exit_code(1)
    .stderr_regex("error: invalid pkscript `00zz`: not a hex byte string\n")
    .run_and_extract_stdout();
}

#[test]
fn yaml_output() {
  CommandBuilder::new(format!("--format yaml derive {SENDER}"))
    .stdout_regex(format!("pkscript: '?{SENDER}'?\naddress: .*\n"))
    .run_and_extract_stdout();
}
