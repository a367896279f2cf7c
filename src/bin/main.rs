fn main() {
  ordevm::main();
}
