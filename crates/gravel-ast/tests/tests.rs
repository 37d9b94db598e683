// Integration-test harness for gravel-ast.
//
// Every integration test lives under `suite/` so Cargo links a single test
// binary for the crate.

mod suite;
