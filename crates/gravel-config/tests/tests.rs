// Integration-test harness for gravel-config.
//
// Cargo builds one test binary per `tests/*.rs` file, so every integration
// test lives under `suite/` and is compiled into this single binary.

mod suite;
