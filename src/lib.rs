// Library target used by the integration tests and criterion benchmarks.
// The binary entry point is main.rs, which declares the same module tree.
// The terminal front end is only exercised through the binary, so allow
// dead code here.
#![allow(dead_code)]

rust_i18n::i18n!("locales", fallback = "en");

pub mod chart;
pub mod config;
pub mod grammar;
pub mod session;

// Private: pulled in by config (theme names) and kept compiling with the lib
mod app;
mod event;
mod ui;
