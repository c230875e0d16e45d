#![cfg(test)]
//! This crate has no direct `tracing` dependency, so these only build if the
//! common logging macros resolve through `lenscout_common`.

use lenscout_common::success;

#[test]
fn success_macro_builds_from_common_alone() {
    let port: u16 = 5001;
    success!("Port {port} found at {}", "127.0.0.1");
    success!(port, "found");
}
