//! Shared test utilities and fixtures.

#![allow(dead_code)]

use std::net::TcpListener;

pub const ACCESS_TOKEN: &str = "access_token";

pub const VALIDATION_PROBLEM_JSON: &str = include_str!("../fixtures/validation_problem.json");
pub const LOGIC_PROBLEM_JSON: &str = include_str!("../fixtures/logic_problem.json");
pub const ORDER_JSON: &str = include_str!("../fixtures/order.json");

/// Returns a local URL nothing is listening on.
pub fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind ephemeral port");
    let port = listener
        .local_addr()
        .expect("failed to read local address")
        .port();
    drop(listener);

    format!("http://127.0.0.1:{port}/path")
}
