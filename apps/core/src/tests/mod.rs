//! Test Module
//!
//! Cross-module test suite for the wellness backend.
//!
//! ## Test Categories
//! - `brain_tests`: keyword and learned classification, guide composition
//! - `responder_tests`: the reply chain with mock generators and timeouts
//! - `session_tests`: chat history modes and the mood log
//! - `server_tests`: HTTP routes driven through the router
//! - `config_tests`: environment-driven configuration

mod support;

pub mod responder_tests;
