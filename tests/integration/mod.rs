//! Integration tests for the barnstorm command runner

mod cli_dispatch;
mod config_integration;
mod test_utils;
