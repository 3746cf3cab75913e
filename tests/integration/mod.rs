//! Integration tests for argconf

mod cli_binary;
mod persistence;
mod test_utils;
