//! Shared helpers for geoknn integration tests.

pub mod test_util;
