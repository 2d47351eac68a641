//! the test_utils folder here shares builders and instrumented fakes between
//! unit tests of the cache, enumeration, coordinator and pipeline modules
mod common;
mod mock;

pub use common::*;
pub use mock::*;
