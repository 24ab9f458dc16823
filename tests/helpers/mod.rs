#![allow(unused_imports, dead_code)]
pub mod booking;
pub mod test_db;

pub use booking::*;
pub use test_db::*;
