// src/lib.rs
pub mod ecode;
pub use ecode::*;
