#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate alloc;

pub mod analyzer;
pub mod config;
pub mod constants;
pub mod decoder;
pub mod instructions;
pub mod interpreter;
pub mod memory;
pub mod state;
pub mod utils;
