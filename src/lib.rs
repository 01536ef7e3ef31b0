// src/lib.rs

//! newwork: tracks web pages and flags the ones with new work.

pub mod error;
pub mod models;
pub mod pipeline;
#[cfg(feature = "serve")]
pub mod server;
pub mod services;
pub mod storage;
pub mod utils;
pub mod view;

#[cfg(test)]
mod testing;
