//! Internal modules for dimcert

pub mod config;
#[macro_use]
pub mod macros;
pub mod output;
pub mod memory;
pub mod certify;
pub mod cip;
pub mod cnf;
pub mod dimspec;
pub mod error;
pub mod input;
pub mod literal;
pub mod parser;
pub mod qcir;
pub mod reindex;
pub mod system;
pub mod trace;
