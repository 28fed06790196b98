#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stderr)]
#![deny(clippy::print_stdout)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

pub mod catalog;
pub mod cli;
pub mod error;
pub mod report;
pub mod risk;
pub mod submit;
pub mod validate;

mod export;
mod render;
mod sources;
