//! Script input and summary output in delimited text.

pub mod account_writer;
pub mod command_reader;
