//! One module per `passvault` subcommand.

pub mod add;
pub mod delete;
pub mod keygen;
pub mod list;
pub mod login;
pub mod register;
pub mod serve;
pub mod update;
