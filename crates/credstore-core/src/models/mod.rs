pub mod authorization;
pub mod client;
pub mod error;
pub mod ledger;
pub mod scope;
pub mod token;
pub mod user;

pub use authorization::*;
pub use client::*;
pub use error::*;
pub use ledger::*;
pub use scope::*;
pub use token::*;
pub use user::*;
