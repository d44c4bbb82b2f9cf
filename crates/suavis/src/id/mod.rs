mod error;
mod snowflake;
mod worker;

pub use error::*;
pub use snowflake::*;
pub use worker::*;
