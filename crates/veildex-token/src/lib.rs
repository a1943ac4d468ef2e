mod error;
mod token;

pub use error::{Result, TokenError};
pub use token::EncryptedToken;
