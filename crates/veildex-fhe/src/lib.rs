mod ciphertext;
mod clear;
mod engine;
mod error;
mod threshold;

pub use ciphertext::{EncBool, EncUint};
pub use clear::ClearEngine;
pub use engine::FheEngine;
pub use error::{FheError, Result};
pub use threshold::{LocalQuorum, RequestId, ThresholdDecryptor};
