//! Windows installer packaging and code signing.

pub mod nsis;
pub mod sign;
