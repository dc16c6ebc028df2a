//! Utility modules

pub mod imaging;
