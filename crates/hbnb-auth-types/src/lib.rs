//! Session auth shared by HBnB services and their tests.
//!
//! Provides session-token issue/validation and the bearer `Identity` extractor.

pub mod identity;
pub mod token;
