//! Credential verification

pub mod jwt;
