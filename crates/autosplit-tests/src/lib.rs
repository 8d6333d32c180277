//! Integration test crate for Autosplit.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on every library crate to verify they work together.

#[cfg(test)]
mod workflow;

#[cfg(test)]
mod interaction;

#[cfg(test)]
mod rendering;
