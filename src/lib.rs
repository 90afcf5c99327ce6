//! Asset management for LIBERO robot-learning benchmarks.
//!
//! [`paths`] resolves where assets live, [`catalog`] knows which tasks each
//! benchmark has, [`verify`] cross-checks the two, [`acquire`] fills dataset
//! gaps from a remote source, and [`replay`] renders recorded demonstrations.
pub mod acquire;
pub mod catalog;
pub mod cli;
pub mod env_check;
pub mod error;
pub mod paths;
pub mod replay;
pub mod verify;
pub mod workflow;

#[cfg(test)]
mod test_support;
