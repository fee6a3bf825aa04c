//! # Client Service
//!
//! Drives a MAP exchange over a real transport.

pub mod client;

pub use client::{run_map, MapClient};
