//! # Engine Module
//!
//! Runtime core implementation.
//!
//! This module contains the building blocks a host entity composes:
//! - Observer bus and observable values
//! - Hashed keys
//! - Component registry with per-frame fan-out
//! - State machine, states and transitions
//! - Event hub and configuration
//!
//! Public API exposure is controlled by `lib.rs`.

pub mod types;
pub mod error;
pub mod key;
pub mod observer;
pub mod observable;
pub mod component;
pub mod model;
pub mod state;
pub mod transition;
pub mod machine;
pub mod hub;
pub mod config;
