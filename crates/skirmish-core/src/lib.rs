//! Core types and definitions for the skirmish combat simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! ids, components, payload catalog, commands, events, state snapshots
//! and constants. It has no dependency on the ECS or any runtime framework.

pub mod catalog;
pub mod commands;
pub mod components;
pub mod constants;
pub mod enums;
pub mod events;
pub mod ids;
pub mod state;
pub mod types;
