//! Core types and definitions for the skirmish tactical engine.
//!
//! This crate defines the vocabulary shared across all other crates:
//! unit snapshots, commands, tick reports, events, constants and the
//! tunable configuration. It has no dependency on any game client.

pub mod commands;
pub mod config;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod state;
pub mod types;
pub mod unit;
