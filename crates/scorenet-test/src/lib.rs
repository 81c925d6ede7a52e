//! Shared test fixtures for scorenet crates.
//!
//! This crate provides domain types and naive score functions for testing.
//! It does NOT depend on `scorenet-scoring`, so the oracle shares no code
//! with the engine it checks.
//!
//! - [`entity`] - Minimal entities with a single comparable value
//! - [`scheduling`] - Employees and shifts
//! - [`timetable`] - Lessons with rooms, teachers and timeslots
//! - [`ops`] - Seeded random insert/update/retract sequences
//!
//! # Usage
//!
//! Add as a dev-dependency in your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! scorenet-test = { workspace = true }
//! ```

pub mod entity;
pub mod ops;
pub mod scheduling;
pub mod timetable;

pub use entity::Entity;
pub use ops::{FactStore, Op, OpGenerator};
pub use scheduling::{Employee, Shift};
pub use timetable::Lesson;
