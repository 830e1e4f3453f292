//! Attendance Engine library crate.
//!
//! This crate exposes the monthly attendance summary engine, roster
//! analytics and the API components as reusable modules.  External
//! applications may depend on the `attendance_engine` crate and call
//! into `engine::summarize` directly or embed the API via
//! `api::build_router`.

pub mod models;
pub mod codes;
pub mod calendar;
pub mod engine;
pub mod analytics;
pub mod mutators;
pub mod roster;
pub mod validation;
pub mod io;
pub mod error;
pub mod config;
pub mod api;

pub use error::AttendanceError;
