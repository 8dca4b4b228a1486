// src/lib.rs
//! Live state diagram for a GL context.
//!
//! A [`session::Session`] sits between a teaching script and the context it
//! drives. Every intercepted call updates a diagram of global state, object
//! panels and binding arrows on a [`display::DisplaySurface`], flashing what
//! changed. [`stepper::Stepper`] walks the script one statement at a time.

pub mod api;
pub mod arrows;
pub mod config;
pub mod display;
pub mod error;
pub mod format;
pub mod gl;
pub mod intercept;
pub mod naming;
pub mod registry;
pub mod script;
pub mod session;
pub mod state_table;
pub mod stepper;
pub mod subscription;
