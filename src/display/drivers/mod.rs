// src/display/drivers/mod.rs
//! Display surface implementations.

pub mod headless;

pub use headless::{
    ElementFlags, ElementKind, HeadlessEvent, HeadlessLayout, HeadlessProbe, HeadlessSurface,
    MAX_EVENTS,
};
