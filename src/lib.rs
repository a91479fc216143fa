//! libris application library
//!
//! Domain modules plus the startup sequence shared by the `libris-app` and
//! `libris-cli` binaries.

pub mod bootstrap;
pub mod modules;
