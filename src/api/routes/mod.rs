//! Shell Routes
//!
//! Route handlers organized by functionality.

pub mod actions;
pub mod assets;
pub mod health;
pub mod pages;
