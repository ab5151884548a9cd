//! Configuration module for PatchKit
//!
//! Provides CLI argument definitions and snapshot capture settings.

mod settings;

pub use settings::*;
