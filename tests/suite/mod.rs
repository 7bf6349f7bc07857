//! Integration test modules.

mod feature;
mod lifecycle;
mod properties;
mod scenarios;
