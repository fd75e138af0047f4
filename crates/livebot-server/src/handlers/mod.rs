//! HTTP request handlers.

pub mod health;
pub mod install;
pub mod webhook;

pub use health::*;
pub use install::*;
pub use webhook::*;
