//! Request and response bodies for the HTTP surface.

mod employees;
mod sync;

pub use employees::*;
pub use sync::*;
