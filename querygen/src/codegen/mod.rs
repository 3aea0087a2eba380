//! Query generation module

pub mod helpers;
mod naming;
mod query_generator;
mod query_kind;
mod template_manager;

pub use naming::*;
pub use query_generator::*;
pub use query_kind::*;
pub use template_manager::*;
