//! Migration DDL parser module

mod element_type;
mod metadata;
mod schema_parser;

pub use element_type::*;
pub use metadata::*;
pub use schema_parser::*;
