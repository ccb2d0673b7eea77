#[macro_use]
extern crate lazy_static;

pub mod models;
pub mod ext;
pub mod schema;
pub mod table;
pub mod merge;
pub mod metrics;
