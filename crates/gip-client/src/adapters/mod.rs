//! Concrete framework adapters.

mod embedded;
mod web;

pub use embedded::EmbeddedAdapter;
pub use web::WebAdapter;
