pub mod backend;
pub mod config;
pub mod engine;
pub mod error;
pub mod feature;
pub mod io;
pub mod message;
pub mod paths;
pub mod session;
pub mod team;
pub mod template;
pub mod text;
pub mod timeline;
pub mod types;

pub use error::{EvolveError, Result};
