mod entities;
mod error;

pub use entities::*;
pub use error::*;
