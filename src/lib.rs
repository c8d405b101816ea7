mod infrastructure;
mod interface;
mod model;
mod presenter;

pub use infrastructure::*;
pub use interface::*;
pub use model::*;
pub use presenter::*;
