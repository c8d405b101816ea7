mod fetcher;
mod view;

pub use fetcher::*;
pub use view::*;
