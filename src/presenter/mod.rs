mod main_presenter;

pub use main_presenter::*;
