mod component;
mod presenter;
mod render;
mod state;

pub use component::GraphCanvas;
pub use presenter::{SignalPresenter, severity_class};
