mod component;
mod label;
mod render;
mod state;

pub use component::{ForceGraphCanvas, GraphHandle};
