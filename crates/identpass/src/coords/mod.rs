//! Value types shared by the transform stage and the renderer.

mod color;

pub use color::ColorRgba;
