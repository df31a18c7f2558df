//! Data types and definitions.

mod camera;
pub mod cgmath_ext;
pub mod color;
mod grid;
mod trackball;

pub use self::camera::*;
pub use self::color::Color;
pub use self::grid::*;
pub use self::trackball::*;
