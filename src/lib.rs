//! Interactive editing of tensor-product B-spline surfaces.
//!
//! Control points are picked through an id-color target and dragged in screen space. Drawing
//! goes through the [render::Renderer] capability, so everything here runs headless.

#[macro_use]
extern crate failure_derive;
#[macro_use]
extern crate log;
pub extern crate surfacevis_platform as platform;

pub mod data;
pub mod edit;
pub mod host;
pub mod plugin;
pub mod render;
mod util;
