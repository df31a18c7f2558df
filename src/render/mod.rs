//! Rendering.
//!
//! Nothing in this crate talks to a graphics API. Plugins describe what to draw through the
//! [Renderer] capability, which a host implements on top of whatever backend it uses.

mod recorder;
mod surface;

pub use self::recorder::*;
pub use self::surface::*;

use crate::data::cgmath_ext::Matrix4Ext;
use cgmath::{Matrix4, SquareMatrix, Vector3};

/// Viewport size and depth range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Width in pixels.
    pub width: u32,

    /// Height in pixels.
    pub height: u32,

    /// Near clip plane.
    pub z_near: f32,

    /// Far clip plane.
    pub z_far: f32,
}

impl Viewport {
    /// Maps normalized device coordinates to window pixels (origin top left, Y down). Depth is
    /// mapped linearly from [-1, 1] to [z_near, z_far].
    pub fn ndc_to_screen(&self, ndc: Vector3<f32>) -> Vector3<f32> {
        let (w, h) = (self.width as f32, self.height as f32);
        let (n, f) = (self.z_near, self.z_far);
        Vector3::new(
            (ndc.x + 1.) * w / 2.,
            -(ndc.y - 1.) * h / 2.,
            ndc.z * (f - n) / 2. + (f + n) / 2.,
        )
    }

    /// Inverse of [Viewport::ndc_to_screen].
    pub fn screen_to_ndc(&self, screen: Vector3<f32>) -> Vector3<f32> {
        let (w, h) = (self.width as f32, self.height as f32);
        let (n, f) = (self.z_near, self.z_far);
        Vector3::new(
            2. * screen.x / w - 1.,
            1. - 2. * screen.y / h,
            (2. * screen.z - (f + n)) / (f - n),
        )
    }

    /// Returns false if this viewport cannot map anything (zero size or empty depth range).
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0 && self.z_far != self.z_near
    }
}

/// Per-frame view state handed to plugins and the surface editor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Context {
    /// The projection matrix.
    pub projection: Matrix4<f32>,

    /// The view matrix.
    pub view: Matrix4<f32>,

    /// The viewport.
    pub viewport: Viewport,
}

impl Context {
    /// Creates a context with identity matrices.
    pub fn identity(viewport: Viewport) -> Context {
        Context {
            projection: Matrix4::identity(),
            view: Matrix4::identity(),
            viewport,
        }
    }

    /// `projection * view`.
    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection * self.view
    }

    /// Maps a world position to window pixels and mapped depth.
    pub fn world_to_screen(&self, world: Vector3<f32>) -> Option<Vector3<f32>> {
        let ndc = self.view_projection().transform_point3(world)?;
        Some(self.viewport.ndc_to_screen(ndc))
    }

    /// Maps window pixels and mapped depth back to a world position.
    pub fn screen_to_world(&self, screen: Vector3<f32>) -> Option<Vector3<f32>> {
        let ndc = self.viewport.screen_to_ndc(screen);
        self.view_projection().inverse_transform_point3(ndc)
    }
}

/// A uniform value.
#[derive(Debug, Clone, PartialEq)]
pub enum Uniform {
    Bool(bool),
    Int(i32),
    Float(f32),
    Vec3([f32; 3]),
    Mat4(Matrix4<f32>),
    FloatArray(Vec<f32>),
}

/// Primitive types for draw calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Points,
    Lines,
    /// Tessellation patches with the given number of vertices per patch.
    Patches(u32),
}

/// Pipeline switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    /// Writing to the depth buffer.
    DepthWrite,
    /// Rasterizing polygons as outlines.
    Wireframe,
}

/// The drawing capability a host provides to plugins.
///
/// Implementations render into a color target and, alongside it, an id-color target used for
/// picking; vertex colors passed to [Renderer::set_vertices] are written to the latter.
pub trait Renderer {
    /// Replaces the current vertex data. `positions` and `colors` hold three floats per vertex.
    fn set_vertices(&mut self, positions: &[f32], colors: &[f32], indices: &[u32]);

    /// Sets a uniform for subsequent draw calls.
    fn set_uniform(&mut self, name: &str, value: Uniform);

    /// Enables or disables a pipeline switch.
    fn set_flag(&mut self, flag: Flag, enabled: bool);

    /// Issues a draw call with the current vertex data and uniforms.
    fn draw(&mut self, primitive: Primitive);

    /// Reads one pixel of the id-color target. Coordinates are window pixels, origin top left.
    fn read_pick_color(&mut self, x: u32, y: u32) -> [u8; 3];

    /// Reloads shader sources, if the backend has any.
    fn reload_shaders(&mut self) {}
}

#[test]
fn screen_mapping() {
    let viewport = Viewport {
        width: 200,
        height: 100,
        z_near: 1.,
        z_far: 3.,
    };
    assert_eq!(
        viewport.ndc_to_screen(Vector3::new(-1., 1., -1.)),
        Vector3::new(0., 0., 1.)
    );
    assert_eq!(
        viewport.ndc_to_screen(Vector3::new(1., -1., 1.)),
        Vector3::new(200., 100., 3.)
    );
    assert_eq!(
        viewport.screen_to_ndc(Vector3::new(100., 50., 2.)),
        Vector3::new(0., 0., 0.)
    );
    assert!(viewport.is_valid());
    assert!(!Viewport { width: 0, ..viewport }.is_valid());
}

#[test]
fn context_round_trip() {
    use crate::data::{OrbitCamera, Projection};

    let projection = Projection {
        width: 640,
        height: 480,
        clip_near: 0.5,
        clip_far: 5.,
        ..Projection::new()
    };
    let ctx = Context {
        projection: projection.matrix(),
        view: OrbitCamera::new(2.).view_matrix(),
        viewport: Viewport {
            width: 640,
            height: 480,
            z_near: projection.clip_near,
            z_far: projection.clip_far,
        },
    };

    let world = Vector3::new(0.25, -0.1, 0.3);
    let screen = ctx.world_to_screen(world).unwrap();
    let back = ctx.screen_to_world(screen).unwrap();
    assert!((back.x - world.x).abs() < 1e-3, "{:?}", back);
    assert!((back.y - world.y).abs() < 1e-3, "{:?}", back);
    assert!((back.z - world.z).abs() < 1e-3, "{:?}", back);

    // the origin projects to the center of the window
    let center = ctx.world_to_screen(Vector3::new(0., 0., 0.)).unwrap();
    assert!((center.x - 320.).abs() < 1e-3 && (center.y - 240.).abs() < 1e-3);
}
