use crate::render::{Context, Flag, Primitive, Renderer, Uniform};

/// Tessellation levels for the surface patch. Owned by the host plugin, passed through as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TessLevels {
    pub inner: u32,
    pub outer: u32,
}

impl TessLevels {
    /// Clamps both levels to `[1, max]`.
    pub fn clamped(self, max: u32) -> TessLevels {
        let max = max.max(1);
        TessLevels {
            inner: self.inner.max(1).min(max),
            outer: self.outer.max(1).min(max),
        }
    }
}

impl Default for TessLevels {
    fn default() -> TessLevels {
        TessLevels {
            inner: 16,
            outer: 16,
        }
    }
}

/// How control points are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlPointDisplay {
    Hidden,
    /// Depth tested against the surface.
    Visible,
    /// Drawn without writing depth, so the surface never hides them.
    Always,
}

/// Highest pattern frequency passed to the surface shader.
pub const MAX_PATTERN_FREQ: u32 = 100;

/// Phong material of the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shading {
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub k_ambient: f32,
    pub k_diffuse: f32,
    pub k_specular: f32,
    /// Specular exponent.
    pub k_exp: f32,
}

impl Default for Shading {
    fn default() -> Shading {
        Shading {
            ambient: [1., 1., 1.],
            diffuse: [1., 1., 1.],
            specular: [1., 1., 1.],
            k_ambient: 0.2,
            k_diffuse: 0.7,
            k_specular: 0.,
            k_exp: 120.,
        }
    }
}

/// Display options that are not part of the surface itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawStyle {
    pub control_points: ControlPointDisplay,
    pub point_size: f32,
    pub wireframe: bool,

    /// Draws the unit cube around the origin as a reference.
    pub show_box: bool,

    /// Colors the surface by its normals instead of shading it.
    pub show_normals: bool,

    /// Frequency of the parameter-space pattern; clamped to [MAX_PATTERN_FREQ] when drawing.
    pub freq: u32,

    pub shading: Shading,
}

impl Default for DrawStyle {
    fn default() -> DrawStyle {
        DrawStyle {
            control_points: ControlPointDisplay::Visible,
            point_size: 10.,
            wireframe: false,
            show_box: false,
            show_normals: false,
            freq: 4,
            shading: Shading::default(),
        }
    }
}

/// Corners of the unit cube centered at the origin.
const BOX_VERTICES: [f32; 24] = [
    -0.5, -0.5, -0.5, //
    0.5, -0.5, -0.5, //
    -0.5, 0.5, -0.5, //
    0.5, 0.5, -0.5, //
    -0.5, -0.5, 0.5, //
    0.5, -0.5, 0.5, //
    -0.5, 0.5, 0.5, //
    0.5, 0.5, 0.5,
];

/// The twelve cube edges as a line list.
const BOX_EDGES: [u32; 24] = [
    0, 1, 0, 2, 1, 3, 2, 3, //
    0, 4, 1, 5, 2, 6, 3, 7, //
    4, 5, 4, 6, 5, 7, 6, 7,
];

/// Everything needed to draw a B-spline surface and its control net.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceDrawData {
    pub n: usize,
    pub m: usize,
    pub degree_p: usize,
    pub degree_q: usize,

    /// Control point positions, three floats per point.
    pub positions: Vec<f32>,

    /// Control point picking colors, three floats per point.
    pub id_colors: Vec<f32>,

    /// Control net line list.
    pub edge_indices: Vec<u32>,

    pub knots_u: Vec<f32>,
    pub knots_v: Vec<f32>,
    pub tess: TessLevels,

    /// Picking color of the selected point; black if nothing is selected.
    pub picked_color: [f32; 3],
}

/// Vertices per patch; the evaluator runs on one quad patch covering the whole parameter domain.
const PATCH_VERTICES: u32 = 4;

/// Draws the reference box (if enabled), the control net (as points and lines) and the
/// tessellated surface.
pub fn draw_surface<R: Renderer + ?Sized>(
    renderer: &mut R,
    ctx: &Context,
    data: &SurfaceDrawData,
    style: &DrawStyle,
) {
    if style.show_box {
        renderer.set_vertices(&BOX_VERTICES, &[], &BOX_EDGES);
        renderer.set_uniform("projMx", Uniform::Mat4(ctx.projection));
        renderer.set_uniform("viewMx", Uniform::Mat4(ctx.view));
        renderer.draw(Primitive::Lines);
    }

    if style.control_points != ControlPointDisplay::Hidden {
        if style.control_points == ControlPointDisplay::Always {
            renderer.set_flag(Flag::DepthWrite, false);
        }
        renderer.set_vertices(&data.positions, &data.id_colors, &data.edge_indices);
        renderer.set_uniform("projMx", Uniform::Mat4(ctx.projection));
        renderer.set_uniform("viewMx", Uniform::Mat4(ctx.view));
        renderer.set_uniform("pickedIdCol", Uniform::Vec3(data.picked_color));
        renderer.set_uniform("pointSize", Uniform::Float(style.point_size));
        renderer.draw(Primitive::Points);
        renderer.draw(Primitive::Lines);
        renderer.set_flag(Flag::DepthWrite, true);
    }

    renderer.set_flag(Flag::Wireframe, style.wireframe);
    renderer.set_uniform("tessLevelInner", Uniform::Int(data.tess.inner as i32));
    renderer.set_uniform("tessLevelOuter", Uniform::Int(data.tess.outer as i32));
    renderer.set_uniform("projMx", Uniform::Mat4(ctx.projection));
    renderer.set_uniform("viewMx", Uniform::Mat4(ctx.view));
    renderer.set_uniform("n", Uniform::Int(data.n as i32));
    renderer.set_uniform("m", Uniform::Int(data.m as i32));
    renderer.set_uniform("degreeP", Uniform::Int(data.degree_p as i32));
    renderer.set_uniform("degreeQ", Uniform::Int(data.degree_q as i32));
    renderer.set_uniform("knotsU", Uniform::FloatArray(data.knots_u.clone()));
    renderer.set_uniform("knotsV", Uniform::FloatArray(data.knots_v.clone()));
    renderer.set_uniform("controlPoints", Uniform::FloatArray(data.positions.clone()));
    renderer.set_uniform("showNormals", Uniform::Bool(style.show_normals));
    renderer.set_uniform("freq", Uniform::Int(style.freq.min(MAX_PATTERN_FREQ) as i32));

    let shading = &style.shading;
    renderer.set_uniform("ambientColor", Uniform::Vec3(shading.ambient));
    renderer.set_uniform("diffuseColor", Uniform::Vec3(shading.diffuse));
    renderer.set_uniform("specularColor", Uniform::Vec3(shading.specular));
    renderer.set_uniform("k_amb", Uniform::Float(shading.k_ambient));
    renderer.set_uniform("k_diff", Uniform::Float(shading.k_diffuse));
    renderer.set_uniform("k_spec", Uniform::Float(shading.k_specular));
    renderer.set_uniform("k_exp", Uniform::Float(shading.k_exp));
    renderer.draw(Primitive::Patches(PATCH_VERTICES));
    renderer.set_flag(Flag::Wireframe, false);
}

#[test]
fn tess_level_clamping() {
    let levels = TessLevels { inner: 0, outer: 99 }.clamped(64);
    assert_eq!(levels, TessLevels { inner: 1, outer: 64 });
    assert_eq!(TessLevels::default().clamped(0), TessLevels { inner: 1, outer: 1 });
}
