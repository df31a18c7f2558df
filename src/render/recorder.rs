use crate::render::{Flag, Primitive, Renderer, Uniform};
use fnv::FnvHashMap;

/// A recorded renderer call.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Vertices {
        positions: Vec<f32>,
        colors: Vec<f32>,
        indices: Vec<u32>,
    },
    Uniform(String, Uniform),
    Flag(Flag, bool),
    Draw(Primitive),
    ReadPick(u32, u32),
    ReloadShaders,
}

/// A headless renderer that records every call.
///
/// Pick reads are answered with [Recorder::pick_color], which the owner sets to whatever the
/// id-color target would contain under the pointer.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    commands: Vec<Command>,
    uniforms: FnvHashMap<String, Uniform>,

    /// The color returned by pick reads.
    pub pick_color: [u8; 3],
}

impl Recorder {
    /// Creates an empty recorder whose pick reads return the background.
    pub fn new() -> Recorder {
        Recorder::default()
    }

    /// All recorded calls, in order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// The most recent value of a uniform.
    pub fn uniform(&self, name: &str) -> Option<&Uniform> {
        self.uniforms.get(name)
    }

    /// All draw calls, in order.
    pub fn draws(&self) -> Vec<Primitive> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                Command::Draw(primitive) => Some(*primitive),
                _ => None,
            })
            .collect()
    }

    /// The most recent vertex data.
    pub fn last_vertices(&self) -> Option<(&[f32], &[f32], &[u32])> {
        self.commands.iter().rev().find_map(|cmd| match cmd {
            Command::Vertices {
                positions,
                colors,
                indices,
            } => Some((&positions[..], &colors[..], &indices[..])),
            _ => None,
        })
    }

    /// Forgets recorded calls but keeps uniform values and the pick color.
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl Renderer for Recorder {
    fn set_vertices(&mut self, positions: &[f32], colors: &[f32], indices: &[u32]) {
        self.commands.push(Command::Vertices {
            positions: positions.to_vec(),
            colors: colors.to_vec(),
            indices: indices.to_vec(),
        });
    }

    fn set_uniform(&mut self, name: &str, value: Uniform) {
        self.uniforms.insert(name.into(), value.clone());
        self.commands.push(Command::Uniform(name.into(), value));
    }

    fn set_flag(&mut self, flag: Flag, enabled: bool) {
        self.commands.push(Command::Flag(flag, enabled));
    }

    fn draw(&mut self, primitive: Primitive) {
        self.commands.push(Command::Draw(primitive));
    }

    fn read_pick_color(&mut self, x: u32, y: u32) -> [u8; 3] {
        self.commands.push(Command::ReadPick(x, y));
        self.pick_color
    }

    fn reload_shaders(&mut self) {
        self.commands.push(Command::ReloadShaders);
    }
}

#[test]
fn records_surface_draw() {
    use crate::data::ControlGrid;
    use crate::render::{
        draw_surface, ControlPointDisplay, Context, DrawStyle, SurfaceDrawData, TessLevels,
        Viewport,
    };

    let grid = ControlGrid::new(4, 5, 3, 3).unwrap();
    let data = SurfaceDrawData {
        n: grid.n(),
        m: grid.m(),
        degree_p: grid.degree_p(),
        degree_q: grid.degree_q(),
        positions: grid.positions(),
        id_colors: grid.id_colors(),
        edge_indices: grid.edge_indices().to_vec(),
        knots_u: grid.knots_u().to_vec(),
        knots_v: grid.knots_v().to_vec(),
        tess: TessLevels::default(),
        picked_color: [0., 0., 0.],
    };
    let ctx = Context::identity(Viewport {
        width: 64,
        height: 64,
        z_near: 0.01,
        z_far: 10.,
    });

    let mut recorder = Recorder::new();
    draw_surface(&mut recorder, &ctx, &data, &DrawStyle::default());
    assert_eq!(
        recorder.draws(),
        vec![Primitive::Points, Primitive::Lines, Primitive::Patches(4)]
    );
    assert_eq!(recorder.last_vertices().unwrap().2, grid.edge_indices());
    assert_eq!(
        recorder.uniform("knotsV"),
        Some(&Uniform::FloatArray(vec![0., 0., 0., 0., 0.5, 1., 1., 1., 1.]))
    );
    assert_eq!(recorder.uniform("tessLevelInner"), Some(&Uniform::Int(16)));

    recorder.clear();
    let style = DrawStyle {
        control_points: ControlPointDisplay::Hidden,
        ..DrawStyle::default()
    };
    draw_surface(&mut recorder, &ctx, &data, &style);
    assert_eq!(recorder.draws(), vec![Primitive::Patches(4)]);
    assert!(recorder.last_vertices().is_none());

    recorder.clear();
    let style = DrawStyle {
        control_points: ControlPointDisplay::Always,
        ..DrawStyle::default()
    };
    draw_surface(&mut recorder, &ctx, &data, &style);
    assert_eq!(recorder.commands()[0], Command::Flag(Flag::DepthWrite, false));

    // default shading
    assert_eq!(recorder.uniform("showNormals"), Some(&Uniform::Bool(false)));
    assert_eq!(recorder.uniform("freq"), Some(&Uniform::Int(4)));
    assert_eq!(recorder.uniform("k_amb"), Some(&Uniform::Float(0.2)));
    assert_eq!(recorder.uniform("k_diff"), Some(&Uniform::Float(0.7)));
    assert_eq!(recorder.uniform("k_spec"), Some(&Uniform::Float(0.)));
    assert_eq!(recorder.uniform("k_exp"), Some(&Uniform::Float(120.)));
    assert_eq!(
        recorder.uniform("ambientColor"),
        Some(&Uniform::Vec3([1., 1., 1.]))
    );

    recorder.clear();
    let style = DrawStyle {
        show_box: true,
        show_normals: true,
        freq: 500,
        ..DrawStyle::default()
    };
    draw_surface(&mut recorder, &ctx, &data, &style);
    assert_eq!(
        recorder.draws(),
        vec![
            Primitive::Lines,
            Primitive::Points,
            Primitive::Lines,
            Primitive::Patches(4)
        ]
    );
    match &recorder.commands()[0] {
        Command::Vertices {
            positions,
            colors,
            indices,
        } => {
            assert_eq!(positions.len(), 24);
            assert!(colors.is_empty());
            assert_eq!(indices.len(), 24);
            assert!(indices.iter().all(|i| *i < 8));
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(recorder.last_vertices().unwrap().2, grid.edge_indices());
    assert_eq!(recorder.uniform("showNormals"), Some(&Uniform::Bool(true)));
    assert_eq!(recorder.uniform("freq"), Some(&Uniform::Int(100)));
}
