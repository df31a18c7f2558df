//! Interactive B-spline surface editing.

use crate::data::color::color_to_id;
use crate::data::{GridError, OrbitCamera, Projection};
use crate::edit::{EditError, MoveMode, SurfaceEditor};
use crate::platform::event::{Button, ButtonAction, KeyAction, KeyCode, Modifiers};
use crate::plugin::{Frame, Plugin, PluginContext, PluginDef};
use crate::render::{draw_surface, Context, DrawStyle, Renderer, TessLevels, Viewport};
use std::fs;
use std::path::PathBuf;

pub static SURFACE_VIS: PluginDef = PluginDef {
    idx: 104,
    name: "PCVC/SurfaceVis",
    create: SurfaceVis::create,
};

/// Surface editor settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceVisConfig {
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    pub z_near: f32,
    pub z_far: f32,

    /// Initial number of control points along u.
    pub n: usize,
    /// Initial number of control points along v.
    pub m: usize,
    pub degree_p: usize,
    pub degree_q: usize,

    /// Smallest grid size [SurfaceVis::set_grid_size] accepts along either direction.
    pub min_grid_size: usize,
    /// Largest grid size [SurfaceVis::set_grid_size] accepts along either direction.
    pub max_grid_size: usize,

    pub tess: TessLevels,

    /// Upper bound for tessellation levels, usually whatever the GPU supports.
    pub max_tess_level: u32,

    pub style: DrawStyle,

    /// Control point file name, relative to the models directory.
    pub data_file: String,

    /// Models directory, relative to the resources root.
    pub models_dir: PathBuf,
}

impl SurfaceVisConfig {
    /// Creates the default configuration: a flat bicubic 4×4 grid seen through a 45° camera with
    /// clip planes at 0.01 and 10, tessellated 16×16, and `test.txt` in `models` as data file.
    pub fn new() -> SurfaceVisConfig {
        SurfaceVisConfig {
            fov_y: 45.,
            z_near: 0.01,
            z_far: 10.,
            n: 4,
            m: 4,
            degree_p: 3,
            degree_q: 3,
            min_grid_size: 2,
            max_grid_size: 8,
            tess: TessLevels::default(),
            max_tess_level: 64,
            style: DrawStyle::default(),
            data_file: "test.txt".into(),
            models_dir: "models".into(),
        }
    }
}

impl Default for SurfaceVisConfig {
    fn default() -> SurfaceVisConfig {
        SurfaceVisConfig::new()
    }
}

/// The surface editing plugin.
pub struct SurfaceVis {
    config: SurfaceVisConfig,
    editor: SurfaceEditor,
    projection: Projection,
    tess: TessLevels,
    style: DrawStyle,
    models_dir: PathBuf,
    last_mouse: (f64, f64),
}

impl SurfaceVis {
    /// Creates the plugin with the configured grid.
    pub fn new(config: SurfaceVisConfig, ctx: &PluginContext) -> Result<SurfaceVis, GridError> {
        let editor = SurfaceEditor::new(config.n, config.m, config.degree_p, config.degree_q)?;
        Ok(SurfaceVis::with_editor(config, editor, ctx))
    }

    fn with_editor(
        config: SurfaceVisConfig,
        editor: SurfaceEditor,
        ctx: &PluginContext,
    ) -> SurfaceVis {
        let projection = Projection {
            fov_y: config.fov_y,
            clip_near: config.z_near,
            clip_far: config.z_far,
            ..Projection::new()
        };
        SurfaceVis {
            tess: config.tess.clamped(config.max_tess_level),
            style: config.style,
            models_dir: ctx.resource(&config.models_dir),
            config,
            editor,
            projection,
            last_mouse: (0., 0.),
        }
    }

    fn create(ctx: &PluginContext) -> Box<dyn Plugin> {
        match SurfaceVis::new(SurfaceVisConfig::default(), ctx) {
            Ok(plugin) => Box::new(plugin),
            Err(err) => {
                warn!(target: "surfacevis", "Falling back to the default grid: {}", err);
                Box::new(SurfaceVis::with_editor(
                    SurfaceVisConfig::default(),
                    SurfaceEditor::default(),
                    ctx,
                ))
            }
        }
    }

    pub fn config(&self) -> &SurfaceVisConfig {
        &self.config
    }

    pub fn editor(&self) -> &SurfaceEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut SurfaceEditor {
        &mut self.editor
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn style(&self) -> &DrawStyle {
        &self.style
    }

    pub fn style_mut(&mut self) -> &mut DrawStyle {
        &mut self.style
    }

    pub fn tess_levels(&self) -> TessLevels {
        self.tess
    }

    /// Sets tessellation levels, clamped to `[1, max_tess_level]`.
    pub fn set_tess_levels(&mut self, tess: TessLevels) {
        self.tess = tess.clamped(self.config.max_tess_level);
    }

    /// The current grid size.
    pub fn grid_size(&self) -> (usize, usize) {
        (self.editor.grid().n(), self.editor.grid().m())
    }

    /// Changes the grid size, clamped to the configured range.
    ///
    /// The grid is only regenerated if the clamped size differs from the current one, so edits
    /// survive redundant calls.
    pub fn set_grid_size(&mut self, n: usize, m: usize) -> Result<(), GridError> {
        let (min, max) = (self.config.min_grid_size, self.config.max_grid_size);
        let size = (n.max(min).min(max), m.max(min).min(max));
        if size == self.grid_size() {
            return Ok(());
        }
        self.editor.resize_grid(size.0, size.1)
    }

    /// Path of the control point file.
    pub fn data_path(&self) -> PathBuf {
        self.models_dir.join(&self.config.data_file)
    }

    /// Sets the control point file name, relative to the models directory.
    pub fn set_data_file<S: Into<String>>(&mut self, name: S) {
        self.config.data_file = name.into();
    }

    /// Loads the control point file.
    pub fn load(&mut self) -> Result<(), EditError> {
        let path = self.data_path();
        self.editor.load(path)
    }

    /// Saves the control point file, creating the models directory if needed.
    pub fn save(&self) -> Result<(), EditError> {
        fs::create_dir_all(&self.models_dir)?;
        self.editor.save(self.data_path())
    }

    /// The render context for the given camera.
    pub fn context(&self, camera: &OrbitCamera) -> Context {
        Context {
            projection: self.projection.matrix(),
            view: camera.view_matrix(),
            viewport: Viewport {
                width: self.projection.width,
                height: self.projection.height,
                z_near: self.projection.clip_near,
                z_far: self.projection.clip_far,
            },
        }
    }

    fn pick(&mut self, renderer: &mut dyn Renderer) {
        let (x, y) = self.last_mouse;
        let color = renderer.read_pick_color(x.max(0.) as u32, y.max(0.) as u32);
        self.editor.pick(x, y, color_to_id(color));
    }
}

impl Plugin for SurfaceVis {
    fn render(&mut self, frame: Frame) {
        let ctx = self.context(frame.camera);
        let data = self.editor.draw_data(self.tess);
        draw_surface(frame.renderer, &ctx, &data, &self.style);
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.projection.width = width;
        self.projection.height = height;
    }

    fn keyboard(&mut self, key: KeyCode, action: KeyAction, _mods: Modifiers, frame: Frame) {
        if action != KeyAction::Press {
            return;
        }
        match key {
            KeyCode::R => frame.renderer.reload_shaders(),
            KeyCode::X => self.editor.deselect(),
            KeyCode::RightArrow => self.editor.select_next(),
            KeyCode::LeftArrow => self.editor.select_previous(),
            KeyCode::L => {
                if let Err(err) = self.load() {
                    warn!(
                        target: "surfacevis",
                        "Could not load {}: {}", self.data_path().display(), err
                    );
                }
            }
            KeyCode::S => {
                if let Err(err) = self.save() {
                    warn!(
                        target: "surfacevis",
                        "Could not save {}: {}", self.data_path().display(), err
                    );
                }
            }
            KeyCode::Space => self.editor.reset(),
            _ => (),
        }
    }

    fn mouse_button(&mut self, button: Button, action: ButtonAction, mods: Modifiers, frame: Frame) {
        if action != ButtonAction::Press || !mods.only_shift() {
            self.editor.end_move();
            return;
        }
        match button {
            Button::Primary => self.pick(frame.renderer),
            Button::Middle => self.editor.begin_move(MoveMode::PlaneXY),
            Button::Secondary => self.editor.begin_move(MoveMode::AxisZ),
            Button::Other(_) => self.editor.end_move(),
        }
    }

    fn mouse_move(&mut self, x: f64, y: f64, frame: Frame) {
        let (dx, dy) = (x - self.last_mouse.0, y - self.last_mouse.1);
        if self.editor.move_mode() != MoveMode::None {
            let ctx = self.context(frame.camera);
            self.editor.drag_to(dx as f32, dy as f32, &ctx);
        }
        self.last_mouse = (x, y);
    }
}

#[cfg(test)]
fn test_plugin(name: &str) -> (SurfaceVis, PathBuf) {
    let dir = std::env::temp_dir().join(format!("surfacevis-plugin-{}-{}", std::process::id(), name));
    let mut plugin = SurfaceVis::new(SurfaceVisConfig::default(), &PluginContext::new(&dir)).unwrap();
    plugin.resize(100, 100);
    (plugin, dir)
}

#[cfg(test)]
fn frame<'a>(camera: &'a OrbitCamera, renderer: &'a mut dyn Renderer) -> Frame<'a> {
    Frame { camera, renderer }
}

#[test]
fn default_setup() {
    let (plugin, dir) = test_plugin("defaults");
    assert_eq!(plugin.grid_size(), (4, 4));
    assert_eq!(plugin.tess_levels(), TessLevels { inner: 16, outer: 16 });
    assert_eq!(plugin.data_path(), dir.join("models").join("test.txt"));
    assert_eq!(plugin.projection().width, 100);
    assert_eq!(plugin.projection().clip_far, 10.);

    let bad = SurfaceVisConfig {
        n: 3,
        ..SurfaceVisConfig::default()
    };
    assert!(SurfaceVis::new(bad, &PluginContext::new(&dir)).is_err());
}

#[test]
fn pick_and_drag() {
    use crate::data::color::id_to_color;
    use crate::render::{Command, Recorder};

    let (mut plugin, _) = test_plugin("drag");
    let camera = OrbitCamera::default();
    let mut recorder = Recorder::new();

    plugin.mouse_move(50., 50., frame(&camera, &mut recorder));
    recorder.pick_color = id_to_color(6);
    plugin.mouse_button(
        Button::Primary,
        ButtonAction::Press,
        Modifiers::SHIFT,
        frame(&camera, &mut recorder),
    );
    assert_eq!(plugin.editor().selected(), Some(5));
    assert!(recorder.commands().contains(&Command::ReadPick(50, 50)));

    // picking without shift does nothing
    recorder.pick_color = id_to_color(2);
    plugin.mouse_button(
        Button::Primary,
        ButtonAction::Press,
        Modifiers::default(),
        frame(&camera, &mut recorder),
    );
    assert_eq!(plugin.editor().selected(), Some(5));

    let ctx = plugin.context(&camera);
    let before = ctx
        .world_to_screen(plugin.editor().selected_position().unwrap())
        .unwrap();
    plugin.mouse_button(
        Button::Middle,
        ButtonAction::Press,
        Modifiers::SHIFT,
        frame(&camera, &mut recorder),
    );
    assert_eq!(plugin.editor().move_mode(), MoveMode::PlaneXY);
    plugin.mouse_move(60., 45., frame(&camera, &mut recorder));

    let after = ctx
        .world_to_screen(plugin.editor().selected_position().unwrap())
        .unwrap();
    assert!((after.x - before.x - 10.).abs() < 0.1, "{:?} {:?}", before, after);
    assert!((after.y - before.y + 5.).abs() < 0.1, "{:?} {:?}", before, after);

    plugin.mouse_button(
        Button::Middle,
        ButtonAction::Release,
        Modifiers::SHIFT,
        frame(&camera, &mut recorder),
    );
    assert_eq!(plugin.editor().move_mode(), MoveMode::None);
    let moved = plugin.editor().clone();
    plugin.mouse_move(90., 90., frame(&camera, &mut recorder));
    assert_eq!(plugin.editor(), &moved);

    plugin.mouse_button(
        Button::Secondary,
        ButtonAction::Press,
        Modifiers::SHIFT,
        frame(&camera, &mut recorder),
    );
    assert_eq!(plugin.editor().move_mode(), MoveMode::AxisZ);
}

#[test]
fn key_bindings() {
    use crate::data::ControlGrid;
    use crate::render::{Command, Recorder};
    use cgmath::Vector3;

    let (mut plugin, _) = test_plugin("keys");
    let camera = OrbitCamera::default();
    let mut recorder = Recorder::new();
    let mut press = |plugin: &mut SurfaceVis, key: KeyCode, action: KeyAction| {
        plugin.keyboard(key, action, Modifiers::default(), frame(&camera, &mut recorder));
    };

    press(&mut plugin, KeyCode::RightArrow, KeyAction::Press);
    press(&mut plugin, KeyCode::RightArrow, KeyAction::Press);
    assert_eq!(plugin.editor().selected(), Some(1));
    press(&mut plugin, KeyCode::LeftArrow, KeyAction::Press);
    assert_eq!(plugin.editor().selected(), Some(0));

    press(&mut plugin, KeyCode::RightArrow, KeyAction::Repeat);
    press(&mut plugin, KeyCode::RightArrow, KeyAction::Release);
    assert_eq!(plugin.editor().selected(), Some(0));

    // keys nobody routes arrive as Unknown and do nothing
    let before = plugin.editor().clone();
    press(&mut plugin, KeyCode::Unknown, KeyAction::Press);
    assert_eq!(plugin.editor(), &before);

    press(&mut plugin, KeyCode::X, KeyAction::Press);
    assert_eq!(plugin.editor().selected(), None);

    plugin.editor_mut().select_next();
    plugin
        .editor_mut()
        .set_selected_position(Vector3::new(0., 0., 1.));
    press(&mut plugin, KeyCode::Space, KeyAction::Press);
    assert_eq!(plugin.editor().grid(), &ControlGrid::default());
    assert_eq!(plugin.editor().selected(), None);

    press(&mut plugin, KeyCode::R, KeyAction::Press);
    assert_eq!(recorder.commands(), &[Command::ReloadShaders][..]);
}

#[test]
fn load_and_save_keys() {
    use crate::render::Recorder;
    use cgmath::Vector3;

    let (mut plugin, dir) = test_plugin("files");
    let camera = OrbitCamera::default();
    let mut recorder = Recorder::new();

    // nothing to load yet
    let before = plugin.editor().clone();
    plugin.keyboard(
        KeyCode::L,
        KeyAction::Press,
        Modifiers::default(),
        frame(&camera, &mut recorder),
    );
    assert_eq!(plugin.editor(), &before);

    plugin.set_grid_size(5, 6).unwrap();
    plugin.editor_mut().select_next();
    plugin
        .editor_mut()
        .set_selected_position(Vector3::new(0.25, -2., 0.125));
    let saved = plugin.editor().grid().clone();
    plugin.keyboard(
        KeyCode::S,
        KeyAction::Press,
        Modifiers::default(),
        frame(&camera, &mut recorder),
    );
    assert!(plugin.data_path().exists());

    plugin.editor_mut().reset();
    plugin.set_grid_size(4, 4).unwrap();
    plugin.keyboard(
        KeyCode::L,
        KeyAction::Press,
        Modifiers::default(),
        frame(&camera, &mut recorder),
    );
    assert_eq!(plugin.editor().grid(), &saved);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn grid_size_limits() {
    use cgmath::Vector3;

    let dir = std::env::temp_dir();
    let config = SurfaceVisConfig {
        degree_p: 1,
        degree_q: 1,
        ..SurfaceVisConfig::default()
    };
    let mut plugin = SurfaceVis::new(config, &PluginContext::new(&dir)).unwrap();

    plugin.set_grid_size(0, 20).unwrap();
    assert_eq!(plugin.grid_size(), (2, 8));

    // same size keeps edits
    plugin.editor_mut().select_next();
    plugin
        .editor_mut()
        .set_selected_position(Vector3::new(1., 1., 1.));
    let edited = plugin.editor().clone();
    plugin.set_grid_size(1, 9).unwrap();
    assert_eq!(plugin.editor(), &edited);

    // bicubic grids need 4 points per direction
    let (mut plugin, _) = test_plugin("limits");
    assert!(plugin.set_grid_size(2, 2).is_err());
    assert_eq!(plugin.grid_size(), (4, 4));
}

#[test]
fn tess_level_limits() {
    let (mut plugin, _) = test_plugin("tess");
    plugin.set_tess_levels(TessLevels {
        inner: 0,
        outer: 500,
    });
    assert_eq!(plugin.tess_levels(), TessLevels { inner: 1, outer: 64 });
}

#[test]
fn renders_selection() {
    use crate::data::color::id_to_color_f32;
    use crate::render::{Primitive, Recorder, Uniform};

    let (mut plugin, _) = test_plugin("render");
    let camera = OrbitCamera::default();
    let mut recorder = Recorder::new();

    plugin.editor_mut().select_next();
    plugin.render(frame(&camera, &mut recorder));
    assert_eq!(
        recorder.draws(),
        vec![Primitive::Points, Primitive::Lines, Primitive::Patches(4)]
    );
    assert_eq!(
        recorder.uniform("pickedIdCol"),
        Some(&Uniform::Vec3(id_to_color_f32(1)))
    );
    assert_eq!(recorder.uniform("pointSize"), Some(&Uniform::Float(10.)));
}

#[test]
fn configured_style_reaches_renderer() {
    use crate::render::{DrawStyle, Primitive, Recorder, Uniform};

    let config = SurfaceVisConfig {
        style: DrawStyle {
            show_box: true,
            freq: 12,
            ..DrawStyle::default()
        },
        ..SurfaceVisConfig::default()
    };
    let mut plugin = SurfaceVis::new(config, &PluginContext::new(std::env::temp_dir())).unwrap();
    let camera = OrbitCamera::default();
    let mut recorder = Recorder::new();

    plugin.render(frame(&camera, &mut recorder));
    assert_eq!(recorder.draws()[0], Primitive::Lines);
    assert_eq!(recorder.uniform("freq"), Some(&Uniform::Int(12)));

    plugin.style_mut().show_box = false;
    recorder.clear();
    plugin.render(frame(&camera, &mut recorder));
    assert_eq!(recorder.draws()[0], Primitive::Points);
}
