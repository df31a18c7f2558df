//! Runs one plugin at a time and routes window events to it and to the camera.

use crate::data::{MouseControl, OrbitCamera};
use crate::platform::event::{Button, ButtonAction, KeyAction, KeyCode, Modifiers};
use crate::plugin::{Frame, Plugin, PluginContext, Registry};
use crate::render::Renderer;
use cgmath::Vector2;
use std::path::PathBuf;

/// Host errors.
#[derive(Fail, Debug, Clone, PartialEq)]
pub enum HostError {
    /// No plugin with the given index is registered.
    #[fail(display = "no plugin with index {}", _0)]
    UnknownPlugin(usize),
}

/// Host settings.
#[derive(Debug, Clone, PartialEq)]
pub struct HostConfig {
    /// Initial window width in pixels.
    pub width: u32,

    /// Initial window height in pixels.
    pub height: u32,

    /// Root directory plugins load their data from.
    pub resources_dir: PathBuf,
}

impl Default for HostConfig {
    fn default() -> HostConfig {
        HostConfig {
            width: 1280,
            height: 720,
            resources_dir: "resources".into(),
        }
    }
}

struct ActivePlugin {
    idx: usize,
    plugin: Box<dyn Plugin>,
}

/// Owns the renderer, the camera and the active plugin.
pub struct Host<R: Renderer> {
    renderer: R,
    registry: Registry,
    plugin_ctx: PluginContext,
    active: Option<ActivePlugin>,
    camera: OrbitCamera,
    width: u32,
    height: u32,
    mouse: (f64, f64),
    camera_control: MouseControl,
}

impl<R: Renderer> Host<R> {
    /// Creates a host without an active plugin.
    pub fn new(renderer: R, registry: Registry, config: HostConfig) -> Host<R> {
        Host {
            renderer,
            registry,
            plugin_ctx: PluginContext::new(config.resources_dir),
            active: None,
            camera: OrbitCamera::default(),
            width: config.width,
            height: config.height,
            mouse: (0., 0.),
            camera_control: MouseControl::None,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut OrbitCamera {
        &mut self.camera
    }

    /// Window size in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Index of the active plugin.
    pub fn active_plugin(&self) -> Option<usize> {
        self.active.as_ref().map(|active| active.idx)
    }

    /// Replaces the active plugin with a fresh instance and resets the camera.
    pub fn select_plugin(&mut self, idx: usize) -> Result<(), HostError> {
        let def = match self.registry.get(idx) {
            Some(def) => *def,
            None => return Err(HostError::UnknownPlugin(idx)),
        };
        info!(target: "surfacevis", "Starting plugin {} ({})", def.name, def.idx);

        let mut plugin = def.instantiate(&self.plugin_ctx);
        plugin.resize(self.width, self.height);
        self.camera.reset();
        self.camera_control = MouseControl::None;
        self.active = Some(ActivePlugin { idx, plugin });
        Ok(())
    }

    pub fn render(&mut self) {
        if let Some(active) = &mut self.active {
            active.plugin.render(Frame {
                camera: &self.camera,
                renderer: &mut self.renderer,
            });
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        debug!(target: "surfacevis", "Window size {}×{}", width, height);
        self.width = width;
        self.height = height;
        if let Some(active) = &mut self.active {
            active.plugin.resize(width, height);
        }
    }

    pub fn keyboard(&mut self, key: KeyCode, action: KeyAction, mods: Modifiers) {
        if let Some(active) = &mut self.active {
            active.plugin.keyboard(
                key,
                action,
                mods,
                Frame {
                    camera: &self.camera,
                    renderer: &mut self.renderer,
                },
            );
        }
    }

    /// A button press without modifiers picks the camera control; anything else stops it.
    pub fn mouse_button(&mut self, button: Button, action: ButtonAction, mods: Modifiers) {
        self.camera_control = if action == ButtonAction::Press && mods.none() {
            match button {
                Button::Primary => MouseControl::Left,
                Button::Middle => MouseControl::Middle,
                Button::Secondary => MouseControl::Right,
                Button::Other(_) => MouseControl::None,
            }
        } else {
            MouseControl::None
        };

        if let Some(active) = &mut self.active {
            active.plugin.mouse_button(
                button,
                action,
                mods,
                Frame {
                    camera: &self.camera,
                    renderer: &mut self.renderer,
                },
            );
        }
    }

    pub fn mouse_move(&mut self, x: f64, y: f64) {
        if self.camera_control != MouseControl::None && self.width > 0 && self.height > 0 {
            let old = self.normalize(self.mouse.0, self.mouse.1);
            let new = self.normalize(x, y);
            self.camera.mouse_move_control(self.camera_control, old, new);
        }
        self.mouse = (x, y);

        if let Some(active) = &mut self.active {
            active.plugin.mouse_move(
                x,
                y,
                Frame {
                    camera: &self.camera,
                    renderer: &mut self.renderer,
                },
            );
        }
    }

    pub fn mouse_scroll(&mut self, dx: f64, dy: f64, mods: Modifiers) {
        if mods.none() {
            self.camera.mouse_scroll_control(dx as f32, dy as f32);
        }

        if let Some(active) = &mut self.active {
            active.plugin.mouse_scroll(
                dx,
                dy,
                Frame {
                    camera: &self.camera,
                    renderer: &mut self.renderer,
                },
            );
        }
    }

    /// Window pixels to [-1, 1] with Y up.
    fn normalize(&self, x: f64, y: f64) -> Vector2<f32> {
        Vector2::new(
            (2. * x / self.width as f64 - 1.) as f32,
            (1. - 2. * y / self.height as f64) as f32,
        )
    }
}

#[cfg(test)]
fn test_host() -> Host<crate::render::Recorder> {
    let config = HostConfig {
        width: 100,
        height: 100,
        resources_dir: std::env::temp_dir().join("surfacevis-host"),
    };
    Host::new(crate::render::Recorder::new(), Registry::builtin(), config)
}

#[test]
fn plugin_selection() {
    let mut host = test_host();
    assert_eq!(host.active_plugin(), None);
    host.render();
    assert!(host.renderer().commands().is_empty());

    assert_eq!(host.select_plugin(3), Err(HostError::UnknownPlugin(3)));
    host.select_plugin(104).unwrap();
    assert_eq!(host.active_plugin(), Some(104));

    host.render();
    assert!(!host.renderer().draws().is_empty());
}

#[test]
fn camera_follows_unmodified_drags() {
    let mut host = test_host();
    host.select_plugin(104).unwrap();
    let initial = *host.camera();

    // a shift drag belongs to the plugin
    host.mouse_move(50., 50.);
    host.mouse_button(Button::Primary, ButtonAction::Press, Modifiers::SHIFT);
    host.mouse_move(70., 50.);
    assert_eq!(host.camera(), &initial);

    host.mouse_button(Button::Primary, ButtonAction::Press, Modifiers::default());
    host.mouse_move(90., 50.);
    assert_ne!(host.camera().view_matrix(), initial.view_matrix());

    host.mouse_button(Button::Primary, ButtonAction::Release, Modifiers::default());
    let rotated = *host.camera();
    host.mouse_move(10., 10.);
    assert_eq!(host.camera(), &rotated);

    host.mouse_button(Button::Secondary, ButtonAction::Press, Modifiers::default());
    host.mouse_move(10., 60.);
    assert!(host.camera().dolly() > rotated.dolly());

    let dolly = host.camera().dolly();
    host.mouse_scroll(0., 1., Modifiers::SHIFT);
    assert_eq!(host.camera().dolly(), dolly);
    host.mouse_scroll(0., -1., Modifiers::default());
    assert!(host.camera().dolly() > dolly);
}

#[test]
fn plugin_receives_events() {
    use crate::data::color::{id_to_color, id_to_color_f32};
    use crate::render::{Command, Uniform};

    let mut host = test_host();
    host.select_plugin(104).unwrap();

    host.mouse_move(30., 40.);
    host.renderer_mut().pick_color = id_to_color(16);
    host.mouse_button(Button::Primary, ButtonAction::Press, Modifiers::SHIFT);
    assert!(host
        .renderer()
        .commands()
        .contains(&Command::ReadPick(30, 40)));

    host.render();
    assert_eq!(
        host.renderer().uniform("pickedIdCol"),
        Some(&Uniform::Vec3(id_to_color_f32(16)))
    );

    host.keyboard(KeyCode::X, KeyAction::Press, Modifiers::default());
    host.render();
    assert_eq!(
        host.renderer().uniform("pickedIdCol"),
        Some(&Uniform::Vec3([0., 0., 0.]))
    );

    host.keyboard(KeyCode::R, KeyAction::Press, Modifiers::default());
    assert_eq!(
        host.renderer().commands().last(),
        Some(&Command::ReloadShaders)
    );
}

#[test]
fn window_resize_reaches_plugin() {
    use crate::render::Uniform;

    let mut host = test_host();
    host.select_plugin(104).unwrap();
    host.render();
    let square = host.renderer().uniform("projMx").cloned();

    host.resize(200, 100);
    assert_eq!(host.size(), (200, 100));
    host.render();
    let wide = host.renderer().uniform("projMx").cloned();
    assert_ne!(square, wide);

    match wide {
        Some(Uniform::Mat4(m)) => {
            assert!((m.y.y / m.x.x - 2.).abs() < 1e-4);
        }
        other => panic!("unexpected {:?}", other),
    }
}
