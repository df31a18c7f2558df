//! Interactive plugins and their registry.
//!
//! A host runs one plugin at a time and forwards window events to it. Plugins are a closed set
//! of definitions keyed by their index, instantiated through [PluginDef::create].

mod surface_vis;

pub use self::surface_vis::*;

use crate::data::OrbitCamera;
use crate::render::Renderer;
use crate::util::BSMap;
use crate::platform::event::{Button, ButtonAction, KeyAction, KeyCode, Modifiers};
use std::path::{Path, PathBuf};

/// Everything a plugin may need while handling an event.
pub struct Frame<'a> {
    /// The host camera.
    pub camera: &'a OrbitCamera,

    /// The host renderer.
    pub renderer: &'a mut dyn Renderer,
}

/// Where plugins find their data files.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginContext {
    resources_dir: PathBuf,
}

impl PluginContext {
    pub fn new<P: Into<PathBuf>>(resources_dir: P) -> PluginContext {
        PluginContext {
            resources_dir: resources_dir.into(),
        }
    }

    /// The resources root.
    pub fn resources_dir(&self) -> &Path {
        &self.resources_dir
    }

    /// Resolves a path relative to the resources root.
    pub fn resource<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.resources_dir.join(path)
    }
}

/// An interactive plugin.
///
/// Event handlers default to doing nothing.
pub trait Plugin {
    /// Draws a frame.
    fn render(&mut self, frame: Frame);

    /// Called when the window size changes, and once after the plugin is created.
    fn resize(&mut self, _width: u32, _height: u32) {}

    fn keyboard(&mut self, _key: KeyCode, _action: KeyAction, _mods: Modifiers, _frame: Frame) {}

    fn mouse_button(
        &mut self,
        _button: Button,
        _action: ButtonAction,
        _mods: Modifiers,
        _frame: Frame,
    ) {
    }

    /// Called with the pointer position in window pixels (origin top left).
    fn mouse_move(&mut self, _x: f64, _y: f64, _frame: Frame) {}

    fn mouse_scroll(&mut self, _dx: f64, _dy: f64, _frame: Frame) {}
}

/// A plugin definition.
#[derive(Clone, Copy)]
pub struct PluginDef {
    /// Unique index, used for selection and ordering.
    pub idx: usize,

    /// Display name.
    pub name: &'static str,

    /// Creates an instance.
    pub create: fn(&PluginContext) -> Box<dyn Plugin>,
}

impl PluginDef {
    pub fn instantiate(&self, ctx: &PluginContext) -> Box<dyn Plugin> {
        (self.create)(ctx)
    }
}

impl std::fmt::Debug for PluginDef {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "PluginDef({} {:?})", self.idx, self.name)
    }
}

/// Plugin definitions sorted by index.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    defs: BSMap<usize, PluginDef>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Registry {
        Registry::default()
    }

    /// Creates a registry with all plugins in this crate.
    pub fn builtin() -> Registry {
        let mut registry = Registry::new();
        registry.register(SURFACE_VIS);
        registry
    }

    /// Adds a definition, returning the one it replaced.
    pub fn register(&mut self, def: PluginDef) -> Option<PluginDef> {
        let replaced = self.defs.insert(def.idx, def);
        if let Some(replaced) = &replaced {
            warn!(
                target: "surfacevis",
                "Plugin {:?} replaces {:?}", def, replaced
            );
        }
        replaced
    }

    pub fn unregister(&mut self, idx: usize) -> Option<PluginDef> {
        self.defs.remove(&idx)
    }

    pub fn get(&self, idx: usize) -> Option<&PluginDef> {
        self.defs.get(&idx)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Iterates over definitions in index order.
    pub fn iter(&self) -> impl Iterator<Item = &PluginDef> {
        self.defs.iter().map(|(_, def)| def)
    }

    /// The lowest index, if any.
    pub fn first(&self) -> Option<usize> {
        self.defs.keys().next().cloned()
    }
}

#[cfg(test)]
struct NullPlugin;

#[cfg(test)]
impl Plugin for NullPlugin {
    fn render(&mut self, _: Frame) {}
}

#[test]
fn registry_order() {
    fn create(_: &PluginContext) -> Box<dyn Plugin> {
        Box::new(NullPlugin)
    }

    let mut registry = Registry::builtin();
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.get(104).map(|def| def.name), Some("PCVC/SurfaceVis"));

    registry.register(PluginDef {
        idx: 200,
        name: "null",
        create,
    });
    registry.register(PluginDef {
        idx: 7,
        name: "null",
        create,
    });
    assert_eq!(
        registry.iter().map(|def| def.idx).collect::<Vec<_>>(),
        vec![7, 104, 200]
    );
    assert_eq!(registry.first(), Some(7));

    let replaced = registry.register(PluginDef {
        idx: 7,
        name: "other",
        create,
    });
    assert_eq!(replaced.map(|def| def.name), Some("null"));
    assert_eq!(registry.get(7).map(|def| def.name), Some("other"));

    assert!(registry.unregister(7).is_some());
    assert!(registry.get(7).is_none());
    assert!(Registry::new().is_empty());
}

#[test]
fn plugin_context_resolves_resources() {
    let ctx = PluginContext::new("/opt/res");
    assert_eq!(ctx.resources_dir(), Path::new("/opt/res"));
    assert_eq!(ctx.resource("models"), PathBuf::from("/opt/res/models"));
}
