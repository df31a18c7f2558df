//! Interactive control point editing.
//!
//! The editor holds a [ControlGrid] together with the selection and an optional in-progress
//! move. Pointer input arrives as already-decoded pick ids and raw screen deltas; the camera is
//! supplied anew with every drag through a [Context], so the camera may move mid-drag.

pub mod file;

use crate::data::color::id_to_color_f32;
use crate::data::{ControlGrid, GridError};
use crate::render::{Context, SurfaceDrawData, TessLevels};
use cgmath::Vector3;
use std::io;
use std::path::Path;

/// Screen depth change per pixel of vertical drag in [MoveMode::AxisZ].
pub const AXIS_Z_SCALE: f32 = -0.0001;

/// Editing errors.
#[derive(Fail, Debug)]
pub enum EditError {
    /// The grid rejected an operation.
    #[fail(display = "{}", _0)]
    Grid(#[cause] GridError),

    /// A control point file could not be parsed.
    #[fail(display = "malformed control point file: {}", _0)]
    MalformedFile(String),

    /// A control point file could not be read or written.
    #[fail(display = "I/O error: {}", _0)]
    Io(#[cause] io::Error),
}

impl From<GridError> for EditError {
    fn from(err: GridError) -> EditError {
        EditError::Grid(err)
    }
}

impl From<io::Error> for EditError {
    fn from(err: io::Error) -> EditError {
        EditError::Io(err)
    }
}

/// How pointer drags move the selected point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveMode {
    /// Not moving.
    None,

    /// Follow the pointer in the screen plane, keeping screen depth.
    PlaneXY,

    /// Vertical drags change screen depth.
    AxisZ,
}

impl Default for MoveMode {
    fn default() -> MoveMode {
        MoveMode::None
    }
}

/// A control grid with selection and move state.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceEditor {
    grid: ControlGrid,
    selected: Option<usize>,
    move_mode: MoveMode,
}

impl SurfaceEditor {
    /// Creates an editor with a flat grid.
    pub fn new(
        n: usize,
        m: usize,
        degree_p: usize,
        degree_q: usize,
    ) -> Result<SurfaceEditor, GridError> {
        Ok(SurfaceEditor::with_grid(ControlGrid::new(
            n, m, degree_p, degree_q,
        )?))
    }

    /// Creates an editor for an existing grid.
    pub fn with_grid(grid: ControlGrid) -> SurfaceEditor {
        SurfaceEditor {
            grid,
            selected: None,
            move_mode: MoveMode::None,
        }
    }

    pub fn grid(&self) -> &ControlGrid {
        &self.grid
    }

    /// The selected point index.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// The pick id of the selected point, or 0.
    pub fn selected_id(&self) -> u32 {
        self.selected.map_or(0, |index| index as u32 + 1)
    }

    pub fn move_mode(&self) -> MoveMode {
        self.move_mode
    }

    /// Selects the point with the given decoded pick id, or clears the selection if the id does
    /// not belong to a point (including the background id 0).
    pub fn pick(&mut self, screen_x: f64, screen_y: f64, decoded_id: u32) {
        let id = decoded_id as usize;
        self.selected = if id >= 1 && id <= self.grid.len() {
            Some(id - 1)
        } else {
            None
        };
        debug!(
            target: "surfacevis",
            "Picked id {} at ({}, {}): {:?}", decoded_id, screen_x, screen_y, self.selected
        );
    }

    /// Clears the selection and stops any move.
    pub fn deselect(&mut self) {
        self.selected = None;
        self.move_mode = MoveMode::None;
    }

    /// Selects the next point, or the first one if nothing is selected. Stops at the last point.
    pub fn select_next(&mut self) {
        self.selected = match self.selected {
            None => Some(0),
            Some(index) => Some((index + 1).min(self.grid.len() - 1)),
        };
    }

    /// Selects the previous point. Stops at the first point; does nothing without a selection.
    pub fn select_previous(&mut self) {
        if let Some(index) = self.selected {
            self.selected = Some(index.saturating_sub(1));
        }
    }

    /// Position of the selected point.
    pub fn selected_position(&self) -> Option<Vector3<f32>> {
        self.selected.and_then(|index| self.grid.point(index))
    }

    /// Moves the selected point to the given position. Returns false if nothing is selected.
    pub fn set_selected_position(&mut self, position: Vector3<f32>) -> bool {
        match self.selected {
            Some(index) => self.grid.set_point(index, position).is_ok(),
            None => false,
        }
    }

    /// Starts moving the selected point. Does nothing if no point is selected; `MoveMode::None`
    /// always stops.
    pub fn begin_move(&mut self, mode: MoveMode) {
        if mode == MoveMode::None {
            self.end_move();
            return;
        }
        if self.selected.is_none() {
            return;
        }
        if self.move_mode != mode {
            debug!(target: "surfacevis", "Move mode {:?} -> {:?}", self.move_mode, mode);
        }
        self.move_mode = mode;
    }

    /// Stops moving.
    pub fn end_move(&mut self) {
        self.move_mode = MoveMode::None;
    }

    /// Applies a pointer drag of `(dx, dy)` pixels to the selected point.
    ///
    /// The point is projected to the screen, shifted there and projected back, so it follows
    /// the pointer regardless of camera orientation. Returns true if the point moved.
    pub fn drag_to(&mut self, dx: f32, dy: f32, ctx: &Context) -> bool {
        let index = match (self.move_mode, self.selected) {
            (MoveMode::None, _) | (_, None) => return false,
            (_, Some(index)) => index,
        };
        let world = match self.grid.point(index) {
            Some(world) => world,
            None => return false,
        };
        if !ctx.viewport.is_valid() {
            warn!(target: "surfacevis", "Dropping drag: invalid viewport {:?}", ctx.viewport);
            return false;
        }

        let mut screen = match ctx.world_to_screen(world) {
            Some(screen) => screen,
            None => {
                warn!(target: "surfacevis", "Dropping drag: point #{} does not project", index);
                return false;
            }
        };
        match self.move_mode {
            MoveMode::PlaneXY => {
                screen.x += dx;
                screen.y += dy;
            }
            MoveMode::AxisZ => screen.z += dy * AXIS_Z_SCALE,
            MoveMode::None => (),
        }

        let moved = match ctx.screen_to_world(screen) {
            Some(moved) => moved,
            None => {
                warn!(target: "surfacevis", "Dropping drag: view-projection is not invertible");
                return false;
            }
        };
        self.grid.set_point(index, moved).is_ok()
    }

    /// Replaces the grid with a flat n×m one at the current degrees.
    ///
    /// A selection outside the new grid is cleared and any move is stopped. On error, nothing
    /// changes.
    pub fn resize_grid(&mut self, n: usize, m: usize) -> Result<(), GridError> {
        let (degree_p, degree_q) = (self.grid.degree_p(), self.grid.degree_q());
        self.grid.rebuild(n, m, degree_p, degree_q)?;
        debug!(target: "surfacevis", "Resized grid to {}×{}", n, m);
        self.end_move();
        if self.selected.map_or(false, |index| index >= self.grid.len()) {
            self.selected = None;
        }
        Ok(())
    }

    /// Restores the flat layout at the current shape and clears the selection.
    pub fn reset(&mut self) {
        let (n, m) = (self.grid.n(), self.grid.m());
        let (degree_p, degree_q) = (self.grid.degree_p(), self.grid.degree_q());
        if let Err(err) = self.grid.rebuild(n, m, degree_p, degree_q) {
            warn!(target: "surfacevis", "Could not reset grid: {}", err);
        }
        self.deselect();
    }

    /// Replaces the grid with one read from a file.
    ///
    /// On error, the current grid is kept. A selection outside the loaded grid is cleared.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<(), EditError> {
        let path = path.as_ref();
        let grid = file::read(path)?;
        info!(
            target: "surfacevis",
            "Loaded {}×{} control points from {}", grid.n(), grid.m(), path.display()
        );
        self.grid = grid;
        self.end_move();
        if self.selected.map_or(false, |index| index >= self.grid.len()) {
            self.selected = None;
        }
        Ok(())
    }

    /// Writes the grid to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), EditError> {
        let path = path.as_ref();
        file::write(path, &self.grid)?;
        info!(
            target: "surfacevis",
            "Saved {}×{} control points to {}", self.grid.n(), self.grid.m(), path.display()
        );
        Ok(())
    }

    /// Collects what a renderer needs to draw the surface and its control net.
    pub fn draw_data(&self, tess: TessLevels) -> SurfaceDrawData {
        SurfaceDrawData {
            n: self.grid.n(),
            m: self.grid.m(),
            degree_p: self.grid.degree_p(),
            degree_q: self.grid.degree_q(),
            positions: self.grid.positions(),
            id_colors: self.grid.id_colors(),
            edge_indices: self.grid.edge_indices().to_vec(),
            knots_u: self.grid.knots_u().to_vec(),
            knots_v: self.grid.knots_v().to_vec(),
            tess,
            picked_color: id_to_color_f32(self.selected_id()),
        }
    }
}

impl Default for SurfaceEditor {
    fn default() -> SurfaceEditor {
        SurfaceEditor::with_grid(ControlGrid::default())
    }
}

#[cfg(test)]
fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("surfacevis-{}-{}.txt", std::process::id(), name))
}

#[cfg(test)]
fn test_context() -> Context {
    use crate::render::Viewport;

    Context::identity(Viewport {
        width: 100,
        height: 100,
        z_near: 0.01,
        z_far: 10.,
    })
}

#[test]
fn pick_bounds() {
    let mut editor = SurfaceEditor::default();

    editor.pick(0., 0., 16);
    assert_eq!(editor.selected(), Some(15));
    assert_eq!(editor.selected_id(), 16);

    editor.pick(0., 0., 0);
    assert_eq!(editor.selected(), None);

    editor.pick(0., 0., 1);
    assert_eq!(editor.selected(), Some(0));
    editor.pick(0., 0., 17);
    assert_eq!(editor.selected(), None);
}

#[test]
fn selection_stepping() {
    let mut editor = SurfaceEditor::new(2, 2, 1, 1).unwrap();

    editor.select_previous();
    assert_eq!(editor.selected(), None);

    editor.select_next();
    assert_eq!(editor.selected(), Some(0));
    editor.select_previous();
    assert_eq!(editor.selected(), Some(0));

    for _ in 0..10 {
        editor.select_next();
    }
    assert_eq!(editor.selected(), Some(3));

    editor.begin_move(MoveMode::AxisZ);
    editor.deselect();
    assert_eq!(editor.selected(), None);
    assert_eq!(editor.move_mode(), MoveMode::None);
}

#[test]
fn move_mode_transitions() {
    let mut editor = SurfaceEditor::default();

    editor.begin_move(MoveMode::PlaneXY);
    assert_eq!(editor.move_mode(), MoveMode::None);

    editor.end_move();
    assert_eq!(editor.move_mode(), MoveMode::None);

    editor.pick(0., 0., 3);
    editor.begin_move(MoveMode::AxisZ);
    assert_eq!(editor.move_mode(), MoveMode::AxisZ);
    editor.end_move();
    assert_eq!(editor.move_mode(), MoveMode::None);
}

#[test]
fn idle_drag_changes_nothing() {
    let ctx = test_context();
    let mut editor = SurfaceEditor::default();
    let before = editor.clone();

    assert!(!editor.drag_to(25., -40., &ctx));
    assert_eq!(editor, before);

    editor.pick(0., 0., 6);
    let selected = editor.clone();
    assert!(!editor.drag_to(25., -40., &ctx));
    assert_eq!(editor, selected);
}

#[test]
fn plane_drag_with_identity_camera() {
    let ctx = test_context();
    let mut editor = SurfaceEditor::default();

    editor.pick(0., 0., 1);
    editor.begin_move(MoveMode::PlaneXY);
    assert!(editor.drag_to(10., 10., &ctx));

    // 10px of a 100px viewport is 0.2 in NDC; screen Y points down
    let p = editor.selected_position().unwrap();
    assert!((p.x + 0.3).abs() < 1e-5, "{:?}", p);
    assert!((p.y - 0.3).abs() < 1e-5, "{:?}", p);
    assert!(p.z.abs() < 1e-5, "{:?}", p);

    // nothing else moved
    let flat = ControlGrid::new(4, 4, 3, 3).unwrap();
    assert_eq!(&editor.grid().points()[1..], &flat.points()[1..]);
}

#[test]
fn depth_drag_with_identity_camera() {
    let ctx = test_context();
    let mut editor = SurfaceEditor::default();

    editor.pick(0., 0., 1);
    editor.begin_move(MoveMode::AxisZ);
    assert!(editor.drag_to(50., 100., &ctx));

    let p = editor.selected_position().unwrap();
    let expected_z = 2. * 100. * AXIS_Z_SCALE / (10. - 0.01);
    assert!((p.z - expected_z).abs() < 1e-5, "{:?}", p);
    assert!((p.x + 0.5).abs() < 1e-5 && (p.y - 0.5).abs() < 1e-5, "{:?}", p);
}

#[test]
fn plane_drag_follows_pointer_under_perspective() {
    use crate::data::{OrbitCamera, Projection};
    use crate::render::Viewport;
    use cgmath::Vector2;

    let projection = Projection {
        width: 800,
        height: 600,
        clip_near: 0.5,
        clip_far: 10.,
        ..Projection::new()
    };
    let mut camera = OrbitCamera::new(3.);
    camera.rotate(Vector2::new(0., 0.), Vector2::new(0.3, 0.2));
    let ctx = Context {
        projection: projection.matrix(),
        view: camera.view_matrix(),
        viewport: Viewport {
            width: 800,
            height: 600,
            z_near: projection.clip_near,
            z_far: projection.clip_far,
        },
    };

    let mut editor = SurfaceEditor::default();
    editor.pick(0., 0., 6);
    let before = ctx.world_to_screen(editor.selected_position().unwrap()).unwrap();

    editor.begin_move(MoveMode::PlaneXY);
    assert!(editor.drag_to(15., -7., &ctx));

    let after = ctx.world_to_screen(editor.selected_position().unwrap()).unwrap();
    assert!((after.x - before.x - 15.).abs() < 0.05, "{:?} {:?}", before, after);
    assert!((after.y - before.y + 7.).abs() < 0.05, "{:?} {:?}", before, after);
    assert!((after.z - before.z).abs() < 1e-3, "{:?} {:?}", before, after);
}

#[test]
fn singular_camera_drops_drag() {
    use cgmath::Matrix4;

    let mut ctx = test_context();
    ctx.view = Matrix4::from_nonuniform_scale(1., 1., 0.);

    let mut editor = SurfaceEditor::default();
    editor.pick(0., 0., 2);
    editor.begin_move(MoveMode::PlaneXY);
    let before = editor.clone();
    assert!(!editor.drag_to(5., 5., &ctx));
    assert_eq!(editor, before);
}

#[test]
fn resize_clears_out_of_range_selection() {
    let mut editor = SurfaceEditor::new(4, 4, 1, 1).unwrap();
    editor.pick(0., 0., 16);
    editor.begin_move(MoveMode::PlaneXY);

    editor.resize_grid(2, 3).unwrap();
    assert_eq!(editor.grid().len(), 6);
    assert_eq!(editor.selected(), None);
    assert_eq!(editor.move_mode(), MoveMode::None);

    editor.pick(0., 0., 2);
    editor.resize_grid(3, 3).unwrap();
    assert_eq!(editor.selected(), Some(1));
}

#[test]
fn resize_rejects_small_grids() {
    let mut editor = SurfaceEditor::default();
    editor.pick(0., 0., 16);
    let before = editor.clone();

    match editor.resize_grid(2, 2) {
        Err(GridError::InvalidDimensions { .. }) => (),
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(editor, before);
}

#[test]
fn reset_restores_flat_grid() {
    let mut editor = SurfaceEditor::new(5, 4, 3, 2).unwrap();
    editor.pick(0., 0., 7);
    editor.set_selected_position(Vector3::new(1., 1., 1.));

    editor.reset();
    assert_eq!(editor.grid(), &ControlGrid::new(5, 4, 3, 2).unwrap());
    assert_eq!(editor.selected(), None);
}

#[test]
fn save_load_round_trip() {
    let path = temp_path("round-trip");
    let ctx = test_context();

    let mut editor = SurfaceEditor::new(5, 4, 3, 2).unwrap();
    editor.pick(0., 0., 7);
    editor.begin_move(MoveMode::PlaneXY);
    editor.drag_to(3., -11., &ctx);
    editor.begin_move(MoveMode::AxisZ);
    editor.drag_to(0., 37., &ctx);
    editor.save(&path).unwrap();

    let mut loaded = SurfaceEditor::default();
    loaded.load(&path).unwrap();
    assert_eq!(loaded.grid(), editor.grid());
    assert_eq!(loaded.grid().points(), editor.grid().points());

    let _ = std::fs::remove_file(&path);
}

#[test]
fn failed_load_keeps_grid() {
    let path = temp_path("malformed");
    std::fs::write(&path, "4 3\n4 3\n0 0 0\n").unwrap();

    let mut editor = SurfaceEditor::default();
    editor.pick(0., 0., 4);
    let before = editor.clone();

    match editor.load(&path) {
        Err(EditError::MalformedFile(_)) => (),
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(editor, before);

    match editor.load(temp_path("does-not-exist")) {
        Err(EditError::Io(_)) => (),
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(editor, before);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn draw_data_highlights_selection() {
    let mut editor = SurfaceEditor::default();
    let tess = TessLevels { inner: 8, outer: 4 };

    let data = editor.draw_data(tess);
    assert_eq!(data.picked_color, [0., 0., 0.]);
    assert_eq!(data.positions.len(), 48);
    assert_eq!(data.id_colors.len(), 48);
    assert_eq!(data.tess, tess);

    editor.pick(0., 0., 2);
    assert_eq!(editor.draw_data(tess).picked_color, id_to_color_f32(2));
}
