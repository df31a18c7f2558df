//! Control grids for tensor-product B-spline surfaces.

use crate::data::color::id_to_color_f32;
use cgmath::Vector3;

/// Grid errors.
#[derive(Fail, Debug, Clone, PartialEq)]
pub enum GridError {
    /// The grid is too small for the requested degrees (or smaller than 2×2).
    #[fail(
        display = "a {}×{} grid cannot carry degrees ({}, {})",
        n, m, degree_p, degree_q
    )]
    InvalidDimensions {
        n: usize,
        m: usize,
        degree_p: usize,
        degree_q: usize,
    },

    /// A point index outside the grid.
    #[fail(display = "control point #{} is out of range (grid has {})", index, len)]
    IndexOutOfRange { index: usize, len: usize },

    /// A point list that does not fill the grid.
    #[fail(display = "expected {} control points, got {}", expected, actual)]
    PointCountMismatch { expected: usize, actual: usize },
}

/// Returns a clamped uniform knot vector for `count` control points of the given degree.
///
/// The vector holds `count + degree + 1` values: `degree + 1` zeros, a ramp in steps of
/// `1 / (count - degree)`, and `degree + 1` ones.
///
/// # Panics
/// In debug builds, if `count <= degree`.
pub fn knot_vector(count: usize, degree: usize) -> Vec<f32> {
    debug_assert!(
        count > degree,
        "knot vector needs more control points ({}) than its degree ({})",
        count,
        degree
    );
    let step = 1. / (count - degree) as f32;
    let mut knots = Vec::with_capacity(count + degree + 1);
    for i in 0..count + degree + 1 {
        if i <= degree {
            knots.push(0.);
        } else if i >= count {
            // written out rather than ramped so accumulated error never leaves a 0.99999
            knots.push(1.);
        } else {
            let prev = knots[i - 1];
            knots.push(prev + step);
        }
    }
    knots
}

fn check_dimensions(
    n: usize,
    m: usize,
    degree_p: usize,
    degree_q: usize,
) -> Result<(), GridError> {
    let overflows = n.checked_mul(m).and_then(|count| count.checked_mul(3)).is_none();
    if n < 2 || m < 2 || n <= degree_p || m <= degree_q || overflows {
        Err(GridError::InvalidDimensions {
            n,
            m,
            degree_p,
            degree_q,
        })
    } else {
        Ok(())
    }
}

/// Control-net edges as a line list: for every point, the edge to its left neighbour, then the
/// edge to its upper neighbour.
fn edge_indices(n: usize, m: usize) -> Vec<u32> {
    let mut indices = Vec::with_capacity(2 * ((n - 1) * m + n * (m - 1)));
    for i in 0..n {
        for j in 0..m {
            let index = (i * m + j) as u32;
            if j > 0 {
                indices.push(index - 1);
                indices.push(index);
            }
            if i > 0 {
                indices.push(index - m as u32);
                indices.push(index);
            }
        }
    }
    indices
}

/// The flat default layout: a unit square centered at the origin, rows running top to bottom.
fn flat_points(n: usize, m: usize) -> Vec<Vector3<f32>> {
    let step_n = 1. / (n - 1) as f32;
    let step_m = 1. / (m - 1) as f32;
    let mut points = Vec::with_capacity(n * m);
    for i in 0..n {
        let y = 0.5 - step_n * i as f32;
        for j in 0..m {
            points.push(Vector3::new(-0.5 + step_m * j as f32, y, 0.));
        }
    }
    points
}

/// An n×m grid of control points with its knot vectors.
///
/// Points are stored row-major: the point in row `i` and column `j` is at `i * m + j`. The point
/// at index `k` is picked with id `k + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlGrid {
    n: usize,
    m: usize,
    degree_p: usize,
    degree_q: usize,
    points: Vec<Vector3<f32>>,
    knots_u: Vec<f32>,
    knots_v: Vec<f32>,
    edges: Vec<u32>,
}

impl ControlGrid {
    /// Creates a flat grid.
    pub fn new(
        n: usize,
        m: usize,
        degree_p: usize,
        degree_q: usize,
    ) -> Result<ControlGrid, GridError> {
        check_dimensions(n, m, degree_p, degree_q)?;
        Ok(ControlGrid::assemble(
            n,
            m,
            degree_p,
            degree_q,
            flat_points(n, m),
        ))
    }

    /// Checks that a grid of the given shape can exist, without allocating anything.
    pub fn validate_shape(
        n: usize,
        m: usize,
        degree_p: usize,
        degree_q: usize,
    ) -> Result<(), GridError> {
        check_dimensions(n, m, degree_p, degree_q)
    }

    /// Creates a grid from existing points, e.g. ones read from a file.
    pub fn from_points(
        n: usize,
        m: usize,
        degree_p: usize,
        degree_q: usize,
        points: Vec<Vector3<f32>>,
    ) -> Result<ControlGrid, GridError> {
        check_dimensions(n, m, degree_p, degree_q)?;
        if points.len() != n * m {
            return Err(GridError::PointCountMismatch {
                expected: n * m,
                actual: points.len(),
            });
        }
        Ok(ControlGrid::assemble(n, m, degree_p, degree_q, points))
    }

    fn assemble(
        n: usize,
        m: usize,
        degree_p: usize,
        degree_q: usize,
        points: Vec<Vector3<f32>>,
    ) -> ControlGrid {
        ControlGrid {
            n,
            m,
            degree_p,
            degree_q,
            points,
            knots_u: knot_vector(n, degree_p),
            knots_v: knot_vector(m, degree_q),
            edges: edge_indices(n, m),
        }
    }

    /// Replaces this grid with a flat one of the given shape.
    ///
    /// On error, the grid is left as it was.
    pub fn rebuild(
        &mut self,
        n: usize,
        m: usize,
        degree_p: usize,
        degree_q: usize,
    ) -> Result<(), GridError> {
        *self = ControlGrid::new(n, m, degree_p, degree_q)?;
        Ok(())
    }

    /// Number of control points along u (rows).
    pub fn n(&self) -> usize {
        self.n
    }

    /// Number of control points along v (columns).
    pub fn m(&self) -> usize {
        self.m
    }

    pub fn degree_p(&self) -> usize {
        self.degree_p
    }

    pub fn degree_q(&self) -> usize {
        self.degree_q
    }

    /// Total number of control points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; a valid grid has at least 2×2 points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Vector3<f32>] {
        &self.points
    }

    pub fn knots_u(&self) -> &[f32] {
        &self.knots_u
    }

    pub fn knots_v(&self) -> &[f32] {
        &self.knots_v
    }

    /// Control-net edges as pairs of point indices in a flat line list.
    pub fn edge_indices(&self) -> &[u32] {
        &self.edges
    }

    /// Returns a control point.
    pub fn point(&self, index: usize) -> Option<Vector3<f32>> {
        self.points.get(index).cloned()
    }

    /// Replaces a control point.
    pub fn set_point(&mut self, index: usize, position: Vector3<f32>) -> Result<(), GridError> {
        let len = self.points.len();
        match self.points.get_mut(index) {
            Some(point) => {
                *point = position;
                Ok(())
            }
            None => Err(GridError::IndexOutOfRange { index, len }),
        }
    }

    /// Returns the index of the point in the given row and column.
    pub fn index_at(&self, row: usize, col: usize) -> Option<usize> {
        if row < self.n && col < self.m {
            Some(row * self.m + col)
        } else {
            None
        }
    }

    /// Returns the row and column of a point index.
    pub fn row_col(&self, index: usize) -> Option<(usize, usize)> {
        if index < self.len() {
            Some((index / self.m, index % self.m))
        } else {
            None
        }
    }

    /// Point positions as a flat `[x, y, z, x, y, z, …]` list.
    pub fn positions(&self) -> Vec<f32> {
        self.points.iter().flat_map(|p| vec![p.x, p.y, p.z]).collect()
    }

    /// Picking colors of all points as a flat list of normalized RGB triples.
    pub fn id_colors(&self) -> Vec<f32> {
        (0..self.len())
            .flat_map(|index| id_to_color_f32(index as u32 + 1).to_vec())
            .collect()
    }
}

impl Default for ControlGrid {
    /// A flat bicubic 4×4 grid.
    fn default() -> ControlGrid {
        ControlGrid::assemble(4, 4, 3, 3, flat_points(4, 4))
    }
}

#[test]
fn knot_vectors() {
    assert_eq!(knot_vector(4, 3), vec![0., 0., 0., 0., 1., 1., 1., 1.]);
    assert_eq!(knot_vector(5, 3), vec![0., 0., 0., 0., 0.5, 1., 1., 1., 1.]);
    assert_eq!(knot_vector(2, 0), vec![0., 0.5, 1.]);
    assert_eq!(knot_vector(3, 1), vec![0., 0., 0.5, 1., 1.]);

    for degree in 0..6 {
        for count in degree + 1..degree + 12 {
            let knots = knot_vector(count, degree);
            assert_eq!(knots.len(), count + degree + 1);
            assert!(knots.windows(2).all(|w| w[0] <= w[1]), "{:?}", knots);
            assert!(knots[..=degree].iter().all(|k| *k == 0.));
            assert!(knots[count..].iter().all(|k| *k == 1.));
        }
    }
}

#[test]
fn default_grid() {
    let grid = ControlGrid::new(4, 4, 3, 3).unwrap();
    assert_eq!(grid, ControlGrid::default());
    assert_eq!(grid.len(), 16);
    assert_eq!(grid.positions().len(), 48);
    assert_eq!(grid.edge_indices().len(), 48);
    assert_eq!(grid.points()[0], Vector3::new(-0.5, 0.5, 0.));
    assert_eq!(grid.points()[3], Vector3::new(0.5, 0.5, 0.));
    assert_eq!(grid.points()[15], Vector3::new(0.5, -0.5, 0.));
    assert_eq!(grid.knots_u(), &[0., 0., 0., 0., 1., 1., 1., 1.][..]);

    // first row: edges to the left only; second row starts with the edge upwards
    assert_eq!(&grid.edge_indices()[..6], &[0, 1, 1, 2, 2, 3][..]);
    assert_eq!(&grid.edge_indices()[6..10], &[0, 4, 4, 5][..]);
}

#[test]
fn edge_count_by_shape() {
    let grid = ControlGrid::new(3, 5, 2, 4).unwrap();
    assert_eq!(grid.edge_indices().len(), 2 * (2 * 5 + 3 * 4));
    assert!(grid.edge_indices().iter().all(|i| (*i as usize) < grid.len()));
}

#[test]
fn invalid_dimensions() {
    match ControlGrid::new(2, 2, 3, 3) {
        Err(GridError::InvalidDimensions { n: 2, m: 2, .. }) => (),
        other => panic!("unexpected {:?}", other),
    }
    assert!(ControlGrid::new(5, 3, 3, 3).is_err());
    assert!(ControlGrid::new(1, 3, 0, 0).is_err());
    assert!(ControlGrid::validate_shape(1 << 40, 1 << 40, 1, 1).is_err());
    assert!(ControlGrid::validate_shape(30000, 30000, 1, 1).is_ok());

    let mut grid = ControlGrid::new(4, 4, 3, 3).unwrap();
    let before = grid.clone();
    assert!(grid.rebuild(3, 8, 3, 3).is_err());
    assert_eq!(grid, before);
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "knot vector needs more control points")]
fn knot_vector_rejects_low_counts() {
    knot_vector(3, 3);
}

#[test]
fn from_points_needs_full_grid() {
    let points = vec![Vector3::new(0., 0., 0.); 5];
    assert_eq!(
        ControlGrid::from_points(2, 3, 1, 1, points),
        Err(GridError::PointCountMismatch {
            expected: 6,
            actual: 5
        })
    );

    let points = vec![Vector3::new(0., 0., 0.); 6];
    assert!(ControlGrid::from_points(2, 3, 1, 1, points).is_ok());
}

#[test]
fn point_access() {
    let mut grid = ControlGrid::new(3, 4, 1, 1).unwrap();
    assert_eq!(grid.index_at(2, 1), Some(9));
    assert_eq!(grid.index_at(3, 0), None);
    assert_eq!(grid.row_col(9), Some((2, 1)));
    assert_eq!(grid.row_col(12), None);

    grid.set_point(9, Vector3::new(1., 2., 3.)).unwrap();
    assert_eq!(grid.point(9), Some(Vector3::new(1., 2., 3.)));
    assert_eq!(&grid.positions()[27..30], &[1., 2., 3.][..]);
    assert_eq!(
        grid.set_point(12, Vector3::new(0., 0., 0.)),
        Err(GridError::IndexOutOfRange { index: 12, len: 12 })
    );
}

#[test]
fn id_colors_follow_indices() {
    use crate::data::color::{color_to_id, Color};

    let grid = ControlGrid::new(2, 3, 1, 1).unwrap();
    let colors = grid.id_colors();
    assert_eq!(colors.len(), 18);
    for (index, rgb) in colors.chunks(3).enumerate() {
        let color = Color::from([rgb[0], rgb[1], rgb[2]]);
        assert_eq!(color_to_id(color.to_bytes()), index as u32 + 1);
    }
}
