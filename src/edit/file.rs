//! Control point files.
//!
//! ```text
//! n degree_p
//! m degree_q
//! x y z
//! ...
//! ```
//!
//! followed by `n * m` points in row-major order. Readers go by whitespace-separated tokens, so
//! line breaks are not significant.

use crate::data::ControlGrid;
use crate::edit::EditError;
use cgmath::Vector3;
use std::fmt::Write;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Pulls the next token and parses it.
fn next_token<'a, T: FromStr>(
    tokens: &mut impl Iterator<Item = (usize, &'a str)>,
    what: &str,
) -> Result<T, EditError> {
    match tokens.next() {
        Some((pos, token)) => token.parse().map_err(|_| {
            EditError::MalformedFile(format!("token #{} ({:?}) is not a valid {}", pos, token, what))
        }),
        None => Err(EditError::MalformedFile(format!("missing {}", what))),
    }
}

/// Parses a control point file.
pub fn parse(text: &str) -> Result<ControlGrid, EditError> {
    let mut tokens = text.split_whitespace().enumerate();

    let n: usize = next_token(&mut tokens, "row count")?;
    let degree_p: usize = next_token(&mut tokens, "u degree")?;
    let m: usize = next_token(&mut tokens, "column count")?;
    let degree_q: usize = next_token(&mut tokens, "v degree")?;

    ControlGrid::validate_shape(n, m, degree_p, degree_q)
        .map_err(|err| EditError::MalformedFile(format!("{}", err)))?;
    let count = n * m;

    // sized by what the file actually holds, never by the header alone
    let mut points = Vec::with_capacity(count.min(text.len() / 6));
    for _ in 0..count {
        let x = next_token(&mut tokens, "coordinate")?;
        let y = next_token(&mut tokens, "coordinate")?;
        let z = next_token(&mut tokens, "coordinate")?;
        points.push(Vector3::new(x, y, z));
    }

    if let Some((pos, token)) = tokens.next() {
        return Err(EditError::MalformedFile(format!(
            "unexpected token #{} ({:?}) after {} points",
            pos,
            token,
            count
        )));
    }

    Ok(ControlGrid::from_points(n, m, degree_p, degree_q, points)?)
}

/// Formats a grid as a control point file.
///
/// Floats are written in their shortest form that parses back to the same value.
pub fn format(grid: &ControlGrid) -> String {
    let mut out = String::new();
    // writing to a String can't fail
    let _ = writeln!(out, "{} {}", grid.n(), grid.degree_p());
    let _ = writeln!(out, "{} {}", grid.m(), grid.degree_q());
    for p in grid.points() {
        let _ = writeln!(out, "{} {} {}", p.x, p.y, p.z);
    }
    out
}

/// Reads a control point file.
pub fn read<P: AsRef<Path>>(path: P) -> Result<ControlGrid, EditError> {
    let text = fs::read_to_string(path)?;
    parse(&text)
}

/// Writes a control point file.
pub fn write<P: AsRef<Path>>(path: P, grid: &ControlGrid) -> Result<(), EditError> {
    fs::write(path, format(grid))?;
    Ok(())
}

#[test]
fn parses_any_layout() {
    let grid = parse("2 1\n2 1\n0 0 0  1 0 0\n\t0 1 0\n0.5\n0.5\n-1e-3\n").unwrap();
    assert_eq!((grid.n(), grid.m(), grid.degree_p(), grid.degree_q()), (2, 2, 1, 1));
    assert_eq!(grid.point(3), Some(Vector3::new(0.5, 0.5, -0.001)));
    assert_eq!(grid.knots_u(), &[0., 0., 1., 1.][..]);
}

#[test]
fn rejects_malformed_files() {
    fn malformed(text: &str) -> bool {
        match parse(text) {
            Err(EditError::MalformedFile(_)) => true,
            _ => false,
        }
    }

    assert!(malformed(""));
    assert!(malformed("4 3\n"));
    assert!(malformed("4 3\nfour 3\n"));
    assert!(malformed("-2 1\n2 1\n"));
    // too small for the degree
    assert!(malformed("2 3\n2 3\n0 0 0 0 0 0 0 0 0 0 0 0\n"));
    // three and a half points
    assert!(malformed("2 1\n2 1\n0 0 0\n0 0 0\n0 0 0\n0 0\n"));
    assert!(malformed("2 1\n2 1\n0 0 0\n0 0 0\n0 zero 0\n0 0 0\n"));
    // trailing data
    assert!(malformed("2 1\n2 1\n0 0 0\n0 0 0\n0 0 0\n0 0 0\n1\n"));
}

#[test]
fn huge_headers_are_malformed() {
    fn malformed(text: &str) -> bool {
        match parse(text) {
            Err(EditError::MalformedFile(_)) => true,
            _ => false,
        }
    }

    // n * m overflows
    assert!(malformed("4294967296 1\n4294967296 1\n0 0 0\n"));
    assert!(malformed("18446744073709551615 1\n2 1\n0 0 0\n"));
    // plausible shape, but the file holds a single point
    assert!(malformed("30000 1\n30000 1\n0 0 0\n"));
}

#[test]
fn format_round_trips_exactly() {
    let mut grid = ControlGrid::new(3, 4, 2, 3).unwrap();
    grid.set_point(5, Vector3::new(1. / 3., -0.1, 1e-7)).unwrap();
    grid.set_point(11, Vector3::new(123456.79, f32::MIN_POSITIVE, -0.)).unwrap();

    let text = format(&grid);
    assert!(text.starts_with("3 2\n4 3\n-0.5 0.5 0\n"));
    assert_eq!(parse(&text).unwrap(), grid);
}
