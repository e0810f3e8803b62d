//! SVG path data for freehand strokes.
//!
//! Freehand annotations travel with a `d` string alongside their points so
//! that stores and SVG exporters can consume them directly. Only the polyline
//! subset is produced and accepted: one `M` followed by `L` segments (the `L`
//! may be omitted for repeated pairs, and pairs may be comma separated).

use crate::error::Error;
use kurbo::Point;
use winnow::ascii::float;
use winnow::prelude::*;

/// Emit `M x y L x y ...` for a polyline. Empty input yields an empty string.
pub fn to_path_data(points: &[Point]) -> String {
    let mut out = String::with_capacity(points.len() * 12);
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let cmd = if i == 0 { 'M' } else { 'L' };
        out.push_str(&format!("{cmd} {} {}", p.x, p.y));
    }
    out
}

/// Parse polyline path data back into points.
pub fn parse_polyline(input: &str) -> Result<Vec<Point>, Error> {
    let mut rest = input;
    let points = parse_polyline_inner
        .parse_next(&mut rest)
        .map_err(|e| Error::PathData {
            offset: input.len() - rest.len(),
            message: e.to_string(),
        })?;
    skip_separators(&mut rest);
    if !rest.is_empty() {
        return Err(Error::PathData {
            offset: input.len() - rest.len(),
            message: format!("unexpected {:?}", rest.chars().next().unwrap_or_default()),
        });
    }
    Ok(points)
}

fn parse_polyline_inner(input: &mut &str) -> ModalResult<Vec<Point>> {
    skip_separators(input);
    let _ = 'M'.parse_next(input)?;
    let mut points = vec![parse_pair.parse_next(input)?];

    loop {
        skip_separators(input);
        if input.is_empty() {
            break;
        }
        if input.starts_with('L') {
            *input = &input[1..];
        } else if !starts_number(input) {
            break;
        }
        points.push(parse_pair.parse_next(input)?);
    }

    Ok(points)
}

fn parse_pair(input: &mut &str) -> ModalResult<Point> {
    skip_separators(input);
    let x: f64 = float.parse_next(input)?;
    skip_separators(input);
    let y: f64 = float.parse_next(input)?;
    Ok(Point::new(x, y))
}

fn starts_number(s: &str) -> bool {
    s.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '+' || c == '.')
}

fn skip_separators(input: &mut &str) {
    *input = input.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
}
