#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Cell enumeration for spell and ability templates.
//!
//! Range checks use Chebyshev distance so that template reach agrees with
//! grid movement: a 20 ft sphere spans four tiles in every direction,
//! diagonals included. Headings follow the compass convention of
//! [`AoeRequest::direction`], where 0 degrees points north (toward decreasing
//! `y`) and 90 degrees points east.

use std::collections::BTreeSet;

use battle_grid_core::{AoeRequest, AoeShape, CellCoord, GridDimensions, LENGTH_UNITS_PER_TILE};
use battle_grid_world::Grid;
use glam::DVec2;
use tracing::warn;

/// Full opening angle of a cone template in degrees.
pub const CONE_APERTURE_DEGREES: f64 = 53.0;

/// Cells covered by the template, without duplicates.
///
/// The result is not clipped to any grid, so its size follows the template
/// size; see [`affected_cells_on_grid`] for a grid-bounded enumeration.
#[must_use]
pub fn affected_cells(request: &AoeRequest) -> Vec<CellCoord> {
    cells_within(request, Window::UNBOUNDED)
}

/// Cells covered by the template that also lie on the grid.
///
/// Only cells on the grid are ever visited, so the work is bounded by the
/// grid size however large the template is.
#[must_use]
pub fn affected_cells_on_grid(grid: &Grid, request: &AoeRequest) -> Vec<CellCoord> {
    cells_within(request, Window::of_grid(grid.dimensions()))
}

/// Resolves a textual shape tag before enumerating the template.
///
/// Unknown tags are logged and produce an empty result.
#[must_use]
pub fn affected_cells_for_tag(
    tag: &str,
    origin: CellCoord,
    size: u32,
    direction: Option<f64>,
    aim: Option<CellCoord>,
) -> Vec<CellCoord> {
    let shape = match tag.parse::<AoeShape>() {
        Ok(shape) => shape,
        Err(error) => {
            warn!(tag = error.tag(), "ignoring area of effect with unknown shape");
            return Vec::new();
        }
    };

    let request = AoeRequest {
        shape,
        origin,
        size,
        direction,
        aim,
        width: None,
    };
    affected_cells(&request)
}

fn cells_within(request: &AoeRequest, window: Window) -> Vec<CellCoord> {
    match request.shape {
        AoeShape::Sphere | AoeShape::Cylinder => {
            sphere_cells(request.origin, request.size, window)
        }
        AoeShape::Cone => cone_cells(
            request.origin,
            request.size,
            request.direction.unwrap_or_default(),
            window,
        ),
        AoeShape::Cube => cube_cells(request.origin, request.size, window),
        AoeShape::Line => {
            let origin = cell_centre(request.origin);
            let target = request.aim.map_or_else(
                || project(origin, request.direction.unwrap_or_default(), request.size),
                cell_centre,
            );
            line_cells(origin, target, window)
        }
    }
}

/// Inclusive rectangle of cells; empty when a minimum exceeds its maximum.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Window {
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
}

impl Window {
    const UNBOUNDED: Self = Self {
        min_x: i32::MIN,
        min_y: i32::MIN,
        max_x: i32::MAX,
        max_y: i32::MAX,
    };

    fn of_grid(dimensions: GridDimensions) -> Self {
        let last = |extent: u32| i32::try_from(extent).unwrap_or(i32::MAX).saturating_sub(1);
        Self {
            min_x: 0,
            min_y: 0,
            max_x: last(dimensions.width()),
            max_y: last(dimensions.height()),
        }
    }

    /// Square of cells within `reach` tiles of `origin` on both axes.
    fn around(origin: CellCoord, reach: i32) -> Self {
        Self {
            min_x: origin.x().saturating_sub(reach),
            min_y: origin.y().saturating_sub(reach),
            max_x: origin.x().saturating_add(reach),
            max_y: origin.y().saturating_add(reach),
        }
    }

    fn intersect(self, other: Self) -> Self {
        Self {
            min_x: self.min_x.max(other.min_x),
            min_y: self.min_y.max(other.min_y),
            max_x: self.max_x.min(other.max_x),
            max_y: self.max_y.min(other.max_y),
        }
    }

    fn contains(self, cell: CellCoord) -> bool {
        (self.min_x..=self.max_x).contains(&cell.x())
            && (self.min_y..=self.max_y).contains(&cell.y())
    }

    fn cells(self) -> impl Iterator<Item = CellCoord> {
        let Self {
            min_x,
            min_y,
            max_x,
            max_y,
        } = self;
        (min_x..=max_x).flat_map(move |x| (min_y..=max_y).map(move |y| CellCoord::new(x, y)))
    }
}

fn reach_in_tiles(size: u32) -> i32 {
    i32::try_from(size / LENGTH_UNITS_PER_TILE).unwrap_or(i32::MAX)
}

fn within_reach(origin: CellCoord, cell: CellCoord, size: u32) -> bool {
    u64::from(origin.chebyshev_distance(cell)) * u64::from(LENGTH_UNITS_PER_TILE)
        <= u64::from(size)
}

/// Cells of the square bounding box around `origin` that fall inside `window`.
fn candidates(origin: CellCoord, size: u32, window: Window) -> impl Iterator<Item = CellCoord> {
    Window::around(origin, reach_in_tiles(size))
        .intersect(window)
        .cells()
}

fn sphere_cells(origin: CellCoord, radius: u32, window: Window) -> Vec<CellCoord> {
    candidates(origin, radius, window)
        .filter(|cell| within_reach(origin, *cell, radius))
        .collect()
}

fn cone_cells(origin: CellCoord, length: u32, direction: f64, window: Window) -> Vec<CellCoord> {
    let heading = direction.rem_euclid(360.0);
    let half_aperture = CONE_APERTURE_DEGREES / 2.0;

    candidates(origin, length, window)
        .filter(|cell| *cell != origin && within_reach(origin, *cell, length))
        .filter(|cell| {
            let dx = f64::from(cell.x() - origin.x());
            let dy = f64::from(cell.y() - origin.y());
            let bearing = (dy.atan2(dx).to_degrees() + 90.0).rem_euclid(360.0);
            let mut difference = (bearing - heading).abs();
            if difference > 180.0 {
                difference = 360.0 - difference;
            }
            difference <= half_aperture
        })
        .collect()
}

/// Box of `ceil(size / 5)` cells per side with `origin` as its north-west corner.
fn cube_cells(origin: CellCoord, size: u32, window: Window) -> Vec<CellCoord> {
    let side = i32::try_from(size.div_ceil(LENGTH_UNITS_PER_TILE)).unwrap_or(i32::MAX);
    let last = side.saturating_sub(1);
    Window {
        min_x: origin.x(),
        min_y: origin.y(),
        max_x: origin.x().saturating_add(last),
        max_y: origin.y().saturating_add(last),
    }
    .intersect(window)
    .cells()
    .collect()
}

fn cell_centre(cell: CellCoord) -> DVec2 {
    DVec2::new(f64::from(cell.x()), f64::from(cell.y()))
}

/// Point `size` length units from `origin` along a compass heading.
///
/// The displacement is stretched so its Chebyshev length is exactly the
/// requested reach: a 30 ft diagonal ends six tiles out on both axes.
fn project(origin: DVec2, direction: f64, size: u32) -> DVec2 {
    let tiles = f64::from(size) / f64::from(LENGTH_UNITS_PER_TILE);
    let radians = (direction - 90.0).to_radians();
    let heading = DVec2::new(radians.cos(), radians.sin());
    let dominant = heading.x.abs().max(heading.y.abs());
    if dominant <= f64::EPSILON {
        return origin;
    }
    origin + heading * (tiles / dominant)
}

fn line_cells(origin: DVec2, target: DVec2, window: Window) -> Vec<CellCoord> {
    let steps = origin.distance(target).round();
    let Some((enter, exit)) = clip_segment(origin, target, window) else {
        return Vec::new();
    };

    // One sample of slack on each side absorbs rounding at the clip edges.
    let first = ((enter * steps).ceil() - 1.0).max(0.0) as u64;
    let last = ((exit * steps).floor() + 1.0).min(steps) as u64;

    let mut seen = BTreeSet::new();
    let mut cells = Vec::new();
    for sample in first..=last {
        let t = if steps > 0.0 {
            sample as f64 / steps
        } else {
            0.0
        };
        let cell = nearest_cell(origin.lerp(target, t));
        if window.contains(cell) && seen.insert(cell) {
            cells.push(cell);
        }
    }

    cells
}

/// Parameter range of the segment whose points round into `window`.
fn clip_segment(origin: DVec2, target: DVec2, window: Window) -> Option<(f64, f64)> {
    let delta = target - origin;
    let axes = [
        (origin.x, delta.x, window.min_x, window.max_x),
        (origin.y, delta.y, window.min_y, window.max_y),
    ];

    let (mut enter, mut exit) = (0.0_f64, 1.0_f64);
    for (start, span, min, max) in axes {
        let low = f64::from(min) - 0.5;
        let high = f64::from(max) + 0.5;
        if span.abs() <= f64::EPSILON {
            if start < low || start > high {
                return None;
            }
            continue;
        }
        let (a, b) = ((low - start) / span, (high - start) / span);
        enter = enter.max(a.min(b));
        exit = exit.min(a.max(b));
    }

    (enter <= exit).then_some((enter, exit))
}

/// Rounds half up, matching how cells are picked along interpolated lines.
fn nearest_cell(point: DVec2) -> CellCoord {
    let rounded = (point + DVec2::splat(0.5)).floor();
    CellCoord::new(rounded.x as i32, rounded.y as i32)
}
