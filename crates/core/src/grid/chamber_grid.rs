//! Static chamber layout: identity, geometry and adjacency.
//!
//! Chambers are numbered row-major. Adjacency is the 8-neighbourhood
//! (Chebyshev distance 1); edge and corner chambers simply have fewer
//! neighbours. The layout never changes after construction, so every query
//! here is a pure function of `(rows, cols, origin, pitch)`.

use crate::config::LayoutConfig;
use crate::constants::ELEMENT_RADIUS_RATIO;
use crate::core_types::{Chamber, ChamberId, ElementId, FuelElement, Rect, Vec2};
use crate::error::Result;

/// All 8 offsets: N, S, W, E, NW, NE, SW, SE.
const OFFSETS_8: [(isize, isize); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];

/// Row/column grid of square chambers separated by a fixed gap.
#[derive(Debug, Clone, PartialEq)]
pub struct ChamberGrid {
    rows: usize,
    cols: usize,
    /// Top-left corner of chamber (0, 0).
    origin: Vec2,
    chamber_size: f64,
    pitch: f64,
}

impl ChamberGrid {
    /// Build the grid described by `layout`.
    ///
    /// # Errors
    ///
    /// Returns `ReactorError::InvalidConfig` if the layout does not validate.
    pub fn new(layout: &LayoutConfig) -> Result<Self> {
        layout.validate()?;
        let (platform_x, platform_y) = layout.platform_origin();
        Ok(Self {
            rows: layout.rows(),
            cols: layout.columns(),
            origin: Vec2::new(
                platform_x + layout.platform_margin,
                platform_y + layout.platform_margin,
            ),
            chamber_size: layout.chamber_size,
            pitch: layout.chamber_pitch(),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn chamber_size(&self) -> f64 {
        self.chamber_size
    }

    pub fn id_of(&self, row: usize, col: usize) -> Option<ChamberId> {
        (row < self.rows && col < self.cols).then(|| ChamberId(row * self.cols + col))
    }

    pub fn coord_of(&self, id: ChamberId) -> Option<(usize, usize)> {
        (id.index() < self.len()).then(|| (id.index() / self.cols, id.index() % self.cols))
    }

    /// Left edge of chamber column `col`.
    pub fn column_x(&self, col: usize) -> f64 {
        self.origin.x + col as f64 * self.pitch
    }

    /// Top edge of chamber row `row`.
    pub fn row_y(&self, row: usize) -> f64 {
        self.origin.y + row as f64 * self.pitch
    }

    pub fn bounds_of(&self, row: usize, col: usize) -> Rect {
        Rect::new(
            self.column_x(col),
            self.row_y(row),
            self.chamber_size,
            self.chamber_size,
        )
    }

    /// Chambers at Chebyshev distance exactly 1 from `id`, excluding `id`.
    /// Empty for an id outside the grid.
    pub fn neighbors(&self, id: ChamberId) -> Vec<ChamberId> {
        let Some((row, col)) = self.coord_of(id) else {
            return Vec::new();
        };
        let mut result = Vec::with_capacity(8);
        for (dr, dc) in OFFSETS_8 {
            let r = row.checked_add_signed(dr);
            let c = col.checked_add_signed(dc);
            if let (Some(r), Some(c)) = (r, c) {
                if let Some(neighbor) = self.id_of(r, c) {
                    result.push(neighbor);
                }
            }
        }
        result
    }

    /// Chamber whose closed rectangle contains `point`, if any.
    ///
    /// Points in the gaps between chambers, in the vessel margin or outside
    /// the vessel belong to no chamber.
    pub fn chamber_at(&self, point: Vec2) -> Option<ChamberId> {
        let local = point - self.origin;
        if local.x < 0.0 || local.y < 0.0 {
            return None;
        }
        let col = (local.x / self.pitch).floor() as usize;
        let row = (local.y / self.pitch).floor() as usize;
        let id = self.id_of(row, col)?;
        self.bounds_of(row, col).contains(point).then_some(id)
    }

    /// Build the chamber and element arrays, one element centred per chamber.
    pub(crate) fn build_cells(&self) -> (Vec<Chamber>, Vec<FuelElement>) {
        let mut chambers = Vec::with_capacity(self.len());
        let mut elements = Vec::with_capacity(self.len());
        let radius = self.chamber_size * ELEMENT_RADIUS_RATIO;

        for row in 0..self.rows {
            for col in 0..self.cols {
                let id = ChamberId(row * self.cols + col);
                let bounds = self.bounds_of(row, col);
                elements.push(FuelElement::new(
                    ElementId(id.index()),
                    id,
                    bounds.center(),
                    radius,
                ));
                chambers.push(Chamber::new(id, row, col, bounds));
            }
        }

        (chambers, elements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> ChamberGrid {
        ChamberGrid::new(&LayoutConfig::default()).unwrap()
    }

    #[test]
    fn test_default_grid_shape() {
        let g = grid();
        assert_eq!(g.rows(), 19);
        assert_eq!(g.cols(), 28);
        assert_eq!(g.len(), 532);
        assert!(!g.is_empty());
        assert_eq!(g.column_x(0), 120.0);
        assert_eq!(g.row_y(0), 70.0);
        assert_eq!(g.column_x(1), 154.0);
    }

    #[test]
    fn test_is_empty_follows_len() {
        let g = ChamberGrid {
            rows: 0,
            ..grid()
        };
        assert_eq!(g.len(), 0);
        assert!(g.is_empty());
        assert!(g.chamber_at(Vec2::new(130.0, 80.0)).is_none());
    }

    // ── Neighbour tests ─────────────────────────────────────────

    #[test]
    fn test_neighbors_interior() {
        let g = grid();
        let id = g.id_of(5, 5).unwrap();
        let n = g.neighbors(id);
        assert_eq!(n.len(), 8);
        assert!(!n.contains(&id));
    }

    #[test]
    fn test_neighbors_corner() {
        let g = grid();
        let n = g.neighbors(ChamberId(0));
        assert_eq!(n.len(), 3);
        assert!(n.contains(&g.id_of(1, 0).unwrap()));
        assert!(n.contains(&g.id_of(0, 1).unwrap()));
        assert!(n.contains(&g.id_of(1, 1).unwrap()));
    }

    #[test]
    fn test_neighbors_edge() {
        let g = grid();
        let n = g.neighbors(g.id_of(0, 10).unwrap());
        assert_eq!(n.len(), 5);
        let last = g.id_of(18, 27).unwrap();
        assert_eq!(g.neighbors(last).len(), 3);
    }

    #[test]
    fn test_neighbors_outside_grid() {
        assert!(grid().neighbors(ChamberId(10_000)).is_empty());
    }

    #[test]
    fn test_neighbors_are_chebyshev_one() {
        let g = grid();
        let (chambers, _) = g.build_cells();
        let id = g.id_of(7, 12).unwrap();
        for n in g.neighbors(id) {
            assert_eq!(chambers[id.index()].grid_distance(&chambers[n.index()]), 1);
        }
    }

    // ── Point lookup ────────────────────────────────────────────

    #[test]
    fn test_chamber_at_inside_and_edges() {
        let g = grid();
        assert_eq!(g.chamber_at(Vec2::new(120.0, 70.0)), Some(ChamberId(0)));
        assert_eq!(g.chamber_at(Vec2::new(151.0, 101.0)), Some(ChamberId(0)));
        assert_eq!(g.chamber_at(Vec2::new(154.0, 70.0)), Some(ChamberId(1)));
        let id = g.id_of(3, 4).unwrap();
        let center = g.bounds_of(3, 4).center();
        assert_eq!(g.chamber_at(center), Some(id));
    }

    #[test]
    fn test_chamber_at_gaps_and_outside() {
        let g = grid();
        // gap between column 0 and 1
        assert_eq!(g.chamber_at(Vec2::new(152.5, 80.0)), None);
        // vessel margin
        assert_eq!(g.chamber_at(Vec2::new(110.0, 80.0)), None);
        // past the last column
        assert_eq!(g.chamber_at(Vec2::new(1090.0, 80.0)), None);
        assert_eq!(g.chamber_at(Vec2::new(-5.0, -5.0)), None);
    }

    #[test]
    fn test_elements_centred_in_chambers() {
        let g = grid();
        let (chambers, elements) = g.build_cells();
        assert_eq!(chambers.len(), elements.len());
        for (chamber, element) in chambers.iter().zip(&elements) {
            assert_eq!(element.chamber_id, chamber.id);
            assert!(chamber.contains(element.position));
            assert!(element.radius < g.chamber_size() / 2.0);
        }
    }
}
