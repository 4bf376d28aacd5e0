use crate::config::GridConfig;
use crate::error::ConfigError;
use core::fmt;
use fxhash::FxHashSet;
use grid_util::grid::{BoolGrid, Grid};
use grid_util::point::Point;
use log::warn;
use petgraph::unionfind::UnionFind;
use rand::Rng;
use smallvec::SmallVec;

/// [GridMap] owns the walkability of every cell of a fixed-size 4-connected grid. Obstructed
/// cells are stored as [true] in the underlying [BoolGrid]. It additionally maintains connected
/// components in a [UnionFind] structure so that hopeless requests can be rejected without a
/// flood fill, and a set of protected cells that [toggle_obstruction](Self::toggle_obstruction)
/// refuses to obstruct.
#[derive(Clone, Debug)]
pub struct GridMap {
    grid: BoolGrid,
    components: UnionFind<usize>,
    components_dirty: bool,
    protected: FxHashSet<Point>,
}

impl GridMap {
    /// Creates a fully walkable grid.
    pub fn new(width: usize, height: usize) -> GridMap {
        let mut grid_map = GridMap {
            grid: BoolGrid::new(width, height, false),
            components: UnionFind::new(width * height),
            components_dirty: false,
            protected: FxHashSet::default(),
        };
        grid_map.generate_components();
        grid_map
    }

    /// Validates the configuration and obstructs cells at random with its probability.
    pub fn from_config<R: Rng>(config: &GridConfig, rng: &mut R) -> Result<GridMap, ConfigError> {
        config.validate()?;
        let mut grid_map = GridMap::new(config.width, config.height);
        grid_map.randomize_obstructions(config.obstruction_probability, rng);
        Ok(grid_map)
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    /// Number of cells on the grid.
    pub fn len(&self) -> usize {
        self.width() * self.height()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_in_bounds(&self, point: Point) -> bool {
        point.x >= 0
            && point.y >= 0
            && (point.x as usize) < self.width()
            && (point.y as usize) < self.height()
    }

    /// Off-grid cells are never walkable.
    pub fn is_walkable(&self, point: Point) -> bool {
        self.is_in_bounds(point) && !self.grid.get(point.x as usize, point.y as usize)
    }

    /// Updates a cell. Joins newly connected components right away and flags the components
    /// as dirty if they are (potentially) broken apart. Ignores protection and off-grid cells.
    pub fn set_walkable(&mut self, point: Point, walkable: bool) {
        if !self.is_in_bounds(point) {
            return;
        }
        if walkable {
            let p_ix = self.ix(point);
            for n in self.neighbors(point) {
                if self.is_walkable(n) {
                    let n_ix = self.ix(n);
                    self.components.union(p_ix, n_ix);
                }
            }
        } else if self.is_walkable(point) {
            self.components_dirty = true;
        }
        self.grid.set(point.x as usize, point.y as usize, !walkable);
    }

    /// In-bounds neighbours in the fixed order up, down, left, right.
    pub fn neighbors(&self, point: Point) -> SmallVec<[Point; 4]> {
        [
            Point::new(point.x, point.y + 1),
            Point::new(point.x, point.y - 1),
            Point::new(point.x - 1, point.y),
            Point::new(point.x + 1, point.y),
        ]
        .into_iter()
        .filter(|p| self.is_in_bounds(*p))
        .collect()
    }

    /// In-bounds neighbours that can be entered.
    pub fn walkable_neighbors(&self, point: Point) -> SmallVec<[Point; 4]> {
        self.neighbors(point)
            .into_iter()
            .filter(|p| self.is_walkable(*p))
            .collect()
    }

    pub fn obstructed_cells(&self) -> FxHashSet<Point> {
        self.cells().filter(|p| !self.is_walkable(*p)).collect()
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Point> + '_ {
        let width = self.width() as i32;
        (0..self.height() as i32).flat_map(move |y| (0..width).map(move |x| Point::new(x, y)))
    }

    /// Checks whether any cell of a previously planned path has since become obstructed.
    pub fn is_path_obstructed(&self, path: &[Point]) -> bool {
        path.iter().any(|p| !self.is_walkable(*p))
    }

    pub fn is_protected(&self, point: Point) -> bool {
        self.protected.contains(&point)
    }

    /// Marks a cell (typically the agent's or the destination's) as protected and clears any
    /// obstruction on it.
    pub fn protect(&mut self, point: Point) {
        if !self.is_in_bounds(point) {
            return;
        }
        self.protected.insert(point);
        if !self.is_walkable(point) {
            self.set_walkable(point, true);
        }
    }

    pub fn unprotect(&mut self, point: Point) {
        self.protected.remove(&point);
    }

    /// Places or removes an obstruction, refusing to obstruct protected cells. Returns whether
    /// the cell now has the requested state.
    pub fn toggle_obstruction(&mut self, point: Point, obstructed: bool) -> bool {
        if !self.is_in_bounds(point) {
            return false;
        }
        if obstructed && self.is_protected(point) {
            warn!("Refusing to obstruct protected cell {}", point);
            return false;
        }
        self.set_walkable(point, !obstructed);
        true
    }

    /// Obstructs every unprotected cell with the given probability and frees protected ones.
    pub fn randomize_obstructions<R: Rng>(&mut self, probability: f64, rng: &mut R) {
        let probability = if probability.is_nan() {
            0.0
        } else {
            probability.clamp(0.0, 1.0)
        };
        let cells = self.cells().collect::<Vec<_>>();
        for p in cells {
            let blocked = !self.is_protected(p) && rng.gen_bool(probability);
            self.grid.set(p.x as usize, p.y as usize, blocked);
        }
        self.generate_components();
    }

    /// Retrieves the component id a given [Point] belongs to.
    pub fn component(&self, point: Point) -> usize {
        self.components.find(self.ix(point))
    }

    /// Checks if start and goal are on the same component.
    pub fn reachable(&self, start: Point, goal: Point) -> bool {
        !self.unreachable(start, goal)
    }

    /// Checks if start and goal are not on the same component. Components only ever
    /// over-approximate connectivity between regenerations, so this never rejects a pair that
    /// can actually be connected.
    pub fn unreachable(&self, start: Point, goal: Point) -> bool {
        if self.is_in_bounds(start) && self.is_in_bounds(goal) {
            !self.components.equiv(self.ix(start), self.ix(goal))
        } else {
            true
        }
    }

    pub fn components_dirty(&self) -> bool {
        self.components_dirty
    }

    /// Regenerates the components if they are marked as dirty.
    pub fn update(&mut self) {
        if self.components_dirty {
            self.generate_components();
        }
    }

    /// Generates a new [UnionFind] structure and links up walkable grid neighbours.
    pub fn generate_components(&mut self) {
        self.components = UnionFind::new(self.len());
        self.components_dirty = false;
        let cells = self.cells().filter(|p| self.is_walkable(*p)).collect::<Vec<_>>();
        for point in cells {
            let parent_ix = self.ix(point);
            for n in [Point::new(point.x + 1, point.y), Point::new(point.x, point.y + 1)] {
                if self.is_walkable(n) {
                    let n_ix = self.ix(n);
                    self.components.union(parent_ix, n_ix);
                }
            }
        }
    }

    fn ix(&self, point: Point) -> usize {
        point.y as usize * self.width() + point.x as usize
    }
}

impl fmt::Display for GridMap {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for y in (0..self.height() as i32).rev() {
            let row = (0..self.width() as i32)
                .map(|x| if self.grid.get(x as usize, y as usize) { '#' } else { '.' })
                .collect::<String>();
            writeln!(f, "{}", row)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn bounds_and_walkability() {
        let mut grid = GridMap::new(3, 2);
        assert!(grid.is_in_bounds(Point::new(2, 1)));
        assert!(!grid.is_in_bounds(Point::new(3, 1)));
        assert!(!grid.is_in_bounds(Point::new(-1, 0)));
        assert!(!grid.is_walkable(Point::new(0, 2)));
        grid.set_walkable(Point::new(1, 1), false);
        assert!(!grid.is_walkable(Point::new(1, 1)));
        // Off-grid writes are ignored
        grid.set_walkable(Point::new(5, 5), false);
        assert_eq!(grid.obstructed_cells().len(), 1);
    }

    #[test]
    fn neighbour_order_is_up_down_left_right() {
        let grid = GridMap::new(3, 3);
        let n = grid.neighbors(Point::new(1, 1));
        assert_eq!(
            n.as_slice(),
            &[
                Point::new(1, 2),
                Point::new(1, 0),
                Point::new(0, 1),
                Point::new(2, 1)
            ]
        );
        let corner = grid.neighbors(Point::new(0, 0));
        assert_eq!(corner.as_slice(), &[Point::new(0, 1), Point::new(1, 0)]);
    }

    /// Tests whether points are correctly mapped to different connected components
    #[test]
    fn test_component_generation() {
        // |.#.|
        // |.#.|
        let mut grid = GridMap::new(3, 2);
        grid.set_walkable(Point::new(1, 0), false);
        grid.set_walkable(Point::new(1, 1), false);
        assert!(grid.components_dirty());
        grid.update();
        assert!(!grid.components_dirty());
        assert!(grid.reachable(Point::new(0, 0), Point::new(0, 1)));
        assert!(grid.unreachable(Point::new(0, 0), Point::new(2, 0)));
        assert!(grid.unreachable(Point::new(0, 0), Point::new(7, 0)));
    }

    #[test]
    fn unblocking_joins_components_immediately() {
        let mut grid = GridMap::new(3, 1);
        grid.set_walkable(Point::new(1, 0), false);
        grid.update();
        assert!(grid.unreachable(Point::new(0, 0), Point::new(2, 0)));
        grid.set_walkable(Point::new(1, 0), true);
        assert!(!grid.components_dirty());
        assert!(grid.reachable(Point::new(0, 0), Point::new(2, 0)));
    }

    #[test]
    fn protected_cells_refuse_obstruction() {
        let mut grid = GridMap::new(2, 2);
        let p = Point::new(1, 1);
        grid.set_walkable(p, false);
        grid.protect(p);
        assert!(grid.is_walkable(p));
        assert!(!grid.toggle_obstruction(p, true));
        assert!(grid.is_walkable(p));
        grid.unprotect(p);
        assert!(grid.toggle_obstruction(p, true));
        assert!(!grid.is_walkable(p));
        assert!(grid.is_path_obstructed(&[Point::new(0, 1), p]));
    }

    #[test]
    fn randomized_grid_respects_protection() {
        let mut rng = StdRng::seed_from_u64(0);
        let config = GridConfig {
            width: 8,
            height: 8,
            obstruction_probability: 1.0,
        };
        let mut grid = GridMap::from_config(&config, &mut rng).unwrap();
        assert_eq!(grid.obstructed_cells().len(), 64);
        grid.protect(Point::new(0, 0));
        grid.randomize_obstructions(1.0, &mut rng);
        assert_eq!(grid.obstructed_cells().len(), 63);
        assert!(grid.is_walkable(Point::new(0, 0)));

        let bad = GridConfig {
            obstruction_probability: -0.1,
            ..GridConfig::default()
        };
        assert!(GridMap::from_config(&bad, &mut rng).is_err());
    }

    #[test]
    fn display_draws_rows_top_down() {
        let mut grid = GridMap::new(3, 2);
        grid.set_walkable(Point::new(0, 1), false);
        assert_eq!(format!("{}", grid), "#..\n...\n");
    }
}
