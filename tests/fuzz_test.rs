/// Fuzzes both planners on many random grids: they must agree on path existence and length,
/// produce valid paths, and D* Lite must stay optimal while cells are blocked and freed under it.
use grid_replan::{is_valid_path, AStarPlanner, GridMap, GridPlanner, IncrementalPlanner, Point};
use rand::prelude::*;

fn random_grid(w: usize, h: usize, rng: &mut StdRng, probability: f64) -> GridMap {
    let mut grid = GridMap::new(w, h);
    grid.randomize_obstructions(probability, rng);
    grid
}

fn random_grid_point(grid: &GridMap, rng: &mut StdRng) -> Point {
    Point::new(
        rng.gen_range(0..grid.width()) as i32,
        rng.gen_range(0..grid.height()) as i32,
    )
}

fn visualize_grid(grid: &GridMap, start: &Point, end: &Point) {
    for y in (0..grid.height() as i32).rev() {
        for x in 0..grid.width() as i32 {
            let p = Point::new(x, y);
            if *start == p {
                print!("S");
            } else if *end == p {
                print!("G");
            } else if !grid.is_walkable(p) {
                print!("#");
            } else {
                print!(".");
            }
        }
        println!();
    }
}

#[test]
fn fuzz() {
    const N: usize = 10;
    const N_GRIDS: usize = 2000;
    let mut rng = StdRng::seed_from_u64(0);
    let astar = AStarPlanner::new();
    let start = Point::new(0, 0);
    let end = Point::new(N as i32 - 1, N as i32 - 1);
    for _ in 0..N_GRIDS {
        let mut grid = random_grid(N, N, &mut rng, 0.35);
        grid.set_walkable(start, true);
        grid.set_walkable(end, true);
        grid.generate_components();
        let dstar = IncrementalPlanner::new();
        let reachable = grid.reachable(start, end);
        let astar_path = astar.find_path(&grid, start, end);
        let dstar_path = dstar.find_path(&grid, start, end);
        // Show the grid if the planners disagree
        if astar_path.is_empty() == reachable || astar_path.len() != dstar_path.len() {
            visualize_grid(&grid, &start, &end);
        }
        assert_eq!(!astar_path.is_empty(), reachable);
        assert_eq!(astar_path.len(), dstar_path.len());
        if reachable {
            assert!(is_valid_path(&grid, start, end, &astar_path));
            assert!(is_valid_path(&grid, start, end, &dstar_path));
        }
    }
}

#[test]
fn fuzz_idempotent() {
    const N_GRIDS: usize = 500;
    let mut rng = StdRng::seed_from_u64(1);
    let astar = AStarPlanner::new();
    for _ in 0..N_GRIDS {
        let grid = random_grid(8, 8, &mut rng, 0.25);
        let dstar = IncrementalPlanner::new();
        let start = random_grid_point(&grid, &mut rng);
        let goal = random_grid_point(&grid, &mut rng);
        assert_eq!(
            astar.find_path(&grid, start, goal),
            astar.find_path(&grid, start, goal)
        );
        assert_eq!(
            dstar.find_path(&grid, start, goal),
            dstar.find_path(&grid, start, goal)
        );
    }
}

#[test]
fn fuzz_replanning() {
    const N: usize = 12;
    const N_GRIDS: usize = 300;
    const N_CHANGES: usize = 8;
    let mut rng = StdRng::seed_from_u64(2);
    let astar = AStarPlanner::new();
    for _ in 0..N_GRIDS {
        let mut grid = random_grid(N, N, &mut rng, 0.2);
        let goal = Point::new(N as i32 - 1, N as i32 - 1);
        let mut start = Point::new(0, 0);
        grid.protect(start);
        grid.protect(goal);
        let dstar = IncrementalPlanner::new();
        let mut path = dstar.find_path(&grid, start, goal);
        for _ in 0..N_CHANGES {
            // Block a cell on the current route, or free a random one
            let cell = if !path.is_empty() && rng.gen_bool(0.7) {
                path[rng.gen_range(0..path.len())]
            } else {
                random_grid_point(&grid, &mut rng)
            };
            let obstructed = !grid.is_walkable(cell);
            if grid.toggle_obstruction(cell, !obstructed) {
                dstar.mark_cell_changed(cell);
            }
            // Occasionally advance the agent one step
            if !path.is_empty() && grid.is_walkable(path[0]) && rng.gen_bool(0.5) {
                grid.unprotect(start);
                start = path[0];
                grid.protect(start);
            }
            path = dstar.find_path(&grid, start, goal);
            let expected = astar.find_path(&grid, start, goal);
            if path.len() != expected.len() {
                visualize_grid(&grid, &start, &goal);
            }
            assert_eq!(path.len(), expected.len());
            if !path.is_empty() {
                assert!(!grid.is_path_obstructed(&path));
                assert!(is_valid_path(&grid, start, goal, &path));
            }
        }
    }
}
