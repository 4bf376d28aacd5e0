use grid_replan::{AStarPlanner, GridMap, GridPlanner, IncrementalPlanner, Point};

// In this example a path is found on a 3x3 grid with shape
//  ___
// |S  |
// | # |
// |  E|
//  ___
// where
// - # marks an obstacle
// - S marks the start
// - E marks the end
//
// Nodes have a 4-neighborhood

fn main() {
    let mut grid = GridMap::new(3, 3);
    grid.set_walkable(Point::new(1, 1), false);
    println!("{}", grid);
    let start = Point::new(0, 2);
    let end = Point::new(2, 0);
    for planner in [
        Box::new(AStarPlanner::new()) as Box<dyn GridPlanner>,
        Box::new(IncrementalPlanner::new()),
    ] {
        let path = planner.find_path(&grid, start, end);
        println!("Path ({}):", planner.name());
        for p in path {
            println!("{:?}", p);
        }
    }
}
