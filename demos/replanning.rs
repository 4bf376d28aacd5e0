use grid_replan::{GridConfig, GridMap, HybridConfig, HybridController, Point};
use rand::{rngs::StdRng, Rng, SeedableRng};

// An agent walks from the bottom-left to the top-right corner of a random grid while
// obstructions keep appearing. The controller plans with A* until it sees the first new
// obstruction and then keeps repairing its D* Lite search.

fn main() {
    let mut rng = StdRng::seed_from_u64(7);
    let config = GridConfig {
        width: 16,
        height: 16,
        obstruction_probability: 0.15,
    };
    let mut grid = match GridMap::from_config(&config, &mut rng) {
        Ok(grid) => grid,
        Err(e) => {
            eprintln!("Invalid grid configuration: {e}");
            return;
        }
    };
    let mut agent = Point::new(0, 0);
    let goal = Point::new(15, 15);
    grid.protect(agent);
    grid.protect(goal);
    let mut controller = HybridController::new(&grid, HybridConfig::without_delay());

    let mut steps = 0;
    while agent != goal {
        let path = controller.find_path(&grid, agent, goal);
        let Some(next) = path.first() else {
            println!("Goal {goal} is unreachable from {agent}");
            break;
        };
        grid.unprotect(agent);
        agent = *next;
        grid.protect(agent);
        steps += 1;
        // Drop an obstruction somewhere every few steps
        if steps % 3 == 0 {
            let cell = Point::new(rng.gen_range(0..16), rng.gen_range(0..16));
            if grid.toggle_obstruction(cell, true) {
                println!("Obstructed {cell}");
            }
        }
        println!("Step {steps}: {agent} ({:?})", controller.mode());
    }
    println!("{}", grid);
}
