use fixpoint_rs::examples::chains;
use fixpoint_rs::solver::{solve, to_dot_with};

fn main() {
    env_logger::init();
    let problem = chains::fan_out(5);
    let result = solve(&problem).unwrap();
    println!("{}", to_dot_with(&problem, &result));
}
