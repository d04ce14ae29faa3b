use fixpoint_rs::examples::chains;
use fixpoint_rs::solver::solve;

fn main() {
    env_logger::init();
    let problem = chains::linear_oneway(10000);
    let result = solve(&problem).unwrap();
    println!("{:?}", result.peek(chains::var(9999)));
}
