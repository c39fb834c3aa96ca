//! Bootstrap the correlation of a simulated sample, then compare the bootstrap
//! standard error with the true one from repeated sampling.
//!
//! ```text
//! cargo run --release --example correlation
//! ```

use bootci::stats::{StreamRng, counter_rng_seed};
use bootci::{
    BivariateNormal, BootstrapConfig, Correlation, ExecutionMode, Population, TrialPlan,
    compute_bootstrap, simulate_sampling_distribution,
};
use rand::SeedableRng;

fn main() -> Result<(), bootci::BootstrapError> {
    let population = BivariateNormal::new(0.6)?;
    let statistic = Correlation::new("x", "y");
    let n = 32;

    let mut rng = StreamRng::seed_from_u64(counter_rng_seed(2024, 0));
    let sample = population.draw(n, &mut rng)?;

    let config = BootstrapConfig {
        iterations: 10_000,
        seed: 2024,
        mode: ExecutionMode::parallel_all_cores(),
        bca: true,
        ..Default::default()
    };
    let result = compute_bootstrap(&sample, &statistic, &config)?;

    println!("{}, n = {}", population.describe(), n);
    println!("  r           = {:.4}", result.point_estimate);
    println!("  bootstrap SE = {:.4}", result.standard_error);
    println!(
        "  normal      = [{:.4}, {:.4}]",
        result.normal_ci.lower, result.normal_ci.upper
    );
    println!(
        "  percentile  = [{:.4}, {:.4}]",
        result.percentile_ci.lower, result.percentile_ci.upper
    );
    if let Some(bca) = result.bca_ci {
        println!("  BCa         = [{:.4}, {:.4}]", bca.lower, bca.upper);
    }

    let plan = TrialPlan::parallel(7, config.mode.workers());
    let truth = simulate_sampling_distribution(&population, n, &statistic, 10_000, &plan)?;
    println!("  true SE      = {:.4}", truth.std_dev());

    Ok(())
}
