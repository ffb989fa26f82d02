use rand::rngs::StdRng;
use rand::SeedableRng;

use seedforge_core::pattern::Pattern;

use crate::args::PatternArgs;

pub fn run(args: &PatternArgs) -> anyhow::Result<()> {
    let pattern = Pattern::parse(&args.pattern)?;
    let mut rng = StdRng::seed_from_u64(args.seed);

    for i in 0..args.times {
        let expanded = match args.sequential_from {
            Some(base) => pattern.expand_sequential(&mut rng, base + i as u64),
            None => pattern.expand(&mut rng),
        };
        println!("{}", expanded);
    }
    Ok(())
}
