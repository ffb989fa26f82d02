pub mod cycle;
pub mod dag;
pub mod topo;
pub mod visualize;

pub use dag::DependencyGraph;
pub use topo::{build_plan, DeferredFk, GenerationPlan, Phase, SelfRefPlan};
