use anyhow::Context;

use seedforge_core::graph::{build_plan, visualize};
use seedforge_core::schema::Schema;

use crate::args::{GraphArgs, GraphFormat};

pub fn run(args: &GraphArgs) -> anyhow::Result<()> {
    let schema_text = std::fs::read_to_string(&args.schema)
        .with_context(|| format!("reading schema {}", args.schema.display()))?;
    let schema = Schema::from_json(&schema_text)?;
    schema.validate()?;

    match args.format {
        GraphFormat::Mermaid => print!("{}", visualize::to_mermaid(&schema)),
        GraphFormat::Dot => print!("{}", visualize::to_dot(&schema)),
        GraphFormat::Text => {
            let plan = build_plan(&schema)?;
            println!("Generation plan:");
            print!("{}", visualize::describe_plan(&plan));
        }
    }
    Ok(())
}
