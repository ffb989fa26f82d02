use anyhow::Context;
use comfy_table::{presets::UTF8_FULL, Cell, Table as TermTable};

use seedforge_core::output::read_json;
use seedforge_core::schema::Schema;
use seedforge_core::validate::validate;

use crate::args::ValidateArgs;

pub fn run(args: &ValidateArgs) -> anyhow::Result<()> {
    let schema_text = std::fs::read_to_string(&args.schema)
        .with_context(|| format!("reading schema {}", args.schema.display()))?;
    let schema = Schema::from_json(&schema_text)?;
    schema.validate()?;

    let data_text = std::fs::read_to_string(&args.data)
        .with_context(|| format!("reading dataset {}", args.data.display()))?;
    let dataset = read_json(&data_text)?;

    let report = validate(&schema, &dataset);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let mut table = TermTable::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec!["table", "rows", "status", "errors"]);
        for (name, table_report) in &report.tables {
            let rows = dataset.table(name).map(|t| t.rows.len()).unwrap_or(0);
            table.add_row(vec![
                Cell::new(name),
                Cell::new(rows),
                Cell::new(if table_report.valid { "ok" } else { "FAIL" }),
                Cell::new(table_report.errors.len()),
            ]);
        }
        println!("{table}");
        if !report.is_valid() {
            println!("{}", report.summary());
        }
        for check in &report.not_enforced_checks {
            println!("not enforced by generator: {}", check);
        }
    }

    if !report.is_valid() {
        anyhow::bail!("{} constraint violations", report.total_errors);
    }
    Ok(())
}
