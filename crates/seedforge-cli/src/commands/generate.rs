use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use indicatif::{ProgressBar, ProgressStyle};

use seedforge_core::config::{ConfigFile, GenerationOptions};
use seedforge_core::output::{self, SqlOptions};
use seedforge_core::personas::Locale;
use seedforge_core::schema::Schema;
use seedforge_core::{CancellationToken, Dataset, OutputFormat};

use crate::args::{CliFormat, GenerateArgs};

pub fn run(args: &GenerateArgs) -> anyhow::Result<()> {
    let schema_text = std::fs::read_to_string(&args.schema)
        .with_context(|| format!("reading schema {}", args.schema.display()))?;
    let schema = Schema::from_json(&schema_text)?;
    schema.validate()?;

    let config = match &args.config {
        Some(path) => Some(ConfigFile::load(path)?),
        None => None,
    };
    let options = build_options(args, config.as_ref())?;
    let format = resolve_format(args, config.as_ref())?;
    let output_path = args
        .output
        .clone()
        .or_else(|| config.as_ref().and_then(|c| c.output.clone().map(PathBuf::from)));

    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template("{spinner} {msg} [{bar:30}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    let progress = |table: &str, done: usize, total: usize| {
        bar.set_length(total as u64);
        bar.set_position(done as u64);
        bar.set_message(table.to_string());
    };
    let progress: &dyn Fn(&str, usize, usize) = &progress;

    let cancel = CancellationToken::new();
    let dataset = seedforge_core::generate_with(&schema, &options, &cancel, Some(progress))?;
    bar.finish_and_clear();

    if let Some(report) = &dataset.validation {
        if report.is_valid() {
            eprintln!("Validation passed ({} rows).", dataset.total_rows());
        } else {
            eprintln!("{}", report.summary());
        }
    }

    write_output(&dataset, format, output_path.as_deref(), args)?;
    eprintln!(
        "Generated {} rows across {} tables (seed {}).",
        dataset.total_rows(),
        dataset.tables.len(),
        dataset.seed
    );
    Ok(())
}

fn build_options(
    args: &GenerateArgs,
    config: Option<&ConfigFile>,
) -> anyhow::Result<GenerationOptions> {
    let mut options = match config {
        Some(config) => {
            let mut config = config.clone();
            // The config's `count` is optional when a flag supplies one.
            if config.count.is_none() {
                config.count = Some(args.count.unwrap_or(100));
            }
            config.to_generation_options()?
        }
        None => GenerationOptions::new(args.count.unwrap_or(100)),
    };

    if let Some(count) = args.count {
        options.count = count;
    }
    if let Some(seed) = args.seed {
        options.seed = Some(seed);
    }
    if let Some(locale) = &args.locale {
        options.locale = Locale::parse(locale);
    }
    if let Some(edge_cases) = args.edge_cases {
        if !(0.0..=100.0).contains(&edge_cases) {
            bail!("--edge-cases must be between 0 and 100");
        }
        options.edge_cases = edge_cases;
    }
    if args.validate {
        options.validate = true;
    }
    Ok(options)
}

fn resolve_format(args: &GenerateArgs, config: Option<&ConfigFile>) -> anyhow::Result<CliFormat> {
    if let Some(format) = args.format {
        return Ok(format);
    }
    if let Some(format) = config.and_then(|c| c.format) {
        return Ok(match format {
            OutputFormat::Sql => CliFormat::Sql,
            OutputFormat::Json => CliFormat::Json,
            OutputFormat::Jsonl => CliFormat::Jsonl,
            OutputFormat::Csv => CliFormat::Csv,
            OutputFormat::All => CliFormat::All,
        });
    }
    let Some(output) = &args.output else {
        return Ok(CliFormat::Sql);
    };
    match output.extension().and_then(|e| e.to_str()) {
        Some("sql") => Ok(CliFormat::Sql),
        Some("json") => Ok(CliFormat::Json),
        Some("jsonl" | "ndjson") => Ok(CliFormat::Jsonl),
        Some("csv") => Ok(CliFormat::Csv),
        other => bail!(
            "cannot infer format from extension {:?}; pass --format",
            other
        ),
    }
}

fn write_output(
    dataset: &Dataset,
    format: CliFormat,
    output_path: Option<&Path>,
    args: &GenerateArgs,
) -> anyhow::Result<()> {
    let sql_options = SqlOptions {
        transaction: args.transaction,
        delete_prelude: args.truncate,
    };

    match format {
        CliFormat::All => {
            let base = output_path
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("seedforge-out"));
            let stem = base.with_extension("");
            for (ext, f) in [
                ("sql", CliFormat::Sql),
                ("json", CliFormat::Json),
                ("csv", CliFormat::Csv),
            ] {
                let path = stem.with_extension(ext);
                write_one(dataset, f, Some(&path), &sql_options)?;
                eprintln!("Wrote {}", path.display());
            }
            Ok(())
        }
        single => write_one(dataset, single, output_path, &sql_options),
    }
}

fn write_one(
    dataset: &Dataset,
    format: CliFormat,
    path: Option<&Path>,
    sql_options: &SqlOptions,
) -> anyhow::Result<()> {
    let mut writer: Box<dyn Write> = match path {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(std::io::stdout().lock()),
    };
    match format {
        CliFormat::Sql => output::write_sql(&mut writer, dataset, sql_options)?,
        CliFormat::Json => output::write_json(&mut writer, dataset)?,
        CliFormat::Jsonl => output::write_jsonl(&mut writer, dataset)?,
        CliFormat::Csv => output::write_csv(&mut writer, dataset)?,
        CliFormat::All => unreachable!("expanded by write_output"),
    }
    writer.flush()?;
    Ok(())
}
