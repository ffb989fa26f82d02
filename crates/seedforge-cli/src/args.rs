use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "seedforge",
    about = "Generate constraint-safe relational test data from a declarative schema",
    version,
    after_help = "Examples:\n  seedforge generate --schema schema.json --count 1000 --output seed.sql\n  seedforge generate --schema schema.json --config seedforge.json\n  seedforge graph --schema schema.json --format mermaid\n  seedforge validate --schema schema.json --data seed.json\n  seedforge pattern 'XX-{d:4}' --times 5 --seed 42"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a dataset for a schema
    Generate(GenerateArgs),

    /// Show the table dependency graph and generation plan
    Graph(GraphArgs),

    /// Validate an exported dataset against its schema
    Validate(ValidateArgs),

    /// Expand a string pattern
    Pattern(PatternArgs),
}

#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Schema JSON file
    #[arg(long)]
    pub schema: PathBuf,

    /// Options file (JSON); CLI flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Records per table
    #[arg(long)]
    pub count: Option<usize>,

    /// Random seed for deterministic generation
    #[arg(long)]
    pub seed: Option<u64>,

    /// Locale for persona data (en_US, en_GB, de_DE, fr_FR, en_CA, en_AU)
    #[arg(long)]
    pub locale: Option<String>,

    /// Edge-case injection percentage (0-100)
    #[arg(long)]
    pub edge_cases: Option<f64>,

    /// Output file path; stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (auto-detected from the output extension if not given)
    #[arg(long)]
    pub format: Option<CliFormat>,

    /// Run the constraint validator after generation
    #[arg(long)]
    pub validate: bool,

    /// Wrap SQL output in BEGIN/COMMIT
    #[arg(long)]
    pub transaction: bool,

    /// Emit DELETE FROM statements (reverse order) before the inserts
    #[arg(long)]
    pub truncate: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliFormat {
    Sql,
    Json,
    Jsonl,
    Csv,
    All,
}

#[derive(Parser, Debug)]
pub struct GraphArgs {
    /// Schema JSON file
    #[arg(long)]
    pub schema: PathBuf,

    /// Rendering: text (plan phases), mermaid, or dot
    #[arg(long, default_value = "text")]
    pub format: GraphFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GraphFormat {
    Text,
    Mermaid,
    Dot,
}

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Schema JSON file
    #[arg(long)]
    pub schema: PathBuf,

    /// Dataset JSON file (as written by `generate --format json`)
    #[arg(long)]
    pub data: PathBuf,

    /// Emit the report as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct PatternArgs {
    /// The pattern to expand (e.g. "XX-{d:4}" or "[red,green,blue]-###")
    pub pattern: String,

    /// How many expansions to print
    #[arg(long, default_value = "1")]
    pub times: usize,

    /// RNG seed
    #[arg(long, default_value = "0")]
    pub seed: u64,

    /// Render digit runs as ascending zero-padded integers from this base
    #[arg(long)]
    pub sequential_from: Option<u64>,
}
