use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "feeplus")]
#[command(about = "Keep a shop's cart transform and fee variant in a consistent state")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a TOML config file (defaults to feeplus.toml)
    #[arg(short, long, global = true, env = "FEEPLUS_CONFIG")]
    pub config: Option<String>,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Report whether the cart transform is registered
    Health,
    /// Register the cart transform if missing, then check again
    Repair,
    /// Register the cart transform (idempotent)
    Ensure,
    /// Manage the fee product and variant
    Fee(FeeArgs),
    /// Work with percentage fee rules
    Rules(RulesArgs),
    /// Inspect the effective configuration
    Config(ConfigArgs),
}

#[derive(clap::Args)]
pub struct FeeArgs {
    #[command(subcommand)]
    pub command: FeeCommands,
}

#[derive(Subcommand)]
pub enum FeeCommands {
    /// Show the saved fee variant and whether it still exists
    Status,
    /// Create the fee product, variant and pointers
    Create(FeeCreateArgs),
    /// Reprice an existing fee variant
    Update(FeeUpdateArgs),
    /// Remove the saved fee variant pointers
    Clear,
}

#[derive(clap::Args)]
pub struct FeeCreateArgs {
    /// Product title (defaults to fee.title)
    #[arg(long)]
    pub title: Option<String>,
    /// Variant label (defaults to fee.label)
    #[arg(long)]
    pub label: Option<String>,
    /// Variant price (defaults to fee.price)
    #[arg(long)]
    pub price: Option<String>,
}

#[derive(clap::Args)]
pub struct FeeUpdateArgs {
    /// Variant GID or numeric id
    pub variant_id: String,
    /// New price
    #[arg(long)]
    pub price: String,
    /// New label to save alongside the pointer
    #[arg(long)]
    pub label: Option<String>,
}

#[derive(clap::Args)]
pub struct RulesArgs {
    #[command(subcommand)]
    pub command: RulesCommands,
}

#[derive(Subcommand)]
pub enum RulesCommands {
    /// Evaluate rules against sample subtotals
    Preview(RulesPreviewArgs),
}

#[derive(clap::Args)]
pub struct RulesPreviewArgs {
    /// Rules file, one MIN-MAX=PERCENT% per line (reads from stdin if omitted)
    #[arg(long)]
    pub file: Option<String>,
    /// Subtotal to evaluate; may be repeated
    #[arg(long = "subtotal", required = true)]
    pub subtotals: Vec<f64>,
}

#[derive(clap::Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the merged config with secrets masked
    Show,
}
