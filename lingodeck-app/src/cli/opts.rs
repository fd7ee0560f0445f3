use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[command(name = "lingodeck", version, about = "LingoDeck spaced-repetition flashcards")]
pub struct Cli {
    /// Card store file (defaults to the app data dir)
    #[arg(long, env = "LINGODECK_DATA_FILE", global = true)]
    pub data_file: Option<PathBuf>,

    /// Number of timestamped backups to keep
    #[arg(long, env = "LINGODECK_MAX_BACKUPS", default_value_t = 10, global = true)]
    pub max_backups: usize,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Card operations
    #[command(subcommand)]
    Card(CardCmd),
    /// Grade one card (0-5)
    Practice(PracticeCmd),
    /// Interactive review of due cards
    Review(ReviewCmd),
}

#[derive(Debug, Subcommand, Clone)]
pub enum CardCmd {
    Add(CardAdd),
    List(CardList),
    Show { card_id: String },
    Edit(CardEdit),
    Rm { card_id: String },
}

#[derive(Debug, Args, Clone)]
pub struct ImageArgs {
    /// Image file name
    #[arg(long)]
    pub image: Option<String>,
    /// Public URL of the image backup
    #[arg(long, requires = "image")]
    pub image_url: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct CardAdd {
    #[arg(long)]
    pub front: String,
    #[arg(long)]
    pub back: String,
    #[arg(long)]
    pub language: String,
    #[command(flatten)]
    pub image: ImageArgs,
}

#[derive(Debug, Args, Clone)]
pub struct CardList {
    #[arg(long)]
    pub language: Option<String>,
    #[arg(long)]
    pub limit: Option<u32>,
    #[arg(long)]
    pub page: Option<u32>,
}

#[derive(Debug, Args, Clone)]
pub struct CardEdit {
    pub card_id: String,
    #[arg(long)]
    pub front: Option<String>,
    #[arg(long)]
    pub back: Option<String>,
    #[arg(long)]
    pub language: Option<String>,
    #[command(flatten)]
    pub image: ImageArgs,
    #[arg(long, conflicts_with = "image")]
    pub clear_image: bool,
}

#[derive(Debug, Args, Clone)]
pub struct PracticeCmd {
    pub card_id: String,
    #[arg(allow_negative_numbers = true)]
    pub grade: i64,
}

#[derive(Debug, Args, Clone)]
pub struct ReviewCmd {
    #[arg(long, default_value_t = 50)]
    pub max: usize,
}
