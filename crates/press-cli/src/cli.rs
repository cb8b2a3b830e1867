use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "press",
    about = "press: publish a markdown blog by committing to a GitHub repository",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML configuration file; environment variables override it
    #[arg(long, global = true, env = "PRESS_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// List published articles
    List(ListArgs),
    /// Print one article
    Show(ShowArgs),
    /// Publish a new article
    Create(CreateArgs),
    /// Rewrite an existing article
    Update(UpdateArgs),
    /// Delete an article and its images
    Delete(DeleteArgs),
    /// Print the slug a title would get
    Slug(SlugArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// Overrides `bind_addr` and PRESS_BIND
    #[arg(long)]
    pub bind: Option<String>,
}

#[derive(Args)]
pub struct ListArgs {
    /// Only this category (case-insensitive)
    #[arg(long)]
    pub category: Option<String>,
}

#[derive(Args)]
pub struct ShowArgs {
    pub slug: String,
    /// Print only the markdown body
    #[arg(long)]
    pub body_only: bool,
}

/// Fields shared by `create` and `update`.
#[derive(Args)]
pub struct ArticleArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub category: String,
    /// Markdown file; `{{image:N}}` refers to the N-th `--image`
    #[arg(long)]
    pub body_file: PathBuf,
    /// Image to upload (repeatable)
    #[arg(long = "image")]
    pub images: Vec<PathBuf>,
}

#[derive(Args)]
pub struct CreateArgs {
    #[command(flatten)]
    pub article: ArticleArgs,
}

#[derive(Args)]
pub struct UpdateArgs {
    pub slug: String,
    #[command(flatten)]
    pub article: ArticleArgs,
}

#[derive(Args)]
pub struct DeleteArgs {
    pub slug: String,
    /// Do not ask for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct SlugArgs {
    #[arg(required = true, num_args = 1..)]
    pub title: Vec<String>,
}
