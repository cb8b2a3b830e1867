use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{bail, Context};
use colored::Colorize;
use press_article::{slugify, ArticleDocument, ArticleSummary};
use press_publish::{ArticleInput, PublishReceipt, Publisher};
use press_server::{PressServer, ServerConfig};
use press_store::GitHubStore;
use serde::Serialize;

use crate::cli::*;
use crate::markers::{expand_markers, load_images};

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    if let Command::Slug(args) = &cli.command {
        return cmd_slug(args, cli.format);
    }
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;
    runtime.block_on(run_async(cli))
}

async fn run_async(cli: Cli) -> anyhow::Result<()> {
    let config = ServerConfig::load(cli.config.as_deref())?;
    let format = cli.format;
    match cli.command {
        Command::Serve(args) => cmd_serve(config, args).await,
        Command::List(args) => cmd_list(&publisher(&config)?, args, format).await,
        Command::Show(args) => cmd_show(&publisher(&config)?, args, format).await,
        Command::Create(args) => cmd_create(&publisher(&config)?, args, format).await,
        Command::Update(args) => cmd_update(&publisher(&config)?, args, format).await,
        Command::Delete(args) => cmd_delete(&publisher(&config)?, args, format).await,
        Command::Slug(args) => cmd_slug(&args, format),
    }
}

fn publisher(config: &ServerConfig) -> anyhow::Result<Publisher> {
    config.validate_content_store()?;
    tracing::debug!(
        owner = %config.github.owner,
        repo = %config.github.repo,
        branch = %config.github.branch,
        "using remote content store"
    );
    let store = GitHubStore::with_options(config.remote_config(), config.github_options())?;
    Ok(Publisher::new(Arc::new(store)))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn cmd_serve(mut config: ServerConfig, args: ServeArgs) -> anyhow::Result<()> {
    if let Some(bind) = args.bind {
        config.bind_addr = bind
            .parse()
            .with_context(|| format!("invalid --bind address {bind:?}"))?;
    }
    let server = PressServer::new(config)?;
    println!(
        "{} press serving {}/{} on {}",
        "✓".green().bold(),
        server.config().github.owner.bold(),
        server.config().github.repo.bold(),
        server.config().bind_addr.to_string().cyan()
    );
    server.serve().await?;
    Ok(())
}

async fn cmd_list(publisher: &Publisher, args: ListArgs, format: OutputFormat) -> anyhow::Result<()> {
    let mut summaries = publisher.list().await?;
    if let Some(category) = &args.category {
        let wanted = category.trim().to_lowercase();
        summaries.retain(|s| s.category.to_lowercase() == wanted);
    }
    if format == OutputFormat::Json {
        return print_json(&summaries);
    }
    if summaries.is_empty() {
        println!("No articles.");
        return Ok(());
    }
    let mut current: Option<&str> = None;
    for summary in &summaries {
        if current != Some(summary.category.as_str()) {
            println!("{}", summary.category.yellow().bold());
            current = Some(summary.category.as_str());
        }
        print_summary(summary);
    }
    Ok(())
}

fn print_summary(summary: &ArticleSummary) {
    let date = if summary.date.is_empty() {
        "undated".dimmed().to_string()
    } else {
        summary.date.dimmed().to_string()
    };
    println!("  {}  {}  {}", date, summary.slug.cyan(), summary.title);
}

async fn cmd_show(publisher: &Publisher, args: ShowArgs, format: OutputFormat) -> anyhow::Result<()> {
    let Some(doc) = publisher.read(&args.slug).await? else {
        bail!("article not found: {}", args.slug);
    };
    if format == OutputFormat::Json {
        return print_json(&doc);
    }
    if args.body_only {
        print!("{}", doc.body);
        return Ok(());
    }
    print_document(&doc);
    Ok(())
}

fn print_document(doc: &ArticleDocument) {
    println!("{}", doc.title.bold());
    println!(
        "{} · {} · {}",
        doc.category.yellow(),
        doc.date.dimmed(),
        press_types::article_path(&doc.slug).cyan()
    );
    println!();
    print!("{}", doc.body);
}

/// Body text plus images from the command line, ready to publish.
fn prepare(args: &ArticleArgs) -> anyhow::Result<(ArticleInput, press_images::PendingEdit)> {
    let raw = std::fs::read_to_string(&args.body_file)
        .with_context(|| format!("reading {}", args.body_file.display()))?;
    let (placeholders, edit) = load_images(&args.images)?;
    let expanded = expand_markers(&raw, &placeholders);
    for position in &expanded.unreferenced {
        eprintln!(
            "{} image {} ({}) is not referenced by {{{{image:{}}}}} and will not be uploaded",
            "warning:".yellow().bold(),
            position,
            args.images[position - 1].display(),
            position
        );
    }
    if expanded.unknown_markers > 0 {
        eprintln!(
            "{} {} image marker(s) do not match any --image and are left as is",
            "warning:".yellow().bold(),
            expanded.unknown_markers
        );
    }
    let input = ArticleInput::new(args.title.as_str(), args.category.as_str(), expanded.body);
    Ok((input, edit))
}

fn print_receipt(verb: &str, receipt: &PublishReceipt, format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        return print_json(receipt);
    }
    println!("{} {} {}", "✓".green().bold(), verb, receipt.slug.to_string().cyan().bold());
    println!("  Path: {}", receipt.path);
    println!("  Commit: {}", receipt.commit.short().yellow());
    println!(
        "  Files: {} written, {} deleted",
        receipt.files_written, receipt.files_deleted
    );
    Ok(())
}

async fn cmd_create(publisher: &Publisher, args: CreateArgs, format: OutputFormat) -> anyhow::Result<()> {
    let (input, edit) = prepare(&args.article)?;
    let receipt = publisher.create(input, &edit).await?;
    print_receipt("Published", &receipt, format)
}

async fn cmd_update(publisher: &Publisher, args: UpdateArgs, format: OutputFormat) -> anyhow::Result<()> {
    let (input, edit) = prepare(&args.article)?;
    let receipt = publisher.update(&args.slug, input, &edit).await?;
    print_receipt("Updated", &receipt, format)
}

async fn cmd_delete(publisher: &Publisher, args: DeleteArgs, format: OutputFormat) -> anyhow::Result<()> {
    if !args.yes && !confirm(&format!("Delete article {} and all of its images?", args.slug))? {
        println!("Aborted.");
        return Ok(());
    }
    let receipt = publisher.delete(&args.slug).await?;
    print_receipt("Deleted", &receipt, format)
}

fn confirm(question: &str) -> anyhow::Result<bool> {
    print!("{question} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn cmd_slug(args: &SlugArgs, format: OutputFormat) -> anyhow::Result<()> {
    let title = args.title.join(" ");
    let slug = slugify(&title);
    if slug.is_empty() {
        bail!("unable to derive a valid slug from title {title:?}");
    }
    if format == OutputFormat::Json {
        return print_json(&serde_json::json!({ "title": title, "slug": slug }));
    }
    println!("{slug}");
    Ok(())
}
