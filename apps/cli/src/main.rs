use std::{fs, path::PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use indicatif::ProgressBar;
use notion_blocks::{build_outline, parse_outline, Block, Icon};
use notion_client::{ClientError, NotionClient, PageDraft, Parent};
use output::{OutputFormat, Renderer};
use progress::spinner;
use settings::Settings;
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

mod demo;
mod settings;

#[derive(Debug, Parser, Clone)]
#[command(
    name = "notion-blocks",
    version,
    about = "Build Notion content blocks and publish them as pages from the shell."
)]
struct Cli {
    /// Preferred renderer for command output.
    #[arg(long, global = true, value_enum, default_value = "json")]
    format: OutputFormat,
    /// Settings file (TOML, JSON or YAML); defaults to ./notion-blocks.* when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Disable ANSI colors in CLI output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Suppress non-critical CLI output.
    #[arg(long, global = true)]
    quiet: bool,
    /// Disable progress indicators for network calls.
    #[arg(long, global = true)]
    no_progress: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand, Clone)]
enum Command {
    /// Build blocks from an outline and print them in API format.
    Render {
        /// Outline expressed as JSON (`[{"type": "divider"}]`) or @path to a JSON file.
        outline: String,
    },
    /// Create a page whose content is built from an outline.
    CreatePage {
        #[arg(long)]
        title: String,
        /// Id of the parent page or database (not needed for workspace parents).
        #[arg(long)]
        parent: Option<String>,
        /// One of page_id, database_id or workspace.
        #[arg(long, default_value = "page_id")]
        parent_type: String,
        /// Outline expressed as JSON or @path to a JSON file.
        #[arg(long)]
        outline: Option<String>,
        /// Emoji used as page icon.
        #[arg(long)]
        icon: Option<String>,
        /// Print the request body instead of sending it.
        #[arg(long)]
        dry_run: bool,
    },
    /// Append blocks built from an outline to an existing page or block.
    Append {
        #[arg(long)]
        block_id: String,
        /// Outline expressed as JSON or @path to a JSON file.
        outline: String,
        /// Print the blocks instead of sending them.
        #[arg(long)]
        dry_run: bool,
    },
    /// Build the sample balance page; creates it when a parent is given.
    Demo {
        #[arg(long)]
        parent: Option<String>,
        #[arg(long, default_value = "page_id")]
        parent_type: String,
    },
    /// Generate shell completion scripts.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    fn progress_enabled(&self) -> bool {
        !self.quiet && !self.no_progress
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli)?;

    if cli.no_color {
        std::env::set_var("NO_COLOR", "1");
    }

    let renderer = Renderer::new(cli.format);
    match &cli.command {
        Command::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(*shell, &mut command, "notion-blocks", &mut std::io::stdout());
            Ok(())
        }
        Command::Render { outline } => {
            let blocks = load_blocks(outline)?;
            if !cli.quiet {
                renderer.blocks(&blocks)?;
            }
            Ok(())
        }
        Command::CreatePage {
            title,
            parent,
            parent_type,
            outline,
            icon,
            dry_run,
        } => {
            let parent = resolve_parent(parent_type, parent.as_deref())?;
            let blocks = match outline {
                Some(raw) => load_blocks(raw)?,
                None => Vec::new(),
            };
            let mut draft = PageDraft::new(title.clone(), parent).with_children(blocks);
            if let Some(emoji) = icon {
                draft = draft.with_icon(Icon::Emoji {
                    emoji: emoji.clone(),
                });
            }
            handle_create_page(&cli, &renderer, &draft, *dry_run).await
        }
        Command::Append {
            block_id,
            outline,
            dry_run,
        } => {
            let blocks = load_blocks(outline)?;
            handle_append(&cli, &renderer, block_id, &blocks, *dry_run).await
        }
        Command::Demo {
            parent,
            parent_type,
        } => {
            let blocks = demo::balance_page_blocks().context("failed to build demo page")?;
            match parent {
                None => renderer.blocks(&blocks),
                Some(id) => {
                    let parent = resolve_parent(parent_type, Some(id.as_str()))?;
                    let draft =
                        PageDraft::new(demo::BALANCE_PAGE_TITLE, parent).with_children(blocks);
                    handle_create_page(&cli, &renderer, &draft, false).await
                }
            }
        }
    }
}

async fn handle_create_page(
    cli: &Cli,
    renderer: &Renderer,
    draft: &PageDraft,
    dry_run: bool,
) -> Result<()> {
    if dry_run {
        return renderer.request(&serde_json::to_value(draft.request_body())?);
    }

    let client = connect(cli)?;
    let spinner = spinner(
        cli.progress_enabled(),
        format!("Creating page `{}`...", draft.title),
    );
    match client.create_page(draft).await {
        Ok(page) => {
            finish_spinner(spinner, Some(format!("Page `{}` created", draft.title)));
            info!(
                target: "notion_blocks_cli",
                page_id = %page.id,
                blocks = draft.children.len(),
                "page created"
            );
            if !cli.quiet {
                renderer.created_page(&page)?;
            }
            Ok(())
        }
        Err(ClientError::PartialCreate { page, source }) => {
            finish_spinner(spinner, None);
            // The page exists; print it before failing.
            renderer.created_page(&page)?;
            Err(anyhow!(*source).context(format!(
                "page `{}` was created as {} but some blocks were not appended; \
                 use `append --block-id {}` for the rest",
                draft.title, page.id, page.id
            )))
        }
        Err(error) => {
            finish_spinner(spinner, None);
            Err(anyhow!(error).context(format!("failed to create page `{}`", draft.title)))
        }
    }
}

async fn handle_append(
    cli: &Cli,
    renderer: &Renderer,
    block_id: &str,
    blocks: &[Block],
    dry_run: bool,
) -> Result<()> {
    if dry_run {
        return renderer.blocks(blocks);
    }

    let client = connect(cli)?;
    let spinner = spinner(
        cli.progress_enabled(),
        format!("Appending {} blocks...", blocks.len()),
    );
    match client.append_blocks(block_id, blocks).await {
        Ok(ids) => {
            finish_spinner(spinner, Some(format!("Appended {} blocks", ids.len())));
            if !cli.quiet {
                renderer.appended(&ids)?;
            }
            Ok(())
        }
        Err(error) => {
            finish_spinner(spinner, None);
            Err(anyhow!(error).context(format!("failed to append blocks to `{block_id}`")))
        }
    }
}

fn connect(cli: &Cli) -> Result<NotionClient> {
    let settings = Settings::load(cli.config.as_deref())?;
    let config = settings.client_config()?;
    debug!(
        target: "notion_blocks_cli",
        base_url = %config.base_url,
        api_version = %config.api_version,
        "connecting to Notion"
    );
    NotionClient::with_config(config).context("failed to build Notion client")
}

fn resolve_parent(parent_type: &str, id: Option<&str>) -> Result<Parent> {
    match id {
        Some(id) => Ok(Parent::from_type(parent_type, id)?),
        None if parent_type == "workspace" => Ok(Parent::Workspace),
        None => bail!("--parent is required for parent type `{parent_type}`"),
    }
}

fn load_blocks(raw: &str) -> Result<Vec<Block>> {
    let contents = read_outline(raw)?;
    let specs = parse_outline(&contents).context("invalid outline")?;
    let blocks = build_outline(&specs).context("failed to build blocks from outline")?;
    debug!(target: "notion_blocks_cli", blocks = blocks.len(), "outline built");
    Ok(blocks)
}

fn read_outline(raw: &str) -> Result<String> {
    match raw.strip_prefix('@') {
        Some(path) => fs::read_to_string(path).with_context(|| format!("failed to read {path}")),
        None => Ok(raw.to_string()),
    }
}

fn init_tracing(cli: &Cli) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,notion_blocks_cli=info"));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .without_time()
        .with_ansi(!cli.no_color)
        .compact()
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow!("failed to initialize logging: {error}"))
}

fn finish_spinner(spinner: Option<ProgressBar>, message: Option<String>) {
    if let Some(progress) = spinner {
        if let Some(msg) = message {
            progress.finish_with_message(msg);
        } else {
            progress.finish_and_clear();
        }
    }
}

mod progress {
    use std::time::Duration;

    use indicatif::{ProgressBar, ProgressStyle};

    pub fn spinner(enabled: bool, message: impl Into<String>) -> Option<ProgressBar> {
        if !enabled {
            return None;
        }
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            bar.set_style(style);
        }
        bar.set_message(message.into());
        bar.enable_steady_tick(Duration::from_millis(100));
        Some(bar)
    }
}

mod output {
    use anyhow::Result;
    use clap::ValueEnum;
    use notion_blocks::Block;
    use notion_client::CreatedPage;
    use serde_json::{self, json, Value};

    #[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
    pub enum OutputFormat {
        Json,
        Text,
    }

    #[derive(Copy, Clone, Debug)]
    pub struct Renderer {
        format: OutputFormat,
    }

    impl Renderer {
        pub fn new(format: OutputFormat) -> Self {
            Self { format }
        }

        pub fn blocks(&self, blocks: &[Block]) -> Result<()> {
            match self.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(blocks)?);
                }
                OutputFormat::Text => {
                    let mut lines = Vec::new();
                    outline_lines(blocks, 0, &mut lines);
                    for line in lines {
                        println!("{line}");
                    }
                }
            }
            Ok(())
        }

        pub fn request(&self, body: &Value) -> Result<()> {
            match self.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(body)?);
                }
                OutputFormat::Text => {
                    println!("Parent: {}", body["parent"]);
                    let count = body["children"].as_array().map_or(0, Vec::len);
                    println!("Blocks: {count}");
                }
            }
            Ok(())
        }

        pub fn created_page(&self, page: &CreatedPage) -> Result<()> {
            match self.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(page)?);
                }
                OutputFormat::Text => {
                    println!("Page ID: {}", page.id);
                    if let Some(url) = &page.url {
                        println!("URL: {url}");
                    }
                }
            }
            Ok(())
        }

        pub fn appended(&self, ids: &[String]) -> Result<()> {
            match self.format {
                OutputFormat::Json => {
                    let payload = json!({ "count": ids.len(), "block_ids": ids });
                    println!("{}", serde_json::to_string_pretty(&payload)?);
                }
                OutputFormat::Text => {
                    println!("Appended {} blocks", ids.len());
                    for id in ids {
                        println!("• {id}");
                    }
                }
            }
            Ok(())
        }
    }

    /// One line per block, children indented under their toggle.
    pub fn outline_lines(blocks: &[Block], depth: usize, lines: &mut Vec<String>) {
        for block in blocks {
            let indent = "  ".repeat(depth);
            let text = block.plain_text();
            if text.is_empty() {
                lines.push(format!("{indent}{}", block.kind()));
            } else {
                lines.push(format!("{indent}{}: {text}", block.kind()));
            }
            outline_lines(block.children(), depth + 1, lines);
        }
    }
}
