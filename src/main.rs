use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tagwise::host::{LocalHost, MessageHandler, run_bridge};
use tagwise::{
    Database, DocumentId, EnvSettings, Reconciliation, Settings, TagCatalog, TagReconciler,
    TagSuggester, TagSuggestion,
};
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

/// tagwise - LLM tag suggestions for your notes
#[derive(Parser)]
#[command(name = "tagwise")]
#[command(about = "Suggest tags for a document with an LLM and apply them to a local catalog")]
#[command(version)]
struct Cli {
    /// Path to the tag catalog (defaults to the platform data directory)
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Suggest tags for a piece of text
    Suggest(SuggestCommand),
    /// Apply tags to a document in the catalog
    Apply(ApplyCommand),
    /// List the tags linked to a document
    Tags(TagsCommand),
    /// Serve the panel protocol as JSON lines on stdin/stdout
    Bridge(BridgeCommand),
}

#[derive(Parser)]
struct SuggestCommand {
    /// Text to tag; read from stdin when neither this nor --file is given
    #[arg(value_name = "TEXT", conflicts_with = "file")]
    text: Option<String>,

    /// Read the text from a file
    #[arg(short, long, value_name = "PATH")]
    file: Option<PathBuf>,
}

#[derive(Parser)]
struct ApplyCommand {
    /// Document to tag
    #[arg(short, long, value_name = "ID")]
    document: String,

    /// Comma-separated tags to apply
    #[arg(short, long, value_name = "TAGS")]
    tags: String,
}

#[derive(Parser)]
struct TagsCommand {
    /// Document whose tags are listed
    #[arg(short, long, value_name = "ID")]
    document: String,
}

#[derive(Parser)]
struct BridgeCommand {
    /// Document treated as the current selection
    #[arg(short, long, value_name = "ID")]
    document: Option<String>,
}

/// Errors caused by the user's input rather than by tagwise itself.
#[derive(Debug, thiserror::Error)]
enum UserError {
    #[error("{0}")]
    SuggestionFailed(String),
    #[error("Document id cannot be empty")]
    EmptyDocumentId,
    #[error("No tags were applied to document {0}")]
    NothingApplied(String),
}

fn main() {
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();

    let result = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
        .and_then(|runtime| runtime.block_on(run(cli)));

    if let Err(e) = result {
        let exit_code = if is_user_error(&e) { 1 } else { 2 };
        eprintln!("Error: {e:#}");
        std::process::exit(exit_code);
    }
}

/// Logs go to stderr so stdout carries only JSON and command output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn is_user_error(error: &anyhow::Error) -> bool {
    error.downcast_ref::<UserError>().is_some()
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Suggest(cmd) => handle_suggest(&cmd).await,
        Commands::Apply(cmd) => {
            let db = open_database(cli.db.as_deref())?;
            let report = execute_apply(&cmd.document, &cmd.tags, Arc::new(db)).await?;
            let titles: Vec<&str> = report.linked.iter().map(|t| t.title()).collect();
            println!("Applied tags to {}: {}", cmd.document, titles.join(", "));
            Ok(())
        }
        Commands::Tags(cmd) => {
            let db = open_database(cli.db.as_deref())?;
            for title in execute_tags(&cmd.document, &db).await? {
                println!("{title}");
            }
            Ok(())
        }
        Commands::Bridge(cmd) => {
            let db = Arc::new(open_database(cli.db.as_deref())?);
            handle_bridge(cmd.document, db).await
        }
    }
}

async fn handle_suggest(cmd: &SuggestCommand) -> Result<()> {
    let text = read_suggest_text(cmd, tokio::io::stdin()).await?;

    let suggester = TagSuggester::from_env().context("Failed to configure LLM clients")?;
    let suggestion = suggester.suggest(&text, &Settings::from_env()).await;
    println!("{}", serde_json::to_string(&suggestion)?);

    match suggestion {
        TagSuggestion::Error { error } => Err(UserError::SuggestionFailed(error).into()),
        TagSuggestion::Tags { .. } => Ok(()),
    }
}

/// Picks the text argument, then the file, then `stdin`.
async fn read_suggest_text<R>(cmd: &SuggestCommand, mut stdin: R) -> Result<String>
where
    R: tokio::io::AsyncRead + Unpin,
{
    match (&cmd.text, &cmd.file) {
        (Some(text), _) => Ok(text.clone()),
        (None, Some(path)) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display())),
        (None, None) => {
            let mut text = String::new();
            stdin
                .read_to_string(&mut text)
                .await
                .context("Failed to read text from stdin")?;
            Ok(text)
        }
    }
}

/// Applies comma-separated tags to a document.
///
/// Separated from the command so it can run against an in-memory database.
async fn execute_apply(
    document: &str,
    tags: &str,
    catalog: Arc<dyn TagCatalog>,
) -> Result<Reconciliation> {
    let document_id = parse_document_id(document)?;
    let reconciler = TagReconciler::new(catalog);
    let report = reconciler.apply(Some(&document_id), &parse_tags(tags)).await;

    if report.is_empty() {
        return Err(UserError::NothingApplied(document_id.to_string()).into());
    }
    for tag in &report.failed {
        eprintln!("Warning: could not apply tag '{tag}'");
    }
    Ok(report)
}

async fn execute_tags(document: &str, catalog: &dyn TagCatalog) -> Result<Vec<String>> {
    let document_id = parse_document_id(document)?;
    let tags = catalog.document_tags(&document_id).await?;
    Ok(tags.into_iter().map(|t| t.title().to_string()).collect())
}

async fn handle_bridge(document: Option<String>, db: Arc<Database>) -> Result<()> {
    let document = document.map(DocumentId::new).filter(|id| !id.is_blank());
    let host = Arc::new(LocalHost::new(db.clone(), document, std::io::stdout()));
    let suggester = TagSuggester::from_env().context("Failed to configure LLM clients")?;
    let handler = MessageHandler::new(host.clone(), db, Arc::new(EnvSettings), suggester);

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    run_bridge(&handler, &*host, stdin).await
}

fn parse_document_id(raw: &str) -> Result<DocumentId> {
    let id = DocumentId::new(raw.trim());
    if id.is_blank() {
        return Err(UserError::EmptyDocumentId.into());
    }
    Ok(id)
}

fn open_database(explicit: Option<&Path>) -> Result<Database> {
    let db_path = match explicit {
        Some(path) => path.to_path_buf(),
        None => get_database_path()?,
    };
    ensure_database_directory(&db_path)?;
    Database::open(&db_path).context("Failed to open tag catalog")
}

/// Gets the cross-platform catalog path.
///
/// Returns the path as `{data_dir}/tagwise/catalog.db` where `data_dir` is:
/// - Linux: `~/.local/share`
/// - macOS: `~/Library/Application Support`
/// - Windows: `C:\Users\<user>\AppData\Roaming`
fn get_database_path() -> Result<PathBuf> {
    let data_dir =
        dirs::data_dir().ok_or_else(|| anyhow::anyhow!("Failed to determine data directory"))?;

    Ok(data_dir.join("tagwise").join("catalog.db"))
}

fn ensure_database_directory(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create catalog directory: {}", parent.display())
        })?;
    }
    Ok(())
}

/// Splits on commas and drops blank entries. Case folding is left to the
/// reconciler.
fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
