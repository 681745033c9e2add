use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use signkit::{
    init_logging, AlwaysConfirm, Config, DocumentId, DraftPayload, HttpBackend, SettingsPersistence,
    SigningBackend, SigningWorkspace, SubmitConfirmation, WorkspaceContext, BUILD_DATE, VERSION,
};

#[derive(Parser, Debug)]
#[command(name = "signkit", version, about = "Place annotations on PDF documents and submit them for signing")]
struct Cli {
    /// Config file (.toml or .json); defaults to the platform config path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show document status, page count and draft summary
    Status { document: String },
    /// Print the stored draft as JSON
    Draft { document: String },
    /// Store a layout file as the draft
    Save { document: String, layout: PathBuf },
    /// Submit a layout file; this cannot be undone
    Submit {
        document: String,
        layout: PathBuf,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Print the effective configuration
    Config,
}

fn load_config(path: Option<&Path>) -> anyhow::Result<(Config, PathBuf)> {
    let persistence = match path {
        Some(path) => SettingsPersistence::new(path),
        None => SettingsPersistence::at_default_path()?,
    };
    let mut config = persistence
        .load_or_default()
        .with_context(|| format!("loading {}", persistence.path().display()))?;
    config.apply_env();
    config.validate()?;
    Ok((config, persistence.path().to_path_buf()))
}

fn context(config: &Config, backend: Arc<dyn SigningBackend>) -> WorkspaceContext {
    let mut context = WorkspaceContext::new(backend);
    context.editor = config.editor.clone();
    context.capture = config.capture.clone();
    context.full_name = config.signer.full_name.clone();
    context
}

fn read_layout(path: &Path) -> anyhow::Result<DraftPayload> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading layout {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing layout {}", path.display()))
}

/// Terminal prompt; anything but `y`/`yes` declines.
struct PromptConfirmation;

impl SubmitConfirmation for PromptConfirmation {
    fn confirm(&self, document_id: &DocumentId, annotations: usize) -> bool {
        print!(
            "Submit {} annotation(s) for document {}? This cannot be undone. [y/N] ",
            annotations, document_id
        );
        if std::io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

async fn open(config: &Config, backend: Arc<dyn SigningBackend>, document: &str) -> anyhow::Result<SigningWorkspace> {
    SigningWorkspace::open(context(config, backend), DocumentId::from(document))
        .await
        .with_context(|| format!("opening document {}", document))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging()?;
    tracing::debug!("signkit {} (built {})", VERSION, BUILD_DATE);

    let (config, config_path) = load_config(cli.config.as_deref())?;
    let backend: Arc<dyn SigningBackend> = Arc::new(HttpBackend::new(config.http_settings()));

    match cli.command {
        Command::Config => {
            println!("# {}", config_path.display());
            print!("{}", toml::to_string_pretty(&config)?);
        }
        Command::Status { document } => {
            let workspace = open(&config, backend, &document).await?;
            let metadata = workspace.metadata();
            println!("Document:    {}", workspace.document_id());
            if let Some(title) = &metadata.title {
                println!("Title:       {}", title);
            }
            println!("Status:      {}", workspace.status());
            if let Some(recipient) = metadata.recipient_status {
                println!("Recipient:   {}", recipient);
            }
            println!("Read-only:   {}", workspace.is_read_only());
            println!("Pages:       {}", workspace.info().page_count);
            println!("Annotations: {}", workspace.session().annotations().len());
            if let Some(note) = workspace.revision_note() {
                println!("Revision:    {}", note);
            }
            for missing in workspace.unresolved_assets() {
                println!("Missing:     {}", missing.path);
            }
        }
        Command::Draft { document } => {
            let id = DocumentId::from(document.as_str());
            match backend.load_draft(&id).await? {
                Some(draft) => println!("{}", serde_json::to_string_pretty(&draft)?),
                None => println!("No draft stored for {}", id),
            }
        }
        Command::Save { document, layout } => {
            let layout = read_layout(&layout)?;
            let mut workspace = open(&config, backend, &document).await?;
            workspace.apply_layout(layout)?;
            workspace.save_draft().await?;
            println!(
                "Draft saved ({} annotation(s))",
                workspace.session().annotations().len()
            );
        }
        Command::Submit { document, layout, yes } => {
            let layout = read_layout(&layout)?;
            let mut workspace = open(&config, backend, &document).await?;
            if workspace.is_read_only() {
                bail!(
                    "document {} is {} and can no longer be changed",
                    document,
                    workspace.status()
                );
            }
            workspace.apply_layout(layout)?;
            let result = if yes {
                workspace.submit(&AlwaysConfirm).await
            } else {
                workspace.submit(&PromptConfirmation).await
            };
            match result {
                Ok(()) => println!("Submitted; document is now {}", workspace.status()),
                Err(signkit::SyncError::NotConfirmed) => println!("Submit cancelled"),
                Err(e) => return Err(e.into()),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_submit_flags() {
        let cli = Cli::parse_from(["signkit", "submit", "42", "layout.json", "--yes"]);
        match cli.command {
            Command::Submit { document, yes, .. } => {
                assert_eq!(document, "42");
                assert!(yes);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
