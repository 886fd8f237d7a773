use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use bookshelf_cli::{filter, form, render, BookForm, BookshelfClient};
use clap::{Args, Parser, Subcommand};
use render::View;

#[derive(Parser)]
#[command(name = "bookshelf")]
#[command(about = "Manage a Bookshelf book collection from the terminal", version)]
struct Cli {
    /// Base URL of the Bookshelf API
    #[arg(
        long,
        global = true,
        env = "BOOKSHELF_API_URL",
        default_value = "http://localhost:5555"
    )]
    server: String,

    /// Log requests to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List books, optionally filtered
    List {
        /// Case-insensitive match on title, author or description
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long, value_enum, default_value_t = View::Table)]
        view: View,
    },
    /// Show one book
    Show { id: String },
    /// Create a book
    Create(BookFields),
    /// Replace a book, keeping any field not given
    Edit {
        id: String,
        #[command(flatten)]
        fields: BookFields,
    },
    /// Delete a book
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Upload a cover image and print its URL
    UploadImage { path: PathBuf },
}

#[derive(Args)]
struct BookFields {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    author: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long = "year")]
    publish_year: Option<String>,
    #[arg(long, conflicts_with = "image_file")]
    image_url: Option<String>,
    /// Local image to upload and attach as the cover
    #[arg(long)]
    image_file: Option<PathBuf>,
    #[arg(long)]
    link: Option<String>,
}

impl BookFields {
    fn overlay(&self, form: &mut BookForm) {
        let pairs = [
            (&mut form.title, &self.title),
            (&mut form.author, &self.author),
            (&mut form.description, &self.description),
            (&mut form.publish_year, &self.publish_year),
            (&mut form.image_url, &self.image_url),
            (&mut form.link, &self.link),
        ];
        for (slot, value) in pairs {
            if let Some(value) = value {
                slot.clone_from(value);
            }
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "bookshelf_cli=debug,info" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn current_year() -> i32 {
    time::OffsetDateTime::now_utc().year()
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let client = BookshelfClient::new(&cli.server)?;
    tracing::debug!(server = %client.base_url(), "using API");

    match cli.command {
        Command::List { search, view } => {
            let books = client.list_books().await.context("failed to fetch books")?;
            let term = search.as_deref().unwrap_or_default();
            let shown = filter::filter_books(&books, term);

            if shown.is_empty() {
                println!("No books found");
            } else {
                match view {
                    View::Table => print!("{}", render::table(&shown)),
                    View::Card => print!("{}", render::cards(&shown)),
                }
            }
            println!("{}", render::summary(shown.len(), books.len(), search.as_deref()));
        }
        Command::Show { id } => {
            let book = client.get_book(&id).await?;
            print!("{}", render::detail(&book));
        }
        Command::Create(fields) => {
            let mut form = BookForm::default();
            fields.overlay(&mut form);
            let mut input = form.validate(current_year())?;
            if let Some(path) = &fields.image_file {
                input.image_url = upload(&client, path).await?;
            }

            let book = client.create_book(&input).await?;
            println!("Book created successfully");
            print!("{}", render::detail(&book));
        }
        Command::Edit { id, fields } => {
            let current = client.get_book(&id).await?;
            let mut form = BookForm::from_book(&current);
            fields.overlay(&mut form);
            let mut input = form.validate(current_year())?;
            if let Some(path) = &fields.image_file {
                input.image_url = upload(&client, path).await?;
            }

            let book = client.update_book(&id, &input).await?;
            println!("Book updated successfully");
            print!("{}", render::detail(&book));
        }
        Command::Delete { id, yes } => {
            if !yes && !confirm(&format!("Delete book {id}? This cannot be undone. [y/N] "))? {
                println!("Deletion cancelled");
                return Ok(());
            }
            let message = client.delete_book(&id).await?;
            println!("{message}");
        }
        Command::UploadImage { path } => {
            println!("{}", upload(&client, &path).await?);
        }
    }

    Ok(())
}

/// Size and type are checked locally before anything is sent
async fn upload(client: &BookshelfClient, path: &Path) -> anyhow::Result<String> {
    let (file_name, bytes) = form::read_image_file(path).await?;
    let url = client
        .upload_image(&file_name, bytes)
        .await
        .context("image upload failed")?;
    tracing::info!(%url, "image uploaded");
    Ok(url)
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    let mut stdout = io::stdout();
    write!(stdout, "{prompt}")?;
    stdout.flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
