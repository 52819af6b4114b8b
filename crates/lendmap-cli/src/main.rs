use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use lendmap_lib::{
    find_nearby, Book, Coordinate, ReadingRecord, ReadingStatus, RecordStore, SqliteStore,
    DEFAULT_RADIUS_KM,
};

#[derive(Parser, Debug)]
#[command(version, about = "Lendmap book-lending utilities")]
struct Cli {
    /// Path to the SQLite record store (created if missing).
    #[arg(long, default_value = "lendmap.db")]
    db: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find other users' lendable books near a coordinate.
    Nearby {
        /// Requester identity; own records are excluded from the results.
        #[arg(long, default_value = "")]
        user: String,
        /// Origin latitude in degrees.
        #[arg(long)]
        lat: f64,
        /// Origin longitude in degrees.
        #[arg(long)]
        lon: f64,
        /// Discovery radius in kilometres.
        #[arg(long, default_value_t = DEFAULT_RADIUS_KM)]
        radius: f64,
    },
    /// Register a book in the catalog, optionally creating the owner's
    /// reading record in the same step.
    AddBook {
        #[arg(long)]
        isbn: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        #[arg(long)]
        publisher: String,
        /// Publication year.
        #[arg(long)]
        year: String,
        #[arg(long)]
        cover_url: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Owner to create a reading record for (needs --lat and --lon).
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        lat: Option<f64>,
        #[arg(long)]
        lon: Option<f64>,
        /// Initial reading status; defaults to not-reading until the owner
        /// starts the book.
        #[arg(long, default_value = "not-reading")]
        status: ReadingStatus,
    },
    /// Update the status of an existing reading record.
    SetStatus {
        #[arg(long)]
        user: String,
        #[arg(long)]
        isbn: String,
        /// One of: reading, not-reading, to-lend, lent.
        #[arg(long)]
        status: ReadingStatus,
    },
    /// Delete a reading record.
    RemoveReading {
        #[arg(long)]
        user: String,
        #[arg(long)]
        isbn: String,
    },
    /// List a user's reading records joined with the book catalog.
    Library {
        #[arg(long)]
        user: String,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let store = open_store(&cli.db)?;

    match cli.command {
        Command::Nearby {
            user,
            lat,
            lon,
            radius,
        } => handle_nearby(&store, &user, lat, lon, radius),
        Command::AddBook {
            isbn,
            title,
            author,
            publisher,
            year,
            cover_url,
            description,
            user,
            lat,
            lon,
            status,
        } => {
            let book = Book {
                isbn,
                title,
                author,
                publisher,
                published_year: year,
                cover_url,
                description,
            };
            handle_add_book(&store, &book, user.as_deref(), lat, lon, status)
        }
        Command::SetStatus { user, isbn, status } => handle_set_status(&store, &user, &isbn, status),
        Command::RemoveReading { user, isbn } => handle_remove_reading(&store, &user, &isbn),
        Command::Library { user } => handle_library(&store, &user),
    }
}

fn open_store(path: &Path) -> Result<SqliteStore> {
    SqliteStore::open(path)
        .with_context(|| format!("failed to open record store at {}", path.display()))
}

fn handle_nearby(store: &SqliteStore, user: &str, lat: f64, lon: f64, radius: f64) -> Result<()> {
    let origin = Coordinate::new(lat, lon).context("invalid origin coordinate")?;
    let nearby =
        find_nearby(store, origin, user, radius).context("could not check for nearby books")?;

    if nearby.is_empty() {
        println!("No books within {:.1} km.", radius);
        return Ok(());
    }

    println!("{} book(s) within {:.1} km:", nearby.len(), radius);
    for book in nearby {
        println!(
            "- {} by {} ({}, {}) [{}] owner: {} isbn: {}",
            book.title,
            book.author,
            book.publisher,
            book.published_year,
            book.status,
            book.owner,
            book.isbn
        );
    }
    Ok(())
}

fn handle_add_book(
    store: &SqliteStore,
    book: &Book,
    user: Option<&str>,
    lat: Option<f64>,
    lon: Option<f64>,
    status: ReadingStatus,
) -> Result<()> {
    if store.register_book(book).context("failed to register book")? {
        println!("Registered {} ({})", book.title, book.isbn);
    } else {
        println!("Book {} already registered; catalog left unchanged.", book.isbn);
    }

    let Some(owner) = user else {
        return Ok(());
    };
    let (Some(lat), Some(lon)) = (lat, lon) else {
        bail!("--user requires --lat and --lon to place the reading record");
    };
    // Validate before storing; records are persisted as the strings clients
    // would have sent.
    Coordinate::new(lat, lon).context("invalid reading record coordinate")?;
    let record = ReadingRecord {
        owner: owner.to_string(),
        isbn: book.isbn.clone(),
        status,
        latitude: lat.to_string(),
        longitude: lon.to_string(),
    };
    store
        .upsert_reading(&record)
        .context("failed to save reading record")?;
    println!("Saved reading record for {} ({})", owner, record.status);
    Ok(())
}

fn handle_set_status(
    store: &SqliteStore,
    user: &str,
    isbn: &str,
    status: ReadingStatus,
) -> Result<()> {
    if store
        .set_reading_status(user, isbn, status)
        .context("failed to update reading status")?
    {
        println!("Status for {}/{} set to {}", user, isbn, status);
        Ok(())
    } else {
        bail!("no reading record for {}/{}", user, isbn);
    }
}

fn handle_remove_reading(store: &SqliteStore, user: &str, isbn: &str) -> Result<()> {
    if store
        .remove_reading(user, isbn)
        .context("failed to remove reading record")?
    {
        println!("Removed reading record {}/{}", user, isbn);
        Ok(())
    } else {
        bail!("no reading record for {}/{}", user, isbn);
    }
}

fn handle_library(store: &SqliteStore, user: &str) -> Result<()> {
    let records = store
        .readings_for(user)
        .context("failed to list reading records")?;
    if records.is_empty() {
        println!("No books in {}'s library.", user);
        return Ok(());
    }

    let isbns: Vec<&str> = records.iter().map(|record| record.isbn.as_str()).collect();
    let books = store
        .books_by_isbns(&isbns)
        .context("failed to resolve books")?;

    println!("{} book(s) in {}'s library:", records.len(), user);
    for record in records {
        match books.get(&record.isbn) {
            Some(book) => println!(
                "- {} by {} [{}] isbn: {}",
                book.title, book.author, record.status, record.isbn
            ),
            None => println!("- <uncataloged> [{}] isbn: {}", record.status, record.isbn),
        }
    }
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
