//! Interactive terminal front-end for audioshelf.
//!
//! All search, aggregation and enrichment logic lives in
//! `audioshelf-core`; this binary only drives the search/select/play
//! loop and the external mpv process.

mod history;
mod logging;
mod player;

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use audioshelf_core::{
    fetch_details, load_sources_from_yaml, search_all, AudioItem, Audiobook, GoogleBooksClient,
    SourceRegistry, DEFAULT_SEARCH_TIMEOUT,
};
use history::PlaybackHistory;
use player::{MpvPlayer, PlayerStatus};

#[derive(Parser)]
#[command(name = "audioshelf", about = "Stream audiobooks from the web")]
struct Cli {
    /// Path to the sources file
    #[arg(long, default_value = "sources.yaml")]
    config: PathBuf,
    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.debug)?;

    let configs = load_sources_from_yaml(&cli.config);
    let registry = SourceRegistry::from_configs(&configs);
    if registry.is_empty() {
        // Distinct from a search coming back empty: nothing could ever
        // be found, so there is no point starting the loop.
        bail!(
            "no sources configured; list at least one in {}",
            cli.config.display()
        );
    }
    println!("Loaded {} source(s). Type a search, or 'q' to quit.", registry.len());

    let metadata = GoogleBooksClient::new(std::env::var("GOOGLE_BOOKS_API_KEY").ok()).ok();

    let history_path = PathBuf::from(history::HISTORY_FILE);
    let app = App {
        registry,
        metadata,
        history: PlaybackHistory::load(&history_path),
        history_path,
        input: BufReader::new(tokio::io::stdin()).lines(),
    };
    app.run().await
}

struct App {
    registry: SourceRegistry,
    metadata: Option<GoogleBooksClient>,
    history: PlaybackHistory,
    history_path: PathBuf,
    input: Lines<BufReader<Stdin>>,
}

impl App {
    async fn run(mut self) -> Result<()> {
        if let Some(last) = &self.history.last_search {
            println!("Last search: {last}");
        }

        loop {
            let Some(query) = self.prompt("search> ").await? else {
                break;
            };
            if query.is_empty() {
                continue;
            }
            if matches!(query.as_str(), "q" | "quit" | "exit") {
                break;
            }
            if self.handle_search(&query).await? {
                break;
            }
        }

        self.registry.close_all().await;
        println!("Goodbye!");
        Ok(())
    }

    /// Print a prompt and read one trimmed line. `None` means stdin
    /// closed.
    async fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        use std::io::Write as _;
        print!("{text}");
        std::io::stdout().flush()?;
        Ok(self
            .input
            .next_line()
            .await?
            .map(|line| line.trim().to_string()))
    }

    /// Returns `Ok(true)` when the user asked to quit the whole app.
    async fn handle_search(&mut self, query: &str) -> Result<bool> {
        let results = match search_all(self.registry.sources(), query, DEFAULT_SEARCH_TIMEOUT).await
        {
            Ok(results) => results,
            Err(err) => {
                eprintln!("search failed: {err}");
                return Ok(false);
            }
        };

        if results.is_empty() {
            println!("No results found.");
            return Ok(false);
        }
        for (i, item) in results.iter().enumerate() {
            println!("{:3}. {} ({})", i + 1, item.title, item.source_name);
        }

        let Some(choice) = self.prompt("select (empty to cancel)> ").await? else {
            return Ok(true);
        };
        let Some(index) = parse_selection(&choice, results.len()) else {
            return Ok(false);
        };
        let item = results[index].clone();

        self.history.last_search = Some(query.to_string());
        self.history.last_selected = Some(item.title.clone());
        self.history.save(&self.history_path);

        self.handle_details(item).await
    }

    async fn handle_details(&mut self, item: AudioItem) -> Result<bool> {
        println!("Fetching details for '{}'...", item.title);

        let book = match fetch_details(&self.registry, &item, self.metadata.as_ref()).await {
            Ok(Some(book)) => book,
            Ok(None) => {
                println!("Could not load chapters for this item.");
                return Ok(false);
            }
            Err(err) => {
                // Unknown source means the registry and the result list
                // went out of sync; worth more than a shrug.
                eprintln!("detail fetch failed: {err}");
                return Ok(false);
            }
        };

        if let Some(author) = &book.author {
            println!("{} by {author}", book.title);
        }
        for (i, chapter) in book.chapters.iter().enumerate() {
            println!("{:3}. {}", i + 1, chapter.title);
        }

        let Some(choice) = self.prompt("chapter (empty to cancel)> ").await? else {
            return Ok(true);
        };
        let Some(index) = parse_selection(&choice, book.chapters.len()) else {
            return Ok(false);
        };

        self.history.last_audiobook = Some(book.title.clone());
        self.history.last_chapter_index = Some(index);
        self.history.save(&self.history_path);

        self.play(book, index).await
    }

    async fn play(&mut self, book: Audiobook, mut index: usize) -> Result<bool> {
        let chapter = &book.chapters[index];
        let mut player =
            MpvPlayer::spawn(&chapter.url, &format!("{} - {}", book.title, chapter.title)).await?;
        println!("Playing '{}'.", chapter.title);
        print_controls();

        let quit = loop {
            let Some(command) = self.prompt("player> ").await? else {
                break true;
            };
            let result = match command.as_str() {
                "p" => player.toggle_pause().await,
                "n" | "b" => {
                    index = if command == "n" {
                        (index + 1) % book.chapters.len()
                    } else if index == 0 {
                        book.chapters.len() - 1
                    } else {
                        index - 1
                    };
                    let chapter = &book.chapters[index];
                    self.history.last_chapter_index = Some(index);
                    self.history.save(&self.history_path);
                    println!("Now playing '{}'.", chapter.title);
                    player
                        .load(&chapter.url, &format!("{} - {}", book.title, chapter.title))
                        .await
                }
                "f" => player.seek(10).await,
                "r" => player.seek(-10).await,
                "+" | "-" => {
                    let delta = if command == "+" { 5 } else { -5 };
                    let volume = player.status().volume + delta;
                    player.set_volume(volume).await
                }
                "" | "i" => {
                    print_status(&book, index, &player.status());
                    Ok(())
                }
                "h" => {
                    print_controls();
                    Ok(())
                }
                "s" => break false,
                "q" => break true,
                other => {
                    println!("unknown command '{other}' (h for help)");
                    Ok(())
                }
            };
            if let Err(err) = result {
                eprintln!("player command failed: {err}");
            }
        };

        player.stop().await?;
        Ok(quit)
    }
}

/// Parse a 1-based selection against a list length.
fn parse_selection(input: &str, len: usize) -> Option<usize> {
    let number: usize = input.parse().ok()?;
    if (1..=len).contains(&number) {
        Some(number - 1)
    } else {
        None
    }
}

fn print_controls() {
    println!(
        "controls: p play/pause, n next, b prev, f/r seek +/-10s, +/- volume, i status, s stop, q quit"
    );
}

fn print_status(book: &Audiobook, index: usize, status: &PlayerStatus) {
    let state = if status.paused { "paused" } else { "playing" };
    let progress = if status.duration > 0.0 {
        format!("{:.0}/{:.0}s", status.position, status.duration)
    } else {
        "unknown".to_string()
    };
    println!(
        "{state} | {} - {} | {progress} | volume {}%",
        book.title, book.chapters[index].title, status.volume
    );
}
