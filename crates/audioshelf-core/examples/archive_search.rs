use audioshelf_core::{ArchiveSource, AudioSource};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let source = ArchiveSource::new("LibriVox")?;

    println!("🔍 Searching for 'Moby Dick'...\n");

    let items = source.search("Moby Dick").await?;

    println!("Found {} results:", items.len());
    for (i, item) in items.iter().enumerate() {
        println!("  {}. {} - {}", i + 1, item.title, item.url);
    }

    if let Some(item) = items.first() {
        println!("\n📖 Loading details for: {}\n", item.title);

        match source.get_details(item).await {
            Some(book) => {
                println!("Title: {}", book.title);
                if let Some(author) = &book.author {
                    println!("Author: {}", author);
                }
                if let Some(cover) = &book.cover_image_url {
                    println!("Cover: {}", cover);
                }
                println!("\n🎧 Chapters ({}):", book.chapters.len());
                for chapter in &book.chapters {
                    println!("  • {}", chapter.title);
                }
            }
            None => println!("No playable chapters found for this item."),
        }
    }

    Ok(())
}
