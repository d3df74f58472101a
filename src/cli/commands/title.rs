//! Title browsing command handlers

use crate::config::Config;
use crate::db::{Store, TitleFilter};
use crate::domain::display::render_title;

pub async fn cmd_title_list(
    config: &Config,
    category: Option<String>,
    genre: Option<String>,
) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let titles = store
        .list_titles(&TitleFilter {
            category,
            genre,
            ..Default::default()
        })
        .await?;

    if titles.is_empty() {
        println!("No titles found.");
        return Ok(());
    }

    let ids: Vec<i32> = titles.iter().map(|t| t.id).collect();
    let ratings = store.get_ratings(&ids).await?;

    println!("Titles ({} total)", titles.len());
    println!("{:-<70}", "");

    for title in titles {
        let year = title.year.map_or_else(|| "----".to_string(), |y| y.to_string());
        let rating = ratings
            .get(&title.id)
            .map_or_else(|| "-".to_string(), |r| format!("{r:.1}"));
        println!("{:>4}  {}  {:<40} ★ {}", title.id, year, title.name, rating);
    }

    Ok(())
}

pub async fn cmd_title_show(config: &Config, id: i32) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;

    let Some(title) = store.get_title(id).await? else {
        println!("Title {id} not found.");
        return Ok(());
    };

    print!("{}", render_title(&title, config.display.wrap_width));

    let rating = store.get_rating(id).await?;
    let reviews = store.review_count(id).await?;
    match rating {
        Some(rating) => println!("Rating: {rating:.2} from {reviews} review(s)"),
        None => println!("Rating: None"),
    }

    Ok(())
}
