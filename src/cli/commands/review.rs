//! Review browsing command handler

use crate::config::Config;
use crate::db::Store;
use crate::domain::display::{render_comment, render_review};

pub async fn cmd_review_show(config: &Config, id: i32) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let width = config.display.wrap_width;

    let Some(review) = store.get_review(id).await? else {
        println!("Review {id} not found.");
        return Ok(());
    };

    print!("{}", render_review(&review, width));

    let comments = store.list_comments(id).await?;
    if !comments.is_empty() {
        println!("Comments ({})", comments.len());
        println!("{:-<40}", "");
        for comment in &comments {
            print!("{}", render_comment(comment, width));
        }
    }

    Ok(())
}
