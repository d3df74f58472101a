use std::path::PathBuf;

use yamdb::db::{Store, TitleFilter, is_foreign_key_violation, is_unique_violation};
use yamdb::domain::display::render_title;
use yamdb::models::title::{NewTitle, TitleChanges};

struct TestStore {
    store: Store,
    path: PathBuf,
}

impl Drop for TestStore {
    fn drop(&mut self) {
        std::fs::remove_file(&self.path).ok();
    }
}

async fn open_store() -> TestStore {
    let path = std::env::temp_dir().join(format!("yamdb-store-{}.db", uuid::Uuid::new_v4()));
    let store = Store::new(&format!("sqlite:{}", path.display()))
        .await
        .expect("Failed to open store");
    TestStore { store, path }
}

#[tokio::test]
async fn test_all_migrations_applied() {
    let test = open_store().await;

    let status = test.store.migration_status().await.unwrap();
    let names: Vec<&str> = status.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "m20210601_000001_initial",
            "m20210614_000002_add_title_year",
            "m20210615_000003_add_title_description",
            "m20210616_000004_unique_review_author",
        ]
    );
    assert!(status.iter().all(|m| m.applied));
}

#[tokio::test]
async fn test_unique_review_index_follows_migrations() {
    let test = open_store().await;
    let store = &test.store;

    let admin = store.get_user_by_username("admin").await.unwrap().unwrap();
    let title_id = store
        .create_title(NewTitle {
            name: "Stalker".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    store.create_review(title_id, admin.id, "First", 8).await.unwrap();
    let err = store
        .create_review(title_id, admin.id, "Second", 9)
        .await
        .unwrap_err();
    assert!(is_unique_violation(&err));

    store.migrate_down(1).await.unwrap();
    let status = store.migration_status().await.unwrap();
    assert!(!status.last().unwrap().applied);
    assert!(status[..3].iter().all(|m| m.applied));

    store.create_review(title_id, admin.id, "Second", 9).await.unwrap();
    assert_eq!(store.review_count(title_id).await.unwrap(), 2);

    // Re-applying the index fails while duplicates exist.
    assert!(store.migrate_up().await.is_err());
}

#[tokio::test]
async fn test_rating_is_mean_of_scores() {
    let test = open_store().await;
    let store = &test.store;

    let admin = store.get_user_by_username("admin").await.unwrap().unwrap();
    let critic = store.create_user("critic").await.unwrap();
    assert_eq!(critic.api_key.len(), 64);

    let reviewed = store
        .create_title(NewTitle {
            name: "Solaris".to_string(),
            year: Some(1972),
            ..Default::default()
        })
        .await
        .unwrap();
    let unreviewed = store
        .create_title(NewTitle {
            name: "Mirror".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(store.get_rating(reviewed).await.unwrap(), None);

    store.create_review(reviewed, admin.id, "Slow", 7).await.unwrap();
    store.create_review(reviewed, critic.id, "Deep", 10).await.unwrap();

    assert_eq!(store.get_rating(reviewed).await.unwrap(), Some(8.5));
    assert_eq!(store.get_rating(unreviewed).await.unwrap(), None);

    let ratings = store.get_ratings(&[reviewed, unreviewed]).await.unwrap();
    assert_eq!(ratings.get(&reviewed), Some(&8.5));
    assert!(!ratings.contains_key(&unreviewed));
}

#[tokio::test]
async fn test_delete_rules() {
    let test = open_store().await;
    let store = &test.store;
    let admin = store.get_user_by_username("admin").await.unwrap().unwrap();

    let films = store.create_category("Films", "films").await.unwrap();
    let drama = store.create_genre("Drama", "drama").await.unwrap();
    let title_id = store
        .create_title(NewTitle {
            name: "Nostalghia".to_string(),
            category_id: Some(films.id),
            genre_ids: vec![drama.id],
            ..Default::default()
        })
        .await
        .unwrap();

    let review_id = store.create_review(title_id, admin.id, "Fog", 9).await.unwrap();
    let comment_id = store
        .create_comment(review_id, admin.id, "Candle scene")
        .await
        .unwrap();

    assert!(store.remove_category("films").await.unwrap());
    assert!(store.remove_genre("drama").await.unwrap());
    let title = store.get_title(title_id).await.unwrap().unwrap();
    assert!(title.category.is_none());
    assert!(title.genres.is_empty());

    assert!(store.remove_title(title_id).await.unwrap());
    assert!(store.get_review(review_id).await.unwrap().is_none());
    assert!(store.get_comment(comment_id).await.unwrap().is_none());
    assert!(!store.remove_title(title_id).await.unwrap());
}

#[tokio::test]
async fn test_title_updates_and_filters() {
    let test = open_store().await;
    let store = &test.store;

    let drama = store.create_genre("Drama", "drama").await.unwrap();
    let war = store.create_genre("War", "war").await.unwrap();
    assert_eq!(
        store.missing_genre_ids(&[drama.id, 99]).await.unwrap(),
        vec![99]
    );

    let id = store
        .create_title(NewTitle {
            name: "Ivan's Childhood".to_string(),
            year: Some(1962),
            description: Some("A boy scout behind the lines".to_string()),
            genre_ids: vec![war.id, drama.id],
            ..Default::default()
        })
        .await
        .unwrap();

    let title = store.get_title(id).await.unwrap().unwrap();
    assert_eq!(title.genre_ids(), vec![drama.id, war.id]);

    store
        .update_title(
            id,
            TitleChanges {
                year: Some(None),
                genre_ids: Some(vec![war.id]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let title = store.get_title(id).await.unwrap().unwrap();
    assert_eq!(title.year, None);
    assert_eq!(title.description.as_deref(), Some("A boy scout behind the lines"));
    assert_eq!(title.genre_ids(), vec![war.id]);

    let by_genre = store
        .list_titles(&TitleFilter {
            genre: Some("drama".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(by_genre.is_empty());

    let by_name = store
        .list_titles(&TitleFilter {
            name: Some("Childhood".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_name.len(), 1);

    let rendered = render_title(&title, 80);
    assert!(rendered.contains("Year: None"));
    assert!(rendered.contains("Genre: War"));
    assert!(rendered.contains("Category: None"));
}

#[tokio::test]
async fn test_api_keys() {
    let test = open_store().await;
    let store = &test.store;

    let user = store.create_user("critic").await.unwrap();
    let found = store.verify_api_key(&user.api_key).await.unwrap().unwrap();
    assert_eq!(found.username, "critic");

    let new_key = store.regenerate_api_key("critic").await.unwrap();
    assert_ne!(new_key, user.api_key);
    assert!(store.verify_api_key(&user.api_key).await.unwrap().is_none());
    assert!(store.verify_api_key(&new_key).await.unwrap().is_some());

    let err = store.create_user("critic").await.unwrap_err();
    assert!(is_unique_violation(&err));

    let users: Vec<String> = store
        .list_users()
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.username)
        .collect();
    assert_eq!(users, vec!["admin", "critic"]);
}

#[tokio::test]
async fn test_dangling_references_are_foreign_key_violations() {
    let test = open_store().await;
    let store = &test.store;

    let err = store
        .create_title(NewTitle {
            name: "Orphan".to_string(),
            category_id: Some(404),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(is_foreign_key_violation(&err));
    assert!(!is_unique_violation(&err));

    let err = store
        .create_title(NewTitle {
            name: "Orphan".to_string(),
            genre_ids: vec![404],
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(is_foreign_key_violation(&err));

    assert!(
        store
            .list_titles(&TitleFilter::default())
            .await
            .unwrap()
            .is_empty()
    );

    store.create_user("critic").await.unwrap();
    let err = store.create_user("critic").await.unwrap_err();
    assert!(!is_foreign_key_violation(&err));
}
