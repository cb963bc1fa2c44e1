mod common;

use common::{candidate, init_tracing};
use news_scraper::{ArticleStore, MemoryStore, StoreAdapter, StoreError};
use uuid::Uuid;

#[tokio::test]
async fn test_list_articles_newest_first() {
    init_tracing();

    let store = MemoryStore::with_articles(vec![candidate("Oldest"), candidate("Middle")]).await;
    store.create(candidate("Newest")).await.expect("create");

    let titles: Vec<String> = store
        .list_articles(false)
        .await
        .expect("list")
        .into_iter()
        .map(|a| a.title)
        .collect();
    assert_eq!(titles, vec!["Newest", "Middle", "Oldest"]);
}

#[tokio::test]
async fn test_saved_flag_filters_listing() {
    let store = MemoryStore::new();
    let a = store.create(candidate("A")).await.expect("create");
    let b = store.create(candidate("B")).await.expect("create");

    store.set_saved(b.id, true).await.expect("save");
    let saved = store.list_articles(true).await.expect("list saved");
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].id, b.id);

    store.set_saved(b.id, false).await.expect("unsave");
    assert!(store.list_articles(true).await.expect("list saved").is_empty());
    assert!(!store.get_article(a.id).await.expect("get").saved);
}

#[tokio::test]
async fn test_unknown_article_is_not_found() {
    let store = MemoryStore::new();
    let id = Uuid::new_v4();

    assert!(matches!(store.get_article(id).await, Err(StoreError::NotFound { id: missing }) if missing == id));
    assert!(matches!(store.set_saved(id, true).await, Err(StoreError::NotFound { .. })));
    assert!(matches!(store.add_comment(id, "hi".to_string()).await, Err(StoreError::NotFound { .. })));
    assert!(matches!(store.list_comments(id).await, Err(StoreError::NotFound { .. })));
    assert!(matches!(store.delete_comment(id).await, Err(StoreError::NotFound { .. })));
}

#[tokio::test]
async fn test_comments_append_and_delete() {
    init_tracing();

    let store = MemoryStore::new();
    let article = store.create(candidate("Game recap")).await.expect("create");

    let updated = store.add_comment(article.id, "What a goal".to_string()).await.expect("comment");
    let updated_again = store.add_comment(article.id, "Ref was blind".to_string()).await.expect("comment");
    assert_eq!(updated.comments.len(), 1);
    assert_eq!(updated_again.comments.len(), 2);
    assert_eq!(updated_again.comments[0], updated.comments[0]);

    let comments = store.list_comments(article.id).await.expect("comments");
    let bodies: Vec<&str> = comments.iter().map(|c| c.body.as_str()).collect();
    assert_eq!(bodies, vec!["What a goal", "Ref was blind"]);
    assert!(comments.iter().all(|c| c.article_id == article.id));

    store.delete_comment(comments[0].id).await.expect("delete");
    let remaining = store.get_article(article.id).await.expect("get");
    assert_eq!(remaining.comments, vec![comments[1].id]);
    assert_eq!(store.list_comments(article.id).await.expect("comments").len(), 1);
}

#[tokio::test]
async fn test_empty_comment_is_invalid() {
    let store = MemoryStore::new();
    let article = store.create(candidate("Recap")).await.expect("create");
    assert!(matches!(
        store.add_comment(article.id, "   ".to_string()).await,
        Err(StoreError::Invalid(_))
    ));
}

#[tokio::test]
async fn test_create_does_not_enforce_unique_titles() {
    let store = MemoryStore::new();
    store.create(candidate("Same")).await.expect("first");
    store.create(candidate("Same")).await.expect("second");
    assert_eq!(store.len().await, 2);
}
