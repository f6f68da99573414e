//! Database integration tests.
//!
//! Runs against an in-memory `SQLite` database by default. Set `TEST_DB_URL`
//! to point the tests at another database.

#![allow(clippy::unwrap_used)]

use chrono::Utc;
use folio_db::criteria::{Criteria, CriteriaItem};
use folio_db::entities::{ContentType, content, taglink};
use folio_db::repositories::{ContentRepository, TaglinkRepository};
use folio_db::search::{SearchOperator, SearchTerms};
use folio_db::test_utils::TestDatabase;
use sea_orm::ActiveValue::Set;

fn new_row(content_type: ContentType, title: &str) -> content::ActiveModel {
    content::ActiveModel {
        content_type: Set(content_type.as_str().to_string()),
        title: Set(title.to_string()),
        file_size: Set(0),
        parent: Set(0),
        online: Set(true),
        submission_time: Set(Utc::now().into()),
        counter: Set(0),
        ..Default::default()
    }
}

fn link(content_id: i32, tag_id: i32) -> taglink::ActiveModel {
    taglink::ActiveModel {
        content_id: Set(content_id),
        tag_id: Set(tag_id),
        content_type: Set("Article".to_string()),
        ..Default::default()
    }
}

async fn setup() -> (TestDatabase, ContentRepository, TaglinkRepository) {
    let db = TestDatabase::new().await.unwrap();
    let conn = db.shared();
    (
        db,
        ContentRepository::new(conn.clone()),
        TaglinkRepository::new(conn),
    )
}

#[tokio::test]
async fn test_insert_and_find() {
    let (db, repo, _) = setup().await;

    let inserted = repo
        .insert(db.connection(), new_row(ContentType::Article, "Hello"))
        .await
        .unwrap();
    assert!(inserted.id > 0);

    let found = repo.get_by_id(inserted.id).await.unwrap();
    assert_eq!(found.title, "Hello");
    assert_eq!(found.content_type().unwrap(), ContentType::Article);
}

#[tokio::test]
async fn test_clear_parent_detaches_children() {
    let (db, repo, _) = setup().await;
    let conn = db.connection();

    let collection = repo
        .insert(conn, new_row(ContentType::Collection, "Album"))
        .await
        .unwrap();
    for title in ["One", "Two"] {
        let mut row = new_row(ContentType::Audio, title);
        row.parent = Set(collection.id);
        repo.insert(conn, row).await.unwrap();
    }

    assert_eq!(repo.find_children(collection.id).await.unwrap().len(), 2);
    assert_eq!(repo.clear_parent(conn, collection.id).await.unwrap(), 2);
    assert!(repo.find_children(collection.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_counter_and_online_flag() {
    let (db, repo, _) = setup().await;
    let row = repo
        .insert(db.connection(), new_row(ContentType::Download, "File"))
        .await
        .unwrap();

    assert!(repo.increment_counter(row.id).await.unwrap());
    assert!(repo.increment_counter(row.id).await.unwrap());
    assert!(repo.set_online(row.id, false).await.unwrap());

    let row = repo.get_by_id(row.id).await.unwrap();
    assert_eq!(row.counter, 2);
    assert!(!row.online);

    assert!(!repo.increment_counter(9999).await.unwrap());
}

#[tokio::test]
async fn test_criteria_with_tag_filter() {
    let (db, repo, links) = setup().await;
    let conn = db.connection();

    let tag = repo
        .insert(conn, new_row(ContentType::Tag, "rust"))
        .await
        .unwrap();
    let tagged = repo
        .insert(conn, new_row(ContentType::Article, "Tagged"))
        .await
        .unwrap();
    repo.insert(conn, new_row(ContentType::Article, "Untagged"))
        .await
        .unwrap();
    links
        .insert_many(conn, vec![link(tagged.id, tag.id)])
        .await
        .unwrap();

    let criteria = Criteria::new()
        .add(CriteriaItem::of_type(ContentType::Article))
        .tags([tag.id]);
    let rows = repo.find_by_criteria(&criteria).await.unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, tagged.id);
    assert_eq!(repo.count_by_criteria(&criteria).await.unwrap(), 1);
    assert_eq!(links.find_content_ids(tag.id).await.unwrap(), vec![tagged.id]);
}

#[tokio::test]
async fn test_taglink_deletes() {
    let (db, repo, links) = setup().await;
    let conn = db.connection();

    let article = repo
        .insert(conn, new_row(ContentType::Article, "Post"))
        .await
        .unwrap();
    links
        .insert_many(conn, vec![link(article.id, 3), link(article.id, 7)])
        .await
        .unwrap();
    links
        .insert_many(conn, vec![link(article.id + 1, 3)])
        .await
        .unwrap();

    assert_eq!(links.find_tag_ids(article.id).await.unwrap(), vec![3, 7]);
    assert_eq!(links.delete_by_tag(conn, 3).await.unwrap(), 2);
    assert_eq!(links.delete_by_content(conn, article.id).await.unwrap(), 1);
    assert!(links.find_tag_ids(article.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_skips_blocks_and_offline_rows() {
    let (db, repo, _) = setup().await;
    let conn = db.connection();

    repo.insert(conn, new_row(ContentType::Article, "Ownership notes"))
        .await
        .unwrap();
    repo.insert(conn, new_row(ContentType::Block, "Ownership sidebar"))
        .await
        .unwrap();
    let mut hidden = new_row(ContentType::Article, "Ownership draft");
    hidden.online = Set(false);
    repo.insert(conn, hidden).await.unwrap();

    let terms = SearchTerms::parse("ownership", SearchOperator::And, 3);
    let (total, rows) = repo.search(&terms, 10, 0).await.unwrap();

    assert_eq!(total, 1);
    assert_eq!(rows[0].title, "Ownership notes");
}

#[tokio::test]
async fn test_cleanup_empties_tables() {
    let (db, repo, _) = setup().await;
    repo.insert(db.connection(), new_row(ContentType::Static, "About"))
        .await
        .unwrap();

    db.cleanup().await.unwrap();

    assert_eq!(repo.count_by_criteria(&Criteria::new()).await.unwrap(), 0);
}
