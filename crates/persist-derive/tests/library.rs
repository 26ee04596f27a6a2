// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! End-to-end tests of a derived service over an in-memory store.

use chrono::{TimeZone, Utc};
use persist_derive::{Predicate, StoreConfig, persistence_service};

use self::library::{AuthorEntity, BookEntity, Format, LibraryService, LibraryServiceClient};

#[persistence_service]
pub mod library {
    use std::{fmt, str::FromStr};

    use chrono::{DateTime, Utc};
    use persist_derive::{Entity, QuerySpec, query};

    #[derive(Clone, Debug, PartialEq, Entity)]
    pub struct AuthorEntity {
        #[id]
        pub id:    String,
        pub name:  String,
        pub books: Vec<BookEntity>
    }

    #[derive(Clone, Debug, PartialEq, Entity)]
    pub struct BookEntity {
        #[id]
        pub id:        String,
        pub title:     String,
        pub pages:     i32,
        pub tags:      Vec<String>,
        pub published: Option<DateTime<Utc>>,
        pub read:      Option<bool>,
        pub format:    Format
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum Format {
        Paperback,
        Ebook
    }

    impl fmt::Display for Format {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Self::Paperback => f.write_str("paperback"),
                Self::Ebook => f.write_str("ebook")
            }
        }
    }

    impl FromStr for Format {
        type Err = String;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s {
                "paperback" => Ok(Self::Paperback),
                "ebook" => Ok(Self::Ebook),
                other => Err(format!("unknown format {other}"))
            }
        }
    }

    /// Books longer than `min_pages`, longest first.
    #[query]
    pub fn long_books(min_pages: i32) -> QuerySpec<BookEntity> {
        QuerySpec::<BookEntity>::new()
            .filter(|b| b.pages().greater_than(min_pages))
            .sort(|s| s.pages().descending())
    }

    /// Authors with at least one book tagged `tag`.
    #[query]
    pub fn authors_tagged(tag: String) -> QuerySpec<AuthorEntity> {
        QuerySpec::<AuthorEntity>::new()
            .filter(|a| a.books().tags().equals(tag))
            .sort(|s| s.name().ascending())
    }
}

fn client() -> LibraryServiceClient {
    library::open(StoreConfig::in_memory()).unwrap()
}

fn book(id: &str, title: &str, pages: i32) -> BookEntity {
    BookEntity {
        id: id.to_string(),
        title: title.to_string(),
        pages,
        tags: Vec::new(),
        published: None,
        read: None,
        format: Format::Paperback
    }
}

fn author(id: &str, name: &str, books: Vec<BookEntity>) -> AuthorEntity {
    AuthorEntity {
        id: id.to_string(),
        name: name.to_string(),
        books
    }
}

async fn book_ids(client: &LibraryServiceClient) -> Vec<persist_derive::ObjectId> {
    client
        .store()
        .perform(|context| {
            context
                .fetch("Book", &Predicate::True, &[])
                .into_iter()
                .map(|record| record.id())
                .collect::<Vec<_>>()
        })
        .await
        .unwrap()
}

#[test]
fn model_name_defaults_to_module() {
    assert_eq!(library::MODEL_NAME, "Library");
    let schema = library::schema();
    assert_eq!(schema.model_name(), "Library");
    assert!(schema.entity("Author").is_some());
    assert!(schema.entity("Book").is_some());
}

#[test]
fn schema_describes_fields() {
    let schema = library::schema();
    let book = schema.entity("Book").unwrap();

    let pages = book.attribute_named("pages").unwrap();
    assert!(!pages.optional);

    let published = book.attribute_named("published").unwrap();
    assert!(published.optional);

    let tags = book.attribute_named("tags").unwrap();
    assert!(tags.is_array);

    assert!(book.attribute_named("format").is_none());

    let author = schema.entity("Author").unwrap();
    let books = author.relationship("books").unwrap();
    assert_eq!(books.destination, "Book");
    assert_eq!(books.max_count, 0);
}

#[tokio::test]
async fn query_by_title_after_add_or_update() {
    let client = client();
    client.add_or_update_book(vec![book("1", "A", 10)]).await;

    let found = client
        .query_book(|b| b.title().equals("A"), |_| ())
        .execute_async()
        .await;

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].pages, 10);
}

#[tokio::test]
async fn add_or_update_is_idempotent() {
    let client = client();
    client.add_or_update_book(vec![book("1", "A", 10)]).await;
    let first = book_ids(&client).await;

    client.add_or_update_book(vec![book("1", "A", 10)]).await;
    let second = book_ids(&client).await;

    assert_eq!(first.len(), 1);
    assert_eq!(first, second);

    let all = client.query_book(|_| (), |_| ()).execute_async().await;
    assert_eq!(all, vec![book("1", "A", 10)]);
}

#[tokio::test]
async fn add_or_update_updates_in_place() {
    let client = client();
    client.add_or_update_book(vec![book("1", "A", 10)]).await;
    let before = book_ids(&client).await;

    client.add_or_update_book(vec![book("1", "A", 42)]).await;

    assert_eq!(book_ids(&client).await, before);
    let all = client.query_book(|_| (), |_| ()).execute_async().await;
    assert_eq!(all[0].pages, 42);
}

#[tokio::test]
async fn duplicate_ids_in_one_batch_resolve_to_one_record() {
    let client = client();
    client
        .add_or_update_book(vec![book("1", "A", 10), book("1", "A", 20)])
        .await;

    let all = client.query_book(|_| (), |_| ()).execute_async().await;
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].pages, 20);
}

#[tokio::test]
async fn growing_to_many_inserts_only_the_new_member() {
    let client = client();
    client
        .add_or_update_author(vec![author("a", "Ann", vec![book("1", "One", 10)])])
        .await;
    let before = book_ids(&client).await;
    assert_eq!(before.len(), 1);

    client
        .add_or_update_author(vec![author(
            "a",
            "Ann",
            vec![book("1", "One", 10), book("2", "Two", 20)]
        )])
        .await;
    let after = book_ids(&client).await;

    assert_eq!(after.len(), 2);
    assert_eq!(after[0], before[0]);

    let authors = client.query_author(|_| (), |_| ()).execute_async().await;
    assert_eq!(authors.len(), 1);
    let mut titles: Vec<&str> = authors[0].books.iter().map(|b| b.title.as_str()).collect();
    titles.sort_unstable();
    assert_eq!(titles, ["One", "Two"]);
}

#[tokio::test]
async fn shrinking_to_many_deletes_detached_members() {
    let client = client();
    client
        .add_or_update_author(vec![author(
            "a",
            "Ann",
            vec![book("1", "One", 10), book("2", "Two", 20)]
        )])
        .await;

    client
        .add_or_update_author(vec![author("a", "Ann", vec![book("2", "Two", 20)])])
        .await;

    let books = client.query_book(|_| (), |_| ()).execute_async().await;
    assert_eq!(books, vec![book("2", "Two", 20)]);
}

#[tokio::test]
async fn delete_all_removes_only_matches() {
    let client = client();
    client
        .add_or_update_author(vec![author("a", "Ann", vec![book("1", "Short", 50)])])
        .await;
    client
        .add_or_update_book(vec![book("2", "Long", 150), book("3", "Longer", 300)])
        .await;

    client
        .query_book(|b| b.pages().greater_than(100), |_| ())
        .delete_all_async()
        .await;

    let books = client.query_book(|_| (), |_| ()).execute_async().await;
    assert_eq!(books, vec![book("1", "Short", 50)]);

    let authors = client.query_author(|_| (), |_| ()).execute_async().await;
    assert_eq!(authors, vec![author("a", "Ann", vec![book("1", "Short", 50)])]);
}

#[tokio::test]
async fn deleting_an_owner_cascades_to_members() {
    let client = client();
    client
        .add_or_update_author(vec![author("a", "Ann", vec![book("1", "One", 10)])])
        .await;
    client.add_or_update_book(vec![book("2", "Loose", 20)]).await;

    client
        .query_author(|a| a.id().equals("a"), |_| ())
        .delete_all_async()
        .await;

    let books = client.query_book(|_| (), |_| ()).execute_async().await;
    assert_eq!(books, vec![book("2", "Loose", 20)]);
}

#[tokio::test]
async fn to_many_paths_match_any_member() {
    let client = client();
    client
        .add_or_update_author(vec![
            author("x", "Xena", vec![book("1", "Thin", 50), book("2", "Thick", 500)]),
            author("y", "Yuri", vec![book("3", "Slim", 60), book("4", "Lean", 70)]),
        ])
        .await;

    let matched = client
        .query_author(|a| a.books().pages().greater_than(100), |_| ())
        .execute_async()
        .await;
    let names: Vec<&str> = matched.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["Xena"]);

    let thin = client
        .query_author(|a| a.books().pages().less_than(100), |s| s.name().ascending())
        .execute_async()
        .await;
    let names: Vec<&str> = thin.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["Xena", "Yuri"]);
}

#[tokio::test]
async fn or_and_not_combine_terms() {
    let client = client();
    client
        .add_or_update_book(vec![
            book("1", "A", 10),
            book("2", "B", 20),
            book("3", "C", 30),
        ])
        .await;

    let either = client
        .query_book(
            |b| b.title().equals("A") | b.pages().equals(30),
            |s| s.pages().ascending()
        )
        .execute_async()
        .await;
    let ids: Vec<&str> = either.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, ["1", "3"]);

    let neither = client
        .query_book(|b| !b.title().equals("B"), |s| s.pages().descending())
        .execute_async()
        .await;
    let ids: Vec<&str> = neither.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, ["3", "1"]);

    let both = client
        .query_book(
            |b| vec![b.pages().greater_than(10), b.pages().less_than(30)],
            |_| ()
        )
        .execute_async()
        .await;
    let ids: Vec<&str> = both.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, ["2"]);
}

#[tokio::test]
async fn custom_queries_apply_filter_and_sort() {
    let client = client();
    client
        .add_or_update_book(vec![
            book("1", "Short", 50),
            book("2", "Long", 150),
            book("3", "Longer", 300),
        ])
        .await;

    let long = client.long_books(100).execute_async().await;
    let titles: Vec<&str> = long.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, ["Longer", "Long"]);
}

#[tokio::test]
async fn custom_query_over_scalar_array_member() {
    let client = client();
    let mut tagged = book("1", "Tagged", 10);
    tagged.tags = vec!["rust".to_string(), "systems".to_string()];
    client
        .add_or_update_author(vec![
            author("b", "Bea", vec![tagged]),
            author("c", "Cal", vec![book("2", "Plain", 20)]),
        ])
        .await;

    let found = client
        .authors_tagged("systems".to_string())
        .execute_async()
        .await;
    let names: Vec<&str> = found.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["Bea"]);
}

#[tokio::test]
async fn every_field_kind_round_trips() {
    let client = client();
    let original = BookEntity {
        id:        "rt".to_string(),
        title:     "Round Trip".to_string(),
        pages:     321,
        tags:      vec!["a".to_string(), "b".to_string()],
        published: Some(Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap()),
        read:      Some(true),
        format:    Format::Ebook
    };
    client.add_or_update_book(vec![original.clone()]).await;

    let loaded = client
        .query_book(|b| b.id().equals("rt"), |_| ())
        .execute_async()
        .await;

    assert_eq!(loaded, vec![original]);
}

#[tokio::test]
async fn timestamps_compare_in_predicates() {
    let client = client();
    let mut old = book("1", "Old", 10);
    old.published = Some(Utc.with_ymd_and_hms(1999, 1, 1, 0, 0, 0).unwrap());
    let mut new = book("2", "New", 10);
    new.published = Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
    client.add_or_update_book(vec![old, new, book("3", "Unknown", 10)]).await;

    let cutoff = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
    let recent = client
        .query_book(|b| b.published().greater_than(cutoff), |_| ())
        .execute_async()
        .await;
    let titles: Vec<&str> = recent.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, ["New"]);
}

#[tokio::test]
async fn equals_false_matches_unset_booleans() {
    let client = client();
    let mut finished = book("1", "Finished", 10);
    finished.read = Some(true);
    let mut abandoned = book("2", "Abandoned", 20);
    abandoned.read = Some(false);
    client
        .add_or_update_book(vec![finished, abandoned, book("3", "Untouched", 30)])
        .await;

    let unread = client
        .query_book(|b| b.read().equals(false), |s| s.pages().ascending())
        .execute_async()
        .await;
    let ids: Vec<&str> = unread.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, ["2", "3"]);

    let same = client
        .query_book(|b| b.read().is_false(), |s| s.pages().ascending())
        .execute_async()
        .await;
    assert_eq!(same, unread);
}

#[test]
fn blocking_execute_outside_a_runtime() {
    let client = client();
    futures::executor::block_on(client.add_or_update_book(vec![book("1", "A", 10)]));

    let found = client
        .query_book(|b| b.title().contains("a"), |_| ())
        .execute();
    assert_eq!(found.len(), 1);

    client.query_book(|_| (), |_| ()).delete_all();
    assert!(client.query_book(|_| (), |_| ()).execute().is_empty());
}

#[tokio::test]
async fn disk_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();

    {
        let client = library::open(StoreConfig::on_disk(dir.path())).unwrap();
        client
            .add_or_update_author(vec![author("a", "Ann", vec![book("1", "One", 10)])])
            .await;
    }

    assert!(dir.path().join("Library.json").exists());

    let client = library::open(StoreConfig::on_disk(dir.path())).unwrap();
    let authors = client.query_author(|_| (), |_| ()).execute_async().await;
    assert_eq!(authors, vec![author("a", "Ann", vec![book("1", "One", 10)])]);
}
