// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Subscriptions and streams over a derived service.

use std::time::Duration;

use futures::{Stream, StreamExt, channel::mpsc};
use persist_derive::{StoreConfig, persistence_service};

use self::catalog::{CatalogService, CatalogServiceClient, ShelfEntity, VolumeEntity};

#[persistence_service(model = "Catalog")]
pub mod catalog {
    use persist_derive::Entity;

    #[derive(Clone, Debug, PartialEq, Entity)]
    pub struct ShelfEntity {
        #[id]
        pub id:      String,
        pub label:   String,
        pub volumes: Vec<VolumeEntity>
    }

    #[derive(Clone, Debug, PartialEq, Entity)]
    pub struct VolumeEntity {
        #[id]
        pub id:     String,
        pub title:  String,
        pub pages:  i32,
        pub loaned: bool
    }
}

const WAIT: Duration = Duration::from_secs(5);

fn client() -> CatalogServiceClient {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    catalog::open(StoreConfig::in_memory()).unwrap()
}

fn volume(id: &str, title: &str, pages: i32) -> VolumeEntity {
    VolumeEntity {
        id: id.to_string(),
        title: title.to_string(),
        pages,
        loaned: false
    }
}

fn shelf(id: &str, volumes: Vec<VolumeEntity>) -> ShelfEntity {
    ShelfEntity {
        id: id.to_string(),
        label: id.to_uppercase(),
        volumes
    }
}

async fn next<S, T>(stream: &mut S) -> T
where
    S: Stream<Item = T> + Unpin
{
    tokio::time::timeout(WAIT, stream.next())
        .await
        .expect("delivery timed out")
        .expect("stream ended")
}

fn ids(volumes: &[VolumeEntity]) -> Vec<&str> {
    volumes.iter().map(|v| v.id.as_str()).collect()
}

#[tokio::test]
async fn results_stream_starts_with_current_matches() {
    let client = client();
    client.add_or_update_volume(vec![volume("1", "A", 200)]).await;

    let mut stream = client
        .query_volume(|v| v.pages().greater_than(100), |s| s.pages().ascending())
        .results_stream();

    assert_eq!(ids(&next(&mut stream).await), ["1"]);

    client.add_or_update_volume(vec![volume("2", "B", 150)]).await;
    assert_eq!(ids(&next(&mut stream).await), ["2", "1"]);
}

#[tokio::test]
async fn results_stream_skips_commits_that_do_not_change_the_result() {
    let client = client();
    let mut stream = client
        .query_volume(|v| v.pages().greater_than(100), |_| ())
        .results_stream();
    assert!(next(&mut stream).await.is_empty());

    client.add_or_update_volume(vec![volume("1", "Thin", 10)]).await;
    client.add_or_update_volume(vec![volume("2", "Thick", 500)]).await;

    assert_eq!(ids(&next(&mut stream).await), ["2"]);
}

#[tokio::test]
async fn updates_stream_delivers_changed_matches_only() {
    let client = client();
    client
        .add_or_update_volume(vec![volume("1", "A", 10), volume("2", "B", 20)])
        .await;

    let mut stream = client.query_volume(|_| (), |_| ()).updates_stream();

    let mut changed = volume("2", "B", 20);
    changed.loaned = true;
    client.add_or_update_volume(vec![volume("1", "A", 10), changed]).await;

    let delivered = next(&mut stream).await;
    assert_eq!(ids(&delivered), ["2"]);
    assert!(delivered[0].loaned);
}

#[tokio::test]
async fn updates_stream_applies_filter() {
    let client = client();
    let mut stream = client
        .query_volume(|v| v.loaned().is_true(), |_| ())
        .updates_stream();

    client.add_or_update_volume(vec![volume("1", "A", 10)]).await;
    let mut loaned = volume("2", "B", 20);
    loaned.loaned = true;
    client.add_or_update_volume(vec![loaned]).await;

    assert_eq!(ids(&next(&mut stream).await), ["2"]);
}

#[tokio::test]
async fn growing_to_many_notifies_one_inserted_member() {
    let client = client();
    client
        .add_or_update_shelf(vec![shelf("s", vec![volume("1", "One", 10)])])
        .await;

    let mut volumes = client.query_volume(|_| (), |_| ()).updates_stream();

    client
        .add_or_update_shelf(vec![shelf(
            "s",
            vec![volume("1", "One", 10), volume("2", "Two", 20)]
        )])
        .await;

    assert_eq!(ids(&next(&mut volumes).await), ["2"]);
}

#[tokio::test]
async fn identical_reconcile_raises_no_notification() {
    let client = client();
    client
        .add_or_update_shelf(vec![shelf(
            "s",
            vec![volume("1", "One", 10), volume("2", "Two", 20)]
        )])
        .await;

    let mut shelves = client.query_shelf(|_| (), |_| ()).updates_stream();
    let mut volumes = client.query_volume(|_| (), |_| ()).updates_stream();

    client
        .add_or_update_shelf(vec![shelf(
            "s",
            vec![volume("2", "Two", 20), volume("1", "One", 10)]
        )])
        .await;

    // Only the sentinel commits below may reach the streams.
    client.add_or_update_shelf(vec![shelf("sentinel", Vec::new())]).await;
    client
        .add_or_update_volume(vec![volume("sentinel", "Marker", 1)])
        .await;

    let delivered: Vec<ShelfEntity> = next(&mut shelves).await;
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].id, "sentinel");
    assert_eq!(ids(&next(&mut volumes).await), ["sentinel"]);
}

#[tokio::test]
async fn callback_subscription_receives_results() {
    let client = client();
    let (sender, mut receiver) = mpsc::unbounded();

    let subscription = client
        .query_volume(|v| v.title().contains("rust"), |_| ())
        .subscribe_to_results(move |volumes| {
            let _ = sender.unbounded_send(volumes);
        });

    client
        .add_or_update_volume(vec![volume("1", "Programming Rust", 600)])
        .await;

    assert_eq!(ids(&next(&mut receiver).await), ["1"]);
    subscription.cancel();
}

#[tokio::test]
async fn cancelled_subscription_stops_delivering() {
    let client = client();
    let (sender, mut receiver) = mpsc::unbounded();

    let subscription = client
        .query_volume(|_| (), |_| ())
        .subscribe_to_updates(move |volumes| {
            let _ = sender.unbounded_send(volumes);
        });
    subscription.cancel();

    client.add_or_update_volume(vec![volume("1", "A", 10)]).await;

    let stored = client.query_volume(|_| (), |_| ()).execute_async().await;
    assert_eq!(stored.len(), 1);

    let outcome = tokio::time::timeout(Duration::from_millis(200), receiver.next()).await;
    assert!(!matches!(outcome, Ok(Some(_))));
}

#[tokio::test]
async fn subscribers_may_call_back_into_the_store() {
    let client = client();
    let (sender, mut receiver) = mpsc::unbounded();

    let reader = client.clone();
    let _subscription = client
        .query_volume(|_| (), |_| ())
        .subscribe_to_updates(move |_| {
            let count = reader.query_volume(|_| (), |_| ()).execute().len();
            let _ = sender.unbounded_send(count);
        });

    client.add_or_update_volume(vec![volume("1", "A", 10)]).await;

    assert_eq!(next(&mut receiver).await, 1);
}
