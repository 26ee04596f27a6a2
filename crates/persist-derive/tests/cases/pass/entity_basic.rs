// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Scalar-only entity without an identifier or a service.

use persist_derive::{Entity, PredicateBuilder, SortBuilder};

#[derive(Clone, Debug, PartialEq, Entity)]
pub struct NoteEntity {
    pub text:   String,
    pub pinned: bool,
    pub score:  f64,
    pub rank:   Option<i64>
}

fn main() {
    assert_eq!(<NoteEntity as Entity>::ENTITY_NAME, "Note");

    let note = NoteEntity {
        text:   "hello".to_string(),
        pinned: true,
        score:  0.5,
        rank:   None
    };
    assert_eq!(note.identity(), None);

    let filter = NoteEntityPredicateBuilder::root().pinned().is_true()
        & NoteEntityPredicateBuilder::root().score().greater_than(0.25)
        & NoteEntityPredicateBuilder::root().rank().less_than(10);
    assert!(filter.to_string().contains("score"));

    let sort = NoteEntitySortBuilder::root().score().descending();
    assert_eq!(sort.key(), "score");
}
