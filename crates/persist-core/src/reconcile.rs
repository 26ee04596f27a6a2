// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Relationship reconciliation used by generated updaters.
//!
//! Updaters never rebuild a relationship blindly. They hand the desired
//! members to [`store_one`] or [`store_many`], which diff them against what
//! the record currently holds:
//!
//! | Incoming member | Action |
//! |-----------------|--------|
//! | equal to a current member | keep that record untouched |
//! | same identity as a current member | update that record in place |
//! | anything else | insert a new record through [`Entity::update`] |
//! | current member left unclaimed | detach, then delete unless `delete_old` is false |
//!
//! When the mapped current members already equal the incoming ones the
//! procedure returns before writing anything, so the enclosing job commits
//! nothing and no subscriber is notified.

use crate::{
    entity::Entity,
    record::{ObjectId, RecordSource},
    store::Context
};

/// Reconcile a to-one relationship.
pub fn store_one<E: Entity>(
    context: &mut Context<'_>,
    object: ObjectId,
    key: &str,
    value: Option<&E>,
    delete_old: bool
) {
    reconcile(context, object, key, value.into_iter().collect(), false, delete_old);
}

/// Reconcile a to-many relationship. Member order is not significant.
pub fn store_many<E: Entity>(
    context: &mut Context<'_>,
    object: ObjectId,
    key: &str,
    values: &[E],
    delete_old: bool
) {
    reconcile(context, object, key, values.iter().collect(), true, delete_old);
}

fn reconcile<E: Entity>(
    context: &mut Context<'_>,
    object: ObjectId,
    key: &str,
    incoming: Vec<&E>,
    unordered: bool,
    delete_old: bool
) {
    let mut current: Vec<(ObjectId, Option<E>)> = context
        .related(object, key)
        .iter()
        .map(|id| {
            let mapped = context
                .record(*id)
                .and_then(|record| E::from_record(record, &*context).ok());
            (*id, mapped)
        })
        .collect();

    if unchanged(&current, &incoming, unordered) {
        return;
    }

    let mut members = Vec::with_capacity(incoming.len());
    for value in incoming {
        if let Some(index) = current
            .iter()
            .position(|(_, mapped)| mapped.as_ref() == Some(value))
        {
            members.push(current.remove(index).0);
            continue;
        }

        let same_identity = value.identity().and_then(|identity| {
            current.iter().position(|(_, mapped)| {
                mapped.as_ref().and_then(Entity::identity) == Some(identity)
            })
        });
        let id = match same_identity {
            Some(index) => current.remove(index).0,
            None => context.insert(E::ENTITY_NAME)
        };
        value.update(id, context);
        members.push(id);
    }

    context.set_related(object, key, members);

    if delete_old {
        for (id, _) in current {
            context.delete(id);
        }
    }
}

fn unchanged<E: Entity>(current: &[(ObjectId, Option<E>)], incoming: &[&E], unordered: bool) -> bool {
    if current.len() != incoming.len() {
        return false;
    }
    let Some(mapped) = current
        .iter()
        .map(|(_, mapped)| mapped.as_ref())
        .collect::<Option<Vec<&E>>>()
    else {
        return false;
    };

    if !unordered {
        return mapped == incoming;
    }
    let mut pool = mapped;
    incoming.iter().all(|value| {
        match pool.iter().position(|candidate| candidate == value) {
            Some(index) => {
                pool.swap_remove(index);
                true
            }
            None => false
        }
    })
}
