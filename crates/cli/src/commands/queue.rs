// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Manual queue maintenance: re-enqueue and removal.

use sq_core::QueueStore;

use crate::error::Result;

use super::{for_each_id, Context};

pub fn requeue(ctx: &Context, ids: &[String]) -> Result<()> {
    let store = ctx.open_store()?;
    requeue_impl(&store, ids)
}

/// Give failed records a fresh retry budget.
pub(crate) fn requeue_impl(store: &QueueStore, ids: &[String]) -> Result<()> {
    for_each_id(ids, |id| {
        store.requeue(id)?;
        println!("Requeued {}", id);
        Ok(())
    })
}

pub fn remove(ctx: &Context, ids: &[String]) -> Result<()> {
    let store = ctx.open_store()?;
    remove_impl(&store, ids)
}

/// Delete records outright. Unknown ids are reported but not an error.
pub(crate) fn remove_impl(store: &QueueStore, ids: &[String]) -> Result<()> {
    for_each_id(ids, |id| {
        if store.remove(id)? {
            println!("Removed {}", id);
        } else {
            println!("{} was not queued", id);
        }
        Ok(())
    })
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
