//! Scatter/reduce over chunked blocks.
//!
//! Every task maps one (input block, partner chunk) pair to a partial output block
//! keyed by its destination block coordinate. Partials sharing a key are summed.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use ndarray::ArrayD;
use rayon::prelude::*;
use uspread_core::error::{Result, SpreadError};
use uspread_core::Real;

use crate::dispatch::ThreadedDispatcher;

/// Run `task` over `tasks` on the dispatcher's pool and sum partial blocks by key.
pub fn scatter_reduce<T, K, I, F>(
    dispatcher: &ThreadedDispatcher,
    tasks: &[I],
    task: F,
) -> Result<BTreeMap<K, ArrayD<T>>>
where
    T: Real,
    K: Ord + Send,
    I: Sync,
    F: Fn(&I) -> Result<(K, ArrayD<T>)> + Send + Sync,
{
    let partials: Vec<(K, ArrayD<T>)> =
        dispatcher.install(|| tasks.par_iter().map(&task).collect::<Result<Vec<_>>>())?;

    let mut reduced = BTreeMap::new();
    for (key, part) in partials {
        match reduced.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(part);
            }
            Entry::Occupied(mut slot) => {
                let acc: &mut ArrayD<T> = slot.get_mut();
                if acc.shape() != part.shape() {
                    return Err(SpreadError::ShapeMismatch {
                        expected: acc.shape().to_vec(),
                        actual: part.shape().to_vec(),
                    });
                }
                *acc += &part;
            }
        }
    }
    Ok(reduced)
}
