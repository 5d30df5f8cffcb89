//! Secret slot reconciliation.

use fastedge_api::{Secret, SecretResource, SecretSlot};
use std::collections::HashSet;

/// Build the update that moves `current` to `desired`.
///
/// The desired slots are kept as given, in order. Every slot number the
/// server holds that `desired` does not mention is appended as a deletion
/// marker, in the order the server listed them.
pub fn reconcile(desired: &SecretResource, current: &Secret) -> SecretResource {
    let wanted: HashSet<u32> = desired.secret_slots.iter().map(|s| s.slot).collect();
    let mut seen = HashSet::new();

    let deletions = current
        .secret_slots
        .iter()
        .map(|s| s.slot)
        .filter(|slot| !wanted.contains(slot) && seen.insert(*slot))
        .map(SecretSlot::delete);

    let secret_slots = desired
        .secret_slots
        .iter()
        .cloned()
        .chain(deletions)
        .collect();

    SecretResource {
        name: desired.name.clone(),
        comment: desired.comment.clone(),
        secret_slots,
    }
}
