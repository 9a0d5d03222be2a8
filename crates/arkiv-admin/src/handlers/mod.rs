//! Admin view handlers

pub mod groups;
pub mod login;
pub mod users;

use arkiv_core::traits::Id;

/// Parse the repeated `<key>=<id>` pairs out of a form body.
///
/// The list view posts one `selected=<id>` pair per ticked row, and the
/// group edit form one `members=<id>` per member; anything unparsable
/// is ignored rather than failing the whole submission.
pub(crate) fn parse_ids(body: &str, key: &str) -> Vec<Id> {
    body.split('&')
        .filter_map(|pair| pair.split_once('='))
        .filter(|(k, _)| *k == key)
        .filter_map(|(_, value)| value.parse::<Id>().ok())
        .collect()
}
