use std::cmp::Ordering;

use models::sample_query::{SampleQueriesList, SampleQuery};

/// Locale whose documents are reordered after load.
pub const ORDERED_LOCALE: &str = "en-us";

/// Category always listed first.
pub const GETTING_STARTED: &str = "Getting Started";

/// Whether documents for `locale` get the ordering pass.
pub fn is_ordered_locale(locale: &str) -> bool {
    locale.trim().eq_ignore_ascii_case(ORDERED_LOCALE)
}

/// `Getting Started` records first in source order, then the rest stably
/// ordered by category and human name, case-insensitively. Records without a
/// category go last.
pub fn order_samples(list: SampleQueriesList) -> SampleQueriesList {
    let (mut ordered, mut rest): (Vec<SampleQuery>, Vec<SampleQuery>) = list
        .sample_queries
        .into_iter()
        .partition(|q| q.category.as_deref() == Some(GETTING_STARTED));
    rest.sort_by(|a, b| {
        cmp_optional(a.category.as_deref(), b.category.as_deref())
            .then_with(|| cmp_optional(a.human_name.as_deref(), b.human_name.as_deref()))
    });
    ordered.append(&mut rest);
    SampleQueriesList::new(ordered)
}

fn cmp_optional(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
