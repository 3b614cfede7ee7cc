//! Folds classified pins into a [`PinoutDocument`].

use indexmap::IndexMap;

use super::classifier::PinClassifier;
use super::sorter::sort_key;
use super::{Category, Page, PinRecord, PinoutDocument};

pub struct PinoutAssembler;

impl PinoutAssembler {
    /// Build the `page → category → [pin]` document.
    ///
    /// Pages follow [`Page::ORDER`] and empty pages are omitted. Within a
    /// page, categories appear in the order their first pin appears in
    /// `pins`; within a category, pins are ordered by [`sort_key`]. Pins not
    /// yet classified are classified here.
    pub fn assemble(pins: Vec<PinRecord>) -> PinoutDocument {
        let mut buckets: IndexMap<Page, IndexMap<Category, Vec<PinRecord>>> = IndexMap::new();

        for mut pin in pins {
            let category = match pin.category {
                Some(category) => category,
                None => PinClassifier::classify_pin(&mut pin),
            };
            let page = *pin.page.get_or_insert_with(|| category.page());
            buckets
                .entry(page)
                .or_default()
                .entry(category)
                .or_default()
                .push(pin);
        }

        let mut document = PinoutDocument::new();
        for page in Page::ORDER {
            let Some(sections) = buckets.shift_remove(&page) else {
                continue;
            };
            for (category, mut section) in sections {
                section.sort_by_cached_key(|pin| sort_key(pin, category));
                tracing::debug!(%page, %category, pins = section.len(), "assembled section");
                *document.section_mut(page, category) = section;
            }
        }
        document
    }
}
