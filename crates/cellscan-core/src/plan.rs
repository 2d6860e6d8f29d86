use std::collections::BTreeMap;

use crate::region::RegionSpec;

/// Region specs grouped by the page they reference.
///
/// Each spec lives under exactly one page; within a page the original
/// token order is kept. Pages are iterated in ascending order.
#[derive(Debug, Clone, Default)]
pub struct PagePlan {
    pages: BTreeMap<u32, Vec<RegionSpec>>,
}

impl PagePlan {
    /// Distinct pages in ascending order with the specs requesting each.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[RegionSpec])> {
        self.pages.iter().map(|(page, specs)| (*page, specs.as_slice()))
    }

    pub fn pages(&self) -> impl Iterator<Item = u32> + '_ {
        self.pages.keys().copied()
    }

    pub fn regions_on(&self, page: u32) -> &[RegionSpec] {
        self.pages.get(&page).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn region_count(&self) -> usize {
        self.pages.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

pub fn group_by_page(specs: Vec<RegionSpec>) -> PagePlan {
    let mut pages: BTreeMap<u32, Vec<RegionSpec>> = BTreeMap::new();
    for spec in specs {
        pages.entry(spec.page).or_default().push(spec);
    }
    PagePlan { pages }
}
