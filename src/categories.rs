//! Category ordering and the vocabulary-list category filter

use serde::Serialize;

use crate::model::{Category, VocabularyItem, ALL, FAVORITES, NEEDS_REVIEW, NEW};

/// Category with the number of words listed under it
#[derive(Debug, Clone, Serialize)]
pub struct CategoryCount {
    pub category: Category,
    pub count: usize,
}

/// Words listed under `name`. Reserved names act as pseudo-filters.
pub fn filter_by_category<'a>(words: &'a [VocabularyItem], name: &str) -> Vec<&'a VocabularyItem> {
    let name = name.trim();
    words
        .iter()
        .filter(|w| match name {
            "" | ALL => true,
            FAVORITES => w.is_favorite,
            NEW => w.is_unstudied() || w.has_category(NEW),
            NEEDS_REVIEW => w.needs_review() || w.has_category(NEEDS_REVIEW),
            other => w.has_category(other),
        })
        .collect()
}

pub fn category_counts(categories: &[Category], words: &[VocabularyItem]) -> Vec<CategoryCount> {
    categories
        .iter()
        .map(|c| CategoryCount {
            category: c.clone(),
            count: filter_by_category(words, &c.name).len(),
        })
        .collect()
}

/// Display order for a newly created category
pub fn next_display_order(categories: &[Category]) -> u32 {
    categories
        .iter()
        .map(|c| c.display_order + 1)
        .max()
        .unwrap_or(0)
}

fn sort_for_display(categories: &mut [Category]) {
    categories.sort_by(|a, b| {
        a.display_order
            .cmp(&b.display_order)
            .then_with(|| a.name.cmp(&b.name))
    });
}

fn is_contiguous(categories: &[Category]) -> bool {
    let mut orders: Vec<u32> = categories.iter().map(|c| c.display_order).collect();
    orders.sort_unstable();
    orders.iter().enumerate().all(|(i, &order)| order == i as u32)
}

/// Reassign display orders 0..n-1 following the current display sort
pub fn normalize_order(categories: &mut [Category]) {
    sort_for_display(categories);
    for (i, category) in categories.iter_mut().enumerate() {
        category.display_order = i as u32;
    }
}

/// Move a category one slot up. Returns the categories whose order changed.
pub fn move_up(categories: &mut [Category], id: i64) -> Vec<Category> {
    shift(categories, id, true)
}

/// Move a category one slot down. Returns the categories whose order changed.
pub fn move_down(categories: &mut [Category], id: i64) -> Vec<Category> {
    shift(categories, id, false)
}

fn shift(categories: &mut [Category], id: i64, up: bool) -> Vec<Category> {
    let renumbered = !is_contiguous(categories);
    if renumbered {
        normalize_order(categories);
    } else {
        sort_for_display(categories);
    }

    let neighbour = categories.iter().position(|c| c.id == id).and_then(|pos| {
        if up {
            pos.checked_sub(1).map(|prev| (prev, pos))
        } else {
            (pos + 1 < categories.len()).then_some((pos, pos + 1))
        }
    });

    let Some((first, second)) = neighbour else {
        return if renumbered { categories.to_vec() } else { Vec::new() };
    };

    let order = categories[first].display_order;
    categories[first].display_order = categories[second].display_order;
    categories[second].display_order = order;
    let changed = if renumbered {
        categories.to_vec()
    } else {
        vec![categories[first].clone(), categories[second].clone()]
    };
    sort_for_display(categories);
    changed
}
