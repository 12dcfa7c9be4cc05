//! Menu browsing: category selection, filters and grouping of items into
//! subcategory sections.
//!
//! # Design
//! Items live in subcategories; a main category shows one section per child.
//! The "pizza du moment" category is the exception and holds its items
//! directly. Everything here borrows from the fetched lists.

use std::collections::{BTreeSet, HashMap};

use crate::format::format_price_plain;
use crate::types::{Category, Item, ItemImage, ItemVariant};

/// True for the category whose items are listed directly under it.
pub fn is_pizza_moment(category: &Category) -> bool {
    let name = category.name.to_lowercase();
    name.contains("pizza-moment") || name.contains("pizza du moment")
}

/// Tabs of the menu page: top-level categories with items, by display
/// order.
pub fn main_categories(categories: &[Category]) -> Vec<&Category> {
    let mut mains: Vec<&Category> = categories
        .iter()
        .filter(|c| c.parent_id.is_none() && c.item_count() > 0)
        .collect();
    mains.sort_by_key(|c| c.display_order);
    mains
}

/// Emoji shown on a tab without an image.
pub fn category_icon(name: &str) -> &'static str {
    let name = name.to_lowercase();
    if name.contains("pizza") {
        "🍕"
    } else if name.contains("boisson") || name.contains("drink") {
        "🥤"
    } else if name.contains("dessert") {
        "🍰"
    } else if name.contains("kiosquito") || name.contains("sandwich") {
        "🥪"
    } else {
        "🍽️"
    }
}

/// Nest a flat category list by `parent_id`, siblings ordered by display
/// order. Categories whose parent is missing, or whose parent chain loops
/// back to themselves, are promoted to roots.
pub fn category_tree(categories: &[Category]) -> Vec<Category> {
    let parents: HashMap<&str, Option<&str>> = categories
        .iter()
        .map(|c| (c.id.as_str(), c.parent_id.as_deref()))
        .collect();
    let mut by_parent: HashMap<Option<&str>, Vec<&Category>> = HashMap::new();
    for category in categories {
        let parent = category
            .parent_id
            .as_deref()
            .filter(|p| parents.contains_key(p) && !in_cycle(category.id.as_str(), &parents));
        by_parent.entry(parent).or_default().push(category);
    }

    fn build<'a>(
        parent: Option<&'a str>,
        by_parent: &HashMap<Option<&'a str>, Vec<&'a Category>>,
        depth: usize,
    ) -> Vec<Category> {
        // Guards against parent cycles in bad data.
        if depth > 16 {
            return Vec::new();
        }
        let mut level: Vec<Category> = by_parent
            .get(&parent)
            .map(|children| {
                children
                    .iter()
                    .map(|c| {
                        let c: &'a Category = *c;
                        let mut node = c.clone();
                        node.children = build(Some(c.id.as_str()), by_parent, depth + 1);
                        node
                    })
                    .collect()
            })
            .unwrap_or_default();
        level.sort_by_key(|c| c.display_order);
        level
    }

    build(None, &by_parent, 0)
}

/// Whether following `parent_id` links from `id` leads back to `id`.
fn in_cycle(id: &str, parents: &HashMap<&str, Option<&str>>) -> bool {
    let mut seen = BTreeSet::new();
    let mut current = parents.get(id).copied().flatten();
    while let Some(step) = current {
        if step == id {
            return true;
        }
        if !seen.insert(step) {
            return false;
        }
        current = parents.get(step).copied().flatten();
    }
    false
}

/// Ids of every category below `id` in the parent chain.
pub fn descendant_ids<'a>(id: &str, categories: &'a [Category]) -> BTreeSet<&'a str> {
    let mut found: BTreeSet<&'a str> = BTreeSet::new();
    let mut frontier = vec![id.to_string()];
    while let Some(parent) = frontier.pop() {
        for category in categories {
            if category.parent_id.as_deref() == Some(parent.as_str())
                && category.id != id
                && found.insert(category.id.as_str())
            {
                frontier.push(category.id.clone());
            }
        }
    }
    found
}

/// Items shown for a selected category (fetched with its children).
pub fn items_for_category<'a>(category: &Category, items: &'a [Item]) -> Vec<&'a Item> {
    if is_pizza_moment(category) {
        return items.iter().filter(|i| i.category_id == category.id).collect();
    }
    if category.children.is_empty() {
        return Vec::new();
    }
    items
        .iter()
        .filter(|i| category.children.iter().any(|c| c.id == i.category_id))
        .collect()
}

/// Distinct variant names across `items`, sorted.
pub fn available_sizes(items: &[&Item]) -> Vec<String> {
    items
        .iter()
        .flat_map(|i| i.variants.iter().map(|v| v.variant_name.clone()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Visitor-selected filters of the menu page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuFilter {
    pub vegetarian_only: bool,
    pub size: Option<String>,
}

impl MenuFilter {
    /// Clicking the selected size again clears it.
    pub fn toggle_size(&mut self, size: &str) {
        if self.size.as_deref() == Some(size) {
            self.size = None;
        } else {
            self.size = Some(size.to_string());
        }
    }

    /// Items without a VEGETARIENNE option are hidden by the vegetarian
    /// filter.
    pub fn matches(&self, item: &Item) -> bool {
        if self.vegetarian_only && !item.is_vegetarian() {
            return false;
        }
        match &self.size {
            Some(size) => item.variants.iter().any(|v| &v.variant_name == size),
            None => true,
        }
    }

    pub fn apply<'a>(&self, items: &[&'a Item]) -> Vec<&'a Item> {
        items.iter().copied().filter(|i| self.matches(i)).collect()
    }
}

/// One titled block of the menu page.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuSection<'a> {
    pub title: String,
    pub items: Vec<&'a Item>,
}

/// Group items by subcategory, in child order. Empty sections are dropped.
pub fn group_by_subcategory<'a>(category: &Category, items: &[&'a Item]) -> Vec<MenuSection<'a>> {
    if is_pizza_moment(category) {
        let direct: Vec<&Item> = items
            .iter()
            .copied()
            .filter(|i| i.category_id == category.id)
            .collect();
        if direct.is_empty() {
            return Vec::new();
        }
        return vec![MenuSection {
            title: category.name.clone(),
            items: direct,
        }];
    }
    category
        .children
        .iter()
        .filter_map(|child| {
            let section: Vec<&Item> = items
                .iter()
                .copied()
                .filter(|i| i.category_id == child.id)
                .collect();
            (!section.is_empty()).then(|| MenuSection {
                title: child.name.clone(),
                items: section,
            })
        })
        .collect()
}

/// Everything the menu page renders for one selection.
#[derive(Debug, Clone)]
pub struct MenuView<'a> {
    pub tabs: Vec<&'a Category>,
    pub selected: Option<&'a Category>,
    pub available_sizes: Vec<String>,
    pub sections: Vec<MenuSection<'a>>,
    pub filter: MenuFilter,
}

impl<'a> MenuView<'a> {
    /// `selected` is the detail record (with children) of the chosen tab.
    pub fn build(
        categories: &'a [Category],
        selected: Option<&'a Category>,
        items: &'a [Item],
        filter: MenuFilter,
    ) -> Self {
        let tabs = main_categories(categories);
        let (available_sizes, sections) = match selected {
            Some(category) => {
                let in_category = items_for_category(category, items);
                let sizes = available_sizes(&in_category);
                let filtered = filter.apply(&in_category);
                (sizes, group_by_subcategory(category, &filtered))
            }
            None => (Vec::new(), Vec::new()),
        };
        Self {
            tabs,
            selected,
            available_sizes,
            sections,
            filter,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// The tab to open when the visitor has not chosen one.
pub fn default_category_id(categories: &[Category]) -> Option<&str> {
    main_categories(categories)
        .into_iter()
        .next()
        .map(|c| c.id.as_str())
}

// ---------------------------------------------------------------------------
// Item card
// ---------------------------------------------------------------------------

/// The 33 cm variant when there is one, else the first.
pub fn default_variant(item: &Item) -> Option<&ItemVariant> {
    item.variants
        .iter()
        .find(|v| v.variant_name.contains("33 cm"))
        .or_else(|| item.variants.first())
}

pub fn is_available(item: &Item) -> bool {
    item.status != "Unavailable" && item.status != "Discontinued"
}

pub fn default_image(item: &Item) -> Option<&ItemImage> {
    item.images
        .iter()
        .find(|i| i.is_default)
        .or_else(|| item.images.first())
}

/// Lowest and highest variant prices.
pub fn price_bounds(variants: &[ItemVariant]) -> Option<(f64, f64)> {
    variants.iter().map(|v| v.price).fold(None, |acc, p| match acc {
        None => Some((p, p)),
        Some((lo, hi)) => Some((lo.min(p), hi.max(p))),
    })
}

/// Price line of a menu card: the selected size's price when the item has
/// it, otherwise the single price or the range.
pub fn display_price(item: &Item, selected_size: Option<&str>) -> String {
    if item.variants.is_empty() {
        return "Prix sur demande".to_string();
    }
    if let Some(size) = selected_size {
        if let Some(variant) = item.variants.iter().find(|v| v.variant_name == size) {
            return format_price_plain(variant.price);
        }
    }
    match price_bounds(&item.variants) {
        Some((lo, hi)) if lo != hi => {
            format!("{} - {}", format_price_plain(lo), format_price_plain(hi))
        }
        Some((lo, _)) => format_price_plain(lo),
        None => "Prix sur demande".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::OptionType;
    use crate::types::{CategoryCount, ItemOption};

    fn category(id: &str, name: &str, parent: Option<&str>, order: i32, count: u32) -> Category {
        Category {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            image_url: None,
            display_order: order,
            parent_id: parent.map(str::to_string),
            children: Vec::new(),
            count: Some(CategoryCount { items: count }),
            created_at: None,
            updated_at: None,
        }
    }

    fn item(id: &str, category_id: &str, sizes: &[(&str, f64)], veg: Option<&str>) -> Item {
        Item {
            id: id.to_string(),
            name: format!("Item {id}"),
            description: None,
            status: "Active".to_string(),
            category_id: category_id.to_string(),
            category: None,
            variants: sizes
                .iter()
                .map(|(name, price)| ItemVariant {
                    id: None,
                    variant_name: name.to_string(),
                    price: *price,
                    sku: None,
                })
                .collect(),
            images: vec![],
            options: veg
                .map(|v| {
                    vec![ItemOption {
                        id: None,
                        option_type: OptionType::Vegetarienne,
                        option_value: format!("\"{v}\""),
                    }]
                })
                .unwrap_or_default(),
            created_at: None,
            updated_at: None,
        }
    }

    fn pizzas_with_children() -> Category {
        let mut pizzas = category("p", "Pizzas", None, 1, 3);
        pizzas.children = vec![
            category("tom", "Base tomate", Some("p"), 1, 2),
            category("cre", "Base crème", Some("p"), 2, 1),
        ];
        pizzas
    }

    fn menu_items() -> Vec<Item> {
        vec![
            item("1", "tom", &[("29 cm", 9.0), ("33 cm", 12.0)], Some("Oui")),
            item("2", "tom", &[("29 cm", 10.0)], Some("Non")),
            item("3", "cre", &[("33 cm", 13.0), ("40 cm", 17.0)], None),
            item("4", "p", &[("29 cm", 8.0)], None),
            item("5", "other", &[("29 cm", 8.0)], Some("Oui")),
        ]
    }

    #[test]
    fn tabs_skip_children_and_empty_categories() {
        let categories = vec![
            category("d", "Desserts", None, 3, 2),
            category("p", "Pizzas", None, 1, 5),
            category("tom", "Base tomate", Some("p"), 1, 5),
            category("e", "Vide", None, 0, 0),
        ];
        let tabs: Vec<&str> = main_categories(&categories).iter().map(|c| c.id.as_str()).collect();
        assert_eq!(tabs, vec!["p", "d"]);
        assert_eq!(default_category_id(&categories), Some("p"));
    }

    #[test]
    fn items_come_from_subcategories_only() {
        let items = menu_items();
        let ids: Vec<&str> = items_for_category(&pizzas_with_children(), &items)
            .iter()
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(ids, vec!["1", "2", "3"]);

        let childless = category("d", "Desserts", None, 3, 0);
        assert!(items_for_category(&childless, &items).is_empty());
    }

    #[test]
    fn pizza_moment_lists_direct_items() {
        let items = menu_items();
        let moment = category("p", "Pizza du Moment", None, 0, 1);
        let found = items_for_category(&moment, &items);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "4");

        let sections = group_by_subcategory(&moment, &found);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Pizza du Moment");
    }

    #[test]
    fn sizes_are_distinct_and_sorted() {
        let items = menu_items();
        let in_category = items_for_category(&pizzas_with_children(), &items);
        assert_eq!(available_sizes(&in_category), vec!["29 cm", "33 cm", "40 cm"]);
    }

    #[test]
    fn vegetarian_filter_hides_items_without_the_option() {
        let items = menu_items();
        let in_category = items_for_category(&pizzas_with_children(), &items);
        let filter = MenuFilter {
            vegetarian_only: true,
            size: None,
        };
        let ids: Vec<&str> = filter.apply(&in_category).iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["1"]);
    }

    #[test]
    fn size_filter_requires_exact_variant_name() {
        let items = menu_items();
        let in_category = items_for_category(&pizzas_with_children(), &items);
        let mut filter = MenuFilter::default();
        filter.toggle_size("40 cm");
        let ids: Vec<&str> = filter.apply(&in_category).iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["3"]);

        filter.toggle_size("40 cm");
        assert!(filter.size.is_none());
    }

    #[test]
    fn sections_follow_child_order_and_skip_empty_children() {
        let items = menu_items();
        let pizzas = pizzas_with_children();
        let filter = MenuFilter {
            vegetarian_only: false,
            size: Some("29 cm".to_string()),
        };
        let view = MenuView::build(&[], Some(&pizzas), &items, filter);
        assert_eq!(view.sections.len(), 1);
        assert_eq!(view.sections[0].title, "Base tomate");
        assert_eq!(view.sections[0].items.len(), 2);
        // Sizes come from the unfiltered category.
        assert_eq!(view.available_sizes.len(), 3);
    }

    #[test]
    fn tree_nests_children_by_display_order() {
        let flat = vec![
            category("cre", "Base crème", Some("p"), 2, 1),
            category("p", "Pizzas", None, 1, 0),
            category("tom", "Base tomate", Some("p"), 1, 2),
            category("d", "Desserts", None, 0, 1),
            category("orphan", "Orpheline", Some("missing"), 5, 0),
        ];
        let tree = category_tree(&flat);
        let roots: Vec<&str> = tree.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(roots, vec!["d", "p", "orphan"]);
        let children: Vec<&str> = tree[1].children.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(children, vec!["tom", "cre"]);
    }

    #[test]
    fn tree_keeps_categories_caught_in_a_parent_loop() {
        let flat = vec![
            category("a", "A", Some("b"), 1, 0),
            category("b", "B", Some("a"), 2, 0),
            category("under", "Sous A", Some("a"), 0, 0),
            category("c", "C", None, 3, 0),
            category("self", "Lui-même", Some("self"), 4, 0),
        ];
        let tree = category_tree(&flat);
        let roots: Vec<&str> = tree.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(roots, vec!["a", "b", "c", "self"]);
        let under_a: Vec<&str> = tree[0].children.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(under_a, vec!["under"]);
    }

    #[test]
    fn descendants_cover_every_level() {
        let flat = vec![
            category("p", "Pizzas", None, 1, 0),
            category("tom", "Base tomate", Some("p"), 1, 0),
            category("fines", "Fines", Some("tom"), 1, 0),
            category("d", "Desserts", None, 2, 0),
        ];
        let below = descendant_ids("p", &flat);
        assert_eq!(below.into_iter().collect::<Vec<_>>(), vec!["fines", "tom"]);
        assert!(descendant_ids("d", &flat).is_empty());
    }

    #[test]
    fn card_prices() {
        let range = item("1", "tom", &[("29 cm", 9.0), ("33 cm", 12.0)], None);
        assert_eq!(display_price(&range, None), "9.00 € - 12.00 €");
        assert_eq!(display_price(&range, Some("33 cm")), "12.00 €");
        assert_eq!(display_price(&range, Some("40 cm")), "9.00 € - 12.00 €");

        let flat = item("2", "tom", &[("29 cm", 9.0), ("33 cm", 9.0)], None);
        assert_eq!(display_price(&flat, None), "9.00 €");

        let none = item("3", "tom", &[], None);
        assert_eq!(display_price(&none, None), "Prix sur demande");
    }

    #[test]
    fn card_defaults() {
        let mut pizza = item("1", "tom", &[("29 cm", 9.0), ("33 cm", 12.0)], None);
        assert_eq!(default_variant(&pizza).unwrap().variant_name, "33 cm");
        assert!(is_available(&pizza));
        pizza.status = "Discontinued".to_string();
        assert!(!is_available(&pizza));

        pizza.images = vec![
            ItemImage {
                id: None,
                image_url: "/a.jpg".to_string(),
                is_default: false,
            },
            ItemImage {
                id: None,
                image_url: "/b.jpg".to_string(),
                is_default: true,
            },
        ];
        assert_eq!(default_image(&pizza).unwrap().image_url, "/b.jpg");
    }

    #[test]
    fn icons_follow_category_names() {
        assert_eq!(category_icon("Nos Pizzas"), "🍕");
        assert_eq!(category_icon("Boissons"), "🥤");
        assert_eq!(category_icon("Autres"), "🍽️");
    }
}
