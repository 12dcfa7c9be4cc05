//! In-memory backend state and the operations the routes run on it.
//!
//! Records are kept in `Vec`s so listings come back in insertion order.

use std::collections::HashSet;

use uuid::Uuid;

use crate::error::Failure;
use crate::model::{
    BusinessInfo, Category, CategoryInput, CategoryRef, Count, Event, EventInput, Image, Item,
    ItemInput, ItemOption, Variant,
};

pub const ADMIN_EMAIL: &str = "admin@pizzaleduc.fr";
pub const ADMIN_PASSWORD: &str = "pizzaleduc";

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Default)]
pub struct Store {
    pub items: Vec<Item>,
    pub categories: Vec<Category>,
    pub events: Vec<Event>,
    pub business: Vec<BusinessInfo>,
    access_tokens: HashSet<String>,
    refresh_tokens: HashSet<String>,
    csrf_tokens: HashSet<String>,
    refreshes: u32,
}

impl Store {
    // -----------------------------------------------------------------------
    // Auth
    // -----------------------------------------------------------------------

    /// Returns `(access, refresh)`.
    pub fn login(&mut self, email: &str, password: &str) -> Result<(String, String), Failure> {
        if email != ADMIN_EMAIL || password != ADMIN_PASSWORD {
            return Err(Failure::InvalidCredentials);
        }
        Ok(self.issue_tokens())
    }

    /// Refresh tokens are single use: each refresh rotates it.
    pub fn refresh(&mut self, refresh_token: &str) -> Result<(String, String), Failure> {
        if !self.refresh_tokens.remove(refresh_token) {
            return Err(Failure::InvalidRefreshToken);
        }
        self.refreshes += 1;
        Ok(self.issue_tokens())
    }

    fn issue_tokens(&mut self) -> (String, String) {
        let access = new_id();
        let refresh = new_id();
        self.access_tokens.insert(access.clone());
        self.refresh_tokens.insert(refresh.clone());
        (access, refresh)
    }

    pub fn issue_csrf(&mut self) -> String {
        let token = new_id();
        self.csrf_tokens.insert(token.clone());
        token
    }

    pub fn check_access(&self, token: &str) -> bool {
        self.access_tokens.contains(token)
    }

    pub fn check_csrf(&self, token: &str) -> bool {
        self.csrf_tokens.contains(token)
    }

    /// Invalidate every access token. Refresh tokens stay valid.
    pub fn expire_access_tokens(&mut self) {
        self.access_tokens.clear();
    }

    pub fn expire_csrf_tokens(&mut self) {
        self.csrf_tokens.clear();
    }

    /// Number of successful refreshes since startup.
    pub fn refresh_count(&self) -> u32 {
        self.refreshes
    }

    // -----------------------------------------------------------------------
    // Categories
    // -----------------------------------------------------------------------

    fn children_ids(&self, id: &str) -> Vec<&str> {
        self.categories
            .iter()
            .filter(|c| c.parent_id.as_deref() == Some(id))
            .map(|c| c.id.as_str())
            .collect()
    }

    /// Items directly in the category or in one of its children.
    fn count_items(&self, id: &str) -> u32 {
        let mut ids = self.children_ids(id);
        ids.push(id);
        self.items
            .iter()
            .filter(|i| ids.contains(&i.category_id.as_str()))
            .count() as u32
    }

    fn counted(&self, category: &Category) -> Category {
        Category {
            count: Some(Count {
                items: self.count_items(&category.id),
            }),
            ..category.clone()
        }
    }

    pub fn list_categories(&self) -> Vec<Category> {
        self.categories.iter().map(|c| self.counted(c)).collect()
    }

    pub fn get_category(&self, id: &str) -> Result<Category, Failure> {
        let category = self
            .categories
            .iter()
            .find(|c| c.id == id)
            .ok_or(Failure::NotFound("Catégorie"))?;
        let mut full = self.counted(category);
        full.children = self
            .categories
            .iter()
            .filter(|c| c.parent_id.as_deref() == Some(id))
            .map(|c| self.counted(c))
            .collect();
        Ok(full)
    }

    fn check_parent(&self, id: Option<&str>, parent: Option<&str>) -> Result<(), Failure> {
        let Some(parent) = parent else {
            return Ok(());
        };
        if Some(parent) == id {
            return Err(Failure::BadRequest(
                "Une catégorie ne peut pas être son propre parent".to_string(),
            ));
        }
        if !self.categories.iter().any(|c| c.id == parent) {
            return Err(Failure::BadRequest("Catégorie parente introuvable".to_string()));
        }
        // Walk up from the new parent: meeting `id` means it is a descendant.
        let mut seen = HashSet::new();
        let mut ancestor = Some(parent);
        while let Some(current) = ancestor {
            if Some(current) == id {
                return Err(Failure::BadRequest(
                    "Une catégorie ne peut pas être rattachée à une de ses sous-catégories"
                        .to_string(),
                ));
            }
            if !seen.insert(current) {
                break;
            }
            ancestor = self
                .categories
                .iter()
                .find(|c| c.id == current)
                .and_then(|c| c.parent_id.as_deref());
        }
        Ok(())
    }

    pub fn create_category(&mut self, input: CategoryInput) -> Result<Category, Failure> {
        require_name(&input.name)?;
        let parent_id = input.parent_id.filter(|p| !p.is_empty());
        self.check_parent(None, parent_id.as_deref())?;
        let category = Category {
            id: new_id(),
            name: input.name,
            description: input.description,
            image_url: input.image_url,
            display_order: input.display_order,
            parent_id,
            children: Vec::new(),
            count: None,
        };
        self.categories.push(category.clone());
        Ok(self.counted(&category))
    }

    pub fn update_category(&mut self, id: &str, input: CategoryInput) -> Result<Category, Failure> {
        require_name(&input.name)?;
        let parent_id = input.parent_id.filter(|p| !p.is_empty());
        self.check_parent(Some(id), parent_id.as_deref())?;
        let category = self
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(Failure::NotFound("Catégorie"))?;
        category.name = input.name;
        category.description = input.description;
        category.image_url = input.image_url;
        category.display_order = input.display_order;
        category.parent_id = parent_id;
        let updated = category.clone();
        Ok(self.counted(&updated))
    }

    /// Only empty leaf categories can be deleted.
    pub fn delete_category(&mut self, id: &str) -> Result<(), Failure> {
        if !self.categories.iter().any(|c| c.id == id) {
            return Err(Failure::NotFound("Catégorie"));
        }
        if !self.children_ids(id).is_empty() {
            return Err(Failure::Conflict(
                "Impossible de supprimer une catégorie qui a des sous-catégories".to_string(),
            ));
        }
        if self.items.iter().any(|i| i.category_id == id) {
            return Err(Failure::Conflict(
                "Impossible de supprimer une catégorie qui contient des produits".to_string(),
            ));
        }
        self.categories.retain(|c| c.id != id);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Items
    // -----------------------------------------------------------------------

    fn with_category(&self, item: &Item) -> Item {
        let category = self
            .categories
            .iter()
            .find(|c| c.id == item.category_id)
            .map(|c| CategoryRef {
                id: c.id.clone(),
                name: c.name.clone(),
            });
        Item {
            category,
            ..item.clone()
        }
    }

    pub fn list_items(&self) -> Vec<Item> {
        self.items.iter().map(|i| self.with_category(i)).collect()
    }

    pub fn get_item(&self, id: &str) -> Result<Item, Failure> {
        self.items
            .iter()
            .find(|i| i.id == id)
            .map(|i| self.with_category(i))
            .ok_or(Failure::NotFound("Produit"))
    }

    /// Items of the "pizza du moment" category and its children.
    pub fn pizza_moment(&self) -> Vec<Item> {
        let Some(moment) = self
            .categories
            .iter()
            .find(|c| c.name.to_lowercase().contains("moment"))
        else {
            return Vec::new();
        };
        let mut ids = self.children_ids(&moment.id);
        ids.push(moment.id.as_str());
        self.items
            .iter()
            .filter(|i| ids.contains(&i.category_id.as_str()))
            .map(|i| self.with_category(i))
            .collect()
    }

    fn build_item(&self, id: String, input: ItemInput) -> Result<Item, Failure> {
        require_name(&input.name)?;
        if !self.categories.iter().any(|c| c.id == input.category_id) {
            return Err(Failure::BadRequest("Catégorie introuvable".to_string()));
        }
        Ok(Item {
            id,
            name: input.name,
            description: input.description,
            status: input.status,
            category_id: input.category_id,
            category: None,
            variants: input
                .variants
                .into_iter()
                .map(|v| Variant {
                    id: new_id(),
                    variant_name: v.variant_name,
                    price: v.price,
                    sku: v.sku,
                })
                .collect(),
            images: input
                .images
                .into_iter()
                .map(|i| Image {
                    id: new_id(),
                    image_url: i.image_url,
                    is_default: i.is_default,
                })
                .collect(),
            options: input
                .options
                .into_iter()
                .map(|o| ItemOption {
                    id: new_id(),
                    option_type: o.option_type,
                    option_value: o.option_value.to_string(),
                })
                .collect(),
        })
    }

    pub fn create_item(&mut self, input: ItemInput) -> Result<Item, Failure> {
        let item = self.build_item(new_id(), input)?;
        self.items.push(item.clone());
        Ok(self.with_category(&item))
    }

    /// Variants, images and options are replaced wholesale.
    pub fn update_item(&mut self, id: &str, input: ItemInput) -> Result<Item, Failure> {
        let position = self
            .items
            .iter()
            .position(|i| i.id == id)
            .ok_or(Failure::NotFound("Produit"))?;
        let item = self.build_item(id.to_string(), input)?;
        self.items[position] = item.clone();
        Ok(self.with_category(&item))
    }

    pub fn delete_item(&mut self, id: &str) -> Result<(), Failure> {
        let before = self.items.len();
        self.items.retain(|i| i.id != id);
        if self.items.len() == before {
            return Err(Failure::NotFound("Produit"));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    pub fn get_event(&self, id: &str) -> Result<Event, Failure> {
        self.events
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or(Failure::NotFound("Événement"))
    }

    pub fn promo_events(&self) -> Vec<Event> {
        self.events
            .iter()
            .filter(|e| e.is_promo && e.status == "Active")
            .cloned()
            .collect()
    }

    /// Ticker lines: the description, or the name when it has none.
    pub fn header_announcements(&self) -> Vec<String> {
        self.events
            .iter()
            .filter(|e| e.show_in_header && e.status == "Active")
            .map(|e| {
                if e.description.trim().is_empty() {
                    e.name.clone()
                } else {
                    e.description.clone()
                }
            })
            .collect()
    }

    fn build_event(id: String, input: EventInput) -> Result<Event, Failure> {
        require_name(&input.name)?;
        Ok(Event {
            id,
            name: input.name,
            description: input.description,
            event_type: input.event_type,
            image_url: input.image_url,
            start_date: input.start_date,
            end_date: input.end_date,
            status: input.status,
            is_promo: input.is_promo,
            show_in_header: input.show_in_header,
        })
    }

    pub fn create_event(&mut self, input: EventInput) -> Result<Event, Failure> {
        let event = Self::build_event(new_id(), input)?;
        self.events.push(event.clone());
        Ok(event)
    }

    pub fn update_event(&mut self, id: &str, input: EventInput) -> Result<Event, Failure> {
        let event = self
            .events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(Failure::NotFound("Événement"))?;
        *event = Self::build_event(id.to_string(), input)?;
        Ok(event.clone())
    }

    pub fn delete_event(&mut self, id: &str) -> Result<(), Failure> {
        let before = self.events.len();
        self.events.retain(|e| e.id != id);
        if self.events.len() == before {
            return Err(Failure::NotFound("Événement"));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Seed
    // -----------------------------------------------------------------------

    /// The restaurant's demo menu.
    pub fn seeded() -> Self {
        let mut store = Store::default();

        store.business.push(BusinessInfo {
            id: "biz-1".to_string(),
            name: "Pizza Le Duc".to_string(),
            slogan: Some("La pizza artisanale au feu de bois".to_string()),
            description: Some("Pizzeria familiale au cœur de Cérons.".to_string()),
            address: Some("12 route de Bordeaux, 33720 Cérons".to_string()),
            phone: Some("05 56 27 00 00".to_string()),
            email: Some("contact@pizzaleduc.fr".to_string()),
            hours: Some(
                r#"{"mardi":"18h-22h","mercredi":"18h-22h","jeudi":"18h-22h","vendredi":"18h-23h","samedi":"18h-23h","dimanche":"18h-22h"}"#
                    .to_string(),
            ),
            logo_url: Some("/logo.png".to_string()),
            url_facebook: Some("https://facebook.com/pizzaleduc".to_string()),
            url_instagram: Some("https://instagram.com/pizzaleduc".to_string()),
            url_linkedin: None,
            uber_eats_url: Some("https://www.ubereats.com/fr/store/pizza-le-duc".to_string()),
        });

        let category = |id: &str, name: &str, order: i32, parent: Option<&str>| Category {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            image_url: None,
            display_order: order,
            parent_id: parent.map(str::to_string),
            children: Vec::new(),
            count: None,
        };
        store.categories = vec![
            category("cat-moment", "Pizza du moment", 0, None),
            category("cat-pizzas", "Nos pizzas", 1, None),
            category("cat-tomate", "Base tomate", 1, Some("cat-pizzas")),
            category("cat-creme", "Base crème", 2, Some("cat-pizzas")),
            category("cat-boissons", "Boissons", 3, None),
            category("cat-softs", "Softs", 1, Some("cat-boissons")),
            category("cat-desserts", "Desserts", 4, None),
        ];

        let pizza = |id: &str,
                     name: &str,
                     cat: &str,
                     small: f64,
                     large: f64,
                     options: &[(&str, &str)]| Item {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            status: "Active".to_string(),
            category_id: cat.to_string(),
            category: None,
            variants: vec![
                Variant {
                    id: format!("{id}-29"),
                    variant_name: "29 cm".to_string(),
                    price: small,
                    sku: None,
                },
                Variant {
                    id: format!("{id}-33"),
                    variant_name: "33 cm".to_string(),
                    price: large,
                    sku: None,
                },
            ],
            images: vec![Image {
                id: format!("{id}-img"),
                image_url: format!("/images/{id}.jpg"),
                is_default: true,
            }],
            options: options
                .iter()
                .enumerate()
                .map(|(n, (kind, value))| ItemOption {
                    id: format!("{id}-opt{n}"),
                    option_type: kind.to_string(),
                    option_value: value.to_string(),
                })
                .collect(),
        };
        store.items = vec![
            pizza(
                "margherita",
                "Margherita",
                "cat-tomate",
                9.5,
                12.0,
                &[
                    ("BASE", r#"["Tomate"]"#),
                    ("ALLERGENES", r#"["Gluten","Lait"]"#),
                    ("VEGETARIENNE", r#""Oui""#),
                ],
            ),
            pizza(
                "reine",
                "Reine",
                "cat-tomate",
                11.0,
                13.5,
                &[
                    ("BASE", r#"["Tomate"]"#),
                    ("ALLERGENES", r#"["Gluten","Lait"]"#),
                    ("VEGETARIENNE", r#""Non""#),
                ],
            ),
            pizza(
                "chevre-miel",
                "Chèvre miel",
                "cat-creme",
                12.0,
                14.5,
                &[
                    ("BASE", r#"["Crème"]"#),
                    ("ALLERGENES", r#"["Gluten","Lait","Fruits à coque"]"#),
                    ("VEGETARIENNE", r#""Oui""#),
                ],
            ),
            pizza(
                "forestiere",
                "La Forestière",
                "cat-moment",
                13.0,
                15.9,
                &[("BASE", r#"["Crème"]"#), ("ALLERGENES", r#"["Gluten","Lait"]"#)],
            ),
            Item {
                id: "coca".to_string(),
                name: "Coca-Cola".to_string(),
                description: Some("Canette 33 cl".to_string()),
                status: "Active".to_string(),
                category_id: "cat-softs".to_string(),
                category: None,
                variants: vec![Variant {
                    id: "coca-33cl".to_string(),
                    variant_name: "33 cl".to_string(),
                    price: 2.5,
                    sku: Some("BOI-COCA".to_string()),
                }],
                images: Vec::new(),
                options: Vec::new(),
            },
        ];

        store.events = vec![
            Event {
                id: "evt-week".to_string(),
                name: "Semaine de la pizza".to_string(),
                description: "-20% sur toutes les pizzas 33 cm".to_string(),
                event_type: Some("Promotion".to_string()),
                image_url: Some("/images/promo-week.jpg".to_string()),
                start_date: Some("2025-01-01T00:00:00Z".to_string()),
                end_date: Some("2099-12-31T23:59:59Z".to_string()),
                status: "Active".to_string(),
                is_promo: true,
                show_in_header: true,
            },
            Event {
                id: "evt-match".to_string(),
                name: "Soirée match".to_string(),
                description: String::new(),
                event_type: Some("Événement".to_string()),
                image_url: None,
                start_date: None,
                end_date: None,
                status: "Active".to_string(),
                is_promo: false,
                show_in_header: true,
            },
            Event {
                id: "evt-old".to_string(),
                name: "Ancienne offre".to_string(),
                description: "Terminée".to_string(),
                event_type: None,
                image_url: None,
                start_date: Some("2020-01-01".to_string()),
                end_date: Some("2020-02-01".to_string()),
                status: "Inactive".to_string(),
                is_promo: true,
                show_in_header: false,
            },
        ];

        store
    }
}

fn require_name(name: &str) -> Result<(), Failure> {
    if name.trim().is_empty() {
        return Err(Failure::BadRequest("Le nom est requis".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_tokens_are_single_use() {
        let mut store = Store::default();
        let (access, refresh) = store.login(ADMIN_EMAIL, ADMIN_PASSWORD).unwrap();
        assert!(store.check_access(&access));

        let (_, rotated) = store.refresh(&refresh).unwrap();
        assert_ne!(rotated, refresh);
        assert!(matches!(store.refresh(&refresh), Err(Failure::InvalidRefreshToken)));
        assert_eq!(store.refresh_count(), 1);
    }

    #[test]
    fn wrong_password_is_rejected() {
        let mut store = Store::default();
        assert!(matches!(
            store.login(ADMIN_EMAIL, "nope"),
            Err(Failure::InvalidCredentials)
        ));
    }

    #[test]
    fn category_count_includes_children() {
        let store = Store::seeded();
        let pizzas = store.get_category("cat-pizzas").unwrap();
        assert_eq!(pizzas.count.unwrap().items, 3);
        assert_eq!(pizzas.children.len(), 2);
        let desserts = store.get_category("cat-desserts").unwrap();
        assert_eq!(desserts.count.unwrap().items, 0);
    }

    #[test]
    fn non_empty_categories_cannot_be_deleted() {
        let mut store = Store::seeded();
        assert!(matches!(store.delete_category("cat-pizzas"), Err(Failure::Conflict(_))));
        assert!(matches!(store.delete_category("cat-tomate"), Err(Failure::Conflict(_))));
        store.delete_category("cat-desserts").unwrap();
        assert!(matches!(
            store.delete_category("cat-desserts"),
            Err(Failure::NotFound(_))
        ));
    }

    #[test]
    fn category_cannot_move_under_its_own_subtree() {
        let mut store = Store::seeded();
        let input = |parent: &str| CategoryInput {
            name: "Pizzas".to_string(),
            description: String::new(),
            image_url: None,
            display_order: 1,
            parent_id: Some(parent.to_string()),
        };
        assert!(matches!(
            store.update_category("cat-pizzas", input("cat-tomate")),
            Err(Failure::BadRequest(_))
        ));
        assert!(matches!(
            store.update_category("cat-pizzas", input("cat-pizzas")),
            Err(Failure::BadRequest(_))
        ));
        assert!(store.get_category("cat-pizzas").unwrap().parent_id.is_none());

        let moved = store.update_category("cat-pizzas", input("cat-moment")).unwrap();
        assert_eq!(moved.parent_id.as_deref(), Some("cat-moment"));
    }

    #[test]
    fn pizza_moment_lists_its_items() {
        let store = Store::seeded();
        let items = store.pizza_moment();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "La Forestière");
        assert_eq!(items[0].category.as_ref().unwrap().name, "Pizza du moment");
    }

    #[test]
    fn header_uses_name_when_description_is_empty() {
        let store = Store::seeded();
        assert_eq!(
            store.header_announcements(),
            vec!["-20% sur toutes les pizzas 33 cm", "Soirée match"]
        );
        assert_eq!(store.promo_events().len(), 1);
    }
}
