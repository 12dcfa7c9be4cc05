//! Home, menu and item customisation pages.

use std::fmt::Write;

use axum::{
    extract::{Path, Query, State},
    response::Html,
};
use carte_core::business::{format_opening_hours, phone_href, primary};
use carte_core::format::format_price_plain;
use carte_core::menu::{category_icon, default_category_id, default_image, MenuFilter, MenuView};
use carte_core::order::OrderDraft;
use carte_core::promo::{fallback_announcements, ticker_text, Carousel, PromoSlide};
use carte_core::{ApiError, OptionType, OptionValue};
use chrono::Utc;
use serde::Deserialize;
use tracing::warn;

use crate::error::SiteError;
use crate::html::{escape, item_card, map_href, public_page, query_value, Chrome};
use crate::session::ApiSession;
use crate::AppState;

/// Ticker and footer. Both degrade instead of failing the page.
async fn chrome(session: &ApiSession) -> Chrome {
    let (header, business) = tokio::join!(session.events().header(), session.business().list());
    let announcements = header.unwrap_or_else(|e| {
        warn!("header announcements unavailable: {e}");
        fallback_announcements()
    });
    let business = business
        .map(|records| primary(&records).cloned())
        .unwrap_or_else(|e| {
            warn!("business info unavailable: {e}");
            None
        });
    Chrome {
        ticker: ticker_text(&announcements),
        business,
    }
}

fn or_empty<T>(result: Result<Vec<T>, ApiError>, what: &str) -> Vec<T> {
    result.unwrap_or_else(|e| {
        warn!("{what} unavailable: {e}");
        Vec::new()
    })
}

// ---------------------------------------------------------------------------
// Home
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct HomeQuery {
    pub slide: Option<usize>,
}

pub async fn home(State(state): State<AppState>, Query(query): Query<HomeQuery>) -> Html<String> {
    let session = state.sessions.public();
    let (chrome, promos, moment) = tokio::join!(
        chrome(&session),
        session.events().promo(),
        session.items().pizza_moment()
    );
    let promos = or_empty(promos, "promotions");
    let moment = or_empty(moment, "pizza du moment");

    let mut main = String::new();

    let now = Utc::now();
    let slides: Vec<PromoSlide> = promos
        .iter()
        .map(|e| PromoSlide::from_event(e, now))
        .filter(|s| s.active)
        .collect();
    if !slides.is_empty() {
        let carousel = Carousel::at(slides.len(), query.slide.unwrap_or(0));
        let slide = &slides[carousel.index()];
        let _ = write!(
            main,
            "<section class=\"promo\"><h2>Nos promotions</h2>\
             <article class=\"card\"><img src=\"{}\" alt=\"\" width=\"480\">\
             <span class=\"badge\">{}</span><h3>{}</h3><p>{}</p>",
            escape(&slide.image_url),
            escape(&slide.label),
            escape(&slide.title),
            escape(&slide.description)
        );
        match (&slide.starts, &slide.ends) {
            (Some(starts), Some(ends)) => {
                let _ = write!(main, "<p>Du {} au {}</p>", escape(starts), escape(ends));
            }
            (None, Some(ends)) => {
                let _ = write!(main, "<p>Jusqu'au {}</p>", escape(ends));
            }
            _ => {}
        }
        if let Some(left) = slide.countdown {
            let _ = write!(
                main,
                "<p class=\"countdown\">Plus que {}j {}h {}min</p>",
                left.days, left.hours, left.minutes
            );
        }
        main.push_str("</article>");
        if slides.len() > 1 {
            let _ = write!(
                main,
                "<nav><a href=\"/?slide={}\">‹ Précédente</a> {} / {} \
                 <a href=\"/?slide={}\">Suivante ›</a></nav>",
                carousel.prev_index(),
                carousel.index() + 1,
                slides.len(),
                carousel.next_index()
            );
        }
        main.push_str("</section>");
    }

    main.push_str("<section class=\"moment\"><h2>La pizza du moment</h2>");
    if moment.is_empty() {
        main.push_str("<p>Revenez bientôt pour découvrir notre prochaine création !</p>");
    } else {
        main.push_str("<div class=\"cards\">");
        for item in &moment {
            main.push_str(&item_card(item, None));
        }
        main.push_str("</div>");
    }
    main.push_str("<p><a href=\"/notre-carte\">Découvrir toute la carte</a></p></section>");

    public_page("Accueil", &chrome, &main)
}

// ---------------------------------------------------------------------------
// Pizza du moment and location
// ---------------------------------------------------------------------------

pub async fn pizza_moment(State(state): State<AppState>) -> Result<Html<String>, SiteError> {
    let session = state.sessions.public();
    let (chrome, moment) = tokio::join!(chrome(&session), session.items().pizza_moment());
    let moment = moment?;

    let mut main = String::from(
        "<h1>La pizza du moment</h1>\
         <p>Notre sélection de pizzas artisanales, renouvelée au fil des saisons.</p>",
    );
    if moment.is_empty() {
        main.push_str("<p>Revenez bientôt pour découvrir notre prochaine création !</p>");
    } else {
        main.push_str("<div class=\"cards\">");
        for item in &moment {
            main.push_str(&item_card(item, None));
        }
        main.push_str("</div>");
    }
    main.push_str("<p><a href=\"/notre-carte\">Voir toute la carte</a></p>");
    Ok(public_page("Pizza du moment", &chrome, &main))
}

pub async fn find_us(State(state): State<AppState>) -> Html<String> {
    let session = state.sessions.public();
    let chrome = chrome(&session).await;

    let mut main = String::from(
        "<h1>Où manger chez Pizza Le Duc ?</h1>\
         <p><a class=\"cta\" href=\"/notre-carte\">Je commande une pizza</a></p>",
    );
    let Some(info) = &chrome.business else {
        main.push_str("<p>Nos coordonnées seront bientôt disponibles.</p>");
        return public_page("Nous trouver", &chrome, &main);
    };
    if let Some(address) = &info.address {
        let _ = write!(
            main,
            "<section><h2>Notre adresse</h2><p>{}</p>\
             <p><a href=\"{}\">Ouvrir dans Google Maps</a></p></section>",
            escape(address),
            escape(&map_href(address))
        );
    }
    let _ = write!(
        main,
        "<section><h2>Heures d'ouverture</h2><p>{}</p></section>",
        escape(&format_opening_hours(info.hours.as_deref()))
    );
    main.push_str("<section><h2>Pour commander</h2>");
    if let Some(phone) = &info.phone {
        let _ = write!(
            main,
            "<p>Par téléphone : <a href=\"{}\">{}</a></p>",
            escape(&phone_href(phone)),
            escape(phone)
        );
    }
    if let Some(url) = &info.uber_eats_url {
        let _ = write!(main, "<p><a href=\"{}\">Sur Uber Eats</a></p>", escape(url));
    }
    main.push_str("</section>");
    public_page("Nous trouver", &chrome, &main)
}

// ---------------------------------------------------------------------------
// Menu
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct MenuQuery {
    pub category: Option<String>,
    pub size: Option<String>,
    pub vegetarian: Option<String>,
}

impl MenuQuery {
    fn filter(&self) -> MenuFilter {
        MenuFilter {
            vegetarian_only: matches!(self.vegetarian.as_deref(), Some("1" | "true" | "on")),
            size: self.size.clone().filter(|s| !s.is_empty()),
        }
    }
}

fn menu_href(category: &str, filter: &MenuFilter) -> String {
    let mut href = format!("/notre-carte?category={}", query_value(category));
    if let Some(size) = &filter.size {
        let _ = write!(href, "&size={}", query_value(size));
    }
    if filter.vegetarian_only {
        href.push_str("&vegetarian=1");
    }
    href
}

pub async fn menu(
    State(state): State<AppState>,
    Query(query): Query<MenuQuery>,
) -> Result<Html<String>, SiteError> {
    let session = state.sessions.public();
    let (chrome, categories, items) = tokio::join!(
        chrome(&session),
        session.categories().list(),
        session.items().list()
    );
    let categories = categories?;
    let items = items?;

    let selected_id = query
        .category
        .clone()
        .filter(|c| !c.is_empty())
        .or_else(|| default_category_id(&categories).map(str::to_string));
    let selected = match &selected_id {
        Some(id) => match session.categories().get(id).await {
            Ok(category) => Some(category),
            Err(ApiError::NotFound) => None,
            Err(e) => return Err(e.into()),
        },
        None => None,
    };

    let filter = query.filter();
    let view = MenuView::build(&categories, selected.as_ref(), &items, filter);

    let mut main = String::from("<h1>Notre carte</h1>");
    if view.tabs.is_empty() {
        main.push_str("<p>La carte est en cours de préparation.</p>");
        return Ok(public_page("Notre carte", &chrome, &main));
    }

    main.push_str("<nav class=\"tabs\">");
    for tab in &view.tabs {
        let active = view.selected.is_some_and(|s| s.id == tab.id);
        let icon = match &tab.image_url {
            Some(url) => format!("<img src=\"{}\" alt=\"\" width=\"24\">", escape(url)),
            None => category_icon(&tab.name).to_string(),
        };
        let _ = write!(
            main,
            "<a href=\"{}\"{}>{icon} {}</a>",
            escape(&menu_href(&tab.id, &MenuFilter::default())),
            if active { " class=\"active\"" } else { "" },
            escape(&tab.name)
        );
    }
    main.push_str("</nav>");

    let Some(category) = view.selected else {
        main.push_str("<p>Catégorie introuvable.</p>");
        return Ok(public_page("Notre carte", &chrome, &main));
    };

    main.push_str("<div class=\"chips\">");
    for size in &view.available_sizes {
        let mut toggled = view.filter.clone();
        toggled.toggle_size(size);
        let active = view.filter.size.as_deref() == Some(size.as_str());
        let _ = write!(
            main,
            "<a href=\"{}\"{}>{}</a>",
            escape(&menu_href(&category.id, &toggled)),
            if active { " class=\"active\"" } else { "" },
            escape(size)
        );
    }
    let mut veg = view.filter.clone();
    veg.vegetarian_only = !veg.vegetarian_only;
    let _ = write!(
        main,
        "<a href=\"{}\"{}>🌱 Végétarien</a></div>",
        escape(&menu_href(&category.id, &veg)),
        if view.filter.vegetarian_only {
            " class=\"active\""
        } else {
            ""
        }
    );

    if view.is_empty() {
        main.push_str("<p>Aucun produit ne correspond à vos critères.</p>");
    }
    for section in &view.sections {
        let _ = write!(
            main,
            "<section><h2>{}</h2><div class=\"cards\">",
            escape(&section.title)
        );
        for item in &section.items {
            main.push_str(&item_card(item, view.filter.size.as_deref()));
        }
        main.push_str("</div></section>");
    }

    Ok(public_page("Notre carte", &chrome, &main))
}

// ---------------------------------------------------------------------------
// Item customisation
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ItemQuery {
    pub variant: Option<String>,
    pub quantity: Option<u32>,
    pub base: Option<String>,
}

fn item_href(id: &str, variant: Option<&str>, quantity: u32, base: Option<&str>) -> String {
    let mut href = format!("/notre-carte/items/{}?quantity={quantity}", query_value(id));
    if let Some(variant) = variant {
        let _ = write!(href, "&variant={}", query_value(variant));
    }
    if let Some(base) = base {
        let _ = write!(href, "&base={}", query_value(base));
    }
    href
}

pub async fn item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ItemQuery>,
) -> Result<Html<String>, SiteError> {
    let session = state.sessions.public();
    let (chrome, item) = tokio::join!(chrome(&session), session.items().get(&id));
    let item = item?;

    let quantity = query.quantity.unwrap_or(1);
    let draft = OrderDraft::for_selection(&item, query.variant.as_deref(), quantity)
        .with_base(query.base.clone());
    let variant_key = draft
        .variant
        .as_ref()
        .map(|v| v.id.clone().unwrap_or_else(|| v.variant_name.clone()));
    let base = draft.base.clone();

    let mut main = format!("<article class=\"card\"><h1>{}</h1>", escape(&item.name));
    if let Some(image) = default_image(&item) {
        let _ = write!(
            main,
            "<img src=\"{}\" alt=\"{}\" width=\"320\">",
            escape(&image.image_url),
            escape(&item.name)
        );
    }
    if let Some(description) = item.description.as_deref().filter(|d| !d.is_empty()) {
        let _ = write!(main, "<p>{}</p>", escape(description));
    }
    if item.is_vegetarian() {
        main.push_str("<p><span class=\"badge\">🌱 Végétarienne</span></p>");
    }
    let allergens = item.allergens();
    if !allergens.is_empty() {
        let _ = write!(
            main,
            "<p>Allergènes : {}</p>",
            escape(&allergens.join(", "))
        );
    }

    if !item.variants.is_empty() {
        main.push_str("<h2>Taille</h2><div class=\"chips\">");
        for variant in &item.variants {
            let key = variant.id.clone().unwrap_or_else(|| variant.variant_name.clone());
            let active = variant_key.as_deref() == Some(key.as_str());
            let _ = write!(
                main,
                "<a href=\"{}\"{}>{} · {}</a>",
                escape(&item_href(&item.id, Some(&key), draft.quantity(), base.as_deref())),
                if active { " class=\"active\"" } else { "" },
                escape(&variant.variant_name),
                escape(&format_price_plain(variant.price))
            );
        }
        main.push_str("</div>");
    }

    if let Some(OptionValue::Many(bases)) = item.option_value(OptionType::Base) {
        if bases.len() > 1 {
            main.push_str("<h2>Base</h2><div class=\"chips\">");
            for choice in &bases {
                let active = base.as_deref() == Some(choice.as_str());
                let _ = write!(
                    main,
                    "<a href=\"{}\"{}>{}</a>",
                    escape(&item_href(
                        &item.id,
                        variant_key.as_deref(),
                        draft.quantity(),
                        Some(choice)
                    )),
                    if active { " class=\"active\"" } else { "" },
                    escape(choice)
                );
            }
            main.push_str("</div>");
        } else if let Some(only) = bases.first() {
            let _ = write!(main, "<p>Base : {}</p>", escape(only));
        }
    }

    let mut less = draft.clone();
    less.decrement();
    let mut more = draft.clone();
    more.increment();
    let _ = write!(
        main,
        "<h2>Quantité</h2><p><a href=\"{}\">−</a> <strong>{}</strong> <a href=\"{}\">+</a></p>",
        escape(&item_href(&item.id, variant_key.as_deref(), less.quantity(), base.as_deref())),
        draft.quantity(),
        escape(&item_href(&item.id, variant_key.as_deref(), more.quantity(), base.as_deref()))
    );

    // Summary of the order.
    let _ = write!(
        main,
        "<section class=\"summary\"><h2>Récapitulatif</h2><p>{} × {}",
        draft.quantity(),
        escape(&draft.item_name)
    );
    if let Some(variant) = &draft.variant {
        let _ = write!(main, " ({})", escape(&variant.variant_name));
    }
    if let Some(base) = &draft.base {
        let _ = write!(main, ", base {}", escape(&base.to_lowercase()));
    }
    let _ = write!(
        main,
        "</p><p>Prix unitaire : {}</p><p><strong>Total : {}</strong></p>",
        escape(&format_price_plain(draft.unit_price())),
        escape(&format_price_plain(draft.total()))
    );
    if let Some(url) = chrome.business.as_ref().and_then(|b| b.uber_eats_url.as_deref()) {
        let _ = write!(
            main,
            "<p><a href=\"{}\">Commander sur Uber Eats</a></p>",
            escape(url)
        );
    }
    if let Some(phone) = chrome.business.as_ref().and_then(|b| b.phone.as_deref()) {
        let _ = write!(
            main,
            "<p>Ou par téléphone au <a href=\"{}\">{}</a></p>",
            escape(&phone_href(phone)),
            escape(phone)
        );
    }
    main.push_str("</section><p><a href=\"/notre-carte\">← Retour à la carte</a></p></article>");

    Ok(public_page(&item.name, &chrome, &main))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_query_reads_filters() {
        let query = MenuQuery {
            category: Some("c1".to_string()),
            size: Some(String::new()),
            vegetarian: Some("1".to_string()),
        };
        let filter = query.filter();
        assert!(filter.vegetarian_only);
        assert!(filter.size.is_none());
    }

    #[test]
    fn menu_links_keep_filters() {
        let filter = MenuFilter {
            vegetarian_only: true,
            size: Some("33 cm".to_string()),
        };
        assert_eq!(
            menu_href("c1", &filter),
            "/notre-carte?category=c1&size=33%20cm&vegetarian=1"
        );
    }

    #[test]
    fn item_links_carry_selection() {
        assert_eq!(
            item_href("reine", Some("v33"), 2, Some("Crème")),
            "/notre-carte/items/reine?quantity=2&variant=v33&base=Cr%C3%A8me"
        );
    }
}
