//! HTML building blocks shared by the pages.

use std::fmt::Write;

use axum::response::Html;
use carte_core::business::{format_opening_hours, phone_href};
use carte_core::menu::{default_image, display_price, is_available};
use carte_core::promo::TICKER_SEPARATOR;
use carte_core::types::{BusinessInfo, Item};
use carte_core::OptionType;

/// Escape text for element content and quoted attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Percent-encode a query parameter value.
pub fn query_value(value: &str) -> String {
    let mut out = String::new();
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => {
                let _ = write!(out, "%{byte:02X}");
            }
        }
    }
    out
}

/// Google Maps search link for a postal address.
pub fn map_href(address: &str) -> String {
    format!(
        "https://www.google.com/maps/search/?api=1&query={}",
        query_value(address)
    )
}

const STYLE: &str = "body{font-family:system-ui,sans-serif;margin:0;color:#2b2118;background:#fffaf3}\
header,footer,main{padding:1rem 2rem}\
nav a{margin-right:1rem}\
.ticker{background:#b3261e;color:#fff;padding:.4rem 2rem;white-space:nowrap;overflow:hidden}\
.cards{display:grid;grid-template-columns:repeat(auto-fill,minmax(16rem,1fr));gap:1rem}\
.card{background:#fff;border-radius:.5rem;padding:1rem;box-shadow:0 1px 3px #0002}\
.card.unavailable{opacity:.5}\
.tabs a,.chips a{display:inline-block;padding:.3rem .8rem;border-radius:1rem;margin:.2rem}\
.tabs a.active,.chips a.active{background:#b3261e;color:#fff}\
.toast{padding:.6rem 1rem;border-radius:.4rem;margin-bottom:1rem}\
.toast.success{background:#d7f5dd}.toast.error{background:#fde2e0}\
table{border-collapse:collapse;width:100%}td,th{padding:.4rem;border-bottom:1px solid #eee;text-align:left}\
.badge{font-size:.8rem;padding:.1rem .5rem;border-radius:.6rem;background:#eee}";

/// A complete document.
pub fn document(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"fr\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>{} | Pizza Le Duc</title><style>{STYLE}</style></head><body>{body}</body></html>",
        escape(title)
    ))
}

/// Header ticker and footer data around public pages.
#[derive(Debug, Clone, Default)]
pub struct Chrome {
    pub ticker: String,
    pub business: Option<BusinessInfo>,
}

pub fn public_page(title: &str, chrome: &Chrome, main: &str) -> Html<String> {
    let mut body = String::new();
    if !chrome.ticker.is_empty() {
        // Doubled so the scrolling text loops without a gap.
        let _ = write!(
            body,
            "<div class=\"ticker\" role=\"marquee\">{0}{1}{0}</div>",
            escape(&chrome.ticker),
            TICKER_SEPARATOR
        );
    }
    body.push_str(
        "<header><nav><a href=\"/\"><strong>Pizza Le Duc</strong></a>\
         <a href=\"/\">Accueil</a><a href=\"/notre-carte\">Notre carte</a>\
         <a href=\"/pizza-moment\">Pizza du moment</a><a href=\"/nous-trouver\">Nous trouver</a>\
         </nav></header>",
    );
    let _ = write!(body, "<main>{main}</main>");
    body.push_str(&footer(chrome.business.as_ref()));
    document(title, &body)
}

fn footer(business: Option<&BusinessInfo>) -> String {
    let Some(info) = business else {
        return "<footer><p>Pizza Le Duc</p></footer>".to_string();
    };
    let mut out = String::from("<footer>");
    let _ = write!(out, "<h3>{}</h3>", escape(&info.name));
    if let Some(slogan) = &info.slogan {
        let _ = write!(out, "<p><em>{}</em></p>", escape(slogan));
    }
    if let Some(address) = &info.address {
        let _ = write!(out, "<p>{}</p>", escape(address));
    }
    if let Some(phone) = &info.phone {
        let _ = write!(
            out,
            "<p><a href=\"{}\">{}</a></p>",
            escape(&phone_href(phone)),
            escape(phone)
        );
    }
    if let Some(email) = &info.email {
        let _ = write!(
            out,
            "<p><a href=\"mailto:{0}\">{0}</a></p>",
            escape(email)
        );
    }
    let _ = write!(
        out,
        "<p>Horaires : {}</p>",
        escape(&format_opening_hours(info.hours.as_deref()))
    );
    let links = [
        ("Facebook", &info.url_facebook),
        ("Instagram", &info.url_instagram),
        ("LinkedIn", &info.url_linkedin),
        ("Uber Eats", &info.uber_eats_url),
    ];
    for (label, url) in links {
        if let Some(url) = url {
            let _ = write!(out, "<a href=\"{}\">{label}</a> ", escape(url));
        }
    }
    out.push_str("</footer>");
    out
}

/// Outcome message shown at the top of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    pub fn render(&self) -> String {
        match self {
            Notice::Success(m) => format!("<div class=\"toast success\">{}</div>", escape(m)),
            Notice::Error(m) => format!("<div class=\"toast error\">{}</div>", escape(m)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminTab {
    Items,
    Categories,
    Events,
}

pub fn admin_page(title: &str, tab: AdminTab, notice: Option<&Notice>, main: &str) -> Html<String> {
    let link = |href: &str, label: &str, this: AdminTab| {
        let class = if this == tab { " class=\"active\"" } else { "" };
        format!("<a href=\"{href}\"{class}>{label}</a>")
    };
    let body = format!(
        "<header><nav class=\"tabs\"><strong>Administration</strong> {}{}{}\
         <a href=\"/\">Voir le site</a>\
         <form method=\"post\" action=\"/logout\" style=\"display:inline\">\
         <button type=\"submit\">Déconnexion</button></form></nav></header>\
         <main><h1>{}</h1>{}{main}</main>",
        link("/admin/items", "Produits", AdminTab::Items),
        link("/admin/categories", "Catégories", AdminTab::Categories),
        link("/admin/events", "Événements", AdminTab::Events),
        escape(title),
        notice.map(Notice::render).unwrap_or_default(),
    );
    document(title, &body)
}

/// Menu card linking to the customisation page.
pub fn item_card(item: &Item, selected_size: Option<&str>) -> String {
    let mut out = String::new();
    let class = if is_available(item) {
        "card"
    } else {
        "card unavailable"
    };
    let _ = write!(out, "<article class=\"{class}\">");
    if let Some(image) = default_image(item) {
        let _ = write!(
            out,
            "<img src=\"{}\" alt=\"{}\" width=\"240\">",
            escape(&image.image_url),
            escape(&item.name)
        );
    }
    let _ = write!(out, "<h3>{}", escape(&item.name));
    if item.is_vegetarian() {
        out.push_str(" <span class=\"badge\" title=\"Végétarienne\">🌱</span>");
    }
    out.push_str("</h3>");
    if item.has_option(OptionType::Base) {
        let _ = write!(out, "<p class=\"base\">{}</p>", escape(&item.base_description()));
    }
    if let Some(description) = item.description.as_deref().filter(|d| !d.is_empty()) {
        let _ = write!(out, "<p>{}</p>", escape(description));
    }
    let allergens = item.allergens();
    if !allergens.is_empty() {
        let _ = write!(
            out,
            "<p class=\"allergens\">Allergènes : {}</p>",
            escape(&allergens.join(", "))
        );
    }
    let _ = write!(
        out,
        "<p class=\"price\"><strong>{}</strong></p>",
        escape(&display_price(item, selected_size))
    );
    if is_available(item) {
        let mut href = format!("/notre-carte/items/{}", query_value(&item.id));
        if let Some(size) = selected_size {
            let _ = write!(href, "?variant={}", query_value(size));
        }
        let _ = write!(out, "<a href=\"{}\">Personnaliser</a>", escape(&href));
    } else {
        out.push_str("<p><em>Indisponible</em></p>");
    }
    out.push_str("</article>");
    out
}
