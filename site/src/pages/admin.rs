//! Admin back-office: items, categories and events CRUD.
//!
//! Forms post back to the page that rendered them. The item form's list
//! editing (add/remove a variant, an image or an option) is a submit button
//! named `action`; the handler applies it to the form state and renders the
//! form again, so nothing is saved until `action=save`.

use std::fmt::Write;

use axum::{
    extract::{Form, Path, Query},
    response::{Html, IntoResponse, Redirect, Response},
};
use carte_core::admin::{
    CategoryForm, EventForm, EventRow, ItemForm, ItemRow, STATUS_ACTIVE, STATUS_INACTIVE,
};
use carte_core::menu::{category_tree, descendant_ids};
use carte_core::{ApiError, Category, OptionType};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::SiteError;
use crate::html::{admin_page, escape, AdminTab, Notice};
use crate::session::ApiSession;
use crate::sessions::Admin;

type Pairs = Vec<(String, String)>;

#[derive(Debug, Default, Deserialize)]
pub struct NoticeQuery {
    pub notice: Option<String>,
}

impl NoticeQuery {
    fn notice(&self) -> Option<Notice> {
        let message = match self.notice.as_deref()? {
            "item-created" => "Produit créé avec succès",
            "item-updated" => "Produit mis à jour avec succès",
            "item-deleted" => "Produit supprimé avec succès",
            "category-created" => "Catégorie créée avec succès",
            "category-updated" => "Catégorie mise à jour avec succès",
            "category-deleted" => "Catégorie supprimée avec succès",
            "event-created" => "Événement créé avec succès",
            "event-updated" => "Événement mis à jour avec succès",
            "event-deleted" => "Événement supprimé avec succès",
            _ => return None,
        };
        Some(Notice::Success(message.to_string()))
    }
}

/// Turn a failed save into a message for the form, or into a page-level
/// error when the session is gone or the record vanished.
fn save_failure(e: ApiError) -> Result<Notice, SiteError> {
    match SiteError::from(e) {
        SiteError::Api(e) => {
            warn!("save rejected: {e}");
            Ok(Notice::Error(e.server_message().unwrap_or_else(|| {
                "Une erreur est survenue lors de l'enregistrement".to_string()
            })))
        }
        SiteError::Validation(message) => Ok(Notice::Error(format!("Formulaire invalide : {message}"))),
        other => Err(other),
    }
}

fn redirect(to: &str) -> Response {
    Redirect::to(to).into_response()
}

fn value<'a>(pairs: &'a [(String, String)], key: &str) -> &'a str {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
        .unwrap_or("")
}

fn values<'a>(pairs: &'a [(String, String)], key: &str) -> Vec<&'a str> {
    pairs
        .iter()
        .filter(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
        .collect()
}

/// Accepts `12,50` as well as `12.50`. Unreadable prices count as zero and
/// are dropped from the payload.
fn parse_price(raw: &str) -> f64 {
    raw.trim().replace(',', ".").parse().unwrap_or(0.0)
}

pub async fn index(_admin: Admin) -> Response {
    redirect("/admin/items")
}

fn delete_button(action: &str, confirm: &str) -> String {
    format!(
        "<form method=\"post\" action=\"{}\" style=\"display:inline\" \
         onsubmit=\"return confirm('{}')\"><button type=\"submit\">Supprimer</button></form>",
        escape(action),
        escape(confirm)
    )
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum ItemAction {
    Save,
    AddVariant,
    RemoveVariant(usize),
    AddImage,
    RemoveImage(usize),
    AddOption(OptionType),
    RemoveOption(OptionType),
}

impl ItemAction {
    fn parse(raw: &str) -> ItemAction {
        let (verb, arg) = raw.split_once(':').unwrap_or((raw, ""));
        let index = arg.parse::<usize>().ok();
        let option = OptionType::parse(arg);
        match (verb, index, option) {
            ("add_variant", _, _) => ItemAction::AddVariant,
            ("remove_variant", Some(i), _) => ItemAction::RemoveVariant(i),
            ("add_image", _, _) => ItemAction::AddImage,
            ("remove_image", Some(i), _) => ItemAction::RemoveImage(i),
            ("add_option", _, Some(t)) => ItemAction::AddOption(t),
            ("remove_option", _, Some(t)) => ItemAction::RemoveOption(t),
            _ => ItemAction::Save,
        }
    }

    fn apply(&self, form: &mut ItemForm) {
        match *self {
            ItemAction::Save => {}
            ItemAction::AddVariant => form.add_variant(),
            ItemAction::RemoveVariant(i) => form.remove_variant(i),
            ItemAction::AddImage => form.add_image(),
            ItemAction::RemoveImage(i) => form.remove_image(i),
            ItemAction::AddOption(t) => form.add_option(t),
            ItemAction::RemoveOption(t) => form.remove_option(t),
        }
    }
}

fn option_label(option_type: OptionType) -> &'static str {
    match option_type {
        OptionType::Allergenes => "Allergènes",
        OptionType::Vegetarienne => "Végétarienne",
        OptionType::Base => "Base",
    }
}

/// Rebuild the form state from the posted fields.
fn item_form_from_pairs(pairs: &[(String, String)]) -> ItemForm {
    let mut form = ItemForm {
        name: value(pairs, "name").to_string(),
        description: value(pairs, "description").to_string(),
        category_id: value(pairs, "categoryId").to_string(),
        status: match value(pairs, "status") {
            "" => STATUS_ACTIVE.to_string(),
            status => status.to_string(),
        },
        variants: Vec::new(),
        images: Vec::new(),
        options: Vec::new(),
    };

    let prices = values(pairs, "variant_price");
    let skus = values(pairs, "variant_sku");
    for (i, name) in values(pairs, "variant_name").into_iter().enumerate() {
        form.add_variant();
        if let Some(variant) = form.variant_mut(i) {
            variant.variant_name = name.to_string();
            variant.price = prices.get(i).map(|p| parse_price(p)).unwrap_or(0.0);
            variant.sku = skus.get(i).map(|s| s.to_string());
        }
    }

    let default_image = value(pairs, "image_default").parse::<usize>().ok();
    for (i, url) in values(pairs, "image_url").into_iter().enumerate() {
        form.add_image();
        if let Some(image) = form.image_mut(i) {
            image.image_url = url.to_string();
            image.is_default = default_image == Some(i);
        }
    }

    for raw in values(pairs, "opt_enabled") {
        let Some(option_type) = OptionType::parse(raw) else {
            continue;
        };
        form.add_option(option_type);
        let field = format!("opt_{}", option_type.as_str());
        if option_type.is_multi_valued() {
            for checked in values(pairs, &field) {
                form.toggle_option_value(option_type, checked, true);
            }
        } else {
            let chosen = value(pairs, &field);
            if !chosen.is_empty() {
                form.set_option_value(option_type, chosen);
            }
        }
    }

    form
}

fn category_options(nodes: &[Category], depth: usize, selected: &str, out: &mut String) {
    for node in nodes {
        let _ = write!(
            out,
            "<option value=\"{}\"{}>{}{}</option>",
            escape(&node.id),
            if node.id == selected { " selected" } else { "" },
            "— ".repeat(depth),
            escape(&node.name)
        );
        category_options(&node.children, depth + 1, selected, out);
    }
}

fn render_item_form(form: &ItemForm, categories: &[Category], action: &str) -> String {
    // Enter in a text field submits with the first button of the form.
    let mut out = format!(
        "<form method=\"post\" action=\"{}\">\
         <button name=\"action\" value=\"save\" tabindex=\"-1\" aria-hidden=\"true\" \
         style=\"position:absolute;left:-10000px\">Enregistrer</button>",
        escape(action)
    );
    let _ = write!(
        out,
        "<p><label>Nom * <input name=\"name\" value=\"{}\"></label></p>\
         <p><label>Description <textarea name=\"description\">{}</textarea></label></p>",
        escape(&form.name),
        escape(&form.description)
    );

    out.push_str("<p><label>Catégorie * <select name=\"categoryId\"><option value=\"\">Choisir…</option>");
    category_options(&category_tree(categories), 0, &form.category_id, &mut out);
    out.push_str("</select></label></p>");

    let _ = write!(
        out,
        "<p><label>Statut <select name=\"status\">\
         <option value=\"{STATUS_ACTIVE}\"{}>Actif</option>\
         <option value=\"{STATUS_INACTIVE}\"{}>Inactif</option></select></label></p>",
        if form.status == STATUS_ACTIVE { " selected" } else { "" },
        if form.status == STATUS_ACTIVE { "" } else { " selected" },
    );

    out.push_str("<fieldset><legend>Variantes</legend>");
    for (i, variant) in form.variants.iter().enumerate() {
        let _ = write!(
            out,
            "<p><input name=\"variant_name\" placeholder=\"Taille\" value=\"{}\"> \
             <input name=\"variant_price\" placeholder=\"Prix\" inputmode=\"decimal\" value=\"{}\"> \
             <input name=\"variant_sku\" placeholder=\"SKU\" value=\"{}\"> \
             <button name=\"action\" value=\"remove_variant:{i}\">Retirer</button></p>",
            escape(&variant.variant_name),
            if variant.price > 0.0 {
                variant.price.to_string()
            } else {
                String::new()
            },
            escape(variant.sku.as_deref().unwrap_or(""))
        );
    }
    out.push_str(
        "<button name=\"action\" value=\"add_variant\">Ajouter une variante</button></fieldset>",
    );

    out.push_str("<fieldset><legend>Images</legend>");
    for (i, image) in form.images.iter().enumerate() {
        let _ = write!(
            out,
            "<p><input name=\"image_url\" placeholder=\"URL de l'image\" value=\"{}\"> \
             <label><input type=\"radio\" name=\"image_default\" value=\"{i}\"{}> Par défaut</label> \
             <button name=\"action\" value=\"remove_image:{i}\">Retirer</button></p>",
            escape(&image.image_url),
            if image.is_default { " checked" } else { "" }
        );
    }
    out.push_str("<button name=\"action\" value=\"add_image\">Ajouter une image</button></fieldset>");

    out.push_str("<fieldset><legend>Options</legend>");
    for option_type in OptionType::ALL {
        let label = option_label(option_type);
        let key = option_type.as_str();
        let Some(current) = form.option(option_type) else {
            let _ = write!(
                out,
                "<button name=\"action\" value=\"add_option:{key}\">Ajouter {label}</button> "
            );
            continue;
        };
        let _ = write!(
            out,
            "<div><input type=\"hidden\" name=\"opt_enabled\" value=\"{key}\"><strong>{label}</strong> "
        );
        let input = if option_type.is_multi_valued() {
            "checkbox"
        } else {
            "radio"
        };
        for allowed in option_type.allowed_values() {
            let _ = write!(
                out,
                "<label><input type=\"{input}\" name=\"opt_{key}\" value=\"{}\"{}> {}</label> ",
                escape(allowed),
                if current.contains(allowed) { " checked" } else { "" },
                escape(allowed)
            );
        }
        let _ = write!(
            out,
            "<button name=\"action\" value=\"remove_option:{key}\">Retirer</button></div>"
        );
    }
    out.push_str("</fieldset>");

    out.push_str(
        "<p><button name=\"action\" value=\"save\">Enregistrer</button> \
         <a href=\"/admin/items\">Annuler</a></p></form>",
    );
    out
}

async fn items_page(session: &ApiSession, notice: Option<Notice>) -> Result<Html<String>, SiteError> {
    let (items, categories) = tokio::join!(session.items().list(), session.categories().list());
    let items = items?;
    let categories = categories?;

    let mut main = String::from(
        "<p><a href=\"/admin/items/new\">Ajouter un produit</a></p>\
         <table><thead><tr><th></th><th>Nom</th><th>Catégorie</th><th>Détails</th>\
         <th>Statut</th><th>Prix</th><th></th></tr></thead><tbody>",
    );
    if items.is_empty() {
        main.push_str("<tr><td colspan=\"7\">Aucun produit pour le moment.</td></tr>");
    }
    for item in &items {
        let row = ItemRow::from_item(item, &categories);
        let image = row
            .image_url
            .as_deref()
            .map(|url| format!("<img src=\"{}\" alt=\"\" width=\"48\">", escape(url)))
            .unwrap_or_default();
        let _ = write!(
            main,
            "<tr><td>{image}</td><td>{}</td><td>{}</td><td>{}</td>\
             <td><span class=\"badge\">{}</span></td><td>{}</td>\
             <td><a href=\"/admin/items/{}/edit\">Modifier</a> {}</td></tr>",
            escape(&row.name),
            escape(&row.category),
            escape(&row.details),
            row.status,
            escape(&row.price),
            escape(&row.id),
            delete_button(
                &format!("/admin/items/{}/delete", row.id),
                "Êtes-vous sûr de vouloir supprimer ce produit ?"
            )
        );
    }
    main.push_str("</tbody></table>");
    Ok(admin_page("Produits", AdminTab::Items, notice.as_ref(), &main))
}

pub async fn items(admin: Admin, Query(query): Query<NoticeQuery>) -> Result<Html<String>, SiteError> {
    items_page(&admin.session, query.notice()).await
}

async fn item_form_page(
    session: &ApiSession,
    form: &ItemForm,
    action: &str,
    title: &str,
    notice: Option<Notice>,
) -> Result<Html<String>, SiteError> {
    let categories = session.categories().list().await?;
    let main = render_item_form(form, &categories, action);
    Ok(admin_page(title, AdminTab::Items, notice.as_ref(), &main))
}

pub async fn new_item(admin: Admin) -> Result<Html<String>, SiteError> {
    item_form_page(
        &admin.session,
        &ItemForm::new(),
        "/admin/items/new",
        "Ajouter un produit",
        None,
    )
    .await
}

pub async fn create_item(admin: Admin, Form(pairs): Form<Pairs>) -> Result<Response, SiteError> {
    let mut form = item_form_from_pairs(&pairs);
    let action = ItemAction::parse(value(&pairs, "action"));
    let title = "Ajouter un produit";
    if action != ItemAction::Save {
        action.apply(&mut form);
        return Ok(item_form_page(&admin.session, &form, "/admin/items/new", title, None)
            .await?
            .into_response());
    }

    let outcome = match form.to_payload() {
        Ok(payload) => admin.session.items().create(&payload).await,
        Err(e) => Err(e),
    };
    match outcome {
        Ok(item) => {
            info!(id = %item.id, "item created");
            Ok(redirect("/admin/items?notice=item-created"))
        }
        Err(e) => {
            let notice = save_failure(e)?;
            Ok(
                item_form_page(&admin.session, &form, "/admin/items/new", title, Some(notice))
                    .await?
                    .into_response(),
            )
        }
    }
}

pub async fn edit_item(admin: Admin, Path(id): Path<String>) -> Result<Html<String>, SiteError> {
    let item = admin.session.items().get(&id).await?;
    item_form_page(
        &admin.session,
        &ItemForm::from_item(&item),
        &format!("/admin/items/{id}/edit"),
        "Modifier le produit",
        None,
    )
    .await
}

pub async fn update_item(
    admin: Admin,
    Path(id): Path<String>,
    Form(pairs): Form<Pairs>,
) -> Result<Response, SiteError> {
    let mut form = item_form_from_pairs(&pairs);
    let action = ItemAction::parse(value(&pairs, "action"));
    let target = format!("/admin/items/{id}/edit");
    let title = "Modifier le produit";
    if action != ItemAction::Save {
        action.apply(&mut form);
        return Ok(item_form_page(&admin.session, &form, &target, title, None)
            .await?
            .into_response());
    }

    let outcome = match form.to_payload() {
        Ok(payload) => admin.session.items().update(&id, &payload).await,
        Err(e) => Err(e),
    };
    match outcome {
        Ok(_) => {
            info!(%id, "item updated");
            Ok(redirect("/admin/items?notice=item-updated"))
        }
        Err(e) => {
            let notice = save_failure(e)?;
            Ok(item_form_page(&admin.session, &form, &target, title, Some(notice))
                .await?
                .into_response())
        }
    }
}

pub async fn delete_item(admin: Admin, Path(id): Path<String>) -> Result<Response, SiteError> {
    match admin.session.items().delete(&id).await {
        Ok(()) => {
            info!(%id, "item deleted");
            Ok(redirect("/admin/items?notice=item-deleted"))
        }
        Err(e) => {
            let notice = save_failure(e)?;
            Ok(items_page(&admin.session, Some(notice)).await?.into_response())
        }
    }
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryFields {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub display_order: String,
    #[serde(default)]
    pub parent_id: String,
}

impl CategoryFields {
    fn into_form(self) -> CategoryForm {
        CategoryForm {
            name: self.name,
            description: self.description,
            image_url: self.image_url,
            display_order: self.display_order.trim().parse().unwrap_or(0),
            parent_id: Some(self.parent_id).filter(|p| !p.is_empty()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct NewCategoryQuery {
    pub parent: Option<String>,
}

fn render_tree(nodes: &[Category], out: &mut String) {
    out.push_str("<ul>");
    for node in nodes {
        let _ = write!(
            out,
            "<li><strong>{}</strong> <span class=\"badge\">{} produit(s)</span> \
             <a href=\"/admin/categories/{}/edit\">Modifier</a> \
             <a href=\"/admin/categories/new?parent={}\">Ajouter une sous-catégorie</a> {}",
            escape(&node.name),
            node.item_count(),
            escape(&node.id),
            escape(&node.id),
            delete_button(
                &format!("/admin/categories/{}/delete", node.id),
                "Êtes-vous sûr de vouloir supprimer cette catégorie ?"
            )
        );
        if !node.children.is_empty() {
            render_tree(&node.children, out);
        }
        out.push_str("</li>");
    }
    out.push_str("</ul>");
}

async fn categories_page(
    session: &ApiSession,
    notice: Option<Notice>,
) -> Result<Html<String>, SiteError> {
    let categories = session.categories().list().await?;
    let mut main =
        String::from("<p><a href=\"/admin/categories/new\">Ajouter une catégorie</a></p>");
    if categories.is_empty() {
        main.push_str("<p>Aucune catégorie pour le moment.</p>");
    } else {
        render_tree(&category_tree(&categories), &mut main);
    }
    Ok(admin_page("Catégories", AdminTab::Categories, notice.as_ref(), &main))
}

pub async fn categories(
    admin: Admin,
    Query(query): Query<NoticeQuery>,
) -> Result<Html<String>, SiteError> {
    categories_page(&admin.session, query.notice()).await
}

/// Parent choices for a category form. The edited category and its
/// descendants are left out.
fn parent_options(categories: &[Category], editing: Option<&str>, selected: &str) -> String {
    let excluded = editing.map(|id| descendant_ids(id, categories)).unwrap_or_default();
    let mut out = String::new();
    for category in categories
        .iter()
        .filter(|c| Some(c.id.as_str()) != editing && !excluded.contains(c.id.as_str()))
    {
        let _ = write!(
            out,
            "<option value=\"{}\"{}>{}</option>",
            escape(&category.id),
            if category.id == selected { " selected" } else { "" },
            escape(&category.name)
        );
    }
    out
}

async fn category_form_page(
    session: &ApiSession,
    form: &CategoryForm,
    editing: Option<&str>,
    notice: Option<Notice>,
) -> Result<Html<String>, SiteError> {
    let categories = session.categories().list().await?;
    let (title, action) = match editing {
        Some(id) => ("Modifier la catégorie", format!("/admin/categories/{id}/edit")),
        None => ("Ajouter une catégorie", "/admin/categories/new".to_string()),
    };

    let mut main = format!(
        "<form method=\"post\" action=\"{}\">\
         <p><label>Nom * <input name=\"name\" value=\"{}\"></label></p>\
         <p><label>Description <textarea name=\"description\">{}</textarea></label></p>\
         <p><label>Image <input name=\"imageUrl\" value=\"{}\"></label></p>\
         <p><label>Ordre d'affichage <input name=\"displayOrder\" type=\"number\" value=\"{}\"></label></p>\
         <p><label>Catégorie parente <select name=\"parentId\"><option value=\"\">Aucune</option>",
        escape(&action),
        escape(&form.name),
        escape(&form.description),
        escape(&form.image_url),
        form.display_order
    );
    main.push_str(&parent_options(
        &categories,
        editing,
        form.parent_id.as_deref().unwrap_or(""),
    ));
    main.push_str(
        "</select></label></p><p><button type=\"submit\">Enregistrer</button> \
         <a href=\"/admin/categories\">Annuler</a></p></form>",
    );
    Ok(admin_page(title, AdminTab::Categories, notice.as_ref(), &main))
}

pub async fn new_category(
    admin: Admin,
    Query(query): Query<NewCategoryQuery>,
) -> Result<Html<String>, SiteError> {
    let form = CategoryForm::new(query.parent.filter(|p| !p.is_empty()));
    category_form_page(&admin.session, &form, None, None).await
}

pub async fn create_category(
    admin: Admin,
    Form(fields): Form<CategoryFields>,
) -> Result<Response, SiteError> {
    let form = fields.into_form();
    let outcome = match form.to_payload() {
        Ok(payload) => admin.session.categories().create(&payload).await,
        Err(e) => Err(e),
    };
    match outcome {
        Ok(category) => {
            info!(id = %category.id, "category created");
            Ok(redirect("/admin/categories?notice=category-created"))
        }
        Err(e) => {
            let notice = save_failure(e)?;
            Ok(category_form_page(&admin.session, &form, None, Some(notice))
                .await?
                .into_response())
        }
    }
}

pub async fn edit_category(
    admin: Admin,
    Path(id): Path<String>,
) -> Result<Html<String>, SiteError> {
    let category = admin.session.categories().get(&id).await?;
    let form = CategoryForm::from_category(&category);
    category_form_page(&admin.session, &form, Some(&id), None).await
}

pub async fn update_category(
    admin: Admin,
    Path(id): Path<String>,
    Form(fields): Form<CategoryFields>,
) -> Result<Response, SiteError> {
    let form = fields.into_form();
    let outcome = match form.to_payload() {
        Ok(payload) => admin.session.categories().update(&id, &payload).await,
        Err(e) => Err(e),
    };
    match outcome {
        Ok(_) => {
            info!(%id, "category updated");
            Ok(redirect("/admin/categories?notice=category-updated"))
        }
        Err(e) => {
            let notice = save_failure(e)?;
            Ok(category_form_page(&admin.session, &form, Some(&id), Some(notice))
                .await?
                .into_response())
        }
    }
}

pub async fn delete_category(admin: Admin, Path(id): Path<String>) -> Result<Response, SiteError> {
    match admin.session.categories().delete(&id).await {
        Ok(()) => {
            info!(%id, "category deleted");
            Ok(redirect("/admin/categories?notice=category-deleted"))
        }
        Err(e) => {
            let notice = save_failure(e)?;
            Ok(categories_page(&admin.session, Some(notice)).await?.into_response())
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFields {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub event_type: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub is_promo: Option<String>,
    #[serde(default)]
    pub show_in_header: Option<String>,
}

impl EventFields {
    fn into_form(self) -> EventForm {
        EventForm {
            name: self.name,
            description: self.description,
            event_type: self.event_type,
            image_url: self.image_url,
            start_date: self.start_date,
            end_date: self.end_date,
            status: if self.status.is_empty() {
                STATUS_ACTIVE.to_string()
            } else {
                self.status
            },
            is_promo: self.is_promo.is_some(),
            show_in_header: self.show_in_header.is_some(),
        }
    }
}

async fn events_page(session: &ApiSession, notice: Option<Notice>) -> Result<Html<String>, SiteError> {
    let events = session.events().list().await?;
    let mut main = String::from(
        "<p><a href=\"/admin/events/new\">Ajouter un événement</a></p>\
         <table><thead><tr><th>Nom</th><th>Type</th><th>Début</th><th>Fin</th>\
         <th>Statut</th><th>Affichage</th><th></th></tr></thead><tbody>",
    );
    if events.is_empty() {
        main.push_str("<tr><td colspan=\"7\">Aucun événement pour le moment.</td></tr>");
    }
    for event in &events {
        let row = EventRow::from_event(event);
        let _ = write!(
            main,
            "<tr><td>{}</td><td>{}</td><td title=\"{}\">{}</td><td title=\"{}\">{}</td>\
             <td><span class=\"badge\">{}</span></td><td>{}</td>\
             <td><a href=\"/admin/events/{}/edit\">Modifier</a> {}</td></tr>",
            escape(&row.name),
            escape(&row.event_type),
            escape(&row.period),
            escape(&row.starts),
            escape(&row.period),
            escape(&row.ends),
            row.status,
            escape(&row.flags),
            escape(&row.id),
            delete_button(
                &format!("/admin/events/{}/delete", row.id),
                "Êtes-vous sûr de vouloir supprimer cet événement ?"
            )
        );
    }
    main.push_str("</tbody></table>");
    Ok(admin_page("Événements", AdminTab::Events, notice.as_ref(), &main))
}

pub async fn events(admin: Admin, Query(query): Query<NoticeQuery>) -> Result<Html<String>, SiteError> {
    events_page(&admin.session, query.notice()).await
}

fn render_event_form(form: &EventForm, editing: Option<&str>, notice: Option<Notice>) -> Html<String> {
    let (title, action) = match editing {
        Some(id) => ("Modifier l'événement", format!("/admin/events/{id}/edit")),
        None => ("Ajouter un événement", "/admin/events/new".to_string()),
    };
    let checked = |on: bool| if on { " checked" } else { "" };
    let main = format!(
        "<form method=\"post\" action=\"{}\">\
         <p><label>Nom * <input name=\"name\" value=\"{}\"></label></p>\
         <p><label>Description <textarea name=\"description\">{}</textarea></label></p>\
         <p><label>Type <input name=\"eventType\" value=\"{}\" placeholder=\"Promotion\"></label></p>\
         <p><label>Image <input name=\"imageUrl\" value=\"{}\"></label></p>\
         <p><label>Début <input type=\"date\" name=\"startDate\" value=\"{}\"></label> \
         <label>Fin <input type=\"date\" name=\"endDate\" value=\"{}\"></label></p>\
         <p><label>Statut <select name=\"status\">\
         <option value=\"{STATUS_ACTIVE}\"{}>Actif</option>\
         <option value=\"{STATUS_INACTIVE}\"{}>Inactif</option></select></label></p>\
         <p><label><input type=\"checkbox\" name=\"isPromo\"{}> Promotion en page d'accueil</label></p>\
         <p><label><input type=\"checkbox\" name=\"showInHeader\"{}> Afficher dans le bandeau</label></p>\
         <p><button type=\"submit\">Enregistrer</button> <a href=\"/admin/events\">Annuler</a></p></form>",
        escape(&action),
        escape(&form.name),
        escape(&form.description),
        escape(&form.event_type),
        escape(&form.image_url),
        escape(&form.start_date),
        escape(&form.end_date),
        if form.status == STATUS_ACTIVE { " selected" } else { "" },
        if form.status == STATUS_ACTIVE { "" } else { " selected" },
        checked(form.is_promo),
        checked(form.show_in_header),
    );
    admin_page(title, AdminTab::Events, notice.as_ref(), &main)
}

pub async fn new_event(_admin: Admin) -> Html<String> {
    render_event_form(&EventForm::new(), None, None)
}

pub async fn create_event(admin: Admin, Form(fields): Form<EventFields>) -> Result<Response, SiteError> {
    let form = fields.into_form();
    let outcome = match form.to_payload() {
        Ok(payload) => admin.session.events().create(&payload).await,
        Err(e) => Err(e),
    };
    match outcome {
        Ok(event) => {
            info!(id = %event.id, "event created");
            Ok(redirect("/admin/events?notice=event-created"))
        }
        Err(e) => Ok(render_event_form(&form, None, Some(save_failure(e)?)).into_response()),
    }
}

pub async fn edit_event(admin: Admin, Path(id): Path<String>) -> Result<Html<String>, SiteError> {
    let event = admin.session.events().get(&id).await?;
    Ok(render_event_form(&EventForm::from_event(&event), Some(&id), None))
}

pub async fn update_event(
    admin: Admin,
    Path(id): Path<String>,
    Form(fields): Form<EventFields>,
) -> Result<Response, SiteError> {
    let form = fields.into_form();
    let outcome = match form.to_payload() {
        Ok(payload) => admin.session.events().update(&id, &payload).await,
        Err(e) => Err(e),
    };
    match outcome {
        Ok(_) => {
            info!(%id, "event updated");
            Ok(redirect("/admin/events?notice=event-updated"))
        }
        Err(e) => Ok(render_event_form(&form, Some(&id), Some(save_failure(e)?)).into_response()),
    }
}

pub async fn delete_event(admin: Admin, Path(id): Path<String>) -> Result<Response, SiteError> {
    match admin.session.events().delete(&id).await {
        Ok(()) => {
            info!(%id, "event deleted");
            Ok(redirect("/admin/events?notice=event-deleted"))
        }
        Err(e) => {
            let notice = save_failure(e)?;
            Ok(events_page(&admin.session, Some(notice)).await?.into_response())
        }
    }
}
