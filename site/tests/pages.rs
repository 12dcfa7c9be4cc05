//! Pages rendered through the router against the mock backend.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use carte_site::{app, AppState, UreqTransport};
use http_body_util::BodyExt;
use mock_server::{ADMIN_EMAIL, ADMIN_PASSWORD};
use tokio::net::TcpListener;
use tower::ServiceExt;

/// A fresh seeded backend on a random port, and the site pointed at it.
async fn site() -> Router {
    site_with_state().await.0
}

async fn site_with_state() -> (Router, AppState) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run(listener));

    let transport = Arc::new(UreqTransport::new(Duration::from_secs(5)));
    let state = AppState::with_transport(&format!("http://{addr}"), transport, Duration::from_secs(3000));
    (app(state.clone()), state)
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_form(uri: &str, cookie: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &Response) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

/// Sign in and return the `Cookie` header value for the new session.
async fn sign_in(app: &Router) -> String {
    let body = format!("email={}&password={ADMIN_PASSWORD}", ADMIN_EMAIL.replace('@', "%40"));
    let response = app
        .clone()
        .oneshot(post_form("/login", None, &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/items");
    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

#[tokio::test(flavor = "multi_thread")]
async fn home_shows_pizza_du_moment_and_footer() {
    let app = site().await;
    let response = app.oneshot(get("/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page = text(response).await;
    assert!(page.contains("La pizza du moment"));
    assert!(page.contains("La Forestière"));
    assert!(page.contains("Pizza Le Duc"));
    assert!(page.contains("tel:0556270000"));
}

#[tokio::test(flavor = "multi_thread")]
async fn menu_opens_on_first_tab_and_filters() {
    let app = site().await;

    let page = text(app.clone().oneshot(get("/notre-carte", None)).await.unwrap()).await;
    assert!(page.contains("Pizza du moment"));
    assert!(page.contains("La Forestière"));
    // Empty categories get no tab.
    assert!(!page.contains("Desserts"));

    let page = text(
        app.oneshot(get("/notre-carte?category=cat-pizzas&vegetarian=1", None))
            .await
            .unwrap(),
    )
    .await;
    assert!(page.contains("Base tomate"));
    assert!(page.contains("Margherita"));
    assert!(page.contains("Chèvre miel"));
    assert!(!page.contains("Reine"));
}

#[tokio::test(flavor = "multi_thread")]
async fn item_page_totals_the_selection() {
    let app = site().await;
    let response = app
        .oneshot(get("/notre-carte/items/reine?variant=reine-33&quantity=2", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page = text(response).await;
    assert!(page.contains("2 × Reine (33 cm)"));
    assert!(page.contains("Prix unitaire : 13.50 €"));
    assert!(page.contains("Total : 27.00 €"));
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_pages_are_not_found() {
    let app = site().await;
    let response = app
        .clone()
        .oneshot(get("/notre-carte/items/nope", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = app.oneshot(get("/nowhere", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread")]
async fn admin_pages_require_sign_in() {
    let app = site().await;
    let response = app
        .clone()
        .oneshot(get("/admin/items", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?expired=1");

    let response = app
        .oneshot(get("/admin/items", Some("carte_sid=forged")))
        .await
        .unwrap();
    assert_eq!(location(&response), "/login?expired=1");
}

#[tokio::test(flavor = "multi_thread")]
async fn wrong_password_stays_on_login() {
    let app = site().await;
    let response = app
        .oneshot(post_form("/login", None, "email=admin%40pizzaleduc.fr&password=nope"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(text(response).await.contains("Identifiants invalides"));
}

#[tokio::test(flavor = "multi_thread")]
async fn admin_deletes_an_item() {
    let app = site().await;
    let cookie = sign_in(&app).await;

    let page = text(
        app.clone()
            .oneshot(get("/admin/items", Some(&cookie)))
            .await
            .unwrap(),
    )
    .await;
    assert!(page.contains("Reine"));
    assert!(page.contains("11,00\u{a0}€ - 13,50\u{a0}€"));

    let response = app
        .clone()
        .oneshot(post_form("/admin/items/reine/delete", Some(&cookie), ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/items?notice=item-deleted");

    let response = app
        .oneshot(get("/notre-carte/items/reine", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread")]
async fn admin_creates_an_item_from_the_form() {
    let app = site().await;
    let cookie = sign_in(&app).await;

    // Adding a variant row re-renders without saving.
    let response = app
        .clone()
        .oneshot(post_form(
            "/admin/items/new",
            Some(&cookie),
            "name=Calzone&categoryId=cat-tomate&variant_name=29+cm&variant_price=12%2C50\
             &variant_sku=&image_url=&action=add_variant",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page = text(response).await;
    assert!(page.contains("value=\"remove_variant:1\""));

    let response = app
        .clone()
        .oneshot(post_form(
            "/admin/items/new",
            Some(&cookie),
            "name=Calzone&categoryId=cat-tomate&status=Active\
             &variant_name=29+cm&variant_price=12%2C50&variant_sku=\
             &image_url=%2Fimg%2Fcalzone.jpg&image_default=0\
             &opt_enabled=VEGETARIENNE&opt_VEGETARIENNE=Non&action=save",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/items?notice=item-created");

    let page = text(
        app.oneshot(get("/admin/items?notice=item-created", Some(&cookie)))
            .await
            .unwrap(),
    )
    .await;
    assert!(page.contains("Produit créé avec succès"));
    assert!(page.contains("Calzone"));
}

#[tokio::test(flavor = "multi_thread")]
async fn invalid_item_form_shows_the_reason() {
    let app = site().await;
    let cookie = sign_in(&app).await;
    let response = app
        .oneshot(post_form(
            "/admin/items/new",
            Some(&cookie),
            "name=&categoryId=&variant_name=&variant_price=&variant_sku=&action=save",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(text(response).await.contains("Formulaire invalide"));
}

#[tokio::test(flavor = "multi_thread")]
async fn category_tree_management() {
    let app = site().await;
    let cookie = sign_in(&app).await;

    let response = app
        .clone()
        .oneshot(post_form(
            "/admin/categories/new",
            Some(&cookie),
            "name=Salades&description=&imageUrl=&displayOrder=5&parentId=",
        ))
        .await
        .unwrap();
    assert_eq!(location(&response), "/admin/categories?notice=category-created");

    let page = text(
        app.clone()
            .oneshot(get("/admin/categories", Some(&cookie)))
            .await
            .unwrap(),
    )
    .await;
    assert!(page.contains("Salades"));
    assert!(page.contains("/admin/categories/new?parent=cat-pizzas"));

    // The backend refuses to drop a category that still has children.
    let response = app
        .oneshot(post_form("/admin/categories/cat-pizzas/delete", Some(&cookie), ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(text(response).await.contains("sous-catégories"));
}

#[tokio::test(flavor = "multi_thread")]
async fn event_dates_are_validated() {
    let app = site().await;
    let cookie = sign_in(&app).await;

    let response = app
        .clone()
        .oneshot(post_form(
            "/admin/events/new",
            Some(&cookie),
            "name=Soir%C3%A9e+match&startDate=2030-06-10&endDate=2030-06-01&isPromo=on",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(text(response).await.contains("Formulaire invalide"));

    let response = app
        .clone()
        .oneshot(post_form(
            "/admin/events/new",
            Some(&cookie),
            "name=Soir%C3%A9e+match&eventType=Soir%C3%A9e&startDate=2030-06-01\
             &endDate=2030-06-10&isPromo=on&showInHeader=on",
        ))
        .await
        .unwrap();
    assert_eq!(location(&response), "/admin/events?notice=event-created");

    let page = text(app.oneshot(get("/admin/events", Some(&cookie))).await.unwrap()).await;
    assert!(page.contains("Soirée match"));
    assert!(page.contains("Promo, Bandeau"));
}

#[tokio::test(flavor = "multi_thread")]
async fn logout_forgets_the_session() {
    let app = site().await;
    let cookie = sign_in(&app).await;

    let response = app
        .clone()
        .oneshot(post_form("/logout", Some(&cookie), ""))
        .await
        .unwrap();
    assert_eq!(location(&response), "/");
    let cleared = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(cleared.contains("Max-Age=0"));

    let response = app
        .oneshot(get("/admin/items", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(location(&response), "/login?expired=1");
}

#[tokio::test(flavor = "multi_thread")]
async fn logout_only_answers_post() {
    let app = site().await;
    let cookie = sign_in(&app).await;

    let response = app
        .clone()
        .oneshot(get("/logout", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    let response = app
        .oneshot(get("/admin/items", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test(flavor = "multi_thread")]
async fn signed_out_sessions_are_dropped_from_the_store() {
    let (app, state) = site_with_state().await;
    let cookie = sign_in(&app).await;
    let sid = cookie.trim_start_matches("carte_sid=").to_string();
    assert_eq!(state.sessions.len(), 1);

    // Tokens cleared behind the cookie, as after a failed refresh.
    state.sessions.get(&sid).unwrap().logout();
    let response = app
        .oneshot(get("/admin/items", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(location(&response), "/login?expired=1");
    assert!(state.sessions.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn category_parent_choices_exclude_its_subtree() {
    let app = site().await;
    let cookie = sign_in(&app).await;

    let page = text(
        app.clone()
            .oneshot(get("/admin/categories/cat-pizzas/edit", Some(&cookie)))
            .await
            .unwrap(),
    )
    .await;
    assert!(!page.contains("<option value=\"cat-tomate\""));
    assert!(!page.contains("<option value=\"cat-creme\""));
    assert!(page.contains("<option value=\"cat-boissons\""));

    // Forcing a child as parent is refused by the backend.
    let response = app
        .oneshot(post_form(
            "/admin/categories/cat-pizzas/edit",
            Some(&cookie),
            "name=Pizzas&description=&imageUrl=&displayOrder=1&parentId=cat-tomate",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(text(response).await.contains("sous-catégories"));
}

#[tokio::test(flavor = "multi_thread")]
async fn item_form_defaults_to_saving() {
    let app = site().await;
    let cookie = sign_in(&app).await;
    let page = text(
        app.oneshot(get("/admin/items/margherita/edit", Some(&cookie)))
            .await
            .unwrap(),
    )
    .await;
    let form = &page[page
        .find("<form method=\"post\" action=\"/admin/items/margherita/edit\">")
        .unwrap()..];
    let first = &form[form.find("<button").unwrap()..];
    assert!(first.starts_with("<button name=\"action\" value=\"save\""));
}

#[tokio::test(flavor = "multi_thread")]
async fn pizza_moment_page_lists_the_selection() {
    let app = site().await;
    let response = app.oneshot(get("/pizza-moment", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page = text(response).await;
    assert!(page.contains("<h1>La pizza du moment</h1>"));
    assert!(page.contains("La Forestière"));
    assert!(page.contains("href=\"/nous-trouver\""));
}

#[tokio::test(flavor = "multi_thread")]
async fn find_us_page_shows_address_hours_and_phone() {
    let app = site().await;
    let response = app.oneshot(get("/nous-trouver", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page = text(response).await;
    assert!(page.contains("12 route de Bordeaux, 33720 Cérons"));
    assert!(page.contains("https://www.google.com/maps/search/?api=1&amp;query=12%20route"));
    assert!(page.contains("Mardi: 18h-22h"));
    assert!(page.contains("Par téléphone : <a href=\"tel:0556270000\">05 56 27 00 00</a>"));
}
