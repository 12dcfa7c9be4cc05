//! Stateless HTTP request builder and response parser for the menu API.
//!
//! # Design
//! `CarteClient` holds only the backend origin and carries no mutable state
//! between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. Authentication and CSRF headers are not added here: the
//! host's session layer decorates requests before sending them.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{message_from_body, ApiError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    Announcement, BusinessInfo, Category, CategoryPayload, CsrfTokenResponse, Event, EventPayload,
    Item, ItemPayload, LoginRequest, LoginResponse, RefreshRequest, RefreshResponse,
};

/// Synchronous, stateless client for the menu API.
#[derive(Debug, Clone)]
pub struct CarteClient {
    base_url: String,
}

impl CarteClient {
    /// `base_url` is the backend origin; routes live under `{origin}/api`.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, route: &str) -> String {
        format!("{}/api{route}", self.base_url)
    }

    fn request(&self, method: HttpMethod, route: &str) -> HttpRequest {
        HttpRequest {
            method,
            path: self.url(route),
            headers: Vec::new(),
            body: None,
        }
    }

    fn json_request<T: Serialize>(
        &self,
        method: HttpMethod,
        route: &str,
        input: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method,
            path: self.url(route),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    // -----------------------------------------------------------------------
    // Items
    // -----------------------------------------------------------------------

    pub fn build_list_items(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/items")
    }

    pub fn build_get_item(&self, id: &str) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/items/{id}"))
    }

    /// Items of the "pizza du moment" category.
    pub fn build_pizza_moment(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/items/pizza-moment")
    }

    pub fn build_create_item(&self, input: &ItemPayload) -> Result<HttpRequest, ApiError> {
        input.validate()?;
        self.json_request(HttpMethod::Post, "/items", input)
    }

    pub fn build_update_item(&self, id: &str, input: &ItemPayload) -> Result<HttpRequest, ApiError> {
        input.validate()?;
        self.json_request(HttpMethod::Put, &format!("/items/{id}"), input)
    }

    pub fn build_delete_item(&self, id: &str) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("/items/{id}"))
    }

    pub fn parse_list_items(&self, response: HttpResponse) -> Result<Vec<Item>, ApiError> {
        parse_json(&response, &[200])
    }

    pub fn parse_get_item(&self, response: HttpResponse) -> Result<Item, ApiError> {
        parse_json(&response, &[200])
    }

    pub fn parse_pizza_moment(&self, response: HttpResponse) -> Result<Vec<Item>, ApiError> {
        parse_json(&response, &[200])
    }

    pub fn parse_create_item(&self, response: HttpResponse) -> Result<Item, ApiError> {
        parse_json(&response, &[201])
    }

    pub fn parse_update_item(&self, response: HttpResponse) -> Result<Item, ApiError> {
        parse_json(&response, &[200])
    }

    pub fn parse_delete_item(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, &[200, 204])
    }

    // -----------------------------------------------------------------------
    // Categories
    // -----------------------------------------------------------------------

    pub fn build_list_categories(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/categories")
    }

    /// The single-category endpoint includes `children`.
    pub fn build_get_category(&self, id: &str) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/categories/{id}"))
    }

    pub fn build_create_category(&self, input: &CategoryPayload) -> Result<HttpRequest, ApiError> {
        input.validate()?;
        self.json_request(HttpMethod::Post, "/categories", input)
    }

    pub fn build_update_category(
        &self,
        id: &str,
        input: &CategoryPayload,
    ) -> Result<HttpRequest, ApiError> {
        input.validate()?;
        self.json_request(HttpMethod::Put, &format!("/categories/{id}"), input)
    }

    pub fn build_delete_category(&self, id: &str) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("/categories/{id}"))
    }

    pub fn parse_list_categories(&self, response: HttpResponse) -> Result<Vec<Category>, ApiError> {
        parse_json(&response, &[200])
    }

    pub fn parse_get_category(&self, response: HttpResponse) -> Result<Category, ApiError> {
        parse_json(&response, &[200])
    }

    pub fn parse_create_category(&self, response: HttpResponse) -> Result<Category, ApiError> {
        parse_json(&response, &[201])
    }

    pub fn parse_update_category(&self, response: HttpResponse) -> Result<Category, ApiError> {
        parse_json(&response, &[200])
    }

    pub fn parse_delete_category(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, &[200, 204])
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    pub fn build_list_events(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/events")
    }

    pub fn build_get_event(&self, id: &str) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/events/{id}"))
    }

    pub fn build_promo_events(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/events/promo")
    }

    pub fn build_header_announcements(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/events/header")
    }

    pub fn build_create_event(&self, input: &EventPayload) -> Result<HttpRequest, ApiError> {
        input.validate()?;
        self.json_request(HttpMethod::Post, "/events", input)
    }

    pub fn build_update_event(&self, id: &str, input: &EventPayload) -> Result<HttpRequest, ApiError> {
        input.validate()?;
        self.json_request(HttpMethod::Put, &format!("/events/{id}"), input)
    }

    pub fn build_delete_event(&self, id: &str) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("/events/{id}"))
    }

    pub fn parse_list_events(&self, response: HttpResponse) -> Result<Vec<Event>, ApiError> {
        parse_json(&response, &[200])
    }

    pub fn parse_get_event(&self, response: HttpResponse) -> Result<Event, ApiError> {
        parse_json(&response, &[200])
    }

    pub fn parse_promo_events(&self, response: HttpResponse) -> Result<Vec<Event>, ApiError> {
        parse_json(&response, &[200])
    }

    pub fn parse_header_announcements(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<Announcement>, ApiError> {
        parse_json(&response, &[200])
    }

    pub fn parse_create_event(&self, response: HttpResponse) -> Result<Event, ApiError> {
        parse_json(&response, &[201])
    }

    pub fn parse_update_event(&self, response: HttpResponse) -> Result<Event, ApiError> {
        parse_json(&response, &[200])
    }

    pub fn parse_delete_event(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, &[200, 204])
    }

    // -----------------------------------------------------------------------
    // Business info
    // -----------------------------------------------------------------------

    pub fn build_list_business(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/business-info")
    }

    pub fn parse_list_business(&self, response: HttpResponse) -> Result<Vec<BusinessInfo>, ApiError> {
        parse_json(&response, &[200])
    }

    // -----------------------------------------------------------------------
    // Auth and CSRF
    // -----------------------------------------------------------------------

    pub fn build_login(&self, input: &LoginRequest) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/auth/login", input)
    }

    pub fn build_refresh(&self, refresh_token: &str) -> Result<HttpRequest, ApiError> {
        let input = RefreshRequest {
            refresh_token: refresh_token.to_string(),
        };
        self.json_request(HttpMethod::Post, "/auth/refresh", &input)
    }

    pub fn build_csrf_token(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/csrf/token")
    }

    pub fn parse_login(&self, response: HttpResponse) -> Result<LoginResponse, ApiError> {
        parse_json(&response, &[200, 201])
    }

    pub fn parse_refresh(&self, response: HttpResponse) -> Result<RefreshResponse, ApiError> {
        parse_json(&response, &[200, 201])
    }

    pub fn parse_csrf_token(&self, response: HttpResponse) -> Result<String, ApiError> {
        let parsed: CsrfTokenResponse = parse_json(&response, &[200])?;
        Ok(parsed.csrf_token)
    }
}

fn parse_json<T: DeserializeOwned>(response: &HttpResponse, expected: &[u16]) -> Result<T, ApiError> {
    check_status(response, expected)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
pub(crate) fn check_status(response: &HttpResponse, expected: &[u16]) -> Result<(), ApiError> {
    if expected.contains(&response.status) {
        return Ok(());
    }
    match response.status {
        404 => Err(ApiError::NotFound),
        401 => Err(ApiError::Unauthorized),
        403 => match csrf_rejection(response) {
            Some(message) => Err(ApiError::CsrfRejected { message }),
            None => Err(ApiError::HttpError {
                status: 403,
                body: response.body.clone(),
            }),
        },
        status => Err(ApiError::HttpError {
            status,
            body: response.body.clone(),
        }),
    }
}

/// A 403 counts as a CSRF rejection when the backend's message names CSRF.
pub(crate) fn csrf_rejection(response: &HttpResponse) -> Option<String> {
    if response.status != 403 {
        return None;
    }
    message_from_body(&response.body).filter(|m| m.contains("CSRF"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ImagePayload, VariantPayload};

    fn client() -> CarteClient {
        CarteClient::new("http://localhost:3001")
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    fn payload() -> ItemPayload {
        ItemPayload {
            name: "Margherita".to_string(),
            description: Some("Tomate, mozzarella".to_string()),
            category_id: "c1".to_string(),
            status: "Active".to_string(),
            variants: vec![VariantPayload {
                variant_name: "29cm".to_string(),
                price: 9.5,
                sku: None,
            }],
            images: vec![ImagePayload {
                image_url: "/img/margherita.jpg".to_string(),
                is_default: true,
            }],
            options: vec![],
        }
    }

    #[test]
    fn routes_live_under_api_prefix() {
        let req = client().build_list_items();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3001/api/items");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = CarteClient::new("http://localhost:3001/");
        assert_eq!(client.build_csrf_token().path, "http://localhost:3001/api/csrf/token");
    }

    #[test]
    fn build_create_item_produces_json_request() {
        let req = client().build_create_item(&payload()).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:3001/api/items");
        assert_eq!(req.header("content-type"), Some("application/json"));
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["name"], "Margherita");
        assert_eq!(body["variants"][0]["variantName"], "29cm");
        assert_eq!(body["images"][0]["isDefault"], true);
    }

    #[test]
    fn build_create_item_rejects_unnamed_items() {
        let mut input = payload();
        input.name = String::new();
        let err = client().build_create_item(&input).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn build_update_and_delete_use_item_path() {
        let req = client().build_update_item("abc", &payload()).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, "http://localhost:3001/api/items/abc");
        let req = client().build_delete_item("abc");
        assert_eq!(req.method, HttpMethod::Delete);
        assert!(req.body.is_none());
    }

    #[test]
    fn build_refresh_sends_snake_case_token() {
        let req = client().build_refresh("r1").unwrap();
        assert_eq!(req.path, "http://localhost:3001/api/auth/refresh");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["refresh_token"], "r1");
    }

    #[test]
    fn parse_list_items_success() {
        let body = r#"[{"id":"i1","name":"Reine","categoryId":"c1","variants":[{"variantName":"33 cm","price":12.5}]}]"#;
        let items = client().parse_list_items(response(200, body)).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].variants[0].price, 12.5);
    }

    #[test]
    fn parse_get_item_not_found() {
        let err = client().parse_get_item(response(404, "")).unwrap_err();
        assert_eq!(err, ApiError::NotFound);
    }

    #[test]
    fn parse_maps_401_to_unauthorized() {
        let err = client().parse_list_events(response(401, r#"{"message":"Unauthorized"}"#)).unwrap_err();
        assert_eq!(err, ApiError::Unauthorized);
    }

    #[test]
    fn parse_distinguishes_csrf_403_from_other_403() {
        let err = client()
            .parse_delete_item(response(403, r#"{"message":"Invalid CSRF token"}"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::CsrfRejected { ref message } if message == "Invalid CSRF token"));

        let err = client()
            .parse_delete_item(response(403, r#"{"message":"Forbidden resource"}"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 403, .. }));
    }

    #[test]
    fn parse_delete_accepts_200_and_204() {
        assert!(client().parse_delete_category(response(200, "{}")).is_ok());
        assert!(client().parse_delete_category(response(204, "")).is_ok());
    }

    #[test]
    fn parse_create_item_wrong_status() {
        let err = client().parse_create_item(response(500, "internal error")).unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 500, .. }));
    }

    #[test]
    fn parse_csrf_token_reads_camel_case_field() {
        let token = client()
            .parse_csrf_token(response(200, r#"{"csrfToken":"tok-1"}"#))
            .unwrap();
        assert_eq!(token, "tok-1");
    }

    #[test]
    fn parse_list_items_bad_json() {
        let err = client().parse_list_items(response(200, "not json")).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }
}
