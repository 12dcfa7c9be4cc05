//! Domain services: core builders and parsers around `ApiSession::send`.

use carte_core::types::{Announcement, BusinessInfo};
use carte_core::{
    ApiError, Category, CategoryPayload, Event, EventPayload, Item, ItemPayload,
};

use crate::session::ApiSession;

impl ApiSession {
    pub fn items(&self) -> ItemsService<'_> {
        ItemsService { session: self }
    }

    pub fn categories(&self) -> CategoriesService<'_> {
        CategoriesService { session: self }
    }

    pub fn events(&self) -> EventsService<'_> {
        EventsService { session: self }
    }

    pub fn business(&self) -> BusinessService<'_> {
        BusinessService { session: self }
    }
}

#[derive(Clone, Copy)]
pub struct ItemsService<'a> {
    session: &'a ApiSession,
}

impl ItemsService<'_> {
    pub async fn list(self) -> Result<Vec<Item>, ApiError> {
        let c = self.session.client();
        c.parse_list_items(self.session.send(c.build_list_items()).await?)
    }

    pub async fn get(self, id: &str) -> Result<Item, ApiError> {
        let c = self.session.client();
        c.parse_get_item(self.session.send(c.build_get_item(id)).await?)
    }

    pub async fn pizza_moment(self) -> Result<Vec<Item>, ApiError> {
        let c = self.session.client();
        c.parse_pizza_moment(self.session.send(c.build_pizza_moment()).await?)
    }

    pub async fn create(self, input: &ItemPayload) -> Result<Item, ApiError> {
        let c = self.session.client();
        c.parse_create_item(self.session.send(c.build_create_item(input)?).await?)
    }

    pub async fn update(self, id: &str, input: &ItemPayload) -> Result<Item, ApiError> {
        let c = self.session.client();
        c.parse_update_item(self.session.send(c.build_update_item(id, input)?).await?)
    }

    pub async fn delete(self, id: &str) -> Result<(), ApiError> {
        let c = self.session.client();
        c.parse_delete_item(self.session.send(c.build_delete_item(id)).await?)
    }
}

#[derive(Clone, Copy)]
pub struct CategoriesService<'a> {
    session: &'a ApiSession,
}

impl CategoriesService<'_> {
    pub async fn list(self) -> Result<Vec<Category>, ApiError> {
        let c = self.session.client();
        c.parse_list_categories(self.session.send(c.build_list_categories()).await?)
    }

    pub async fn get(self, id: &str) -> Result<Category, ApiError> {
        let c = self.session.client();
        c.parse_get_category(self.session.send(c.build_get_category(id)).await?)
    }

    pub async fn create(self, input: &CategoryPayload) -> Result<Category, ApiError> {
        let c = self.session.client();
        c.parse_create_category(self.session.send(c.build_create_category(input)?).await?)
    }

    pub async fn update(self, id: &str, input: &CategoryPayload) -> Result<Category, ApiError> {
        let c = self.session.client();
        c.parse_update_category(self.session.send(c.build_update_category(id, input)?).await?)
    }

    pub async fn delete(self, id: &str) -> Result<(), ApiError> {
        let c = self.session.client();
        c.parse_delete_category(self.session.send(c.build_delete_category(id)).await?)
    }
}

#[derive(Clone, Copy)]
pub struct EventsService<'a> {
    session: &'a ApiSession,
}

impl EventsService<'_> {
    pub async fn list(self) -> Result<Vec<Event>, ApiError> {
        let c = self.session.client();
        c.parse_list_events(self.session.send(c.build_list_events()).await?)
    }

    pub async fn get(self, id: &str) -> Result<Event, ApiError> {
        let c = self.session.client();
        c.parse_get_event(self.session.send(c.build_get_event(id)).await?)
    }

    pub async fn promo(self) -> Result<Vec<Event>, ApiError> {
        let c = self.session.client();
        c.parse_promo_events(self.session.send(c.build_promo_events()).await?)
    }

    pub async fn header(self) -> Result<Vec<Announcement>, ApiError> {
        let c = self.session.client();
        c.parse_header_announcements(self.session.send(c.build_header_announcements()).await?)
    }

    pub async fn create(self, input: &EventPayload) -> Result<Event, ApiError> {
        let c = self.session.client();
        c.parse_create_event(self.session.send(c.build_create_event(input)?).await?)
    }

    pub async fn update(self, id: &str, input: &EventPayload) -> Result<Event, ApiError> {
        let c = self.session.client();
        c.parse_update_event(self.session.send(c.build_update_event(id, input)?).await?)
    }

    pub async fn delete(self, id: &str) -> Result<(), ApiError> {
        let c = self.session.client();
        c.parse_delete_event(self.session.send(c.build_delete_event(id)).await?)
    }
}

#[derive(Clone, Copy)]
pub struct BusinessService<'a> {
    session: &'a ApiSession,
}

impl BusinessService<'_> {
    pub async fn list(self) -> Result<Vec<BusinessInfo>, ApiError> {
        let c = self.session.client();
        c.parse_list_business(self.session.send(c.build_list_business()).await?)
    }
}
