//! A customer's visit to one public store page.

use std::sync::Arc;

use rust_decimal::Decimal;
use shared::{
    cart::{Cart, CartEntry},
    checkout::{self, CheckoutError, DEFAULT_MESSAGING_HOST},
    domain::{CatalogItem, Customer, ItemId},
    protocol::{CheckoutLine, CheckoutRequest, CheckoutResponse, PublicStorePage},
};
use tracing::{debug, info};

use crate::{
    backend::StorefrontBackend,
    error::{ClientError, Result},
};

pub struct StoreBrowser {
    backend: Arc<dyn StorefrontBackend>,
    slug: String,
    messaging_host: String,
    page: Option<PublicStorePage>,
    cart: Cart,
}

impl StoreBrowser {
    pub fn new(backend: Arc<dyn StorefrontBackend>, slug: impl Into<String>) -> Self {
        Self {
            backend,
            slug: slug.into(),
            messaging_host: DEFAULT_MESSAGING_HOST.to_string(),
            page: None,
            cart: Cart::new(),
        }
    }

    pub fn with_messaging_host(mut self, host: impl Into<String>) -> Self {
        self.messaging_host = host.into();
        self
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn page(&self) -> Option<&PublicStorePage> {
        self.page.as_ref()
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Fetches the page. Cart lines for items the store no longer offers are
    /// dropped.
    pub async fn load(&mut self) -> Result<&PublicStorePage> {
        let page = self.backend.public_store(&self.slug).await?;
        let stale: Vec<ItemId> = self
            .cart
            .lines()
            .iter()
            .filter(|line| !page.items.iter().any(|item| item.item_id == line.item_id))
            .map(|line| line.item_id)
            .collect();
        for item_id in stale {
            debug!(%item_id, "dropping unavailable item from cart");
            self.cart.remove_item(item_id);
        }
        let page: &PublicStorePage = self.page.insert(page);
        Ok(page)
    }

    pub fn is_open(&self) -> bool {
        self.page.as_ref().is_some_and(|page| page.is_open)
    }

    pub fn add_to_cart(&mut self, item_id: ItemId) -> Result<()> {
        let entry = CartEntry::from(self.item(item_id)?);
        self.cart.add_item(entry);
        Ok(())
    }

    pub fn update_quantity(&mut self, item_id: ItemId, quantity: u32) {
        self.cart.update_quantity(item_id, quantity);
    }

    pub fn remove_from_cart(&mut self, item_id: ItemId) {
        self.cart.remove_item(item_id);
    }

    pub fn total(&self) -> Decimal {
        self.cart.total()
    }

    pub fn checkout_message(&self, notes: Option<&str>) -> String {
        self.cart.format_checkout_message(notes)
    }

    /// Deep link that opens a chat with the store, cart summary prefilled.
    pub fn checkout_link(&self, notes: Option<&str>) -> Result<String> {
        let page = self.loaded()?;
        Ok(checkout::checkout_link(
            &self.messaging_host,
            &page.store.whatsapp,
            &self.cart,
            notes,
        )?)
    }

    pub fn contact_link(&self) -> Result<String> {
        let page = self.loaded()?;
        Ok(checkout::contact_link(
            &self.messaging_host,
            &page.store.whatsapp,
        )?)
    }

    /// Records the cart as a pending order. The cart is emptied only once the
    /// server accepts it.
    pub async fn submit_order(
        &mut self,
        customer: Customer,
        notes: Option<String>,
    ) -> Result<CheckoutResponse> {
        if self.cart.is_empty() {
            return Err(CheckoutError::EmptyCart.into());
        }
        let req = CheckoutRequest {
            customer,
            lines: self
                .cart
                .lines()
                .iter()
                .map(|line| CheckoutLine {
                    item_id: line.item_id,
                    quantity: line.quantity,
                })
                .collect(),
            notes,
        };
        let response = self.backend.checkout(&self.slug, &req).await?;
        info!(order_id = %response.order_id, store = %self.slug, total = %response.total, "order submitted");
        self.cart.clear();
        Ok(response)
    }

    fn loaded(&self) -> Result<&PublicStorePage> {
        self.page.as_ref().ok_or(ClientError::StoreNotLoaded)
    }

    fn item(&self, item_id: ItemId) -> Result<&CatalogItem> {
        self.loaded()?
            .items
            .iter()
            .find(|item| item.item_id == item_id)
            .ok_or(ClientError::UnknownItem(item_id.0))
    }
}

#[cfg(test)]
#[path = "tests/browser_tests.rs"]
mod tests;
