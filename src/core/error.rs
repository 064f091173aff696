//! Typed error handling for cart mutations
//!
//! Every failed mutation reports exactly one [`CartError`] kind, and the
//! cart and its persisted snapshot keep their pre-call state whenever one is
//! returned. Kinds are never collapsed so the display layer can tell
//! "out of stock" apart from "not in cart".
//!
//! # Example
//!
//! ```rust,ignore
//! match engine.add_item(ProductId::new(7)).await {
//!     Ok(cart) => render(&cart),
//!     Err(CartError::StockUnavailable { available, .. }) => {
//!         toast(format!("Only {available} left"));
//!     }
//!     Err(e) => toast(e.user_message()),
//! }
//! ```

use super::cart::ProductId;
use serde::Serialize;

/// Errors returned by the mutation engine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    /// Requested quantity exceeds what the inventory reports as available
    #[error(
        "product {product_id}: requested quantity {requested} exceeds available stock {available}"
    )]
    StockUnavailable {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// The operation targets a product that has no cart entry
    #[error("product {product_id} is not in the cart")]
    ProductNotFound { product_id: ProductId },

    /// A quantity below 1 was requested
    #[error("product {product_id}: invalid quantity {amount}, must be at least 1")]
    InvalidQuantity { product_id: ProductId, amount: i64 },

    /// The inventory service failed or did not answer in time
    #[error("inventory unreachable for product {product_id}: {message}")]
    InventoryUnreachable {
        product_id: ProductId,
        message: String,
    },

    /// The product catalog failed while looking up display data
    #[error("catalog unreachable for product {product_id}: {message}")]
    CatalogUnreachable {
        product_id: ProductId,
        message: String,
    },

    /// The durable snapshot could not be written or read
    #[error("persistence failure: {message}")]
    PersistenceFailure { message: String },

    /// A mutation task terminated abnormally
    #[error("internal error: {message}")]
    Internal { message: String },
}

/// Serializable error body for whatever transport exposes the engine
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl CartError {
    /// Stable machine-readable code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            CartError::StockUnavailable { .. } => "STOCK_UNAVAILABLE",
            CartError::ProductNotFound { .. } => "PRODUCT_NOT_FOUND",
            CartError::InvalidQuantity { .. } => "INVALID_QUANTITY",
            CartError::InventoryUnreachable { .. } => "INVENTORY_UNREACHABLE",
            CartError::CatalogUnreachable { .. } => "CATALOG_UNREACHABLE",
            CartError::PersistenceFailure { .. } => "PERSISTENCE_FAILURE",
            CartError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Short sentence suitable for a toast or inline message
    pub fn user_message(&self) -> &'static str {
        match self {
            CartError::StockUnavailable { .. } => "Requested quantity is out of stock",
            CartError::ProductNotFound { .. } => "This product is not in your cart",
            CartError::InvalidQuantity { .. } => "Quantity must be at least 1",
            CartError::InventoryUnreachable { .. } => {
                "Could not check stock right now, please try again"
            }
            CartError::CatalogUnreachable { .. } => {
                "Could not load product details right now, please try again"
            }
            CartError::PersistenceFailure { .. } => "Your cart could not be saved",
            CartError::Internal { .. } => "Something went wrong updating your cart",
        }
    }

    /// Product the failed request targeted, when there is one
    pub fn product_id(&self) -> Option<ProductId> {
        match self {
            CartError::StockUnavailable { product_id, .. }
            | CartError::ProductNotFound { product_id }
            | CartError::InvalidQuantity { product_id, .. }
            | CartError::InventoryUnreachable { product_id, .. }
            | CartError::CatalogUnreachable { product_id, .. } => Some(*product_id),
            CartError::PersistenceFailure { .. } | CartError::Internal { .. } => None,
        }
    }

    /// True for rejections decided by validation rather than by a failing
    /// collaborator
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            CartError::StockUnavailable { .. }
                | CartError::ProductNotFound { .. }
                | CartError::InvalidQuantity { .. }
        )
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            CartError::StockUnavailable {
                product_id,
                requested,
                available,
            } => Some(serde_json::json!({
                "product_id": product_id,
                "requested": requested,
                "available": available
            })),
            CartError::InvalidQuantity { product_id, amount } => Some(serde_json::json!({
                "product_id": product_id,
                "amount": amount
            })),
            _ => self
                .product_id()
                .map(|id| serde_json::json!({ "product_id": id })),
        }
    }

    pub(crate) fn inventory(product_id: ProductId, err: impl std::fmt::Display) -> Self {
        CartError::InventoryUnreachable {
            product_id,
            message: err.to_string(),
        }
    }

    pub(crate) fn catalog(product_id: ProductId, err: impl std::fmt::Display) -> Self {
        CartError::CatalogUnreachable {
            product_id,
            message: err.to_string(),
        }
    }

    pub(crate) fn persistence(err: impl std::fmt::Display) -> Self {
        CartError::PersistenceFailure {
            message: err.to_string(),
        }
    }
}
