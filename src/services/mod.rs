pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod orders;

pub use cart::CartService;
pub use catalog::ProductCatalogService;
pub use checkout::{validate_checkout_form, CheckoutField, CheckoutForm, CheckoutService};
pub use orders::OrderService;
