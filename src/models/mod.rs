pub mod cart;
pub mod order;
pub mod product;

pub use cart::{CartLineItem, ProductId};
pub use order::{Order, OrderStatus, PaymentMethod};
pub use product::{NewProduct, Product, ProductPatch};
