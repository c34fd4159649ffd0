//! Aggregates module
pub mod cart;
pub mod catalog;
pub mod content;
pub mod customer;
pub mod order;
pub mod product;

pub use cart::{Cart, CartError, CartItem, CartTotals, ShippingPolicy};
pub use catalog::{Brand, Category, Company};
pub use content::{CarouselSlide, MenuItem};
pub use customer::{CustomerUser, PasswordError, PasswordHash};
pub use order::{generate_order_number, Address, Order, OrderDetail, OrderError, OrderItem, OrderStatus, PaymentStatus};
pub use product::{Product, ProductError, ProductView, SaleCountdown, SaleError, SalePrice};
