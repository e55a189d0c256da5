//! Domain models
//!
//! Entities plus their Create/Update DTOs. sqlx derives are gated behind
//! the `db` feature so non-server consumers stay lightweight.

pub mod address;
pub mod cart;
pub mod inventory;
pub mod order;
pub mod payment;
pub mod preorder;
pub mod product;
pub mod review;
pub mod user;
pub mod wishlist;

// Re-exports
pub use address::{Address, AddressCreate, AddressUpdate};
pub use cart::{Cart, CartDetail, CartItem, CartItemAdd, CartItemUpdate, CartLine};
pub use inventory::{Inventory, InventorySet};
pub use order::{
    Order, OrderCreate, OrderDetail, OrderItem, OrderStatus, OrderStatusHistory, OrderType,
    StatusUpdate,
};
pub use payment::{Payment, PaymentStatus, PaymentUpdate};
pub use preorder::{
    Preorder, PreorderCancel, PreorderCreate, PreorderDetail, PreorderStatus,
    PreorderStatusHistory, RefundInfo,
};
pub use product::{
    Product, ProductCreate, ProductDetail, ProductUpdate, ProductVariant, StockStatus,
    VariantCreate, VariantUpdate, VariantWithInventory,
};
pub use review::{Review, ReviewCreate, ReviewUpdate, ReviewWithAuthor};
pub use user::{
    LoginRequest, LoginResponse, ProfileUpdate, User, UserRegister, UserUpdate, ROLE_ADMIN,
    ROLE_CUSTOMER,
};
pub use wishlist::{WishlistAdd, WishlistItem, WishlistLine};
