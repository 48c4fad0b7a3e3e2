//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `cart` - The visitor's cart, mirrored to session storage
//! - `email` - Order confirmation email
//! - `order_id` - Collision-checked `YARN-` order ids
//! - `storage` - Key-value storage port behind the cart

pub mod cart;
pub mod email;
pub mod order_id;
pub mod storage;

pub use cart::{CartState, CartStore};
pub use email::{EmailService, MailerError};
pub use order_id::{MAX_ATTEMPTS, OrderIdGenerator, OrderLookup};
pub use storage::{KeyValueStorage, MemoryStorage, SessionStorage, StorageError};
