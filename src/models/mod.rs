//! Data models
//!
//! Plain data carried between the repositories, the services and the
//! templates:
//! - Database entities (News, Category, User, Session)
//! - Listing and pagination types
//! - Input types for creation

mod category;
mod news;
mod pagination;
mod session;
mod user;

pub use category::{Category, CategoryWithCount};
pub use news::{CreateNewsInput, News, NewsFilter, NewsWithCategory};
pub use pagination::{page_count, resolve_page, InvalidPage, ListParams, PageInfo, PagedResult};
pub use session::Session;
pub use user::User;
