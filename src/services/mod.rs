//! Services layer - Business logic
//!
//! Services sit between the web handlers and the repositories. They are
//! responsible for:
//! - Implementing business rules
//! - Mapping repository failures into typed errors
//! - Talking to external collaborators (mail)

pub mod category;
pub mod mail;
pub mod news;
pub mod password;
pub mod user;

pub use category::{CategoryService, CategoryServiceError};
pub use mail::{ConsoleMailer, MailService, MailTransport, OutgoingMail, SmtpMailer};
pub use news::{NewsService, NewsServiceError};
pub use password::{hash_password, verify_password};
pub use user::{LoginInput, RegisterInput, UserService, UserServiceError};
