//! Business website template generator.
//!
//! Turns a business name and website type into a complete, self-contained
//! HTML document. The output is a fixed single-page layout; only the name,
//! the type tag and the derived contact address vary between calls.

pub mod generator;
pub mod request;

pub use generator::{
    contact_email, generate_website, generate_website_with, Escaping, Feature, FEATURES,
};
pub use request::{
    is_allowed_website_type, UnknownWebsiteType, WebsiteRequest, WebsiteType,
    ALLOWED_WEBSITE_TYPES,
};
