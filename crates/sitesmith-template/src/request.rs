//! Website requests and the website type allow-list.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::generator::{contact_email, generate_website_with, Escaping};

/// Website types recognised by the builder.
///
/// The generator never consults this list; any type string is accepted and
/// echoed into the page. Callers that want validation check it themselves.
pub const ALLOWED_WEBSITE_TYPES: [&str; 4] = ["portfolio", "saas", "restaurant", "ecommerce"];

/// Check whether a type tag is on the allow-list (exact match).
pub fn is_allowed_website_type(website_type: &str) -> bool {
    ALLOWED_WEBSITE_TYPES.contains(&website_type)
}

/// A recognised website type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebsiteType {
    Portfolio,
    Saas,
    Restaurant,
    Ecommerce,
}

impl WebsiteType {
    /// All recognised types, in allow-list order.
    pub const ALL: [WebsiteType; 4] = [
        Self::Portfolio,
        Self::Saas,
        Self::Restaurant,
        Self::Ecommerce,
    ];

    /// The tag used in requests and in the generated page.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Portfolio => "portfolio",
            Self::Saas => "saas",
            Self::Restaurant => "restaurant",
            Self::Ecommerce => "ecommerce",
        }
    }
}

impl fmt::Display for WebsiteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WebsiteType {
    type Err = UnknownWebsiteType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == tag)
            .ok_or_else(|| UnknownWebsiteType(s.to_string()))
    }
}

/// A type tag outside the allow-list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown website type '{0}' (expected one of: portfolio, saas, restaurant, ecommerce)")]
pub struct UnknownWebsiteType(pub String);

/// Inputs for a single generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebsiteRequest {
    /// Business name, free text
    #[serde(default)]
    pub business_name: String,

    /// Website type tag, normally one of [`ALLOWED_WEBSITE_TYPES`]
    #[serde(default)]
    pub website_type: String,

    /// Free-form description of the desired site
    #[serde(default)]
    pub prompt: String,
}

impl WebsiteRequest {
    /// Create a new request.
    pub fn new(
        business_name: impl Into<String>,
        website_type: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            business_name: business_name.into(),
            website_type: website_type.into(),
            prompt: prompt.into(),
        }
    }

    /// Generate the HTML document, inserting values verbatim.
    pub fn generate(&self) -> String {
        self.generate_with(Escaping::None)
    }

    /// Generate the HTML document with the given escaping mode.
    pub fn generate_with(&self, escaping: Escaping) -> String {
        generate_website_with(
            &self.business_name,
            &self.website_type,
            &self.prompt,
            escaping,
        )
    }

    /// Contact address embedded in the generated page.
    pub fn contact_email(&self) -> String {
        contact_email(&self.business_name)
    }

    /// Parse the type tag.
    pub fn website_type(&self) -> Result<WebsiteType, UnknownWebsiteType> {
        self.website_type.parse()
    }

    /// Whether the type tag is on the allow-list.
    pub fn has_allowed_type(&self) -> bool {
        is_allowed_website_type(&self.website_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::generate_website;

    #[test]
    fn allow_list_is_fixed() {
        assert_eq!(
            ALLOWED_WEBSITE_TYPES,
            ["portfolio", "saas", "restaurant", "ecommerce"]
        );

        let from_enum: Vec<&str> = WebsiteType::ALL.iter().map(|t| t.as_str()).collect();
        assert_eq!(from_enum, ALLOWED_WEBSITE_TYPES);
    }

    #[test]
    fn unlisted_type_still_generates() {
        assert!(!is_allowed_website_type("blog"));

        let html = generate_website("Acme", "blog", "");
        assert!(html.contains("Welcome to our blog"));
    }

    #[test]
    fn parses_website_types() {
        assert_eq!("saas".parse::<WebsiteType>(), Ok(WebsiteType::Saas));
        assert_eq!(" Restaurant ".parse::<WebsiteType>(), Ok(WebsiteType::Restaurant));
        assert_eq!(
            "blog".parse::<WebsiteType>(),
            Err(UnknownWebsiteType("blog".to_string()))
        );
        assert_eq!(WebsiteType::Ecommerce.to_string(), "ecommerce");
    }

    #[test]
    fn allow_list_check_is_exact() {
        assert!(is_allowed_website_type("portfolio"));
        assert!(!is_allowed_website_type("Portfolio"));
        assert!(!is_allowed_website_type(""));
    }

    #[test]
    fn request_delegates_to_generator() {
        let request = WebsiteRequest::new("Nova Studio", "saas", "a prompt");

        assert_eq!(request.generate(), generate_website("Nova Studio", "saas", "a prompt"));
        assert_eq!(request.contact_email(), "contact@novastudio.com");
        assert!(request.has_allowed_type());
        assert_eq!(request.website_type(), Ok(WebsiteType::Saas));
    }

    #[test]
    fn deserializes_with_missing_fields() {
        let request: WebsiteRequest =
            serde_json::from_str(r#"{"business_name": "Acme"}"#).unwrap();

        assert_eq!(request, WebsiteRequest::new("Acme", "", ""));
        assert!(request.generate().contains("Welcome to our business"));
    }
}
