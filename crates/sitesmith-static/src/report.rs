//! Generation logs and the site manifest.

use std::time::Instant;

use serde::Serialize;
use sitesmith_template::WebsiteRequest;

use crate::task::Stage;

/// A single line in a generation log.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    /// Stage that produced the entry
    pub stage: Stage,
    /// Human-readable message
    pub message: String,
    /// Milliseconds since the site build started
    pub elapsed_ms: u64,
}

/// Generation log written next to each site as `generation.json`.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationLog {
    /// Output directory name
    pub slug: String,
    /// The request the site was generated from
    pub request: WebsiteRequest,
    /// Contact address embedded in the page
    pub contact_email: String,
    /// Whether the website type is on the allow-list
    pub allowed_type: bool,
    /// Size of the generated document in bytes
    pub bytes: usize,
    /// Ordered log entries
    pub entries: Vec<LogEntry>,

    #[serde(skip)]
    started: Option<Instant>,
}

impl GenerationLog {
    /// Start a log for a site.
    pub fn new(slug: &str, request: &WebsiteRequest) -> Self {
        Self {
            slug: slug.to_string(),
            request: request.clone(),
            contact_email: request.contact_email(),
            allowed_type: request.has_allowed_type(),
            bytes: 0,
            entries: Vec::new(),
            started: Some(Instant::now()),
        }
    }

    /// Append an entry.
    pub fn record(&mut self, stage: Stage, message: impl Into<String>) {
        let elapsed_ms = self
            .started
            .map(|s| s.elapsed().as_millis() as u64)
            .unwrap_or_default();

        self.entries.push(LogEntry {
            stage,
            message: message.into(),
            elapsed_ms,
        });
    }
}

/// An entry in `sites.json`.
#[derive(Debug, Clone, Serialize)]
pub struct ManifestEntry {
    pub slug: String,
    pub business_name: String,
    pub website_type: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_entries_in_order() {
        let request = WebsiteRequest::new("Nova Studio", "blog", "");
        let mut log = GenerationLog::new("nova-studio", &request);

        log.record(Stage::Generate, "first");
        log.record(Stage::WriteSite, "second");

        assert_eq!(log.contact_email, "contact@novastudio.com");
        assert!(!log.allowed_type);
        assert_eq!(log.entries.len(), 2);
        assert_eq!(log.entries[0].message, "first");
        assert_eq!(log.entries[1].stage, Stage::WriteSite);
    }

    #[test]
    fn serializes_without_timer() {
        let request = WebsiteRequest::new("Acme", "saas", "");
        let mut log = GenerationLog::new("acme", &request);
        log.record(Stage::Generate, "done");

        let json = serde_json::to_value(&log).unwrap();

        assert_eq!(json["slug"], "acme");
        assert_eq!(json["request"]["website_type"], "saas");
        assert_eq!(json["entries"][0]["stage"], "generate");
        assert!(json.get("started").is_none());
    }
}
