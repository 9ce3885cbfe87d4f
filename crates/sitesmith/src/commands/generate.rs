//! Generate a single site.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use sitesmith_template::{Escaping, UnknownWebsiteType, WebsiteRequest};

/// Flags for the generate command.
#[derive(Debug, Default)]
pub struct Options {
    pub escape: bool,
    pub strict: bool,
    pub output: Option<PathBuf>,
}

/// Run the generate command.
pub fn run(
    name: String,
    website_type: Option<String>,
    prompt: Option<String>,
    options: Options,
) -> Result<()> {
    let request = WebsiteRequest::new(
        name,
        website_type.unwrap_or_default(),
        prompt.unwrap_or_default(),
    );

    let html = render(&request, &options)?;

    match options.output {
        Some(path) => {
            fs::write(&path, &html)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Wrote {} bytes to {}", html.len(), path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(html.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }

    Ok(())
}

/// Validate (when strict) and generate the document.
fn render(request: &WebsiteRequest, options: &Options) -> Result<String> {
    // Exact match, same as the builder's strict_types check.
    if options.strict && !request.website_type.is_empty() && !request.has_allowed_type() {
        return Err(UnknownWebsiteType(request.website_type.clone()).into());
    }

    let escaping = if options.escape {
        Escaping::Html
    } else {
        Escaping::None
    };

    Ok(request.generate_with(escaping))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn strict_mode_rejects_unknown_types() {
        let options = Options {
            strict: true,
            ..Default::default()
        };

        let err = render(&WebsiteRequest::new("Acme", "blog", ""), &options).unwrap_err();
        assert!(err.to_string().contains("blog"));

        assert!(render(&WebsiteRequest::new("Acme", "", ""), &options).is_ok());
        assert!(render(&WebsiteRequest::new("Acme", "saas", ""), &options).is_ok());
    }

    #[test]
    fn strict_mode_requires_exact_tags() {
        let options = Options {
            strict: true,
            ..Default::default()
        };

        for website_type in [" SaaS ", "Portfolio", "saas "] {
            let err = render(&WebsiteRequest::new("Acme", website_type, ""), &options).unwrap_err();
            assert!(err.downcast_ref::<UnknownWebsiteType>().is_some());
        }
    }

    #[test]
    fn lenient_mode_accepts_any_type() {
        let html = render(&WebsiteRequest::new("Acme", "blog", ""), &Options::default()).unwrap();
        assert!(html.contains("Welcome to our blog"));
    }

    #[test]
    fn writes_to_output_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("site.html");

        run(
            "Nova Studio".to_string(),
            Some("portfolio".to_string()),
            None,
            Options {
                output: Some(path.clone()),
                ..Default::default()
            },
        )
        .unwrap();

        let html = fs::read_to_string(&path).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("contact@novastudio.com"));
    }
}
