//! Static site builder.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Instant;

use rayon::prelude::*;
use regex::Regex;
use tokio::sync::watch;

use sitesmith_template::{Escaping, WebsiteRequest};

use crate::assets::AssetPipeline;
use crate::report::{GenerationLog, ManifestEntry};
use crate::task::{CancelHandle, GenerationTask, Progress, Stage, Tracker};
use crate::templates::{PreviewContext, SiteLink, TemplateEngine};

/// Output directory names that sites may not use.
const RESERVED_SLUGS: &[&str] = &["assets"];

static SLUG_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("slug separator pattern is valid"));

/// A site to generate.
#[derive(Debug, Clone, Default)]
pub struct SiteSpec {
    /// Generation inputs
    pub request: WebsiteRequest,

    /// Output directory name (derived from the business name when absent)
    pub slug: Option<String>,
}

impl SiteSpec {
    /// Create a site with a derived slug.
    pub fn new(request: WebsiteRequest) -> Self {
        Self {
            request,
            slug: None,
        }
    }
}

/// Configuration for building a static site.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Output directory
    pub output_dir: PathBuf,

    /// Base URL for the site
    pub base_url: String,

    /// Sites to generate
    pub sites: Vec<SiteSpec>,

    /// Minify the preview stylesheet
    pub minify: bool,

    /// How request values are written into generated pages
    pub escaping: Escaping,

    /// Reject website types outside the allow-list
    pub strict_types: bool,

    /// Include the dev server reload script in preview pages
    pub live_reload: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("dist"),
            base_url: "/".to_string(),
            sites: vec![],
            minify: true,
            escaping: Escaping::None,
            strict_types: false,
            live_reload: false,
        }
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of sites generated
    pub sites: usize,

    /// Total size of the generated documents
    pub bytes: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("No sites configured")]
    NoSites,

    #[error("Unknown website type '{website_type}' for site '{slug}'")]
    UnknownWebsiteType { slug: String, website_type: String },

    #[error("Failed to render template: {0}")]
    TemplateError(String),

    #[error("Failed to write output: {0}")]
    WriteError(String),

    #[error("Build cancelled")]
    Cancelled,

    #[error("Build task failed: {0}")]
    TaskFailed(String),
}

/// A site with its final output directory name.
#[derive(Debug, Clone)]
struct PlannedSite {
    slug: String,
    request: WebsiteRequest,
}

/// Static site builder.
pub struct StaticBuilder {
    config: BuildConfig,
    templates: TemplateEngine,
}

impl StaticBuilder {
    /// Create a new static builder.
    pub fn new(config: BuildConfig) -> Result<Self, BuildError> {
        let templates =
            TemplateEngine::new().map_err(|e| BuildError::TemplateError(e.to_string()))?;

        Ok(Self { config, templates })
    }

    /// The configuration this builder was created with.
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Build the static site.
    pub async fn build(&self) -> Result<BuildResult, BuildError> {
        self.build_blocking()
    }

    /// Build the static site on the current thread.
    pub fn build_blocking(&self) -> Result<BuildResult, BuildError> {
        self.run(&Tracker::detached())
    }

    /// Run the build on the blocking pool, reporting progress as it goes.
    pub fn spawn(self) -> GenerationTask {
        let cancel = CancelHandle::default();
        let (tx, rx) = watch::channel(Progress::default());
        let tracker = Tracker::new(cancel.clone(), Some(tx));

        let handle = tokio::task::spawn_blocking(move || self.run(&tracker));

        GenerationTask::new(handle, rx, cancel)
    }

    fn run(&self, tracker: &Tracker) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        if self.config.sites.is_empty() {
            return Err(BuildError::NoSites);
        }

        let sites = plan_sites(&self.config.sites);
        self.check_types(&sites)?;

        tracker.start(sites.len() * Stage::PER_SITE.len() + 1);
        tracker.checkpoint()?;

        fs::create_dir_all(&self.config.output_dir)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        // Generate sites in parallel
        let results: Vec<Result<usize, BuildError>> = sites
            .par_iter()
            .map(|site| self.build_site(site, tracker))
            .collect();

        let mut bytes = 0;
        for result in results {
            bytes += result?;
        }

        tracker.checkpoint()?;
        self.finalize(&sites)?;
        tracker.advance("all sites", Stage::Finalize);

        let duration = start.elapsed();

        tracing::info!(
            "Generated {} sites ({} bytes) into {}",
            sites.len(),
            bytes,
            self.config.output_dir.display()
        );

        Ok(BuildResult {
            sites: sites.len(),
            bytes,
            duration_ms: duration.as_millis() as u64,
            output_dir: self.config.output_dir.clone(),
        })
    }

    /// Check website types against the allow-list.
    fn check_types(&self, sites: &[PlannedSite]) -> Result<(), BuildError> {
        for site in sites {
            let website_type = &site.request.website_type;
            if website_type.is_empty() || site.request.has_allowed_type() {
                continue;
            }

            if self.config.strict_types {
                return Err(BuildError::UnknownWebsiteType {
                    slug: site.slug.clone(),
                    website_type: website_type.clone(),
                });
            }

            tracing::warn!(
                "Website type '{}' for {} is not on the allow-list",
                website_type,
                site.slug
            );
        }

        Ok(())
    }

    /// Build a single site. Returns the size of the generated document.
    fn build_site(&self, site: &PlannedSite, tracker: &Tracker) -> Result<usize, BuildError> {
        let dir = self.config.output_dir.join(&site.slug);
        let mut log = GenerationLog::new(&site.slug, &site.request);

        tracker.checkpoint()?;
        let html = site.request.generate_with(self.config.escaping);
        log.bytes = html.len();
        log.record(
            Stage::Generate,
            format!(
                "Generated {} bytes for '{}'",
                html.len(),
                site.request.business_name
            ),
        );
        tracker.advance(&site.slug, Stage::Generate);

        tracker.checkpoint()?;
        fs::create_dir_all(&dir).map_err(|e| BuildError::WriteError(e.to_string()))?;
        fs::write(dir.join("index.html"), &html)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;
        log.record(Stage::WriteSite, format!("Wrote {}/index.html", site.slug));
        tracker.advance(&site.slug, Stage::WriteSite);

        tracker.checkpoint()?;
        let context = PreviewContext {
            site: self.site_link(site),
            source: html.clone(),
            brief: render_brief(&site.request.prompt),
            contact_email: log.contact_email.clone(),
            allowed_type: log.allowed_type,
            log: log.entries.clone(),
            base_url: self.config.base_url.clone(),
            live_reload: self.config.live_reload,
        };
        let preview = self
            .templates
            .render_preview(&context)
            .map_err(|e| BuildError::TemplateError(e.to_string()))?;
        fs::write(dir.join("preview.html"), preview)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;
        log.record(Stage::RenderPreview, "Rendered preview page");
        tracker.advance(&site.slug, Stage::RenderPreview);

        tracker.checkpoint()?;
        log.record(Stage::WriteLog, "Wrote generation log");
        let json = serde_json::to_string_pretty(&log)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;
        fs::write(dir.join("generation.json"), json)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;
        tracker.advance(&site.slug, Stage::WriteLog);

        Ok(html.len())
    }

    /// Write the index page, shared assets and manifest.
    fn finalize(&self, sites: &[PlannedSite]) -> Result<(), BuildError> {
        let links: Vec<SiteLink> = sites.iter().map(|s| self.site_link(s)).collect();

        let index = self
            .templates
            .render_index(&links, &self.config.base_url, self.config.live_reload)
            .map_err(|e| BuildError::TemplateError(e.to_string()))?;
        fs::write(self.config.output_dir.join("index.html"), index)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        self.generate_assets()?;

        let manifest: Vec<ManifestEntry> = sites
            .iter()
            .zip(&links)
            .map(|(site, link)| ManifestEntry {
                slug: site.slug.clone(),
                business_name: site.request.business_name.clone(),
                website_type: site.request.website_type.clone(),
                url: link.url.clone(),
            })
            .collect();

        let json = serde_json::to_string_pretty(&manifest)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;
        fs::write(self.config.output_dir.join("sites.json"), json)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Generate static assets.
    fn generate_assets(&self) -> Result<(), BuildError> {
        let assets_dir = self.config.output_dir.join("assets");
        fs::create_dir_all(&assets_dir).map_err(|e| BuildError::WriteError(e.to_string()))?;

        let css = AssetPipeline::generate_css();
        let css = if self.config.minify {
            AssetPipeline::minify_css(&css).unwrap_or(css)
        } else {
            css
        };
        fs::write(assets_dir.join("preview.css"), css)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        let js = AssetPipeline::generate_js();
        fs::write(assets_dir.join("preview.js"), js)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        Ok(())
    }

    fn site_link(&self, site: &PlannedSite) -> SiteLink {
        let website_type = if site.request.website_type.is_empty() {
            "business".to_string()
        } else {
            site.request.website_type.clone()
        };

        SiteLink {
            business_name: site.request.business_name.clone(),
            website_type,
            slug: site.slug.clone(),
            url: format!("{}{}/", self.config.base_url, site.slug),
        }
    }
}

/// Assign each site a unique output directory name, in declaration order.
fn plan_sites(sites: &[SiteSpec]) -> Vec<PlannedSite> {
    let mut used: HashSet<String> = RESERVED_SLUGS.iter().map(|s| s.to_string()).collect();

    sites
        .iter()
        .map(|site| {
            let base = slugify(site.slug.as_deref().unwrap_or(&site.request.business_name));

            let mut slug = base.clone();
            let mut n = 2;
            while used.contains(&slug) {
                slug = format!("{}-{}", base, n);
                n += 1;
            }
            used.insert(slug.clone());

            PlannedSite {
                slug,
                request: site.request.clone(),
            }
        })
        .collect()
}

/// Turn free text into a directory name: `"Nova Studio!"` becomes `nova-studio`.
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    let slug = SLUG_SEPARATOR.replace_all(&lower, "-");
    let slug = slug.trim_matches('-');

    if slug.is_empty() {
        "site".to_string()
    } else {
        slug.to_string()
    }
}

/// Render the prompt as Markdown. Raw HTML in the prompt is shown as text.
fn render_brief(prompt: &str) -> String {
    use pulldown_cmark::{html, Event, Options, Parser};

    if prompt.trim().is_empty() {
        return String::new();
    }

    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let parser = Parser::new_ext(prompt, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);

    html_output
}
