//! Template engine for rendering preview and index pages.

use minijinja::{context, Environment};

use crate::report::LogEntry;

/// A site entry on the index page.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SiteLink {
    /// Business name
    pub business_name: String,
    /// Website type label (falls back to "business")
    pub website_type: String,
    /// Output directory name
    pub slug: String,
    /// URL of the generated site
    pub url: String,
}

/// Context for rendering a preview page.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PreviewContext {
    /// The site being previewed
    pub site: SiteLink,
    /// Generated HTML source, shown in the code panel
    pub source: String,
    /// Rendered prompt HTML, empty when there is no prompt
    pub brief: String,
    /// Contact address used by the site
    pub contact_email: String,
    /// Whether the website type is on the allow-list
    pub allowed_type: bool,
    /// Generation log so far
    pub log: Vec<LogEntry>,
    /// Base URL
    pub base_url: String,
    /// Include the dev server reload script
    pub live_reload: bool,
}

/// Template engine using minijinja.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a new template engine with the built-in templates.
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();

        env.add_template_owned("base.html".to_string(), BASE_TEMPLATE.to_string())?;
        env.add_template_owned("preview.html".to_string(), PREVIEW_TEMPLATE.to_string())?;
        env.add_template_owned("index.html".to_string(), INDEX_TEMPLATE.to_string())?;

        Ok(Self { env })
    }

    /// Render the preview page for one site.
    pub fn render_preview(&self, context: &PreviewContext) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template("preview.html")?;

        tmpl.render(context! {
            title => &context.site.business_name,
            site => &context.site,
            source => &context.source,
            brief => &context.brief,
            contact_email => &context.contact_email,
            allowed_type => context.allowed_type,
            log => &context.log,
            base_url => &context.base_url,
            live_reload => context.live_reload,
        })
    }

    /// Render the index page listing every site.
    pub fn render_index(
        &self,
        sites: &[SiteLink],
        base_url: &str,
        live_reload: bool,
    ) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template("index.html")?;

        tmpl.render(context! {
            title => "Generated sites",
            sites => sites,
            base_url => base_url,
            live_reload => live_reload,
        })
    }
}

const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en" data-theme="light">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ title }} - sitesmith</title>
  <link rel="stylesheet" href="{{ base_url }}assets/preview.css">
</head>
<body>
  <header class="topbar">
    <a href="{{ base_url }}" class="brand">sitesmith</a>
    <button type="button" class="theme-toggle" data-theme-toggle aria-label="Toggle dark mode">Dark mode</button>
  </header>
  <main class="main">
    {% block content %}{% endblock %}
  </main>
  <script src="{{ base_url }}assets/preview.js"></script>
  {% if live_reload %}<script src="/__reload.js"></script>{% endif %}
</body>
</html>"##;

const PREVIEW_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<section class="summary">
  <h1>{{ site.business_name }}</h1>
  <p>
    <span class="badge">{{ site.website_type }}</span>
    {% if not allowed_type %}<span class="badge badge-warning">not on allow-list</span>{% endif %}
    <span class="contact">{{ contact_email }}</span>
  </p>
  {% if brief %}
  <div class="brief">
    <h2>Brief</h2>
    {{ brief | safe }}
  </div>
  {% endif %}
</section>

<nav class="tabs" role="tablist">
  <button type="button" class="tab active" data-tab="preview">Preview</button>
  <button type="button" class="tab" data-tab="code">Code</button>
  <button type="button" class="tab" data-tab="log">Log</button>
</nav>

<section class="panel active" data-panel="preview">
  <div class="devices">
    <button type="button" class="device active" data-device="desktop">Desktop</button>
    <button type="button" class="device" data-device="tablet">Tablet</button>
    <button type="button" class="device" data-device="mobile">Mobile</button>
  </div>
  <div class="device-frame" data-frame>
    <iframe src="index.html" title="{{ site.business_name }} preview"></iframe>
  </div>
</section>

<section class="panel" data-panel="code">
  <a class="download" href="index.html" download="{{ site.slug }}.html">Download HTML</a>
  <pre><code>{{ source }}</code></pre>
</section>

<section class="panel" data-panel="log">
  <ol class="log">
  {% for entry in log %}
    <li><span class="stage">{{ entry.stage }}</span> {{ entry.message }} <span class="elapsed">{{ entry.elapsed_ms }}ms</span></li>
  {% endfor %}
  </ol>
</section>
{% endblock %}"##;

const INDEX_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<h1>{{ title }}</h1>
{% if sites %}
<ul class="sites">
{% for site in sites %}
  <li class="site-card">
    <h2>{{ site.business_name or site.slug }}</h2>
    <span class="badge">{{ site.website_type }}</span>
    <a href="{{ site.url }}">Open site</a>
    <a href="{{ site.url }}preview.html">Preview</a>
  </li>
{% endfor %}
</ul>
{% else %}
<p>No sites configured.</p>
{% endif %}
{% endblock %}"##;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Stage;

    fn site() -> SiteLink {
        SiteLink {
            business_name: "Nova Studio".to_string(),
            website_type: "portfolio".to_string(),
            slug: "nova-studio".to_string(),
            url: "/nova-studio/".to_string(),
        }
    }

    #[test]
    fn renders_preview_page() {
        let engine = TemplateEngine::new().unwrap();

        let context = PreviewContext {
            site: site(),
            source: "<b>code</b>".to_string(),
            brief: "<p>Minimal</p>".to_string(),
            contact_email: "contact@novastudio.com".to_string(),
            allowed_type: true,
            log: vec![LogEntry {
                stage: Stage::Generate,
                message: "Generated 1200 bytes".to_string(),
                elapsed_ms: 0,
            }],
            base_url: "/".to_string(),
            live_reload: false,
        };

        let html = engine.render_preview(&context).unwrap();

        assert!(html.contains("<title>Nova Studio - sitesmith</title>"));
        assert!(html.contains("&lt;b&gt;code"));
        assert!(!html.contains("<b>code"));
        assert!(html.contains("<p>Minimal</p>"));
        assert!(html.contains("Generated 1200 bytes"));
        assert!(html.contains(r#"<iframe src="index.html""#));
        assert!(!html.contains("not on allow-list"));
        assert!(!html.contains("__reload.js"));
    }

    #[test]
    fn flags_unlisted_types_and_live_reload() {
        let engine = TemplateEngine::new().unwrap();

        let context = PreviewContext {
            site: SiteLink {
                website_type: "blog".to_string(),
                ..site()
            },
            source: String::new(),
            brief: String::new(),
            contact_email: "contact@novastudio.com".to_string(),
            allowed_type: false,
            log: vec![],
            base_url: "/".to_string(),
            live_reload: true,
        };

        let html = engine.render_preview(&context).unwrap();

        assert!(html.contains("not on allow-list"));
        assert!(html.contains("/__reload.js"));
        assert!(!html.contains("<h2>Brief</h2>"));
    }

    #[test]
    fn renders_index() {
        let engine = TemplateEngine::new().unwrap();

        let html = engine.render_index(&[site()], "/", false).unwrap();

        assert!(html.contains("Nova Studio"));
        assert!(html.contains("preview.html"));
        assert!(html.contains("portfolio"));

        let empty = engine.render_index(&[], "/", false).unwrap();
        assert!(empty.contains("No sites configured."));
    }
}
