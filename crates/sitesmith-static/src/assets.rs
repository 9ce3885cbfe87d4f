//! Asset pipeline for the preview page stylesheet and script.

/// Asset pipeline utilities.
pub struct AssetPipeline;

impl AssetPipeline {
    /// Generate the preview stylesheet.
    pub fn generate_css() -> String {
        PREVIEW_CSS.to_string()
    }

    /// Generate the preview script (tabs, device switcher, theme toggle).
    pub fn generate_js() -> String {
        PREVIEW_JS.to_string()
    }

    /// Minify CSS using lightningcss.
    pub fn minify_css(css: &str) -> Result<String, String> {
        use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

        let stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| format!("CSS parse error: {}", e))?;

        let minified = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| format!("CSS minify error: {}", e))?;

        Ok(minified.code)
    }
}

const PREVIEW_CSS: &str = r#"/* sitesmith preview theme */

:root {
  --background: #ffffff;
  --foreground: #1a202c;
  --muted: #f1f5f9;
  --muted-foreground: #64748b;
  --border: #e2e8f0;
  --primary: #667eea;
  --primary-foreground: #ffffff;
  --warning: #d97706;
  --radius: 0.5rem;
  --frame-width: 100%;
}

[data-theme="dark"] {
  --background: #0f172a;
  --foreground: #e2e8f0;
  --muted: #1e293b;
  --muted-foreground: #94a3b8;
  --border: #334155;
}

* {
  box-sizing: border-box;
  margin: 0;
  padding: 0;
}

body {
  font-family: system-ui, -apple-system, sans-serif;
  background: var(--background);
  color: var(--foreground);
  line-height: 1.6;
}

.topbar {
  display: flex;
  align-items: center;
  justify-content: space-between;
  padding: 1rem 2rem;
  border-bottom: 1px solid var(--border);
}

.brand {
  font-weight: 700;
  font-size: 1.25rem;
  color: var(--foreground);
  text-decoration: none;
}

.main {
  max-width: 1280px;
  margin: 0 auto;
  padding: 2rem;
}

.summary h1 {
  font-size: 2rem;
  margin-bottom: 0.5rem;
}

.badge {
  display: inline-block;
  padding: 0.125rem 0.625rem;
  font-size: 0.75rem;
  font-weight: 600;
  border-radius: 999px;
  background: var(--primary);
  color: var(--primary-foreground);
}

.badge-warning {
  background: var(--warning);
}

.contact {
  margin-left: 0.5rem;
  color: var(--muted-foreground);
}

.brief {
  margin: 1.5rem 0;
  padding: 1rem 1.25rem;
  background: var(--muted);
  border-radius: var(--radius);
}

.brief h2 {
  font-size: 0.75rem;
  text-transform: uppercase;
  letter-spacing: 0.05em;
  color: var(--muted-foreground);
  margin-bottom: 0.5rem;
}

.tabs,
.devices {
  display: flex;
  gap: 0.5rem;
  margin: 1.5rem 0 1rem;
}

.tab,
.device,
.theme-toggle {
  padding: 0.375rem 0.875rem;
  font: inherit;
  font-size: 0.875rem;
  background: var(--muted);
  color: var(--foreground);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  cursor: pointer;
}

.tab.active,
.device.active {
  background: var(--primary);
  color: var(--primary-foreground);
  border-color: var(--primary);
}

.panel {
  display: none;
}

.panel.active {
  display: block;
}

.device-frame {
  width: var(--frame-width);
  margin: 0 auto;
  border: 1px solid var(--border);
  border-radius: var(--radius);
  overflow: hidden;
  transition: width 0.3s;
}

.device-frame iframe {
  display: block;
  width: 100%;
  height: 720px;
  border: 0;
  background: #ffffff;
}

.download {
  display: inline-block;
  margin-bottom: 0.75rem;
  color: var(--primary);
}

pre {
  background: var(--muted);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 1rem;
  overflow-x: auto;
  font-family: ui-monospace, monospace;
  font-size: 0.8125rem;
}

.log {
  list-style: decimal inside;
  font-family: ui-monospace, monospace;
  font-size: 0.875rem;
}

.log .stage {
  font-weight: 600;
  color: var(--primary);
}

.log .elapsed {
  color: var(--muted-foreground);
}

.sites {
  list-style: none;
  display: grid;
  grid-template-columns: repeat(auto-fill, minmax(260px, 1fr));
  gap: 1rem;
  margin-top: 1.5rem;
}

.site-card {
  padding: 1.25rem;
  border: 1px solid var(--border);
  border-radius: var(--radius);
}

.site-card a {
  margin-right: 0.75rem;
  color: var(--primary);
}
"#;

const PREVIEW_JS: &str = r#"// sitesmith preview runtime
(function() {
  'use strict';

  const DEVICE_WIDTHS = { desktop: '100%', tablet: '768px', mobile: '375px' };
  const root = document.documentElement;

  // Theme toggle, remembered across pages
  const stored = localStorage.getItem('sitesmith-theme');
  if (stored) {
    root.dataset.theme = stored;
  }

  document.querySelectorAll('[data-theme-toggle]').forEach(btn => {
    btn.addEventListener('click', () => {
      const next = root.dataset.theme === 'dark' ? 'light' : 'dark';
      root.dataset.theme = next;
      localStorage.setItem('sitesmith-theme', next);
    });
  });

  // Preview / Code / Log tabs
  const tabs = document.querySelectorAll('.tab');
  const panels = document.querySelectorAll('.panel');

  tabs.forEach(tab => {
    tab.addEventListener('click', () => {
      tabs.forEach(t => t.classList.toggle('active', t === tab));
      panels.forEach(p => p.classList.toggle('active', p.dataset.panel === tab.dataset.tab));
    });
  });

  // Device switcher
  const frame = document.querySelector('[data-frame]');
  const devices = document.querySelectorAll('.device');

  devices.forEach(btn => {
    btn.addEventListener('click', () => {
      devices.forEach(d => d.classList.toggle('active', d === btn));
      if (frame) {
        frame.style.setProperty('--frame-width', DEVICE_WIDTHS[btn.dataset.device] || '100%');
      }
    });
  });
})();
"#;
