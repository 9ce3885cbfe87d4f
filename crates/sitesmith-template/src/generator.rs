//! HTML document generation.

use std::borrow::Cow;

use minijinja::HtmlEscape;

/// A feature card shown on every generated site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feature {
    /// Card heading
    pub title: &'static str,
    /// Card body text
    pub description: &'static str,
}

/// The three feature cards. Content does not depend on the request.
pub const FEATURES: [Feature; 3] = [
    Feature {
        title: "Professional Service",
        description: "We deliver exceptional quality and attention to detail in everything we do.",
    },
    Feature {
        title: "Quality Assurance",
        description: "Our commitment to excellence ensures you receive the best possible results.",
    },
    Feature {
        title: "Customer Support",
        description: "Our dedicated team is here to help you every step of the way.",
    },
];

/// How request values are written into the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Escaping {
    /// Values are inserted verbatim.
    #[default]
    None,
    /// Values are HTML-escaped; the contact address is also escaped as a
    /// single-quoted JavaScript string inside the `onclick` handler.
    Html,
}

impl Escaping {
    fn text<'a>(self, value: &'a str) -> Cow<'a, str> {
        match self {
            Self::None => Cow::Borrowed(value),
            Self::Html => Cow::Owned(HtmlEscape(value).to_string()),
        }
    }

    fn script_string<'a>(self, value: &'a str) -> Cow<'a, str> {
        match self {
            Self::None => Cow::Borrowed(value),
            Self::Html => Cow::Owned(HtmlEscape(&escape_single_quoted(value)).to_string()),
        }
    }
}

/// Derive the contact address shown by the call-to-action button.
///
/// The business name is lowercased and stripped of whitespace:
/// `"Nova Studio"` becomes `contact@novastudio.com`. The result is not
/// validated as an email address.
pub fn contact_email(business_name: &str) -> String {
    let domain: String = business_name
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    format!("contact@{}.com", domain)
}

/// Generate a complete HTML document for a business website.
///
/// Values are inserted without escaping. `prompt` is accepted for symmetry
/// with callers and is not read.
pub fn generate_website(business_name: &str, website_type: &str, prompt: &str) -> String {
    generate_website_with(business_name, website_type, prompt, Escaping::None)
}

/// Generate a business website with an explicit escaping mode.
pub fn generate_website_with(
    business_name: &str,
    website_type: &str,
    _prompt: &str,
    escaping: Escaping,
) -> String {
    let website_type = if website_type.is_empty() {
        "business"
    } else {
        website_type
    };

    let email = contact_email(business_name);

    let name = escaping.text(business_name);
    let kind = escaping.text(website_type);
    let email = escaping.script_string(&email);

    let cards: String = FEATURES
        .iter()
        .map(|feature| {
            format!(
                r#"
            <div class="feature-card">
                <h3>{}</h3>
                <p>{}</p>
            </div>"#,
                feature.title, feature.description
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{name}</title>
    <style>{style}    </style>
</head>
<body>
    <header>
        <h1>{name}</h1>
        <p>Welcome to our {kind}</p>
    </header>

    <main class="container">
        <section class="features">{cards}
        </section>

        <section class="cta">
            <button class="cta-button" onclick="alert('Contact us at {email}')">Get in Touch</button>
        </section>
    </main>

    <footer>
        <p>© 2025 {name}. All rights reserved.</p>
    </footer>
</body>
</html>"#,
        name = name,
        kind = kind,
        cards = cards,
        email = email,
        style = STYLE,
    )
}

/// Escape a value for use inside a single-quoted JavaScript string.
fn escape_single_quoted(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            _ => escaped.push(c),
        }
    }
    escaped
}

const STYLE: &str = r#"
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; line-height: 1.6; color: #333; background: #f7fafc; }
        header { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 4rem 2rem; text-align: center; }
        header h1 { font-size: 3rem; margin-bottom: 1rem; }
        header p { font-size: 1.25rem; opacity: 0.9; }
        .container { max-width: 1200px; margin: 0 auto; padding: 4rem 2rem; }
        .features { display: grid; grid-template-columns: repeat(auto-fit, minmax(280px, 1fr)); gap: 2rem; margin-bottom: 3rem; }
        .feature-card { background: white; padding: 2rem; border-radius: 12px; box-shadow: 0 4px 6px rgba(0, 0, 0, 0.1); transition: transform 0.3s ease; }
        .feature-card:hover { transform: translateY(-4px); }
        .feature-card h3 { color: #667eea; margin-bottom: 1rem; }
        .cta { text-align: center; }
        .cta-button { background: #667eea; color: white; border: none; padding: 1rem 2.5rem; font-size: 1.1rem; border-radius: 50px; cursor: pointer; transition: background 0.3s ease; }
        .cta-button:hover { background: #764ba2; }
        footer { background: #1a202c; color: #a0aec0; text-align: center; padding: 2rem; }
"#;
