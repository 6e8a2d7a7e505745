//! Response security headers and content security policy.
//!
//! Production responses get `X-Frame-Options`, `X-Content-Type-Options` and
//! `Referrer-Policy`. Development responses are left untouched. Static pages
//! also carry the policy as `<meta http-equiv>` tags, except
//! `X-Frame-Options`, which browsers only honor as a real header.

use http::header::{
    HeaderMap, HeaderName, HeaderValue, CONTENT_SECURITY_POLICY, REFERRER_POLICY,
    X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
};

use crate::config::SecurityConfig;
use crate::error::{Error, Result};

/// The production security headers.
#[derive(Debug, Clone)]
pub struct SecurityHeaders {
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl SecurityHeaders {
    pub fn from_config(config: &SecurityConfig) -> Result<Self> {
        let value = |name: &str, v: &str| {
            HeaderValue::from_str(v).map_err(|e| Error::Header(format!("{name}: {e}")))
        };
        Ok(Self {
            headers: vec![
                (X_FRAME_OPTIONS, value("X-Frame-Options", &config.frame_options)?),
                (
                    X_CONTENT_TYPE_OPTIONS,
                    value("X-Content-Type-Options", &config.content_type_options)?,
                ),
                (REFERRER_POLICY, value("Referrer-Policy", &config.referrer_policy)?),
            ],
        })
    }

    /// Insert the headers when serving production; otherwise leave `headers`
    /// as it is. Existing values for these names are replaced.
    pub fn apply(&self, headers: &mut HeaderMap, production: bool) {
        if !production {
            return;
        }
        for (name, value) in &self.headers {
            headers.insert(name.clone(), value.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &HeaderValue)> {
        self.headers.iter().map(|(n, v)| (n, v))
    }
}

/// Content security policy for the site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentSecurityPolicy {
    script_origins: Vec<String>,
    style_origins: Vec<String>,
    font_origins: Vec<String>,
    connect_origins: Vec<String>,
}

impl ContentSecurityPolicy {
    pub fn from_config(config: &SecurityConfig) -> Self {
        Self {
            script_origins: config.script_origins.clone(),
            style_origins: config.style_origins.clone(),
            font_origins: config.font_origins.clone(),
            connect_origins: config.connect_origins.clone(),
        }
    }

    /// Render the policy string.
    pub fn render(&self) -> String {
        let directive = |name: &str, base: &[&str], extra: &[String]| {
            let mut sources: Vec<&str> = base.to_vec();
            sources.extend(extra.iter().map(String::as_str));
            format!("{name} {}", sources.join(" "))
        };

        [
            "default-src 'self'".to_string(),
            directive("script-src", &["'self'", "'unsafe-inline'"], &self.script_origins),
            directive("style-src", &["'self'", "'unsafe-inline'"], &self.style_origins),
            directive("font-src", &["'self'"], &self.font_origins),
            "img-src 'self' data:".to_string(),
            directive("connect-src", &["'self'"], &self.connect_origins),
        ]
        .join("; ")
    }

    pub fn header_value(&self) -> Result<HeaderValue> {
        HeaderValue::from_str(&self.render())
            .map_err(|e| Error::Header(format!("Content-Security-Policy: {e}")))
    }
}

/// Render the `<meta http-equiv>` tags for static pages.
pub fn meta_tags(config: &SecurityConfig) -> String {
    let csp = ContentSecurityPolicy::from_config(config).render();
    [
        meta_tag(X_CONTENT_TYPE_OPTIONS.as_str(), &config.content_type_options),
        meta_tag(CONTENT_SECURITY_POLICY.as_str(), &csp),
    ]
    .join("\n")
}

fn meta_tag(name: &str, content: &str) -> String {
    format!(
        "<meta http-equiv=\"{}\" content=\"{}\" />",
        canonical_header_name(name),
        escape_attribute(content)
    )
}

/// `x-content-type-options` -> `X-Content-Type-Options`
fn canonical_header_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

pub(crate) fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
