//! Analytics library bootstrap.
//!
//! Production pages load `gtag.js` for the configured measurement id and
//! configure it with first-party cookie settings. Development pages load
//! nothing, so the entry point never appears and events stay queued.

use serde_json::{json, Value};

use crate::config::Config;
use crate::dispatch::AnalyticsHost;
use crate::error::Result;
use crate::security::escape_attribute;
use crate::types::Parameters;

/// Where `gtag.js` is served from.
pub const SCRIPT_ORIGIN: &str = "https://www.googletagmanager.com";

/// Cookie flags sent with the `config` command.
pub const COOKIE_FLAGS: &str = "SameSite=None;Secure";

pub const CONFIG_COMMAND: &str = "config";

/// The `gtag.js` loader and `config` command for one measurement id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bootstrap {
    measurement_id: String,
    cookie_domain: String,
}

impl Bootstrap {
    pub fn new(measurement_id: impl Into<String>, cookie_domain: impl Into<String>) -> Self {
        Self {
            measurement_id: measurement_id.into(),
            cookie_domain: cookie_domain.into(),
        }
    }

    /// The bootstrap for a production site; `None` in development.
    pub fn from_config(config: &Config) -> Option<Self> {
        if !config.site.production {
            tracing::info!("Development mode, skipping GA scripts");
            return None;
        }
        tracing::info!(
            measurement_id = %config.analytics.measurement_id,
            "Production mode confirmed, loading GA scripts"
        );
        Some(Self::new(
            config.analytics.measurement_id.clone(),
            config.site.hostname.clone(),
        ))
    }

    pub fn measurement_id(&self) -> &str {
        &self.measurement_id
    }

    pub fn script_src(&self) -> String {
        format!("{SCRIPT_ORIGIN}/gtag/js?id={}", self.measurement_id)
    }

    /// Parameters of the `config` command.
    pub fn config_parameters(&self) -> Parameters {
        let mut parameters = Parameters::new();
        parameters.insert("cookie_domain".to_string(), json!(self.cookie_domain));
        parameters.insert("cookie_flags".to_string(), json!(COOKIE_FLAGS));
        parameters
    }

    /// Send the `config` command straight to the entry point.
    ///
    /// Returns `false` without calling anything when the entry point is
    /// missing.
    pub fn configure(&self, host: &mut dyn AnalyticsHost) -> Result<bool> {
        if !host.is_available() {
            return Ok(false);
        }
        host.call(
            CONFIG_COMMAND,
            &self.measurement_id,
            &self.config_parameters(),
        )?;
        Ok(true)
    }

    /// The `<script>` tags for the page head.
    pub fn render(&self) -> String {
        let id = script_literal(&Value::String(self.measurement_id.clone()));
        let parameters = script_literal(&Value::Object(self.config_parameters()));
        format!(
            "<script async src=\"{src}\"></script>\n\
             <script>\n\
             \x20 window.dataLayer = window.dataLayer || [];\n\
             \x20 function gtag(){{dataLayer.push(arguments);}}\n\
             \x20 gtag('js', new Date());\n\
             \x20 gtag('config', {id}, {parameters});\n\
             </script>",
            src = escape_attribute(&self.script_src()),
        )
    }
}

/// JSON that is safe to embed in an inline script.
fn script_literal(value: &Value) -> String {
    value.to_string().replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::ScriptedHost;

    fn production() -> Config {
        let mut config = Config::default();
        config.site.production = true;
        config
    }

    #[test]
    fn test_development_loads_nothing() {
        assert_eq!(Bootstrap::from_config(&Config::default()), None);
    }

    #[test]
    fn test_production_uses_configured_id() {
        let mut config = production();
        config.analytics.measurement_id = "G-TEST123".to_string();

        let bootstrap = Bootstrap::from_config(&config).unwrap();

        assert_eq!(bootstrap.measurement_id(), "G-TEST123");
        assert_eq!(
            bootstrap.script_src(),
            "https://www.googletagmanager.com/gtag/js?id=G-TEST123"
        );
    }

    #[test]
    fn test_config_parameters() {
        let bootstrap = Bootstrap::from_config(&production()).unwrap();
        assert_eq!(
            Value::Object(bootstrap.config_parameters()),
            json!({
                "cookie_domain": "heliomedeiros.com",
                "cookie_flags": "SameSite=None;Secure",
            })
        );
    }

    #[test]
    fn test_render() {
        let html = Bootstrap::from_config(&production()).unwrap().render();

        assert!(html.starts_with(
            "<script async src=\"https://www.googletagmanager.com/gtag/js?id=G-GL0Q1PNV4W\"></script>"
        ));
        assert!(html.contains("  gtag('js', new Date());\n"));
        assert!(html.contains(
            r#"  gtag('config', "G-GL0Q1PNV4W", {"cookie_domain":"heliomedeiros.com","cookie_flags":"SameSite=None;Secure"});"#
        ));
        assert!(html.ends_with("</script>"));
    }

    #[test]
    fn test_render_cannot_close_script() {
        let html = Bootstrap::new("G-1", "</script><script>x").render();
        assert!(!html.contains("</script><script>x"));
    }

    #[test]
    fn test_configure_calls_entry_point() {
        let bootstrap = Bootstrap::from_config(&production()).unwrap();
        let mut host = ScriptedHost::available();

        assert!(bootstrap.configure(&mut host).unwrap());

        let calls = host.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].command, "config");
        assert_eq!(calls[0].name, "G-GL0Q1PNV4W");
        assert_eq!(calls[0].parameters, bootstrap.config_parameters());
    }

    #[test]
    fn test_configure_without_entry_point() {
        let bootstrap = Bootstrap::new("G-1", "example.org");
        let mut host = ScriptedHost::unavailable();

        assert!(!bootstrap.configure(&mut host).unwrap());
        assert!(host.calls().is_empty());
        assert!(host.page_queue().is_empty());
    }
}
