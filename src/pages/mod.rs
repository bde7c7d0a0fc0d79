//! Page rendering
//!
//! Pages are built from three Handlebars templates: a shared header, a shared
//! footer, and the home page body. The home template pulls the header and
//! footer in as partials; informational pages are static fragments wrapped
//! in the same header and footer.

use std::path::Path;
use handlebars::Handlebars;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::domain::Item;

pub const HEADER: &str = "header";
pub const FOOTER: &str = "footer";
pub const HOME: &str = "home";

/// Page rendering errors
#[derive(Debug, Error)]
pub enum PageError {
    #[error("Failed to read template {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid template: {0}")]
    InvalidTemplate(#[from] handlebars::TemplateError),
    #[error("Failed to render page: {0}")]
    Render(#[from] handlebars::RenderError),
}

/// Data for the header and footer
#[derive(Debug, Serialize)]
pub struct LayoutContext<'a> {
    pub title: &'a str,
}

/// Data for the home page
#[derive(Debug, Serialize)]
pub struct HomeContext<'a> {
    pub title: &'a str,
    pub items: &'a [Item],
}

/// A fixed informational page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoPage {
    Privacy,
    TermsOfUse,
    Nondiscrimination,
}

impl InfoPage {
    pub fn heading(&self) -> &'static str {
        match self {
            InfoPage::Privacy => "Privacy Policy",
            InfoPage::TermsOfUse => "Terms of Use",
            InfoPage::Nondiscrimination => "Nondiscrimination Policy",
        }
    }

    /// HTML fragment placed between header and footer
    pub fn body(&self) -> &'static str {
        match self {
            InfoPage::Privacy => "<h1>Privacy Policy</h1><p>Your privacy is important to us.</p>",
            InfoPage::TermsOfUse => "<h1>Terms of Use</h1><p>Please read our terms of use.</p>",
            InfoPage::Nondiscrimination => {
                "<h1>Nondiscrimination Policy</h1><p>We are committed to nondiscrimination.</p>"
            }
        }
    }
}

/// Compiled page templates
pub struct PageRenderer {
    registry: Handlebars<'static>,
}

impl PageRenderer {
    /// Compile templates from source strings
    pub fn from_sources(header: &str, footer: &str, home: &str) -> Result<Self, PageError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(false);
        registry.register_template_string(HEADER, header)?;
        registry.register_template_string(FOOTER, footer)?;
        registry.register_template_string(HOME, home)?;

        Ok(PageRenderer { registry })
    }

    /// Load `header.html`, `footer.html` and `home.html` from a directory
    pub fn load(dir: &Path) -> Result<Self, PageError> {
        let read = |name: &str| {
            let path = dir.join(format!("{}.html", name));
            std::fs::read_to_string(&path).map_err(|source| PageError::Io {
                path: path.display().to_string(),
                source,
            })
        };

        let renderer = Self::from_sources(&read(HEADER)?, &read(FOOTER)?, &read(HOME)?)?;
        info!(path = %dir.display(), "Loaded page templates");

        Ok(renderer)
    }

    /// Render the home page with the full catalog
    pub fn render_home(&self, context: &HomeContext<'_>) -> Result<String, PageError> {
        Ok(self.registry.render(HOME, context)?)
    }

    /// Wrap an HTML fragment in the shared header and footer
    pub fn wrap_in_layout(&self, title: &str, body: &str) -> Result<String, PageError> {
        let layout = LayoutContext { title };
        let mut page = self.registry.render(HEADER, &layout)?;
        page.push_str(body);
        page.push_str(&self.registry.render(FOOTER, &layout)?);
        Ok(page)
    }

    pub fn render_info(&self, site_title: &str, page: InfoPage) -> Result<String, PageError> {
        let title = format!("{} | {}", page.heading(), site_title);
        self.wrap_in_layout(&title, page.body())
    }
}
