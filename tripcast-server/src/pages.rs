//! Server-side page rendering
//!
//! The dashboard and analytics pages are handlebars templates embedded in
//! the binary and registered once at startup.

use handlebars::Handlebars;

/// Build the template registry.
pub fn registry() -> Result<Handlebars<'static>, Box<handlebars::TemplateError>> {
    let mut handlebars = Handlebars::new();
    handlebars.register_template_string("dashboard", include_str!("../templates/dashboard.hbs"))?;
    handlebars.register_template_string("analytics", include_str!("../templates/analytics.hbs"))?;
    Ok(handlebars)
}
