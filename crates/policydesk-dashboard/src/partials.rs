//! HTML fragments.
//!
//! Each view type renders to the fragment the page swaps into a fixed
//! element: table body rows, select options, or a notification banner.

use askama::Template;

use crate::views::*;

fn render<T: Template>(tmpl: T) -> String {
    tmpl.render()
        .unwrap_or_else(|e| format!("<pre>Template error: {e}</pre>"))
}

// ── Policy Rows ─────────────────────────────────────────────────

#[derive(Template)]
#[template(path = "_partials/policy_rows.html")]
struct PolicyRowsPartial<'a> {
    empty: bool,
    rows: Vec<&'a PolicyRowView>,
}

impl PolicyTable {
    /// Inner HTML of the `<tbody>`.
    pub fn render(&self) -> String {
        render(PolicyRowsPartial {
            empty: self.is_empty_placeholder(),
            rows: self.policy_rows().collect(),
        })
    }
}

// ── Salesperson Options ─────────────────────────────────────────

#[derive(Template)]
#[template(path = "_partials/salesperson_options.html")]
struct SalespersonOptionsPartial<'a> {
    options: &'a [SelectOption],
}

impl SalespersonOptions {
    /// Inner HTML of the `<select>`.
    pub fn render(&self) -> String {
        render(SalespersonOptionsPartial {
            options: &self.options,
        })
    }
}

// ── Banner ──────────────────────────────────────────────────────

#[derive(Template)]
#[template(path = "_partials/banner.html")]
struct BannerPartial<'a> {
    id: u64,
    alert_class: &'static str,
    icon: &'static str,
    message: &'a str,
}

impl BannerView {
    pub fn render(&self) -> String {
        render(BannerPartial {
            id: self.id.0,
            alert_class: self.severity.alert_class(),
            icon: self.severity.icon(),
            message: &self.message,
        })
    }
}
