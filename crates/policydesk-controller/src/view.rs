//! The rendering surface the controller writes into.

use std::collections::BTreeMap;

use policydesk_dashboard::{BannerId, BannerView, PolicyTable, SalespersonOptions};

/// Page elements the controller updates, injected at construction.
pub trait PolicyView: Send {
    /// Replace the rows of the policies table.
    fn replace_table(&mut self, table: &PolicyTable);

    /// Replace the options of the salesperson selector.
    fn replace_salesperson_options(&mut self, options: &SalespersonOptions);

    /// Add a banner to the page.
    fn append_banner(&mut self, banner: &BannerView);

    /// Take a banner off the page. Unknown ids are ignored.
    fn remove_banner(&mut self, id: BannerId);
}

/// Holds the current HTML of each element, keyed the way the page is.
#[derive(Debug, Clone, Default)]
pub struct FragmentView {
    pub table_body: Option<String>,
    pub salesperson_select: Option<String>,
    pub banners: BTreeMap<BannerId, String>,
}

impl FragmentView {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PolicyView for FragmentView {
    fn replace_table(&mut self, table: &PolicyTable) {
        self.table_body = Some(table.render());
    }

    fn replace_salesperson_options(&mut self, options: &SalespersonOptions) {
        self.salesperson_select = Some(options.render());
    }

    fn append_banner(&mut self, banner: &BannerView) {
        self.banners.insert(banner.id, banner.render());
    }

    fn remove_banner(&mut self, id: BannerId) {
        self.banners.remove(&id);
    }
}
