//! policydesk-dashboard: HTML fragments for the policy admin page.
//!
//! Record snapshots are turned into view types carrying pre-formatted
//! strings (tr-TR number and date conventions), which Askama templates
//! render into the fragments the page swaps in:
//!
//! | Fragment | Target |
//! |---|---|
//! | [`PolicyTable`] | `#policiesTable` body rows |
//! | [`SalespersonOptions`] | `#salespersonSelect` options |
//! | [`BannerView`] | notification banner appended to the page |

pub mod partials;
pub mod views;

pub use views::{
    BannerId, BannerView, PolicyRowView, PolicyTable, SalespersonOptions, SelectOption, Severity,
    TableRow,
};
