//! policydesk-controller: the client view controller.
//!
//! Fetches the policy and salesperson collections from a
//! [`PolicyBackend`](policydesk_client::PolicyBackend), keeps them as
//! snapshots, filters the policy snapshot and pushes rendered fragments
//! into an injected [`PolicyView`].
//!
//! # Architecture
//!
//! ```text
//! ViewController
//!   ├── AppState (policy + salesperson snapshots, request generations, filter)
//!   ├── Debouncer<String> (search input, quiet period)
//!   ├── NotificationCenter (independent banners, auto-dismiss)
//!   ├── PolicyBackend (fetch / create)
//!   ├── PolicyView (table body, select options, banners)
//!   └── Clock (now for status buckets, debounce and banner expiry)
//! ```
//!
//! Nothing runs on its own: the host calls [`ViewController::tick`]
//! at or after [`ViewController::next_deadline`] to fire debounced
//! searches and expire banners.

pub mod clock;
pub mod controller;
pub mod debounce;
pub mod filter;
pub mod notify;
pub mod state;
pub mod testing;
pub mod view;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{ControllerSettings, LoadOutcome, ViewController};
pub use debounce::Debouncer;
pub use filter::PolicyFilter;
pub use notify::NotificationCenter;
pub use state::{AppState, FetchKind, FetchTicket, Snapshot, ViewPhase};
pub use view::{FragmentView, PolicyView};
