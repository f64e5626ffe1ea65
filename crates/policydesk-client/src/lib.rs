//! policydesk-client: access to the policy backend.
//!
//! The controller never talks HTTP directly. It holds a
//! [`PolicyBackend`], which [`HttpBackend`] implements against the real
//! server and tests implement with scripted fakes.
//!
//! # Endpoints
//!
//! | Method | Path | Body |
//! |---|---|---|
//! | GET | `/api/policies` | `{ policies: [...] }` |
//! | GET | `/api/salespeople` | `{ salespeople: [...] }` |
//! | POST | `/api/policies` | `{ success, error? }` |

pub mod backend;
pub mod error;
pub mod transport;

pub use backend::{BackendFuture, PolicyBackend};
pub use error::{ClientError, ClientResult};
pub use transport::HttpBackend;
