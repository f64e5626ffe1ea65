//! The backend seam used by the view controller.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use policydesk_core::{CreateResponse, NewPolicy, PolicyRecord, SalespersonRecord};

use crate::error::ClientResult;

/// Boxed future alias for backend calls.
pub type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = ClientResult<T>> + Send + 'a>>;

/// Source of policy and salesperson collections.
pub trait PolicyBackend: Send + Sync {
    /// Fetch the full policy collection.
    fn fetch_policies(&self) -> BackendFuture<'_, Vec<PolicyRecord>>;

    /// Fetch the full salesperson collection.
    fn fetch_salespeople(&self) -> BackendFuture<'_, Vec<SalespersonRecord>>;

    /// Submit a new policy. A business rejection is `Ok` with
    /// `success == false`; only transport and decode failures are `Err`.
    fn create_policy<'a>(&'a self, policy: &'a NewPolicy) -> BackendFuture<'a, CreateResponse>;
}

impl<T: PolicyBackend + ?Sized> PolicyBackend for Arc<T> {
    fn fetch_policies(&self) -> BackendFuture<'_, Vec<PolicyRecord>> {
        (**self).fetch_policies()
    }

    fn fetch_salespeople(&self) -> BackendFuture<'_, Vec<SalespersonRecord>> {
        (**self).fetch_salespeople()
    }

    fn create_policy<'a>(&'a self, policy: &'a NewPolicy) -> BackendFuture<'a, CreateResponse> {
        (**self).create_policy(policy)
    }
}
