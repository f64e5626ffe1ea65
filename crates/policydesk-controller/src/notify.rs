//! Notification banners with auto-dismiss.
//!
//! Every `show` produces its own banner with its own id and expiry, so
//! banners raised close together stack instead of replacing each other.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use policydesk_dashboard::{BannerId, BannerView, Severity};

use crate::clock::to_delta;

#[derive(Debug)]
struct ActiveBanner {
    banner: BannerView,
    expires_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct NotificationCenter {
    ttl: TimeDelta,
    next_id: u64,
    active: Vec<ActiveBanner>,
}

impl NotificationCenter {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl: to_delta(ttl),
            next_id: 1,
            active: Vec::new(),
        }
    }

    pub fn show(&mut self, message: &str, severity: Severity, now: DateTime<Utc>) -> BannerView {
        let banner = BannerView {
            id: BannerId(self.next_id),
            severity,
            message: message.to_string(),
        };
        self.next_id += 1;
        self.active.push(ActiveBanner {
            banner: banner.clone(),
            expires_at: now + self.ttl,
        });
        banner
    }

    /// Dismiss by hand. Returns `false` if it was already gone.
    pub fn dismiss(&mut self, id: BannerId) -> bool {
        let before = self.active.len();
        self.active.retain(|a| a.banner.id != id);
        self.active.len() != before
    }

    /// Remove every banner whose lifetime has run out.
    pub fn expire(&mut self, now: DateTime<Utc>) -> Vec<BannerId> {
        let mut expired = Vec::new();
        self.active.retain(|a| {
            if a.expires_at <= now {
                expired.push(a.banner.id);
                false
            } else {
                true
            }
        });
        expired
    }

    pub fn active(&self) -> impl Iterator<Item = &BannerView> {
        self.active.iter().map(|a| &a.banner)
    }

    pub fn next_expiry(&self) -> Option<DateTime<Utc>> {
        self.active.iter().map(|a| a.expires_at).min()
    }
}
