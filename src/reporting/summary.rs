//! Statistics derived from an aggregate snapshot.
//!
//! Everything here is a linear scan over collections already in memory.
//! Collections are only related through string ids, e.g. a member's
//! `package_id` against a package's `id`.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{FulfillmentRequest, Member, Package};
use crate::reporting::assembler::Snapshot;

/// A package tier tracked in the report summary.
///
/// `package_id` is the stable way to pin a tier to a package. Without it the
/// tier is found by comparing `label` to package names, which breaks
/// silently when a package gets renamed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub key: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_id: Option<String>,
}

impl Tier {
    pub fn labelled(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            package_id: None,
        }
    }

    pub fn with_package_id(mut self, package_id: &str) -> Self {
        self.package_id = Some(package_id.to_string());
        self
    }

    pub fn resolve<'a>(&'a self, packages: &'a [Package]) -> Option<&'a str> {
        if let Some(id) = &self.package_id {
            return Some(id.as_str());
        }
        packages
            .iter()
            .find(|package| package.name == self.label)
            .map(|package| package.id.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TierCount {
    pub key: String,
    pub label: String,
    pub package_id: Option<String>,
    pub users: usize,
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total_users: usize,
    pub active_users: usize,
    pub banned_users: usize,
    pub active_share: f64,
    pub banned_share: f64,
    pub tiers: Vec<TierCount>,
    pub revenue_coins: u64,
    pub total_executives: usize,
    pub active_executives: usize,
    pub total_products: usize,
    pub active_products: usize,
    pub out_of_stock_products: usize,
    pub total_requests: usize,
    pub requests_by_status: BTreeMap<String, usize>,
    pub total_packages: usize,
    pub active_packages: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTrend {
    /// `YYYY-MM`
    pub month: String,
    pub new_users: usize,
    pub fulfilled_requests: usize,
    pub revenue_coins: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReferralRow {
    pub executive_id: String,
    pub executive_name: String,
    pub referral_code: Option<String>,
    pub referred_users: usize,
    pub active_referred_users: usize,
}

/// `part` as a percentage of `whole`; zero when `whole` is zero.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 * 100.0 / whole as f64
}

/// Coins booked on approved, processing, shipped and delivered requests.
pub fn revenue(requests: &[FulfillmentRequest]) -> u64 {
    requests
        .iter()
        .filter(|request| request.status.counts_as_revenue())
        .map(|request| request.total_coins)
        .sum()
}

pub fn count_tiers(tiers: &[Tier], users: &[Member], packages: &[Package]) -> Vec<TierCount> {
    tiers
        .iter()
        .map(|tier| {
            let package_id = tier.resolve(packages);
            let count = match package_id {
                Some(id) => users.iter().filter(|user| user.holds_package(id)).count(),
                None => {
                    tracing::warn!("Tier {} ({}) matches no package", tier.key, tier.label);
                    0
                }
            };

            TierCount {
                key: tier.key.clone(),
                label: tier.label.clone(),
                package_id: package_id.map(str::to_string),
                users: count,
                share: percentage(count, users.len()),
            }
        })
        .collect()
}

pub fn summarize(snapshot: &Snapshot, tiers: &[Tier]) -> Summary {
    let total_users = snapshot.users.len();
    let active_users = snapshot.users.iter().filter(|u| u.is_in_good_standing()).count();
    let banned_users = snapshot.users.iter().filter(|u| u.is_banned).count();

    let mut requests_by_status = BTreeMap::new();
    for request in &snapshot.requests {
        *requests_by_status.entry(request.status.to_string()).or_insert(0) += 1;
    }

    Summary {
        total_users,
        active_users,
        banned_users,
        active_share: percentage(active_users, total_users),
        banned_share: percentage(banned_users, total_users),
        tiers: count_tiers(tiers, &snapshot.users, &snapshot.packages),
        revenue_coins: revenue(&snapshot.requests),
        total_executives: snapshot.executives.len(),
        active_executives: snapshot.executives.iter().filter(|e| e.is_active).count(),
        total_products: snapshot.products.len(),
        active_products: snapshot.products.iter().filter(|p| p.is_active).count(),
        out_of_stock_products: snapshot.products.iter().filter(|p| p.stock == 0).count(),
        total_requests: snapshot.requests.len(),
        requests_by_status,
        total_packages: snapshot.packages.len(),
        active_packages: snapshot.packages.iter().filter(|p| p.is_active).count(),
    }
}

fn month_of(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y-%m").to_string()
}

fn bucket(months: &mut BTreeMap<String, MonthlyTrend>, month: String) -> &mut MonthlyTrend {
    months.entry(month.clone()).or_insert_with(|| MonthlyTrend {
        month,
        new_users: 0,
        fulfilled_requests: 0,
        revenue_coins: 0,
    })
}

/// Sign-ups and booked revenue per month, oldest first. Records without a
/// creation timestamp are left out.
pub fn monthly_trends(snapshot: &Snapshot) -> Vec<MonthlyTrend> {
    let mut months: BTreeMap<String, MonthlyTrend> = BTreeMap::new();

    for created_at in snapshot.users.iter().filter_map(|u| u.created_at.as_ref()) {
        bucket(&mut months, month_of(created_at)).new_users += 1;
    }

    for request in snapshot.requests.iter().filter(|r| r.status.counts_as_revenue()) {
        if let Some(created_at) = &request.created_at {
            let trend = bucket(&mut months, month_of(created_at));
            trend.fulfilled_requests += 1;
            trend.revenue_coins += request.total_coins;
        }
    }

    months.into_values().collect()
}

/// Members brought in by each executive, busiest referrer first.
pub fn referral_table(snapshot: &Snapshot) -> Vec<ReferralRow> {
    let mut referred: HashMap<&str, (usize, usize)> = HashMap::new();
    for user in &snapshot.users {
        if let Some(code) = user.referred_by.as_deref() {
            let entry = referred.entry(code).or_default();
            entry.0 += 1;
            if user.is_in_good_standing() {
                entry.1 += 1;
            }
        }
    }

    let mut rows: Vec<ReferralRow> = snapshot
        .executives
        .iter()
        .map(|executive| {
            let (total, active) = executive
                .referral_code
                .as_deref()
                .and_then(|code| referred.get(code).copied())
                .unwrap_or_default();

            ReferralRow {
                executive_id: executive.id.clone(),
                executive_name: executive.name.clone(),
                referral_code: executive.referral_code.clone(),
                referred_users: total,
                active_referred_users: active,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.referred_users
            .cmp(&a.referred_users)
            .then_with(|| a.executive_name.cmp(&b.executive_name))
    });
    rows
}
