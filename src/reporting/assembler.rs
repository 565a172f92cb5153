use std::future::Future;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::api::client::{self, ApiError, PortalApi};
use crate::catalog::{Executive, FulfillmentRequest, Member, Package, Product};
use crate::reporting::sink::ArtifactSink;
use crate::reporting::summary::{self, MonthlyTrend, ReferralRow, Summary, Tier};
use crate::reporting::workbook;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to fetch {collection}: {source}")]
    Fetch {
        collection: &'static str,
        #[source]
        source: ApiError,
    },
    #[error("Failed to build workbook: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),
    #[error("Failed to deliver report: {0}")]
    Delivery(#[from] std::io::Error),
}

/// The five collections a report is built from, fetched independently.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub users: Vec<Member>,
    pub executives: Vec<Executive>,
    pub products: Vec<Product>,
    pub requests: Vec<FulfillmentRequest>,
    pub packages: Vec<Package>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub summary: Summary,
    pub trends: Vec<MonthlyTrend>,
    pub referrals: Vec<ReferralRow>,
    pub snapshot: Snapshot,
}

impl Report {
    pub fn build(snapshot: Snapshot, tiers: &[Tier], generated_at: DateTime<Utc>) -> Self {
        Self {
            generated_at,
            summary: summary::summarize(&snapshot, tiers),
            trends: summary::monthly_trends(&snapshot),
            referrals: summary::referral_table(&snapshot),
            snapshot,
        }
    }
}

async fn fetch<T>(
    collection: &'static str,
    request: impl Future<Output = Result<T, ApiError>>,
) -> Result<T, ReportError> {
    request.await.map_err(|source| {
        tracing::error!("Fetching {} failed: {}", collection, source);
        ReportError::Fetch { collection, source }
    })
}

/// Fires all five fetches at once and waits for them together. Either every
/// collection arrives or the first failure is returned.
pub async fn gather<A: PortalApi + ?Sized>(api: &A) -> Result<Snapshot, ReportError> {
    let (users, executives, products, requests, packages) = tokio::try_join!(
        fetch(client::USERS, api.fetch_users()),
        fetch(client::EXECUTIVES, api.fetch_executives()),
        fetch(client::PRODUCTS, api.fetch_products()),
        fetch(client::REQUESTS, api.fetch_requests()),
        fetch(client::PACKAGES, api.fetch_packages()),
    )?;

    Ok(Snapshot {
        users,
        executives,
        products,
        requests,
        packages,
    })
}

/// Builds the admin analytics workbook. No retries happen here; a failed
/// export is retried by calling it again.
pub struct ReportAssembler<A> {
    api: A,
    tiers: Vec<Tier>,
}

impl<A: PortalApi> ReportAssembler<A> {
    pub fn new(api: A, tiers: Vec<Tier>) -> Self {
        Self { api, tiers }
    }

    pub async fn assemble(&self, generated_at: DateTime<Utc>) -> Result<Report, ReportError> {
        let snapshot = gather(&self.api).await?;

        tracing::info!(
            "Assembling report from {} users, {} executives, {} products, {} requests, {} packages",
            snapshot.users.len(),
            snapshot.executives.len(),
            snapshot.products.len(),
            snapshot.requests.len(),
            snapshot.packages.len()
        );

        Ok(Report::build(snapshot, &self.tiers, generated_at))
    }

    pub async fn export(
        &self,
        sink: &dyn ArtifactSink,
        generated_at: DateTime<Utc>,
    ) -> Result<(), ReportError> {
        let report = self.assemble(generated_at).await?;
        let bytes = workbook::render(&report)?;
        let file_name = workbook::file_name(generated_at);

        sink.deliver(&file_name, &bytes)?;
        tracing::info!("Exported {} ({} bytes)", file_name, bytes.len());
        Ok(())
    }
}
