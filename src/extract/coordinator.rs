//! Runs both extractors over an authenticated session

use crate::assignment::{merge_assignments, Assignment};
use crate::auth::{follow_sso_chain, Authenticator};
use crate::classify::FieldGlossary;
use crate::config::{Config, PortalConfig};
use crate::extract::calendar::{parse_calendar, CALENDAR_PATH};
use crate::extract::dashboard::{parse_dashboard, DASHBOARD_PATH};
use crate::session::Session;
use crate::url::portal_endpoint;
use crate::{ReminderError, Result};

/// Summary of one extraction pass
#[derive(Debug, Default)]
pub struct ExtractionOutcome {
    /// Merged, deduplicated and deadline-ordered
    pub assignments: Vec<Assignment>,
    pub calendar_count: usize,
    pub dashboard_count: usize,
    /// Extractors that failed or found nothing
    pub partial: Vec<ReminderError>,
}

/// Fetches the upcoming-events calendar and extracts its assignments
pub async fn fetch_calendar(
    session: &Session,
    portal: &PortalConfig,
    glossary: &FieldGlossary,
) -> Result<Vec<Assignment>> {
    let url = portal_endpoint(&portal.base_url, CALENDAR_PATH)?;
    let base = portal_endpoint(&portal.base_url, "")?;

    let page = session.get(&url).await?;
    let page = follow_sso_chain(session, portal, glossary, page).await?;

    Ok(parse_calendar(&page.document(), &base))
}

/// Fetches the dashboard and extracts its assignments
pub async fn fetch_dashboard(
    session: &Session,
    portal: &PortalConfig,
    glossary: &FieldGlossary,
) -> Result<Vec<Assignment>> {
    let url = portal_endpoint(&portal.base_url, DASHBOARD_PATH)?;
    let base = portal_endpoint(&portal.base_url, "")?;

    let page = session.get(&url).await?;
    let page = follow_sso_chain(session, portal, glossary, page).await?;

    Ok(parse_dashboard(&page.document(), &base))
}

/// Folds one extractor's result into the outcome, downgrading failures
fn settle(
    extractor: &'static str,
    result: Result<Vec<Assignment>>,
    partial: &mut Vec<ReminderError>,
) -> Vec<Assignment> {
    match result {
        Ok(found) if found.is_empty() => {
            tracing::warn!("{} extractor found no assignments", extractor);
            partial.push(ReminderError::ExtractionPartial {
                extractor,
                reason: "no assignments found".to_string(),
            });
            found
        }
        Ok(found) => {
            tracing::info!("{} extractor found {} assignments", extractor, found.len());
            found
        }
        Err(e) => {
            tracing::warn!("{} extractor failed: {}", extractor, e);
            partial.push(ReminderError::ExtractionPartial {
                extractor,
                reason: e.to_string(),
            });
            Vec::new()
        }
    }
}

/// Runs the calendar then the dashboard extractor and merges the results
///
/// The two extractors are independent: one failing never discards the
/// other's records. Calendar records come first in the merge.
pub async fn extract_all(
    session: &Session,
    portal: &PortalConfig,
    glossary: &FieldGlossary,
) -> ExtractionOutcome {
    let mut partial = Vec::new();

    let calendar = settle(
        "calendar",
        fetch_calendar(session, portal, glossary).await,
        &mut partial,
    );
    let dashboard = settle(
        "dashboard",
        fetch_dashboard(session, portal, glossary).await,
        &mut partial,
    );

    let calendar_count = calendar.len();
    let dashboard_count = dashboard.len();
    let assignments = merge_assignments(calendar.into_iter().chain(dashboard));

    tracing::info!(
        "Merged {} calendar + {} dashboard records into {} assignments",
        calendar_count,
        dashboard_count,
        assignments.len()
    );

    ExtractionOutcome {
        assignments,
        calendar_count,
        dashboard_count,
        partial,
    }
}

/// Signs in and returns every pending assignment, deadline first
///
/// Authentication failures abort the run; extractor failures only reduce
/// what is returned.
pub async fn fetch_assignments(config: &Config) -> Result<Vec<Assignment>> {
    let session = Session::new(&config.http)?;

    let mut auth = Authenticator::new(&session, &config.portal);
    auth.authenticate().await?;

    let outcome = extract_all(&session, &config.portal, auth.glossary()).await;
    tracing::info!(
        "Run finished: {} assignments after {} requests",
        outcome.assignments.len(),
        session.request_count()
    );

    Ok(outcome.assignments)
}
