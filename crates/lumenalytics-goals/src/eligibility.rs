//! Decides whether conversion archiving needs to run for a site.

use lumenalytics_core::source::{ArchiveContext, EligibilitySource};

/// A site needs goal archiving when it has ecommerce enabled or at least one
/// configured goal. A rollup site without either still archives when any of
/// its constituent sites qualifies; constituents are checked in order and the
/// first eligible one short-circuits the scan.
pub async fn site_needs_goal_archiving(
    source: &dyn EligibilitySource,
    ctx: &ArchiveContext,
) -> anyhow::Result<bool> {
    if source.has_ecommerce_or_goals(&ctx.site_id).await? {
        return Ok(true);
    }
    for site_id in &ctx.rollup_site_ids {
        if source.has_ecommerce_or_goals(site_id).await? {
            return Ok(true);
        }
    }
    Ok(false)
}
