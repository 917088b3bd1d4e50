// Alias tag reconciliation after a push

use tracing::{debug, info};

use crate::ecr::RegistryControl;
use crate::error::{Error, Result};

/// Outcome of [`reconcile_alias_tags`]
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct ReconcileReport {
    /// Alias tags that were created or moved to the primary image
    pub updated: Vec<String>,
    /// Alias tags that already pointed at the primary image
    pub unchanged: Vec<String>,
}

/// Make every alias tag resolve to the image behind `primary_tag`.
///
/// Both descriptors are fetched fresh for each alias. A missing primary tag is
/// an error, a missing alias tag is created. Tags whose digest already matches
/// are left alone, so repeated runs issue no mutations.
pub(crate) fn reconcile_alias_tags<R>(
    registry: &R,
    repository: &str,
    primary_tag: &str,
    alias_tags: &[String],
) -> Result<ReconcileReport>
where
    R: RegistryControl + ?Sized,
{
    let mut report = ReconcileReport::default();

    for alias in alias_tags {
        let primary = registry
            .get_image_descriptor(repository, primary_tag)?
            .ok_or_else(|| Error::PrimaryTagMissing {
                repository: repository.to_string(),
                tag: primary_tag.to_string(),
            })?;

        let current = registry.get_image_descriptor(repository, alias)?;

        match current {
            Some(existing) if existing.digest == primary.digest => {
                debug!("Tag {} already points at {}", alias, primary.digest);
                report.unchanged.push(alias.clone());
            }
            _ => {
                registry.set_tag_manifest(repository, alias, &primary)?;
                report.updated.push(alias.clone());
            }
        }
    }

    info!(
        updated = ?report.updated,
        unchanged = ?report.unchanged,
        "Reconciled alias tags for {}:{}",
        repository,
        primary_tag
    );

    Ok(report)
}
