// Push/pull orchestration for a single run

use tracing::info;

use crate::credentials::CredentialsProvider;
use crate::ecr::RegistryControl;
use crate::engine::ContainerEngine;
use crate::error::Result;
use crate::inputs::{Action, ImageReference, Inputs};
use crate::reconcile::reconcile_alias_tags;

/// Log in, push or pull, then log out.
///
/// Steps run strictly in order and the first failure is returned as is. The
/// logout step is skipped when an earlier step fails.
pub(crate) async fn run<C, E, R>(
    inputs: &Inputs,
    credentials: &C,
    engine: &E,
    registry: &R,
) -> Result<()>
where
    C: CredentialsProvider + ?Sized,
    E: ContainerEngine + ?Sized,
    R: RegistryControl + ?Sized,
{
    let image = inputs.image_reference();
    let alias_tags = inputs.alias_tags();
    let repository_url = inputs.repository_url.as_str();

    let creds = credentials.get_credentials().await?;
    engine.login(repository_url, &creds.username, &creds.password)?;

    let remote_image = format!("{}:{}", repository_url, image.tag);

    match inputs.action {
        Action::Push => {
            engine.tag(&inputs.image, &remote_image)?;
            engine.push(&remote_image)?;

            if !alias_tags.is_empty() {
                reconcile_alias_tags(registry, inputs.repository_name(), &image.tag, &alias_tags)?;
            }
        }
        Action::Pull => {
            engine.pull(&remote_image)?;
            engine.tag(&remote_image, &inputs.image)?;
            engine.remove_local_tag(&remote_image)?;

            apply_local_aliases(engine, &inputs.image, &image, &alias_tags)?;
        }
    }

    engine.logout(repository_url)?;

    info!("Finished {} of {}", inputs.action, remote_image);
    Ok(())
}

fn apply_local_aliases<E>(
    engine: &E,
    source: &str,
    image: &ImageReference,
    alias_tags: &[String],
) -> Result<()>
where
    E: ContainerEngine + ?Sized,
{
    for alias in alias_tags {
        engine.tag(source, &image.with_tag(alias))?;
    }
    Ok(())
}
