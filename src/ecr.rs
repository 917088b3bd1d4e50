// ECR control-plane operations through the `aws` CLI

use serde::Deserialize;
use std::process::Command;
use tracing::{debug, info};

use crate::command;
use crate::error::{Error, Result};

/// An image as stored in the registry under some tag.
///
/// Two descriptors refer to the same content iff their digests match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDescriptor {
    pub digest: String,
    pub manifest: String,
    pub manifest_media_type: Option<String>,
}

/// Registry-side image lookups and tag mutations
pub trait RegistryControl {
    /// Look up the image a tag points at; `Ok(None)` when the tag does not exist
    fn get_image_descriptor(&self, repository: &str, tag: &str)
        -> Result<Option<ImageDescriptor>>;

    /// Point `tag` at the manifest of `image` without uploading layers
    fn set_tag_manifest(&self, repository: &str, tag: &str, image: &ImageDescriptor)
        -> Result<()>;
}

/// Output of `aws ecr batch-get-image --output json`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BatchGetImageResponse {
    #[serde(default)]
    pub images: Vec<EcrImage>,
    #[serde(default)]
    pub failures: Vec<ImageFailure>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EcrImage {
    pub image_id: ImageIdentifier,
    pub image_manifest: String,
    pub image_manifest_media_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ImageIdentifier {
    pub image_digest: Option<String>,
    pub image_tag: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ImageFailure {
    pub image_id: Option<ImageIdentifier>,
    pub failure_code: Option<String>,
    pub failure_reason: Option<String>,
}

impl BatchGetImageResponse {
    /// First returned image, or `None` when the lookup matched nothing.
    ///
    /// An image without a digest cannot be compared and is treated as missing.
    pub(crate) fn into_descriptor(self) -> Option<ImageDescriptor> {
        let image = self.images.into_iter().next()?;
        Some(ImageDescriptor {
            digest: image.image_id.image_digest?,
            manifest: image.image_manifest,
            manifest_media_type: image.image_manifest_media_type,
        })
    }
}

/// [`RegistryControl`] backed by the AWS CLI
#[derive(Debug, Clone)]
pub struct AwsCliRegistry {
    aws_cli: String,
}

impl AwsCliRegistry {
    pub fn new(aws_cli: impl Into<String>) -> Self {
        Self {
            aws_cli: aws_cli.into(),
        }
    }

    fn ecr_command(&self, subcommand: &str, repository: &str) -> Command {
        let mut cmd = Command::new(&self.aws_cli);
        cmd.arg("ecr")
            .arg(subcommand)
            .arg("--repository-name")
            .arg(repository);
        cmd
    }
}

impl RegistryControl for AwsCliRegistry {
    fn get_image_descriptor(
        &self,
        repository: &str,
        tag: &str,
    ) -> Result<Option<ImageDescriptor>> {
        let mut cmd = self.ecr_command("batch-get-image", repository);
        cmd.arg("--image-ids")
            .arg(format!("imageTag={}", tag))
            .arg("--output")
            .arg("json");

        let stdout = command::output(&mut cmd)?;
        let response: BatchGetImageResponse =
            serde_json::from_str(&stdout).map_err(|source| Error::InvalidResponse {
                command: format!("aws ecr batch-get-image --repository-name {}", repository),
                source,
            })?;

        for failure in &response.failures {
            debug!(
                repository = repository,
                tag = failure
                    .image_id
                    .as_ref()
                    .and_then(|id| id.image_tag.as_deref())
                    .unwrap_or(tag),
                code = failure.failure_code.as_deref().unwrap_or_default(),
                reason = failure.failure_reason.as_deref().unwrap_or_default(),
                "Image lookup reported a failure"
            );
        }

        Ok(response.into_descriptor())
    }

    fn set_tag_manifest(
        &self,
        repository: &str,
        tag: &str,
        image: &ImageDescriptor,
    ) -> Result<()> {
        info!(
            "Pointing {}:{} at {} in the registry",
            repository, tag, image.digest
        );

        let mut cmd = self.ecr_command("put-image", repository);
        cmd.arg("--image-tag")
            .arg(tag)
            .arg("--image-manifest")
            .arg(&image.manifest);
        if let Some(media_type) = &image.manifest_media_type {
            cmd.arg("--image-manifest-media-type").arg(media_type);
        }

        command::output(&mut cmd)?;
        Ok(())
    }
}
