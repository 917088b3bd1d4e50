// In-memory stand-ins for the credential, engine and registry adapters

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::credentials::{CredentialsProvider, RegistryCredentials};
use crate::ecr::{ImageDescriptor, RegistryControl};
use crate::engine::ContainerEngine;
use crate::error::{Error, Result};

fn command_failure(command: String) -> Error {
    Error::Spawn {
        command,
        source: std::io::Error::other("simulated failure"),
    }
}

pub(crate) struct FakeCredentials {
    credentials: Option<RegistryCredentials>,
}

impl FakeCredentials {
    pub fn valid() -> Self {
        Self {
            credentials: Some(RegistryCredentials {
                username: "AWS".to_string(),
                password: "secret".to_string(),
            }),
        }
    }

    pub fn missing_token() -> Self {
        Self { credentials: None }
    }
}

#[async_trait]
impl CredentialsProvider for FakeCredentials {
    async fn get_credentials(&self) -> Result<RegistryCredentials> {
        self.credentials.clone().ok_or_else(|| {
            Error::Authentication("Failed to retrieve ECR authorization token".to_string())
        })
    }
}

/// Records each engine call as a space-separated command line
#[derive(Default)]
pub(crate) struct FakeEngine {
    calls: Mutex<Vec<String>>,
}

impl FakeEngine {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

impl ContainerEngine for FakeEngine {
    fn login(&self, registry: &str, username: &str, _password: &str) -> Result<()> {
        self.record(format!("login {} {}", username, registry))
    }

    fn tag(&self, source: &str, target: &str) -> Result<()> {
        self.record(format!("tag {} {}", source, target))
    }

    fn push(&self, image: &str) -> Result<()> {
        self.record(format!("push {}", image))
    }

    fn pull(&self, image: &str) -> Result<()> {
        self.record(format!("pull {}", image))
    }

    fn remove_local_tag(&self, image: &str) -> Result<()> {
        self.record(format!("rmi {}", image))
    }

    fn logout(&self, registry: &str) -> Result<()> {
        self.record(format!("logout {}", registry))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RegistryCall {
    Get { repository: String, tag: String },
    Set { repository: String, tag: String },
}

/// A single-repository registry keyed by tag
#[derive(Default)]
pub(crate) struct FakeRegistry {
    images: Mutex<HashMap<String, ImageDescriptor>>,
    calls: Mutex<Vec<RegistryCall>>,
    applied: Mutex<Vec<(String, String)>>,
    failing_lookups: HashSet<String>,
    failing_mutations: HashSet<String>,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn manifest_for(digest: &str) -> String {
        format!("manifest-of-{}", digest)
    }

    pub fn with_image(self, tag: &str, digest: &str) -> Self {
        self.images.lock().unwrap().insert(
            tag.to_string(),
            ImageDescriptor {
                digest: digest.to_string(),
                manifest: Self::manifest_for(digest),
                manifest_media_type: None,
            },
        );
        self
    }

    pub fn failing_lookup(mut self, tag: &str) -> Self {
        self.failing_lookups.insert(tag.to_string());
        self
    }

    pub fn failing_mutation(mut self, tag: &str) -> Self {
        self.failing_mutations.insert(tag.to_string());
        self
    }

    pub fn calls(&self) -> Vec<RegistryCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Successful tag mutations as `(tag, manifest)`
    pub fn mutations(&self) -> Vec<(String, String)> {
        self.applied.lock().unwrap().clone()
    }
}

impl RegistryControl for FakeRegistry {
    fn get_image_descriptor(
        &self,
        repository: &str,
        tag: &str,
    ) -> Result<Option<ImageDescriptor>> {
        self.calls.lock().unwrap().push(RegistryCall::Get {
            repository: repository.to_string(),
            tag: tag.to_string(),
        });

        if self.failing_lookups.contains(tag) {
            return Err(command_failure(format!("batch-get-image {}", tag)));
        }

        Ok(self.images.lock().unwrap().get(tag).cloned())
    }

    fn set_tag_manifest(
        &self,
        repository: &str,
        tag: &str,
        image: &ImageDescriptor,
    ) -> Result<()> {
        self.calls.lock().unwrap().push(RegistryCall::Set {
            repository: repository.to_string(),
            tag: tag.to_string(),
        });

        if self.failing_mutations.contains(tag) {
            return Err(command_failure(format!("put-image {}", tag)));
        }

        self.images
            .lock()
            .unwrap()
            .insert(tag.to_string(), image.clone());
        self.applied
            .lock()
            .unwrap()
            .push((tag.to_string(), image.manifest.clone()));
        Ok(())
    }
}
