// Container engine operations (login, tag, push, pull, rmi, logout)

use std::process::Command;
use tracing::info;

use crate::command;
use crate::error::Result;

/// Local container engine, one blocking CLI call per operation
pub trait ContainerEngine {
    fn login(&self, registry: &str, username: &str, password: &str) -> Result<()>;

    fn tag(&self, source: &str, target: &str) -> Result<()>;

    fn push(&self, image: &str) -> Result<()>;

    fn pull(&self, image: &str) -> Result<()>;

    /// Remove a local tag (`rmi`); the image itself stays while other tags reference it
    fn remove_local_tag(&self, image: &str) -> Result<()>;

    fn logout(&self, registry: &str) -> Result<()>;
}

/// [`ContainerEngine`] backed by the Docker or Podman CLI
#[derive(Debug, Clone)]
pub struct CliContainerEngine {
    container_cli: String,
}

impl CliContainerEngine {
    pub fn new(container_cli: impl Into<String>) -> Self {
        Self {
            container_cli: container_cli.into(),
        }
    }

    fn command(&self) -> Command {
        Command::new(&self.container_cli)
    }
}

impl ContainerEngine for CliContainerEngine {
    fn login(&self, registry: &str, username: &str, password: &str) -> Result<()> {
        info!("Logging in to {} as {}", registry, username);

        let mut cmd = self.command();
        cmd.arg("login")
            .arg("--username")
            .arg(username)
            .arg("--password-stdin")
            .arg(registry);

        command::run_with_stdin(&mut cmd, password)
    }

    fn tag(&self, source: &str, target: &str) -> Result<()> {
        info!("Tagging {} as {}", source, target);
        command::run(self.command().arg("tag").arg(source).arg(target))
    }

    fn push(&self, image: &str) -> Result<()> {
        info!("Pushing image to registry: {}", image);
        command::run(self.command().arg("push").arg(image))
    }

    fn pull(&self, image: &str) -> Result<()> {
        info!("Pulling image from registry: {}", image);
        command::run(self.command().arg("pull").arg(image))
    }

    fn remove_local_tag(&self, image: &str) -> Result<()> {
        info!("Removing local tag {}", image);
        command::run(self.command().arg("rmi").arg(image))
    }

    fn logout(&self, registry: &str) -> Result<()> {
        info!("Logging out of {}", registry);
        command::run(self.command().arg("logout").arg(registry))
    }
}
