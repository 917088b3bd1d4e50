// Run inputs: CLI flags or GitHub Actions `INPUT_*` variables

use clap::{Args, ValueEnum};

/// Tag used when the image reference does not carry one
pub(crate) const DEFAULT_TAG: &str = "latest";

/// What the run should do with the image
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Action {
    /// Push the local image and reconcile alias tags in the registry
    Push,
    /// Pull the remote image and apply alias tags locally
    Pull,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Push => write!(f, "push"),
            Action::Pull => write!(f, "pull"),
        }
    }
}

/// Inputs for a single run.
///
/// GitHub Actions exposes `with:` inputs as `INPUT_<NAME>` with the name
/// upper-cased and hyphens kept, so each flag is also read from there.
#[derive(Debug, Clone, Args)]
pub struct Inputs {
    /// Whether to push the local image or pull the remote one
    #[arg(long, value_enum, env = "INPUT_ACTION")]
    pub action: Action,

    /// Full repository URL (e.g., 123456789012.dkr.ecr.eu-west-1.amazonaws.com/my-app)
    #[arg(long, env = "INPUT_REPOSITORY-URL")]
    pub repository_url: String,

    /// Local image reference (e.g., my-app:v1)
    #[arg(long, env = "INPUT_IMAGE")]
    pub image: String,

    /// Space-separated alias tags. Double quotes keep spaces inside a token.
    #[arg(long, env = "INPUT_TAGS", default_value = "")]
    pub tags: String,
}

impl Inputs {
    /// Registry-side repository name, the part of the URL after the last `/`
    pub(crate) fn repository_name(&self) -> &str {
        repository_name(&self.repository_url)
    }

    pub(crate) fn image_reference(&self) -> ImageReference {
        ImageReference::parse(&self.image)
    }

    pub(crate) fn alias_tags(&self) -> Vec<String> {
        parse_tag_list(&self.tags)
    }
}

pub(crate) fn repository_name(repository_url: &str) -> &str {
    match repository_url.rfind('/') {
        Some(pos) => &repository_url[pos + 1..],
        None => repository_url,
    }
}

/// A local image reference split into name and tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImageReference {
    pub name: String,
    pub tag: String,
}

impl ImageReference {
    /// Split `name[:tag]`.
    ///
    /// The tag is the segment after the first `:` up to the next `:`, if any.
    /// A missing or empty tag falls back to [`DEFAULT_TAG`].
    pub(crate) fn parse(image: &str) -> Self {
        let mut parts = image.split(':');
        let name = parts.next().unwrap_or_default().to_string();
        let tag = match parts.next() {
            Some(tag) if !tag.is_empty() => tag.to_string(),
            _ => DEFAULT_TAG.to_string(),
        };
        Self { name, tag }
    }

    /// Same image name with a different tag
    pub(crate) fn with_tag(&self, tag: &str) -> String {
        format!("{}:{}", self.name, tag)
    }
}

/// Split a tag list on whitespace that is not inside double quotes.
///
/// A whitespace run is a separator when an even number of `"` follows it.
/// Quotes are kept in the returned tokens and empty tokens are dropped.
/// Unbalanced quotes are not rejected.
pub(crate) fn parse_tag_list(raw: &str) -> Vec<String> {
    let mut quotes_ahead = raw.chars().filter(|c| *c == '"').count();
    let mut tags = Vec::new();
    let mut current = String::new();

    for c in raw.chars() {
        if c == '"' {
            quotes_ahead -= 1;
            current.push(c);
        } else if c.is_whitespace() && quotes_ahead % 2 == 0 {
            if !current.is_empty() {
                tags.push(std::mem::take(&mut current));
            }
        } else {
            current.push(c);
        }
    }

    if !current.is_empty() {
        tags.push(current);
    }

    tags
}
