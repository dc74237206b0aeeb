//! Where agent file content comes from.

use crate::RegistryError;
use crate::manifest::{AgentEntry, Manifest};
use reqwest::{Client, Url, redirect};
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

pub const ALLOWED_HOSTS: [&str; 3] = [
    "raw.githubusercontent.com",
    "objects.githubusercontent.com",
    "github.com",
];
pub const MAX_REDIRECTS: usize = 5;
pub const MAX_RESPONSE_SIZE: usize = 1024 * 1024;
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Supplies the raw markdown of an agent.
pub trait AgentSource: Send + Sync {
    fn fetch(
        &self,
        manifest: &Manifest,
        agent: &AgentEntry,
    ) -> impl Future<Output = Result<String, RegistryError>> + Send;
}

/// Downloads from the manifest's GitHub repository.
///
/// HTTPS only, restricted to [`ALLOWED_HOSTS`] (redirect targets included), at most
/// [`MAX_REDIRECTS`] redirects and [`MAX_RESPONSE_SIZE`] bytes per file.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
}

fn check_url(url: &Url) -> Result<(), RegistryError> {
    if url.scheme() != "https" {
        return Err(RegistryError::InsecureUrl(url.to_string()));
    }
    match url.host_str() {
        Some(host) if ALLOWED_HOSTS.contains(&host) => Ok(()),
        other => Err(RegistryError::UntrustedHost(
            other.unwrap_or_default().to_string(),
        )),
    }
}

impl HttpSource {
    pub fn new() -> Result<Self, RegistryError> {
        let policy = redirect::Policy::custom(|attempt| {
            if attempt.previous().len() > MAX_REDIRECTS {
                return attempt.error(format!("too many redirects (>{MAX_REDIRECTS})"));
            }
            match check_url(attempt.url()) {
                Ok(()) => attempt.follow(),
                Err(e) => attempt.error(e),
            }
        });
        let client = Client::builder()
            .redirect(policy)
            .timeout(DOWNLOAD_TIMEOUT)
            .user_agent(concat!("agentdeck/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// `https://raw.githubusercontent.com/{repo}/{branch}/{base_path}/{path}.md`
    pub fn download_url(manifest: &Manifest, agent: &AgentEntry) -> String {
        format!(
            "https://raw.githubusercontent.com/{}/{}/{}/{}.md",
            manifest.repo, manifest.branch, manifest.base_path, agent.path
        )
    }

    async fn download(&self, url: &str) -> Result<String, RegistryError> {
        let parsed = Url::parse(url).map_err(|_| RegistryError::InsecureUrl(url.to_string()))?;
        check_url(&parsed)?;
        let mut response = self.client.get(parsed).send().await?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(RegistryError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > MAX_RESPONSE_SIZE {
                return Err(RegistryError::TooLarge {
                    limit: MAX_RESPONSE_SIZE,
                });
            }
            body.extend_from_slice(&chunk);
        }
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

impl AgentSource for HttpSource {
    fn fetch(
        &self,
        manifest: &Manifest,
        agent: &AgentEntry,
    ) -> impl Future<Output = Result<String, RegistryError>> + Send {
        let url = Self::download_url(manifest, agent);
        async move {
            tracing::debug!(target: "registry.source", %url, "download");
            self.download(&url).await
        }
    }
}

/// Reads `{dir}/{path}.md` from a local checkout of the agent repository.
#[derive(Debug, Clone)]
pub struct DirSource {
    dir: PathBuf,
}

impl DirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl AgentSource for DirSource {
    fn fetch(
        &self,
        _manifest: &Manifest,
        agent: &AgentEntry,
    ) -> impl Future<Output = Result<String, RegistryError>> + Send {
        let file = self.dir.join(format!("{}.md", agent.path));
        async move { std::fs::read_to_string(&file).map_err(|e| RegistryError::io(file.clone(), e)) }
    }
}

/// Either source, chosen from configuration at startup.
#[derive(Debug, Clone)]
pub enum AnySource {
    Http(HttpSource),
    Dir(DirSource),
}

impl AgentSource for AnySource {
    fn fetch(
        &self,
        manifest: &Manifest,
        agent: &AgentEntry,
    ) -> impl Future<Output = Result<String, RegistryError>> + Send {
        async move {
            match self {
                AnySource::Http(src) => src.fetch(manifest, agent).await,
                AnySource::Dir(src) => src.fetch(manifest, agent).await,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_https_on_allowed_hosts() {
        assert!(check_url(&Url::parse("https://raw.githubusercontent.com/a/b").unwrap()).is_ok());
        assert!(matches!(
            check_url(&Url::parse("http://raw.githubusercontent.com/a").unwrap()),
            Err(RegistryError::InsecureUrl(_))
        ));
        assert!(matches!(
            check_url(&Url::parse("https://evil.example.com/a").unwrap()),
            Err(RegistryError::UntrustedHost(_))
        ));
    }

    #[test]
    fn url_layout() {
        let manifest = Manifest::from_json(
            r#"{"repo": "acme/agents", "branch": "dev", "base_path": "agents", "agents": []}"#,
        )
        .unwrap();
        let agent = AgentEntry {
            name: "rust-pro".into(),
            category: "languages".into(),
            path: "languages/rust-pro".into(),
            mode: Default::default(),
            description: String::new(),
            tags: Vec::new(),
        };
        assert_eq!(
            HttpSource::download_url(&manifest, &agent),
            "https://raw.githubusercontent.com/acme/agents/dev/agents/languages/rust-pro.md"
        );
    }
}
