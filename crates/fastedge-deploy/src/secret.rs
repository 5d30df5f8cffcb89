//! Secret deployment.
//!
//! Same shape as the application flow, without a binary. Updates are
//! reconciled against the full secret record so that slots dropped from
//! the inputs are deleted on the server.

use crate::config::{SecretDeployConfig, SecretInputs};
use crate::error::Result;
use crate::lookup::Lookup;
use crate::reconcile::reconcile;
use crate::report::Reporter;
use fastedge_api::{FastEdgeClient, Secret};

/// Result of a successful secret deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretDeployed {
    pub secret: Secret,
    pub created: bool,
}

enum Step {
    Resolve,
    Create,
    Update(Secret),
    Done(SecretDeployed),
}

impl Step {
    fn name(&self) -> &'static str {
        match self {
            Step::Resolve => "resolve",
            Step::Create => "create",
            Step::Update(_) => "update",
            Step::Done(_) => "done",
        }
    }
}

struct SecretDeployment<'a> {
    config: &'a SecretDeployConfig,
    client: FastEdgeClient,
    reporter: &'a dyn Reporter,
}

impl<'a> SecretDeployment<'a> {
    fn new(config: &'a SecretDeployConfig, reporter: &'a dyn Reporter) -> Result<Self> {
        Ok(Self {
            config,
            client: FastEdgeClient::new(config.api.clone())?,
            reporter,
        })
    }

    async fn advance(&self, step: Step) -> Result<Step> {
        match step {
            Step::Resolve => self.resolve().await,
            Step::Create => self.create().await,
            Step::Update(current) => self.update(current).await,
            done @ Step::Done(_) => Ok(done),
        }
    }

    async fn resolve(&self) -> Result<Step> {
        let secrets = self.client.secrets();

        if let Some(id) = self.config.secret_id {
            return Ok(Step::Update(secrets.get(id).await?));
        }

        let name = &self.config.secret.name;
        match Lookup::from_result(secrets.get_by_name(name).await)? {
            // Search results carry no slots.
            Lookup::Found(found) => Ok(Step::Update(secrets.get(found.id).await?)),
            Lookup::NotFound => {
                self.reporter
                    .debug(&format!("Secret with name \"{}\" not found.", name));
                Ok(Step::Create)
            }
        }
    }

    async fn create(&self) -> Result<Step> {
        self.reporter.info(&format!(
            "Creating new secret with name: {}",
            self.config.secret.name
        ));
        let secret = self.client.secrets().create(&self.config.secret).await?;
        self.reporter
            .notice(&format!("Secret created with ID: {}", secret.id));
        Ok(Step::Done(SecretDeployed {
            secret,
            created: true,
        }))
    }

    async fn update(&self, current: Secret) -> Result<Step> {
        let body = reconcile(&self.config.secret, &current);
        let deletions = body.secret_slots.iter().filter(|s| s.is_deletion()).count();
        if deletions > 0 {
            self.reporter
                .debug(&format!("Deleting {} stale secret slot(s)", deletions));
        }

        let mut secret = self.client.secrets().update(current.id, &body).await?;
        secret.id = current.id;
        self.reporter
            .notice(&format!("Secret updated with ID: {}", secret.id));
        Ok(Step::Done(SecretDeployed {
            secret,
            created: false,
        }))
    }
}

/// Create or update the configured secret.
///
/// Outputs `secret_id` on success.
pub async fn deploy_secret(
    config: &SecretDeployConfig,
    reporter: &dyn Reporter,
) -> Result<SecretDeployed> {
    let deployment = SecretDeployment::new(config, reporter)?;

    let mut step = Step::Resolve;
    let deployed = loop {
        step = match deployment.advance(step).await? {
            Step::Done(deployed) => break deployed,
            next => {
                log::debug!("secret deployment step: {}", next.name());
                next
            }
        };
    };

    reporter.set_output("secret_id", &deployed.secret.id.to_string());
    Ok(deployed)
}

/// Validate `inputs` and deploy, reporting any error as the run's single
/// failure.
pub async fn run_secret(inputs: &SecretInputs, reporter: &dyn Reporter) -> Option<SecretDeployed> {
    let result = match SecretDeployConfig::from_inputs(inputs, reporter) {
        Ok(config) => deploy_secret(&config, reporter).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(deployed) => Some(deployed),
        Err(e) => {
            reporter.set_failed(&e.to_string());
            None
        }
    }
}
