//! Application deployment.
//!
//! A run moves through `Resolve → {Create | Update} → Done`. Each step does
//! one thing and hands the next step what it needs.

use crate::checksum::bytes_changed;
use crate::config::{AppDeployConfig, AppInputs};
use crate::error::{Error, Result};
use crate::lookup::Lookup;
use crate::report::Reporter;
use fastedge_api::{Application, FastEdgeClient};

/// Result of a successful application deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDeployed {
    /// The application as returned by the create or update call.
    pub app: Application,
    /// Binary the application now runs.
    pub binary_id: u64,
    /// Whether the application was created rather than updated.
    pub created: bool,
    /// Whether a new binary was uploaded during this run.
    pub uploaded: bool,
}

enum Step {
    Resolve,
    Create,
    Update(Box<Application>),
    Done(AppDeployed),
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

struct AppDeployment<'a> {
    config: &'a AppDeployConfig,
    client: FastEdgeClient,
    reporter: &'a dyn Reporter,
}

impl<'a> AppDeployment<'a> {
    fn new(config: &'a AppDeployConfig, reporter: &'a dyn Reporter) -> Result<Self> {
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
            Step::Update(app) => self.update(*app).await,
            done @ Step::Done(_) => Ok(done),
        }
    }

    async fn resolve(&self) -> Result<Step> {
        let apps = self.client.apps();

        if let Some(id) = self.config.app_id {
            let app = apps.get(id).include_binary().await?;
            self.reporter
                .info(&format!("Found application with ID: {}", id));
            return Ok(Step::Update(Box::new(app)));
        }

        let name = &self.config.app.name;
        match Lookup::from_result(apps.get_by_name(name).include_binary().await)? {
            Lookup::Found(app) => {
                self.reporter
                    .info(&format!("Found application with name: {}", name));
                Ok(Step::Update(Box::new(app)))
            }
            Lookup::NotFound => {
                self.reporter
                    .info(&format!("Application with name \"{}\" not found", name));
                Ok(Step::Create)
            }
        }
    }

    async fn create(&self) -> Result<Step> {
        self.reporter.info(&format!(
            "Creating new application with name: {}",
            self.config.app.name
        ));
        let wasm = self.read_wasm().await?;
        let binary_id = self.upload(wasm).await?;
        let resource = self.config.resource(binary_id);

        let result = self.client.apps().create(&resource).await;
        let app = self.settle(result, Some(binary_id))?;
        self.reporter
            .notice(&format!("Application created with ID: {}", app.id));

        Ok(Step::Done(AppDeployed {
            binary_id: deployed_binary(&app, binary_id),
            app,
            created: true,
            uploaded: true,
        }))
    }

    async fn update(&self, existing: Application) -> Result<Step> {
        self.reporter.info(&format!(
            "Updating application with name: {}",
            self.config.app.name
        ));
        let wasm = self.read_wasm().await?;
        let (binary_id, uploaded) = match current_binary(&existing) {
            Some((id, checksum)) if !bytes_changed(&wasm, checksum) => {
                self.reporter
                    .debug(&format!("Binary unchanged, reusing binary ID: {}", id));
                (id, None)
            }
            _ => {
                self.reporter
                    .debug("Binary has changed, uploading new binary...");
                let id = self.upload(wasm).await?;
                (id, Some(id))
            }
        };

        let resource = self.config.resource(binary_id);
        let result = self.client.apps().update(existing.id, &resource).await;
        let mut app = self.settle(result, uploaded)?;
        app.id = existing.id;
        self.reporter
            .notice(&format!("Application updated with ID: {}", app.id));

        Ok(Step::Done(AppDeployed {
            binary_id: deployed_binary(&app, binary_id),
            app,
            created: false,
            uploaded: uploaded.is_some(),
        }))
    }

    /// The bytes that are hashed are the bytes that get uploaded.
    async fn read_wasm(&self) -> Result<Vec<u8>> {
        let path = &self.config.wasm_file;
        tokio::fs::read(path).await.map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })
    }

    async fn upload(&self, wasm: Vec<u8>) -> Result<u64> {
        log::debug!(
            "uploading {} ({} bytes)",
            self.config.wasm_file.display(),
            wasm.len()
        );
        let binary = self.client.binaries().upload_bytes(wasm).await?;
        self.reporter
            .debug(&format!("Uploaded binary with ID: {}", binary.id));
        Ok(binary.id)
    }

    /// Warn about a binary left behind when the call that would have used
    /// it failed.
    fn settle<T>(&self, result: fastedge_api::Result<T>, uploaded: Option<u64>) -> Result<T> {
        if let (Err(_), Some(binary_id)) = (&result, uploaded) {
            self.reporter.warning(&format!(
                "Binary {} was uploaded but is not attached to any application",
                binary_id
            ));
        }
        result.map_err(Error::from)
    }
}

/// Id and checksum of the application's binary, when both are known.
fn current_binary(app: &Application) -> Option<(u64, &str)> {
    let binary = app.binary.as_ref()?.resolved()?;
    let checksum = binary.checksum.as_deref().filter(|c| !c.is_empty())?;
    Some((binary.id, checksum))
}

fn deployed_binary(app: &Application, requested: u64) -> u64 {
    app.binary_id().filter(|&id| id > 0).unwrap_or(requested)
}

/// Create or update the configured application.
///
/// Outputs `app_id` and `binary_id` on success.
pub async fn deploy_app(config: &AppDeployConfig, reporter: &dyn Reporter) -> Result<AppDeployed> {
    let deployment = AppDeployment::new(config, reporter)?;

    let mut step = Step::Resolve;
    let deployed = loop {
        step = match deployment.advance(step).await? {
            Step::Done(deployed) => break deployed,
            next => {
                log::debug!("app deployment step: {}", next.name());
                next
            }
        };
    };

    reporter.set_output("app_id", &deployed.app.id.to_string());
    reporter.set_output("binary_id", &deployed.binary_id.to_string());
    Ok(deployed)
}

/// Validate `inputs` and deploy, reporting any error as the run's single
/// failure.
pub async fn run_app(inputs: &AppInputs, reporter: &dyn Reporter) -> Option<AppDeployed> {
    let result = match AppDeployConfig::from_inputs(inputs, reporter) {
        Ok(config) => deploy_app(&config, reporter).await,
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

#[cfg(test)]
mod tests {
    use super::*;
    use fastedge_api::{Binary, BinaryRef};

    fn app_with(binary: Option<BinaryRef>) -> Application {
        Application {
            id: 1,
            name: "my-app".to_string(),
            binary,
            ..Default::default()
        }
    }

    fn binary(id: u64, checksum: Option<&str>) -> BinaryRef {
        BinaryRef::Resolved(Box::new(Binary {
            id,
            checksum: checksum.map(str::to_string),
            ..Default::default()
        }))
    }

    #[test]
    fn test_current_binary() {
        let app = app_with(Some(binary(7, Some("abc"))));
        assert_eq!(current_binary(&app), Some((7, "abc")));
    }

    #[test]
    fn test_current_binary_unknown_counts_as_none() {
        assert_eq!(current_binary(&app_with(None)), None);
        assert_eq!(current_binary(&app_with(Some(BinaryRef::Id(7)))), None);
        assert_eq!(current_binary(&app_with(Some(binary(7, None)))), None);
        assert_eq!(current_binary(&app_with(Some(binary(7, Some(""))))), None);
    }

    #[test]
    fn test_deployed_binary_prefers_response() {
        assert_eq!(deployed_binary(&app_with(Some(BinaryRef::Id(9))), 4), 9);
        assert_eq!(deployed_binary(&app_with(Some(BinaryRef::Id(0))), 4), 4);
        assert_eq!(deployed_binary(&app_with(None), 4), 4);
    }
}
