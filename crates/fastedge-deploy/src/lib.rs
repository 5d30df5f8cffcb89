//! # fastedge-deploy
//!
//! Deploys WASM applications and secrets to FastEdge.
//!
//! This crate provides:
//! - Input parsing that degrades malformed JSON to empty values with a warning
//! - Checksum comparison so unchanged binaries are not uploaded again
//! - Secret slot reconciliation, deleting slots no longer declared
//! - [`run_app`] and [`run_secret`], create-or-update flows that report
//!   through a [`Reporter`]
//!
//! ## Example
//!
//! ```ignore
//! use fastedge_deploy::{run_app, AppInputs, WorkflowReporter};
//!
//! let inputs = AppInputs {
//!     api_key: "key".into(),
//!     api_url: "https://api.example.com".into(),
//!     wasm_file: "dist/app.wasm".into(),
//!     app_name: "my-app".into(),
//!     ..Default::default()
//! };
//! let reporter = WorkflowReporter::from_env();
//! if let Some(deployed) = run_app(&inputs, &reporter).await {
//!     println!("deployed app {}", deployed.app.id);
//! }
//! ```

pub mod app;
pub mod checksum;
pub mod config;
pub mod error;
pub mod inputs;
pub mod lookup;
pub mod reconcile;
pub mod report;
pub mod secret;

pub use app::{deploy_app, run_app, AppDeployed};
pub use checksum::{bytes_changed, checksum, file_checksum, has_binary_changed};
pub use config::{AppDeployConfig, AppInputs, SecretDeployConfig, SecretInputs};
pub use error::{Error, Result};
pub use lookup::Lookup;
pub use reconcile::reconcile;
pub use report::{Event, RecordingReporter, Reporter, WorkflowReporter};
pub use secret::{deploy_secret, run_secret, SecretDeployed};
