//! # tez-e2e
//!
//! End-to-end test suite for a deployed FA1.2 token.
//!
//! The suite runs against a live node: it reads the token storage, submits
//! operations signed by two faucet identities, waits for confirmations and
//! checks balance and supply deltas. Absolute values are never asserted since
//! the ledger is shared across runs.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tez_e2e::{Deployment, Faucet, SuiteContext, SuiteRunner, TestHarness};
//! use tez_sdk::{ConfirmationPolicy, TezosClient};
//!
//! # async fn run() -> tez_e2e::E2EResult<()> {
//! let client = TezosClient::connect("https://api.tez.ie/rpc/babylonnet").await?;
//! let deployment = Deployment::load("deployed/fa12_latest.json")?;
//! let harness = TestHarness::new(client, deployment.address, ConfirmationPolicy::default()).await?;
//!
//! let ctx = SuiteContext::new(
//!     harness,
//!     Faucet::load("faucetA.json")?.wallet()?,
//!     Faucet::load("faucetB.json")?.wallet()?,
//! );
//! let report = SuiteRunner::new().run_with(&ctx, |r| println!("{}", r)).await;
//! assert!(report.is_success());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod fixtures;
mod harness;
mod runner;
pub mod scenarios;
mod storage;

pub use fixtures::{Deployment, Faucet};
pub use harness::{SuiteContext, TestHarness};
pub use runner::{SuiteReport, SuiteRunner, SuiteState};
pub use scenarios::{Scenario, ScenarioReport};
pub use storage::{read_storage, LedgerEntry, TokenStorage};

use std::path::PathBuf;
use tez_sdk::SdkError;

/// Test result
pub type E2EResult<T> = Result<T, E2EError>;

/// E2E test errors
#[derive(Debug, thiserror::Error)]
pub enum E2EError {
    /// Setup failed
    #[error("setup failed: {0}")]
    Setup(String),

    /// Fixture file missing or malformed
    #[error("fixture {}: {reason}", path.display())]
    Fixture {
        /// File that failed to load
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// Assertion failed
    #[error("assertion failed: {0}")]
    Assertion(String),

    /// Node or contract error
    #[error(transparent)]
    Sdk(#[from] SdkError),
}
