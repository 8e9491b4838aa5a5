//! JSON rendering of results and failures.

use std::fmt;

use ledger_mirror::{AuthoritativeValue, InitResult, MirrorError, TxHash};
use serde_json::{json, Value};

/// Result of one successful operation.
#[derive(Debug)]
pub enum Output {
    Value(AuthoritativeValue),
    TxHash(TxHash),
    Synced(AuthoritativeValue),
    Equal(bool),
    Initialized(InitResult),
}

impl Output {
    pub fn to_json(&self) -> Value {
        match self {
            Output::Value(v) => json!({ "value": v }),
            Output::TxHash(tx) => json!({ "tx_hash": tx }),
            Output::Synced(v) => json!({ "synced_value": v }),
            Output::Equal(equal) => json!({ "equal": equal }),
            Output::Initialized(result) => json!({
                "initialized": match result {
                    InitResult::Created => "created",
                    InitResult::AlreadyPresent => "already_present",
                }
            }),
        }
    }

    pub fn print(&self) {
        println!("{}", self.to_json());
    }
}

/// Why a run failed.
#[derive(Debug)]
pub enum Failure {
    /// Configuration or startup problem, before any operation ran.
    Startup(anyhow::Error),
    /// The operation itself failed.
    Operation(MirrorError),
}

impl Failure {
    /// 2 for caller mistakes, 1 for everything else.
    pub fn exit_code(&self) -> u8 {
        match self {
            Failure::Operation(e) if e.kind().is_client_error() => 2,
            _ => 1,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Failure::Startup(e) => json!({
                "error": format!("{:#}", e),
                "kind": "config",
            }),
            Failure::Operation(e) => json!({
                "error": e.to_string(),
                "kind": e.kind().as_str(),
            }),
        }
    }

    pub fn print(&self) {
        println!("{}", self.to_json());
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Startup(e) => write!(f, "startup failed: {:#}", e),
            Failure::Operation(e) => write!(f, "{} ({})", e, e.kind()),
        }
    }
}

impl From<anyhow::Error> for Failure {
    fn from(e: anyhow::Error) -> Self {
        Failure::Startup(e)
    }
}

impl From<MirrorError> for Failure {
    fn from(e: MirrorError) -> Self {
        Failure::Operation(e)
    }
}
