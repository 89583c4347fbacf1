//! Launch console for embedding and rerank model serving APIs
//!
//! Card-based launch flows against the `/v1/models` endpoint family: flip a
//! card, optionally name the new instance, launch it, and land on the
//! running-models page. One shared gate keeps a page to a single in-flight
//! call.

pub mod card;
pub mod client;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod events;
pub mod gate;
pub mod metrics;
pub mod navigate;
pub mod view;

pub use card::{
    CardOptions, CardStats, ConsoleContext, DeleteOutcome, LaunchCard, LaunchControl,
    LaunchOutcome, Panel,
};
pub use client::{LaunchRequest, ModelApi, Registration, RestModelApi, RunningModel};
pub use config::ConsoleConfig;
pub use descriptor::{CardProfile, ModelDescriptor, ModelKind, StatField};
pub use error::{ConsoleError, ConsoleResult};
pub use events::{ConsoleEvent, ConsoleEvents};
pub use gate::{LaunchGate, LaunchPermit};
pub use navigate::{Navigator, NoopNavigator, SystemNavigator};
