//! The region participant protocol: five idempotent operations
//! (`prepare`/`commit`/`abort`/`status`/`search`) keyed by transaction id
//! or filter, plus an in-process implementation, an HTTP client for remote
//! regions, and the HTTP server that exposes a region's participant
//! surface.

mod http_client;
mod http_server;
mod local;
mod trait_def;
mod wire;

pub use http_client::HttpParticipant;
pub use http_server::ParticipantServer;
pub use local::LocalParticipant;
pub use trait_def::{Participant, PrepareOutcome, StatusOutcome};
pub use wire::{
    AbortRequest, AbortResponse, CommitRequest, CommitResponse, ErrorBody, HealthResponse,
    PrepareRequest, PrepareResponse, SearchRequest, SearchResponse, StatsResponse, StatusResponse,
};
