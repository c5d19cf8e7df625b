/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Match scheduling, score entry and finalization.
pub mod match_service;
/// Public service for read-only scoreboard information.
pub mod public_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events subscription and streaming.
pub mod sse_service;
/// Background storage connection supervisor.
pub mod storage_supervisor;
/// Team registration and standings.
pub mod team_service;
