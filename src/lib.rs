// ============================================================================
// pulse-server
// ============================================================================
//
// Feedback platform split into three processes sharing this library:
// - gateway: token-bucket rate limiting + prefix-based reverse proxying
// - auth_service: registration, login, signed token issuance
// - feedback_service: token-verified feedback CRUD with role gating
//
// The shared modules are the point: one claims layout, one signing secret
// and one error taxonomy for every binary.
//
// ============================================================================

pub mod auth;
pub mod auth_service;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod feedback_service;
pub mod gateway;
pub mod rate_limit;
