// handlers/mod.rs - two security tiers
//
// Public (no auth) -> Protected (bearer token, everything under /api/v1)
pub mod protected;
pub mod public;
