//! Gateway application state.
//!
//! This module defines the shared state that is available to all request handlers.

use std::sync::Arc;

use syllabusdb_auth::IdTokenValidator;
use syllabusdb_moderation::{AdminGate, Moderation};

use crate::config::GatewayConfig;

/// Shared application state for the gateway.
pub struct GatewayState<M, V>
where
    M: Moderation,
    V: IdTokenValidator,
{
    /// The moderation workflow.
    pub moderation: Arc<M>,
    /// The ID token validator for authentication.
    pub validator: Arc<V>,
    /// The admin gate every admin route goes through.
    pub gate: AdminGate,
    /// Gateway configuration.
    pub config: GatewayConfig,
}

impl<M, V> GatewayState<M, V>
where
    M: Moderation,
    V: IdTokenValidator,
{
    /// Create a new gateway state.
    #[must_use]
    pub fn new(moderation: Arc<M>, validator: Arc<V>, gate: AdminGate, config: GatewayConfig) -> Self {
        Self {
            moderation,
            validator,
            gate,
            config,
        }
    }
}

impl<M, V> Clone for GatewayState<M, V>
where
    M: Moderation,
    V: IdTokenValidator,
{
    fn clone(&self) -> Self {
        Self {
            moderation: Arc::clone(&self.moderation),
            validator: Arc::clone(&self.validator),
            gate: self.gate.clone(),
            config: self.config.clone(),
        }
    }
}
