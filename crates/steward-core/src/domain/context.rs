//! Ambient security context and its snapshot.
//!
//! # 学習ポイント
//! - `SecurityContext` はスレッドに紐づく可変な値（ambient）
//! - `ContextSnapshot` は serialize → deserialize で作る独立したコピー
//!
//! The submitting thread may clear or replace its ambient context right after
//! submitting, so a snapshot never borrows from it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::errors::StewardError;

/// Who the caller is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authentication {
    pub principal: String,
    pub authorities: Vec<String>,
    pub authenticated: bool,
}

impl Authentication {
    pub fn user(principal: impl Into<String>, authorities: &[&str]) -> Self {
        Self {
            principal: principal.into(),
            authorities: authorities.iter().map(|a| a.to_string()).collect(),
            authenticated: true,
        }
    }
}

/// Ambient identity state of one thread. `Default` is the anonymous context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecurityContext {
    pub authentication: Option<Authentication>,
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl SecurityContext {
    pub fn authenticated(authentication: Authentication) -> Self {
        Self {
            authentication: Some(authentication),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn is_anonymous(&self) -> bool {
        self.authentication.is_none()
    }

    pub fn principal(&self) -> Option<&str> {
        self.authentication.as_ref().map(|a| a.principal.as_str())
    }
}

/// Immutable, independently owned copy of a `SecurityContext`.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextSnapshot {
    context: SecurityContext,
}

impl ContextSnapshot {
    /// Deep-copies `ambient` through a JSON round trip.
    ///
    /// An anonymous context yields a valid (empty) snapshot; only a failed
    /// round trip is an error.
    pub fn capture(ambient: &SecurityContext) -> Result<Self, StewardError> {
        let bytes = serde_json::to_vec(ambient)?;
        let context: SecurityContext = serde_json::from_slice(&bytes)?;
        Ok(Self { context })
    }

    pub fn empty() -> Self {
        Self {
            context: SecurityContext::default(),
        }
    }

    pub fn context(&self) -> &SecurityContext {
        &self.context
    }

    pub fn principal(&self) -> Option<&str> {
        self.context.principal()
    }

    /// Owned copy for installing as another thread's ambient context.
    pub fn to_context(&self) -> SecurityContext {
        self.context.clone()
    }
}
