//! Sessions and the capability checks that gate mutations.
pub mod jwt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use jwt::JwtAuthority;

use crate::model::{Profile, Property, Requirement, Role};

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Auth configuration error: {0}")]
    Config(String),

    #[error("Token error: {0}")]
    Token(String),

    #[error("Invalid authorization token: {0}")]
    InvalidToken(String),
}

/// Verified session: who is calling and with which role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: Uuid,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Admin(Uuid),
    Agent(Uuid),
}

impl Actor {
    pub fn from_profile(profile: &Profile) -> Self {
        match profile.role {
            Role::Admin => Self::Admin(profile.id),
            Role::Agent => Self::Agent(profile.id),
        }
    }

    pub fn from_session(session: &Session) -> Self {
        match session.role {
            Role::Admin => Self::Admin(session.user_id),
            Role::Agent => Self::Agent(session.user_id),
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Self::Admin(id) | Self::Agent(id) => *id,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin(_))
    }

    /// Admins may change any property; agents only their own.
    pub fn can_mutate_property(&self, property: &Property) -> bool {
        match self {
            Self::Admin(_) => true,
            Self::Agent(id) => property.agent_id == Some(*id),
        }
    }

    /// Admins, the creator and the assigned agent may change a requirement.
    pub fn can_mutate_requirement(&self, requirement: &Requirement) -> bool {
        match self {
            Self::Admin(_) => true,
            Self::Agent(id) => {
                requirement.created_by == Some(*id) || requirement.assigned_agent_id == Some(*id)
            }
        }
    }
}
