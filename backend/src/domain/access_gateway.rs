//! Bearer-token authentication and role checks.

use chrono::{Duration, Utc};
use shared::Role;
use tracing::{info, warn};

use crate::domain::error::{ServiceError, ServiceResult};
use crate::domain::models::course::Course;
use crate::domain::models::user::User;
use crate::storage::repositories::SessionRepository;
use crate::storage::DbConnection;

/// The authenticated caller of a request
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl Identity {
    pub fn is(&self, role: Role) -> bool {
        self.role == role
    }
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Fail unless the caller holds `required`
pub fn authorize(identity: &Identity, required: Role) -> ServiceResult<()> {
    authorize_any(identity, &[required])
}

pub fn authorize_any(identity: &Identity, allowed: &[Role]) -> ServiceResult<()> {
    if allowed.contains(&identity.role) {
        Ok(())
    } else {
        warn!("Role {} denied; needs one of {:?}", identity.role, allowed);
        Err(ServiceError::unauthorized(format!(
            "User role {} is not authorized to access this route",
            identity.role
        )))
    }
}

/// Fail unless the course has an assigned faculty member and it is the caller
pub fn require_course_faculty(identity: &Identity, course: &Course) -> ServiceResult<()> {
    if course.is_taught_by(&identity.user_id) {
        Ok(())
    } else {
        warn!("User {} is not the faculty of course {}", identity.user_id, course.id);
        Err(ServiceError::unauthorized("Not authorized"))
    }
}

/// Issues and resolves session tokens
#[derive(Clone)]
pub struct AccessGateway {
    sessions: SessionRepository,
    session_ttl: Duration,
}

impl AccessGateway {
    pub fn new(db: DbConnection, session_ttl_hours: i64) -> Self {
        Self {
            sessions: SessionRepository::new(db),
            session_ttl: Duration::hours(session_ttl_hours),
        }
    }

    /// Resolve a bearer token to the caller's identity
    pub async fn authenticate(&self, token: &str) -> ServiceResult<Identity> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ServiceError::Unauthenticated("Not authorized, no token".to_string()));
        }

        let now = Utc::now().timestamp();
        match self.sessions.find_user_by_token(token, now).await? {
            Some(user) => Ok(Identity::from(&user)),
            None => {
                warn!("Rejected unknown or expired token");
                Err(ServiceError::Unauthenticated("Not authorized, token failed".to_string()))
            }
        }
    }

    /// Start a new session for `user_id` and return its token
    pub async fn issue_token(&self, user_id: &str) -> ServiceResult<String> {
        let now = Utc::now();
        let purged = self.sessions.delete_expired(now.timestamp()).await?;
        if purged > 0 {
            info!("Purged {} expired sessions", purged);
        }

        let token = uuid::Uuid::new_v4().to_string();
        let expires_at = (now + self.session_ttl).timestamp();
        self.sessions.store_session(&token, user_id, expires_at).await?;
        Ok(token)
    }
}
