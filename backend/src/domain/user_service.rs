use chrono::Utc;
use shared::Role;
use tracing::{info, warn};

use crate::domain::access_gateway::{authorize, AccessGateway, Identity};
use crate::domain::commands::users::{
    AuthResult, CreateMemberCommand, LoginCommand, RegisterCommand, UserProfile,
};
use crate::domain::error::{ServiceError, ServiceResult, ValidationError};
use crate::domain::models::user::User;
use crate::storage::repositories::{EnrollmentRepository, EventRepository, UserRepository};
use crate::storage::DbConnection;

/// Accounts: registration, login and the admin-facing user directory
#[derive(Clone)]
pub struct UserService {
    users: UserRepository,
    enrollments: EnrollmentRepository,
    events: EventRepository,
    gateway: AccessGateway,
}

impl UserService {
    pub fn new(db: DbConnection, gateway: AccessGateway) -> Self {
        Self {
            users: UserRepository::new(db.clone()),
            enrollments: EnrollmentRepository::new(db.clone()),
            events: EventRepository::new(db),
            gateway,
        }
    }

    /// Self-service registration. The very first account becomes admin.
    pub async fn register(&self, command: RegisterCommand) -> ServiceResult<AuthResult> {
        let name = ValidationError::require(command.name, "name")?;
        let email = ValidationError::require(command.email, "email")?;
        let password = ValidationError::require(command.password, "password")?;
        let requested_role = command.role.ok_or(ValidationError::MissingField("role"))?;
        let role_id = ValidationError::require(command.role_id, "roleId")?;

        info!("Registering user: email={}, role={}", email, requested_role);

        let mut user = User::new(&name, &email, &role_id, requested_role, &password, Utc::now().to_rfc3339());
        match self.users.register_user(&user).await? {
            Some(stored_role) => user.role = stored_role,
            None => return Err(self.duplicate_account(&user).await?),
        }

        if user.role != requested_role {
            info!("First account {} was made admin", user.id);
        }

        let token = self.gateway.issue_token(&user.id).await?;
        info!("Registered user {} as {}", user.id, user.role);
        Ok(AuthResult { user, token })
    }

    pub async fn login(&self, command: LoginCommand) -> ServiceResult<AuthResult> {
        let email = command.email.trim().to_lowercase();
        info!("Login attempt: {}", email);

        match self.users.find_by_email(&email).await? {
            Some(user) if user.verify_password(&command.password) => {
                let token = self.gateway.issue_token(&user.id).await?;
                Ok(AuthResult { user, token })
            }
            _ => {
                warn!("Failed login for {}", email);
                Err(ServiceError::Unauthenticated("Invalid email or password".to_string()))
            }
        }
    }

    pub async fn create_student(&self, caller: &Identity, command: CreateMemberCommand) -> ServiceResult<User> {
        self.create_member(caller, command, Role::Student).await
    }

    pub async fn create_staff(&self, caller: &Identity, command: CreateMemberCommand) -> ServiceResult<User> {
        self.create_member(caller, command, Role::Staff).await
    }

    async fn create_member(&self, caller: &Identity, command: CreateMemberCommand, role: Role) -> ServiceResult<User> {
        authorize(caller, Role::Admin)?;

        let name = ValidationError::require(command.name, "name")?;
        let email = ValidationError::require(command.email, "email")?;
        let role_id = ValidationError::require(command.role_id, "roleId")?;
        let password = ValidationError::require(command.password, "password")?;

        info!("Admin {} adding {}: {}", caller.user_id, role, email);

        let user = User::new(&name, &email, &role_id, role, &password, Utc::now().to_rfc3339());
        if !self.users.store_user(&user).await? {
            return Err(self.duplicate_account(&user).await?);
        }
        Ok(user)
    }

    /// Every account, ordered by name
    pub async fn list_users(&self, caller: &Identity) -> ServiceResult<Vec<UserProfile>> {
        authorize(caller, Role::Admin)?;

        let users = self.users.list_users().await?;
        let mut profiles = Vec::with_capacity(users.len());
        for user in users {
            profiles.push(self.profile_of(user).await?);
        }

        info!("Found {} users", profiles.len());
        Ok(profiles)
    }

    /// A single account; admins may read anyone, others only themselves
    pub async fn get_user(&self, caller: &Identity, user_id: &str) -> ServiceResult<UserProfile> {
        if !caller.is(Role::Admin) && caller.user_id != user_id {
            warn!("User {} tried to read user {}", caller.user_id, user_id);
            return Err(ServiceError::unauthorized("Not authorized"));
        }

        let user = self
            .users
            .get_user(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User not found"))?;
        self.profile_of(user).await
    }

    async fn profile_of(&self, user: User) -> ServiceResult<UserProfile> {
        let courses = self.enrollments.courses_of(&user.id).await?;
        let registered_events = self.events.events_of(&user.id).await?;
        Ok(UserProfile {
            user,
            courses,
            registered_events,
        })
    }

    /// Tell apart which unique key a rejected insert collided with
    async fn duplicate_account(&self, user: &User) -> ServiceResult<ServiceError> {
        if self.users.find_by_email(&user.email).await?.is_some() {
            Ok(ServiceError::conflict("User with this email already exists"))
        } else {
            Ok(ServiceError::conflict("User with this ID already exists"))
        }
    }
}
