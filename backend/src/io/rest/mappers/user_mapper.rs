use shared::{
    AuthResponse, CreateMemberRequest, LoginRequest, PersonRef, RegisterRequest, StudentSummary, UserResponse,
};

use crate::domain::commands::users::{AuthResult, CreateMemberCommand, LoginCommand, RegisterCommand, UserProfile};
use crate::domain::models::user::User;

/// Converts between account DTOs and domain users. Password data never
/// leaves this direction.
pub struct UserMapper;

impl UserMapper {
    pub fn to_register_command(dto: RegisterRequest) -> RegisterCommand {
        RegisterCommand {
            name: dto.name,
            email: dto.email,
            password: dto.password,
            role: dto.role,
            role_id: dto.role_id,
        }
    }

    pub fn to_login_command(dto: LoginRequest) -> LoginCommand {
        LoginCommand {
            email: dto.email,
            password: dto.password,
        }
    }

    pub fn to_create_member_command(dto: CreateMemberRequest) -> CreateMemberCommand {
        CreateMemberCommand {
            name: dto.name,
            email: dto.email,
            role_id: dto.role_id,
            password: dto.password,
        }
    }

    pub fn to_auth_dto(result: AuthResult) -> AuthResponse {
        AuthResponse {
            id: result.user.id,
            name: result.user.name,
            email: result.user.email,
            role: result.user.role,
            token: result.token,
        }
    }

    pub fn to_dto(profile: UserProfile) -> UserResponse {
        UserResponse {
            id: profile.user.id,
            name: profile.user.name,
            email: profile.user.email,
            role: profile.user.role,
            role_id: profile.user.role_id,
            courses: profile.courses,
            registered_events: profile.registered_events,
            created_at: profile.user.created_at,
        }
    }

    /// A just-created account has no memberships yet
    pub fn to_new_user_dto(user: User) -> UserResponse {
        Self::to_dto(UserProfile {
            user,
            courses: Vec::new(),
            registered_events: Vec::new(),
        })
    }

    pub fn to_student_summary(user: User) -> StudentSummary {
        StudentSummary {
            id: user.id,
            name: user.name,
            email: user.email,
            role_id: user.role_id,
        }
    }

    pub fn to_person_ref(user: User) -> PersonRef {
        PersonRef {
            id: user.id,
            name: user.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Role;

    #[test]
    fn test_user_dto_hides_password_fields() {
        let user = User::new("Ada", "ada@x.com", "F-1", Role::Faculty, "pw", "t".to_string());
        let json = serde_json::to_value(UserMapper::to_new_user_dto(user.clone())).unwrap();

        assert_eq!(json["_id"], user.id);
        assert_eq!(json["roleId"], "F-1");
        assert_eq!(json["registeredEvents"], serde_json::json!([]));
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_salt").is_none());
    }
}
