use crate::entities::{departments, professors, staff, students, users};
use log::debug;
use models::{
    context::{RequestContext, Role},
    error::ServiceResult,
};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Serialize;

/// A verified portal user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfile {
    pub user_id: i32,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}

impl UserProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn context(&self) -> RequestContext {
        RequestContext::new(self.user_id, self.role)
    }

    fn new(user: users::Model, role: Role) -> Self {
        Self {
            user_id: user.id,
            role,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            department: None,
            position: None,
        }
    }
}

pub struct AuthService;

impl AuthService {
    /// Looks up `user_id` acting as `role`; `None` if no such user holds that role
    pub async fn authenticate(
        db: &DatabaseConnection,
        user_id: i32,
        role: Role,
    ) -> ServiceResult<Option<UserProfile>> {
        let profile = match role {
            Role::Student => students::Entity::find_by_id(user_id)
                .find_also_related(users::Entity)
                .one(db)
                .await?
                .and_then(|(_, user)| user)
                .map(|user| UserProfile::new(user, role)),
            Role::Professor => {
                match professors::Entity::find_by_id(user_id)
                    .find_also_related(users::Entity)
                    .one(db)
                    .await?
                {
                    Some((professor, Some(user))) => {
                        let department = match professor.department_id {
                            Some(id) => departments::Entity::find_by_id(id)
                                .one(db)
                                .await?
                                .map(|d| d.name),
                            None => None,
                        };
                        Some(UserProfile {
                            department,
                            ..UserProfile::new(user, role)
                        })
                    }
                    _ => None,
                }
            }
            Role::Staff => staff::Entity::find_by_id(user_id)
                .find_also_related(users::Entity)
                .one(db)
                .await?
                .and_then(|(member, user)| {
                    user.map(|user| UserProfile {
                        position: Some(member.position),
                        ..UserProfile::new(user, role)
                    })
                }),
        };

        if profile.is_none() {
            debug!("No {role} with id {user_id}");
        }
        Ok(profile)
    }
}
