use crate::error::{ServiceError, ServiceResult, ValidationError};
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

/// The three kinds of portal user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Student,
    Professor,
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "Student",
            Self::Professor => "Professor",
            Self::Staff => "Staff",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Student" => Ok(Self::Student),
            "Professor" => Ok(Self::Professor),
            "Staff" => Ok(Self::Staff),
            other => Err(ValidationError::UnknownValue {
                field: "role",
                value: other.to_string(),
            }),
        }
    }
}

/// Identity of the caller for a single request
///
/// Built once per request after the identity has been checked against the
/// store, then passed explicitly into every service call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    pub user_id: i32,
    pub role: Role,
}

impl RequestContext {
    pub fn new(user_id: i32, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn student(user_id: i32) -> Self {
        Self::new(user_id, Role::Student)
    }

    pub fn staff(user_id: i32) -> Self {
        Self::new(user_id, Role::Staff)
    }

    /// Returns the caller's id if they act in `role`
    pub fn require(&self, role: Role) -> ServiceResult<i32> {
        if self.role == role {
            Ok(self.user_id)
        } else {
            Err(ServiceError::Forbidden(format!(
                "{} {} cannot perform an operation reserved for {}",
                self.role, self.user_id, role
            )))
        }
    }

    /// Returns the caller's id if they act in any of `roles`
    pub fn require_any(&self, roles: &[Role]) -> ServiceResult<i32> {
        match roles.iter().find(|role| **role == self.role) {
            Some(role) => self.require(*role),
            None => Err(ServiceError::Forbidden(format!(
                "{} {} cannot perform this operation",
                self.role, self.user_id
            ))),
        }
    }

    pub fn require_student(&self) -> ServiceResult<i32> {
        self.require(Role::Student)
    }

    pub fn require_professor(&self) -> ServiceResult<i32> {
        self.require(Role::Professor)
    }

    pub fn require_staff(&self) -> ServiceResult<i32> {
        self.require(Role::Staff)
    }

    pub fn professor(user_id: i32) -> Self {
        Self::new(user_id, Role::Professor)
    }

    /// Staff see every professor's teaching; a professor sees only their own
    pub fn ensure_can_view_professor(&self, professor_id: i32) -> ServiceResult<()> {
        match self.role {
            Role::Staff => Ok(()),
            Role::Professor if self.user_id == professor_id => Ok(()),
            _ => Err(ServiceError::Forbidden(format!(
                "{} {} cannot view professor {professor_id}",
                self.role, self.user_id
            ))),
        }
    }

    /// Staff see every student; a student sees only themselves
    pub fn ensure_can_view_student(&self, student_id: i32) -> ServiceResult<()> {
        match self.role {
            Role::Staff => Ok(()),
            Role::Student if self.user_id == student_id => Ok(()),
            _ => Err(ServiceError::Forbidden(format!(
                "{} {} cannot view student {student_id}",
                self.role, self.user_id
            ))),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_require_role() {
        let ctx = RequestContext::student(5);
        assert_eq!(ctx.require_student().unwrap(), 5);
        assert!(matches!(ctx.require_staff(), Err(ServiceError::Forbidden(_))));
    }

    #[test]
    fn test_view_student_scope() {
        assert!(RequestContext::student(5).ensure_can_view_student(5).is_ok());
        assert!(RequestContext::student(5).ensure_can_view_student(6).is_err());
        assert!(RequestContext::staff(1).ensure_can_view_student(6).is_ok());
        assert!(
            RequestContext::new(2, Role::Professor)
                .ensure_can_view_student(6)
                .is_err()
        );
    }

    #[test]
    fn test_require_any_role() {
        let faculty = [Role::Professor, Role::Staff];
        assert_eq!(RequestContext::professor(2).require_any(&faculty).unwrap(), 2);
        assert_eq!(RequestContext::staff(1).require_any(&faculty).unwrap(), 1);
        assert!(matches!(
            RequestContext::student(5).require_any(&faculty),
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[test]
    fn test_view_professor_scope() {
        assert!(RequestContext::professor(2).ensure_can_view_professor(2).is_ok());
        assert!(RequestContext::professor(2).ensure_can_view_professor(3).is_err());
        assert!(RequestContext::staff(1).ensure_can_view_professor(3).is_ok());
        assert!(RequestContext::student(5).ensure_can_view_professor(2).is_err());
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!(Role::from_str("Professor").unwrap(), Role::Professor);
        assert!(Role::from_str("admin").is_err());
    }
}
