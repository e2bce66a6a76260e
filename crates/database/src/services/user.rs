use crate::{
    entities::{
        activities, departments, professor_courses, professors, staff, student_programs,
        students, users,
    },
    services::{
        count_ids, non_empty, organization::find_department, program::find_program, required,
    },
};
use chrono::{NaiveDate, Utc};
use log::info;
use models::{
    context::{RequestContext, Role},
    error::{ServiceError, ServiceResult, ValidationError},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, IntoActiveModel, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, QueryTrait, SqlErr, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Personal details every portal user has
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.first_name.trim().is_empty() {
            return Err(ValidationError::MissingField("first_name"));
        }
        if self.last_name.trim().is_empty() {
            return Err(ValidationError::MissingField("last_name"));
        }
        validate_email(&self.email)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewStudent {
    #[serde(flatten)]
    pub user: NewUser,
    pub birthday: Option<NaiveDate>,
    /// Degree program to enroll the student in right away
    pub program_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewProfessor {
    #[serde(flatten)]
    pub user: NewUser,
    pub office_location: Option<String>,
    pub department_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewStaff {
    #[serde(flatten)]
    pub user: NewUser,
    pub position: String,
}

/// Personal details to change; `None` keeps the stored value
///
/// An empty `phone_number` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentSummary {
    #[serde(flatten)]
    pub user: users::Model,
    pub birthday: Option<NaiveDate>,
    pub program_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfessorSummary {
    #[serde(flatten)]
    pub user: users::Model,
    pub office_location: Option<String>,
    pub department: Option<String>,
    /// Teaching assignments over all semesters
    pub assignment_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaffSummary {
    #[serde(flatten)]
    pub user: users::Model,
    pub position: String,
}

pub struct UserService;

impl UserService {
    /// Creates the user and its student row together, returning the new user id
    pub async fn create_student(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        new_student: NewStudent,
    ) -> ServiceResult<i32> {
        ctx.require_staff()?;
        new_student.user.validate()?;
        ensure_email_free(db, &new_student.user.email, None).await?;
        if let Some(program_id) = new_student.program_id {
            find_program(db, program_id).await?;
        }

        let txn = db.begin().await?;

        let user = insert_user(&txn, new_student.user).await?;
        students::ActiveModel {
            user_id: Set(user.id),
            birthday: Set(new_student.birthday),
        }
        .insert(&txn)
        .await?;

        if let Some(program_id) = new_student.program_id {
            student_programs::ActiveModel {
                student_id: Set(user.id),
                program_id: Set(program_id),
                enrollment_date: Set(Utc::now().date_naive()),
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;

        info!("Created student {} ({})", user.id, user.full_name());
        Ok(user.id)
    }

    pub async fn create_professor(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        new_professor: NewProfessor,
    ) -> ServiceResult<i32> {
        ctx.require_staff()?;
        new_professor.user.validate()?;
        ensure_email_free(db, &new_professor.user.email, None).await?;
        if let Some(department_id) = new_professor.department_id {
            find_department(db, department_id).await?;
        }

        let txn = db.begin().await?;

        let user = insert_user(&txn, new_professor.user).await?;
        professors::ActiveModel {
            user_id: Set(user.id),
            office_location: Set(non_empty(new_professor.office_location)),
            department_id: Set(new_professor.department_id),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!("Created professor {} ({})", user.id, user.full_name());
        Ok(user.id)
    }

    pub async fn create_staff(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        new_staff: NewStaff,
    ) -> ServiceResult<i32> {
        ctx.require_staff()?;
        new_staff.user.validate()?;
        let position = required(new_staff.position, "position")?;
        ensure_email_free(db, &new_staff.user.email, None).await?;

        let txn = db.begin().await?;

        let user = insert_user(&txn, new_staff.user).await?;
        staff::ActiveModel {
            user_id: Set(user.id),
            position: Set(position),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!("Created staff member {} ({})", user.id, user.full_name());
        Ok(user.id)
    }

    pub async fn update_user(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        user_id: i32,
        changes: UserChanges,
    ) -> ServiceResult<users::Model> {
        ctx.require_staff()?;
        let user = users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("user", user_id))?;

        let mut active = user.into_active_model();
        if let Some(first_name) = changes.first_name {
            active.first_name = Set(required(first_name, "first_name")?);
        }
        if let Some(last_name) = changes.last_name {
            active.last_name = Set(required(last_name, "last_name")?);
        }
        if let Some(email) = changes.email {
            validate_email(&email)?;
            ensure_email_free(db, &email, Some(user_id)).await?;
            active.email = Set(email.trim().to_string());
        }
        if let Some(phone_number) = changes.phone_number {
            active.phone_number = Set(non_empty(Some(phone_number)));
        }

        let user = active.update(db).await.map_err(email_taken)?;
        info!("Updated user {user_id}");
        Ok(user)
    }

    pub async fn update_student(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        student_id: i32,
        birthday: Option<NaiveDate>,
    ) -> ServiceResult<students::Model> {
        ctx.require_staff()?;
        let mut student = find_student(db, student_id).await?.into_active_model();
        student.birthday = Set(birthday);
        Ok(student.update(db).await?)
    }

    pub async fn update_professor(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        professor_id: i32,
        office_location: Option<String>,
        department_id: Option<i32>,
    ) -> ServiceResult<professors::Model> {
        ctx.require_staff()?;
        let mut professor = find_professor(db, professor_id).await?.into_active_model();
        if let Some(id) = department_id {
            find_department(db, id).await?;
        }
        professor.office_location = Set(non_empty(office_location));
        professor.department_id = Set(department_id);
        Ok(professor.update(db).await?)
    }

    pub async fn update_staff(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        staff_id: i32,
        position: String,
    ) -> ServiceResult<staff::Model> {
        ctx.require_staff()?;
        let position = required(position, "position")?;
        let mut member = find_staff(db, staff_id).await?.into_active_model();
        member.position = Set(position);
        Ok(member.update(db).await?)
    }

    /// Removes a student with no activities, together with the user and program links
    pub async fn delete_student(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        student_id: i32,
    ) -> ServiceResult<()> {
        ctx.require_staff()?;
        let student = find_student(db, student_id).await?;

        let dependents = activities::Entity::find()
            .filter(activities::Column::StudentId.eq(student_id))
            .count(db)
            .await?;
        if dependents > 0 {
            return Err(ServiceError::InUse {
                entity: "student",
                id: student_id,
                dependents,
            });
        }

        let txn = db.begin().await?;

        student_programs::Entity::delete_many()
            .filter(student_programs::Column::StudentId.eq(student_id))
            .exec(&txn)
            .await?;
        student.delete(&txn).await?;
        delete_user_row(&txn, student_id).await?;

        txn.commit().await?;

        info!("Deleted student {student_id}");
        Ok(())
    }

    /// Removes a professor with no teaching assignments, together with the user
    pub async fn delete_professor(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        professor_id: i32,
    ) -> ServiceResult<()> {
        ctx.require_staff()?;
        let professor = find_professor(db, professor_id).await?;

        let dependents = professor_courses::Entity::find()
            .filter(professor_courses::Column::ProfessorId.eq(professor_id))
            .count(db)
            .await?;
        if dependents > 0 {
            return Err(ServiceError::InUse {
                entity: "professor",
                id: professor_id,
                dependents,
            });
        }

        let txn = db.begin().await?;
        professor.delete(&txn).await?;
        delete_user_row(&txn, professor_id).await?;
        txn.commit().await?;

        info!("Deleted professor {professor_id}");
        Ok(())
    }

    /// Removes another staff member who has not decided any request
    pub async fn delete_staff(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        staff_id: i32,
    ) -> ServiceResult<()> {
        let caller = ctx.require_staff()?;
        if caller == staff_id {
            return Err(ServiceError::Forbidden(
                "staff cannot delete their own account".to_string(),
            ));
        }
        let member = find_staff(db, staff_id).await?;

        let dependents = activities::Entity::find()
            .filter(activities::Column::ReviewerId.eq(staff_id))
            .count(db)
            .await?;
        if dependents > 0 {
            return Err(ServiceError::InUse {
                entity: "staff",
                id: staff_id,
                dependents,
            });
        }

        let txn = db.begin().await?;
        member.delete(&txn).await?;
        delete_user_row(&txn, staff_id).await?;
        txn.commit().await?;

        info!("Deleted staff member {staff_id}");
        Ok(())
    }

    /// Every student, newest first; open to professors and staff
    pub async fn list_students(
        db: &DatabaseConnection,
        ctx: &RequestContext,
    ) -> ServiceResult<Vec<StudentSummary>> {
        ctx.require_any(&[Role::Professor, Role::Staff])?;

        let rows = students::Entity::find()
            .find_also_related(users::Entity)
            .order_by_desc(students::Column::UserId)
            .all(db)
            .await?;

        let program_counts = count_ids(
            student_programs::Entity::find()
                .select_only()
                .column(student_programs::Column::StudentId)
                .into_tuple::<i32>()
                .all(db)
                .await?,
        );

        Ok(rows
            .into_iter()
            .filter_map(|(student, user)| {
                user.map(|user| StudentSummary {
                    program_count: program_counts.get(&user.id).copied().unwrap_or(0),
                    birthday: student.birthday,
                    user,
                })
            })
            .collect())
    }

    pub async fn list_professors(
        db: &DatabaseConnection,
        ctx: &RequestContext,
    ) -> ServiceResult<Vec<ProfessorSummary>> {
        ctx.require_staff()?;

        let rows = professors::Entity::find()
            .find_also_related(users::Entity)
            .order_by_desc(professors::Column::UserId)
            .all(db)
            .await?;

        let department_names: HashMap<i32, String> = departments::Entity::find()
            .all(db)
            .await?
            .into_iter()
            .map(|d| (d.id, d.name))
            .collect();

        let assignment_counts = count_ids(
            professor_courses::Entity::find()
                .select_only()
                .column(professor_courses::Column::ProfessorId)
                .into_tuple::<i32>()
                .all(db)
                .await?,
        );

        Ok(rows
            .into_iter()
            .filter_map(|(professor, user)| {
                user.map(|user| ProfessorSummary {
                    department: professor
                        .department_id
                        .and_then(|id| department_names.get(&id).cloned()),
                    assignment_count: assignment_counts.get(&user.id).copied().unwrap_or(0),
                    office_location: professor.office_location,
                    user,
                })
            })
            .collect())
    }

    pub async fn list_staff(
        db: &DatabaseConnection,
        ctx: &RequestContext,
    ) -> ServiceResult<Vec<StaffSummary>> {
        ctx.require_staff()?;

        Ok(staff::Entity::find()
            .find_also_related(users::Entity)
            .order_by_asc(staff::Column::UserId)
            .all(db)
            .await?
            .into_iter()
            .filter_map(|(member, user)| {
                user.map(|user| StaffSummary {
                    position: member.position,
                    user,
                })
            })
            .collect())
    }
}

/// Inserts the user row and returns it with its generated id
async fn insert_user<C: ConnectionTrait>(db: &C, new_user: NewUser) -> ServiceResult<users::Model> {
    users::ActiveModel {
        first_name: Set(new_user.first_name.trim().to_string()),
        last_name: Set(new_user.last_name.trim().to_string()),
        email: Set(new_user.email.trim().to_string()),
        phone_number: Set(non_empty(new_user.phone_number)),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(email_taken)
}

async fn delete_user_row<C: ConnectionTrait>(db: &C, user_id: i32) -> ServiceResult<()> {
    users::Entity::delete_by_id(user_id).exec(db).await?;
    Ok(())
}

async fn ensure_email_free<C: ConnectionTrait>(
    db: &C,
    email: &str,
    except_user: Option<i32>,
) -> ServiceResult<()> {
    let existing = users::Entity::find()
        .filter(users::Column::Email.eq(email.trim()))
        .apply_if(except_user, |q, id| q.filter(users::Column::Id.ne(id)))
        .count(db)
        .await?;
    if existing > 0 {
        return Err(ServiceError::Conflict(format!(
            "email {} is already used",
            email.trim()
        )));
    }
    Ok(())
}

/// The only unique column on users is the email
fn email_taken(err: DbErr) -> ServiceError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            ServiceError::Conflict("email is already used".to_string())
        }
        _ => err.into(),
    }
}

fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::MissingField("email"));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(ValidationError::InvalidEmail(email.to_string())),
    }
}

pub(crate) async fn find_student<C: ConnectionTrait>(
    db: &C,
    student_id: i32,
) -> ServiceResult<students::Model> {
    students::Entity::find_by_id(student_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("student", student_id))
}

pub(crate) async fn find_professor<C: ConnectionTrait>(
    db: &C,
    professor_id: i32,
) -> ServiceResult<professors::Model> {
    professors::Entity::find_by_id(professor_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("professor", professor_id))
}

async fn find_staff<C: ConnectionTrait>(db: &C, staff_id: i32) -> ServiceResult<staff::Model> {
    staff::Entity::find_by_id(staff_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("staff", staff_id))
}
