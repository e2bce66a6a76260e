use crate::{
    entities::{degree_programs, specializations, student_programs},
    services::{count_ids, required, user::find_student},
};
use chrono::NaiveDate;
use log::info;
use models::{
    context::RequestContext,
    error::{ServiceError, ServiceResult},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, QueryTrait,
    SqlErr, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewProgram {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewSpecialization {
    pub code: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub program_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgramSummary {
    #[serde(flatten)]
    pub program: degree_programs::Model,
    pub student_count: u64,
    pub specialization_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpecializationDetail {
    #[serde(flatten)]
    pub specialization: specializations::Model,
    pub program_code: String,
    pub program_name: String,
}

/// A program a student follows and when they joined it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentProgram {
    #[serde(flatten)]
    pub program: degree_programs::Model,
    pub enrollment_date: NaiveDate,
}

pub struct ProgramService;

impl ProgramService {
    pub async fn create_program(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        new_program: NewProgram,
    ) -> ServiceResult<degree_programs::Model> {
        ctx.require_staff()?;
        let code = required(new_program.code, "code")?;
        let name = required(new_program.name, "name")?;

        let existing = degree_programs::Entity::find()
            .filter(degree_programs::Column::Code.eq(code.as_str()))
            .count(db)
            .await?;
        if existing > 0 {
            return Err(duplicate_code("program", &code));
        }

        let program = degree_programs::ActiveModel {
            code: Set(code.clone()),
            name: Set(name),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|err| unique_code(err, "program", &code))?;

        info!("Added degree program {}", program.code);
        Ok(program)
    }

    /// Programs ordered by code, with student and specialization counts
    pub async fn list_programs(db: &DatabaseConnection) -> ServiceResult<Vec<ProgramSummary>> {
        let programs = degree_programs::Entity::find()
            .order_by_asc(degree_programs::Column::Code)
            .all(db)
            .await?;

        let student_counts = count_ids(
            student_programs::Entity::find()
                .select_only()
                .column(student_programs::Column::ProgramId)
                .into_tuple::<i32>()
                .all(db)
                .await?,
        );
        let specialization_counts = count_ids(
            specializations::Entity::find()
                .select_only()
                .column(specializations::Column::ProgramId)
                .into_tuple::<i32>()
                .all(db)
                .await?,
        );

        Ok(programs
            .into_iter()
            .map(|program| ProgramSummary {
                student_count: student_counts.get(&program.id).copied().unwrap_or(0),
                specialization_count: specialization_counts
                    .get(&program.id)
                    .copied()
                    .unwrap_or(0),
                program,
            })
            .collect())
    }

    /// Removes a program nobody follows, along with its specializations
    pub async fn delete_program(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        program_id: i32,
    ) -> ServiceResult<()> {
        ctx.require_staff()?;
        let program = find_program(db, program_id).await?;

        let dependents = student_programs::Entity::find()
            .filter(student_programs::Column::ProgramId.eq(program_id))
            .count(db)
            .await?;
        if dependents > 0 {
            return Err(ServiceError::InUse {
                entity: "program",
                id: program_id,
                dependents,
            });
        }

        let code = program.code.clone();
        let txn = db.begin().await?;

        specializations::Entity::delete_many()
            .filter(specializations::Column::ProgramId.eq(program_id))
            .exec(&txn)
            .await?;
        program.delete(&txn).await?;

        txn.commit().await?;

        info!("Deleted degree program {code}");
        Ok(())
    }

    pub async fn create_specialization(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        new_specialization: NewSpecialization,
    ) -> ServiceResult<specializations::Model> {
        ctx.require_staff()?;
        let code = required(new_specialization.code, "code")?;
        let name = required(new_specialization.name, "name")?;
        let program = find_program(db, new_specialization.program_id).await?;

        let existing = specializations::Entity::find()
            .filter(specializations::Column::Code.eq(code.as_str()))
            .count(db)
            .await?;
        if existing > 0 {
            return Err(duplicate_code("specialization", &code));
        }

        let specialization = specializations::ActiveModel {
            code: Set(code.clone()),
            name: Set(name),
            start_date: Set(new_specialization.start_date),
            program_id: Set(program.id),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|err| unique_code(err, "specialization", &code))?;

        info!(
            "Added specialization {} to {}",
            specialization.code, program.code
        );
        Ok(specialization)
    }

    /// Specializations ordered by name, optionally for one program
    pub async fn list_specializations(
        db: &DatabaseConnection,
        program_id: Option<i32>,
    ) -> ServiceResult<Vec<SpecializationDetail>> {
        let rows = specializations::Entity::find()
            .find_also_related(degree_programs::Entity)
            .apply_if(program_id, |q, id| {
                q.filter(specializations::Column::ProgramId.eq(id))
            })
            .order_by_asc(specializations::Column::Name)
            .all(db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(specialization, program)| {
                program.map(|program| SpecializationDetail {
                    specialization,
                    program_code: program.code,
                    program_name: program.name,
                })
            })
            .collect())
    }

    pub async fn delete_specialization(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        specialization_id: i32,
    ) -> ServiceResult<()> {
        ctx.require_staff()?;

        let result = specializations::Entity::delete_by_id(specialization_id)
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("specialization", specialization_id));
        }
        Ok(())
    }

    /// Enrolls a student in a degree program from `enrollment_date`
    pub async fn assign_student(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        student_id: i32,
        program_id: i32,
        enrollment_date: NaiveDate,
    ) -> ServiceResult<student_programs::Model> {
        ctx.require_staff()?;
        find_student(db, student_id).await?;
        let program = find_program(db, program_id).await?;

        let existing = student_programs::Entity::find_by_id((student_id, program_id))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "student {student_id} already follows {}",
                program.code
            )));
        }

        let link = student_programs::ActiveModel {
            student_id: Set(student_id),
            program_id: Set(program_id),
            enrollment_date: Set(enrollment_date),
        }
        .insert(db)
        .await?;

        info!("Student {student_id} joined program {}", program.code);
        Ok(link)
    }

    /// The programs a student follows; staff or the student themselves
    pub async fn programs_of_student(
        db: &DatabaseConnection,
        ctx: &RequestContext,
        student_id: i32,
    ) -> ServiceResult<Vec<StudentProgram>> {
        ctx.ensure_can_view_student(student_id)?;
        find_student(db, student_id).await?;
        student_program_list(db, student_id).await
    }
}

pub(crate) async fn student_program_list<C: ConnectionTrait>(
    db: &C,
    student_id: i32,
) -> ServiceResult<Vec<StudentProgram>> {
    let links: HashMap<i32, NaiveDate> = student_programs::Entity::find()
        .filter(student_programs::Column::StudentId.eq(student_id))
        .all(db)
        .await?
        .into_iter()
        .map(|link| (link.program_id, link.enrollment_date))
        .collect();

    if links.is_empty() {
        return Ok(Vec::new());
    }

    Ok(degree_programs::Entity::find()
        .filter(degree_programs::Column::Id.is_in(links.keys().copied()))
        .order_by_asc(degree_programs::Column::Code)
        .all(db)
        .await?
        .into_iter()
        .filter_map(|program| {
            links.get(&program.id).map(|&enrollment_date| StudentProgram {
                program,
                enrollment_date,
            })
        })
        .collect())
}

pub(crate) async fn find_program<C: ConnectionTrait>(
    db: &C,
    program_id: i32,
) -> ServiceResult<degree_programs::Model> {
    degree_programs::Entity::find_by_id(program_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("program", program_id))
}

fn duplicate_code(entity: &str, code: &str) -> ServiceError {
    ServiceError::Conflict(format!("a {entity} with code {code} already exists"))
}

fn unique_code(err: DbErr, entity: &str, code: &str) -> ServiceError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => duplicate_code(entity, code),
        _ => err.into(),
    }
}
