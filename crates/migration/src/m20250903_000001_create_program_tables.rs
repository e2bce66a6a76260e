use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create degree_programs table
        manager
            .create_table(
                Table::create()
                    .table(DegreePrograms::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DegreePrograms::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DegreePrograms::Code)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(DegreePrograms::Name).string().not_null())
                    .to_owned(),
            )
            .await?;

        // Create specializations table
        manager
            .create_table(
                Table::create()
                    .table(Specializations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Specializations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Specializations::Code)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Specializations::Name).string().not_null())
                    .col(ColumnDef::new(Specializations::StartDate).date().not_null())
                    .col(
                        ColumnDef::new(Specializations::ProgramId)
                            .integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-specializations-program_id")
                            .from(Specializations::Table, Specializations::ProgramId)
                            .to(DegreePrograms::Table, DegreePrograms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create student_programs junction table
        manager
            .create_table(
                Table::create()
                    .table(StudentPrograms::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StudentPrograms::StudentId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentPrograms::ProgramId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentPrograms::EnrollmentDate)
                            .date()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(StudentPrograms::StudentId)
                            .col(StudentPrograms::ProgramId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-student_programs-student_id")
                            .from(StudentPrograms::Table, StudentPrograms::StudentId)
                            .to(Students::Table, Students::UserId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-student_programs-program_id")
                            .from(StudentPrograms::Table, StudentPrograms::ProgramId)
                            .to(DegreePrograms::Table, DegreePrograms::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Create professor_courses table (who teaches what, per semester)
        manager
            .create_table(
                Table::create()
                    .table(ProfessorCourses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProfessorCourses::ProfessorId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProfessorCourses::CourseId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProfessorCourses::SemesterId)
                            .integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(ProfessorCourses::ProfessorId)
                            .col(ProfessorCourses::CourseId)
                            .col(ProfessorCourses::SemesterId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-professor_courses-professor_id")
                            .from(ProfessorCourses::Table, ProfessorCourses::ProfessorId)
                            .to(Professors::Table, Professors::UserId)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-professor_courses-course_id")
                            .from(ProfessorCourses::Table, ProfessorCourses::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-professor_courses-semester_id")
                            .from(ProfessorCourses::Table, ProfessorCourses::SemesterId)
                            .to(Semesters::Table, Semesters::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Dashboards look up a semester's teaching assignments
        manager
            .create_index(
                Index::create()
                    .name("idx_professor_courses_semester_course")
                    .table(ProfessorCourses::Table)
                    .col(ProfessorCourses::SemesterId)
                    .col(ProfessorCourses::CourseId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_professor_courses_semester_course")
                    .table(ProfessorCourses::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(ProfessorCourses::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(StudentPrograms::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Specializations::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(DegreePrograms::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Students {
    Table,
    UserId,
}

#[derive(DeriveIden)]
enum Professors {
    Table,
    UserId,
}

#[derive(DeriveIden)]
enum Courses {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Semesters {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum DegreePrograms {
    Table,
    Id,
    Code,
    Name,
}

#[derive(DeriveIden)]
enum Specializations {
    Table,
    Id,
    Code,
    Name,
    StartDate,
    ProgramId,
}

#[derive(DeriveIden)]
enum StudentPrograms {
    Table,
    StudentId,
    ProgramId,
    EnrollmentDate,
}

#[derive(DeriveIden)]
enum ProfessorCourses {
    Table,
    ProfessorId,
    CourseId,
    SemesterId,
}
