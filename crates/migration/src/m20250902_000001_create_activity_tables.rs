use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create activities table
        manager
            .create_table(
                Table::create()
                    .table(Activities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Activities::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Activities::StudentId).integer().not_null())
                    .col(ColumnDef::new(Activities::CourseId).integer().not_null())
                    .col(ColumnDef::new(Activities::SemesterId).integer().not_null())
                    .col(ColumnDef::new(Activities::ActivityType).text().not_null())
                    .col(ColumnDef::new(Activities::SubmissionDate).date().not_null())
                    .col(
                        ColumnDef::new(Activities::RequestStatus)
                            .text()
                            .not_null()
                            .default("Pending"),
                    )
                    .col(ColumnDef::new(Activities::ReviewerId).integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-activities-student_id")
                            .from(Activities::Table, Activities::StudentId)
                            .to(Students::Table, Students::UserId)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-activities-course_id")
                            .from(Activities::Table, Activities::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-activities-semester_id")
                            .from(Activities::Table, Activities::SemesterId)
                            .to(Semesters::Table, Semesters::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-activities-reviewer_id")
                            .from(Activities::Table, Activities::ReviewerId)
                            .to(Staff::Table, Staff::UserId)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Create exam_delays table (one row per Exam_Delay activity)
        manager
            .create_table(
                Table::create()
                    .table(ExamDelays::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExamDelays::ActivityId)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ExamDelays::Reason).text().not_null())
                    .col(ColumnDef::new(ExamDelays::OldExamDate).date().not_null())
                    .col(ColumnDef::new(ExamDelays::NewExamDate).date().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-exam_delays-activity_id")
                            .from(ExamDelays::Table, ExamDelays::ActivityId)
                            .to(Activities::Table, Activities::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ExamDelays::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Activities::Table).to_owned())
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
enum Staff {
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
enum Activities {
    Table,
    Id,
    StudentId,
    CourseId,
    SemesterId,
    ActivityType,
    SubmissionDate,
    RequestStatus,
    ReviewerId,
}

#[derive(DeriveIden)]
enum ExamDelays {
    Table,
    ActivityId,
    Reason,
    OldExamDate,
    NewExamDate,
}
