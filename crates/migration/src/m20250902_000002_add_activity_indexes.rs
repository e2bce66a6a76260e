use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Credit totals and stats are always scoped to a student and semester
        manager
            .create_index(
                Index::create()
                    .name("idx_activities_student_semester")
                    .table(Activities::Table)
                    .col(Activities::StudentId)
                    .col(Activities::SemesterId)
                    .to_owned(),
            )
            .await?;

        // Staff review screens filter by type and status
        manager
            .create_index(
                Index::create()
                    .name("idx_activities_type_status")
                    .table(Activities::Table)
                    .col(Activities::ActivityType)
                    .col(Activities::RequestStatus)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_activities_course_id")
                    .table(Activities::Table)
                    .col(Activities::CourseId)
                    .to_owned(),
            )
            .await?;

        // At most one pending request per student, course and type.
        // Same partial index syntax on Postgres and SQLite.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS unique_student_course_activity
                 ON activities (student_id, course_id, activity_type)
                 WHERE request_status = 'Pending';",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP INDEX IF EXISTS unique_student_course_activity;")
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_activities_course_id")
                    .table(Activities::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_activities_type_status")
                    .table(Activities::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_activities_student_semester")
                    .table(Activities::Table)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Activities {
    Table,
    StudentId,
    CourseId,
    SemesterId,
    ActivityType,
    RequestStatus,
}
