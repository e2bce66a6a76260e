use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create education_centers table
        manager
            .create_table(
                Table::create()
                    .table(EducationCenters::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EducationCenters::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EducationCenters::Name).string().not_null())
                    .col(ColumnDef::new(EducationCenters::PhoneNumber).string())
                    .to_owned(),
            )
            .await?;

        // Create departments table
        manager
            .create_table(
                Table::create()
                    .table(Departments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Departments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Departments::Name).string().not_null())
                    .col(ColumnDef::new(Departments::OfficeLocation).string())
                    .col(ColumnDef::new(Departments::PhoneNumber).string())
                    .col(ColumnDef::new(Departments::CenterId).integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-departments-center_id")
                            .from(Departments::Table, Departments::CenterId)
                            .to(EducationCenters::Table, EducationCenters::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::FirstName).string().not_null())
                    .col(ColumnDef::new(Users::LastName).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::PhoneNumber).string())
                    .to_owned(),
            )
            .await?;

        // Role tables share the user's primary key
        manager
            .create_table(
                Table::create()
                    .table(Students::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Students::UserId)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Students::Birthday).date())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-students-user_id")
                            .from(Students::Table, Students::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Professors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Professors::UserId)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Professors::OfficeLocation).string())
                    .col(ColumnDef::new(Professors::DepartmentId).integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-professors-user_id")
                            .from(Professors::Table, Professors::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-professors-department_id")
                            .from(Professors::Table, Professors::DepartmentId)
                            .to(Departments::Table, Departments::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Staff::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Staff::UserId)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Staff::Position).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-staff-user_id")
                            .from(Staff::Table, Staff::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Staff::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Professors::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Students::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Departments::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(EducationCenters::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum EducationCenters {
    Table,
    Id,
    Name,
    PhoneNumber,
}

#[derive(DeriveIden)]
enum Departments {
    Table,
    Id,
    Name,
    OfficeLocation,
    PhoneNumber,
    CenterId,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    FirstName,
    LastName,
    Email,
    PhoneNumber,
}

#[derive(DeriveIden)]
enum Students {
    Table,
    UserId,
    Birthday,
}

#[derive(DeriveIden)]
enum Professors {
    Table,
    UserId,
    OfficeLocation,
    DepartmentId,
}

#[derive(DeriveIden)]
enum Staff {
    Table,
    UserId,
    Position,
}
