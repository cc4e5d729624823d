// Initial schema: profiles, projects, properties, requirements, code counters
use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Profiles {
    Table,
    Id,
    Name,
    Email,
    Role,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Projects {
    Table,
    Id,
    Name,
    Location,
    Description,
    CreatedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Properties {
    Table,
    Id,
    ProjectId,
    AgentId,
    Title,
    PropertyType,
    Price,
    Description,
    Bedrooms,
    Bathrooms,
    Area,
    Address,
    Status,
    Images,
    PropertyCode,
    PropertyCodeType,
    OwnerName,
    OwnerPhone,
    BrokerName,
    BrokerPhone,
    PricePerSqft,
    LocationUrl,
    SourceType,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PropertyRequirements {
    Table,
    Id,
    Title,
    Description,
    CustomerName,
    CustomerPhone,
    CustomerEmail,
    PropertyType,
    Price,
    Bedrooms,
    Bathrooms,
    Area,
    PreferredLocations,
    Priority,
    Status,
    AssignedAgentId,
    Notes,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PropertyCodeCounters {
    Table,
    Prefix,
    LastValue,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Profiles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Profiles::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Profiles::Name).text().not_null())
                    .col(ColumnDef::new(Profiles::Email).text().not_null())
                    .col(ColumnDef::new(Profiles::Role).text().not_null())
                    .col(
                        ColumnDef::new(Profiles::CreatedAt)
                            .timestamp()
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Projects::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Projects::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Projects::Name).text().not_null())
                    .col(ColumnDef::new(Projects::Location).text())
                    .col(ColumnDef::new(Projects::Description).text())
                    .col(ColumnDef::new(Projects::CreatedBy).uuid())
                    .col(
                        ColumnDef::new(Projects::CreatedAt)
                            .timestamp()
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_projects_created_by")
                            .from(Projects::Table, Projects::CreatedBy)
                            .to(Profiles::Table, Profiles::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // property_code is unique ignoring case
        manager
            .create_table(
                Table::create()
                    .table(Properties::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Properties::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Properties::ProjectId).uuid())
                    .col(ColumnDef::new(Properties::AgentId).uuid())
                    .col(ColumnDef::new(Properties::Title).text().not_null())
                    .col(ColumnDef::new(Properties::PropertyType).text())
                    .col(ColumnDef::new(Properties::Price).double())
                    .col(ColumnDef::new(Properties::Description).text())
                    .col(ColumnDef::new(Properties::Bedrooms).integer())
                    .col(ColumnDef::new(Properties::Bathrooms).integer())
                    .col(ColumnDef::new(Properties::Area).double())
                    .col(ColumnDef::new(Properties::Address).text())
                    .col(
                        ColumnDef::new(Properties::Status)
                            .text()
                            .not_null()
                            .default("available"),
                    )
                    .col(
                        ColumnDef::new(Properties::Images)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(Properties::PropertyCode)
                            .text()
                            .null()
                            .unique_key()
                            .extra("COLLATE NOCASE"),
                    )
                    .col(ColumnDef::new(Properties::PropertyCodeType).text())
                    .col(ColumnDef::new(Properties::OwnerName).text())
                    .col(ColumnDef::new(Properties::OwnerPhone).text())
                    .col(ColumnDef::new(Properties::BrokerName).text())
                    .col(ColumnDef::new(Properties::BrokerPhone).text())
                    .col(ColumnDef::new(Properties::PricePerSqft).double())
                    .col(ColumnDef::new(Properties::LocationUrl).text())
                    .col(ColumnDef::new(Properties::SourceType).text())
                    .col(
                        ColumnDef::new(Properties::CreatedAt)
                            .timestamp()
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Properties::UpdatedAt)
                            .timestamp()
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_properties_project")
                            .from(Properties::Table, Properties::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_properties_agent")
                            .from(Properties::Table, Properties::AgentId)
                            .to(Profiles::Table, Profiles::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PropertyRequirements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PropertyRequirements::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PropertyRequirements::Title).text().not_null())
                    .col(ColumnDef::new(PropertyRequirements::Description).text())
                    .col(
                        ColumnDef::new(PropertyRequirements::CustomerName)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PropertyRequirements::CustomerPhone)
                            .text()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PropertyRequirements::CustomerEmail).text())
                    .col(ColumnDef::new(PropertyRequirements::PropertyType).text())
                    .col(ColumnDef::new(PropertyRequirements::Price).double())
                    .col(ColumnDef::new(PropertyRequirements::Bedrooms).integer())
                    .col(ColumnDef::new(PropertyRequirements::Bathrooms).integer())
                    .col(ColumnDef::new(PropertyRequirements::Area).double())
                    .col(
                        ColumnDef::new(PropertyRequirements::PreferredLocations)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(PropertyRequirements::Priority)
                            .text()
                            .not_null()
                            .default("medium"),
                    )
                    .col(
                        ColumnDef::new(PropertyRequirements::Status)
                            .text()
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(PropertyRequirements::AssignedAgentId).uuid())
                    .col(ColumnDef::new(PropertyRequirements::Notes).text())
                    .col(ColumnDef::new(PropertyRequirements::CreatedBy).uuid())
                    .col(
                        ColumnDef::new(PropertyRequirements::CreatedAt)
                            .timestamp()
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PropertyRequirements::UpdatedAt)
                            .timestamp()
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_requirements_assigned_agent")
                            .from(
                                PropertyRequirements::Table,
                                PropertyRequirements::AssignedAgentId,
                            )
                            .to(Profiles::Table, Profiles::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_requirements_created_by")
                            .from(PropertyRequirements::Table, PropertyRequirements::CreatedBy)
                            .to(Profiles::Table, Profiles::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PropertyCodeCounters::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PropertyCodeCounters::Prefix)
                            .text()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PropertyCodeCounters::LastValue)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse dependency order
        manager
            .drop_table(Table::drop().table(PropertyCodeCounters::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PropertyRequirements::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Properties::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Projects::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Profiles::Table).to_owned())
            .await?;

        Ok(())
    }
}
