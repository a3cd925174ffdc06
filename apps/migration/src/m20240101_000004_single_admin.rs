use sea_orm_migration::prelude::*;

/// At most one account may hold the admin role.
///
/// Partial unique index; both SQLite and PostgreSQL accept this syntax.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_users_single_admin \
                 ON users (role) WHERE role = 'admin'",
            )
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP INDEX IF EXISTS idx_users_single_admin")
            .await?;
        Ok(())
    }
}
