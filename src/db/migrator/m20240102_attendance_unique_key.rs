use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        conn.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_attendance_employee_date_site ON attendance(employee_id, date, site_id)",
        )
        .await?;

        conn.execute_unprepared("CREATE INDEX IF NOT EXISTS idx_attendance_date ON attendance(date)")
            .await?;

        conn.execute_unprepared("CREATE INDEX IF NOT EXISTS idx_payments_date ON payments(date)")
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        conn.execute_unprepared("DROP INDEX IF EXISTS idx_payments_date")
            .await?;
        conn.execute_unprepared("DROP INDEX IF EXISTS idx_attendance_date")
            .await?;
        conn.execute_unprepared("DROP INDEX IF EXISTS idx_attendance_employee_date_site")
            .await?;

        Ok(())
    }
}
