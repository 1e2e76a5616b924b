use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ==================== 系统设置表 ====================
        manager
            .create_table(
                Table::create()
                    .table(SystemSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SystemSettings::Key)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SystemSettings::Value).text().not_null())
                    .col(
                        ColumnDef::new(SystemSettings::ValueType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SystemSettings::Category)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(ColumnDef::new(SystemSettings::Description).text().null())
                    .col(
                        ColumnDef::new(SystemSettings::IsPublic)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(SystemSettings::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SystemSettings::UpdatedBy)
                            .big_integer()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_system_settings_category")
                    .table(SystemSettings::Table)
                    .col(SystemSettings::Category)
                    .to_owned(),
            )
            .await?;

        // ==================== 插入默认配置 ====================
        // (key, value, 类型, 说明, 非管理员可读)
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default();

        let default_settings = [
            ("app.system_name", "Sistem Absensi", "string", "Nama aplikasi", true),
            ("app.timezone", "Asia/Jakarta", "string", "Zona waktu kampus", true),
            (
                "attendance.min_confidence_score",
                "0.8",
                "float",
                "Skor minimum pengenalan wajah",
                false,
            ),
            (
                "attendance.late_threshold_minutes",
                "15",
                "integer",
                "Batas keterlambatan (menit)",
                true,
            ),
            (
                "attendance.early_checkin_minutes",
                "30",
                "integer",
                "Check-in lebih awal (menit)",
                true,
            ),
            (
                "attendance.min_attendance_percentage",
                "75",
                "float",
                "Persentase kehadiran minimum",
                true,
            ),
            (
                "security.max_failed_attempts",
                "3",
                "integer",
                "Maksimum percobaan gagal",
                false,
            ),
            (
                "door.location",
                "Ruang Kelas Utama",
                "string",
                "Lokasi pintu pintar",
                true,
            ),
        ];

        for (key, value, value_type, description, is_public) in default_settings {
            let category = key.split_once('.').map(|(c, _)| c).unwrap_or("general");
            let insert = Query::insert()
                .into_table(SystemSettings::Table)
                .columns([
                    SystemSettings::Key,
                    SystemSettings::Value,
                    SystemSettings::ValueType,
                    SystemSettings::Category,
                    SystemSettings::Description,
                    SystemSettings::IsPublic,
                    SystemSettings::UpdatedAt,
                ])
                .values_panic([
                    key.into(),
                    value.into(),
                    value_type.into(),
                    category.into(),
                    description.into(),
                    is_public.into(),
                    now.into(),
                ])
                .to_owned();

            manager.exec_stmt(insert).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SystemSettings::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum SystemSettings {
    #[sea_orm(iden = "system_settings")]
    Table,
    Key,
    Value,
    ValueType,
    Category,
    Description,
    IsPublic,
    UpdatedAt,
    UpdatedBy,
}
