//! check-data / check-tables

use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityName, EntityTrait, IdenStatic, Iterable, PaginatorTrait,
    QuerySelect,
};

use crate::entity::prelude::*;
use crate::errors::Result;

pub struct TableData {
    pub table: &'static str,
    pub rows: u64,
    pub samples: Vec<serde_json::Value>,
}

pub struct TableColumns {
    pub table: &'static str,
    /// (列名, 列类型)
    pub columns: Vec<(String, String)>,
}

/// 对每个实体展开一次 `$body`，`$entity` 绑定到实体类型
macro_rules! for_each_entity {
    (@each $out:ident, $entity:ident, $body:block, [$($ty:ty),* $(,)?]) => {
        $({
            type $entity = $ty;
            $out.push($body);
        })*
    };
    ($entity:ident => $body:block) => {{
        let mut out = Vec::new();
        for_each_entity!(@each out, $entity, $body, [
            Users,
            Courses,
            CourseClasses,
            StudentEnrollments,
            AttendanceSessions,
            StudentAttendances,
            FaceRecognitionLogs,
            DoorAccessLogs,
            Notifications,
            SystemSettings,
        ]);
        out
    }};
}

pub async fn table_data(db: &DatabaseConnection, limit: u64) -> Result<Vec<TableData>> {
    Ok(for_each_entity!(Table => {
        TableData {
            table: Table::default().table_name(),
            rows: Table::find().count(db).await?,
            samples: Table::find().limit(limit).into_json().all(db).await?,
        }
    }))
}

pub fn table_columns() -> Vec<TableColumns> {
    for_each_entity!(Table => {
        TableColumns {
            table: Table::default().table_name(),
            columns: <Table as EntityTrait>::Column::iter()
                .map(|column| {
                    (
                        IdenStatic::as_str(&column).to_string(),
                        format!("{:?}", ColumnTrait::def(&column).get_column_type()),
                    )
                })
                .collect(),
        }
    })
}

pub fn print_table_data(tables: &[TableData]) {
    for table in tables {
        println!("\n== {} ({} baris) ==", table.table, table.rows);
        for sample in &table.samples {
            println!("  {sample}");
        }
    }
}

pub fn print_table_columns(tables: &[TableColumns]) {
    for table in tables {
        println!("\n== {} ==", table.table);
        for (name, column_type) in &table.columns {
            println!("  {name:<24} {column_type}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::test_support::{storage, user};
    use crate::models::users::entities::UserRole;

    #[test]
    fn test_table_columns_cover_schema() {
        let tables = table_columns();
        assert_eq!(tables.len(), 10);

        let attendances = tables
            .iter()
            .find(|t| t.table == "student_attendances")
            .unwrap();
        let names: Vec<_> = attendances.columns.iter().map(|(n, _)| n.as_str()).collect();
        assert!(names.contains(&"confidence_score"));
        assert!(names.contains(&"attendance_method"));
    }

    #[tokio::test]
    async fn test_table_data_counts_rows() {
        let storage = storage().await;
        user(&storage, "220211060001", UserRole::Student).await;
        user(&storage, "198001012005", UserRole::Lecturer).await;

        let tables = table_data(storage.connection(), 1).await.unwrap();
        let users = tables.iter().find(|t| t.table == "users").unwrap();
        assert_eq!(users.rows, 2);
        assert_eq!(users.samples.len(), 1);

        let settings = tables.iter().find(|t| t.table == "system_settings").unwrap();
        assert!(settings.rows >= 8);
        let logs = tables.iter().find(|t| t.table == "door_access_logs").unwrap();
        assert_eq!(logs.rows, 0);
        assert!(logs.samples.is_empty());
    }
}
