//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod attendances;
mod course_classes;
mod courses;
mod door_logs;
mod enrollments;
mod notifications;
mod sessions;
mod system_settings;
mod users;

use crate::config::AppConfig;
use crate::errors::{Result, SiAbsensiError};
use migration::{Migrator, MigratorTrait};
use sea_orm::sea_query::LikeExpr;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// `contains_pattern` 生成的模式以 `\\` 转义通配符
pub(crate) fn like(pattern: &str) -> LikeExpr {
    LikeExpr::new(pattern).escape('\\')
}

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 按配置连接数据库并执行迁移
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        let db = if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        let storage = Self::from_connection(db).await?;
        info!("SeaORM 存储初始化完成，数据库: {}", db_url);
        Ok(storage)
    }

    /// 使用已有连接，先跑迁移
    pub async fn from_connection(db: DatabaseConnection) -> Result<Self> {
        Migrator::up(&db, None)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("数据库迁移失败: {e}")))?;
        Ok(Self { db })
    }

    /// 内存 SQLite，单连接保证所有查询落在同一个库上
    pub async fn in_memory() -> Result<Self> {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);
        let db = Database::connect(opt).await.map_err(|e| {
            SiAbsensiError::database_connection(format!("无法创建内存数据库: {e}"))
        })?;
        Self::from_connection(db).await
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// SQLite 专用连接（WAL + 外键）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| SiAbsensiError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-32000")
            .pragma("temp_store", "memory");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| SiAbsensiError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// PostgreSQL / MySQL
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(2)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false);

        Database::connect(opt)
            .await
            .map_err(|e| SiAbsensiError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 推断数据库类型
    pub(crate) fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{url}?mode=rwc"))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(SiAbsensiError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
use crate::models::{
    PaginationInfo, PaginationQuery,
    attendance::{
        entities::{
            AttendanceSession, AttendanceStatus, FaceRecognitionLog, SessionStatus,
            StudentAttendance,
        },
        requests::{
            AttendanceHistoryParams, NewAttendanceSession, NewFaceRecognitionLog,
            NewStudentAttendance, SessionFilter, SessionListParams,
        },
        responses::{
            AttendanceHistoryResponse, AttendanceRecordDetail, SessionListResponse, StatusCounts,
        },
    },
    courses::{
        entities::{ClassStatus, Course, CourseClass, Enrollment},
        requests::{
            ClassFilter, CourseListParams, CreateCourseRequest, NewCourseClass,
            UpdateCourseRequest, UpdateEnrollmentStatusRequest,
        },
        responses::{CourseClassDetail, CourseListResponse, EnrollmentDetail},
    },
    dashboard::responses::SessionWithClass,
    notifications::{
        entities::{Notification, NotificationType},
        requests::{CreateNotificationRequest, NotificationListQuery},
        responses::NotificationListResponse,
    },
    room_access::{
        entities::DoorAccessLog,
        requests::{DoorAccessLogQuery, NewDoorAccessLog},
        responses::DoorAccessLogListResponse,
    },
    system::entities::SystemSetting,
    users::{
        entities::{User, UserRole, UserStatus},
        requests::{CreateUserRequest, UpdateUserRequest, UserListParams},
        responses::{RoleCount, UserListResponse, UserOverview},
    },
};
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    async fn get_user_by_user_id(&self, user_id: &str) -> Result<Option<User>> {
        self.get_user_by_user_id_impl(user_id).await
    }

    async fn get_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>> {
        self.get_users_by_ids_impl(ids).await
    }

    async fn list_users_with_pagination(&self, query: UserListParams) -> Result<UserListResponse> {
        self.list_users_with_pagination_impl(query).await
    }

    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>> {
        self.update_user_impl(id, update).await
    }

    async fn delete_user(&self, id: i64) -> Result<bool> {
        self.delete_user_impl(id).await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    async fn bulk_update_user_status(&self, ids: &[i64], status: UserStatus) -> Result<u64> {
        self.bulk_update_user_status_impl(ids, status).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    async fn user_overview(&self, since: i64) -> Result<UserOverview> {
        self.user_overview_impl(since).await
    }

    async fn count_users_by_role(&self) -> Result<Vec<RoleCount>> {
        self.count_users_by_role_impl().await
    }

    async fn list_active_user_ids(&self, role: Option<UserRole>) -> Result<Vec<i64>> {
        self.list_active_user_ids_impl(role).await
    }

    // 课程
    async fn create_course(&self, course: CreateCourseRequest) -> Result<Course> {
        self.create_course_impl(course).await
    }

    async fn get_course_by_id(&self, id: i64) -> Result<Option<Course>> {
        self.get_course_by_id_impl(id).await
    }

    async fn get_course_by_code(&self, code: &str) -> Result<Option<Course>> {
        self.get_course_by_code_impl(code).await
    }

    async fn list_courses_with_pagination(
        &self,
        query: CourseListParams,
    ) -> Result<CourseListResponse> {
        self.list_courses_with_pagination_impl(query).await
    }

    async fn update_course(&self, id: i64, update: UpdateCourseRequest) -> Result<Option<Course>> {
        self.update_course_impl(id, update).await
    }

    async fn delete_course(&self, id: i64) -> Result<bool> {
        self.delete_course_impl(id).await
    }

    async fn count_courses(&self) -> Result<u64> {
        self.count_courses_impl().await
    }

    // 班级
    async fn create_course_class(&self, class: NewCourseClass) -> Result<CourseClass> {
        self.create_course_class_impl(class).await
    }

    async fn get_course_class_by_id(&self, id: i64) -> Result<Option<CourseClass>> {
        self.get_course_class_by_id_impl(id).await
    }

    async fn list_class_details(&self, filter: ClassFilter) -> Result<Vec<CourseClassDetail>> {
        self.list_class_details_impl(filter).await
    }

    async fn update_class_status(
        &self,
        id: i64,
        status: ClassStatus,
    ) -> Result<Option<CourseClass>> {
        self.update_class_status_impl(id, status).await
    }

    // 选课
    async fn create_enrollment(&self, student_id: i64, class_id: i64) -> Result<Enrollment> {
        self.create_enrollment_impl(student_id, class_id).await
    }

    async fn get_enrollment_by_id(&self, id: i64) -> Result<Option<Enrollment>> {
        self.get_enrollment_by_id_impl(id).await
    }

    async fn find_enrollment(&self, student_id: i64, class_id: i64) -> Result<Option<Enrollment>> {
        self.find_enrollment_impl(student_id, class_id).await
    }

    async fn count_class_enrollments(&self, class_id: i64) -> Result<u64> {
        self.count_class_enrollments_impl(class_id).await
    }

    async fn list_class_enrollments(&self, class_id: i64) -> Result<Vec<EnrollmentDetail>> {
        self.list_class_enrollments_impl(class_id).await
    }

    async fn update_enrollment_status(
        &self,
        id: i64,
        update: UpdateEnrollmentStatusRequest,
    ) -> Result<Option<Enrollment>> {
        self.update_enrollment_status_impl(id, update).await
    }

    // 课次
    async fn create_session(&self, session: NewAttendanceSession) -> Result<AttendanceSession> {
        self.create_session_impl(session).await
    }

    async fn get_session_by_id(&self, id: i64) -> Result<Option<AttendanceSession>> {
        self.get_session_by_id_impl(id).await
    }

    async fn list_class_sessions(
        &self,
        class_id: i64,
        query: SessionListParams,
    ) -> Result<SessionListResponse> {
        self.list_class_sessions_impl(class_id, query).await
    }

    async fn list_sessions(&self, filter: SessionFilter) -> Result<Vec<SessionWithClass>> {
        self.list_sessions_impl(filter).await
    }

    async fn update_session_status(
        &self,
        id: i64,
        status: SessionStatus,
    ) -> Result<Option<AttendanceSession>> {
        self.update_session_status_impl(id, status).await
    }

    async fn complete_open_sessions(&self, class_id: i64, date: &str) -> Result<u64> {
        self.complete_open_sessions_impl(class_id, date).await
    }

    // 考勤记录
    async fn create_attendance(&self, record: NewStudentAttendance) -> Result<StudentAttendance> {
        self.create_attendance_impl(record).await
    }

    async fn get_attendance_by_id(&self, id: i64) -> Result<Option<StudentAttendance>> {
        self.get_attendance_by_id_impl(id).await
    }

    async fn find_attendance(
        &self,
        session_id: i64,
        student_id: i64,
    ) -> Result<Option<StudentAttendance>> {
        self.find_attendance_impl(session_id, student_id).await
    }

    async fn update_attendance(
        &self,
        id: i64,
        status: AttendanceStatus,
        notes: Option<String>,
        verified_by: i64,
    ) -> Result<Option<StudentAttendance>> {
        self.update_attendance_impl(id, status, notes, verified_by)
            .await
    }

    async fn list_session_attendances(
        &self,
        session_id: i64,
        pagination: PaginationQuery,
    ) -> Result<(Vec<AttendanceRecordDetail>, PaginationInfo)> {
        self.list_session_attendances_impl(session_id, pagination)
            .await
    }

    async fn list_attendances_for_sessions(
        &self,
        session_ids: &[i64],
    ) -> Result<Vec<StudentAttendance>> {
        self.list_attendances_for_sessions_impl(session_ids).await
    }

    async fn list_attendance_history(
        &self,
        query: AttendanceHistoryParams,
    ) -> Result<AttendanceHistoryResponse> {
        self.list_attendance_history_impl(query).await
    }

    async fn count_attendance_by_status(
        &self,
        date_from: &str,
        date_to: &str,
        class_ids: Option<Vec<i64>>,
    ) -> Result<StatusCounts> {
        self.count_attendance_by_status_impl(date_from, date_to, class_ids)
            .await
    }

    async fn create_face_log(&self, log: NewFaceRecognitionLog) -> Result<FaceRecognitionLog> {
        self.create_face_log_impl(log).await
    }

    // 通知
    async fn create_notification(&self, req: CreateNotificationRequest) -> Result<Notification> {
        self.create_notification_impl(req).await
    }

    async fn create_notifications_for_users(
        &self,
        user_ids: &[i64],
        notification_type: NotificationType,
        title: &str,
        message: &str,
        created_by: Option<i64>,
    ) -> Result<u64> {
        self.create_notifications_for_users_impl(
            user_ids,
            notification_type,
            title,
            message,
            created_by,
        )
        .await
    }

    async fn get_notification_by_id(&self, id: i64) -> Result<Option<Notification>> {
        self.get_notification_by_id_impl(id).await
    }

    async fn list_notifications_with_pagination(
        &self,
        user_id: i64,
        query: NotificationListQuery,
    ) -> Result<NotificationListResponse> {
        self.list_notifications_with_pagination_impl(user_id, query)
            .await
    }

    async fn get_unread_notification_count(&self, user_id: i64) -> Result<i64> {
        self.get_unread_notification_count_impl(user_id).await
    }

    async fn count_all_unread_notifications(&self) -> Result<u64> {
        self.count_all_unread_notifications_impl().await
    }

    async fn mark_notification_as_read(&self, id: i64) -> Result<bool> {
        self.mark_notification_as_read_impl(id).await
    }

    async fn mark_all_notifications_as_read(&self, user_id: i64) -> Result<i64> {
        self.mark_all_notifications_as_read_impl(user_id).await
    }

    async fn delete_notification(&self, id: i64) -> Result<bool> {
        self.delete_notification_impl(id).await
    }

    // 门禁日志
    async fn create_door_log(&self, log: NewDoorAccessLog) -> Result<DoorAccessLog> {
        self.create_door_log_impl(log).await
    }

    async fn list_door_logs(&self, query: DoorAccessLogQuery) -> Result<DoorAccessLogListResponse> {
        self.list_door_logs_impl(query).await
    }

    async fn list_recent_door_logs(
        &self,
        class_id: i64,
        since: i64,
        limit: u64,
    ) -> Result<Vec<DoorAccessLog>> {
        self.list_recent_door_logs_impl(class_id, since, limit)
            .await
    }

    async fn latest_granted_access(&self) -> Result<Option<DoorAccessLog>> {
        self.latest_granted_access_impl().await
    }

    // 系统设置
    async fn list_all_settings(&self) -> Result<Vec<SystemSetting>> {
        self.list_all_settings_impl().await
    }

    async fn get_setting_by_key(&self, key: &str) -> Result<Option<SystemSetting>> {
        self.get_setting_by_key_impl(key).await
    }

    async fn update_setting(
        &self,
        key: &str,
        value: &str,
        description: Option<String>,
        user_id: i64,
    ) -> Result<SystemSetting> {
        self.update_setting_impl(key, value, description, user_id)
            .await
    }
}

/// 测试用数据构造
#[cfg(test)]
pub(crate) mod test_support {
    use super::SeaOrmStorage;
    use crate::models::attendance::entities::{AttendanceMethod, SessionType};
    use crate::models::attendance::requests::NewAttendanceSession;
    use crate::models::courses::entities::{ClassStatus, CourseClass, ScheduleSlot, SemesterPeriod};
    use crate::models::courses::requests::{CreateCourseRequest, NewCourseClass};
    use crate::models::users::entities::{User, UserRole};
    use crate::models::users::requests::CreateUserRequest;

    pub async fn storage() -> SeaOrmStorage {
        SeaOrmStorage::in_memory().await.expect("in-memory sqlite")
    }

    pub async fn user(storage: &SeaOrmStorage, user_id: &str, role: UserRole) -> User {
        storage
            .create_user_impl(CreateUserRequest {
                user_id: user_id.to_string(),
                email: format!("{user_id}@polimdo.ac.id"),
                password: "hash".to_string(),
                full_name: format!("User {user_id}"),
                role,
                status: None,
                phone: None,
                program_study: Some("Teknik Informatika".to_string()),
                semester: Some(3),
                department: None,
            })
            .await
            .expect("create user")
    }

    pub async fn class_with_schedule(
        storage: &SeaOrmStorage,
        code: &str,
        lecturer_id: Option<i64>,
        schedule: Vec<ScheduleSlot>,
    ) -> CourseClass {
        let course = storage
            .create_course_impl(CreateCourseRequest {
                course_code: code.to_string(),
                course_name: format!("Mata Kuliah {code}"),
                credits: 3,
                semester: 1,
                program_study: "Teknik Informatika".to_string(),
                description: None,
                prerequisites: vec![],
            })
            .await
            .expect("create course");
        storage
            .create_course_class_impl(NewCourseClass {
                course_id: course.id,
                lecturer_id,
                lecturer_name: None,
                class_name: format!("{code}-A"),
                academic_year: "2025/2026".to_string(),
                semester_period: SemesterPeriod::Ganjil,
                max_students: 2,
                schedule,
                room: Some("Lab 1".to_string()),
                status: ClassStatus::Active,
            })
            .await
            .expect("create class")
    }

    pub fn slot(day: &str, start: &str, end: &str) -> ScheduleSlot {
        ScheduleSlot {
            day: day.to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
        }
    }

    pub fn new_session(class_id: i64, date: &str, start: &str, end: &str) -> NewAttendanceSession {
        NewAttendanceSession {
            class_id,
            session_date: date.to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            topic: Some("Pengantar".to_string()),
            session_type: SessionType::Lecture,
            attendance_method: AttendanceMethod::FaceRecognition,
            notes: None,
            created_by: None,
        }
    }
}
