use std::sync::Arc;

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

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户
    // 创建用户（password 字段须已哈希）
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    // 按 NIM / NIP 查找
    async fn get_user_by_user_id(&self, user_id: &str) -> Result<Option<User>>;
    async fn get_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>>;
    async fn list_users_with_pagination(&self, query: UserListParams) -> Result<UserListResponse>;
    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>>;
    async fn delete_user(&self, id: i64) -> Result<bool>;
    async fn update_last_login(&self, id: i64) -> Result<bool>;
    async fn bulk_update_user_status(&self, ids: &[i64], status: UserStatus) -> Result<u64>;
    async fn count_users(&self) -> Result<u64>;
    // `since` 之后注册的用户计入 recent_registrations
    async fn user_overview(&self, since: i64) -> Result<UserOverview>;
    async fn count_users_by_role(&self) -> Result<Vec<RoleCount>>;
    // 广播通知的收件人，None 为全部活跃用户
    async fn list_active_user_ids(&self, role: Option<UserRole>) -> Result<Vec<i64>>;

    /// 课程
    async fn create_course(&self, course: CreateCourseRequest) -> Result<Course>;
    async fn get_course_by_id(&self, id: i64) -> Result<Option<Course>>;
    async fn get_course_by_code(&self, code: &str) -> Result<Option<Course>>;
    async fn list_courses_with_pagination(
        &self,
        query: CourseListParams,
    ) -> Result<CourseListResponse>;
    async fn update_course(&self, id: i64, update: UpdateCourseRequest) -> Result<Option<Course>>;
    async fn delete_course(&self, id: i64) -> Result<bool>;
    async fn count_courses(&self) -> Result<u64>;

    /// 班级
    async fn create_course_class(&self, class: NewCourseClass) -> Result<CourseClass>;
    async fn get_course_class_by_id(&self, id: i64) -> Result<Option<CourseClass>>;
    async fn list_class_details(&self, filter: ClassFilter) -> Result<Vec<CourseClassDetail>>;
    async fn update_class_status(&self, id: i64, status: ClassStatus)
    -> Result<Option<CourseClass>>;

    /// 选课
    async fn create_enrollment(&self, student_id: i64, class_id: i64) -> Result<Enrollment>;
    async fn get_enrollment_by_id(&self, id: i64) -> Result<Option<Enrollment>>;
    async fn find_enrollment(&self, student_id: i64, class_id: i64) -> Result<Option<Enrollment>>;
    // 仅统计 enrolled 状态
    async fn count_class_enrollments(&self, class_id: i64) -> Result<u64>;
    async fn list_class_enrollments(&self, class_id: i64) -> Result<Vec<EnrollmentDetail>>;
    async fn update_enrollment_status(
        &self,
        id: i64,
        update: UpdateEnrollmentStatusRequest,
    ) -> Result<Option<Enrollment>>;

    /// 课次
    // session_number 按班级自增
    async fn create_session(&self, session: NewAttendanceSession) -> Result<AttendanceSession>;
    async fn get_session_by_id(&self, id: i64) -> Result<Option<AttendanceSession>>;
    async fn list_class_sessions(
        &self,
        class_id: i64,
        query: SessionListParams,
    ) -> Result<SessionListResponse>;
    async fn list_sessions(&self, filter: SessionFilter) -> Result<Vec<SessionWithClass>>;
    async fn update_session_status(
        &self,
        id: i64,
        status: SessionStatus,
    ) -> Result<Option<AttendanceSession>>;
    // 把某班某天未结束的课次置为 completed，返回受影响行数
    async fn complete_open_sessions(&self, class_id: i64, date: &str) -> Result<u64>;

    /// 考勤记录
    async fn create_attendance(&self, record: NewStudentAttendance) -> Result<StudentAttendance>;
    async fn get_attendance_by_id(&self, id: i64) -> Result<Option<StudentAttendance>>;
    async fn find_attendance(
        &self,
        session_id: i64,
        student_id: i64,
    ) -> Result<Option<StudentAttendance>>;
    async fn update_attendance(
        &self,
        id: i64,
        status: AttendanceStatus,
        notes: Option<String>,
        verified_by: i64,
    ) -> Result<Option<StudentAttendance>>;
    async fn list_session_attendances(
        &self,
        session_id: i64,
        pagination: PaginationQuery,
    ) -> Result<(Vec<AttendanceRecordDetail>, PaginationInfo)>;
    async fn list_attendances_for_sessions(
        &self,
        session_ids: &[i64],
    ) -> Result<Vec<StudentAttendance>>;
    async fn list_attendance_history(
        &self,
        query: AttendanceHistoryParams,
    ) -> Result<AttendanceHistoryResponse>;
    // 按课次日期区间统计
    async fn count_attendance_by_status(
        &self,
        date_from: &str,
        date_to: &str,
        class_ids: Option<Vec<i64>>,
    ) -> Result<StatusCounts>;

    /// 人脸识别日志
    async fn create_face_log(&self, log: NewFaceRecognitionLog) -> Result<FaceRecognitionLog>;

    /// 通知
    async fn create_notification(&self, req: CreateNotificationRequest) -> Result<Notification>;
    async fn create_notifications_for_users(
        &self,
        user_ids: &[i64],
        notification_type: NotificationType,
        title: &str,
        message: &str,
        created_by: Option<i64>,
    ) -> Result<u64>;
    async fn get_notification_by_id(&self, id: i64) -> Result<Option<Notification>>;
    async fn list_notifications_with_pagination(
        &self,
        user_id: i64,
        query: NotificationListQuery,
    ) -> Result<NotificationListResponse>;
    async fn get_unread_notification_count(&self, user_id: i64) -> Result<i64>;
    async fn count_all_unread_notifications(&self) -> Result<u64>;
    async fn mark_notification_as_read(&self, id: i64) -> Result<bool>;
    async fn mark_all_notifications_as_read(&self, user_id: i64) -> Result<i64>;
    async fn delete_notification(&self, id: i64) -> Result<bool>;

    /// 门禁日志
    async fn create_door_log(&self, log: NewDoorAccessLog) -> Result<DoorAccessLog>;
    async fn list_door_logs(&self, query: DoorAccessLogQuery) -> Result<DoorAccessLogListResponse>;
    async fn list_recent_door_logs(
        &self,
        class_id: i64,
        since: i64,
        limit: u64,
    ) -> Result<Vec<DoorAccessLog>>;
    async fn latest_granted_access(&self) -> Result<Option<DoorAccessLog>>;

    /// 系统设置
    async fn list_all_settings(&self) -> Result<Vec<SystemSetting>>;
    async fn get_setting_by_key(&self, key: &str) -> Result<Option<SystemSetting>>;
    async fn update_setting(
        &self,
        key: &str,
        value: &str,
        description: Option<String>,
        user_id: i64,
    ) -> Result<SystemSetting>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
