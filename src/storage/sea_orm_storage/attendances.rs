use std::collections::{BTreeMap, HashMap};

use super::SeaOrmStorage;
use crate::entity::attendance_sessions::{Column as SessionColumn, Entity as Sessions};
use crate::entity::course_classes::{Column as ClassColumn, Entity as CourseClasses};
use crate::entity::courses::{Column as CourseColumn, Entity as Courses};
use crate::entity::face_recognition_logs::ActiveModel as FaceLogActiveModel;
use crate::entity::student_attendances::{ActiveModel, Column, Entity as Attendances};
use crate::entity::users::{Column as UserColumn, Entity as Users};
use crate::errors::{Result, SiAbsensiError};
use crate::models::{
    PaginationInfo, PaginationQuery,
    attendance::{
        entities::{AttendanceStatus, FaceRecognitionLog, StudentAttendance},
        requests::{AttendanceHistoryParams, NewFaceRecognitionLog, NewStudentAttendance},
        responses::{
            AttendanceHistoryItem, AttendanceHistoryResponse, AttendanceRecordDetail,
            StatusCounts,
        },
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

impl SeaOrmStorage {
    pub async fn create_attendance_impl(
        &self,
        req: NewStudentAttendance,
    ) -> Result<StudentAttendance> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            session_id: Set(req.session_id),
            student_id: Set(req.student_id),
            status: Set(req.status.to_string()),
            check_in_time: Set(req.check_in_time),
            check_out_time: Set(None),
            attendance_method: Set(req.attendance_method.to_string()),
            confidence_score: Set(req.confidence_score),
            notes: Set(req.notes),
            verified_by: Set(None),
            verified_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("记录考勤失败: {e}")))?;

        Ok(result.into_attendance())
    }

    pub async fn get_attendance_by_id_impl(&self, id: i64) -> Result<Option<StudentAttendance>> {
        let result = Attendances::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询考勤记录失败: {e}")))?;

        Ok(result.map(|m| m.into_attendance()))
    }

    pub async fn find_attendance_impl(
        &self,
        session_id: i64,
        student_id: i64,
    ) -> Result<Option<StudentAttendance>> {
        let result = Attendances::find()
            .filter(Column::SessionId.eq(session_id))
            .filter(Column::StudentId.eq(student_id))
            .one(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询考勤记录失败: {e}")))?;

        Ok(result.map(|m| m.into_attendance()))
    }

    /// 教师修改考勤状态，同时记录核验人
    pub async fn update_attendance_impl(
        &self,
        id: i64,
        status: AttendanceStatus,
        notes: Option<String>,
        verified_by: i64,
    ) -> Result<Option<StudentAttendance>> {
        let Some(existing) = Attendances::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询考勤记录失败: {e}")))?
        else {
            return Ok(None);
        };

        let now = chrono::Utc::now().timestamp();
        let mut model = ActiveModel {
            id: Set(id),
            status: Set(status.to_string()),
            verified_by: Set(Some(verified_by)),
            verified_at: Set(Some(now)),
            updated_at: Set(now),
            ..Default::default()
        };
        if notes.is_some() {
            model.notes = Set(notes);
        }
        // 改为出席/迟到时补上签到时间
        if status.counts_as_attended() && existing.check_in_time.is_none() {
            model.check_in_time = Set(Some(now));
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("更新考勤记录失败: {e}")))?;

        Ok(Some(result.into_attendance()))
    }

    /// 课次考勤名单（分页），按学号排序
    pub async fn list_session_attendances_impl(
        &self,
        session_id: i64,
        pagination: PaginationQuery,
    ) -> Result<(Vec<AttendanceRecordDetail>, PaginationInfo)> {
        let (page, size) = pagination.normalized();

        let paginator = Attendances::find()
            .filter(Column::SessionId.eq(session_id))
            .inner_join(Users)
            .order_by_asc(UserColumn::UserId)
            .paginate(&self.db, size as u64);

        let total = paginator
            .num_items()
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询考勤总数失败: {e}")))?;

        let records = paginator
            .fetch_page((page - 1) as u64)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询考勤名单失败: {e}")))?;

        let students = self
            .user_names(records.iter().map(|r| r.student_id).collect())
            .await?;

        let items = records
            .into_iter()
            .map(|model| {
                let (student_user_id, student_name) =
                    students.get(&model.student_id).cloned().unwrap_or_default();
                AttendanceRecordDetail {
                    record: model.into_attendance(),
                    student_user_id,
                    student_name,
                }
            })
            .collect();

        Ok((items, PaginationInfo::new(page, size, total as i64)))
    }

    pub async fn list_attendances_for_sessions_impl(
        &self,
        session_ids: &[i64],
    ) -> Result<Vec<StudentAttendance>> {
        if session_ids.is_empty() {
            return Ok(Vec::new());
        }
        let result = Attendances::find()
            .filter(Column::SessionId.is_in(session_ids.iter().copied()))
            .order_by_asc(Column::SessionId)
            .order_by_asc(Column::StudentId)
            .all(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询考勤记录失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_attendance()).collect())
    }

    /// 管理员考勤历史，带课程、课次、学生信息
    pub async fn list_attendance_history_impl(
        &self,
        query: AttendanceHistoryParams,
    ) -> Result<AttendanceHistoryResponse> {
        let (page, size) = query.pagination.normalized();

        let mut condition = Condition::all();
        if let Some(student_id) = query.student_id {
            condition = condition.add(Column::StudentId.eq(student_id));
        }
        if let Some(status) = query.status {
            condition = condition.add(Column::Status.eq(status.to_string()));
        }

        let needs_session_filter = query.course_id.is_some()
            || query.class_id.is_some()
            || query.start_date.is_some()
            || query.end_date.is_some();
        if needs_session_filter {
            let session_ids = self
                .session_ids_matching(
                    query.course_id,
                    query.class_id,
                    query.start_date.as_deref(),
                    query.end_date.as_deref(),
                )
                .await?;
            if session_ids.is_empty() {
                return Ok(AttendanceHistoryResponse {
                    items: Vec::new(),
                    pagination: PaginationInfo::new(page, size, 0),
                    summary: BTreeMap::new(),
                });
            }
            condition = condition.add(Column::SessionId.is_in(session_ids));
        }

        let summary_rows: Vec<(String, i64)> = Attendances::find()
            .select_only()
            .column(Column::Status)
            .column_as(Column::Id.count(), "cnt")
            .filter(condition.clone())
            .group_by(Column::Status)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("统计考勤状态失败: {e}")))?;
        let summary: BTreeMap<String, u64> = summary_rows
            .into_iter()
            .map(|(status, count)| (status, count.max(0) as u64))
            .collect();

        let paginator = Attendances::find()
            .filter(condition)
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .paginate(&self.db, size as u64);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询考勤历史总数失败: {e}")))?;
        let records = paginator
            .fetch_page((page - 1) as u64)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询考勤历史失败: {e}")))?;

        // 当前页涉及的课次、班级、课程、学生
        let session_ids: Vec<i64> = records.iter().map(|r| r.session_id).collect();
        let sessions: HashMap<i64, _> = Sessions::find()
            .filter(SessionColumn::Id.is_in(session_ids))
            .all(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询课次失败: {e}")))?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        let class_ids: Vec<i64> = sessions.values().map(|s| s.class_id).collect();
        let classes: HashMap<i64, _> = CourseClasses::find()
            .filter(ClassColumn::Id.is_in(class_ids))
            .all(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询班级失败: {e}")))?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let course_ids: Vec<i64> = classes.values().map(|c| c.course_id).collect();
        let courses: HashMap<i64, _> = Courses::find()
            .filter(CourseColumn::Id.is_in(course_ids))
            .all(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询课程失败: {e}")))?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let students = self
            .user_names(records.iter().map(|r| r.student_id).collect())
            .await?;

        let items = records
            .into_iter()
            .filter_map(|model| {
                let session = sessions.get(&model.session_id)?;
                let class = classes.get(&session.class_id)?;
                let course = courses.get(&class.course_id)?;
                let (student_user_id, student_name) =
                    students.get(&model.student_id).cloned().unwrap_or_default();
                let record = model.into_attendance();
                Some(AttendanceHistoryItem {
                    id: record.id,
                    session_id: session.id,
                    session_date: session.session_date.clone(),
                    start_time: session.start_time.clone(),
                    class_id: class.id,
                    class_name: class.class_name.clone(),
                    course_code: course.course_code.clone(),
                    course_name: course.course_name.clone(),
                    student_id: record.student_id,
                    student_user_id,
                    student_name,
                    status: record.status,
                    check_in_time: record.check_in_time,
                    attendance_method: record.attendance_method,
                    confidence_score: record.confidence_score,
                })
            })
            .collect();

        Ok(AttendanceHistoryResponse {
            items,
            pagination: PaginationInfo::new(page, size, total as i64),
            summary,
        })
    }

    /// 课次日期落在区间内的考勤按状态计数
    pub async fn count_attendance_by_status_impl(
        &self,
        date_from: &str,
        date_to: &str,
        class_ids: Option<Vec<i64>>,
    ) -> Result<StatusCounts> {
        let mut sessions = Sessions::find()
            .select_only()
            .column(SessionColumn::Id)
            .filter(SessionColumn::SessionDate.gte(date_from))
            .filter(SessionColumn::SessionDate.lte(date_to));
        if let Some(class_ids) = class_ids {
            if class_ids.is_empty() {
                return Ok(StatusCounts::default());
            }
            sessions = sessions.filter(SessionColumn::ClassId.is_in(class_ids));
        }
        let session_ids: Vec<i64> = sessions
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询课次失败: {e}")))?;
        if session_ids.is_empty() {
            return Ok(StatusCounts::default());
        }

        let rows: Vec<(String, i64)> = Attendances::find()
            .select_only()
            .column(Column::Status)
            .column_as(Column::Id.count(), "cnt")
            .filter(Column::SessionId.is_in(session_ids))
            .group_by(Column::Status)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("统计考勤状态失败: {e}")))?;

        let mut counts = StatusCounts::default();
        for (status, count) in rows {
            if let Ok(status) = status.parse::<AttendanceStatus>() {
                counts.add_many(status, count.max(0) as u64);
            }
        }
        Ok(counts)
    }

    pub async fn create_face_log_impl(
        &self,
        req: NewFaceRecognitionLog,
    ) -> Result<FaceRecognitionLog> {
        let model = FaceLogActiveModel {
            session_id: Set(req.session_id),
            recognized_user_id: Set(req.recognized_user_id),
            confidence_score: Set(req.confidence_score),
            captured_image_path: Set(req.captured_image_path),
            recognition_status: Set(req.recognition_status.to_string()),
            processing_time_ms: Set(req.processing_time_ms),
            camera_id: Set(req.camera_id),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("记录人脸识别日志失败: {e}")))?;

        Ok(result.into_face_log())
    }

    /// 学生 ID -> (学号, 姓名)
    async fn user_names(&self, mut ids: Vec<i64>) -> Result<HashMap<i64, (String, String)>> {
        ids.sort_unstable();
        ids.dedup();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<(i64, String, String)> = Users::find()
            .select_only()
            .column(UserColumn::Id)
            .column(UserColumn::UserId)
            .column(UserColumn::FullName)
            .filter(UserColumn::Id.is_in(ids))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询学生信息失败: {e}")))?;

        Ok(rows
            .into_iter()
            .map(|(id, user_id, name)| (id, (user_id, name)))
            .collect())
    }

    async fn session_ids_matching(
        &self,
        course_id: Option<i64>,
        class_id: Option<i64>,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<Vec<i64>> {
        let mut select = Sessions::find().select_only().column(SessionColumn::Id);

        if let Some(course_id) = course_id {
            let class_ids: Vec<i64> = CourseClasses::find()
                .select_only()
                .column(ClassColumn::Id)
                .filter(ClassColumn::CourseId.eq(course_id))
                .into_tuple()
                .all(&self.db)
                .await
                .map_err(|e| SiAbsensiError::database_operation(format!("查询课程班级失败: {e}")))?;
            if class_ids.is_empty() {
                return Ok(Vec::new());
            }
            select = select.filter(SessionColumn::ClassId.is_in(class_ids));
        }
        if let Some(class_id) = class_id {
            select = select.filter(SessionColumn::ClassId.eq(class_id));
        }
        if let Some(start) = start_date {
            select = select.filter(SessionColumn::SessionDate.gte(start));
        }
        if let Some(end) = end_date {
            select = select.filter(SessionColumn::SessionDate.lte(end));
        }

        select
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询课次失败: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{class_with_schedule, new_session, storage, user};
    use super::*;
    use crate::models::attendance::entities::{AttendanceMethod, RecognitionStatus};
    use crate::models::users::entities::UserRole;

    fn record(session_id: i64, student_id: i64, status: AttendanceStatus) -> NewStudentAttendance {
        NewStudentAttendance {
            session_id,
            student_id,
            status,
            check_in_time: None,
            attendance_method: AttendanceMethod::Manual,
            confidence_score: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_one_record_per_student_per_session() {
        let storage = storage().await;
        let student = user(&storage, "220211060001", UserRole::Student).await;
        let class = class_with_schedule(&storage, "TI101", None, vec![]).await;
        let session = storage
            .create_session_impl(new_session(class.id, "2025-06-02", "08:00", "10:00"))
            .await
            .unwrap();

        storage
            .create_attendance_impl(record(session.id, student.id, AttendanceStatus::Present))
            .await
            .unwrap();
        assert!(
            storage
                .create_attendance_impl(record(session.id, student.id, AttendanceStatus::Late))
                .await
                .is_err()
        );
        assert!(
            storage
                .find_attendance_impl(session.id, student.id)
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_update_attendance_sets_verifier() {
        let storage = storage().await;
        let lecturer = user(&storage, "198501012010", UserRole::Lecturer).await;
        let student = user(&storage, "220211060001", UserRole::Student).await;
        let class = class_with_schedule(&storage, "TI101", None, vec![]).await;
        let session = storage
            .create_session_impl(new_session(class.id, "2025-06-02", "08:00", "10:00"))
            .await
            .unwrap();
        let created = storage
            .create_attendance_impl(record(session.id, student.id, AttendanceStatus::Absent))
            .await
            .unwrap();

        let updated = storage
            .update_attendance_impl(
                created.id,
                AttendanceStatus::Late,
                Some("Terlambat karena hujan".to_string()),
                lecturer.id,
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, AttendanceStatus::Late);
        assert_eq!(updated.verified_by, Some(lecturer.id));
        assert!(updated.verified_at.is_some());
        assert!(updated.check_in_time.is_some());

        assert!(
            storage
                .update_attendance_impl(9999, AttendanceStatus::Present, None, lecturer.id)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_session_roster_and_status_counts() {
        let storage = storage().await;
        let b = user(&storage, "220211060002", UserRole::Student).await;
        let a = user(&storage, "220211060001", UserRole::Student).await;
        let class = class_with_schedule(&storage, "TI101", None, vec![]).await;
        let june = storage
            .create_session_impl(new_session(class.id, "2025-06-02", "08:00", "10:00"))
            .await
            .unwrap();
        let july = storage
            .create_session_impl(new_session(class.id, "2025-07-07", "08:00", "10:00"))
            .await
            .unwrap();

        for (session, student, status) in [
            (june.id, a.id, AttendanceStatus::Present),
            (june.id, b.id, AttendanceStatus::Late),
            (july.id, a.id, AttendanceStatus::Absent),
        ] {
            storage
                .create_attendance_impl(record(session, student, status))
                .await
                .unwrap();
        }

        let (items, pagination) = storage
            .list_session_attendances_impl(june.id, PaginationQuery::default())
            .await
            .unwrap();
        assert_eq!(pagination.total, 2);
        assert_eq!(items[0].student_user_id, "220211060001");

        let june_counts = storage
            .count_attendance_by_status_impl("2025-06-01", "2025-06-30", None)
            .await
            .unwrap();
        assert_eq!(june_counts.present, 1);
        assert_eq!(june_counts.late, 1);
        assert_eq!(june_counts.absent, 0);

        let none = storage
            .count_attendance_by_status_impl("2025-06-01", "2025-07-31", Some(vec![]))
            .await
            .unwrap();
        assert_eq!(none.total(), 0);

        let all = storage
            .list_attendances_for_sessions_impl(&[june.id, july.id])
            .await
            .unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_attendance_history_filters() {
        let storage = storage().await;
        let student = user(&storage, "220211060001", UserRole::Student).await;
        let ti = class_with_schedule(&storage, "TI101", None, vec![]).await;
        let si = class_with_schedule(&storage, "SI101", None, vec![]).await;
        let s1 = storage
            .create_session_impl(new_session(ti.id, "2025-06-02", "08:00", "10:00"))
            .await
            .unwrap();
        let s2 = storage
            .create_session_impl(new_session(si.id, "2025-06-03", "08:00", "10:00"))
            .await
            .unwrap();
        storage
            .create_attendance_impl(record(s1.id, student.id, AttendanceStatus::Present))
            .await
            .unwrap();
        storage
            .create_attendance_impl(record(s2.id, student.id, AttendanceStatus::Sick))
            .await
            .unwrap();

        let result = storage
            .list_attendance_history_impl(AttendanceHistoryParams {
                pagination: PaginationQuery::default(),
                course_id: Some(ti.course_id),
                class_id: None,
                student_id: None,
                status: None,
                start_date: None,
                end_date: None,
            })
            .await
            .unwrap();
        assert_eq!(result.pagination.total, 1);
        assert_eq!(result.items[0].course_code, "TI101");
        assert_eq!(result.items[0].student_user_id, "220211060001");
        assert_eq!(result.summary.get("present"), Some(&1));

        let result = storage
            .list_attendance_history_impl(AttendanceHistoryParams {
                pagination: PaginationQuery::default(),
                course_id: None,
                class_id: None,
                student_id: Some(student.id),
                status: Some(AttendanceStatus::Sick),
                start_date: Some("2025-06-03".to_string()),
                end_date: Some("2025-06-03".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].session_date, "2025-06-03");

        let empty = storage
            .list_attendance_history_impl(AttendanceHistoryParams {
                pagination: PaginationQuery::default(),
                course_id: None,
                class_id: None,
                student_id: None,
                status: None,
                start_date: Some("2030-01-01".to_string()),
                end_date: None,
            })
            .await
            .unwrap();
        assert!(empty.items.is_empty());
    }

    #[tokio::test]
    async fn test_face_log() {
        let storage = storage().await;
        let log = storage
            .create_face_log_impl(NewFaceRecognitionLog {
                session_id: None,
                recognized_user_id: None,
                confidence_score: Some(0.42),
                captured_image_path: None,
                recognition_status: RecognitionStatus::LowConfidence,
                processing_time_ms: Some(150),
                camera_id: Some("camera_1".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(log.recognition_status, RecognitionStatus::LowConfidence);
        assert_eq!(log.camera_id.as_deref(), Some("camera_1"));
    }
}
