use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 用户表（学生 NIM / 教师 NIP 存在 user_id 列）
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::UserId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::FullName).string().not_null())
                    .col(ColumnDef::new(Users::Role).string().not_null())
                    .col(ColumnDef::new(Users::Status).string().not_null())
                    .col(ColumnDef::new(Users::Phone).string().null())
                    .col(ColumnDef::new(Users::ProgramStudy).string().null())
                    .col(ColumnDef::new(Users::Semester).integer().null())
                    .col(ColumnDef::new(Users::Department).string().null())
                    .col(ColumnDef::new(Users::LastLogin).big_integer().null())
                    .col(ColumnDef::new(Users::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 课程表
        manager
            .create_table(
                Table::create()
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Courses::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Courses::CourseCode)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Courses::CourseName).string().not_null())
                    .col(ColumnDef::new(Courses::Credits).integer().not_null())
                    .col(ColumnDef::new(Courses::Semester).integer().not_null())
                    .col(ColumnDef::new(Courses::ProgramStudy).string().not_null())
                    .col(ColumnDef::new(Courses::Description).text().null())
                    .col(ColumnDef::new(Courses::Prerequisites).text().not_null())
                    .col(ColumnDef::new(Courses::Status).string().not_null())
                    .col(ColumnDef::new(Courses::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Courses::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 课程班级表
        manager
            .create_table(
                Table::create()
                    .table(CourseClasses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CourseClasses::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CourseClasses::CourseId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CourseClasses::LecturerId)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(CourseClasses::LecturerName).string().null())
                    .col(ColumnDef::new(CourseClasses::ClassName).string().not_null())
                    .col(
                        ColumnDef::new(CourseClasses::AcademicYear)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CourseClasses::SemesterPeriod)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CourseClasses::MaxStudents)
                            .integer()
                            .not_null()
                            .default(40),
                    )
                    .col(ColumnDef::new(CourseClasses::Schedule).text().not_null())
                    .col(ColumnDef::new(CourseClasses::Room).string().null())
                    .col(ColumnDef::new(CourseClasses::Status).string().not_null())
                    .col(
                        ColumnDef::new(CourseClasses::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CourseClasses::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(CourseClasses::Table, CourseClasses::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(CourseClasses::Table, CourseClasses::LecturerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // 选课表
        manager
            .create_table(
                Table::create()
                    .table(StudentEnrollments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StudentEnrollments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(StudentEnrollments::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentEnrollments::ClassId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentEnrollments::EnrollmentDate)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentEnrollments::Status)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentEnrollments::FinalGrade)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(StudentEnrollments::FinalScore)
                            .double()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(StudentEnrollments::Table, StudentEnrollments::StudentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(StudentEnrollments::Table, StudentEnrollments::ClassId)
                            .to(CourseClasses::Table, CourseClasses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uk_student_enrollments_student_class")
                    .table(StudentEnrollments::Table)
                    .col(StudentEnrollments::StudentId)
                    .col(StudentEnrollments::ClassId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 考勤课次表
        manager
            .create_table(
                Table::create()
                    .table(AttendanceSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AttendanceSessions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AttendanceSessions::ClassId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceSessions::SessionNumber)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceSessions::SessionDate)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceSessions::StartTime)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceSessions::EndTime)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AttendanceSessions::Topic).string().null())
                    .col(
                        ColumnDef::new(AttendanceSessions::SessionType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceSessions::AttendanceMethod)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceSessions::Status)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AttendanceSessions::Notes).text().null())
                    .col(
                        ColumnDef::new(AttendanceSessions::CreatedBy)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceSessions::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceSessions::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AttendanceSessions::Table, AttendanceSessions::ClassId)
                            .to(CourseClasses::Table, CourseClasses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_attendance_sessions_class_date")
                    .table(AttendanceSessions::Table)
                    .col(AttendanceSessions::ClassId)
                    .col(AttendanceSessions::SessionDate)
                    .to_owned(),
            )
            .await?;

        // 学生考勤记录表
        manager
            .create_table(
                Table::create()
                    .table(StudentAttendances::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StudentAttendances::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(StudentAttendances::SessionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentAttendances::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentAttendances::Status)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentAttendances::CheckInTime)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(StudentAttendances::CheckOutTime)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(StudentAttendances::AttendanceMethod)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentAttendances::ConfidenceScore)
                            .double()
                            .null(),
                    )
                    .col(ColumnDef::new(StudentAttendances::Notes).text().null())
                    .col(
                        ColumnDef::new(StudentAttendances::VerifiedBy)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(StudentAttendances::VerifiedAt)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(StudentAttendances::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentAttendances::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(StudentAttendances::Table, StudentAttendances::SessionId)
                            .to(AttendanceSessions::Table, AttendanceSessions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(StudentAttendances::Table, StudentAttendances::StudentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uk_student_attendances_session_student")
                    .table(StudentAttendances::Table)
                    .col(StudentAttendances::SessionId)
                    .col(StudentAttendances::StudentId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 人脸识别日志表
        manager
            .create_table(
                Table::create()
                    .table(FaceRecognitionLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FaceRecognitionLogs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FaceRecognitionLogs::SessionId)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(FaceRecognitionLogs::RecognizedUserId)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(FaceRecognitionLogs::ConfidenceScore)
                            .double()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(FaceRecognitionLogs::CapturedImagePath)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(FaceRecognitionLogs::RecognitionStatus)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FaceRecognitionLogs::ProcessingTimeMs)
                            .integer()
                            .null(),
                    )
                    .col(ColumnDef::new(FaceRecognitionLogs::CameraId).string().null())
                    .col(
                        ColumnDef::new(FaceRecognitionLogs::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(FaceRecognitionLogs::Table, FaceRecognitionLogs::SessionId)
                            .to(AttendanceSessions::Table, AttendanceSessions::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // 通知表
        manager
            .create_table(
                Table::create()
                    .table(Notifications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Notifications::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Notifications::UserId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Notifications::NotificationType)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Notifications::Title).string().not_null())
                    .col(ColumnDef::new(Notifications::Message).text().not_null())
                    .col(
                        ColumnDef::new(Notifications::IsRead)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Notifications::ReadAt).big_integer().null())
                    .col(ColumnDef::new(Notifications::CreatedBy).big_integer().null())
                    .col(
                        ColumnDef::new(Notifications::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Notifications::Table, Notifications::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_notifications_user_id")
                    .table(Notifications::Table)
                    .col(Notifications::UserId)
                    .to_owned(),
            )
            .await?;

        // 门禁日志表
        manager
            .create_table(
                Table::create()
                    .table(DoorAccessLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DoorAccessLogs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DoorAccessLogs::UserId).big_integer().null())
                    .col(ColumnDef::new(DoorAccessLogs::ClassId).big_integer().null())
                    .col(
                        ColumnDef::new(DoorAccessLogs::AccessTime)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DoorAccessLogs::AccessMethod)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DoorAccessLogs::AccessGranted)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DoorAccessLogs::ConfidenceScore)
                            .double()
                            .null(),
                    )
                    .col(ColumnDef::new(DoorAccessLogs::Reason).string().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_door_access_logs_access_time")
                    .table(DoorAccessLogs::Table)
                    .col(DoorAccessLogs::AccessTime)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 按照创建的相反顺序删除
        manager
            .drop_table(Table::drop().table(DoorAccessLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Notifications::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FaceRecognitionLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StudentAttendances::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AttendanceSessions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StudentEnrollments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CourseClasses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Courses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    UserId,
    Email,
    PasswordHash,
    FullName,
    Role,
    Status,
    Phone,
    ProgramStudy,
    Semester,
    Department,
    LastLogin,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Courses {
    Table,
    Id,
    CourseCode,
    CourseName,
    Credits,
    Semester,
    ProgramStudy,
    Description,
    Prerequisites,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum CourseClasses {
    Table,
    Id,
    CourseId,
    LecturerId,
    LecturerName,
    ClassName,
    AcademicYear,
    SemesterPeriod,
    MaxStudents,
    Schedule,
    Room,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum StudentEnrollments {
    Table,
    Id,
    StudentId,
    ClassId,
    EnrollmentDate,
    Status,
    FinalGrade,
    FinalScore,
}

#[derive(DeriveIden)]
enum AttendanceSessions {
    Table,
    Id,
    ClassId,
    SessionNumber,
    SessionDate,
    StartTime,
    EndTime,
    Topic,
    SessionType,
    AttendanceMethod,
    Status,
    Notes,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum StudentAttendances {
    Table,
    Id,
    SessionId,
    StudentId,
    Status,
    CheckInTime,
    CheckOutTime,
    AttendanceMethod,
    ConfidenceScore,
    Notes,
    VerifiedBy,
    VerifiedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum FaceRecognitionLogs {
    Table,
    Id,
    SessionId,
    RecognizedUserId,
    ConfidenceScore,
    CapturedImagePath,
    RecognitionStatus,
    ProcessingTimeMs,
    CameraId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Notifications {
    Table,
    Id,
    UserId,
    NotificationType,
    Title,
    Message,
    IsRead,
    ReadAt,
    CreatedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum DoorAccessLogs {
    Table,
    Id,
    UserId,
    ClassId,
    AccessTime,
    AccessMethod,
    AccessGranted,
    ConfidenceScore,
    Reason,
}
