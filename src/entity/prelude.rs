//! 预导入模块，方便使用

pub use super::attendance_sessions::{
    ActiveModel as AttendanceSessionActiveModel, Entity as AttendanceSessions,
    Model as AttendanceSessionModel,
};
pub use super::course_classes::{
    ActiveModel as CourseClassActiveModel, Entity as CourseClasses, Model as CourseClassModel,
};
pub use super::courses::{ActiveModel as CourseActiveModel, Entity as Courses, Model as CourseModel};
pub use super::door_access_logs::{
    ActiveModel as DoorAccessLogActiveModel, Entity as DoorAccessLogs, Model as DoorAccessLogModel,
};
pub use super::face_recognition_logs::{
    ActiveModel as FaceRecognitionLogActiveModel, Entity as FaceRecognitionLogs,
    Model as FaceRecognitionLogModel,
};
pub use super::notifications::{
    ActiveModel as NotificationActiveModel, Entity as Notifications, Model as NotificationModel,
};
pub use super::student_attendances::{
    ActiveModel as StudentAttendanceActiveModel, Entity as StudentAttendances,
    Model as StudentAttendanceModel,
};
pub use super::student_enrollments::{
    ActiveModel as StudentEnrollmentActiveModel, Entity as StudentEnrollments,
    Model as StudentEnrollmentModel,
};
pub use super::system_settings::{
    ActiveModel as SystemSettingActiveModel, Entity as SystemSettings, Model as SystemSettingModel,
};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
