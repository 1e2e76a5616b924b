/// API 业务错误码
///
/// 0 表示成功，3 位数与 HTTP 状态对应，4 位数按业务域划分：
/// 1xxx 认证，2xxx 用户，3xxx 课程与选课，4xxx 考勤，5xxx 通知，6xxx 门禁。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    BadRequest = 400,
    Unauthorized = 401,
    Forbidden = 403,
    NotFound = 404,
    Conflict = 409,
    RateLimitExceeded = 429,
    InternalServerError = 500,

    AuthFailed = 1000,
    RegisterFailed = 1001,
    AccountInactive = 1002,

    UserNotFound = 2000,
    UserAlreadyExists = 2001,
    UserEmailAlreadyExists = 2002,
    UserIdAlreadyExists = 2003,
    UserPasswordInvalid = 2004,
    UserEmailInvalid = 2005,
    UserCreationFailed = 2006,
    UserUpdateFailed = 2007,
    UserDeleteFailed = 2008,
    CanNotDeleteCurrentUser = 2009,
    CanNotSuspendCurrentUser = 2010,

    CourseNotFound = 3000,
    CourseCodeAlreadyExists = 3001,
    CourseHasActiveClasses = 3002,
    ClassNotFound = 3003,
    ScheduleConflict = 3004,
    ScheduleInvalid = 3005,
    EnrollmentNotFound = 3006,
    AlreadyEnrolled = 3007,
    ClassFull = 3008,

    SessionNotFound = 4000,
    SessionOverlap = 4001,
    SessionStateInvalid = 4002,
    AttendanceAlreadyRecorded = 4003,
    AttendanceNotFound = 4004,
    LowConfidence = 4005,
    StudentNotFound = 4006,

    NotificationNotFound = 5000,

    DoorAccessDenied = 6000,
}

impl ErrorCode {
    pub fn code(self) -> i32 {
        self as i32
    }
}
