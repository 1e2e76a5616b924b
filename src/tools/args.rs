//! 命令行参数定义

use clap::{Args, Parser, Subcommand};

/// SiAbsensi 运维工具：课程播种、数据检查与调试
#[derive(Parser, Debug)]
#[command(name = "siabsensi-tools")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// 输出调试日志
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 通过 HTTP API 写入课程目录
    Seed(SeedArgs),

    /// 各表行数与样例数据
    CheckData(CheckDataArgs),

    /// 各表的列定义
    CheckTables,

    /// 给某个课次写入演示考勤记录
    InsertTestAttendance(InsertTestAttendanceArgs),

    /// 打印某天的星期名和匹配的课表时段
    DebugDay(DebugDayArgs),
}

#[derive(Args, Debug)]
pub struct SeedArgs {
    /// `all` 或专业名，如 "Teknik Informatika"
    pub program: Option<String>,

    /// 跳过确认
    #[arg(short, long)]
    pub yes: bool,

    /// 覆盖配置中的 API 地址
    #[arg(long, env = "SIABSENSI_API_BASE")]
    pub api_base: Option<String>,

    /// 管理员邮箱或工号，提供后先登录
    #[arg(long, env = "SIABSENSI_ADMIN_LOGIN")]
    pub login: Option<String>,

    #[arg(long, env = "SIABSENSI_ADMIN_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Args, Debug)]
pub struct CheckDataArgs {
    /// 每张表显示的样例行数
    #[arg(long, default_value_t = 5)]
    pub limit: u64,
}

#[derive(Args, Debug)]
pub struct InsertTestAttendanceArgs {
    #[arg(long)]
    pub session_id: i64,
}

#[derive(Args, Debug)]
pub struct DebugDayArgs {
    /// YYYY-MM-DD，默认校园时区的今天
    #[arg(long)]
    pub date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_seed() {
        let cli = Cli::parse_from(["siabsensi-tools", "seed", "Akuntansi", "--yes"]);
        match cli.command {
            Commands::Seed(args) => {
                assert_eq!(args.program.as_deref(), Some("Akuntansi"));
                assert!(args.yes);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_insert_test_attendance() {
        let cli = Cli::parse_from([
            "siabsensi-tools",
            "insert-test-attendance",
            "--session-id",
            "2",
        ]);
        assert!(matches!(
            cli.command,
            Commands::InsertTestAttendance(InsertTestAttendanceArgs { session_id: 2 })
        ));
    }
}
