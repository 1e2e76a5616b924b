//! 通过 HTTP API 播种课程目录

use std::io::{BufRead, Write};
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use super::args::SeedArgs;
use super::catalog::{self, CatalogCourse, POLIMDO_CATALOG};
use crate::config::AppConfig;
use crate::errors::{Result, SiAbsensiError};

/// `POST /api/courses` 请求体
#[derive(Debug, Serialize)]
struct CoursePayload<'a> {
    course_code: &'a str,
    course_name: &'a str,
    description: String,
    credits: i32,
    semester: i32,
    program_study: &'a str,
    prerequisites: Vec<String>,
}

impl<'a> CoursePayload<'a> {
    fn new(course: &'a CatalogCourse, program_study: &'a str) -> Self {
        Self {
            course_code: course.code,
            course_name: course.name,
            description: course.description(program_study),
            credits: course.credits,
            semester: course.semester,
            program_study,
            prerequisites: Vec::new(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub created: usize,
    pub failed: usize,
}

pub struct ApiClient {
    http: reqwest::Client,
    base: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base: &str, timeout_secs: u64) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base: base.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// 服务有响应且不是 5xx 即视为可达，未登录时课程列表会返回 401
    pub async fn ping(&self) -> Result<()> {
        let response = self
            .authorized(self.http.get(self.url("/api/courses")))
            .send()
            .await?;
        if response.status().is_server_error() {
            return Err(SiAbsensiError::http_request(format!(
                "服务端异常: {}",
                response.status()
            )));
        }
        Ok(())
    }

    pub async fn login(&mut self, login: &str, password: &str) -> Result<()> {
        let response = self
            .http
            .post(self.url("/api/auth/login"))
            .json(&serde_json::json!({ "email": login, "password": password }))
            .send()
            .await?;
        let status = response.status();
        let body: serde_json::Value = response.json().await?;
        if !status.is_success() {
            return Err(SiAbsensiError::authentication(api_message(&body)));
        }

        let token = body
            .pointer("/data/access_token")
            .and_then(|v| v.as_str())
            .ok_or_else(|| SiAbsensiError::authentication("登录响应缺少 access_token"))?;
        self.token = Some(token.to_string());
        Ok(())
    }

    async fn create_course(&self, course: &CatalogCourse, program_study: &str) -> Result<()> {
        let response = self
            .authorized(self.http.post(self.url("/api/courses")))
            .json(&CoursePayload::new(course, program_study))
            .send()
            .await?;
        if response.status().is_success() {
            return Ok(());
        }
        let status = response.status();
        let body: serde_json::Value = response.json().await.unwrap_or_default();
        Err(SiAbsensiError::http_request(format!(
            "{status}: {}",
            api_message(&body)
        )))
    }

    /// 逐门创建，失败只计数不中断
    pub async fn seed_program(
        &self,
        program_study: &str,
        courses: &[CatalogCourse],
        delay: Duration,
    ) -> SeedSummary {
        let mut summary = SeedSummary::default();
        for course in courses {
            match self.create_course(course, program_study).await {
                Ok(()) => {
                    println!("  + {} - {}", course.code, course.name);
                    summary.created += 1;
                }
                Err(e) => {
                    println!("  x {} gagal: {}", course.code, e.message());
                    summary.failed += 1;
                }
            }
            tokio::time::sleep(delay).await;
        }
        summary
    }
}

fn api_message(body: &serde_json::Value) -> String {
    body.get("message")
        .and_then(|m| m.as_str())
        .unwrap_or("unknown error")
        .to_string()
}

/// 只有 y / yes 算确认
pub fn confirm(prompt: &str, input: &mut impl BufRead, output: &mut impl Write) -> Result<bool> {
    write!(output, "{prompt} (y/N): ")?;
    output.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    let answer = answer.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

/// 解析目标专业，`all` 为全部
fn select_programs(target: &str) -> Option<Vec<(&'static str, &'static [CatalogCourse])>> {
    if target == "all" {
        return Some(POLIMDO_CATALOG.to_vec());
    }
    catalog::program(target).map(|entry| vec![entry])
}

fn print_programs() {
    println!("Program studi yang tersedia:");
    for program in catalog::program_names() {
        println!("  - {program}");
    }
}

pub async fn run(args: SeedArgs) -> Result<()> {
    let Some(target) = args.program.as_deref() else {
        println!("Penggunaan:");
        println!("  siabsensi-tools seed all");
        println!("  siabsensi-tools seed \"Teknik Informatika\"");
        print_programs();
        return Ok(());
    };
    let Some(programs) = select_programs(target) else {
        println!("Program studi \"{target}\" tidak ditemukan");
        print_programs();
        return Ok(());
    };

    let tools = &AppConfig::get().tools;
    let base = args.api_base.as_deref().unwrap_or(&tools.api_base);
    let mut client = ApiClient::new(base, tools.request_timeout)?;

    if let Err(e) = client.ping().await {
        println!("Server backend tidak dapat diakses di {base}");
        return Err(e);
    }
    if let (Some(login), Some(password)) = (args.login.as_deref(), args.password.as_deref()) {
        client.login(login, password).await?;
        debug!("Logged in to {base} as {login}");
    }

    if !args.yes {
        let stdin = std::io::stdin();
        let proceed = confirm(
            "Ini akan menambahkan mata kuliah ke database. Continue?",
            &mut stdin.lock(),
            &mut std::io::stdout(),
        )?;
        if !proceed {
            println!("Dibatalkan");
            return Ok(());
        }
    }

    let delay = Duration::from_millis(tools.seed_delay_ms);
    let mut total = SeedSummary::default();
    for (program, courses) in programs {
        println!("\n{program}:");
        let summary = client.seed_program(program, courses, delay).await;
        println!(
            "  {} berhasil, {} gagal dari {} mata kuliah",
            summary.created,
            summary.failed,
            courses.len()
        );
        total.created += summary.created;
        total.failed += summary.failed;
    }

    println!("\nSelesai: {} berhasil, {} gagal", total.created, total.failed);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirm_answers() {
        for (answer, expected) in [("y\n", true), ("YES\n", true), ("n\n", false), ("\n", false)] {
            let mut output = Vec::new();
            let result = confirm("Continue?", &mut answer.as_bytes(), &mut output).unwrap();
            assert_eq!(result, expected, "answer {answer:?}");
            assert_eq!(String::from_utf8(output).unwrap(), "Continue? (y/N): ");
        }
    }

    #[test]
    fn test_select_programs() {
        assert_eq!(select_programs("all").map(|p| p.len()), Some(3));
        let single = select_programs("Teknik Elektro").unwrap();
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].1[0].code, "TE101");
        assert!(select_programs("Teknik Sipil").is_none());
    }

    #[test]
    fn test_payload_shape() {
        let course = catalog::program("Teknik Informatika").unwrap().1[0];
        let payload = serde_json::to_value(CoursePayload::new(&course, "Teknik Informatika")).unwrap();
        assert_eq!(payload["course_code"], "TI101");
        assert_eq!(payload["credits"], 3);
        assert_eq!(payload["prerequisites"], serde_json::json!([]));
        assert_eq!(
            payload["description"],
            "Mata kuliah Algoritma dan Pemrograman I untuk Program Studi Teknik Informatika semester 1"
        );
    }

    #[test]
    fn test_client_url() {
        let client = ApiClient::new("http://localhost:5001/", 5).unwrap();
        assert_eq!(client.url("/api/courses"), "http://localhost:5001/api/courses");
    }
}
