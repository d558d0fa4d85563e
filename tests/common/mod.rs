//! 集成测试公共工具：脚本化生成后端与测试文档

#![allow(dead_code)]

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use aidoc_review::{
    BackendError, FailurePolicy, GenerationBackend, GenerationRequest, ModelParams,
    ReviewOrchestrator, ReviewSettings,
};
use async_trait::async_trait;
use tempfile::NamedTempFile;

type Script = dyn Fn(&GenerationRequest) -> Result<String, BackendError> + Send + Sync;

/// 按脚本应答的生成后端，记录每次调用
pub struct ScriptedBackend {
    script: Box<Script>,
    calls: AtomicUsize,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedBackend {
    pub fn new(
        script: impl Fn(&GenerationRequest) -> Result<String, BackendError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            script: Box::new(script),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// 抽取式匹配 + 引用匹配内容的推理
    pub fn extractive() -> Arc<Self> {
        Self::new(extractive_script)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        (self.script)(request)
    }
}

pub fn is_match_request(request: &GenerationRequest) -> bool {
    request.system_message.contains("文档分析专家")
}

/// 从提示词中取出评审要点
pub fn review_point_of(request: &GenerationRequest) -> &str {
    request
        .user_message
        .lines()
        .find_map(|line| line.trim().strip_prefix("评审要点："))
        .unwrap_or("")
}

/// 从匹配提示词中取出 `[i] 段落` 行的段落文本
pub fn paragraphs_of(request: &GenerationRequest) -> Vec<String> {
    request
        .user_message
        .lines()
        .filter_map(|line| {
            let rest = line.strip_prefix('[')?;
            let (index, text) = rest.split_once("] ")?;
            index.parse::<usize>().ok()?;
            Some(text.to_string())
        })
        .collect()
}

/// 匹配阶段：返回与要点共享关键词的段落；推理阶段：引用匹配内容给出结论
fn extractive_script(request: &GenerationRequest) -> Result<String, BackendError> {
    let point = review_point_of(request).to_lowercase();
    if is_match_request(request) {
        let keywords: &[&str] = if point.contains("performance") || point.contains("性能") {
            &["response time", "响应时间"]
        } else if point.contains("logging") || point.contains("日志") {
            &["log", "日志"]
        } else {
            &[]
        };
        let matched: Vec<String> = paragraphs_of(request)
            .into_iter()
            .filter(|p| {
                let lowered = p.to_lowercase();
                keywords.iter().any(|k| lowered.contains(k))
            })
            .collect();
        if matched.is_empty() {
            Ok("未找到直接相关内容".to_string())
        } else {
            Ok(matched.join("\n"))
        }
    } else {
        let content = request
            .user_message
            .lines()
            .find_map(|line| line.trim().strip_prefix("相关内容："))
            .unwrap_or("");
        Ok(format!(
            "第一步：文档相关内容为「{}」。\n第二步：逐项核对要点。\n结论：符合",
            content
        ))
    }
}

pub fn settings(policy: FailurePolicy) -> ReviewSettings {
    ReviewSettings {
        matcher: ModelParams::new("qwen-turbo", 0.3, 512),
        reasoner: ModelParams::new("qwen-turbo", 0.7, 1024),
        max_concurrent_reviews: 4,
        failure_policy: policy,
        request_timeout: Duration::from_secs(30),
    }
}

pub fn orchestrator(
    backend: Arc<ScriptedBackend>,
    policy: FailurePolicy,
) -> ReviewOrchestrator {
    ReviewOrchestrator::new(backend, settings(policy))
}

pub fn points(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|s| s.to_string()).collect()
}

/// 写入 markdown 测试文档
pub fn write_markdown(content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".md").tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

/// 生成只包含正文段落的最小 docx
pub fn write_docx(paragraphs: &[&str]) -> NamedTempFile {
    let file = tempfile::Builder::new().suffix(".docx").tempfile().unwrap();
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>", p))
        .collect();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}<w:sectPr/></w:body></w:document>"#,
        body
    );

    let mut zip = zip::ZipWriter::new(file.reopen().unwrap());
    zip.start_file(
        "[Content_Types].xml",
        zip::write::SimpleFileOptions::default(),
    )
    .unwrap();
    zip.write_all(b"<?xml version=\"1.0\"?><Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\"/>")
        .unwrap();
    zip.start_file("word/document.xml", zip::write::SimpleFileOptions::default())
        .unwrap();
    zip.write_all(xml.as_bytes()).unwrap();
    zip.finish().unwrap();

    file
}
