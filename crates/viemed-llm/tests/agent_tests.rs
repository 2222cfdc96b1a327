use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use viemed_llm::agent::{extract_tool_selection, ContextSource, MedicalAgent};
use viemed_llm::{LlmError, LlmProvider, Message};

struct ScriptedProvider {
    replies: Mutex<VecDeque<String>>,
}

impl ScriptedProvider {
    fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|s| (*s).to_string()).collect()),
        }
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn chat(&self, _messages: &[Message]) -> Result<String, LlmError> {
        self.replies
            .lock()
            .map_err(|_| LlmError::InvalidResponse("lock poisoned".to_string()))?
            .pop_front()
            .ok_or_else(|| LlmError::InvalidResponse("script exhausted".to_string()))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

struct StaticContext(Vec<String>);

impl ContextSource for StaticContext {
    fn retrieve(&self, _query: &str, _top_k: usize) -> anyhow::Result<Vec<String>> {
        Ok(self.0.clone())
    }
}

#[test]
fn tool_selection_parses_bare_json() {
    let sel = extract_tool_selection(r#"{"tool": "calculator", "input": "2+2"}"#)
        .expect("selection");
    assert_eq!(sel.tool, "calculator");
    assert_eq!(sel.input, "2+2");
}

#[test]
fn tool_selection_parses_fenced_json() {
    let text = "Chọn công cụ:\n```json\n{\"tool\": \"general_chat\", \"input\": \"xin chào\"}\n```\nXong.";
    let sel = extract_tool_selection(text).expect("selection");
    assert_eq!(sel.tool, "general_chat");
}

#[test]
fn tool_selection_parses_embedded_object() {
    let text = "Tôi sẽ dùng {\"tool\": \"search_medical_documents\", \"input\": \"đau đầu\"} nhé";
    let sel = extract_tool_selection(text).expect("selection");
    assert_eq!(sel.tool, "search_medical_documents");
    assert_eq!(sel.input, "đau đầu");
}

#[test]
fn tool_selection_rejects_plain_text() {
    assert!(extract_tool_selection("Bạn nên đi khám bác sĩ.").is_none());
}

#[tokio::test]
async fn agent_runs_calculator_in_two_calls() {
    let agent = MedicalAgent::new(
        Box::new(ScriptedProvider::new(&[
            r#"{"tool": "calculator", "input": "10 * 5 + 3"}"#,
            "Kết quả của phép tính là 53.",
        ])),
        Box::new(StaticContext(vec![])),
    );

    let reply = agent.chat("10 * 5 + 3 bằng bao nhiêu?").await;
    assert!(reply.used_tools);
    assert_eq!(reply.api_calls, 2);
    assert_eq!(reply.tool_calls.len(), 1);
    assert_eq!(reply.tool_calls[0].tool, "calculator");
    assert_eq!(reply.tool_calls[0].output, "Kết quả: 53");
    assert_eq!(reply.answer, "Kết quả của phép tính là 53.");
}

#[tokio::test]
async fn agent_formats_retrieved_documents() {
    let agent = MedicalAgent::new(
        Box::new(ScriptedProvider::new(&[
            r#"{"tool": "search_medical_documents", "input": "sốt xuất huyết"}"#,
            "Sốt xuất huyết có các dấu hiệu sau...",
        ])),
        Box::new(StaticContext(vec![
            "Sốt xuất huyết gây sốt cao.".to_string(),
            "Cần theo dõi tiểu cầu.".to_string(),
        ])),
    );

    let reply = agent.chat("Tôi nghi bị sốt xuất huyết").await;
    assert!(reply.used_tools);
    assert!(reply.tool_calls[0].output.contains("Tài liệu 1"));
}

#[tokio::test]
async fn agent_passes_direct_answers_through() {
    let agent = MedicalAgent::new(
        Box::new(ScriptedProvider::new(&["Chào bạn!"])),
        Box::new(StaticContext(vec![])),
    );
    let reply = agent.chat("xin chào").await;
    assert!(!reply.used_tools);
    assert_eq!(reply.api_calls, 1);
    assert_eq!(reply.answer, "Chào bạn!");
}

#[tokio::test]
async fn unknown_tool_yields_error_answer() {
    let agent = MedicalAgent::new(
        Box::new(ScriptedProvider::new(&[
            r#"{"tool": "diagnose", "input": "sốt"}"#,
        ])),
        Box::new(StaticContext(vec![])),
    );
    let reply = agent.chat("chẩn đoán giúp tôi").await;
    assert!(!reply.used_tools);
    assert!(reply.answer.contains("không tồn tại"));
}
