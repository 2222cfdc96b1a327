//! Tool-calling medical agent.
//!
//! Two-call flow: the first LLM call must pick a tool and reply with a JSON
//! object `{"tool": ..., "input": ...}`; the tool runs locally; a second call
//! turns the tool result into the final user-facing answer.

use serde::Deserialize;

use crate::calculator;
use crate::error::LlmError;
use crate::provider::{LlmProvider, Message};

/// Canned reply when the pipeline fails; the user never sees raw errors.
pub const FALLBACK_ANSWER: &str =
    "Xin lỗi, tôi đang gặp sự cố kỹ thuật. Vui lòng thử lại sau.";

pub const TOOL_SEARCH: &str = "search_medical_documents";
pub const TOOL_CALCULATOR: &str = "calculator";
pub const TOOL_GENERAL_CHAT: &str = "general_chat";

const AGENT_SYSTEM_PROMPT: &str = "Bạn là trợ lý y tế AI chuyên nghiệp.

🎯 NHIỆM VỤ:
Phân tích câu hỏi và chọn ĐÚNG công cụ để trả lời.

🛠️ CÁC CÔNG CỤ:
1. search_medical_documents - Tìm kiếm thông tin y tế
2. calculator - Tính toán số học
3. general_chat - Trò chuyện thông thường

⚡ QUY TRÌNH (BẮT BUỘC):
1. Phân tích câu hỏi → Chọn tool phù hợp
2. Trả lời CHỈ bằng một object JSON theo mẫu: {\"tool\": \"<tên tool>\", \"input\": \"<đầu vào cho tool>\"}
3. KHÔNG thêm bất kỳ văn bản nào khác ngoài JSON

📌 QUY TẮC QUAN TRỌNG:
- Với câu chào hỏi, cảm ơn → Dùng general_chat
- Với câu hỏi y tế → Dùng search_medical_documents
- Với phép tính → Dùng calculator

VÍ DỤ:
- \"xin chào\" → {\"tool\": \"general_chat\", \"input\": \"xin chào\"}
- \"2+2 bằng bao nhiêu?\" → {\"tool\": \"calculator\", \"input\": \"2+2\"}
- \"Tôi bị đau đầu\" → {\"tool\": \"search_medical_documents\", \"input\": \"đau đầu\"}";

const CHAT_SYSTEM_PROMPT: &str = "Bạn là trợ lý y tế thân thiện. Hãy trò chuyện tự nhiên, \
ngắn gọn và lịch sự bằng tiếng Việt. Không đưa ra chẩn đoán y tế trong các câu trả lời xã giao.";

/// Seam to the retrieval pipeline: returns cleaned context passages.
pub trait ContextSource: Send + Sync {
    fn retrieve(&self, query: &str, top_k: usize) -> anyhow::Result<Vec<String>>;
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ToolSelection {
    pub tool: String,
    pub input: String,
}

#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    pub tool: String,
    pub input: String,
    pub output: String,
}

#[derive(Debug, Clone)]
pub struct AgentReply {
    pub answer: String,
    pub used_tools: bool,
    pub tool_calls: Vec<ToolCallRecord>,
    pub api_calls: usize,
}

pub struct MedicalAgent {
    llm: Box<dyn LlmProvider>,
    search: Box<dyn ContextSource>,
}

impl MedicalAgent {
    pub fn new(llm: Box<dyn LlmProvider>, search: Box<dyn ContextSource>) -> Self {
        Self { llm, search }
    }

    /// Answer one user query. Failures collapse into the canned apology so
    /// the chat surface never shows raw errors.
    pub async fn chat(&self, query: &str) -> AgentReply {
        match self.run(query).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!("agent error: {e}");
                AgentReply {
                    answer: FALLBACK_ANSWER.to_string(),
                    used_tools: false,
                    tool_calls: vec![],
                    api_calls: 0,
                }
            }
        }
    }

    async fn run(&self, query: &str) -> Result<AgentReply, LlmError> {
        let mut messages = vec![
            Message::system(AGENT_SYSTEM_PROMPT),
            Message::user(query),
        ];
        let first = self.llm.chat(&messages).await?;

        let Some(selection) = extract_tool_selection(&first) else {
            // model answered directly; accept it rather than forcing a retry
            tracing::warn!("no tool call in agent response, using it as answer");
            return Ok(AgentReply {
                answer: first,
                used_tools: false,
                tool_calls: vec![],
                api_calls: 1,
            });
        };
        tracing::info!(tool = %selection.tool, "agent selected tool");

        let mut api_calls = 1usize;
        let output = match selection.tool.as_str() {
            TOOL_SEARCH => self.run_search(&selection.input),
            TOOL_CALCULATOR => calculator::evaluate(&selection.input),
            TOOL_GENERAL_CHAT => {
                api_calls += 1;
                self.llm
                    .chat(&[
                        Message::system(CHAT_SYSTEM_PROMPT),
                        Message::user(selection.input.clone()),
                    ])
                    .await?
            }
            unknown => {
                return Ok(AgentReply {
                    answer: format!("Lỗi: Tool '{unknown}' không tồn tại."),
                    used_tools: false,
                    tool_calls: vec![],
                    api_calls,
                });
            }
        };

        let record = ToolCallRecord {
            tool: selection.tool.clone(),
            input: selection.input.clone(),
            output: truncate_chars(&output, 100),
        };

        messages.push(Message::assistant(first));
        messages.push(Message::user(format!(
            "Tool result: {output}\n\nBased on this, please provide your final answer to the user, in Vietnamese."
        )));
        let answer = self.llm.chat(&messages).await?;
        api_calls += 1;

        Ok(AgentReply {
            answer,
            used_tools: true,
            tool_calls: vec![record],
            api_calls,
        })
    }

    fn run_search(&self, query: &str) -> String {
        match self.search.retrieve(query, 3) {
            Ok(contexts) if !contexts.is_empty() => {
                let formatted = contexts
                    .iter()
                    .enumerate()
                    .map(|(i, doc)| format!("📄 Tài liệu {}:\n{}", i + 1, doc))
                    .collect::<Vec<_>>()
                    .join("\n\n");
                format!(
                    "Thông tin y tế từ cơ sở dữ liệu:\n\n{formatted}\n\nHãy sử dụng thông tin trên để trả lời câu hỏi của bệnh nhân một cách chính xác và dễ hiểu."
                )
            }
            Ok(_) => "Không tìm thấy thông tin y tế liên quan trong cơ sở dữ liệu.".to_string(),
            Err(e) => {
                tracing::warn!("search tool failed: {e}");
                "Xin lỗi, đã có lỗi khi tìm kiếm thông tin y tế.".to_string()
            }
        }
    }
}

/// Pull a `{"tool": ..., "input": ...}` object out of a model reply, which
/// may wrap it in a ```json fence or surround it with prose.
pub fn extract_tool_selection(text: &str) -> Option<ToolSelection> {
    let trimmed = text.trim();
    if let Ok(sel) = serde_json::from_str::<ToolSelection>(trimmed) {
        return Some(sel);
    }
    if let Some(fenced) = extract_fenced_block(trimmed) {
        if let Ok(sel) = serde_json::from_str::<ToolSelection>(fenced.trim()) {
            return Some(sel);
        }
    }
    if let Some(object) = extract_first_object(trimmed) {
        if let Ok(sel) = serde_json::from_str::<ToolSelection>(object) {
            return Some(sel);
        }
    }
    None
}

fn extract_fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after = &text[start + 3..];
    let body_start = after.find('\n')? + 1;
    let body = &after[body_start..];
    let end = body.find("```")?;
    Some(&body[..end])
}

fn extract_first_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, c) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
