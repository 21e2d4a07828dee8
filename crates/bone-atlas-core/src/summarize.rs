//! Seed-context rendering.
//!
//! Turns an [`AggregatedDetectionSummary`] and the user's question into the
//! first user turn of a chat session. The layout is fixed:
//!
//! ```text
//! 我從辨識頁面帶入一張骨科 X 光影像的偵測摘要。
//! ImageCaseId: 42
//! 偵測到的主要骨骼部位：
//! - 頸椎（Cervical vertebrae） × 2
//! - 胸骨（Sternum）
//! - 未能對應明確骨名的區域：1 個（…）
//!
//! <question>
//!
//! 回答限制（請遵守）：
//! 1) …
//! 2) …
//! 3) …
//! ```
//!
//! Output is a pure function of the inputs. No length cap is applied.

use crate::models::{AggregatedDetectionSummary, SeedContext};

/// Question used when the user did not ask anything.
pub const DEFAULT_QUESTION: &str = "請用衛教的方式說明這張影像偵測到的骨骼部位（位置與功能），\
並從 X 光判讀的角度整理常見需要留意的重點（例如骨折、脫臼、關節間隙變化），\
最後提供 3 個可以延伸追問的問題。";

const INTRO: &str = "我從辨識頁面帶入一張骨科 X 光影像的偵測摘要。";
const HEADER: &str = "偵測到的主要骨骼部位：";
const NO_RESULTS: &str = "- （目前沒有可對應到骨名的偵測結果）";

const CONSTRAINTS: &str = "回答限制（請遵守）：
1) 只圍繞上面列出的骨骼部位與這張影像的判讀重點回答。
2) 不要延伸到與偵測部位無關的醫學主題；若必須提及，請明確說明它與偵測部位的關聯。
3) 資訊不足以判斷時，請直接標示「需要更多資訊」，不要猜測或做推測性診斷。";

/// Render the seed context with the built-in [`DEFAULT_QUESTION`].
pub fn summarize(
    image_case_id: i64,
    summary: &AggregatedDetectionSummary,
    user_question: &str,
) -> SeedContext {
    summarize_with_default(image_case_id, summary, user_question, DEFAULT_QUESTION)
}

/// Render the seed context, substituting `default_question` when
/// `user_question` is blank. A non-blank question is used verbatim.
pub fn summarize_with_default(
    image_case_id: i64,
    summary: &AggregatedDetectionSummary,
    user_question: &str,
    default_question: &str,
) -> SeedContext {
    let question = if user_question.trim().is_empty() {
        default_question
    } else {
        user_question
    };

    let mut lines: Vec<String> = Vec::with_capacity(summary.entries.len() + 8);
    lines.push(INTRO.to_string());
    lines.push(format!("ImageCaseId: {image_case_id}"));
    lines.push(HEADER.to_string());

    if summary.entries.is_empty() {
        lines.push(NO_RESULTS.to_string());
    }
    for entry in &summary.entries {
        if entry.count > 1 {
            lines.push(format!("- {} × {}", entry.display_name, entry.count));
        } else {
            lines.push(format!("- {}", entry.display_name));
        }
    }
    if summary.unresolved_count > 0 {
        lines.push(format!(
            "- 未能對應明確骨名的區域：{} 個（可能是重疊、局部遮蔽或分類不確定）",
            summary.unresolved_count
        ));
    }

    lines.push(String::new());
    lines.push(question.to_string());
    lines.push(String::new());
    lines.push(CONSTRAINTS.to_string());

    SeedContext::new(lines.join("\n"))
}
