use crate::extract::extract_json;
use crate::gemini::NewsModel;
use crate::sources::dedup_citations;
use crate::types::{NewsItem, Result};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Builds the generation prompt for one topic.
///
/// Instructions mirror what the upstream model actually follows well: a
/// recency window of 24–48 hours, authoritative sources, Simplified Chinese,
/// and a JSON array wrapped in a ```json fence matching the `NewsItem` wire
/// shape (minus `sources`, which come from grounding metadata instead).
pub fn build_prompt(topic: &str) -> String {
    format!(
        r#"你是一个专业的实时新闻聚合助手。
请利用 Google Search（谷歌搜索）查找关于 "{topic}" 的最新、最可靠、最真实的新闻。

要求：
1. 优先选择权威信源（主流新闻媒体、官方博客、知名科技期刊、证券交易所公告、权威财经网站）。
2. 时间范围：过去 24-48 小时。如果是非常小众的话题，可放宽至 1 周，但需在时间戳中标明。
3. 返回一个包裹在 ```json 代码块中的有效 JSON 数组。
4. 每个新闻条目的 JSON 结构必须如下：
   {{
     "id": "unique_string_id",
     "title": "事实性强且吸引人的标题（中文，最多 20 字）",
     "summary": "客观简练的摘要（中文，最多 50 字）",
     "fullContent": "详细报道（约 200 字，中文）。如果搜索结果中有具体数据（如财报营收、净利润、增长率）、引用或日期，请务必包含。使用 Markdown 格式。",
     "timestamp": "相对时间（例如：'2小时前' 或 '刚刚'）",
     "category": "科技/商业/财经/军事/政治/生物/国际/科学",
     "impactLevel": "HIGH" (如果是重大突发新闻) 或 "MEDIUM" 或 "LOW"
   }}
5. 语言：简体中文。
6. 语气：新闻专业主义，客观公正。
"#
    )
}

/// Orchestrates one upstream call per topic and turns the loosely-structured
/// reply into typed news items with attached sources.
pub struct NewsClient {
    model: Arc<dyn NewsModel>,
}

impl NewsClient {
    pub fn new(model: Arc<dyn NewsModel>) -> Self {
        Self { model }
    }

    /// Fetches one batch of breaking news for `topic`.
    ///
    /// Transport and service failures surface as `Err`. A successful call
    /// whose body yields no usable JSON array resolves to an empty list —
    /// a model that ignores its formatting instructions is an expected
    /// occurrence, not a system fault. Items the model emits with missing
    /// required fields are dropped individually.
    ///
    /// All items of one batch share the same deduplicated source list. The
    /// grounding metadata carries no per-item mapping, so this is batch-level
    /// context, a known imprecision.
    pub async fn fetch_breaking_news(&self, topic: &str) -> Result<Vec<NewsItem>> {
        let prompt = build_prompt(topic);
        let reply = self.model.generate(&prompt).await?;

        if reply.text.is_empty() {
            info!("model returned no text for topic '{}'", topic);
            return Ok(Vec::new());
        }

        let Some(parsed) = extract_json(&reply.text) else {
            info!("no JSON recovered from model reply for topic '{}'", topic);
            return Ok(Vec::new());
        };

        let Value::Array(elements) = parsed else {
            info!("recovered JSON is not an array, treating as empty batch");
            return Ok(Vec::new());
        };

        let sources = dedup_citations(reply.citations);
        debug!("attaching {} sources to batch", sources.len());

        let mut items = Vec::with_capacity(elements.len());
        for element in elements {
            match serde_json::from_value::<NewsItem>(element) {
                Ok(mut item) => {
                    item.sources = sources.clone();
                    items.push(item);
                }
                Err(e) => warn!("dropping malformed news item: {}", e),
            }
        }

        info!(
            "fetched {} items for topic '{}' via {}",
            items.len(),
            topic,
            self.model.model_name()
        );
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_topic_and_fence_instruction() {
        let prompt = build_prompt("量子计算新闻");
        assert!(prompt.contains("量子计算新闻"));
        assert!(prompt.contains("```json"));
        assert!(prompt.contains("24-48 小时"));
        assert!(prompt.contains("impactLevel"));
    }
}
