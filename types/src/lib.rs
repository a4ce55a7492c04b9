//! Record types shared between the extractor and the collaborators that
//! store records and reply to chat messages.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wire format of `recorded_at` in persistence rows (local civil time).
pub const RECORDED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ── Category ─────────────────────────────────────────────────────────────

/// The closed set of activity kinds. `General` is the catch-all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// 睡觉
    Sleep,
    /// 吃奶 / 吃饭
    Eat,
    /// 玩耍
    Play,
    /// 学习
    Study,
    /// 营养补充
    Supplement,
    /// 里程碑
    Milestone,
    /// 记录 (nothing recognized)
    General,
}

impl Category {
    /// The six categories an annotator is allowed to report.
    pub const KNOWN: [Category; 6] = [
        Self::Sleep,
        Self::Eat,
        Self::Play,
        Self::Study,
        Self::Supplement,
        Self::Milestone,
    ];

    /// Look up one of the six known categories by its storage code.
    /// `"general"` is deliberately not accepted here.
    pub fn from_known_code(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::KNOWN
            .iter()
            .copied()
            .find(|c| c.as_code().eq_ignore_ascii_case(code))
    }

    pub fn as_code(&self) -> &'static str {
        match self {
            Self::Sleep => "sleep",
            Self::Eat => "eat",
            Self::Play => "play",
            Self::Study => "study",
            Self::Supplement => "supplement",
            Self::Milestone => "milestone",
            Self::General => "general",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Sleep => "睡觉",
            Self::Eat => "吃饭",
            Self::Play => "玩耍",
            Self::Study => "学习",
            Self::Supplement => "营养补充",
            Self::Milestone => "里程碑",
            Self::General => "记录",
        }
    }
}

// ── Eat sub-classification ───────────────────────────────────────────────

/// Milk feeds carry an ml amount; solid food does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EatKind {
    /// 吃奶 / 喝奶 / 喂奶 / 母乳
    Milk,
    /// 吃饭 / 辅食 / 喝粥 / 米糊 / 吃米
    Food,
}

impl EatKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Milk => "吃奶",
            Self::Food => "吃饭",
        }
    }
}

// ── The assembled record ─────────────────────────────────────────────────

/// A structured activity record. Immutable once assembled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eat_kind: Option<EatKind>,
    pub category_label: String,
    /// Local civil time, second precision.
    pub recorded_at: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    pub content: String,
    /// The input text, verbatim
    pub raw_text: String,
    /// Only present when the annotator supplied one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    pub message: String,
}

impl ActivityRecord {
    /// Shape the record for the storage collaborator's insert call.
    pub fn to_row(&self) -> RecordRow {
        RecordRow {
            kind: self.category.as_code().to_string(),
            content: self.content.clone(),
            duration: self.duration_minutes.unwrap_or(0),
            value: self.quantity,
            recorded_at: self.recorded_at.format(RECORDED_AT_FORMAT).to_string(),
        }
    }
}

/// Row passed to the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRow {
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    pub duration: u32,
    pub value: Option<u32>,
    pub recorded_at: String,
}

// ── Annotator output ─────────────────────────────────────────────────────

/// JSON object returned by the remote text-to-JSON annotator.
///
/// Every field is optional and loosely typed: the annotator is an LLM and
/// routinely sends numbers as strings or leaves fields out. Use the
/// accessor methods rather than the raw `Value`s.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiAnnotation {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default, rename = "typeName", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default)]
    pub recorded_at: Option<String>,
    #[serde(default)]
    pub duration: Option<Value>,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub confidence: Option<Value>,
}

impl AiAnnotation {
    /// Parse an annotator reply.
    ///
    /// Replies are often wrapped in prose or a code fence; when the whole
    /// text is not JSON, the outermost `{...}` block is tried instead.
    pub fn from_reply(reply: &str) -> Result<Self, serde_json::Error> {
        let reply = reply.trim();
        match serde_json::from_str(reply) {
            Ok(a) => Ok(a),
            Err(e) => match (reply.find('{'), reply.rfind('}')) {
                (Some(start), Some(end)) if start < end => {
                    serde_json::from_str(&reply[start..=end])
                }
                _ => Err(e),
            },
        }
    }

    /// Duration in minutes, if the annotator gave a positive whole number.
    pub fn duration_minutes(&self) -> Option<u32> {
        self.duration.as_ref().and_then(value_as_u32).filter(|&d| d > 0)
    }

    /// Quantity: `value` wins, else the first digit run in `amount` ("90ml").
    pub fn quantity(&self) -> Option<u32> {
        self.value
            .as_ref()
            .and_then(value_as_u32)
            .or_else(|| self.amount.as_ref().and_then(value_as_u32))
    }

    pub fn confidence_score(&self) -> Option<f64> {
        match self.confidence.as_ref()? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Non-blank content string.
    pub fn content_text(&self) -> Option<&str> {
        self.content.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Non-blank message string.
    pub fn message_text(&self) -> Option<&str> {
        self.message.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Read a non-negative integer from a JSON number or from the leading
/// digit run of a string ("90", "90ml", " 90 毫升").
fn value_as_u32(v: &Value) -> Option<u32> {
    match v {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                u32::try_from(u).ok()
            } else {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0 && *f <= f64::from(u32::MAX))
                    .map(|f| f.round() as u32)
            }
        }
        Value::String(s) => {
            let digits: String = s
                .chars()
                .skip_while(|c| !c.is_ascii_digit())
                .take_while(|c| c.is_ascii_digit())
                .collect();
            digits.parse().ok()
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_known_code_excludes_general() {
        assert_eq!(Category::from_known_code("sleep"), Some(Category::Sleep));
        assert_eq!(Category::from_known_code(" Eat "), Some(Category::Eat));
        assert_eq!(Category::from_known_code("general"), None);
        assert_eq!(Category::from_known_code("emotion"), None);
    }

    #[test]
    fn test_annotation_lenient_numbers() {
        let a: AiAnnotation = serde_json::from_str(
            r#"{"type":"eat","duration":"30","amount":"90ml","confidence":"0.8"}"#,
        )
        .unwrap();
        assert_eq!(a.duration_minutes(), Some(30));
        assert_eq!(a.quantity(), Some(90));
        assert_eq!(a.confidence_score(), Some(0.8));
    }

    #[test]
    fn test_annotation_value_beats_amount() {
        let a: AiAnnotation =
            serde_json::from_str(r#"{"value":120,"amount":"90ml","duration":0}"#).unwrap();
        assert_eq!(a.quantity(), Some(120));
        // Zero duration counts as "not supplied"
        assert_eq!(a.duration_minutes(), None);
    }

    #[test]
    fn test_reply_wrapped_in_prose() {
        let reply = "好的，解析结果如下：\n```json\n{\"type\":\"sleep\",\"duration\":90}\n```";
        let a = AiAnnotation::from_reply(reply).unwrap();
        assert_eq!(a.kind.as_deref(), Some("sleep"));
        assert_eq!(a.duration_minutes(), Some(90));
    }

    #[test]
    fn test_reply_without_object_is_error() {
        assert!(AiAnnotation::from_reply("无法解析").is_err());
        assert!(AiAnnotation::from_reply("} oops {").is_err());
    }

    #[test]
    fn test_row_defaults_duration_to_zero() {
        let record = ActivityRecord {
            category: Category::Eat,
            eat_kind: Some(EatKind::Milk),
            category_label: Category::Eat.label().to_string(),
            recorded_at: NaiveDate::from_ymd_opt(2024, 6, 10)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            duration_minutes: None,
            quantity: Some(90),
            content: "吃奶90ml".to_string(),
            raw_text: "吃奶90ml".to_string(),
            confidence: None,
            message: "吃奶数据已记录 90ml".to_string(),
        };
        let row = record.to_row();
        assert_eq!(row.kind, "eat");
        assert_eq!(row.duration, 0);
        assert_eq!(row.value, Some(90));
        assert_eq!(row.recorded_at, "2024-06-10 10:00:00");
    }
}
