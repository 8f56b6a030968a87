//! Hand-authored keyword agent. Matches bilingual (English / Chinese) cue phrases by
//! substring on the lower-cased text; no language model involved.

use super::{QueryAgent, QueryParams, QueryParseError};

const AGENT_NAME: &str = "KeywordQueryAgent";

const AGE_MIN_CUES: [&str; 5] = ["greater than 20", "over 20", "20+", "大于20", "20岁以上"];
const AGE_MIN_VALUE: i64 = 20;
const AGE_MAX_CUES: [&str; 4] = ["less than 18", "under 18", "小于18", "18岁以下"];
const AGE_MAX_VALUE: i64 = 18;

const FEMALE_CUES: [&str; 4] = ["female", "girl", "女生", "女性"];
const MALE_CUES: [&str; 4] = ["male", "boy", "男生", "男性"];

const CS_CUES: [&str; 5] = [
    "computer science",
    "cs",
    "software engineering",
    "计算机",
    "软件工程",
];
const FINANCE_CUES: [&str; 3] = ["finance", "business", "金融"];

/// Phrasing that asks about someone rather than filtering; fails explicitly when
/// nothing else was recognized.
const EXPLORATORY_CUES: [&str; 4] = ["about", "who is", "关于", "谁是"];

/// Introduces a name filter: "named alice" -> name_part "alice".
const NAME_CUE: &str = "named ";

#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordQueryAgent;

impl KeywordQueryAgent {
    pub fn new() -> Self {
        Self
    }
}

fn contains_any(text: &str, cues: &[&str]) -> bool {
    cues.iter().any(|cue| text.contains(cue))
}

fn name_after_cue(text: &str) -> Option<String> {
    let (_, rest) = text.split_once(NAME_CUE)?;
    let token: String = rest
        .split_whitespace()
        .next()?
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

impl QueryAgent for KeywordQueryAgent {
    fn name(&self) -> &str {
        AGENT_NAME
    }

    fn parse(&self, text: &str) -> Result<QueryParams, QueryParseError> {
        tracing::debug!(target: "roster::query", agent = AGENT_NAME, text = %text, "parsing query");
        let text = text.to_lowercase();
        let mut params = QueryParams::default();

        if contains_any(&text, &AGE_MIN_CUES) {
            params.age_min = Some(AGE_MIN_VALUE);
        }
        if contains_any(&text, &AGE_MAX_CUES) {
            params.age_max = Some(AGE_MAX_VALUE);
        }

        // "female" contains "male", so the female cues must win.
        if contains_any(&text, &FEMALE_CUES) {
            params.gender = Some("Female".to_string());
        } else if contains_any(&text, &MALE_CUES) {
            params.gender = Some("Male".to_string());
        }

        if contains_any(&text, &CS_CUES) {
            params.major = Some("Computer Science".to_string());
        } else if contains_any(&text, &FINANCE_CUES) {
            params.major = Some("Finance".to_string());
        }

        params.name_part = name_after_cue(&text);

        if params.is_empty() {
            if contains_any(&text, &EXPLORATORY_CUES) {
                return Err(QueryParseError(
                    "Could not extract valid filtering parameters from the query. Please try a more specific query."
                        .to_string(),
                ));
            }
            return Err(QueryParseError(
                "Query parsing failed: no valid filtering conditions were recognized.".to_string(),
            ));
        }

        tracing::info!(target: "roster::query", agent = AGENT_NAME, params = %params, "query parsed");
        Ok(params)
    }
}
