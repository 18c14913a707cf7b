use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::error::SummaryError;
use crate::summarizer::{StructuredSummary, SummaryLanguage, Translation};

const SCHEMA_NAME: &str = "PaperSummary";

#[derive(Debug, Deserialize)]
struct SummaryReply {
    background: String,
    purpose: String,
    proposal: String,
    evaluation: String,
    result: String,
}

#[derive(Debug, Deserialize)]
struct TranslatedReply {
    title_ja: String,
    abstract_ja: String,
    #[serde(flatten)]
    summary: SummaryReply,
}

impl SummaryReply {
    fn into_summary(self, translation: Option<Translation>) -> StructuredSummary {
        StructuredSummary {
            translation,
            background: self.background,
            purpose: self.purpose,
            proposal: self.proposal,
            evaluation: self.evaluation,
            result: self.result,
        }
    }
}

fn field_description(field: &str) -> &'static str {
    match field {
        "title_ja" => "Japanese translation of the full title, with 2-3 keywords emphasised",
        "abstract_ja" => "Japanese translation of the full abstract, with 2-3 sentences emphasised",
        "background" => {
            "Background: the context, the problem being addressed, why it matters and why a solution is needed"
        }
        "purpose" => "Purpose: the problem the research aims to solve and its significance, in one sentence",
        "proposal" => "Proposal: the proposed technology, method, software, phenomenon or hypothesis",
        "evaluation" => "Evaluation: the experimental approach or analysis used to test the hypothesis",
        "result" => "Result: the conclusions or insights obtained",
        _ => "",
    }
}

impl SummaryLanguage {
    pub fn system_prompt(self) -> &'static str {
        match self {
            Self::English => "You are an assistant that performs translation and summarization of texts.",
            Self::Japanese => {
                "You are an assistant that translates English research texts into Japanese and summarizes them in Japanese."
            }
        }
    }

    /// The user instruction embedding one paper's title and abstract
    pub fn user_prompt(self, title: &str, abstract_text: &str) -> String {
        let instruction = match self {
            Self::English => {
                "Below is the title and abstract of a paper. Summarize it into five sections: \
                 \"Background\", \"Purpose\", \"Proposal\", \"Evaluation\" and \"Result\", each a single \
                 sentence of at most 100 characters. Highlight words that are interesting from a \
                 researcher's perspective by enclosing them in ** **."
            }
            Self::Japanese => {
                "Below is the title and abstract of a paper. Translate both into Japanese, then organise \
                 the paper into five items (背景, 目的, 提案, 評価, 結果), each a single Japanese sentence of \
                 about 50 characters. Emphasise the key words of the translations and summaries, \
                 especially what a researcher would find interesting, by enclosing them in ** **."
            }
        };

        let fields = self
            .summary_fields()
            .iter()
            .map(|f| format!("    \"{}\": \"{}\"", f, field_description(f)))
            .collect::<Vec<_>>()
            .join(",\n");

        format!(
            "{}\n\nTitle:\n{}\nAbstract:\n{}\n\nOutput in JSON format as follows:\n{{\n{}\n}}",
            instruction, title, abstract_text, fields
        )
    }

    /// `response_format` payload declaring the summary as a strict JSON schema
    pub fn response_format(self) -> Value {
        let properties: Map<String, Value> = self
            .summary_fields()
            .iter()
            .map(|f| (f.to_string(), json!({ "type": "string" })))
            .collect();

        json!({
            "type": "json_schema",
            "json_schema": {
                "name": SCHEMA_NAME,
                "strict": true,
                "schema": {
                    "type": "object",
                    "properties": properties,
                    "required": self.summary_fields(),
                    "additionalProperties": false
                }
            }
        })
    }

    /// Decode the model's JSON reply into a summary of this language's shape
    pub fn decode(self, content: &str) -> Result<StructuredSummary, SummaryError> {
        match self {
            Self::English => {
                let reply: SummaryReply =
                    serde_json::from_str(content).map_err(SummaryError::SchemaConformance)?;
                Ok(reply.into_summary(None))
            }
            Self::Japanese => {
                let reply: TranslatedReply =
                    serde_json::from_str(content).map_err(SummaryError::SchemaConformance)?;
                let translation = Translation {
                    title_ja: reply.title_ja,
                    abstract_ja: reply.abstract_ja,
                };
                Ok(reply.summary.into_summary(Some(translation)))
            }
        }
    }
}
