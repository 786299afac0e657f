//! Prompt assembly and the single model call behind an extraction.

use std::borrow::Cow;
use std::future::Future;

use coupon_core::CouponRequest;

use crate::error::ExtractError;
use crate::normalize::normalize;

/// Instruction block sent ahead of the pasted coupon text.
pub const INSTRUCTIONS: &str = r#"Extract coupon details from the given text and return STRICT JSON only.

Rules:
- Ignore noise, duplicate lines, ads, symbols.
- Return ONLY valid JSON.
- Do NOT wrap in markdown.
- If a field is not found, return null.
- Dates must be in ISO format (yyyy-MM-dd). If validFrom (start date) is not found in the text, return null (it will be defaulted to today).
- discountType must be either: FLAT or PERCENTAGE.
- usageType must be either: SINGLE_USE, MULTI_USE, or UNLIMITED.
- All numeric values must be numbers (not strings).
- Extract terms and conditions: any fine print, eligibility rules, "valid for new users", "cannot be clubbed", expiry rules, etc. into "terms".

Required JSON structure:

{
"title": string,
"description": string,
"code": string or null,
"platform": string or null,
"category": string or null,
"discountType": "FLAT" or "PERCENTAGE" or null,
"discountValue": number or null,
"minOrderValue": number or null,
"maxDiscountValue": number or null,
"validFrom": "yyyy-MM-dd" or null,
"validTill": "yyyy-MM-dd" or null,
"terms": string or null,
"requiresUniqueUser": boolean or null,
"usageType": "SINGLE_USE" | "MULTI_USE" | "UNLIMITED" or null,
"geoRestriction": string or null,
"isActive": boolean,
"totalQuantity": number,
"price": number or null,
"isFree": boolean
}
"#;

/// Concatenates the instruction block and the caller's text.
#[must_use]
pub fn build_prompt(instructions: &str, text: &str) -> String {
    format!("{instructions}\n\nText:\n{text}")
}

/// A text-generation backend that answers one prompt with one reply.
pub trait GenerativeModel: Send + Sync {
    /// Identifier of the model being called, for logs.
    fn model_id(&self) -> &str;

    /// Sends `prompt` and returns the model's text, or `None` if the reply
    /// carried no text.
    fn generate(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<Option<String>, ExtractError>> + Send;
}

/// Extraction gateway: owns the instruction block and the model handle.
///
/// Holds no per-call state, so one instance can serve concurrent requests.
pub struct Extractor<M> {
    model: M,
    instructions: Cow<'static, str>,
}

impl<M: GenerativeModel> Extractor<M> {
    /// Creates an extractor using the built-in [`INSTRUCTIONS`].
    #[must_use]
    pub fn new(model: M) -> Self {
        Self::with_instructions(model, INSTRUCTIONS)
    }

    #[must_use]
    pub fn with_instructions(model: M, instructions: impl Into<Cow<'static, str>>) -> Self {
        Self {
            model,
            instructions: instructions.into(),
        }
    }

    #[must_use]
    pub fn model(&self) -> &M {
        &self.model
    }

    /// The full prompt that [`Extractor::extract`] would send for `text`.
    #[must_use]
    pub fn prompt_for(&self, text: &str) -> String {
        build_prompt(&self.instructions, text)
    }

    /// Calls the model once and returns its raw text unmodified.
    ///
    /// # Errors
    ///
    /// Propagates transport failures from the model; nothing is synthesized
    /// locally.
    pub async fn extract(&self, text: &str) -> Result<Option<String>, ExtractError> {
        let prompt = self.prompt_for(text);
        tracing::debug!(
            model = self.model.model_id(),
            prompt_len = prompt.len(),
            "sending extraction prompt"
        );

        let raw = self.model.generate(&prompt).await?;
        tracing::debug!(
            response_len = raw.as_ref().map_or(0, String::len),
            "received model response"
        );
        Ok(raw)
    }

    /// Extracts and normalizes coupon fields from free text.
    ///
    /// # Errors
    ///
    /// Returns a transport error from the model call, or
    /// [`ExtractError::Parse`] when the reply is not a JSON object.
    pub async fn extract_coupon(&self, text: &str) -> Result<CouponRequest, ExtractError> {
        let raw = self.extract(text).await?;
        normalize(raw.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct CannedModel {
        reply: Option<String>,
        prompts: Mutex<Vec<String>>,
    }

    impl CannedModel {
        fn new(reply: Option<&str>) -> Self {
            Self {
                reply: reply.map(ToOwned::to_owned),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    impl GenerativeModel for CannedModel {
        fn model_id(&self) -> &str {
            "canned"
        }

        async fn generate(&self, prompt: &str) -> Result<Option<String>, ExtractError> {
            self.prompts.lock().unwrap().push(prompt.to_owned());
            Ok(self.reply.clone())
        }
    }

    struct FailingModel;

    impl GenerativeModel for FailingModel {
        fn model_id(&self) -> &str {
            "failing"
        }

        async fn generate(&self, _prompt: &str) -> Result<Option<String>, ExtractError> {
            Err(ExtractError::Upstream {
                status: 429,
                message: "quota exceeded".to_string(),
            })
        }
    }

    #[test]
    fn build_prompt_appends_text_after_instructions() {
        let prompt = build_prompt("RULES", "20% off pizza");
        assert_eq!(prompt, "RULES\n\nText:\n20% off pizza");
    }

    #[test]
    fn instructions_fix_the_response_contract() {
        assert!(INSTRUCTIONS.contains("Do NOT wrap in markdown"));
        assert!(INSTRUCTIONS.contains("FLAT or PERCENTAGE"));
        assert!(INSTRUCTIONS.contains("SINGLE_USE, MULTI_USE, or UNLIMITED"));
        assert!(INSTRUCTIONS.contains("yyyy-MM-dd"));
        assert!(INSTRUCTIONS.contains("\"terms\""));
    }

    #[tokio::test]
    async fn extract_sends_one_prompt_and_returns_raw_text() {
        let extractor = Extractor::new(CannedModel::new(Some("```json\n{}\n```")));
        let raw = extractor.extract("Use code SAVE10").await.expect("extract");

        assert_eq!(raw.as_deref(), Some("```json\n{}\n```"));
        let prompts = extractor.model().prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].starts_with(INSTRUCTIONS));
        assert!(prompts[0].ends_with("\n\nText:\nUse code SAVE10"));
    }

    #[tokio::test]
    async fn extract_uses_injected_instructions() {
        let extractor = Extractor::with_instructions(CannedModel::new(Some("{}")), "CUSTOM");
        extractor.extract("text").await.expect("extract");
        let prompts = extractor.model().prompts.lock().unwrap();
        assert_eq!(prompts[0], "CUSTOM\n\nText:\ntext");
    }

    #[tokio::test]
    async fn extract_coupon_normalizes_reply() {
        let extractor = Extractor::new(CannedModel::new(Some(
            r#"{"code":"SAVE10","discountType":"flat","discountValue":10}"#,
        )));
        let coupon = extractor.extract_coupon("Save 10").await.expect("coupon");
        assert_eq!(coupon.code.as_deref(), Some("SAVE10"));
        assert_eq!(coupon.discount_type, Some(coupon_core::DiscountType::Flat));
    }

    #[tokio::test]
    async fn extract_coupon_treats_missing_text_as_empty_object() {
        let extractor = Extractor::new(CannedModel::new(None));
        let coupon = extractor.extract_coupon("anything").await.expect("coupon");
        assert!(coupon.title.is_none());
    }

    #[tokio::test]
    async fn extract_coupon_propagates_transport_failure() {
        let extractor = Extractor::new(FailingModel);
        let err = extractor.extract_coupon("text").await.unwrap_err();
        assert!(err.is_transport());
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn extract_coupon_fails_on_prose_reply() {
        let extractor = Extractor::new(CannedModel::new(Some("Sorry, I can't help with that.")));
        let err = extractor.extract_coupon("text").await.unwrap_err();
        assert!(matches!(err, ExtractError::Parse(_)));
    }
}
