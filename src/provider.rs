//! # Recipe Providers
//!
//! The text-generation boundary. A provider turns a [`GenerationRequest`]
//! into a [`RecipeSet`] or fails; the planner treats every failure the same
//! way and falls back to a static recipe.
//!
//! ## Features
//!
//! - Prompt bundle: strict JSON schema, explicit heat levels, concrete amounts
//! - Schema boundary: provider text is parsed into typed structures or rejected
//! - OpenAI-compatible chat-completions client with retries and a circuit breaker
//! - Deterministic fallback provider for offline use and tests

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::circuit_breaker::CircuitBreaker;
use crate::config::{PlannerConfig, ProviderSettings, RecoveryConfig};
use crate::errors::ProviderError;
use crate::recipe_model::{Ingredient, Recipe, RecipeSet, Step};

/// Maximum candidates accepted from one call
pub const MAX_CANDIDATES: usize = 3;

/// Fridge ingredients forwarded to the fallback recipe
const FALLBACK_INGREDIENT_LIMIT: usize = 6;

const SYSTEM_PROMPT: &str = r#"You are a helpful Japanese cooking assistant.
Given ingredients, servings, theme, genre and max time, propose 1–3 Japanese home recipes.
Output strict JSON matching this schema in UTF-8 (no markdown):
{
  "recommendations": [
    {
      "title": string,
      "servings": int,
      "total_time_min": int,
      "difficulty": string,
      "ingredients": [ {
        "name": string,
        "amount": string | null,
        "is_optional": boolean,
        "substitution": string | null
      } ],
      "steps": [ { "text": string } ],
      "equipment": string[] | null
    }
  ]
}
Notes: Avoid vague amounts like '適量' when possible; prefer grams and 大さじ/小さじ. Provide cooking times and heat levels (弱火/中火/強火) explicitly. Avoid steps that cannot be executed in a home kitchen.
"#;

/// Everything a provider needs to propose recipes
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub ingredients: Vec<String>,
    pub servings: u32,
    pub theme: String,
    pub genre: String,
    pub max_minutes: u32,
    pub want_keyword: String,
    pub avoid_keywords: Vec<String>,
    pub child_mode: bool,
    pub cheap_hint: bool,
    pub hint_protein: String,
}

impl GenerationRequest {
    /// Request for one planned day
    pub fn for_day(config: &PlannerConfig, hint_protein: &str, cheap_hint: bool) -> Self {
        Self {
            ingredients: Vec::new(),
            hint_protein: hint_protein.to_string(),
            cheap_hint,
            ..Self::from_config(config)
        }
    }

    /// Request for a single-day suggestion from the user's fridge
    pub fn from_config(config: &PlannerConfig) -> Self {
        Self {
            ingredients: config.ingredients.clone(),
            servings: config.servings,
            theme: config.theme.clone(),
            genre: config.genre.clone(),
            max_minutes: config.max_minutes,
            want_keyword: config.want_keyword.clone(),
            avoid_keywords: config.avoid_keywords.clone(),
            child_mode: config.child_mode,
            cheap_hint: config.prefer_cheap,
            hint_protein: String::new(),
        }
    }

    pub fn system_prompt(&self) -> &'static str {
        SYSTEM_PROMPT
    }

    pub fn user_message(&self) -> String {
        let ingredients = if self.ingredients.is_empty() {
            "（未指定）".to_string()
        } else {
            self.ingredients.join(", ")
        };
        let want = if self.want_keyword.is_empty() {
            "希望: なし".to_string()
        } else {
            format!("希望: {}", self.want_keyword)
        };
        let avoid = if self.avoid_keywords.is_empty() {
            "除外: なし".to_string()
        } else {
            format!("除外: {}", self.avoid_keywords.join(", "))
        };

        let mut message = format!("食材: {}\n人数: {}人\n", ingredients, self.servings);
        if !self.theme.is_empty() {
            message.push_str(&format!("テーマ: {}\n", self.theme));
        }
        if !self.genre.is_empty() {
            message.push_str(&format!("ジャンル: {}\n", self.genre));
        }
        if self.child_mode {
            message.push_str("子ども配慮: はい（辛味抜き・塩分-20%・一口大・やわらかめ・酒は十分加熱）\n");
        }
        if self.cheap_hint {
            message.push_str("価格優先: はい（安価な食材・鶏むね/豆腐/卵/もやし/キャベツ等を優先）\n");
        }
        if !self.hint_protein.is_empty() {
            message.push_str(&format!("主たるたんぱく源の希望: {}\n", self.hint_protein));
        }
        message.push_str(&format!("最大調理時間: {}分\n", self.max_minutes));
        message.push_str(&format!("{}\n{}\n", want, avoid));
        message.push_str(
            "要件:\n\
             - 出力はSTRICTなJSONのみ（マークダウン不可）\n\
             - 除外キーワードを含む料理名は絶対に出さない\n\
             - 量はできるだけ具体（g, 小さじ/大さじ/個・片）に\n",
        );
        message
    }
}

/// Source of recipe candidates
pub trait RecipeProvider {
    fn generate(&self, request: &GenerationRequest) -> Result<RecipeSet, ProviderError>;

    fn name(&self) -> &str;
}

impl<P: RecipeProvider + ?Sized> RecipeProvider for Box<P> {
    fn generate(&self, request: &GenerationRequest) -> Result<RecipeSet, ProviderError> {
        (**self).generate(request)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<P: RecipeProvider + ?Sized> RecipeProvider for &P {
    fn generate(&self, request: &GenerationRequest) -> Result<RecipeSet, ProviderError> {
        (**self).generate(request)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Remove a surrounding markdown code fence, if any
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip the info string ("json") on the opening fence line
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Parse provider output into a validated candidate set
pub fn parse_recipe_set(text: &str) -> Result<RecipeSet, ProviderError> {
    let set: RecipeSet = serde_json::from_str(strip_code_fence(text))?;

    if set.recommendations.is_empty() {
        return Err(ProviderError::Schema("no recommendations".to_string()));
    }
    if set.recommendations.len() > MAX_CANDIDATES {
        return Err(ProviderError::Schema(format!(
            "expected at most {} recommendations, got {}",
            MAX_CANDIDATES,
            set.recommendations.len()
        )));
    }
    for recipe in &set.recommendations {
        if recipe.title.trim().is_empty() {
            return Err(ProviderError::Schema("recipe without a title".to_string()));
        }
        if recipe.servings == 0 {
            return Err(ProviderError::Schema(format!(
                "recipe '{}' has zero servings",
                recipe.title
            )));
        }
    }

    Ok(set)
}

/// The static one-recipe set used when generation is unavailable
pub fn fallback_recipe_set(request: &GenerationRequest) -> RecipeSet {
    let mut ingredients: Vec<Ingredient> = request
        .ingredients
        .iter()
        .take(FALLBACK_INGREDIENT_LIMIT)
        .map(|name| Ingredient::new(name))
        .collect();
    if ingredients.is_empty() {
        ingredients = vec![Ingredient::new("鶏むね肉"), Ingredient::new("キャベツ")];
    }

    let title = match (request.want_keyword.trim(), request.hint_protein.trim()) {
        (want, _) if !want.is_empty() => want.to_string(),
        (_, "") => "かんたん炒め".to_string(),
        (_, protein) => format!("{}の簡単炒め", protein),
    };

    let mut recipe = Recipe::new(&title, request.servings)
        .with_total_time(request.max_minutes.min(20))
        .with_difficulty("かんたん")
        .with_step(Step::new("材料を食べやすい大きさに切る"))
        .with_step(Step::new("フライパンで油を熱し、肉と野菜を炒める"))
        .with_step(Step::new("しょうゆ・みりん・酒で味付けして全体を絡める（中火）"));
    recipe.ingredients = ingredients;

    RecipeSet {
        recommendations: vec![recipe],
    }
}

/// Offline provider returning the static fallback recipe
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackProvider;

impl RecipeProvider for FallbackProvider {
    fn generate(&self, request: &GenerationRequest) -> Result<RecipeSet, ProviderError> {
        Ok(fallback_recipe_set(request))
    }

    fn name(&self) -> &str {
        "fallback"
    }
}

/// Delay before retry `attempt` (0-based): exponential, capped, with up to 25% jitter
pub fn calculate_retry_delay(config: &RecoveryConfig, attempt: u32) -> Duration {
    let exponential = config
        .base_retry_delay_ms
        .saturating_mul(2_u64.saturating_pow(attempt));
    let capped = exponential.min(config.max_retry_delay_ms);
    let jitter_range = capped / 4;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..=jitter_range)
    } else {
        0
    };
    Duration::from_millis(capped.saturating_add(jitter).min(config.max_retry_delay_ms))
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Blocking client for an OpenAI-compatible chat-completions endpoint
pub struct ChatCompletionsProvider {
    client: reqwest::blocking::Client,
    settings: ProviderSettings,
    api_key: String,
    circuit_breaker: CircuitBreaker,
}

impl ChatCompletionsProvider {
    pub fn new(settings: ProviderSettings) -> Result<Self, ProviderError> {
        let api_key = settings
            .api_key
            .clone()
            .ok_or_else(|| ProviderError::Unavailable("OPENAI_API_KEY is not set".to_string()))?;
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.recovery.operation_timeout_secs))
            .build()?;
        let circuit_breaker = CircuitBreaker::new(settings.recovery.clone());

        Ok(Self {
            client,
            settings,
            api_key,
            circuit_breaker,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.settings.api_base.trim_end_matches('/'))
    }

    fn call_once(&self, request: &GenerationRequest) -> Result<RecipeSet, ProviderError> {
        let user_message = request.user_message();
        let body = ChatRequest {
            model: &self.settings.model,
            temperature: self.settings.temperature,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: request.system_prompt(),
                },
                ChatMessage {
                    role: "user",
                    content: &user_message,
                },
            ],
        };

        let response: ChatResponse = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()?
            .error_for_status()?
            .json()?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_else(|| "{}".to_string());
        parse_recipe_set(&content)
    }
}

impl RecipeProvider for ChatCompletionsProvider {
    fn generate(&self, request: &GenerationRequest) -> Result<RecipeSet, ProviderError> {
        let recovery = &self.settings.recovery;
        let mut last_error = None;

        for attempt in 0..=recovery.max_retries {
            if self.circuit_breaker.is_open() {
                warn!(provider = self.name(), "Circuit breaker open, skipping provider call");
                return Err(ProviderError::CircuitOpen);
            }

            match self.call_once(request) {
                Ok(set) => {
                    self.circuit_breaker.record_success();
                    info!(
                        provider = self.name(),
                        attempt,
                        candidates = set.recommendations.len(),
                        "Provider returned candidates"
                    );
                    return Ok(set);
                }
                Err(err) => {
                    self.circuit_breaker.record_failure();
                    warn!(provider = self.name(), attempt, error = %err, "Provider call failed");
                    // Malformed output is not transient; let the caller fall back
                    if matches!(err, ProviderError::Schema(_)) {
                        return Err(err);
                    }
                    last_error = Some(err);
                }
            }

            if attempt < recovery.max_retries {
                let delay = calculate_retry_delay(recovery, attempt);
                debug!(provider = self.name(), delay_ms = delay.as_millis() as u64, "Retrying provider call");
                std::thread::sleep(delay);
            }
        }

        Err(last_error.unwrap_or(ProviderError::CircuitOpen))
    }

    fn name(&self) -> &str {
        "chat_completions"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{"recommendations": [{
        "title": "豚こま炒め",
        "servings": 2,
        "total_time_min": 15,
        "difficulty": "かんたん",
        "ingredients": [{"name": "豚肉", "amount": "200g", "is_optional": false, "substitution": null}],
        "steps": [{"text": "中火で炒める"}],
        "equipment": null
    }]}"#;

    #[test]
    fn test_parse_valid_document() {
        let set = parse_recipe_set(VALID).unwrap();
        assert_eq!(set.recommendations.len(), 1);
        assert_eq!(set.recommendations[0].title, "豚こま炒め");
        assert_eq!(set.recommendations[0].total_time_min, Some(15));
    }

    #[test]
    fn test_parse_tolerates_code_fence() {
        let fenced = format!("```json\n{}\n```", VALID);
        assert!(parse_recipe_set(&fenced).is_ok());
    }

    #[test]
    fn test_parse_rejects_structural_mismatch() {
        assert!(matches!(parse_recipe_set("{}"), Err(ProviderError::Schema(_))));
        assert!(matches!(
            parse_recipe_set(r#"{"recommendations": []}"#),
            Err(ProviderError::Schema(_))
        ));
        assert!(matches!(parse_recipe_set("not json"), Err(ProviderError::Schema(_))));
        let zero = VALID.replace("\"servings\": 2", "\"servings\": 0");
        assert!(matches!(parse_recipe_set(&zero), Err(ProviderError::Schema(_))));
    }

    #[test]
    fn test_user_message_lines() {
        let request = GenerationRequest {
            servings: 3,
            max_minutes: 25,
            cheap_hint: true,
            hint_protein: "豆腐".to_string(),
            avoid_keywords: vec!["カレー".to_string()],
            ..Default::default()
        };
        let message = request.user_message();
        assert!(message.contains("食材: （未指定）"));
        assert!(message.contains("人数: 3人"));
        assert!(message.contains("価格優先: はい"));
        assert!(message.contains("主たるたんぱく源の希望: 豆腐"));
        assert!(message.contains("除外: カレー"));
        assert!(!message.contains("子ども配慮"));
    }

    #[test]
    fn test_fallback_titles() {
        let request = GenerationRequest {
            servings: 2,
            max_minutes: 30,
            hint_protein: "鮭".to_string(),
            ..Default::default()
        };
        let set = FallbackProvider.generate(&request).unwrap();
        let recipe = &set.recommendations[0];
        assert_eq!(recipe.title, "鮭の簡単炒め");
        assert_eq!(recipe.total_time_min, Some(20));
        assert_eq!(recipe.steps.len(), 3);
        assert_eq!(recipe.ingredients[0].name, "鶏むね肉");

        let wanted = GenerationRequest {
            want_keyword: "親子丼".to_string(),
            ..request
        };
        assert_eq!(fallback_recipe_set(&wanted).recommendations[0].title, "親子丼");
    }

    #[test]
    fn test_retry_delay_bounds() {
        let config = RecoveryConfig::default();
        let first = calculate_retry_delay(&config, 0);
        assert!(first >= Duration::from_millis(1000));
        assert!(first <= Duration::from_millis(1250));
        assert_eq!(calculate_retry_delay(&config, 10), Duration::from_millis(10000));
    }

    #[test]
    fn test_chat_provider_requires_key() {
        let settings = ProviderSettings::from_lookup(|_| None, &Default::default());
        assert!(matches!(
            ChatCompletionsProvider::new(settings),
            Err(ProviderError::Unavailable(_))
        ));
    }
}
