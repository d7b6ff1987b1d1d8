//! # Meal Planner
//!
//! Orchestrates recipe acquisition, normalization, trust augmentation and
//! costing for single-day suggestions and multi-day plans, and re-optimizes
//! a week that exceeds its budget.
//!
//! ## Acquisition
//!
//! One acquisition is a bounded state machine:
//!
//! 1. Request candidates; a provider failure switches to the static fallback.
//! 2. Drop candidates whose title contains an avoided keyword. An empty result
//!    is regenerated once, then replaced by a minimal fallback recipe.
//! 3. Run the quality gate. Failing sets are regenerated up to
//!    `max_quality_retry` times.
//! 4. On exhaustion, the configured policy either keeps the first raw
//!    candidate with a disclaimer or reports a quality-bar failure.
//!
//! ## Weekly re-optimization
//!
//! When the week exceeds its budget, the two most expensive days are
//! regenerated with a cheap hint; a regenerated day replaces the original
//! only when strictly cheaper. Attempts stop when the budget is met, when an
//! attempt improves nothing, or after `week_replan_attempts`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{ExhaustionPolicy, PlannerConfig};
use crate::cost::CostEstimator;
use crate::errors::PlannerError;
use crate::messages::{t, t_args};
use crate::normalizer::{adjust_for_child, normalize_recipe};
use crate::nutrition::{estimate_nutrition, score_against_profile, NutritionFacts, NutritionProfile, ProfileScore};
use crate::provider::{fallback_recipe_set, GenerationRequest, RecipeProvider};
use crate::quality::{quality_check, QualityReport};
use crate::recipe_model::{Ingredient, Recipe, Step};
use crate::trust::{augment, TrustReport};

/// Protein hints for a regular week
pub const DEFAULT_ROTATION: [&str; 7] = ["鶏むね肉", "豚肉", "豆腐", "鮭", "鶏もも肉", "卵", "さば"];

/// Protein hints biased toward low-cost ingredients
pub const CHEAP_ROTATION: [&str; 7] = ["鶏むね肉", "豆腐", "卵", "豚肉", "もやし入り", "鶏むね肉", "豆腐"];

/// Most expensive days regenerated per re-optimization attempt
pub const REPLAN_TOP_DAYS: usize = 2;

const MINIMAL_FALLBACK_PROTEIN: &str = "鶏むね肉";

/// Terminal state of a planned day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayState {
    /// Kept from the first pass
    Accepted,
    /// Swapped for a strictly cheaper regeneration
    Replaced,
    /// Could not be made cheaper while the week stayed over budget
    Irreducible,
}

/// How an acquisition ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcquisitionOutcome {
    /// At least one candidate passed the quality gate
    Passed,
    /// The quality filter is disabled
    Unfiltered,
    /// Retries exhausted; the first raw candidate was kept
    BestEffort,
}

/// Candidates of one acquisition, best first
#[derive(Debug, Clone, PartialEq)]
pub struct Acquisition {
    pub candidates: Vec<Recipe>,
    pub outcome: AcquisitionOutcome,
    /// Generation requests issued, including regenerations
    pub requests: u32,
    pub used_fallback: bool,
    pub notes: Vec<String>,
}

/// One day of a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub day_index: u32,
    pub recipe: Recipe,
    pub cost_yen: i64,
    pub state: DayState,
    pub trust: Option<TrustReport>,
    pub notes: Vec<String>,
}

impl DayPlan {
    /// The same day with a new terminal state
    pub fn with_state(self, state: DayState) -> Self {
        Self { state, ..self }
    }

    pub fn nutrition(&self) -> NutritionFacts {
        estimate_nutrition(&self.recipe)
    }
}

/// Per-day averages scored against the selected profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyNutrition {
    pub profile: NutritionProfile,
    pub average: NutritionFacts,
    pub score: ProfileScore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyPlan {
    /// Sorted by day index
    pub days: Vec<DayPlan>,
    pub total_cost: i64,
    pub budget_yen: i64,
    /// Achieved total when the budget could not be met
    pub feasible_budget: Option<i64>,
    /// Re-optimization attempts actually run
    pub attempts_used: u32,
    pub nutrition: WeeklyNutrition,
    pub generated_at: DateTime<Utc>,
    pub notes: Vec<String>,
}

impl WeeklyPlan {
    pub fn within_budget(&self) -> bool {
        self.total_cost <= self.budget_yen
    }
}

/// A prepared single-day candidate with its estimates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedRecipe {
    pub recipe: Recipe,
    pub cost_yen: i64,
    pub nutrition: NutritionFacts,
    pub score: ProfileScore,
    pub quality: QualityReport,
    pub trust: Option<TrustReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySuggestion {
    pub candidates: Vec<SuggestedRecipe>,
    pub outcome: AcquisitionOutcome,
    pub notes: Vec<String>,
}

/// Average of per-day per-serving nutrition, scored against `profile`
pub fn weekly_nutrition_summary(days: &[DayPlan], profile: NutritionProfile) -> WeeklyNutrition {
    let mut total = NutritionFacts::default();
    for day in days {
        total.add_scaled(&day.nutrition(), 1.0);
    }
    let average = total.divided(days.len().max(1) as f64).rounded();
    WeeklyNutrition {
        profile,
        average,
        score: score_against_profile(&average, profile),
    }
}

/// Drop candidates whose title contains any avoided keyword
pub fn exclude_avoided(candidates: Vec<Recipe>, avoid_keywords: &[String]) -> Vec<Recipe> {
    candidates
        .into_iter()
        .filter(|r| {
            !avoid_keywords
                .iter()
                .any(|k| !k.is_empty() && r.title.contains(k.as_str()))
        })
        .collect()
}

/// Stable reorder putting titles with the desired keyword first
pub fn order_by_keyword(mut candidates: Vec<Recipe>, want_keyword: &str) -> Vec<Recipe> {
    if !want_keyword.is_empty() {
        candidates.sort_by_key(|r| !r.title.contains(want_keyword));
    }
    candidates
}

/// Last-resort recipe when every candidate was excluded
pub fn minimal_fallback_recipe(request: &GenerationRequest) -> Recipe {
    let protein = if request.hint_protein.trim().is_empty() {
        MINIMAL_FALLBACK_PROTEIN
    } else {
        request.hint_protein.trim()
    };
    Recipe::new(&format!("{}の炒めもの", protein), request.servings)
        .with_total_time(request.max_minutes.min(20))
        .with_difficulty("かんたん")
        .with_ingredient(Ingredient::new(protein))
        .with_ingredient(Ingredient::new("キャベツ"))
        .with_step(Step::new("材料を切って炒め、調味する（中火）"))
}

fn push_note(notes: &mut Vec<String>, note: String) {
    if !notes.contains(&note) {
        notes.push(note);
    }
}

/// Planning pipeline over a recipe provider
pub struct Planner<P: RecipeProvider> {
    provider: P,
    config: PlannerConfig,
}

impl<P: RecipeProvider> Planner<P> {
    pub fn new(provider: P, config: PlannerConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    fn generate_or_fallback(&self, request: &GenerationRequest, acquisition: &mut Acquisition) -> Vec<Recipe> {
        acquisition.requests += 1;
        match self.provider.generate(request) {
            Ok(set) => set.recommendations,
            Err(err) => {
                warn!(provider = self.provider.name(), error = %err, "Generation failed, using fallback recipe");
                acquisition.used_fallback = true;
                push_note(&mut acquisition.notes, t("planner-fallback"));
                fallback_recipe_set(request).recommendations
            }
        }
    }

    /// Candidates after keyword exclusion; never empty
    fn fetch_candidates(&self, request: &GenerationRequest, acquisition: &mut Acquisition) -> Vec<Recipe> {
        // One regeneration when exclusion empties the set
        for round in 0..2 {
            let raw = self.generate_or_fallback(request, acquisition);
            let kept = exclude_avoided(raw, &request.avoid_keywords);
            if !kept.is_empty() {
                return order_by_keyword(kept, &request.want_keyword);
            }
            warn!(round, avoid = ?request.avoid_keywords, "Every candidate was excluded");
        }
        acquisition.used_fallback = true;
        vec![minimal_fallback_recipe(request)]
    }

    /// Acquire quality-checked candidates for one request
    pub fn acquire(&self, request: &GenerationRequest, day_index: Option<u32>) -> Result<Acquisition, PlannerError> {
        let features = &self.config.features;
        let mut acquisition = Acquisition {
            candidates: Vec::new(),
            outcome: AcquisitionOutcome::Passed,
            requests: 0,
            used_fallback: false,
            notes: Vec::new(),
        };

        let mut first_raw: Option<Vec<Recipe>> = None;
        let mut last_reasons = Vec::new();

        for attempt in 0..=features.max_quality_retry {
            let candidates = self.fetch_candidates(request, &mut acquisition);

            if !features.enable_quality_filter {
                acquisition.candidates = candidates;
                acquisition.outcome = AcquisitionOutcome::Unfiltered;
                return Ok(acquisition);
            }

            let (passed, failed): (Vec<Recipe>, Vec<Recipe>) =
                candidates.iter().cloned().partition(|r| quality_check(r).passed());
            if !passed.is_empty() {
                debug!(attempt, passed = passed.len(), failed = failed.len(), "Quality gate passed");
                acquisition.candidates = passed;
                acquisition.outcome = AcquisitionOutcome::Passed;
                return Ok(acquisition);
            }

            last_reasons = candidates
                .first()
                .map(|r| quality_check(r).reasons())
                .unwrap_or_default();
            info!(attempt, day = ?day_index, reasons = ?last_reasons, "No candidate passed the quality gate");
            if first_raw.is_none() {
                first_raw = Some(candidates);
            }
        }

        let policy = if features.keep_at_least_one {
            features.exhaustion_policy
        } else {
            ExhaustionPolicy::Fail
        };
        match (policy, first_raw) {
            (ExhaustionPolicy::BestEffort, Some(raw)) => {
                push_note(&mut acquisition.notes, t("planner-disclaimer"));
                acquisition.candidates = raw.into_iter().take(1).collect();
                acquisition.outcome = AcquisitionOutcome::BestEffort;
                Ok(acquisition)
            }
            _ => Err(PlannerError::QualityBarNotMet {
                day_index,
                reasons: last_reasons,
            }),
        }
    }

    /// Normalize, adapt for children and augment a chosen recipe
    fn prepare(&self, recipe: &mut Recipe) -> Option<TrustReport> {
        recipe.servings = self.config.servings.max(1);
        normalize_recipe(recipe);
        if self.config.child_mode {
            adjust_for_child(recipe, self.config.child_factor);
        }
        if self.config.features.trust_augmentation {
            Some(augment(recipe))
        } else {
            None
        }
    }

    fn cost_estimator(&self) -> CostEstimator {
        CostEstimator::new(self.config.region)
    }

    /// Build one day from a protein hint
    pub fn make_day(&self, day_index: u32, hint_protein: &str, cheap_hint: bool) -> Result<DayPlan, PlannerError> {
        let request = GenerationRequest::for_day(&self.config, hint_protein, cheap_hint);
        let acquisition = self.acquire(&request, Some(day_index))?;

        let mut recipe = acquisition
            .candidates
            .into_iter()
            .next()
            .unwrap_or_else(|| minimal_fallback_recipe(&request));
        let trust = self.prepare(&mut recipe);
        let cost_yen = self.cost_estimator().estimate(&recipe);

        info!(
            day = day_index,
            protein = hint_protein,
            cheap_hint,
            title = %recipe.title,
            cost_yen,
            "Planned day"
        );

        Ok(DayPlan {
            day_index,
            recipe,
            cost_yen,
            state: DayState::Accepted,
            trust,
            notes: acquisition.notes,
        })
    }

    /// Plan `num_days` days within the budget when possible
    pub fn plan_week(&self) -> Result<WeeklyPlan, PlannerError> {
        self.config.validate()?;
        let config = &self.config;
        let rotation: &[&str] = if config.prefer_cheap {
            &CHEAP_ROTATION
        } else {
            &DEFAULT_ROTATION
        };

        let mut days = (1..=config.num_days)
            .map(|day| self.make_day(day, rotation[(day as usize - 1) % rotation.len()], false))
            .collect::<Result<Vec<_>, _>>()?;
        let mut total_cost: i64 = days.iter().map(|d| d.cost_yen).sum();
        info!(total_cost, budget = config.budget_yen, days = days.len(), "First pass complete");

        let mut attempts_used = 0;
        while total_cost > config.budget_yen && attempts_used < config.features.week_replan_attempts {
            attempts_used += 1;
            days.sort_by(|a, b| b.cost_yen.cmp(&a.cost_yen));

            let mut changed = false;
            for slot in 0..REPLAN_TOP_DAYS.min(days.len()) {
                let day_index = days[slot].day_index;
                let protein = CHEAP_ROTATION[(day_index as usize - 1) % CHEAP_ROTATION.len()];
                let candidate = match self.make_day(day_index, protein, true) {
                    Ok(candidate) => candidate,
                    Err(err) => {
                        warn!(day = day_index, error = %err, "Cheap regeneration failed");
                        continue;
                    }
                };
                if candidate.cost_yen < days[slot].cost_yen {
                    info!(
                        day = day_index,
                        old_cost = days[slot].cost_yen,
                        new_cost = candidate.cost_yen,
                        "Replaced day with cheaper recipe"
                    );
                    days[slot] = candidate.with_state(DayState::Replaced);
                    changed = true;
                }
            }

            total_cost = days.iter().map(|d| d.cost_yen).sum();
            debug!(attempt = attempts_used, total_cost, changed, "Re-optimization attempt finished");
            if !changed {
                break;
            }
        }

        let mut notes = Vec::new();
        let feasible_budget = if total_cost > config.budget_yen {
            days = days
                .into_iter()
                .map(|d| match d.state {
                    DayState::Replaced => d,
                    _ => d.with_state(DayState::Irreducible),
                })
                .collect();
            notes.push(t_args(
                "planner-over-budget",
                &[
                    ("budget", config.budget_yen.to_string().as_str()),
                    ("total", total_cost.to_string().as_str()),
                ],
            ));
            warn!(total_cost, budget = config.budget_yen, "Budget could not be met");
            Some(total_cost)
        } else {
            None
        };

        days.sort_by_key(|d| d.day_index);
        let nutrition = weekly_nutrition_summary(&days, config.profile);

        Ok(WeeklyPlan {
            days,
            total_cost,
            budget_yen: config.budget_yen,
            feasible_budget,
            attempts_used,
            nutrition,
            generated_at: Utc::now(),
            notes,
        })
    }

    /// Suggest one day's candidates from the configured fridge ingredients
    pub fn suggest_day(&self) -> Result<DaySuggestion, PlannerError> {
        self.config.validate()?;
        let request = GenerationRequest::from_config(&self.config);
        let acquisition = self.acquire(&request, None)?;
        let estimator = self.cost_estimator();

        let candidates = acquisition
            .candidates
            .into_iter()
            .map(|mut recipe| {
                let trust = self.prepare(&mut recipe);
                let nutrition = estimate_nutrition(&recipe);
                SuggestedRecipe {
                    cost_yen: estimator.estimate(&recipe),
                    score: score_against_profile(&nutrition, self.config.profile),
                    quality: quality_check(&recipe),
                    nutrition,
                    trust,
                    recipe,
                }
            })
            .collect::<Vec<_>>();

        info!(candidates = candidates.len(), outcome = ?acquisition.outcome, "Suggested recipes");
        Ok(DaySuggestion {
            candidates,
            outcome: acquisition.outcome,
            notes: acquisition.notes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ProviderError;
    use crate::recipe_model::RecipeSet;

    struct FailingProvider;

    impl RecipeProvider for FailingProvider {
        fn generate(&self, _request: &GenerationRequest) -> Result<RecipeSet, ProviderError> {
            Err(ProviderError::Timeout("scripted".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[test]
    fn test_exclusion_and_ordering() {
        let candidates = vec![
            Recipe::new("チキンカレー", 2),
            Recipe::new("鶏の照り焼き", 2),
            Recipe::new("親子丼", 2),
        ];
        let kept = exclude_avoided(candidates, &["カレー".to_string()]);
        let titles: Vec<_> = kept.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["鶏の照り焼き", "親子丼"]);

        let ordered = order_by_keyword(kept, "親子");
        assert_eq!(ordered[0].title, "親子丼");
    }

    #[test]
    fn test_minimal_fallback_recipe() {
        let request = GenerationRequest {
            servings: 2,
            max_minutes: 15,
            hint_protein: "豆腐".to_string(),
            ..Default::default()
        };
        let recipe = minimal_fallback_recipe(&request);
        assert_eq!(recipe.title, "豆腐の炒めもの");
        assert_eq!(recipe.total_time_min, Some(15));
        assert_eq!(recipe.steps.len(), 1);
    }

    #[test]
    fn test_provider_failure_falls_back() {
        let planner = Planner::new(FailingProvider, PlannerConfig::default());
        let request = GenerationRequest::for_day(planner.config(), "鮭", false);
        let acquisition = planner.acquire(&request, Some(1)).unwrap();

        // The static fallback has two ingredients, so the gate never passes
        assert!(acquisition.used_fallback);
        assert_eq!(acquisition.outcome, AcquisitionOutcome::BestEffort);
        assert_eq!(acquisition.candidates.len(), 1);
        assert_eq!(acquisition.candidates[0].title, "鮭の簡単炒め");
        assert_eq!(acquisition.requests, 3);
        assert!(acquisition.notes.contains(&t("planner-fallback")));
        assert!(acquisition.notes.contains(&t("planner-disclaimer")));
    }

    #[test]
    fn test_fail_policy_reports_reasons() {
        let mut config = PlannerConfig::default();
        config.features.exhaustion_policy = ExhaustionPolicy::Fail;
        config.features.max_quality_retry = 0;
        let planner = Planner::new(FailingProvider, config);

        match planner.make_day(2, "豚肉", false) {
            Err(PlannerError::QualityBarNotMet { day_index, reasons }) => {
                assert_eq!(day_index, Some(2));
                assert!(!reasons.is_empty());
            }
            other => panic!("expected quality failure, got {:?}", other),
        }
    }

    #[test]
    fn test_day_state_transition_keeps_day() {
        let planner = Planner::new(FailingProvider, PlannerConfig::default());
        let day = planner.make_day(3, "卵", false).unwrap();
        let replaced = day.clone().with_state(DayState::Replaced);
        assert_eq!(replaced.day_index, 3);
        assert_eq!(replaced.recipe, day.recipe);
        assert_eq!(replaced.state, DayState::Replaced);
    }
}
