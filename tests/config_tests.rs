use std::io::Write;

use kondate::config::{ExhaustionPolicy, PlannerConfig};
use kondate::cost::PriceRegion;
use kondate::nutrition::NutritionProfile;
use tempfile::NamedTempFile;

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_json_config_with_defaults() {
        let file = write_config(
            r#"{
                "servings": 3,
                "budget_yen": 5000,
                "num_days": 5,
                "profile": "ダイエット",
                "region": "cheap",
                "avoid_keywords": ["揚げ物"],
                "features": { "exhaustion_policy": "fail" }
            }"#,
        );

        let config = PlannerConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.servings, 3);
        assert_eq!(config.budget_yen, 5000);
        assert_eq!(config.num_days, 5);
        assert_eq!(config.profile, NutritionProfile::Diet);
        assert_eq!(config.region, PriceRegion::Cheap);
        assert_eq!(config.avoid_keywords, vec!["揚げ物"]);
        assert_eq!(config.features.exhaustion_policy, ExhaustionPolicy::Fail);

        // Unspecified fields keep their defaults
        assert_eq!(config.max_minutes, 30);
        assert_eq!(config.features.max_quality_retry, 2);
        assert_eq!(config.features.week_replan_attempts, 2);
        assert!(config.features.trust_augmentation);
    }

    #[test]
    fn test_invalid_json_config_rejected() {
        let file = write_config(r#"{ "servings": 12 }"#);
        let err = PlannerConfig::from_json_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("servings"));

        let broken = write_config("{ not json");
        let err = PlannerConfig::from_json_file(broken.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_missing_config_file() {
        let err = PlannerConfig::from_json_file("/nonexistent/kondate.json").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
