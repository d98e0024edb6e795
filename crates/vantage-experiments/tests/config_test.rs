//! Integration test: service wiring from layered config.

use vantage_core::models::{ConfidenceLevel, NewExperiment, UrlTarget};
use vantage_experiments::ExperimentService;

#[test]
fn open_uses_project_config() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("experiments.db");
    std::fs::write(
        dir.path().join("vantage.toml"),
        format!(
            "[evaluator]\ndefault_confidence_level = 99\nmin_visits_per_variant = 25\n\n[storage]\ndb_path = {:?}\n",
            db.display().to_string()
        ),
    )
    .unwrap();

    let svc = ExperimentService::open(dir.path()).unwrap();
    assert_eq!(svc.evaluator().min_visits_per_variant(), 25);

    let exp = svc
        .create_experiment(NewExperiment::new("Configured", UrlTarget::exact("/")))
        .unwrap();
    assert_eq!(exp.confidence_level, ConfidenceLevel::NinetyNine);
    assert!(db.exists());
}
