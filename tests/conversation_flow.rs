//! End-to-end conversations through the intake machine with a real
//! percentile table file.

use std::path::Path;
use std::sync::Arc;

use bmi_assist::chart::InMemoryChartStore;
use bmi_assist::intake::{ConversationState, FixedChooser, IntakeMachine, IntakeStage, Sex};
use bmi_assist::percentile::{Category, JsonFileTableProvider, PercentileTable, classify_in};

/// Ages 1-18 for both sexes; the age-6 girl row drives the reference scenario.
fn table_json() -> String {
    let mut json = serde_json::Map::new();
    for sex in ["niño", "niña"] {
        let mut by_age = serde_json::Map::new();
        for age in 1..=18u32 {
            let base = 13.0 + f64::from(age) * 0.3;
            by_age.insert(
                age.to_string(),
                serde_json::json!({"p5": base, "p85": base + 3.0, "p95": base + 5.0}),
            );
        }
        json.insert(sex.to_string(), serde_json::Value::Object(by_age));
    }
    serde_json::Value::Object(json).to_string()
}

fn machine_for(path: &Path, charts: Arc<InMemoryChartStore>) -> IntakeMachine {
    IntakeMachine::new(Arc::new(JsonFileTableProvider::new(path)), charts)
        .with_chooser(Arc::new(FixedChooser(1)))
}

#[tokio::test]
async fn ana_reference_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tablas_percentiles.json");
    std::fs::write(&path, table_json()).unwrap();
    let charts = Arc::new(InMemoryChartStore::new(16));
    let machine = machine_for(&path, Arc::clone(&charts));

    for sex_answer in ["niña", "nina", "femenino"] {
        let mut state = ConversationState::default();
        for input in ["Ana", "6", sex_answer, "18.0"] {
            let reply = machine.process(&mut state, input).await;
            assert!(!reply.show_chart);
        }
        assert_eq!(state.sex(), Some(Sex::Female));

        let reply = machine.process(&mut state, "1.10").await;

        let table: PercentileTable = serde_json::from_str(&table_json()).unwrap();
        let bmi = 18.0 / (1.10f64 * 1.10);
        let expected = classify_in(bmi, 6, Sex::Female, &table).unwrap();
        assert_eq!(expected, Category::NormalWeight);

        assert!(reply.text.contains("14.88"));
        assert!(reply.text.contains(&expected.label().to_uppercase()));
        assert!(reply.text.contains("Ana"));
        assert!(reply.show_chart);
        let chart_id = reply.chart_id.clone().unwrap();
        assert!(!chart_id.is_empty());
        assert_eq!(state.graph_reference(), Some(chart_id.as_str()));
        assert_eq!(state.stage(), IntakeStage::Complete);

        let chart = charts.get(&chart_id).await.unwrap();
        assert_eq!(chart.point.age, 6);
        assert_eq!(chart.sex, Sex::Female);
    }
}

#[tokio::test]
async fn missing_table_then_fixed_file_allows_retry() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tablas_percentiles.json");
    let machine = machine_for(&path, Arc::new(InMemoryChartStore::new(4)));

    let mut state = ConversationState::default();
    for input in ["Ana", "6", "niña", "18"] {
        machine.process(&mut state, input).await;
    }

    let reply = machine.process(&mut state, "1.10").await;
    assert!(reply.text.contains("No se encontró el archivo"));
    assert_eq!(state.stage(), IntakeStage::Height);

    std::fs::write(&path, "[1, 2").unwrap();
    let reply = machine.process(&mut state, "1.10").await;
    assert!(reply.text.contains("formato JSON inválido"));
    assert_eq!(state.stage(), IntakeStage::Height);

    std::fs::write(&path, table_json()).unwrap();
    let reply = machine.process(&mut state, "1.10").await;
    assert!(reply.show_chart);
    assert_eq!(state.stage(), IntakeStage::Complete);
}

#[tokio::test]
async fn three_bad_ages_then_valid() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tablas.json");
    std::fs::write(&path, table_json()).unwrap();
    let machine = machine_for(&path, Arc::new(InMemoryChartStore::new(4)));

    let mut state = ConversationState::default();
    machine.process(&mut state, "Ana").await;

    let replies = [
        machine.process(&mut state, "x").await,
        machine.process(&mut state, "y").await,
        machine.process(&mut state, "z").await,
    ];
    assert!(!replies[0].text.contains("para empezar de nuevo"));
    assert!(!replies[1].text.contains("para empezar de nuevo"));
    assert!(replies[2].text.contains("reiniciar"));
    assert!(replies[2].text.contains("para empezar de nuevo"));

    machine.process(&mut state, "9").await;
    assert_eq!(state.age(), Some(9));
    assert_eq!(state.failed_attempts(), 0);
}

#[tokio::test]
async fn restart_mid_conversation_and_go_again() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tablas.json");
    std::fs::write(&path, table_json()).unwrap();
    let machine = machine_for(&path, Arc::new(InMemoryChartStore::new(4)));

    let mut state = ConversationState::default();
    for input in ["Ana", "6", "niña"] {
        machine.process(&mut state, input).await;
    }
    let reply = machine.process(&mut state, "Reiniciar").await;
    assert_eq!(state, ConversationState::default());
    assert!(reply.text.contains("¿Cómo te llamas?"));

    for input in ["Luis", "12", "niño", "40,5 kg"] {
        machine.process(&mut state, input).await;
    }
    let reply = machine.process(&mut state, "152 cm").await;
    assert!(reply.text.starts_with("ℹ️ Interpreté 152 como centímetros: 1.52 m."));
    assert!(reply.text.contains("Estatura: 152 cm"));
    assert_eq!(state.weight_kg(), Some(40.5));
    assert!(reply.show_chart);

    // A finished conversation only moves on after a restart
    let reply = machine.process(&mut state, "otra vez").await;
    assert!(reply.text.contains("Aún estoy esperando"));
    let reply = machine.process(&mut state, "nuevo").await;
    assert!(reply.text.contains("Comenzamos de nuevo"));
    assert_eq!(state.stage(), IntakeStage::Name);
}
