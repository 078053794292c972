//! Pruebas contra Postgres (requiere DATABASE_URL válido en entorno).

use cuento_core::{FlowStore, Stage, StageStatus, WizardStateRepository};
use cuento_persistence::{build_dev_pool_from_env, PgWizardStateRepository, PoolProvider};

fn unique_story_id() -> String {
    format!("test-{}", chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default())
}

#[test]
fn upsert_then_load() {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL no definido: omitiendo test");
        return;
    }
    let pool = build_dev_pool_from_env().expect("pool");
    let mut store = FlowStore::new(PgWizardStateRepository::new(PoolProvider { pool }));
    let story_id = unique_story_id();
    store.set_story_id(story_id.clone());
    store.set_personajes(3);
    store.avanzar_etapa(Stage::Cuento);
    assert_eq!(store.pending_writes(), 0);

    let loaded = store.repository().load_wizard_state(&story_id).expect("load").expect("row");
    assert_eq!(&loaded, store.estado());
    assert_eq!(loaded.diseno, StageStatus::Draft);
}

#[test]
fn missing_story_loads_none() {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL no definido: omitiendo test");
        return;
    }
    let pool = build_dev_pool_from_env().expect("pool");
    let repo = PgWizardStateRepository::new(PoolProvider { pool });
    assert!(repo.load_wizard_state(&unique_story_id()).expect("load").is_none());
}
