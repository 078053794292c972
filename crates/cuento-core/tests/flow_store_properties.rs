use cuento_core::{FlowState, FlowStore, IgnoredReason, InMemoryWizardStateRepository, Stage, StageStatus, Transition,
                  WizardStateRepository};

fn store() -> FlowStore<InMemoryWizardStateRepository> {
    FlowStore::new(InMemoryWizardStateRepository::new())
}

#[test]
fn below_threshold_never_unlocks_cuento() {
    for count in 0..3 {
        let mut s = store();
        s.set_personajes(count);
        let estado = s.estado().personajes.estado;
        assert!(matches!(estado, StageStatus::NotStarted | StageStatus::Draft), "count={count}");
        assert_eq!(s.estado().cuento, StageStatus::NotStarted, "count={count}");
    }
}

#[test]
fn at_or_above_threshold_completes_and_unlocks() {
    for count in [3, 4, 10, u32::MAX] {
        let mut s = store();
        s.set_personajes(count);
        assert_eq!(s.estado().personajes.estado, StageStatus::Completed);
        assert_eq!(s.estado().personajes.assigned_count, count);
        assert_eq!(s.estado().cuento, StageStatus::Draft);
    }
}

#[test]
fn avanzar_cuento_requires_personajes_completed() {
    let mut s = store();
    s.set_personajes(2);
    let before = s.estado().clone();
    let t = s.avanzar_etapa(Stage::Cuento);
    assert_eq!(t,
               Transition::Ignored(IgnoredReason::PrerequisiteIncomplete { stage: Stage::Cuento,
                                                                            requires: Stage::Personajes }));
    assert_eq!(s.estado(), &before);
}

#[test]
fn avanzar_cuento_twice_is_idempotent() {
    let mut s = store();
    s.set_personajes(3);
    s.avanzar_etapa(Stage::Cuento);
    let once = s.estado().clone();
    s.avanzar_etapa(Stage::Cuento);
    assert_eq!(s.estado(), &once);
}

#[test]
fn reset_returns_to_initial_record() {
    let mut s = store();
    s.set_story_id("story-1");
    s.set_personajes(5);
    s.avanzar_etapa(Stage::Cuento);
    s.avanzar_etapa(Stage::Diseno);
    s.reset_estado();
    assert_eq!(s.estado(), &FlowState::initial());
    assert_eq!(s.current_story_id(), None);
}

#[test]
fn three_step_scenario() {
    let mut s = store();
    s.set_personajes(3);
    s.avanzar_etapa(Stage::Cuento);
    s.avanzar_etapa(Stage::Diseno);
    let e = s.estado();
    assert_eq!(e.personajes.estado, StageStatus::Completed);
    assert_eq!(e.cuento, StageStatus::Completed);
    assert_eq!(e.diseno, StageStatus::Completed);
    assert_eq!(e.vista_previa, StageStatus::Draft);
    assert_eq!(e.dedicatoria_choice, StageStatus::NotStarted);
    assert_eq!(e.dedicatoria, StageStatus::NotStarted);
}

#[test]
fn lowering_count_does_not_regress_advanced_stages() {
    let mut s = store();
    s.set_personajes(3);
    s.avanzar_etapa(Stage::Cuento);
    s.avanzar_etapa(Stage::Diseno);
    s.set_personajes(1);
    assert_eq!(s.estado().personajes.estado, StageStatus::Draft);
    assert_eq!(s.estado().cuento, StageStatus::Completed);
    assert_eq!(s.estado().diseno, StageStatus::Completed);
}

#[test]
fn full_walk_to_dedicatoria() {
    let mut s = store();
    s.set_personajes(3);
    for stage in &Stage::ALL[1..] {
        assert!(s.avanzar_etapa(*stage).is_applied(), "{stage}");
    }
    assert_eq!(s.estado().completed_count(), 6);
    assert_eq!(s.estado().current_stage(), None);
}

#[test]
fn writes_only_when_story_id_is_set() {
    let mut s = store();
    s.set_personajes(3);
    assert!(s.repository().rows.is_empty());
    assert_eq!(s.pending_writes(), 0);

    s.set_story_id("story-1");
    s.set_personajes(3);
    s.avanzar_etapa(Stage::Cuento);
    let stored = s.repository().load_wizard_state("story-1").expect("load").expect("row");
    assert_eq!(&stored, s.estado());
}

#[test]
fn ignored_transition_does_not_write() {
    let mut s = store();
    s.set_story_id("story-1");
    s.avanzar_etapa(Stage::Diseno);
    assert!(s.repository().row("story-1").is_none());
}

#[test]
fn set_estado_completo_does_not_write_or_validate() {
    let mut s = store();
    s.set_story_id("story-1");
    let mut weird = FlowState::initial();
    weird.dedicatoria = StageStatus::Completed;
    s.set_estado_completo(weird.clone());
    assert_eq!(s.estado(), &weird);
    assert!(s.repository().row("story-1").is_none());
}

#[test]
fn begin_and_abandon_lifecycle() {
    let mut s = store();
    s.begin_story("a");
    assert_eq!(s.current_story_id(), Some("a"));
    assert!(s.abandon_if_unstarted());
    assert_eq!(s.current_story_id(), None);

    s.begin_story("b");
    s.set_personajes(1);
    assert!(!s.abandon_if_unstarted());
    assert_eq!(s.current_story_id(), Some("b"));

    s.begin_story("c");
    assert_eq!(s.estado(), &FlowState::initial());
    assert_eq!(s.current_story_id(), Some("c"));
}
