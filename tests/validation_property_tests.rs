//! Property tests for input validation and generated test case handling

mod fixtures;

use fixtures::{story, ScriptedGateway};
use proptest::prelude::*;
use std::sync::Arc;
use story_testgen::{
    ControllerSettings, Dispatch, Stage, TestCase, WorkflowController, WorkflowError,
    WorkflowState,
};

fn test_case_strategy() -> impl Strategy<Value = TestCase> {
    ("TC-[0-9]{1,4}", "[A-Za-z ]{1,40}").prop_map(|(id, description)| TestCase::new(id, description))
}

proptest! {
    #[test]
    fn blank_story_ids_are_rejected_without_side_effects(raw_id in "[ \t\n\r]{0,12}") {
        let gateway = Arc::new(ScriptedGateway::new());
        let controller = WorkflowController::new(gateway.clone(), ControllerSettings::default());

        let result = tokio_test::block_on(controller.submit_story_id(&raw_id));

        prop_assert!(matches!(result, Err(WorkflowError::Validation { .. })), "expected Validation error");
        prop_assert_eq!(controller.snapshot(), WorkflowState::new());
        prop_assert!(gateway.calls().is_empty());
    }

    #[test]
    fn generated_test_cases_are_kept_in_order(
        cases in prop::collection::vec(test_case_strategy(), 1..12),
        padding in " {0,3}",
    ) {
        let gateway = Arc::new(ScriptedGateway::new());
        let controller = WorkflowController::new(gateway.clone(), ControllerSettings::default());
        gateway.script_fetch("PROJ-7").send(Ok(story("PROJ-7"))).unwrap();
        gateway.script_generate("PROJ-7").send(Ok(cases.clone())).unwrap();

        let submitted = format!("{padding}PROJ-7{padding}");
        let dispatch = tokio_test::block_on(controller.submit_story_id(&submitted)).unwrap();
        prop_assert_eq!(dispatch, Dispatch::Completed);

        let state = controller.snapshot();
        prop_assert_eq!(state.stage, Stage::TestsGenerated);
        prop_assert_eq!(state.test_cases, cases);
        prop_assert_eq!(gateway.calls(), vec!["fetch:PROJ-7".to_string(), "generate:PROJ-7".to_string()]);
    }

    #[test]
    fn edits_without_ids_are_refused(
        mut cases in prop::collection::vec(test_case_strategy(), 1..6),
        blank in "[ ]{0,3}",
        index in any::<prop::sample::Index>(),
    ) {
        let gateway = Arc::new(ScriptedGateway::new());
        let controller = WorkflowController::new(gateway.clone(), ControllerSettings::default());
        let position = index.index(cases.len());
        cases[position].id = blank;

        let result = controller.apply_edits(cases);
        prop_assert!(matches!(result, Err(WorkflowError::Validation { .. })), "expected Validation error");
        prop_assert_eq!(controller.snapshot(), WorkflowState::new());
    }
}
