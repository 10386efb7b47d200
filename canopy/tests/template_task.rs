//! Integration tests: the bundled YAML task drives a search end to end.

mod init_logging;

use std::path::Path;

use canopy::{
    EvaluateMethod, GenerateMethod, MockLlm, PromptKind, SearchConfig, Searcher, Task,
    TemplateTask,
};

fn sample_task() -> TemplateTask {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tasks/sample.yaml");
    TemplateTask::load(path).unwrap()
}

#[test]
fn bundled_task_loads_with_every_template() {
    let task = sample_task();
    assert_eq!(task.name(), "make24");
    assert_eq!(task.len(), 3);
    assert_eq!(task.steps(), 4);
    assert_eq!(task.stops().len(), 4);
    task.ensure_templates(&[
        PromptKind::Standard,
        PromptKind::Cot,
        PromptKind::Propose,
        PromptKind::Value,
        PromptKind::Vote,
    ])
    .unwrap();
}

#[test]
fn vote_prompt_keeps_literal_braces() {
    let task = sample_task();
    let prompt = task.vote_prompt_wrap(&"1 2 3 4".to_string(), &["a".to_string()]);
    assert!(prompt.contains("The best choice is {s}"));
    assert!(prompt.contains("obtain 24 from 1 2 3 4"));
}

#[tokio::test]
async fn propose_value_search_over_yaml_task() {
    let mut task = sample_task();
    let llm = MockLlm::from_fn(|prompt, n, _stop| {
        if prompt.contains("Possible next steps") {
            vec!["4 + 5 = 9 (left: 6 9 10)\n10 - 6 = 4 (left: 4 4 5)".to_string()]
        } else if prompt.contains("10 - 6") {
            vec!["likely".to_string(); n]
        } else {
            vec!["Reasoning...\nsure".to_string(); n]
        }
    });
    let config = SearchConfig {
        method_generate: GenerateMethod::Propose,
        method_evaluate: EvaluateMethod::Value,
        n_evaluate_sample: 3,
        n_select_sample: 1,
        ..SearchConfig::default()
    };
    let mut searcher = Searcher::from_config(&config).unwrap();

    let out = searcher.solve(&mut task, &llm, 0).await.unwrap();

    let first = &out.trace.steps()[0];
    assert_eq!(
        first.new_ys,
        vec!["4 + 5 = 9 (left: 6 9 10)\n", "10 - 6 = 4 (left: 4 4 5)\n"]
    );
    assert_eq!(first.values, vec![60.0, 3.0]);
    assert_eq!(first.select_new_ys, vec!["4 + 5 = 9 (left: 6 9 10)\n"]);
    assert_eq!(out.trace.len(), 4);
}
