//! Runs a configured [`DialogScript`] through the dialog façade.

use {
    parley_config::{DialogScript, ScriptStep, StepKind},
    parley_dialog::{
        ChoiceQuestion, ConfigOverrides, Dialog, FileQuestion, NumberQuestion, PromptQuestion,
        Result, TextQuestion, secs_to_timeout,
    },
    serde_json::{Map, Value},
    tracing::{debug, info},
};

/// Ask every step in order, collecting answers keyed by step name.
///
/// Skipped steps are recorded as `null` and acknowledged prompts as `true`.
/// A cancelled or timed-out step ends the script with its error; the user
/// has already been told.
pub async fn run_script(dialog: &Dialog, script: &DialogScript) -> Result<Map<String, Value>> {
    let mut answers = Map::new();
    for (index, step) in script.steps.iter().enumerate() {
        debug!(index, name = %step.name, kind = step.kind.name(), "running step");
        let answer = run_step(dialog, step).await?;
        answers.insert(step.name.clone(), answer);
    }
    info!(steps = answers.len(), "script finished");
    Ok(answers)
}

async fn run_step(dialog: &Dialog, step: &ScriptStep) -> Result<Value> {
    let overrides = ConfigOverrides::from_step(&step.overrides);
    let title = step.title.as_str();

    let value = match &step.kind {
        StepKind::Prompt {
            body,
            length_secs,
            continue_keyword,
        } => {
            let mut question = PromptQuestion::new(body.as_str())
                .continue_keyword(Some(continue_keyword.as_str()));
            if let Some(length) = length_secs.and_then(secs_to_timeout) {
                question = question.length(length);
            }
            dialog.prompt(title, &question, None, overrides).await?;
            Value::Bool(true)
        },
        StepKind::Text { body } => {
            let question = TextQuestion {
                body: body.clone(),
            };
            dialog
                .text(title, &question, overrides)
                .await?
                .map(Value::String)
                .unwrap_or(Value::Null)
        },
        StepKind::Number { body, min, max } => {
            let question = NumberQuestion {
                body: body.clone(),
                min: *min,
                max: *max,
            };
            dialog
                .number(title, &question, overrides)
                .await?
                .map(Value::from)
                .unwrap_or(Value::Null)
        },
        StepKind::Choice {
            body,
            choices,
            keys,
            min,
            max,
            dedupe,
        } => {
            let mut question = ChoiceQuestion::new(choices.iter().map(String::as_str))
                .keys(keys.iter().flatten().map(String::as_str))
                .dedupe(*dedupe);
            question.body = body.clone();
            question.min = *min;
            question.max = *max;
            dialog
                .choice(title, &question, overrides)
                .await?
                .map(|selection| {
                    serde_json::json!({
                        "labels": selection.labels,
                        "indices": selection.indices,
                    })
                })
                .unwrap_or(Value::Null)
        },
        StepKind::File {
            body,
            min,
            max,
            allowed_mimetypes,
            allowed_extensions,
            finished_keyword,
        } => {
            let question = FileQuestion {
                body: body.clone(),
                min: *min,
                max: *max,
                allowed_mimetypes: allowed_mimetypes.clone(),
                allowed_extensions: allowed_extensions.clone(),
                finished_keyword: finished_keyword.clone(),
            };
            dialog
                .file(title, &question, overrides)
                .await?
                .map(|files| {
                    Value::Array(
                        files
                            .iter()
                            .map(|file| {
                                serde_json::json!({
                                    "filename": file.filename,
                                    "content_type": file.content_type,
                                    "url": file.url,
                                    "size": file.size,
                                })
                            })
                            .collect(),
                    )
                })
                .unwrap_or(Value::Null)
        },
    };
    Ok(value)
}
