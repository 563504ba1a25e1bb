use parley_channels::IncomingMessage;

use crate::{
    CheckContext, ChoiceQuestion, Formatter, Result, Selection, Verdict,
    formatters::MUST_INCLUDE_TEXT,
};

const BASE: &str = "This is a choice dialog that requires you to choose";
const END_ONE: &str = "of the following choices by typing their corresponding key (left of colon) \
                       as your response.";
const END_MANY: &str = "of the following choices by typing their corresponding keys (left of \
                        colon) separated by commas as your response.";

#[derive(Debug, Clone, Copy, Default)]
pub struct ChoiceFormatter;

impl Formatter<ChoiceQuestion> for ChoiceFormatter {
    fn preface(&self, question: &ChoiceQuestion) -> Option<String> {
        Some(match (question.min, question.max) {
            (None, None) => format!("{BASE} 1 {END_ONE}"),
            (None, Some(max)) => format!("{BASE} at most {max} {END_MANY}"),
            (Some(min), None) => format!("{BASE} at least {min} {END_MANY}"),
            (Some(1), Some(1)) => format!("{BASE} 1 {END_ONE}"),
            (Some(min), Some(max)) if min == max => format!("{BASE} {min} {END_MANY}"),
            (Some(min), Some(max)) => {
                format!("{BASE} between {min} and {max} (inclusive) {END_MANY}")
            },
        })
    }

    fn body(&self, question: &ChoiceQuestion) -> String {
        let listing = question
            .keys
            .iter()
            .zip(&question.choices)
            .map(|(key, choice)| format!("`{key}`: *{choice}*"))
            .collect::<Vec<_>>()
            .join("\n");
        match &question.body {
            Some(body) => format!("{body}\n\n{listing}"),
            None => listing,
        }
    }

    fn check(
        &self,
        question: &ChoiceQuestion,
        ctx: &mut CheckContext<'_, ()>,
        message: &IncomingMessage,
    ) -> Result<Verdict<Selection>> {
        let text = message.text().trim();
        if text.is_empty() {
            return Ok(ctx.reject(MUST_INCLUDE_TEXT));
        }

        let mut picked = split_choices(text);
        if question.dedupe {
            let mut seen = Vec::with_capacity(picked.len());
            picked.retain(|key| {
                let fresh = !seen.contains(key);
                seen.push(*key);
                fresh
            });
        }

        let Some(indices) = picked
            .iter()
            .map(|key| question.index_of(key))
            .collect::<Option<Vec<_>>>()
        else {
            let valid = question
                .keys
                .iter()
                .map(|k| format!("'{k}'"))
                .collect::<Vec<_>>()
                .join(", ");
            return Ok(ctx.reject(format!(
                "All of your choices must be valid keys corresponding to one of the above \
                 values. The valid keys for the dialog are: {valid}"
            )));
        };

        if let Some(problem) = cardinality_problem(question.min, question.max, indices.len()) {
            return Ok(ctx.reject(problem));
        }

        let labels = indices
            .iter()
            .filter_map(|&i| question.choices.get(i).cloned())
            .collect();
        Ok(Verdict::Accepted(Selection { labels, indices }))
    }
}

fn cardinality_problem(min: Option<usize>, max: Option<usize>, count: usize) -> Option<String> {
    match (min, max) {
        (Some(min), Some(max)) if min == max && count != min => {
            Some(format!("You must choose {min} of the above."))
        },
        (Some(min), Some(max)) if !(min..=max).contains(&count) => {
            Some(format!("You must choose between {min} and {max} of the above."))
        },
        (None, Some(max)) if count > max => {
            Some(format!("You must choose at most {max} of the above."))
        },
        (Some(min), None) if count < min => {
            Some(format!("You must choose at least {min} of the above."))
        },
        (None, None) if count != 1 => Some("You must choose 1 of the above.".into()),
        _ => None,
    }
}

/// Split on commas (with any surrounding whitespace) that are not escaped by
/// a directly preceding backslash. Escapes are kept verbatim in the keys.
fn split_choices(text: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let offset = |i: usize| chars.get(i).map_or(text.len(), |&(at, _)| at);

    let mut keys = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < chars.len() {
        match separator_end(&chars, i) {
            Some(end) => {
                keys.push(&text[start..offset(i)]);
                start = offset(end);
                i = end;
            },
            None => i += 1,
        }
    }
    keys.push(&text[start..]);
    keys
}

/// Index just past a separator starting at `i`, if one does.
fn separator_end(chars: &[(usize, char)], i: usize) -> Option<usize> {
    if i > 0 && chars[i - 1].1 == '\\' {
        return None;
    }
    let skip_ws = |mut j: usize| {
        while chars.get(j).is_some_and(|(_, c)| c.is_whitespace()) {
            j += 1;
        }
        j
    };
    let comma = skip_ws(i);
    (chars.get(comma)?.1 == ',').then(|| skip_ws(comma + 1))
}
