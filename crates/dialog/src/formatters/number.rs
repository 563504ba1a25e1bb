use parley_channels::IncomingMessage;

use crate::{
    CheckContext, Formatter, NumberQuestion, Result, Verdict, formatter::bounded_phrase,
    formatters::MUST_INCLUDE_TEXT,
};

const END: &str = "as your response.";

#[derive(Debug, Clone, Copy, Default)]
pub struct NumberFormatter;

impl NumberFormatter {
    fn rules(question: &NumberQuestion) -> String {
        bounded_phrase("Please type a number", END, question.min, question.max)
    }
}

impl Formatter<NumberQuestion> for NumberFormatter {
    fn preface(&self, question: &NumberQuestion) -> Option<String> {
        question.body.as_ref()?;
        Some(bounded_phrase(
            "This is a number dialog that requires you to type a number",
            END,
            question.min,
            question.max,
        ))
    }

    fn body(&self, question: &NumberQuestion) -> String {
        question
            .body
            .clone()
            .unwrap_or_else(|| Self::rules(question))
    }

    fn check(
        &self,
        question: &NumberQuestion,
        ctx: &mut CheckContext<'_, ()>,
        message: &IncomingMessage,
    ) -> Result<Verdict<f64>> {
        if !message.has_text() {
            return Ok(ctx.reject(MUST_INCLUDE_TEXT));
        }
        let in_bounds = |value: f64| {
            question.min.is_none_or(|min| value >= min)
                && question.max.is_none_or(|max| value <= max)
        };
        match message.text().trim().parse::<f64>() {
            Ok(value) if in_bounds(value) => Ok(Verdict::Accepted(value)),
            _ => Ok(ctx.reject(Self::rules(question))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {
        super::*,
        crate::formatters::test_support::{check, message, rejection},
        rstest::rstest,
    };

    #[rstest]
    #[case(None, None, "Please type a number as your response.")]
    #[case(Some(1.0), None, "Please type a number greater than or equal to 1 as your response.")]
    #[case(None, Some(2.5), "Please type a number less than or equal to 2.5 as your response.")]
    #[case(
        Some(1.0),
        Some(10.0),
        "Please type a number between 1 and 10 (inclusive) as your response."
    )]
    fn generated_body(#[case] min: Option<f64>, #[case] max: Option<f64>, #[case] expected: &str) {
        let q = NumberQuestion { body: None, min, max };
        assert_eq!(NumberFormatter.preface(&q), None);
        assert_eq!(NumberFormatter.body(&q), expected);
    }

    #[test]
    fn custom_body_moves_rules_to_preface() {
        let q = NumberQuestion::new().body("How old are you?").min(0.0);
        assert_eq!(
            NumberFormatter.preface(&q).as_deref(),
            Some(
                "This is a number dialog that requires you to type a number greater than or \
                 equal to 0 as your response."
            )
        );
        assert_eq!(NumberFormatter.body(&q), "How old are you?");
    }

    #[rstest]
    #[case("5", 5.0)]
    #[case(" 1 ", 1.0)]
    #[case("10", 10.0)]
    #[case("7.25", 7.25)]
    fn accepts_in_range(#[case] input: &str, #[case] expected: f64) {
        let q = NumberQuestion::new().min(1.0).max(10.0);
        let verdict = check(&NumberFormatter, &q, &mut (), &message(input)).unwrap();
        assert_eq!(verdict, Verdict::Accepted(expected));
    }

    #[rstest]
    #[case("15")]
    #[case("0.5")]
    #[case("abc")]
    #[case("NaN")]
    fn rejects_with_bound_phrase(#[case] input: &str) {
        let q = NumberQuestion::new().min(1.0).max(10.0);
        let verdict = check(&NumberFormatter, &q, &mut (), &message(input));
        assert_eq!(
            rejection(verdict),
            "Please type a number between 1 and 10 (inclusive) as your response."
        );
    }

    #[rstest]
    #[case("nan")]
    #[case("inf")]
    #[case("-1e300")]
    fn unbounded_accepts_any_float(#[case] input: &str) {
        let verdict = check(&NumberFormatter, &NumberQuestion::new(), &mut (), &message(input));
        let Verdict::Accepted(value) = verdict.unwrap() else {
            panic!("{input} should be accepted");
        };
        assert_eq!(value.to_string(), input.parse::<f64>().unwrap().to_string());
    }

    #[test]
    fn rejection_ignores_custom_body() {
        let q = NumberQuestion::new().body("Age?").max(3.0);
        let verdict = check(&NumberFormatter, &q, &mut (), &message("4"));
        assert_eq!(
            rejection(verdict),
            "Please type a number less than or equal to 3 as your response."
        );
    }

    #[test]
    fn empty_content_must_include_text() {
        let verdict = check(&NumberFormatter, &NumberQuestion::new(), &mut (), &message(""));
        assert_eq!(rejection(verdict), MUST_INCLUDE_TEXT);
    }
}
