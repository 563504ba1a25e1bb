use std::mem;

use parley_channels::{Attachment, IncomingMessage};

use crate::{CheckContext, FileQuestion, Formatter, Result, Verdict, formatter::or_list};

#[derive(Debug, Clone, Copy, Default)]
pub struct FileFormatter;

impl FileFormatter {
    fn count_phrase(question: &FileQuestion, base: &str, end: &str) -> String {
        match (question.min, question.max) {
            (None, None) => format!("{base} any number of {end}"),
            (None, Some(max)) => format!("{base} at most {max} {end}"),
            (Some(min), None) => format!("{base} at least {min} {end}"),
            (Some(min), Some(max)) if min == max => format!("{base} {min} {end}"),
            (Some(min), Some(max)) => format!("{base} between {min} and {max} (inclusive) {end}"),
        }
    }

    /// `" of type .a, .b or .c"`, or empty when any type is accepted.
    fn types_phrase(question: &FileQuestion, quote: &str) -> String {
        let extensions: Vec<String> = question
            .resolved_extensions()
            .iter()
            .map(|ext| format!("{quote}.{ext}{quote}"))
            .collect();
        if extensions.is_empty() {
            return String::new();
        }
        format!(" of type {}", or_list(&extensions))
    }
}

impl Formatter<FileQuestion> for FileFormatter {
    fn preface(&self, question: &FileQuestion) -> Option<String> {
        question.body.as_ref()?;
        let keyword = question.normalized_finished_keyword();
        let types = Self::types_phrase(question, "");
        Some(Self::count_phrase(
            question,
            "This is a file dialog that requires you to upload",
            &format!("file(s){types}. Type '{keyword}' once finished to complete the dialog."),
        ))
    }

    fn body(&self, question: &FileQuestion) -> String {
        if let Some(body) = &question.body {
            return body.clone();
        }
        let keyword = question.normalized_finished_keyword();
        let types = Self::types_phrase(question, "`");
        Self::count_phrase(
            question,
            "Please upload",
            &format!("file(s){types}. Type `{keyword}` once finished to complete the dialog."),
        )
    }

    fn check(
        &self,
        question: &FileQuestion,
        ctx: &mut CheckContext<'_, Vec<Attachment>>,
        message: &IncomingMessage,
    ) -> Result<Verdict<Vec<Attachment>>> {
        let keyword = question.normalized_finished_keyword();
        let finishing = message.normalized_content() == keyword;
        let incoming = &message.attachments;

        if !finishing && incoming.is_empty() {
            return Ok(ctx.reject(
                "Unless finishing this dialog, your message must contain one or more files.",
            ));
        }

        let held = ctx.state.len();
        if let Some(max) = question.max
            && !incoming.is_empty()
            && held + incoming.len() > max
        {
            if held >= max {
                return Ok(ctx.reject(format!(
                    "You have already reached the maximum number of files allowed by this \
                     dialog. Please type `{keyword}` to finish."
                )));
            }
            return Ok(ctx.reject(format!(
                "Addition of these files would surpass the maximum number of files allowed by \
                 this dialog. You may send at most {} more file(s).",
                max - held
            )));
        }

        let allowed = question.resolved_extensions();
        if !allowed.is_empty()
            && !incoming.iter().all(|file| {
                file.extension()
                    .is_some_and(|ext| allowed.contains(&ext))
            })
        {
            return Ok(ctx.reject(format!(
                "All files sent must be{}.",
                Self::types_phrase(question, "")
            )));
        }

        ctx.state.extend(incoming.iter().cloned());
        if !finishing {
            return Ok(Verdict::Pending);
        }

        let total = ctx.state.len();
        let problem = match (question.min, question.max) {
            (Some(min), Some(max)) if min == max && total != min => {
                Some(format!("You must have sent exactly {min} file(s)"))
            },
            (Some(min), Some(max)) if !(min..=max).contains(&total) => {
                Some(format!("You must have sent between {min} and {max} file(s)"))
            },
            (Some(min), _) if total < min => {
                Some(format!("You must have sent at least {min} file(s)"))
            },
            _ => None,
        };
        if let Some(problem) = problem {
            return Ok(ctx.reject(format!(
                "{problem} in order to finish this dialog. You have sent a total of {total}."
            )));
        }

        Ok(Verdict::Accepted(mem::take(ctx.state)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {
        super::*,
        crate::formatters::test_support::{check, files, message, rejection},
        rstest::rstest,
    };

    #[rstest]
    #[case(
        None,
        None,
        "Please upload any number of file(s). Type `done` once finished to complete the \
         dialog."
    )]
    #[case(
        None,
        Some(2),
        "Please upload at most 2 file(s). Type `done` once finished to complete the dialog."
    )]
    #[case(
        Some(1),
        None,
        "Please upload at least 1 file(s). Type `done` once finished to complete the dialog."
    )]
    #[case(
        Some(3),
        Some(3),
        "Please upload 3 file(s). Type `done` once finished to complete the dialog."
    )]
    // Names both bounds; older releases repeated the maximum here.
    #[case(
        Some(1),
        Some(4),
        "Please upload between 1 and 4 (inclusive) file(s). Type `done` once finished to \
         complete the dialog."
    )]
    fn generated_body(
        #[case] min: Option<usize>,
        #[case] max: Option<usize>,
        #[case] expected: &str,
    ) {
        let q = FileQuestion { min, max, ..FileQuestion::new() };
        assert_eq!(FileFormatter.preface(&q), None);
        assert_eq!(FileFormatter.body(&q), expected);
    }

    #[test]
    fn types_are_listed() {
        let q = FileQuestion::new()
            .allowed_extensions(["png", ".JPG", "gif"])
            .finished_keyword("Finished");
        assert_eq!(
            FileFormatter.body(&q),
            "Please upload any number of file(s) of type `.png`, `.jpg` or `.gif`. Type \
             `finished` once finished to complete the dialog."
        );

        let q = q.body("Send your screenshots.").max(2);
        assert_eq!(
            FileFormatter.preface(&q).as_deref(),
            Some(
                "This is a file dialog that requires you to upload at most 2 file(s) of type \
                 .png, .jpg or .gif. Type 'finished' once finished to complete the dialog."
            )
        );
        assert_eq!(FileFormatter.body(&q), "Send your screenshots.");
    }

    #[test]
    fn accumulates_until_finished() {
        let q = FileQuestion::new().max(2);
        let mut held = Vec::new();

        let verdict = check(&FileFormatter, &q, &mut held, &files(None, &["a.png"])).unwrap();
        assert_eq!(verdict, Verdict::Pending);
        let verdict = check(&FileFormatter, &q, &mut held, &files(None, &["b.png"])).unwrap();
        assert_eq!(verdict, Verdict::Pending);

        let verdict = check(&FileFormatter, &q, &mut held, &message("done")).unwrap();
        let Verdict::Accepted(all) = verdict else {
            panic!("expected acceptance");
        };
        let names: Vec<_> = all.iter().map(|a| a.filename.as_str()).collect();
        assert_eq!(names, ["a.png", "b.png"]);
        assert!(held.is_empty());
    }

    #[test]
    fn finishing_message_may_carry_files() {
        let q = FileQuestion::new();
        let mut held = Vec::new();
        let verdict = check(&FileFormatter, &q, &mut held, &files(Some(" DONE"), &["a.txt"]));
        assert!(matches!(verdict.unwrap(), Verdict::Accepted(all) if all.len() == 1));
    }

    #[test]
    fn text_without_files_is_rejected() {
        let verdict = check(&FileFormatter, &FileQuestion::new(), &mut Vec::new(), &message("hi"));
        assert_eq!(
            rejection(verdict),
            "Unless finishing this dialog, your message must contain one or more files."
        );
    }

    #[test]
    fn max_feedback_counts_remaining() {
        let q = FileQuestion::new().max(2);
        let mut held = Vec::new();
        let verdict = check(&FileFormatter, &q, &mut held, &files(None, &["a", "b", "c"]));
        assert_eq!(
            rejection(verdict),
            "Addition of these files would surpass the maximum number of files allowed by this \
             dialog. You may send at most 2 more file(s)."
        );
        assert!(held.is_empty());

        check(&FileFormatter, &q, &mut held, &files(None, &["a", "b"])).unwrap();
        let verdict = check(&FileFormatter, &q, &mut held, &files(None, &["c"]));
        assert_eq!(
            rejection(verdict),
            "You have already reached the maximum number of files allowed by this dialog. \
             Please type `done` to finish."
        );
        assert_eq!(held.len(), 2);
    }

    #[test]
    fn extension_must_be_allowed() {
        let q = FileQuestion::new().allowed_extensions(["png"]);
        let mut held = Vec::new();
        // A substring match would let this through.
        let verdict = check(&FileFormatter, &q, &mut held, &files(None, &["notpng.exe"]));
        assert_eq!(rejection(verdict), "All files sent must be of type .png.");
        let verdict = check(&FileFormatter, &q, &mut held, &files(None, &["README"]));
        assert_eq!(rejection(verdict), "All files sent must be of type .png.");
        assert!(held.is_empty());

        let verdict = check(&FileFormatter, &q, &mut held, &files(None, &["Shot.PNG"])).unwrap();
        assert_eq!(verdict, Verdict::Pending);
    }

    #[test]
    fn mimetypes_expand_to_extensions() {
        let q = FileQuestion::new().allowed_mimetypes(["image/png"]);
        let verdict = check(&FileFormatter, &q, &mut Vec::new(), &files(None, &["a.png"]));
        assert_eq!(verdict.unwrap(), Verdict::Pending);
        let verdict = check(&FileFormatter, &q, &mut Vec::new(), &files(None, &["a.txt"]));
        assert!(rejection(verdict).starts_with("All files sent must be of type "));
    }

    #[rstest]
    #[case(
        Some(2),
        Some(2),
        1,
        "You must have sent exactly 2 file(s) in order to finish this dialog. You have sent a \
         total of 1."
    )]
    #[case(
        Some(2),
        Some(4),
        1,
        "You must have sent between 2 and 4 file(s) in order to finish this dialog. You have \
         sent a total of 1."
    )]
    #[case(
        Some(3),
        None,
        2,
        "You must have sent at least 3 file(s) in order to finish this dialog. You have sent a \
         total of 2."
    )]
    fn finishing_checks_the_total(
        #[case] min: Option<usize>,
        #[case] max: Option<usize>,
        #[case] held: usize,
        #[case] expected: &str,
    ) {
        let q = FileQuestion { min, max, ..FileQuestion::new() };
        let mut state: Vec<Attachment> =
            (0..held).map(|i| Attachment::new(format!("{i}.png"), "u")).collect();
        let verdict = check(&FileFormatter, &q, &mut state, &message("done"));
        assert_eq!(rejection(verdict), expected);
        assert_eq!(state.len(), held);
    }
}
