//! Scoring-point rubric rendering
//!
//! Every rendered template line is terminated by a newline, so a multi-answer
//! rubric is exactly the concatenation of one block per answer.

use super::aggregate::MultiAnswerSet;
use crate::util::template::{render, TemplateError, TemplateVars};

/// Ground truth of a record that has its window to itself
#[derive(Debug, Clone, Copy)]
pub struct SingleAnswer<'a> {
    pub time_period: &'a str,
    pub datetime: &'a str,
    pub component: &'a str,
    pub reason: &'a str,
}

/// Render each template once with `vars`, one line per template
pub fn render_block(templates: &[String], vars: &TemplateVars) -> Result<String, TemplateError> {
    let mut block = String::new();
    for template in templates {
        block.push_str(&render(template, vars)?);
        block.push('\n');
    }
    Ok(block)
}

pub fn single_scoring_points(
    templates: &[String],
    answer: &SingleAnswer<'_>,
) -> Result<String, TemplateError> {
    let vars = TemplateVars::new()
        .with("idx", "only")
        .with("time_period", answer.time_period)
        .with("datetime", answer.datetime)
        .with("component", answer.component)
        .with("reason", answer.reason);
    render_block(templates, &vars)
}

/// One block per co-located failure, labelled `1-th`, `2-th`, ...
///
/// `time_period` is not available to multi-answer templates.
pub fn multi_scoring_points(
    templates: &[String],
    answers: &MultiAnswerSet,
) -> Result<String, TemplateError> {
    let mut out = String::new();
    for i in 0..answers.len() {
        let vars = TemplateVars::new()
            .with("idx", format!("{}-th", i + 1))
            .with("datetime", &answers.datetime[i])
            .with("component", &answers.component[i])
            .with("reason", &answers.reason[i]);
        out.push_str(&render_block(templates, &vars)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn templates() -> Vec<String> {
        vec![
            "The {idx} root cause occurrence datetime: {datetime}".to_string(),
            "The {idx} root cause component: {component}".to_string(),
            "The {idx} root cause reason: {reason}".to_string(),
        ]
    }

    fn answers() -> MultiAnswerSet {
        MultiAnswerSet {
            datetime: vec!["2021-03-04 15:00:00".into(), "2021-03-04 15:10:00".into()],
            component: vec!["os_018".into(), "Tomcat01".into()],
            reason: vec!["CPU fault".into(), "network {delay}".into()],
        }
    }

    #[test]
    fn test_single_answer() {
        let answer = SingleAnswer {
            time_period: "2021-03-04 15:00:00 to 2021-03-04 15:30:00",
            datetime: "2021-03-04 15:03:00",
            component: "docker_003 (pod)",
            reason: "JVM Out of Memory: heap > 95%",
        };
        let out = single_scoring_points(&templates(), &answer).unwrap();
        assert_eq!(
            out,
            "The only root cause occurrence datetime: 2021-03-04 15:03:00\n\
             The only root cause component: docker_003 (pod)\n\
             The only root cause reason: JVM Out of Memory: heap > 95%\n"
        );
        assert!(out.contains(answer.component));
        assert!(out.contains(answer.reason));
    }

    #[test]
    fn test_multi_answer_is_concatenation_of_blocks() {
        let answers = answers();
        let out = multi_scoring_points(&templates(), &answers).unwrap();

        let mut expected = String::new();
        for i in 0..answers.len() {
            let vars = TemplateVars::new()
                .with("idx", format!("{}-th", i + 1))
                .with("datetime", &answers.datetime[i])
                .with("component", &answers.component[i])
                .with("reason", &answers.reason[i]);
            expected.push_str(&render_block(&templates(), &vars).unwrap());
        }
        assert_eq!(out, expected);
        assert_eq!(out.lines().count(), answers.len() * templates().len());
        assert!(out.starts_with("The 1-th root cause occurrence datetime: 2021-03-04 15:00:00\n"));
        assert!(out.contains("The 2-th root cause reason: network {delay}\n"));
    }

    #[test]
    fn test_multi_answer_rejects_time_period() {
        let templates = vec!["{idx} failure in {time_period}".to_string()];
        let err = multi_scoring_points(&templates, &answers()).unwrap_err();
        assert_eq!(err, TemplateError::MissingKey("time_period".to_string()));
    }

    #[test]
    fn test_single_answer_missing_key() {
        let templates = vec!["{idx} {num}".to_string()];
        let answer = SingleAnswer {
            time_period: "p",
            datetime: "d",
            component: "c",
            reason: "r",
        };
        assert_eq!(
            single_scoring_points(&templates, &answer).unwrap_err(),
            TemplateError::MissingKey("num".to_string())
        );
    }
}
