use super::types::RawDiagnosis;
use super::DiagnosisError;

/// Locate the JSON array at the end of the engine's stdout.
///
/// The engine logs progress lines before printing its result, so the
/// payload starts at the LAST line whose trimmed text begins with `[` and
/// runs to the end of the output.
pub fn extract_json_tail(stdout: &str) -> Option<String> {
    let lines: Vec<&str> = stdout.trim().lines().collect();
    let start = lines.iter().rposition(|line| line.trim_start().starts_with('['))?;
    Some(lines[start..].join("\n"))
}

/// Parse the diagnoses printed by the engine.
pub fn parse_diagnoses(stdout: &str) -> Result<Vec<RawDiagnosis>, DiagnosisError> {
    let payload = extract_json_tail(stdout).ok_or(DiagnosisError::NoJsonFound)?;
    serde_json::from_str(&payload).map_err(DiagnosisError::InvalidJson)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENGINE_OUTPUT: &str = r#"Analyzing symptoms: 'pelvic pain, heavy bleeding'
AI suggested conditions: ['endometriosis', 'uterine fibroids']

Researching: endometriosis
endometriosis: 0.82 certainty

Top 3 probable diagnoses:
1. endometriosis (0.82 certainty)
[
  {
    "diagnosis": "endometriosis",
    "certainty_score": 0.82,
    "supporting_evidence": [
      "Pelvic pain with heavy bleeding is characteristic"
    ],
    "research_articles": 5,
    "key_findings": "Endometriosis presents with chronic pelvic pain"
  },
  {
    "diagnosis": "uterine fibroids",
    "certainty_score": 0.35,
    "supporting_evidence": [],
    "research_articles": 2,
    "key_findings": "Fibroids are characterized by heavy menstrual bleeding"
  }
]
"#;

    #[test]
    fn extracts_array_after_log_lines() {
        let diagnoses = parse_diagnoses(ENGINE_OUTPUT).unwrap();
        assert_eq!(diagnoses.len(), 2);
        assert_eq!(diagnoses[0].diagnosis, "endometriosis");
        assert_eq!(diagnoses[0].supporting_evidence.len(), 1);
        assert_eq!(diagnoses[1].research_articles, 2);
    }

    #[test]
    fn picks_the_last_bracket_line() {
        let stdout = "[debug] starting\n[{\"diagnosis\":\"anemia\",\"certainty_score\":0.5}]\n";
        let tail = extract_json_tail(stdout).unwrap();
        assert!(tail.starts_with("[{"));
        let diagnoses = parse_diagnoses(stdout).unwrap();
        assert_eq!(diagnoses[0].diagnosis, "anemia");
    }

    #[test]
    fn single_line_array() {
        let diagnoses = parse_diagnoses("[]").unwrap();
        assert!(diagnoses.is_empty());
    }

    #[test]
    fn missing_array_is_an_error() {
        assert!(matches!(
            parse_diagnoses("Analyzing symptoms\nNo research found"),
            Err(DiagnosisError::NoJsonFound)
        ));
        assert!(matches!(parse_diagnoses(""), Err(DiagnosisError::NoJsonFound)));
    }

    #[test]
    fn malformed_array_is_an_error() {
        assert!(matches!(
            parse_diagnoses("[ {\"diagnosis\": \"x\""),
            Err(DiagnosisError::InvalidJson(_))
        ));
    }
}
