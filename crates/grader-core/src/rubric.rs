use serde::{Deserialize, Serialize};

/// Grading criteria supplied by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rubric {
    /// Maximum attainable points
    pub total_points: f64,

    /// Criteria in the order they should be presented to the model
    #[serde(default)]
    pub criteria: Vec<Criterion>,
}

/// A single rubric criterion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    pub criterion: String,
    pub points: f64,
    #[serde(default)]
    pub description: String,
}

impl Rubric {
    pub fn new(total_points: f64, criteria: Vec<Criterion>) -> Self {
        Self {
            total_points,
            criteria,
        }
    }

    /// Render the rubric as prompt text.
    ///
    /// A header line with the total is followed by one numbered block per
    /// criterion. Criteria keep their input order.
    ///
    /// # Examples
    ///
    /// ```
    /// use grader_core::rubric::{Criterion, Rubric};
    ///
    /// let rubric = Rubric::new(
    ///     5.0,
    ///     vec![Criterion::new("Accuracy", 5.0, "Facts are correct")],
    /// );
    /// assert_eq!(
    ///     rubric.render(),
    ///     "Total Points: 5\n\nGrading Criteria:\n\n1. Accuracy (5 points)\n   Facts are correct"
    /// );
    /// ```
    pub fn render(&self) -> String {
        // f64 Display drops the fraction of whole numbers: 10.0 renders as "10"
        let mut lines = vec![format!("Total Points: {}\n", self.total_points)];

        if !self.criteria.is_empty() {
            lines.push("Grading Criteria:".to_string());
            for (i, criterion) in self.criteria.iter().enumerate() {
                lines.push(format!(
                    "\n{}. {} ({} points)",
                    i + 1,
                    criterion.criterion,
                    criterion.points
                ));
                lines.push(format!("   {}", criterion.description));
            }
        }

        lines.join("\n")
    }
}

impl Criterion {
    pub fn new(criterion: impl Into<String>, points: f64, description: impl Into<String>) -> Self {
        Self {
            criterion: criterion.into(),
            points,
            description: description.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_criteria() -> Rubric {
        Rubric::new(
            10.0,
            vec![
                Criterion::new("Clarity", 2.0, "Answer is easy to follow"),
                Criterion::new("Accuracy", 6.0, "Claims are correct"),
                Criterion::new("Analysis", 2.0, "Goes beyond restating facts"),
            ],
        )
    }

    #[test]
    fn test_render_preserves_criterion_order() {
        let text = three_criteria().render();

        let clarity = text.find("1. Clarity").unwrap();
        let accuracy = text.find("2. Accuracy").unwrap();
        let analysis = text.find("3. Analysis").unwrap();
        assert!(clarity < accuracy);
        assert!(accuracy < analysis);
    }

    #[test]
    fn test_render_full_layout() {
        let text = three_criteria().render();
        let expected = "Total Points: 10\n\
\n\
Grading Criteria:\n\
\n\
1. Clarity (2 points)\n   Answer is easy to follow\n\
\n\
2. Accuracy (6 points)\n   Claims are correct\n\
\n\
3. Analysis (2 points)\n   Goes beyond restating facts";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_render_without_criteria() {
        let rubric = Rubric::new(4.0, vec![]);
        assert_eq!(rubric.render(), "Total Points: 4\n");
    }

    #[test]
    fn test_render_fractional_points() {
        let rubric = Rubric::new(7.5, vec![Criterion::new("Style", 2.5, "")]);
        let text = rubric.render();
        assert!(text.starts_with("Total Points: 7.5\n"));
        assert!(text.contains("1. Style (2.5 points)"));
    }

    #[test]
    fn test_rubric_deserialization_defaults() {
        let json = r#"{"total_points": 3, "criteria": [{"criterion": "Effort", "points": 3}]}"#;
        let rubric: Rubric = serde_json::from_str(json).unwrap();

        assert_eq!(rubric.total_points, 3.0);
        assert_eq!(rubric.criteria.len(), 1);
        assert_eq!(rubric.criteria[0].description, "");
    }
}
