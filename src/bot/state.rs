use serde::{Deserialize, Serialize};

/// Menu depth a bot instance runs with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowVariant {
    /// course → category → question
    Categorized,
    /// course → question (categories shown as label icons only)
    Flat,
}

impl FlowVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowVariant::Categorized => "categorized",
            FlowVariant::Flat => "flat",
        }
    }
}

impl std::str::FromStr for FlowVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "categorized" | "3" | "three-level" => Ok(FlowVariant::Categorized),
            "flat" | "2" | "two-level" => Ok(FlowVariant::Flat),
            other => Err(format!("unknown flow variant '{other}'")),
        }
    }
}

/// Where a user is in the FAQ hierarchy.
///
/// Never stored between interactions: every inbound button payload is decoded back
/// into one of these variants, and every rendered button carries enough of it to
/// reconstruct the next one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavigationState {
    Start,
    CourseSelected {
        course: String,
    },
    /// Only reachable in [`FlowVariant::Categorized`].
    CategorySelected {
        course: String,
        category: String,
    },
    /// `category` is `None` in the flat flow, where `index` is positional within the
    /// whole course instead of within one category.
    AnswerShown {
        course: String,
        category: Option<String>,
        index: usize,
    },
}

impl NavigationState {
    /// Breadcrumb for logs, e.g. `AI 과정 > 출석 > #2`.
    pub fn breadcrumb(&self) -> String {
        match self {
            NavigationState::Start => "Start".into(),
            NavigationState::CourseSelected { course } => course.clone(),
            NavigationState::CategorySelected { course, category } => {
                format!("{course} > {category}")
            }
            NavigationState::AnswerShown {
                course,
                category: Some(category),
                index,
            } => format!("{course} > {category} > #{index}"),
            NavigationState::AnswerShown {
                course,
                category: None,
                index,
            } => format!("{course} > #{index}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flow_names() {
        assert_eq!("flat".parse::<FlowVariant>().unwrap(), FlowVariant::Flat);
        assert_eq!(" Categorized ".parse::<FlowVariant>().unwrap(), FlowVariant::Categorized);
        assert!("deep".parse::<FlowVariant>().is_err());
    }

    #[test]
    fn breadcrumbs() {
        let s = NavigationState::AnswerShown {
            course: "AI 과정".into(),
            category: Some("출석".into()),
            index: 2,
        };
        assert_eq!(s.breadcrumb(), "AI 과정 > 출석 > #2");
        assert_eq!(NavigationState::Start.breadcrumb(), "Start");
    }
}
