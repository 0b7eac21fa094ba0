//! Personalized lesson selection
//!
//! Picks short financial lessons from the user's recent spending habit and
//! the keywords in their stated goal. Always returns at least three lessons.

use serde::Serialize;

use crate::models::FinancialEntry;

/// Minimum number of lessons in a plan
pub const MIN_LESSONS: usize = 3;

/// Number of recent entries used to classify spending habit
pub const HABIT_WINDOW: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lesson {
    pub title: &'static str,
    pub content: &'static str,
}

/// Spending pattern over recent manual entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpendingHabit {
    Overspending,
    Saving,
    Balanced,
}

impl SpendingHabit {
    /// Classify from averaged income and expenses; no data counts as balanced
    pub fn classify(recent: &[FinancialEntry]) -> Self {
        if recent.is_empty() {
            return Self::Balanced;
        }
        let count = recent.len() as f64;
        let avg_income = recent.iter().map(|e| e.income).sum::<f64>() / count;
        let avg_expenses = recent.iter().map(|e| e.expenses).sum::<f64>() / count;

        if avg_expenses > avg_income * 0.9 {
            Self::Overspending
        } else if avg_expenses < avg_income * 0.6 {
            Self::Saving
        } else {
            Self::Balanced
        }
    }

    fn lesson(self) -> Lesson {
        match self {
            Self::Overspending => Lesson {
                title: "Managing Overspending",
                content: "You're spending most of your income. Try using the 50/30/20 rule: 50% for needs, 30% for wants, and 20% for savings and debt repayment.",
            },
            Self::Saving => Lesson {
                title: "Optimizing Your Savings",
                content: "Great job saving! Consider putting your extra savings into different buckets: emergency fund, short-term goals, and long-term investments.",
            },
            Self::Balanced => Lesson {
                title: "Maintaining Financial Balance",
                content: "You have a good balance between spending and saving. Focus on consistently building your emergency fund and increasing investment contributions.",
            },
        }
    }
}

/// Topics recognized in a free-text goal, in presentation order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalTopic {
    Saving,
    Investing,
    Debt,
    Budgeting,
    Retirement,
}

impl GoalTopic {
    const ALL: [GoalTopic; 5] = [
        GoalTopic::Saving,
        GoalTopic::Investing,
        GoalTopic::Debt,
        GoalTopic::Budgeting,
        GoalTopic::Retirement,
    ];

    fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Saving => &["save", "saving"],
            Self::Investing => &["invest", "investing"],
            Self::Debt => &["debt", "loan"],
            Self::Budgeting => &["budget", "spending"],
            Self::Retirement => &["retire", "future"],
        }
    }

    /// Topics whose keywords appear in the goal (case-insensitive)
    pub fn detect(goal: &str) -> Vec<GoalTopic> {
        let goal = goal.to_lowercase();
        Self::ALL
            .into_iter()
            .filter(|topic| topic.keywords().iter().any(|k| goal.contains(k)))
            .collect()
    }

    fn lesson(self) -> Lesson {
        match self {
            Self::Saving => Lesson {
                title: "Boosting Your Savings Rate",
                content: "Try the 24-hour rule before making non-essential purchases to reduce impulse buying and increase your savings rate.",
            },
            Self::Investing => Lesson {
                title: "Investment Fundamentals",
                content: "Start with low-cost index funds that give you broad market exposure before considering individual stocks or more complex investments.",
            },
            Self::Debt => Lesson {
                title: "Strategic Debt Repayment",
                content: "Use either the avalanche method (highest interest first) or snowball method (smallest balance first) to systematically eliminate debt.",
            },
            Self::Budgeting => Lesson {
                title: "Zero-Based Budgeting",
                content: "Assign every dollar of income a purpose (spending, saving, investing) to ensure you're making the most of your money.",
            },
            Self::Retirement => Lesson {
                title: "Retirement Planning Basics",
                content: "Start early and be consistent. Even small regular contributions to retirement accounts can grow significantly over time due to compound interest.",
            },
        }
    }
}

const GENERAL_LESSONS: [Lesson; 4] = [
    Lesson {
        title: "Emergency Fund Fundamentals",
        content: "Aim to save 3-6 months of essential expenses in an easily accessible account for unexpected situations.",
    },
    Lesson {
        title: "Understanding Credit Scores",
        content: "Payment history and credit utilization have the biggest impact on your score. Always pay on time and keep balances low.",
    },
    Lesson {
        title: "Automation is Your Friend",
        content: "Automate bill payments and savings transfers to ensure consistency and avoid late fees or missed savings opportunities.",
    },
    Lesson {
        title: "Tax-Efficient Investing",
        content: "Maximize contributions to tax-advantaged accounts like 401(k)s and IRAs before investing through standard taxable accounts.",
    },
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerProfile {
    pub has_goal: bool,
    pub spending_habit: SpendingHabit,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LessonPlan {
    pub lessons: Vec<Lesson>,
    pub profile: LearnerProfile,
}

/// Build a lesson plan from the user's goal and latest entries
pub fn recommend(goal: Option<&str>, recent: &[FinancialEntry]) -> LessonPlan {
    let habit = SpendingHabit::classify(recent);
    let goal = goal.map(str::trim).filter(|g| !g.is_empty());

    let mut lessons = vec![habit.lesson()];
    if let Some(goal) = goal {
        lessons.extend(GoalTopic::detect(goal).into_iter().map(GoalTopic::lesson));
    }
    for general in GENERAL_LESSONS {
        if lessons.len() >= MIN_LESSONS {
            break;
        }
        lessons.push(general);
    }

    LessonPlan {
        lessons,
        profile: LearnerProfile {
            has_goal: goal.is_some(),
            spending_habit: habit,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(income: f64, expenses: f64) -> FinancialEntry {
        FinancialEntry {
            id: 0,
            username: "alex".to_string(),
            income,
            expenses,
            expense_breakdown: None,
            notes: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_habit_classification() {
        assert_eq!(SpendingHabit::classify(&[]), SpendingHabit::Balanced);
        assert_eq!(
            SpendingHabit::classify(&[entry(3000.0, 2800.0)]),
            SpendingHabit::Overspending
        );
        assert_eq!(
            SpendingHabit::classify(&[entry(3000.0, 1000.0), entry(3000.0, 1400.0)]),
            SpendingHabit::Saving
        );
        assert_eq!(
            SpendingHabit::classify(&[entry(3000.0, 2400.0)]),
            SpendingHabit::Balanced
        );
    }

    #[test]
    fn test_no_goal_fills_with_general_lessons() {
        let plan = recommend(None, &[]);
        let titles: Vec<&str> = plan.lessons.iter().map(|l| l.title).collect();
        assert_eq!(
            titles,
            vec![
                "Maintaining Financial Balance",
                "Emergency Fund Fundamentals",
                "Understanding Credit Scores",
            ]
        );
        assert!(!plan.profile.has_goal);
    }

    #[test]
    fn test_goal_keywords_add_lessons_in_order() {
        let plan = recommend(
            Some("Pay off my student LOAN, then invest and retire early"),
            &[entry(3000.0, 2900.0)],
        );
        let titles: Vec<&str> = plan.lessons.iter().map(|l| l.title).collect();
        assert_eq!(
            titles,
            vec![
                "Managing Overspending",
                "Investment Fundamentals",
                "Strategic Debt Repayment",
                "Retirement Planning Basics",
            ]
        );
        assert!(plan.profile.has_goal);
        assert_eq!(plan.profile.spending_habit, SpendingHabit::Overspending);
    }

    #[test]
    fn test_blank_goal_is_not_a_goal() {
        let plan = recommend(Some("   "), &[]);
        assert!(!plan.profile.has_goal);
        assert_eq!(plan.lessons.len(), MIN_LESSONS);
    }

    #[test]
    fn test_plan_serializes_profile() {
        let plan = recommend(Some("budget better"), &[entry(4000.0, 1000.0)]);
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["profile"]["hasGoal"], true);
        assert_eq!(json["profile"]["spendingHabit"], "saving");
        assert_eq!(json["lessons"][1]["title"], "Zero-Based Budgeting");
    }
}
