use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct TestSummary {
    pub id: i32,
    pub title: String,
    pub question_count: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct Test {
    pub id: i32,
    pub title: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct Question {
    pub id: i32,
    pub text: String,
    pub position: i32,
}

/// Number of answers with a given rating for one question
#[derive(Debug, Clone, FromRow)]
pub struct RatingCount {
    pub question_id: i32,
    pub rating: i16,
    pub answers: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuestionStatistics {
    pub question_id: i32,
    pub text: String,
    pub answers: i64,
    pub average: f64,
    /// Counts for ratings 1..=5
    pub distribution: [i64; 5],
}

#[derive(Debug, Clone)]
pub struct TestStatistics {
    pub test: Test,
    pub questions: Vec<QuestionStatistics>,
}
