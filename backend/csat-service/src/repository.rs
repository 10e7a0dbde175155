use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Question, RatingCount, Test, TestSummary};

pub struct CsatRepository {
    pool: PgPool,
}

impl CsatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_tests(&self) -> Result<Vec<TestSummary>, sqlx::Error> {
        sqlx::query_as::<_, TestSummary>(
            r#"
            SELECT t.id, t.title, COUNT(q.id) AS question_count
            FROM csat_tests t
            LEFT JOIN csat_questions q ON q.test_id = t.id
            GROUP BY t.id, t.title
            ORDER BY t.id
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    pub async fn find_test(&self, test_id: i32) -> Result<Option<Test>, sqlx::Error> {
        sqlx::query_as::<_, Test>("SELECT id, title FROM csat_tests WHERE id = $1")
            .bind(test_id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn questions(&self, test_id: i32) -> Result<Vec<Question>, sqlx::Error> {
        sqlx::query_as::<_, Question>(
            r#"
            SELECT id, text, position
            FROM csat_questions
            WHERE test_id = $1
            ORDER BY position, id
            "#,
        )
        .bind(test_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn insert_answer(
        &self,
        user_id: Uuid,
        question_id: i32,
        rating: i16,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO csat_answers (question_id, user_id, rating, created_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING id
            "#,
        )
        .bind(question_id)
        .bind(user_id)
        .bind(rating)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn rating_counts(&self, test_id: i32) -> Result<Vec<RatingCount>, sqlx::Error> {
        sqlx::query_as::<_, RatingCount>(
            r#"
            SELECT a.question_id, a.rating, COUNT(*) AS answers
            FROM csat_answers a
            JOIN csat_questions q ON q.id = a.question_id
            WHERE q.test_id = $1
            GROUP BY a.question_id, a.rating
            "#,
        )
        .bind(test_id)
        .fetch_all(&self.pool)
        .await
    }
}
