use error_types::{DatabaseError, ServiceError, ServiceResult};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::{Question, Test, TestStatistics, TestSummary};
use crate::repository::CsatRepository;
use crate::statistics::summarize;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

pub fn check_rating(rating: i32) -> ServiceResult<i16> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(rating as i16)
    } else {
        Err(ServiceError::invalid_input(format!(
            "rating must be between {} and {}",
            MIN_RATING, MAX_RATING
        )))
    }
}

pub struct CsatService {
    repo: CsatRepository,
}

impl CsatService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repo: CsatRepository::new(pool),
        }
    }

    pub async fn list_tests(&self) -> ServiceResult<Vec<TestSummary>> {
        Ok(self.repo.list_tests().await?)
    }

    pub async fn get_test(&self, test_id: i32) -> ServiceResult<(Test, Vec<Question>)> {
        let test = self
            .repo
            .find_test(test_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("test"))?;
        let questions = self.repo.questions(test_id).await?;
        Ok((test, questions))
    }

    pub async fn submit_answer(
        &self,
        user_id: Uuid,
        question_id: i32,
        rating: i32,
    ) -> ServiceResult<i64> {
        let rating = check_rating(rating)?;
        let answer_id = self
            .repo
            .insert_answer(user_id, question_id, rating)
            .await
            .map_err(|e| match DatabaseError::from(e) {
                err if err.is_foreign_key_violation() => match err.constraint() {
                    Some(c) if c.contains("user") => ServiceError::not_found("user"),
                    _ => ServiceError::not_found("question"),
                },
                err => ServiceError::from(err),
            })?;

        info!(
            event = "csat_answer_submitted",
            user_id = %user_id,
            question_id,
            rating
        );
        Ok(answer_id)
    }

    pub async fn statistics(&self, test_id: i32) -> ServiceResult<TestStatistics> {
        let (test, questions) = self.get_test(test_id).await?;
        let counts = self.repo.rating_counts(test_id).await?;
        Ok(TestStatistics {
            test,
            questions: summarize(questions, &counts),
        })
    }
}
