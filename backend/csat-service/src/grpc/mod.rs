use tonic::{Request, Response, Status};
use uuid::Uuid;

use crate::service::CsatService;

pub mod csat {
    tonic::include_proto!("eventhub.csat_service.v1");
}

use csat::csat_service_server::CsatService as CsatServiceRpc;
use csat::*;

pub struct CsatServiceImpl {
    service: CsatService,
}

impl CsatServiceImpl {
    pub fn new(service: CsatService) -> Self {
        Self { service }
    }
}

#[tonic::async_trait]
impl CsatServiceRpc for CsatServiceImpl {
    async fn list_tests(
        &self,
        _request: Request<ListTestsRequest>,
    ) -> Result<Response<ListTestsResponse>, Status> {
        let tests = self
            .service
            .list_tests()
            .await?
            .into_iter()
            .map(|t| TestSummary {
                id: t.id,
                title: t.title,
                question_count: t.question_count as i32,
            })
            .collect();
        Ok(Response::new(ListTestsResponse { tests }))
    }

    async fn get_test(
        &self,
        request: Request<GetTestRequest>,
    ) -> Result<Response<GetTestResponse>, Status> {
        let req = request.into_inner();
        let (test, questions) = self.service.get_test(req.test_id).await?;
        Ok(Response::new(GetTestResponse {
            test: Some(Test {
                id: test.id,
                title: test.title,
                questions: questions
                    .into_iter()
                    .map(|q| Question {
                        id: q.id,
                        text: q.text,
                        position: q.position,
                    })
                    .collect(),
            }),
        }))
    }

    async fn submit_answer(
        &self,
        request: Request<SubmitAnswerRequest>,
    ) -> Result<Response<SubmitAnswerResponse>, Status> {
        let req = request.into_inner();
        let user_id = Uuid::parse_str(&req.user_id)
            .map_err(|_| Status::invalid_argument("invalid user_id"))?;
        let answer_id = self
            .service
            .submit_answer(user_id, req.question_id, req.rating)
            .await?;
        Ok(Response::new(SubmitAnswerResponse { answer_id }))
    }

    async fn get_statistics(
        &self,
        request: Request<GetStatisticsRequest>,
    ) -> Result<Response<GetStatisticsResponse>, Status> {
        let req = request.into_inner();
        let stats = self.service.statistics(req.test_id).await?;
        Ok(Response::new(GetStatisticsResponse {
            test_id: stats.test.id,
            title: stats.test.title,
            questions: stats
                .questions
                .into_iter()
                .map(|q| QuestionStatistics {
                    question_id: q.question_id,
                    text: q.text,
                    answers: q.answers,
                    average: q.average,
                    distribution: q.distribution.to_vec(),
                })
                .collect(),
        }))
    }
}
