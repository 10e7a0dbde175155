use actix_web::{get, post, web, HttpResponse};
use validator::Validate;

use crate::clients::proto::csat::{
    GetStatisticsRequest, GetTestRequest, ListTestsRequest, SubmitAnswerRequest,
};
use crate::clients::ServiceClients;
use crate::error::Result;
use crate::middleware::AuthenticatedUser;
use crate::models::AnswerBody;

#[get("/csat/tests")]
pub async fn list_tests(clients: web::Data<ServiceClients>) -> Result<HttpResponse> {
    let resp = clients
        .csat_client()
        .list_tests(ListTestsRequest {})
        .await?
        .into_inner();
    Ok(HttpResponse::Ok().json(resp))
}

#[get("/csat/tests/{id}")]
pub async fn get_test(
    clients: web::Data<ServiceClients>,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    let resp = clients
        .csat_client()
        .get_test(GetTestRequest {
            test_id: path.into_inner(),
        })
        .await?
        .into_inner();
    Ok(HttpResponse::Ok().json(resp.test))
}

#[get("/csat/tests/{id}/statistics")]
pub async fn statistics(
    clients: web::Data<ServiceClients>,
    _user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    let resp = clients
        .csat_client()
        .get_statistics(GetStatisticsRequest {
            test_id: path.into_inner(),
        })
        .await?
        .into_inner();
    Ok(HttpResponse::Ok().json(resp))
}

#[post("/csat/answers")]
pub async fn submit_answer(
    clients: web::Data<ServiceClients>,
    user: AuthenticatedUser,
    body: web::Json<AnswerBody>,
) -> Result<HttpResponse> {
    body.validate()?;
    let resp = clients
        .csat_client()
        .submit_answer(SubmitAnswerRequest {
            user_id: user.0.to_string(),
            question_id: body.question_id,
            rating: body.rating,
        })
        .await?
        .into_inner();
    Ok(HttpResponse::Created().json(resp))
}
