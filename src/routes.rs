//! HTTP surface of the trivia game.
//!
//! | Method | Path | |
//! |---|---|---|
//! | GET | `/categories` | id → name of every category |
//! | GET | `/questions?page=N` | one page of all questions |
//! | POST | `/questions` | search (`searchTerm`) or create |
//! | DELETE | `/questions/{id}` | remove one question |
//! | GET | `/categories/{id}/questions?page=N` | one page of a category |
//! | POST | `/quizzes` | next unseen question for a quiz round |
//!
//! Store failures are logged and answered with the status each route has
//! always used, never with the underlying error.

use std::collections::BTreeMap;

use actix_cors::Cors;
use actix_web::{http::header, web, HttpRequest, HttpResponse, ResponseError};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde_derive::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    database::{Database, StoreError},
    error::AppError,
    models::{category_key, difficulty_value, NewQuestion, Question},
    pagination::{paginate, Page},
    quiz::{self, CategoryFilter, QuizRequest},
    search::filter_questions,
};

/// Clients address categories by their 0-based position in the `categories`
/// list of `GET /questions`, while stored ids start at 1.
pub const CATEGORY_PATH_OFFSET: i64 = 1;

/// Browser clients are served from another origin.
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST", "DELETE", "PATCH"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/categories", web::get().to(list_categories))
        .route(
            "/categories/{category_id}/questions",
            web::get().to(questions_by_category),
        )
        .route("/questions", web::get().to(list_questions))
        .route("/questions", web::post().to(search_or_create))
        .route("/questions/{question_id}", web::delete().to(delete_question))
        .route("/quizzes", web::post().to(play_quiz));
}

/// Fallback for every unknown route.
pub async fn not_found(req: HttpRequest) -> Result<HttpResponse, AppError> {
    debug!("No route for {} {}", req.method(), req.path());
    Err(AppError::NotFound)
}

// Payloads //
//////////////

#[derive(Serialize)]
struct CategoryMap {
    success: bool,
    categories: BTreeMap<i32, String>,
}

#[derive(Serialize)]
struct QuestionList<'a> {
    success: bool,
    questions: Vec<&'a Question>,
    total_questions: usize,
    current_category: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    categories: Option<Vec<&'a str>>,
}

#[derive(Serialize)]
struct Created {
    success: bool,
    question: i32,
}

#[derive(Serialize)]
struct Deleted {
    success: bool,
    deleted: i32,
}

#[derive(Serialize)]
struct QuizQuestion<'a> {
    success: bool,
    question: Option<&'a Question>,
}

/// `POST /questions` does either a search or a create, depending on
/// whether `searchTerm` is present.
#[derive(Deserialize, Debug)]
struct QuestionsBody {
    #[serde(rename = "searchTerm")]
    search_term: Option<String>,
    question: Option<String>,
    answer: Option<String>,
    category: Option<Value>,
    difficulty: Option<Value>,
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| {
        debug!("Rejected request body: {e}");
        AppError::BadRequest
    })
}

/// Logs the store failure and replaces it with the client-facing `kind`.
fn fail_with(kind: AppError) -> impl FnOnce(StoreError) -> AppError {
    move |e| {
        warn!("Store call failed, answering {}: {}", kind.status_code(), e);
        kind
    }
}

fn blank(text: &Option<String>) -> bool {
    text.as_deref().map_or(true, |t| t.trim().is_empty())
}

// Handlers //
//////////////

async fn list_categories(db: web::Data<Database>) -> Result<HttpResponse, AppError> {
    let categories = db
        .run(|store| store.list_categories())
        .await
        .map_err(fail_with(AppError::NotFound))?;

    Ok(HttpResponse::Ok().json(CategoryMap {
        success: true,
        categories: categories.into_iter().map(|c| (c.id, c.type_)).collect(),
    }))
}

async fn list_questions(
    req: HttpRequest,
    db: web::Data<Database>,
) -> Result<HttpResponse, AppError> {
    let page = Page::from_query_string(req.query_string());
    let (questions, categories) = db
        .run(|store| Ok((store.list_questions()?, store.list_categories()?)))
        .await
        .map_err(fail_with(AppError::NotFound))?;

    Ok(HttpResponse::Ok().json(QuestionList {
        success: true,
        questions: paginate(&questions, page).iter().collect(),
        total_questions: questions.len(),
        current_category: "",
        categories: Some(categories.iter().map(|c| c.type_.as_str()).collect()),
    }))
}

async fn search_or_create(
    body: web::Bytes,
    db: web::Data<Database>,
) -> Result<HttpResponse, AppError> {
    let body: QuestionsBody = parse_body(&body)?;

    if let Some(term) = body.search_term {
        return search(term, db).await;
    }

    if blank(&body.question) || blank(&body.answer) {
        debug!("Create rejected: question and answer are both required");
        return Err(AppError::BadRequest);
    }
    let (question, answer) = (body.question.unwrap_or_default(), body.answer.unwrap_or_default());
    let category = match body.category {
        Some(value) => Some(category_key(&value).ok_or_else(|| {
            debug!("Create rejected: unusable category {value}");
            AppError::BadRequest
        })?),
        None => None,
    };
    let difficulty = match body.difficulty {
        Some(value) => Some(difficulty_value(&value).ok_or_else(|| {
            debug!("Create rejected: unusable difficulty {value}");
            AppError::BadRequest
        })?),
        None => None,
    };

    let id = db
        .run(move |store| {
            store.insert_question(&NewQuestion {
                question: &question,
                answer: &answer,
                category: category.as_deref(),
                difficulty,
            })
        })
        .await
        .map_err(fail_with(AppError::Unprocessable))?;

    Ok(HttpResponse::Ok().json(Created {
        success: true,
        question: id,
    }))
}

async fn search(term: String, db: web::Data<Database>) -> Result<HttpResponse, AppError> {
    let questions = db
        .run(|store| store.list_questions())
        .await
        .map_err(fail_with(AppError::Unprocessable))?;
    let matches = filter_questions(&questions, &term);
    debug!("Search {term:?} matched {} questions", matches.len());

    Ok(HttpResponse::Ok().json(QuestionList {
        success: true,
        total_questions: matches.len(),
        questions: matches,
        current_category: "",
        categories: None,
    }))
}

async fn delete_question(
    path: web::Path<String>,
    db: web::Data<Database>,
) -> Result<HttpResponse, AppError> {
    let raw = path.into_inner();
    let id: i32 = raw.trim().parse().map_err(|_| {
        debug!("Delete rejected: {raw:?} is not a question id");
        AppError::NotFound
    })?;

    let deleted = db
        .run(move |store| store.delete_question(id))
        .await
        .map_err(|e| match e {
            StoreError::NotFound => {
                debug!("Delete rejected: no question {id}");
                AppError::NotFound
            }
            e => fail_with(AppError::NotFound)(e),
        })?;

    Ok(HttpResponse::Ok().json(Deleted {
        success: true,
        deleted,
    }))
}

async fn questions_by_category(
    req: HttpRequest,
    path: web::Path<String>,
    db: web::Data<Database>,
) -> Result<HttpResponse, AppError> {
    let raw = path.into_inner();
    let id = raw
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(|position| position.checked_add(CATEGORY_PATH_OFFSET))
        .and_then(|id| i32::try_from(id).ok())
        .ok_or_else(|| {
            debug!("Category listing rejected: {raw:?} is not a category position");
            AppError::BadRequest
        })?;
    let page = Page::from_query_string(req.query_string());

    let (questions, category) = db
        .run(move |store| {
            Ok((
                store.questions_in_category(&id.to_string())?,
                store.find_category(id)?,
            ))
        })
        .await
        .map_err(fail_with(AppError::BadRequest))?;

    let category = category.ok_or_else(|| {
        debug!("Category listing rejected: no category {id}");
        AppError::BadRequest
    })?;

    Ok(HttpResponse::Ok().json(QuestionList {
        success: true,
        questions: paginate(&questions, page).iter().collect(),
        total_questions: questions.len(),
        current_category: &category.type_,
        categories: None,
    }))
}

async fn play_quiz(body: web::Bytes, db: web::Data<Database>) -> Result<HttpResponse, AppError> {
    let request: QuizRequest = parse_body(&body)?;
    let category = request.quiz_category.ok_or_else(|| {
        debug!("Quiz rejected: no quiz_category");
        AppError::BadRequest
    })?;
    let filter = CategoryFilter::from_id(&category.id).ok_or_else(|| {
        debug!("Quiz rejected: unusable category id {}", category.id);
        AppError::BadRequest
    })?;
    let served = request.previous_questions.unwrap_or_default();
    debug!(
        "Quiz round in {:?} ({}), {} served",
        filter,
        category.type_.as_deref().unwrap_or("?"),
        served.len()
    );

    let pool = db
        .run(move |store| store.quiz_pool(&filter))
        .await
        .map_err(fail_with(AppError::NotFound))?;
    let question = quiz::pick(&pool, &served, &mut rand::thread_rng()).question();

    Ok(HttpResponse::Ok().json(QuizQuestion {
        success: true,
        question,
    }))
}
