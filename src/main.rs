mod document;
mod error;
mod gemini;
mod knowledge;

use crate::document::pdf::extract_text;
use crate::error::Error;
use crate::gemini::Gemini;
use crate::knowledge::session::{Session, SummaryPair, UPLOAD_PROMPT};
use anyhow::Result;
use dotenv::dotenv;
use env_logger::Builder;
use futures_util::stream::TryStreamExt;
use lazy_static::lazy_static;
use log::LevelFilter;
use pdfium_render::prelude::Pdfium;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use warp::{multipart::FormData, Buf, Filter, Rejection, Reply};

#[macro_use]
extern crate log;

lazy_static! {
    static ref REQUEST_TIMEOUT_SECS: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(120);
    static ref GENERATION_MODEL: String =
        std::env::var("GENERATION_MODEL").unwrap_or_else(|_| "gemini-1.5-flash".to_string());
    static ref EMBEDDING_MODEL: String =
        std::env::var("EMBEDDING_MODEL").unwrap_or_else(|_| "embedding-001".to_string());
}

#[derive(Deserialize, Serialize)]
struct AskRequest {
    question: String,
}

#[derive(Serialize)]
struct AskResponse {
    answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notice: Option<&'static str>,
}

#[derive(Serialize)]
struct UploadResponse {
    summaries: SummaryPair,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // read .env
    dotenv().ok();

    // init logger
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    if log_level == "debug" {
        Builder::new()
            .filter(None, LevelFilter::Off)
            .filter(Some("pdfchat::knowledge"), LevelFilter::Debug)
            .filter(Some("pdfchat"), LevelFilter::Debug)
            .init();
    } else if log_level == "info" {
        Builder::new()
            .filter(None, LevelFilter::Off)
            .filter(Some("pdfchat::knowledge"), LevelFilter::Info)
            .filter(Some("pdfchat"), LevelFilter::Info)
            .init();
    } else {
        env_logger::init();
    }

    // check dependencies
    Pdfium::bind_to_library("./libpdfium.so")
        .map_err(|e| anyhow::anyhow!("failed to bind pdfium: {:?}", e))?;
    info!("dependencies check succeed");

    // a missing key is reported on the first interaction, not at startup
    let gemini = match Gemini::from_env() {
        Ok(client) => Some(client),
        Err(e) => {
            warn!("gemini client unavailable: {}", e);
            None
        }
    };
    let session = Arc::new(Session::new(gemini));
    let session_for_upload = Arc::clone(&session);

    let index_route = warp::path::end().and(warp::get()).and_then(index);

    let upload_route = warp::path("upload")
        .and(warp::post())
        .and(warp::multipart::form().max_length(64 * 1024 * 1024))
        .and(warp::any().map(move || Arc::clone(&session_for_upload)))
        .and_then(handle_upload);

    let ask_route = warp::path("ask")
        .and(warp::post())
        .and(warp::body::json())
        .and(warp::any().map(move || Arc::clone(&session)))
        .and_then(handle_ask);

    let routes = index_route.or(upload_route).or(ask_route);

    info!("server running at port: 8080");
    warp::serve(routes).run(([0, 0, 0, 0], 8080)).await;

    Ok(())
}

async fn index() -> Result<impl Reply, Rejection> {
    let index_html = include_str!("../index.html");
    Ok(warp::reply::html(index_html))
}

async fn handle_upload(form: FormData, session: Arc<Session>) -> Result<impl Reply, Infallible> {
    let bytes = match read_upload(form).await {
        Some(bytes) => bytes,
        None => {
            info!("get upload request without a file part");
            return Ok(reply_error(Error::Extraction(
                "no file found in upload".to_string(),
            )));
        }
    };
    info!("get upload request: {} bytes", bytes.len());

    match process_upload(bytes, session).await {
        Ok(summaries) => Ok(warp::reply::json(&UploadResponse { summaries })),
        Err(e) => {
            warn!("handle upload request failed: {}", e);
            Ok(reply_error(e))
        }
    }
}

async fn process_upload(bytes: Vec<u8>, session: Arc<Session>) -> Result<SummaryPair, Error> {
    let text = extract_text(&bytes)?;
    session.ingest(text).await
}

async fn handle_ask(request: AskRequest, session: Arc<Session>) -> Result<impl Reply, Infallible> {
    let question = request.question.trim().to_string();
    info!("get ask request: {:?}", question);

    if question.is_empty() {
        return Ok(warp::reply::json(&AskResponse {
            answer: None,
            notice: None,
        }));
    }

    match session.ask(&question).await {
        Ok(Some(answer)) => Ok(warp::reply::json(&AskResponse {
            answer: Some(answer),
            notice: None,
        })),
        Ok(None) => Ok(warp::reply::json(&AskResponse {
            answer: None,
            notice: Some(UPLOAD_PROMPT),
        })),
        Err(e) => {
            warn!("handle ask request failed: {}", e);
            Ok(reply_error(e))
        }
    }
}

fn reply_error(e: Error) -> warp::reply::Json {
    warp::reply::json(&ErrorResponse {
        error: e.user_message(),
    })
}

async fn read_upload(form: FormData) -> Option<Vec<u8>> {
    let mut stream = form.into_stream();

    while let Ok(Some(part)) = stream.try_next().await {
        if part.filename().is_some() {
            let mut bytes = Vec::new();
            let mut part_stream = part.stream();
            while let Ok(Some(mut chunk)) = part_stream.try_next().await {
                while chunk.has_remaining() {
                    let piece = chunk.chunk();
                    bytes.extend_from_slice(piece);
                    let advanced = piece.len();
                    chunk.advance(advanced);
                }
            }
            return Some(bytes);
        }
    }
    None
}
