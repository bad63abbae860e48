use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use validator::Validate;

use crate::agent::{AgentOutcome, ResearchAgent, ToolInfo};
use crate::aws::BedrockRuntime;
use crate::config::ModelConfig;
use crate::document::supported_formats;
use crate::llm::{
    ChatManager, DocumentAnswer, DocumentChatManager, EmbeddingGenerator, SummaryStyle,
};
use crate::providers::claude::claude::ClaudeProvider;
use crate::providers::titan::titan::{TitanProvider, EMBEDDING_DIMS};

const API_SYSTEM_MESSAGE: &str =
    "You are a helpful AI assistant. Provide clear, accurate and concise answers.";

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub enum ModelChoice {
    Claude,
    Titan,
}

impl Default for ModelChoice {
    fn default() -> Self {
        ModelChoice::Claude
    }
}

#[derive(Clone)]
pub struct AppState {
    chat: Arc<Mutex<ChatManager>>,
    active_model: Arc<Mutex<ModelChoice>>,
    doc_chat: Arc<Mutex<DocumentChatManager>>,
    agent: Arc<Mutex<ResearchAgent>>,
    claude: ClaudeProvider,
    titan: TitanProvider,
}

#[derive(Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1, max = 4000))]
    message: String,
    #[serde(default)]
    model: ModelChoice,
}

#[derive(Deserialize, Validate)]
pub struct GenerateRequest {
    #[validate(length(min = 1, max = 200))]
    topic: String,
    #[validate(length(min = 1, max = 100))]
    audience: String,
    #[serde(default = "default_tone")]
    tone: String,
}

fn default_tone() -> String {
    "informative".to_string()
}

#[derive(Deserialize, Validate)]
pub struct CodeRequest {
    #[validate(length(min = 1, max = 2000))]
    description: String,
    #[validate(length(min = 1, max = 50))]
    language: String,
}

#[derive(Deserialize, Validate)]
pub struct SummarizeRequest {
    #[validate(length(min = 1))]
    text: String,
    #[serde(default)]
    style: Option<String>,
}

#[derive(Deserialize, Validate)]
pub struct QuestionRequest {
    #[validate(length(min = 1, max = 2000))]
    question: String,
}

#[derive(Deserialize, Validate)]
pub struct AgentRequest {
    #[validate(length(min = 1, max = 2000))]
    query: String,
}

#[derive(Serialize)]
pub struct ChatResponse {
    response: String,
    tokens: TokenInfo,
}

#[derive(Serialize)]
pub struct TokenInfo {
    input: usize,
    response: usize,
    total: usize,
}

#[derive(Serialize)]
pub struct GenerateResponse {
    content: String,
}

#[derive(Serialize)]
pub struct SummaryResponse {
    summary: String,
}

#[derive(Serialize)]
pub struct UploadResponse {
    status: String,
    document: String,
    chunks: usize,
}

#[derive(Serialize)]
pub struct ToolListResponse {
    tools: Vec<ToolInfo>,
}

#[derive(Serialize)]
struct ApiResponse {
    status: String,
}

fn error_response(code: StatusCode, message: impl Into<String>) -> Response {
    (code, Json(ApiResponse { status: message.into() })).into_response()
}

fn upload_file_name(raw: &str) -> Option<String> {
    let name = std::path::Path::new(raw).file_name()?.to_str()?;
    if name.is_empty() {
        return None;
    }
    Some(name.to_string())
}

fn validation_error(e: validator::ValidationErrors) -> Response {
    error_response(StatusCode::BAD_REQUEST, format!("Invalid request: {}", e))
}

fn build_state(runtime: BedrockRuntime, models: &ModelConfig) -> AppState {
    let claude = ClaudeProvider::new(runtime.clone(), models, API_SYSTEM_MESSAGE.to_string());
    let titan = TitanProvider::new(runtime, models, API_SYSTEM_MESSAGE.to_string());

    let chat = ChatManager::new(Box::new(claude.clone()));
    let embeddings = EmbeddingGenerator::new(Box::new(titan.clone()));
    let doc_chat = DocumentChatManager::new(Box::new(claude.clone()), embeddings, EMBEDDING_DIMS);
    let agent = ResearchAgent::new(Box::new(claude.clone()));

    AppState {
        chat: Arc::new(Mutex::new(chat)),
        active_model: Arc::new(Mutex::new(ModelChoice::Claude)),
        doc_chat: Arc::new(Mutex::new(doc_chat)),
        agent: Arc::new(Mutex::new(agent)),
        claude,
        titan,
    }
}

/// Create and configure the API router.
pub fn create_api(runtime: BedrockRuntime, models: &ModelConfig) -> Router {
    let state = build_state(runtime, models);

    // Fully permissive CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/health", get(health_check))
        .route("/chat", post(chat_handler))
        .route("/generate", post(generate_handler))
        .route("/code", post(code_handler))
        .route("/summarize", post(summarize_handler))
        .route("/document/upload", post(document_upload_handler))
        .route("/document/ask", post(document_ask_handler))
        .route("/document/summary", get(document_summary_handler))
        .route("/document/clear", post(document_clear_handler))
        .route("/agent", post(agent_handler))
        .route("/agent/tools", get(agent_tools_handler))
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> Response {
    Json(ApiResponse {
        status: "Server is running and healthy".to_string(),
    })
    .into_response()
}

async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Response {
    if let Err(e) = request.validate() {
        return validation_error(e);
    }

    let input_tokens = request.message.split_whitespace().count();

    let mut chat = state.chat.lock().await;
    let mut active = state.active_model.lock().await;
    if *active != request.model {
        match request.model {
            ModelChoice::Claude => chat.switch_provider(Box::new(state.claude.clone())),
            ModelChoice::Titan => chat.switch_provider(Box::new(state.titan.clone())),
        }
        *active = request.model;
    }
    drop(active);

    match chat.chat(&request.message).await {
        Ok(response) => {
            let response_tokens = response.split_whitespace().count();
            Json(ChatResponse {
                response,
                tokens: TokenInfo {
                    input: input_tokens,
                    response: response_tokens,
                    total: input_tokens + response_tokens,
                },
            })
            .into_response()
        }
        Err(e) => {
            log::error!("chat failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, format!("AI error: {}", e))
        }
    }
}

async fn generate_handler(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Response {
    if let Err(e) = request.validate() {
        return validation_error(e);
    }

    let chat = state.chat.lock().await;
    match chat
        .generate_content(&request.topic, &request.audience, &request.tone)
        .await
    {
        Ok(content) => Json(GenerateResponse { content }).into_response(),
        Err(e) => {
            log::error!("content generation failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, format!("AI error: {}", e))
        }
    }
}

async fn code_handler(State(state): State<AppState>, Json(request): Json<CodeRequest>) -> Response {
    if let Err(e) = request.validate() {
        return validation_error(e);
    }

    let chat = state.chat.lock().await;
    match chat.generate_code(&request.description, &request.language).await {
        Ok(content) => Json(GenerateResponse { content }).into_response(),
        Err(e) => {
            log::error!("code generation failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, format!("AI error: {}", e))
        }
    }
}

async fn summarize_handler(
    State(state): State<AppState>,
    Json(request): Json<SummarizeRequest>,
) -> Response {
    if let Err(e) = request.validate() {
        return validation_error(e);
    }

    let style = match request.style.as_deref() {
        None => SummaryStyle::Standard,
        Some(s) => match SummaryStyle::parse(s) {
            Some(style) => style,
            None => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    format!("Unknown summary style: {}. Use brief, detailed or standard.", s),
                )
            }
        },
    };

    let chat = state.chat.lock().await;
    match chat.summarize(&request.text, style).await {
        Ok(summary) => Json(SummaryResponse { summary }).into_response(),
        Err(e) => {
            log::error!("summarization failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, format!("AI error: {}", e))
        }
    }
}

async fn document_upload_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Response {
    let mut file_name = None;
    let mut data = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    format!("Invalid multipart payload: {}", e),
                )
            }
        };

        if field.name() == Some("file") {
            file_name = field.file_name().map(|n| n.to_string());
            data = match field.bytes().await {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    return error_response(
                        StatusCode::BAD_REQUEST,
                        format!("Failed to read upload: {}", e),
                    )
                }
            };
        }
    }

    let (file_name, data) = match (file_name, data) {
        (Some(name), Some(data)) => (name, data),
        _ => return error_response(StatusCode::BAD_REQUEST, "Missing 'file' field"),
    };

    // Client-supplied names are reduced to their final component so they
    // cannot traverse out of the staging directory.
    let file_name = match upload_file_name(&file_name) {
        Some(name) => name,
        None => return error_response(StatusCode::BAD_REQUEST, "Invalid file name"),
    };

    let extension = std::path::Path::new(&file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    if !supported_formats().contains(&extension.as_str()) {
        return error_response(
            StatusCode::BAD_REQUEST,
            format!(
                "Unsupported file format: {}. Supported formats: {}",
                extension,
                supported_formats().join(", ")
            ),
        );
    }

    // Stage the upload on disk so the loader sees the original file name.
    let staging = match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(e) => {
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to stage upload: {}", e),
            )
        }
    };
    let staged_path = staging.path().join(&file_name);
    if let Err(e) = tokio::fs::write(&staged_path, &data).await {
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to stage upload: {}", e),
        );
    }

    let mut doc_chat = state.doc_chat.lock().await;
    match doc_chat.load_document(&staged_path).await {
        Ok(chunks) => Json(UploadResponse {
            status: "Document processed successfully".to_string(),
            document: file_name,
            chunks,
        })
        .into_response(),
        Err(e) => {
            log::error!("document processing failed: {}", e);
            error_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("Failed to process document: {}", e),
            )
        }
    }
}

async fn document_ask_handler(
    State(state): State<AppState>,
    Json(request): Json<QuestionRequest>,
) -> Response {
    if let Err(e) = request.validate() {
        return validation_error(e);
    }

    let mut doc_chat = state.doc_chat.lock().await;
    if doc_chat.current_document().is_none() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "No document has been processed. Please load a document first.",
        );
    }

    match doc_chat.ask(&request.question).await {
        Ok(answer) => Json::<DocumentAnswer>(answer).into_response(),
        Err(e) => {
            log::error!("document question failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, format!("AI error: {}", e))
        }
    }
}

async fn document_summary_handler(State(state): State<AppState>) -> Response {
    let doc_chat = state.doc_chat.lock().await;
    match doc_chat.summary().await {
        Ok(summary) => Json(SummaryResponse { summary }).into_response(),
        Err(e) => {
            log::error!("document summary failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, format!("AI error: {}", e))
        }
    }
}

async fn document_clear_handler(State(state): State<AppState>) -> Response {
    let mut doc_chat = state.doc_chat.lock().await;
    doc_chat.clear();
    Json(ApiResponse {
        status: "Document index cleared".to_string(),
    })
    .into_response()
}

async fn agent_handler(
    State(state): State<AppState>,
    Json(request): Json<AgentRequest>,
) -> Response {
    if let Err(e) = request.validate() {
        return validation_error(e);
    }

    let mut agent = state.agent.lock().await;
    let outcome = agent.research(&request.query).await;
    if outcome.success {
        Json::<AgentOutcome>(outcome).into_response()
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(outcome)).into_response()
    }
}

async fn agent_tools_handler(State(state): State<AppState>) -> Response {
    let agent = state.agent.lock().await;
    Json(ToolListResponse {
        tools: agent.available_tools(),
    })
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AwsConfig;

    fn test_state() -> AppState {
        let aws = AwsConfig {
            service_name: "bedrock-runtime".to_string(),
            region_name: "us-east-1".to_string(),
            access_key_id: "AKIDEXAMPLE".to_string(),
            secret_access_key: "secret".to_string(),
        };
        build_state(BedrockRuntime::new(&aws), &ModelConfig::from_env())
    }

    #[test]
    fn upload_names_are_reduced_to_final_component() {
        assert_eq!(upload_file_name("report.pdf").as_deref(), Some("report.pdf"));
        assert_eq!(
            upload_file_name("../../../tmp/escape.txt").as_deref(),
            Some("escape.txt")
        );
        assert_eq!(
            upload_file_name("nested/dir/notes.txt").as_deref(),
            Some("notes.txt")
        );
        assert_eq!(upload_file_name(".."), None);
        assert_eq!(upload_file_name(""), None);
        assert_eq!(upload_file_name("/"), None);
    }

    #[test]
    fn staged_uploads_stay_inside_the_staging_dir() {
        let dir = tempfile::tempdir().unwrap();
        let name = upload_file_name("../../../tmp/escape.txt").unwrap();
        let staged = dir.path().join(&name);
        assert!(staged.starts_with(dir.path()));
    }

    #[tokio::test]
    async fn asking_without_a_document_is_a_client_error() {
        let response = document_ask_handler(
            State(test_state()),
            Json(QuestionRequest {
                question: "what is this about?".to_string(),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
