//! File manager agent
//!
//! Conversational front end over the `list_files` tool: each call opens a
//! fresh session, asks the agent to list the store's files, and joins the
//! text the agent streams back into one reply.

use std::sync::Arc;

use futures::StreamExt;
use thiserror::Error;

use crate::agent::{AgentConfig, StandardAgent};
use crate::config::FileManagerConfig;
use crate::core::FrameworkError;
use crate::files::{FileProvider, StoreNameCache};
use crate::llm::{LlmProvider, Message};
use crate::prompts::FileManagerPrompts;
use crate::runtime::{EventStream, Runner};
use crate::session::{InMemorySessionService, SessionService};
use crate::tools::{ListFilesTool, ToolRegistry};

/// Failure of a file listing request
#[derive(Debug, Error)]
pub enum ResponderError {
    /// Session could not be created
    #[error("{0}")]
    Session(#[from] FrameworkError),

    /// The agent run failed to start or broke off mid-stream
    #[error("{0:#}")]
    Run(anyhow::Error),
}

/// Agent answering "which files did I upload?" for one store
pub struct FileManagerAgent {
    store_name: String,
    app_name: String,
    prompts: FileManagerPrompts,
    agent: Arc<StandardAgent>,
    session_service: Arc<dyn SessionService>,
    runner: Runner,
}

impl FileManagerAgent {
    /// Build the agent for `store_name`
    ///
    /// The `list_files` tool is bound to the store and resolves it through
    /// `cache`. Sessions live in an [`InMemorySessionService`] unless
    /// replaced with [`with_session_service`](Self::with_session_service).
    pub fn new(
        store_name: impl Into<String>,
        cache: Arc<StoreNameCache>,
        llm: Arc<dyn LlmProvider>,
        files: Arc<dyn FileProvider>,
        config: &FileManagerConfig,
    ) -> Self {
        let store_name = store_name.into();

        let mut tools = ToolRegistry::new();
        tools.register(ListFilesTool::new(store_name.clone(), cache, files));

        let agent_config = AgentConfig::new(config.app_name.clone(), config.prompts.instruction.clone())
            .with_description(config.prompts.description.clone())
            .with_tools(Arc::new(tools))
            .with_max_tool_iterations(config.max_tool_iterations)
            .with_streaming(config.streaming);
        let agent = Arc::new(StandardAgent::new(agent_config, llm));

        let session_service: Arc<dyn SessionService> = Arc::new(InMemorySessionService::new());
        let runner = Runner::new(config.app_name.clone(), Arc::clone(&agent), Arc::clone(&session_service));

        Self {
            store_name,
            app_name: config.app_name.clone(),
            prompts: config.prompts.clone(),
            agent,
            session_service,
            runner,
        }
    }

    /// Use a different session service
    pub fn with_session_service(mut self, session_service: Arc<dyn SessionService>) -> Self {
        self.runner = Runner::new(self.app_name.clone(), Arc::clone(&self.agent), Arc::clone(&session_service));
        self.session_service = session_service;
        self
    }

    /// Ask the agent to list the store's files
    ///
    /// Returns the agent's text fragments joined by newlines, or the empty
    /// reply when the run produced no text.
    pub async fn handle_list_files(&self) -> Result<String, ResponderError> {
        let user_id = format!("user_{}", self.store_name);
        let session_id = format!("list_files_{}", uuid::Uuid::new_v4());

        let session = self
            .session_service
            .create_session(&self.app_name, &user_id, Some(&session_id))
            .await?;
        tracing::info!("[FileManager] Listing files of '{}' in session {}", self.store_name, session.id);

        let result = self.run_session(&user_id, &session.id).await;

        if let Err(e) = self
            .session_service
            .delete_session(&self.app_name, &user_id, &session.id)
            .await
        {
            tracing::warn!("[FileManager] Failed to delete session {}: {}", session.id, e);
        }

        let fragments = result?;
        if fragments.is_empty() {
            tracing::info!("[FileManager] Agent produced no text");
            return Ok(self.prompts.empty_reply.clone());
        }
        Ok(fragments.join("\n"))
    }

    /// Like [`handle_list_files`](Self::handle_list_files) but always
    /// returns something to show the user
    pub async fn reply(&self) -> String {
        match self.handle_list_files().await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("[FileManager] Listing files failed: {:?}", e);
                self.prompts.error_reply(&e)
            }
        }
    }

    async fn run_session(&self, user_id: &str, session_id: &str) -> Result<Vec<String>, ResponderError> {
        let message = Message::user(self.prompts.list_files_request.clone());
        let stream = self
            .runner
            .run_async(user_id, session_id, message)
            .await
            .map_err(|e| ResponderError::Run(e.into()))?;

        collect_text(stream).await.map_err(ResponderError::Run)
    }
}

/// Drain an event stream into its text fragments, in arrival order
async fn collect_text(mut stream: EventStream) -> anyhow::Result<Vec<String>> {
    let mut fragments = Vec::new();
    while let Some(event) = stream.next().await {
        let event = event?;
        fragments.extend(event.text_fragments().into_iter().map(str::to_string));
    }
    Ok(fragments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FrameworkResult;
    use crate::files::{FileRecord, StaticFileProvider};
    use crate::llm::{
        ContentBlock, ContentBlockDeltaEvent, ContentBlockStart, ContentBlockStartEvent,
        ContentBlockStopEvent, ContentDelta, LlmEventStream, MessageDeltaEvent, MessageResponse,
        StopReason, StreamEvent, SystemPrompt, ToolChoice, ToolDefinition, Usage,
    };
    use crate::session::{Event, Session, SessionKey};
    use anyhow::Result;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    /// Calls `list_files` first, then talks about whatever it returned
    struct ChattyLlm;

    #[async_trait::async_trait]
    impl LlmProvider for ChattyLlm {
        async fn send_with_tools_and_system(
            &self,
            messages: Vec<Message>,
            _system: Option<SystemPrompt>,
            tools: Vec<ToolDefinition>,
            _tool_choice: Option<ToolChoice>,
            _session_id: Option<&str>,
        ) -> Result<MessageResponse> {
            let tool_output = messages
                .last()
                .and_then(|m| m.blocks())
                .and_then(|blocks| {
                    blocks.iter().find_map(|b| match b {
                        ContentBlock::ToolResult { content, .. } => content.clone(),
                        _ => None,
                    })
                });

            let (content, stop_reason) = match tool_output {
                Some(output) => (
                    vec![ContentBlock::text(format!("你上傳了這些檔案：{}", output))],
                    StopReason::EndTurn,
                ),
                None => {
                    assert!(tools.iter().any(|t| t.name == "list_files"));
                    (
                        vec![ContentBlock::tool_use("call_1", "list_files", json!({}))],
                        StopReason::ToolUse,
                    )
                }
            };

            Ok(MessageResponse {
                id: "resp".to_string(),
                role: "assistant".to_string(),
                content,
                model: "chatty".to_string(),
                stop_reason: Some(stop_reason),
                usage: Usage::default(),
            })
        }

        async fn stream_with_tools_and_system(
            &self,
            _messages: Vec<Message>,
            _system: Option<SystemPrompt>,
            _tools: Vec<ToolDefinition>,
            _tool_choice: Option<ToolChoice>,
            _session_id: Option<&str>,
        ) -> Result<LlmEventStream> {
            anyhow::bail!("streaming not supported")
        }

        fn model(&self) -> String {
            "chatty".to_string()
        }

        fn provider_name(&self) -> &str {
            "chatty"
        }
    }

    /// Streaming twin of `ChattyLlm`: answers as SSE-style event sequences
    struct StreamingLlm;

    impl StreamingLlm {
        fn turn(blocks: Vec<(ContentBlockStart, Vec<ContentDelta>)>, stop_reason: StopReason) -> Vec<StreamEvent> {
            let mut events = Vec::new();
            for (index, (start, deltas)) in blocks.into_iter().enumerate() {
                events.push(StreamEvent::ContentBlockStart(ContentBlockStartEvent {
                    index,
                    content_block: start,
                }));
                for delta in deltas {
                    events.push(StreamEvent::ContentBlockDelta(ContentBlockDeltaEvent { index, delta }));
                }
                events.push(StreamEvent::ContentBlockStop(ContentBlockStopEvent { index }));
            }
            events.push(StreamEvent::MessageDelta(MessageDeltaEvent {
                stop_reason: Some(stop_reason),
                output_tokens: 0,
            }));
            events.push(StreamEvent::MessageStop);
            events
        }
    }

    #[async_trait::async_trait]
    impl LlmProvider for StreamingLlm {
        async fn send_with_tools_and_system(
            &self,
            _messages: Vec<Message>,
            _system: Option<SystemPrompt>,
            _tools: Vec<ToolDefinition>,
            _tool_choice: Option<ToolChoice>,
            _session_id: Option<&str>,
        ) -> Result<MessageResponse> {
            anyhow::bail!("only streaming is scripted")
        }

        async fn stream_with_tools_and_system(
            &self,
            messages: Vec<Message>,
            system: Option<SystemPrompt>,
            _tools: Vec<ToolDefinition>,
            _tool_choice: Option<ToolChoice>,
            _session_id: Option<&str>,
        ) -> Result<LlmEventStream> {
            assert!(system.is_some_and(|s| s.text().contains("list_files")));

            let tool_output = messages.last().and_then(|m| m.blocks()).and_then(|blocks| {
                blocks.iter().find_map(|b| match b {
                    ContentBlock::ToolResult { content, .. } => content.clone(),
                    _ => None,
                })
            });

            let events = match tool_output {
                Some(output) => Self::turn(
                    vec![(
                        ContentBlockStart::Text,
                        vec![
                            ContentDelta::TextDelta { text: "你上傳了".to_string() },
                            ContentDelta::TextDelta { text: output },
                        ],
                    )],
                    StopReason::EndTurn,
                ),
                None => Self::turn(
                    vec![
                        (
                            ContentBlockStart::Text,
                            vec![ContentDelta::TextDelta { text: "我來查查看".to_string() }],
                        ),
                        (
                            ContentBlockStart::ToolUse {
                                id: "call_1".to_string(),
                                name: "list_files".to_string(),
                                signature: None,
                            },
                            vec![ContentDelta::InputJsonDelta { partial_json: "{}".to_string() }],
                        ),
                    ],
                    StopReason::ToolUse,
                ),
            };

            let items: Vec<Result<StreamEvent>> = events.into_iter().map(Ok).collect();
            Ok(Box::pin(futures::stream::iter(items)))
        }

        fn model(&self) -> String {
            "streaming".to_string()
        }

        fn provider_name(&self) -> &str {
            "streaming"
        }
    }

    /// Replies with fixed turns, one per call
    struct FixedLlm {
        turns: std::sync::Mutex<Vec<Vec<ContentBlock>>>,
    }

    impl FixedLlm {
        fn new(mut turns: Vec<Vec<ContentBlock>>) -> Self {
            turns.reverse();
            Self {
                turns: std::sync::Mutex::new(turns),
            }
        }
    }

    #[async_trait::async_trait]
    impl LlmProvider for FixedLlm {
        async fn send_with_tools_and_system(
            &self,
            _messages: Vec<Message>,
            _system: Option<SystemPrompt>,
            _tools: Vec<ToolDefinition>,
            _tool_choice: Option<ToolChoice>,
            _session_id: Option<&str>,
        ) -> Result<MessageResponse> {
            let content = match self.turns.lock().unwrap().pop() {
                Some(content) => content,
                None => anyhow::bail!("model unavailable"),
            };
            Ok(MessageResponse {
                id: "resp".to_string(),
                role: "assistant".to_string(),
                content,
                model: "fixed".to_string(),
                stop_reason: Some(StopReason::EndTurn),
                usage: Usage::default(),
            })
        }

        async fn stream_with_tools_and_system(
            &self,
            _messages: Vec<Message>,
            _system: Option<SystemPrompt>,
            _tools: Vec<ToolDefinition>,
            _tool_choice: Option<ToolChoice>,
            _session_id: Option<&str>,
        ) -> Result<LlmEventStream> {
            anyhow::bail!("streaming not supported")
        }

        fn model(&self) -> String {
            "fixed".to_string()
        }

        fn provider_name(&self) -> &str {
            "fixed"
        }
    }

    /// Session service that is always down
    struct OfflineSessionService;

    #[async_trait::async_trait]
    impl SessionService for OfflineSessionService {
        async fn create_session(
            &self,
            _app_name: &str,
            _user_id: &str,
            _session_id: Option<&str>,
        ) -> FrameworkResult<Session> {
            Err(FrameworkError::storage("session store offline"))
        }

        async fn get_session(&self, _app_name: &str, _user_id: &str, id: &str) -> FrameworkResult<Session> {
            Err(FrameworkError::SessionNotFound(id.to_string()))
        }

        async fn append_event(&self, _session: &SessionKey, _event: Event) -> FrameworkResult<()> {
            Err(FrameworkError::storage("session store offline"))
        }

        async fn delete_session(&self, _app_name: &str, _user_id: &str, id: &str) -> FrameworkResult<()> {
            Err(FrameworkError::SessionNotFound(id.to_string()))
        }

        async fn list_sessions(&self, _app_name: &str, _user_id: &str) -> FrameworkResult<Vec<Session>> {
            Ok(Vec::new())
        }
    }

    fn store_cache() -> Arc<StoreNameCache> {
        let mut cache = StoreNameCache::new();
        cache.insert("docs".to_string(), "fileSearchStores/store_123".to_string());
        Arc::new(cache)
    }

    fn report_files() -> Arc<dyn FileProvider> {
        Arc::new(StaticFileProvider::new(vec![FileRecord::new(
            "report.pdf",
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        )]))
    }

    fn agent_with(llm: Arc<dyn LlmProvider>) -> FileManagerAgent {
        FileManagerAgent::new("docs", store_cache(), llm, report_files(), &FileManagerConfig::default())
    }

    #[tokio::test]
    async fn test_lists_uploaded_file() {
        let reply = agent_with(Arc::new(ChattyLlm)).handle_list_files().await.unwrap();
        assert!(reply.contains("report.pdf"));
        assert_ne!(reply, "目前沒有找到任何檔案唷！");
    }

    #[tokio::test]
    async fn test_streaming_run_lists_uploaded_file() {
        let config = FileManagerConfig {
            streaming: true,
            ..FileManagerConfig::default()
        };
        let sessions = Arc::new(InMemorySessionService::new());
        let agent = FileManagerAgent::new("docs", store_cache(), Arc::new(StreamingLlm), report_files(), &config)
            .with_session_service(sessions.clone());

        let reply = agent.handle_list_files().await.unwrap();
        let lines: Vec<&str> = reply.lines().collect();
        assert_eq!(lines[0], "我來查查看");
        assert!(lines[1].starts_with("你上傳了"));
        assert!(lines[1].contains("report.pdf"));
        assert!(sessions.is_empty().await);
    }

    #[test]
    fn test_agent_carries_prompt_description() {
        let agent = agent_with(Arc::new(ChattyLlm));
        assert_eq!(
            agent.agent.config().description,
            "檔案管理助手，幫助使用者查看和管理已上傳的文件。"
        );
    }

    #[tokio::test]
    async fn test_no_text_gives_empty_reply() {
        let llm = Arc::new(FixedLlm::new(vec![Vec::new()]));
        let reply = agent_with(llm).handle_list_files().await.unwrap();
        assert_eq!(reply, "目前沒有找到任何檔案唷！");
    }

    #[tokio::test]
    async fn test_fragments_joined_in_order() {
        let llm = Arc::new(FixedLlm::new(vec![
            vec![
                ContentBlock::text("a"),
                ContentBlock::tool_use("call_1", "list_files", json!({})),
            ],
            vec![ContentBlock::text("b"), ContentBlock::text(""), ContentBlock::text("c")],
        ]));
        let reply = agent_with(llm).handle_list_files().await.unwrap();
        assert_eq!(reply, "a\nb\nc");
    }

    #[tokio::test]
    async fn test_session_failure_becomes_apology() {
        let agent = agent_with(Arc::new(ChattyLlm)).with_session_service(Arc::new(OfflineSessionService));

        let err = agent.handle_list_files().await.unwrap_err();
        assert!(matches!(err, ResponderError::Session(_)));

        let reply = agent.reply().await;
        assert!(reply.starts_with("查詢檔案時發生了一點問題："));
        assert!(reply.contains("session store offline"));
    }

    #[tokio::test]
    async fn test_model_failure_is_run_error() {
        let sessions = Arc::new(InMemorySessionService::new());
        let agent = agent_with(Arc::new(FixedLlm::new(Vec::new()))).with_session_service(sessions.clone());

        let err = agent.handle_list_files().await.unwrap_err();
        assert!(matches!(err, ResponderError::Run(_)));
        assert!(err.to_string().contains("model unavailable"));
        assert!(sessions.is_empty().await);
    }

    #[tokio::test]
    async fn test_sessions_removed_after_each_call() {
        let sessions = Arc::new(InMemorySessionService::new());
        let agent = agent_with(Arc::new(ChattyLlm)).with_session_service(sessions.clone());

        agent.handle_list_files().await.unwrap();
        agent.handle_list_files().await.unwrap();
        assert!(sessions.is_empty().await);
    }

    #[tokio::test]
    async fn test_concurrent_calls_do_not_collide() {
        let agent = agent_with(Arc::new(ChattyLlm));
        let (first, second) = tokio::join!(agent.handle_list_files(), agent.handle_list_files());
        assert!(first.unwrap().contains("report.pdf"));
        assert!(second.unwrap().contains("report.pdf"));
    }
}
