//! Runner
//!
//! Drives a [`StandardAgent`] against a stored session: records the caller's
//! message, calls the model, runs requested tools and feeds their results
//! back until the model produces a turn without tool calls. Every model turn
//! and every batch of tool results is appended to the session and yielded as
//! an [`Event`].

use std::pin::Pin;
use std::sync::Arc;

use futures::Stream;

use crate::agent::StandardAgent;
use crate::core::FrameworkResult;
use crate::llm::Message;
use crate::session::{Event, SessionService, USER_AUTHOR};

/// Ordered stream of events produced by one run
pub type EventStream = Pin<Box<dyn Stream<Item = anyhow::Result<Event>> + Send>>;

/// Runs an agent over sessions held by a [`SessionService`]
pub struct Runner {
    app_name: String,
    agent: Arc<StandardAgent>,
    session_service: Arc<dyn SessionService>,
}

impl Runner {
    pub fn new(
        app_name: impl Into<String>,
        agent: Arc<StandardAgent>,
        session_service: Arc<dyn SessionService>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            agent,
            session_service,
        }
    }

    pub fn session_service(&self) -> &Arc<dyn SessionService> {
        &self.session_service
    }

    /// Run the agent on `new_message` within an existing session
    ///
    /// Fails up front if the session does not exist. Errors raised while the
    /// agent runs (model failures, storage failures) end the stream with an
    /// `Err` item after any events already produced.
    pub async fn run_async(
        &self,
        user_id: &str,
        session_id: &str,
        new_message: Message,
    ) -> FrameworkResult<EventStream> {
        let session = self
            .session_service
            .get_session(&self.app_name, user_id, session_id)
            .await?;
        let key = session.key();
        let invocation_id = format!("inv_{}", uuid::Uuid::new_v4().simple());

        tracing::info!(
            "[Runner] Starting invocation {} of agent '{}' ({}) on session {}",
            invocation_id,
            self.agent.name(),
            self.agent.config().description,
            key
        );

        self.session_service
            .append_event(&key, Event::new(invocation_id.as_str(), USER_AUTHOR, new_message))
            .await?;

        let agent = Arc::clone(&self.agent);
        let sessions = Arc::clone(&self.session_service);
        let max_iterations = agent.config().max_tool_iterations;

        let stream = async_stream::try_stream! {
            let mut iteration = 0;

            loop {
                iteration += 1;
                if iteration > max_iterations {
                    tracing::warn!(
                        "[Runner] Reached max tool iterations ({}) for {}",
                        max_iterations,
                        invocation_id
                    );
                    break;
                }

                let history = sessions
                    .get_session(&key.app_name, &key.user_id, &key.session_id)
                    .await?
                    .history();

                let (blocks, stop_reason) = agent.call_llm(history, &key.session_id).await?;
                tracing::debug!("[Runner] Iteration {} stop reason: {:?}", iteration, stop_reason);

                let model_event = Event::new(
                    invocation_id.as_str(),
                    agent.name(),
                    Message::assistant_with_blocks(blocks),
                );
                let calls: Vec<(String, String, serde_json::Value)> = model_event
                    .tool_uses()
                    .into_iter()
                    .map(|(id, name, input)| (id.to_string(), name.to_string(), input.clone()))
                    .collect();

                sessions.append_event(&key, model_event.clone()).await?;
                yield model_event;

                if calls.is_empty() {
                    break;
                }

                tracing::info!("[Runner] Executing {} tool call(s)", calls.len());
                let results = agent.execute_tools(&calls).await;
                let tool_event = Event::new(
                    invocation_id.as_str(),
                    agent.name(),
                    Message::user_with_blocks(results),
                );
                sessions.append_event(&key, tool_event.clone()).await?;
                yield tool_event;
            }

            tracing::info!("[Runner] Invocation {} finished", invocation_id);
        };

        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentConfig;
    use crate::core::FrameworkError;
    use crate::llm::{
        ContentBlock, LlmEventStream, LlmProvider, MessageResponse, StopReason, SystemPrompt,
        ToolChoice, ToolDefinition, Usage,
    };
    use crate::session::InMemorySessionService;
    use crate::tools::{Tool, ToolRegistry, ToolResult};
    use anyhow::Result;
    use futures::StreamExt;
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Returns queued responses in order, then plain text forever
    struct ScriptedLlm {
        responses: Mutex<VecDeque<Vec<ContentBlock>>>,
    }

    impl ScriptedLlm {
        fn new(responses: Vec<Vec<ContentBlock>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
            }
        }
    }

    #[async_trait::async_trait]
    impl LlmProvider for ScriptedLlm {
        async fn send_with_tools_and_system(
            &self,
            _messages: Vec<Message>,
            _system: Option<SystemPrompt>,
            _tools: Vec<ToolDefinition>,
            _tool_choice: Option<ToolChoice>,
            _session_id: Option<&str>,
        ) -> Result<MessageResponse> {
            let content = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| vec![ContentBlock::text("done")]);
            let stop_reason = if content.iter().any(|b| b.as_tool_use().is_some()) {
                StopReason::ToolUse
            } else {
                StopReason::EndTurn
            };
            Ok(MessageResponse {
                id: "resp".to_string(),
                role: "assistant".to_string(),
                content,
                model: "scripted".to_string(),
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
            anyhow::bail!("streaming not scripted")
        }

        fn model(&self) -> String {
            "scripted".to_string()
        }

        fn provider_name(&self) -> &str {
            "scripted"
        }
    }

    struct PingTool;

    #[async_trait::async_trait]
    impl Tool for PingTool {
        fn name(&self) -> &str {
            "ping"
        }

        fn description(&self) -> &str {
            "Replies pong"
        }

        async fn execute(&self, _input: &Value) -> Result<ToolResult> {
            Ok(ToolResult::success("pong"))
        }
    }

    async fn runner_with(responses: Vec<Vec<ContentBlock>>, max_iterations: usize) -> Runner {
        let mut registry = ToolRegistry::new();
        registry.register(PingTool);
        let config = AgentConfig::new("file_manager", "be nice")
            .with_tools(Arc::new(registry))
            .with_max_tool_iterations(max_iterations);
        let agent = Arc::new(StandardAgent::new(config, Arc::new(ScriptedLlm::new(responses))));
        let sessions: Arc<dyn SessionService> = Arc::new(InMemorySessionService::new());
        sessions.create_session("app", "u1", Some("s1")).await.unwrap();
        Runner::new("app", agent, sessions)
    }

    async fn collect(runner: &Runner) -> Vec<anyhow::Result<Event>> {
        runner
            .run_async("u1", "s1", Message::user("hello"))
            .await
            .unwrap()
            .collect()
            .await
    }

    #[tokio::test]
    async fn test_tool_round_trip_produces_ordered_events() {
        let runner = runner_with(
            vec![
                vec![ContentBlock::tool_use("c1", "ping", json!({}))],
                vec![ContentBlock::text("got pong")],
            ],
            10,
        )
        .await;

        let events: Vec<Event> = collect(&runner).await.into_iter().map(|e| e.unwrap()).collect();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].tool_uses().len(), 1);
        assert_eq!(events[2].text_fragments(), vec!["got pong"]);

        let result_blocks = events[1].content.as_ref().unwrap().blocks().unwrap();
        match &result_blocks[0] {
            ContentBlock::ToolResult { tool_use_id, content, is_error } => {
                assert_eq!(tool_use_id, "c1");
                assert_eq!(content.as_deref(), Some("pong"));
                assert_ne!(*is_error, Some(true));
            }
            other => panic!("expected tool result, got {:?}", other),
        }

        // user message + the three yielded events
        let session = runner.session_service().get_session("app", "u1", "s1").await.unwrap();
        assert_eq!(session.events.len(), 4);
        assert!(session.events[0].is_user());
    }

    #[tokio::test]
    async fn test_unknown_tool_becomes_error_result() {
        let runner = runner_with(vec![vec![ContentBlock::tool_use("c1", "nope", json!({}))]], 10).await;

        let events: Vec<Event> = collect(&runner).await.into_iter().map(|e| e.unwrap()).collect();
        let result_blocks = events[1].content.as_ref().unwrap().blocks().unwrap();
        match &result_blocks[0] {
            ContentBlock::ToolResult { is_error, .. } => assert_eq!(*is_error, Some(true)),
            other => panic!("expected tool result, got {:?}", other),
        }
        assert_eq!(events.last().unwrap().text_fragments(), vec!["done"]);
    }

    #[tokio::test]
    async fn test_stops_at_max_iterations() {
        let looping = (0..5)
            .map(|i| vec![ContentBlock::tool_use(format!("c{}", i), "ping", json!({}))])
            .collect();
        let runner = runner_with(looping, 2).await;

        let events = collect(&runner).await;
        // two model turns, each followed by its tool results
        assert_eq!(events.len(), 4);
        assert!(events.iter().all(|e| e.is_ok()));
    }

    #[tokio::test]
    async fn test_missing_session_fails_before_streaming() {
        let runner = runner_with(Vec::new(), 10).await;
        let result = runner.run_async("u1", "missing", Message::user("hi")).await;
        assert!(matches!(result, Err(FrameworkError::SessionNotFound(_))));
    }
}
