//! Agent, task, and crew execution.
//!
//! A crew runs its tasks sequentially. Each task is executed by an agent as a
//! system-prompt plus an agentic tool loop: the LLM either answers directly or
//! requests tool calls, which are executed through the registry and fed back
//! until the model produces final content.

mod prompts;

pub use prompts::build_system_prompt;

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use buddy_core::{AgentError, ModelConfig, ToolSchema};
use buddy_llm::{ChatResponse, LlmClient, LlmMetrics};
use buddy_tools::ToolRegistry;

/// Maximum number of tool call iterations to prevent infinite loops.
const MAX_TOOL_ITERATIONS: usize = 10;

/// An agent definition: persona plus the tools it may call.
#[derive(Debug, Clone)]
pub struct Agent {
    pub name: String,
    pub role: String,
    pub goal: String,
    pub backstory: String,
    pub tools: Vec<String>,
    pub verbose: bool,
}

impl Agent {
    /// Creates an agent with the given persona and no tools.
    pub fn new(
        name: impl Into<String>,
        role: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
            tools: Vec::new(),
            verbose: false,
        }
    }

    /// Adds tool names this agent is allowed to call.
    pub fn with_tools(mut self, tools: Vec<String>) -> Self {
        self.tools = tools;
        self
    }

    /// Enables verbose per-iteration logging.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// A unit of work for an agent.
#[derive(Debug, Clone)]
pub struct Task {
    pub id: Uuid,
    pub description: String,
    pub expected_output: String,
}

impl Task {
    pub fn new(description: impl Into<String>, expected_output: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            expected_output: expected_output.into(),
        }
    }
}

/// Task execution strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Process {
    #[default]
    Sequential,
}

/// Result of a crew run.
#[derive(Debug, Clone)]
pub struct CrewOutput {
    pub raw: String,
    pub metrics: LlmMetrics,
}

/// A set of agents executing tasks against a model.
pub struct Crew {
    agents: Vec<Agent>,
    tasks: Vec<Task>,
    process: Process,
    model: ModelConfig,
    api_key: String,
    tool_registry: Arc<ToolRegistry>,
}

impl Crew {
    pub fn new(
        agents: Vec<Agent>,
        tasks: Vec<Task>,
        process: Process,
        model: ModelConfig,
        api_key: impl Into<String>,
        tool_registry: Arc<ToolRegistry>,
    ) -> Self {
        Self {
            agents,
            tasks,
            process,
            model,
            api_key: api_key.into(),
            tool_registry,
        }
    }

    /// Runs all tasks in order and returns the last task's output.
    pub async fn kickoff(&self) -> Result<CrewOutput, AgentError> {
        if self.tasks.is_empty() || self.agents.is_empty() {
            return Err(AgentError::EmptyCrew);
        }

        info!("CREW: Starting {:?} run with {} task(s)", self.process, self.tasks.len());

        let mut raw = String::new();
        let mut metrics = LlmMetrics::default();

        for (i, task) in self.tasks.iter().enumerate() {
            // Tasks beyond the agent count reuse the last agent.
            let agent = self.agents.get(i).unwrap_or_else(|| {
                self.agents.last().expect("crew agents checked non-empty")
            });

            info!("CREW: [{}/{}] Agent '{}' executing task {}", i + 1, self.tasks.len(), agent.name, task.id);

            let output = self.execute_task(agent, task, &mut metrics).await?;
            raw = output;
        }

        info!("CREW: Run complete ({} tokens in / {} out)", metrics.input_tokens, metrics.output_tokens);

        Ok(CrewOutput { raw, metrics })
    }

    /// Executes one task via the agentic tool loop.
    async fn execute_task(
        &self,
        agent: &Agent,
        task: &Task,
        metrics: &mut LlmMetrics,
    ) -> Result<String, AgentError> {
        let client = LlmClient::new(&self.model, &self.api_key);
        let system_prompt = build_system_prompt(agent, task);
        let tool_schemas: Vec<ToolSchema> = self.tool_registry.schemas_for(&agent.tools);

        if !agent.tools.is_empty() && tool_schemas.is_empty() {
            warn!("No valid tools found in registry for: {:?}", agent.tools);
        }

        // No tools available - simple chat
        if tool_schemas.is_empty() {
            let response = client.chat(&system_prompt, &task.description).await?;
            accumulate(metrics, &response.metrics);
            return Ok(response.content);
        }

        let mut messages = vec![LlmClient::user_message(&task.description)?];
        let mut iterations = 0;

        loop {
            iterations += 1;
            if iterations > MAX_TOOL_ITERATIONS {
                warn!("Max tool iterations ({}) reached", MAX_TOOL_ITERATIONS);
                return Err(AgentError::MaxToolIterations);
            }

            let response = client
                .chat_with_tools(&system_prompt, messages.clone(), &tool_schemas)
                .await?;

            match response {
                ChatResponse::Content(llm_response) => {
                    if agent.verbose {
                        info!(
                            "AGENT '{}': final response after {} iteration(s)",
                            agent.name, iterations
                        );
                    }
                    accumulate(metrics, &llm_response.metrics);
                    return Ok(llm_response.content);
                }
                ChatResponse::ToolCalls { calls, metrics: call_metrics } => {
                    accumulate(metrics, &call_metrics);
                    debug!(
                        "AGENT '{}': tool calls {:?}",
                        agent.name,
                        calls.iter().map(|c| &c.name).collect::<Vec<_>>()
                    );

                    messages.push(LlmClient::assistant_tool_calls_message(&calls)?);

                    for call in &calls {
                        let tool = self.tool_registry.get(&call.name).ok_or_else(|| {
                            AgentError::ToolFailed(format!("Tool not found: {}", call.name))
                        })?;

                        let result = tool
                            .execute(call.arguments.clone())
                            .await
                            .map_err(|e| AgentError::ToolFailed(e.to_string()))?;

                        if agent.verbose {
                            info!("AGENT '{}': tool '{}' returned {} chars", agent.name, call.name, result.len());
                        }

                        messages.push(LlmClient::tool_result_message(&call.id, &result)?);
                    }
                }
            }
        }
    }
}

/// Adds one call's metrics into the running total.
fn accumulate(total: &mut LlmMetrics, call: &LlmMetrics) {
    total.input_tokens += call.input_tokens;
    total.output_tokens += call.output_tokens;
    total.elapsed_ms += call.elapsed_ms;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buddy() -> Agent {
        Agent::new(
            "Buddy",
            "Health Companion",
            "Support users emotionally and give basic health advice",
            "Buddy is a friendly AI health companion that supports users with gentle advice.",
        )
        .with_tools(vec!["health_tip".into()])
    }

    fn model() -> ModelConfig {
        ModelConfig {
            id: "gemini-flash".into(),
            name: "Gemini 2.5 Flash".into(),
            model: "gemini-2.5-flash".into(),
            api_base: None,
            temperature: Some(0.4),
        }
    }

    #[test]
    fn test_task_ids_are_unique() {
        let a = Task::new("one", "out");
        let b = Task::new("one", "out");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_agent_builder_sets_tools_and_verbose() {
        let agent = buddy().with_verbose(true);
        assert_eq!(agent.tools, vec!["health_tip".to_string()]);
        assert!(agent.verbose);
    }

    #[tokio::test]
    async fn test_kickoff_with_no_tasks_is_an_error() {
        let crew = Crew::new(
            vec![buddy()],
            vec![],
            Process::Sequential,
            model(),
            "test-key",
            Arc::new(ToolRegistry::with_defaults()),
        );
        let err = crew.kickoff().await.unwrap_err();
        assert!(matches!(err, AgentError::EmptyCrew));
    }

    #[tokio::test]
    async fn test_kickoff_with_no_agents_is_an_error() {
        let crew = Crew::new(
            vec![],
            vec![Task::new("say hi", "a greeting")],
            Process::Sequential,
            model(),
            "test-key",
            Arc::new(ToolRegistry::with_defaults()),
        );
        let err = crew.kickoff().await.unwrap_err();
        assert!(matches!(err, AgentError::EmptyCrew));
    }
}
