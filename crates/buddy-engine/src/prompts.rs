use crate::{Agent, Task};

pub const AGENT_PROMPT_TEMPLATE: &str = r#"You are {role}. {backstory}
Your personal goal is: {goal}

Use the tools available to you when they can help with the user's request.

This is the expected output for your final answer: {expected_output}
Respond with the final answer only, no preamble."#;

/// Builds the system prompt for an agent executing a task.
pub fn build_system_prompt(agent: &Agent, task: &Task) -> String {
    AGENT_PROMPT_TEMPLATE
        .replace("{role}", &agent.role)
        .replace("{backstory}", &agent.backstory)
        .replace("{goal}", &agent.goal)
        .replace("{expected_output}", &task.expected_output)
}
