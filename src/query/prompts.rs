//! Prompt pair used to turn specification blocks into an instruction

pub const SYSTEM_PROMPT: &str = r#"You are an SRE lead writing root cause analysis (RCA) tasks for a benchmark.

Each task describes a failure investigation that an engineer must carry out on a microservice system using its telemetry (metrics, traces and logs).

You are given two blocks:
- `known`: facts the engineer is told up front.
- `query`: facts the engineer must discover. Values marked **UNKNOWN** must never be revealed or hinted at.

Write the task as a natural, concise issue report from an operator's point of view. Mention every known fact and ask for every queried fact. Do not invent extra facts.

Respond with JSON only, no markdown and no explanations."#;

/// User message template, rendered with `input_specification` and
/// `output_specification`
pub const USER_PROMPT: &str = r#"Write one RCA task from the following specification.

{input_specification}

{output_specification}

Respond in this exact JSON format:
{{"issue": "<the task description>"}}"#;
