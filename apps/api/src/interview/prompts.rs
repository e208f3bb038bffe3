// Interview LLM prompt templates.

pub const ANSWER_FEEDBACK_SYSTEM: &str = "\
You are an experienced technical interviewer grading a candidate's spoken answer. \
Be fair, specific and brief. \
You MUST respond with valid JSON only. Do not use markdown fences or add explanations.";

/// Rubric prompt. Replace `{question}` and `{answer}` before sending.
pub const ANSWER_FEEDBACK_PROMPT: &str = r#"Evaluate the candidate's answer to the interview question below.

QUESTION:
{question}

CANDIDATE ANSWER (transcribed from speech, may contain filler words):
{answer}

RUBRIC:
- 9-10: complete, correct and well structured, with concrete examples
- 7-8: correct with minor gaps or imprecision
- 5-6: partially correct, misses important points
- 3-4: mostly incorrect or very shallow
- 1-2: irrelevant, empty or wrong

Return exactly this JSON object:
{"rating": <integer 1-10>, "feedback": "<two or three sentences of actionable feedback>"}"#;
