// Prompt bodies for every built-in template.
// Placeholders are `{fieldName}`; anything else in braces (the JSON examples)
// is left untouched by the renderer.

/// Resume review. Fields: {resumeText}
pub const RESUME_ANALYSIS_PROMPT: &str = r#"You are an AI resume reviewer. Analyze the following resume text and respond ONLY with a JSON array containing one object exactly in this format:

[
  {
    "resumeScore": number (0 to 100),
    "atsCompatibility": number (0 to 100),
    "improvements": [array of plain strings],
    "suggestions": [array of plain strings],
    "weaknesses": [array of plain strings],
    "strengths": [array of plain strings],
    "recommendedRoles": [exactly 3 job role strings]
  }
]

Scores MUST be JSON numbers, not strings.

Resume:
{resumeText}"#;

/// Career path timeline. Fields: {currentRole}, {targetRole}, {skills}
pub const CAREER_ROADMAP_PROMPT: &str = r#"You are an expert career advisor. Generate a comprehensive, actionable career path timeline in JSON format to guide a person from their current role to their target role. Each step should include:

- step number
- clear role or milestone title
- detailed description with actionable advice
- typical duration (e.g., 6 months - 1 year)

Return ONLY a JSON object in this exact format:

{
  "careerPath": [
    {
      "step": 1,
      "title": "Role or Milestone Title",
      "description": "Detailed, actionable advice about this step.",
      "duration": "Approximate duration (e.g., 1-2 years)"
    }
  ]
}

DO NOT include any markdown, explanations, or extra text.

Input:
Current Role: {currentRole}
Target Role: {targetRole}
Skills or Interests: {skills}
"#;

/// Cover letter. Fields: {jobTitle}, {companyName}, {additionalInfo}
pub const COVER_LETTER_PROMPT: &str = r#"You are an AI cover letter writer. Generate a professional, concise, and personalized cover letter for the following job application details. Format it with proper paragraph spacing. Return ONLY a JSON object in this format:

{
  "coverLetter": "full text with paragraphs and clean line breaks, no markdown"
}

Job Title: {jobTitle}
Company Name: {companyName}
Additional Information: {additionalInfo}
"#;

/// Company research tabs. Fields: {company}
pub const COMPANY_OVERVIEW_PROMPT: &str = r#"Provide detailed information about the company "{company}". Return the result ONLY in valid JSON format like this:
[
  {"section": "Overview", "content": "Brief overview..."},
  {"section": "Culture", "content": "Company culture..."},
  {"section": "Latest News", "content": "Recent news..."},
  {"section": "Key Facts", "content": "Facts: founding year, HQ, revenue..."},
  {"section": "Customer Reviews", "content": "Summary of reviews..."},
  {"section": "Financials", "content": "Revenue, profit, market cap..."},
  {"section": "Competitors", "content": "Main competitors..."}
]"#;

/// Topic Q&A. Fields: {numQuestions}, {topic}
pub const INTERVIEW_QA_PROMPT: &str = r#"Generate {numQuestions} interview questions and answers for the topic: "{topic}". Return the result ONLY in valid JSON format like this:
[
  {
    "question": "Your question?",
    "answer": "Detailed answer..."
  }
]"#;

/// Personalised interview prep.
/// Fields: {name}, {position}, {skills}, {experience}, {interviewTypes}
pub const INTERVIEW_QUESTIONS_PROMPT: &str = r#"My name is {name}. I want to prepare for a {position} interview.
My skills are: {skills}. I have {experience} years of experience.
The interview types I want to focus on are:
{interviewTypes}

Generate 5 interview questions and answers in JSON format like this:
[
  {
    "question": "Your question?",
    "answer": "Your answer."
  }
]
Only return valid JSON."#;

/// Post-interview feedback. Fields: {position}, {transcript}
pub const INTERVIEW_FEEDBACK_PROMPT: &str = r#"You are an expert recruiter AI. Given the following interview transcript, analyze the candidate's answers for the role of {position} and provide detailed feedback.

Please respond ONLY with a JSON object containing:
- strengths: a brief summary of strengths
- improvements: areas of improvement
- communicationClarityScore: a score from 1 to 10
- relevanceScore: a score from 1 to 10
- overallScore: a score from 1 to 10
- detailedFeedback: a concise paragraph summary

Transcript:
{transcript}

Example JSON format:
{
  "strengths": "Good technical knowledge and clear explanations.",
  "improvements": "Needs to improve time management and elaborate answers.",
  "communicationClarityScore": 8,
  "relevanceScore": 7,
  "overallScore": 7,
  "detailedFeedback": "Overall, the candidate shows good understanding of core concepts but can benefit from clearer, more concise answers."
}"#;

/// Chatbot wrapper. Plain text answer, no JSON expected.
pub const CHAT_PROMPT_TEMPLATE: &str =
    r#"You are a helpful and friendly AI chatbot for interview preparation. Answer this: "{question}""#;

/// System instructions handed to the external voice assistant.
/// Replace: {position}, {questions}
pub const VOICE_ASSISTANT_PROMPT_TEMPLATE: &str = r#"You are an AI voice assistant conducting interviews.
Your job is to ask candidates provided interview questions, assess their responses.
Begin the conversation with a friendly introduction, setting a relaxed yet professional tone. Example:
"Hey there! Welcome to your {position} interview. Let's get started with a few questions!"
Ask one question at a time and wait for the candidate's response before proceeding. Keep the questions clear and concise. Below are the questions to ask one by one:
Questions: {questions}
If the candidate struggles, offer hints or rephrase the question without giving away the answer.
Provide brief, encouraging feedback after each answer.
Keep the conversation natural and engaging.
After 5-7 questions, wrap up the interview smoothly by summarizing their performance.
End on a positive note.
Key Guidelines:
- Be friendly, engaging, and witty
- Keep responses short and natural, like a real conversation
- Adapt based on the candidate's confidence level
- Ensure the interview remains focused on {position}"#;
