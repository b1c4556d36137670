// Evaluation prompt construction

/// Build the coaching prompt sent to the generative model.
///
/// The model is instructed to return bare JSON matching the evaluation
/// shape; `topicAdherence` is only meaningful when a topic was assigned.
pub fn build_prompt(transcript: &str, topic: Option<&str>) -> String {
    let topic_line = match topic {
        Some(topic) => format!("Speaking Topic: \"{}\"", topic),
        None => "No specific topic was assigned.".to_string(),
    };

    format!(
        r#"As an expert English communication coach, analyze the following transcript. Provide a detailed evaluation in a valid JSON format.
The user is practicing their communication skills.

{topic_line}

Transcript: "{transcript}"

Your evaluation must include these fields:
1. "overallScore": An integer score out of 100, where 100 is perfect.
2. "confidence": A brief analysis of the speaker's confidence, noting hesitations or strong phrasing.
3. "fillerWords": An object containing a "count" (integer) and a "words" (array of strings) of filler words like "um", "uh", "like", etc.
4. "grammarFeedback": Constructive feedback on grammar and syntax, with specific examples from the transcript.
5. "alternativePhrasing": An array of objects, where each object has "original" and "suggested" keys, offering better ways to phrase parts of the transcript.
6. "topicAdherence": If a speaking topic was assigned, provide a score from 0-10 on how well the speaker stayed on topic, with feedback on relevance. If no topic was assigned, set this to null.

Strictly return only the JSON object, with no extra text or markdown formatting."#
    )
}
