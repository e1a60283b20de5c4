pub const DEFAULT_TRANSCRIPTION_PROMPT: &str = "Danish dictation, speech to text.";

pub const IMAGE_SYSTEM_INSTRUCTION: &str = "You are an image generation assistant. When given text content:
- Be INSPIRED by the themes, mood, and concepts in the text
- Create original visual interpretations - do NOT include literal text or quotes from the input
- Focus on visual metaphors and artistic representation rather than text reproduction";

const PROCESSING_TEMPLATE: &str = "You are a helpful assistant that reworks transcribed speech.

TRANSCRIPTION:
{transcription}

USER INSTRUCTION:
{instruction}
{style_guide_section}
---

Carry out the user's instruction on the transcription. Write in the language of the transcription. Output only the reworked result, no introduction or explanation.";

const STYLE_GUIDE_TEMPLATE: &str = "Analyse the following text examples and write a precise style guide.
{description_section}
EXAMPLES:
{examples}

Write a style guide that describes:
- Tone (formal/informal, professional/friendly)
- Sentence structure (short/long sentences, active/passive voice)
- Word choice (technical terms, everyday language, special expressions)
- Formatting (paragraphs, bullet points, headings)
- Greetings and sign-offs (if relevant)
- Platform-specific conventions (if relevant)
- Other patterns you notice

Write the style guide as clear, concrete instructions that can be used to write in the same style, in the language of the examples.
Output only the style guide, no introduction or explanation.";

/// Placeholders are replaced literally; braces inside user text are kept as-is.
pub fn processing_prompt(transcription: &str, instruction: &str, style_guide: Option<&str>) -> String {
    let style_guide_section = style_guide
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("\nSTYLE GUIDE (follow it):\n{s}\n"))
        .unwrap_or_default();

    PROCESSING_TEMPLATE
        .replace("{style_guide_section}", &style_guide_section)
        .replace("{instruction}", instruction)
        .replace("{transcription}", transcription)
}

pub fn style_guide_prompt(examples: &str, description: Option<&str>) -> String {
    let description_section = description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(|d| format!("\nTEXT TYPE/PURPOSE:\n{d}\n"))
        .unwrap_or_default();

    STYLE_GUIDE_TEMPLATE
        .replace("{description_section}", &description_section)
        .replace("{examples}", examples)
}
