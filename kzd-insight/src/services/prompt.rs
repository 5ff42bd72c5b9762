//! Prompt template sent to the generative-language API

use kzd_common::{CheckIn, Language};

/// Micro-actions the model may pick from: (label, how-to)
pub const MICRO_ACTION_CATALOG: [(&str, &str); 27] = [
    ("Extended Exhale Breathing (1–2 min)", "Inhale 4 · Exhale 6–8"),
    ("Unclench Check (30 sec)", "Relax jaw, shoulders, hands, belly"),
    ("Orient to Safety (1 min)", "Name 3 neutral/pleasant things nearby"),
    ("Gentle Neck Roll (1 min)", "Slow, pain-free circles"),
    ("Warm Sensation (2 min)", "Hold a warm mug/hands on chest"),
    ("Label the Feeling (30 sec)", "\"Right now, I feel ___, and I’m okay.\""),
    ("Lower the Pace (1 min)", "Intentionally slow next movement"),
    ("Light Exposure Reset (2 min)", "Step outside or near a window"),
    ("Power Stretch (1 min)", "Reach up, open chest"),
    ("Cold Water Splash (30 sec)", "Face or wrists with cool water"),
    ("Name One Intention (30 sec)", "\"What matters most right now?\""),
    ("Move One Joint (1 min)", "Rotate ankles, wrists, shoulders"),
    ("Hydration Pause (1 min)", "Drink water slowly"),
    ("Music Micro-Boost (2 min)", "Play one uplifting song"),
    ("Define Tiny Step (30 sec)", "Make it almost too easy"),
    ("2-Minute Rule", "Start for just two minutes"),
    ("Visual Finish (1 min)", "Picture the task done"),
    ("Change Location (1 min)", "Stand up, shift rooms"),
    ("Speak It Aloud (30 sec)", "\"I’m starting now.\""),
    ("Remove One Obstacle (1 min)", "Close one tab, clear one item"),
    ("Celebrate Starting (10 sec)", "Acknowledge effort"),
    ("Physiological Sigh (1 min)", "Two short inhales, long exhale"),
    ("Dim Environment (2 min)", "Lower lights"),
    ("Body Scan Lite (2 min)", "Relax forehead to legs"),
    ("Write One Thought (1 min)", "\"Tomorrow, I’ll handle this.\""),
    ("Slow Counting Breaths (2 min)", "Count exhales 10 to 1"),
    ("Gentle Self-Touch (1 min)", "Hand on chest or belly"),
];

const RESPONSE_SHAPE: &str = r#"{
  "mainInsight": "A detailed analysis (3-4 sentences) of the user's state, blending psychological depth with a professional wellness perspective, always ending on an optimistic, life-affirming note.",
  "microActions": [
    { "id": 1, "text": "Action label", "instruction": "Brief how-to instruction from the list above", "icon": "accessibility_new | water_drop | air" }
  ],
  "upliftingQuote": "A highly relevant quote from the official 365 library."
}"#;

/// Render the coaching prompt for one check-in
pub fn build_prompt(checkin: &CheckIn) -> String {
    let vibe = checkin
        .vibe
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("Not specified");

    let mut prompt = String::with_capacity(4096);

    prompt.push_str(
        "You are the Kozendo Wellness AI, acting as both a professional wellness coach and a highly trained psychologist.\n\
         Your goal is to provide a detailed, deep analysis of the user's emotional and physical state based on their check-in data, \
         then conclude with a powerful, optimistic, and positive message.\n\n",
    );

    prompt.push_str("User Data:\n");
    prompt.push_str(&format!("- Physical State: {}\n", checkin.body.trim()));
    prompt.push_str(&format!("- Emotional State: {}\n", checkin.heart.trim()));
    prompt.push_str(&format!("- Environment: {}\n", checkin.environment.trim()));
    prompt.push_str(&format!("- Breathing Reflection: {}\n", checkin.breath_action.trim()));
    prompt.push_str(&format!("- Daily Reflection: {}\n", checkin.reflection.trim()));
    prompt.push_str(&format!("- Overall Vibe: {}\n\n", vibe));

    prompt.push_str(
        "TASK:\n\
         1. Analyze the user's feelings, emotions, and general state with the depth of a psychologist.\n\
         2. Synthesize these insights into a \"mainInsight\" that is both analytical and deeply optimistic.\n\
         3. Select 2-3 highly relevant micro-actions from the list below.\n\
         4. Provide an uplifting quote that resonates with your analysis.\n\n",
    );

    prompt.push_str("AVAILABLE MICRO-ACTIONS (Choose 2-3 most relevant):\n");
    for (label, how_to) in MICRO_ACTION_CATALOG {
        prompt.push_str(&format!("- {label}: {how_to}\n"));
    }
    prompt.push('\n');

    if checkin.language == Language::Fr {
        prompt.push_str(
            "LANGUAGE: Write every text value (mainInsight, micro-action text and instruction, upliftingQuote) in French. Keep the JSON keys in English.\n\n",
        );
    }

    prompt.push_str("Return EXACTLY a JSON object without any markdown formatting wrappers:\n");
    prompt.push_str(RESPONSE_SHAPE);
    prompt.push('\n');

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkin(language: Language, vibe: Option<&str>) -> CheckIn {
        CheckIn {
            body: "heavy legs".to_string(),
            heart: "restless".to_string(),
            environment: "noisy train".to_string(),
            breath_action: "three deep breaths".to_string(),
            reflection: "long day at work".to_string(),
            vibe: vibe.map(str::to_string),
            language,
        }
    }

    #[test]
    fn test_prompt_embeds_all_fields() {
        let prompt = build_prompt(&checkin(Language::En, Some("Sad / Low")));
        assert!(prompt.contains("- Physical State: heavy legs"));
        assert!(prompt.contains("- Emotional State: restless"));
        assert!(prompt.contains("- Environment: noisy train"));
        assert!(prompt.contains("- Breathing Reflection: three deep breaths"));
        assert!(prompt.contains("- Daily Reflection: long day at work"));
        assert!(prompt.contains("- Overall Vibe: Sad / Low"));
        assert!(prompt.contains("\"upliftingQuote\""));
        assert!(!prompt.contains("French"));
    }

    #[test]
    fn test_prompt_lists_whole_catalog() {
        let prompt = build_prompt(&checkin(Language::En, None));
        for (label, _) in MICRO_ACTION_CATALOG {
            assert!(prompt.contains(label), "missing {label}");
        }
        assert!(prompt.contains("- Overall Vibe: Not specified"));
    }

    #[test]
    fn test_french_prompt_requests_french_answer() {
        let prompt = build_prompt(&checkin(Language::Fr, Some("Calm / Peaceful")));
        assert!(prompt.contains("in French"));
    }
}
