//! Deterministic local insight used when the AI service is unavailable
//!
//! Content is keyed by vibe (stressed, sad, everything else) and language.

use kzd_common::insight::MAX_MICRO_ACTIONS;
use kzd_common::{CheckIn, Insight, Language, MicroAction, Vibe};

struct Localized {
    en: &'static str,
    fr: &'static str,
}

impl Localized {
    fn get(&self, language: Language) -> &'static str {
        match language {
            Language::En => self.en,
            Language::Fr => self.fr,
        }
    }
}

struct ActionTemplate {
    text: Localized,
    instruction: Localized,
    icon: &'static str,
}

struct VibeContent {
    insight: Localized,
    quote: Localized,
    actions: [ActionTemplate; 3],
}

const STRESSED: VibeContent = VibeContent {
    insight: Localized {
        en: "I notice you're feeling a bit pressured. Remember that it's okay to slow down; your productivity isn't your worth.",
        fr: "Je remarque que vous vous sentez un peu sous pression. Rappelez-vous qu'il est normal de ralentir ; votre productivité ne définit pas votre valeur.",
    },
    quote: Localized {
        en: "You have power over your mind — not outside events. — Marcus Aurelius",
        fr: "Vous avez un pouvoir sur votre esprit — pas sur les événements extérieurs. — Marc Aurèle",
    },
    actions: [
        ActionTemplate {
            text: Localized {
                en: "Physiological Sigh (1 min)",
                fr: "Soupir Physiologique (1 min)",
            },
            instruction: Localized {
                en: "Two short inhales · long exhale. Rapid calming effect.",
                fr: "Deux inspirations courtes · une longue expiration. Effet calmant rapide.",
            },
            icon: "breath",
        },
        ActionTemplate {
            text: Localized {
                en: "Gentle Neck Roll (1 min)",
                fr: "Cercle de Nuque Doux (1 min)",
            },
            instruction: Localized {
                en: "Slow, pain-free circles. Relieves stress accumulation.",
                fr: "Cercles lents et sans douleur. Soulage l'accumulation de stress.",
            },
            icon: "stretch",
        },
        ActionTemplate {
            text: Localized {
                en: "Lower the Pace (1 min)",
                fr: "Ralentir le Pas (1 min)",
            },
            instruction: Localized {
                en: "Intentionally slow your next movement. Your brain follows your body.",
                fr: "Ralentissez intentionnellement votre prochain mouvement. Le cerveau suit le corps.",
            },
            icon: "stretch",
        },
    ],
};

const SAD: VibeContent = VibeContent {
    insight: Localized {
        en: "It's completely valid to feel heavy right now. Be gentle with yourself—you don't have to 'fix' everything today.",
        fr: "Il est tout à fait normal de se sentir lourd en ce moment. Soyez doux avec vous-même—vous n'avez pas à tout 'réparer' aujourd'hui.",
    },
    quote: Localized {
        en: "Every moment is a fresh beginning. — T.S. Eliot",
        fr: "Chaque moment est un nouveau départ. — T.S. Eliot",
    },
    actions: [
        ActionTemplate {
            text: Localized {
                en: "Label the Feeling (30 sec)",
                fr: "Nommer le Sentiment (30 sec)",
            },
            instruction: Localized {
                en: "“Right now, I feel ___, and I’m okay.” Reduces emotional intensity.",
                fr: "« En ce moment, je me sens ___, et c'est okay. » Réduit l'intensité émotionnelle.",
            },
            icon: "pen",
        },
        ActionTemplate {
            text: Localized {
                en: "Light Exposure Reset (2 min)",
                fr: "Réinitialisation par la Lumière (2 min)",
            },
            instruction: Localized {
                en: "Step outside or near a window. Signals wakefulness to the brain.",
                fr: "Sortez ou placez-vous près d'une fenêtre. Signale l'éveil au cerveau.",
            },
            icon: "sun",
        },
        ActionTemplate {
            text: Localized {
                en: "Warm Sensation (2 min)",
                fr: "Sensation de Chaleur (2 min)",
            },
            instruction: Localized {
                en: "Hold a warm mug or place hands on chest. Activates calming pathways.",
                fr: "Tenez une tasse chaude ou placez vos mains sur votre poitrine. Active les voies du calme.",
            },
            icon: "stretch",
        },
    ],
};

const DEFAULT: VibeContent = VibeContent {
    insight: Localized {
        en: "It sounds like you're taking a meaningful moment for self-reflection. Your awareness is the first step toward balance.",
        fr: "On dirait que vous prenez un moment précieux pour l'autoréflexion. Votre conscience est le premier pas vers l'équilibre.",
    },
    quote: Localized {
        en: "Peace comes from within. Do not seek it without. — Buddha",
        fr: "La paix vient de l'intérieur. Ne la cherchez pas à l'extérieur. — Bouddha",
    },
    actions: [
        ActionTemplate {
            text: Localized {
                en: "Unclench Check (30 sec)",
                fr: "Vérification du Relâchement (30 sec)",
            },
            instruction: Localized {
                en: "Relax jaw · shoulders · hands · belly. Releases stored tension.",
                fr: "Détendez la mâchoire · les épaules · les mains · le ventre. Libère les tensions.",
            },
            icon: "stretch",
        },
        ActionTemplate {
            text: Localized {
                en: "Hydration Pause (1 min)",
                fr: "Pause Hydratation (1 min)",
            },
            instruction: Localized {
                en: "Drink water slowly and fully. Dehydration mimics fatigue.",
                fr: "Buvez de l'eau lentement. La déshydratation imite la fatigue.",
            },
            icon: "water",
        },
        ActionTemplate {
            text: Localized {
                en: "Extended Exhale Breathing (1–2 min)",
                fr: "Respiration Longue (1–2 min)",
            },
            instruction: Localized {
                en: "Inhale 4 · Exhale 6–8. Signals safety to the nervous system.",
                fr: "Inspiration 4 · Expiration 6-8. Signale la sécurité au système nerveux.",
            },
            icon: "breath",
        },
    ],
};

fn content_for(vibe: Option<Vibe>) -> &'static VibeContent {
    match vibe {
        Some(Vibe::Stressed) => &STRESSED,
        Some(Vibe::Sad) => &SAD,
        _ => &DEFAULT,
    }
}

/// Canned-content insight generator
#[derive(Debug, Default, Clone, Copy)]
pub struct FallbackGenerator;

impl FallbackGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Build the canned insight for this check-in's vibe and language
    pub fn generate(&self, checkin: &CheckIn, debug_error: Option<String>) -> Insight {
        let content = content_for(checkin.parsed_vibe());
        let language = checkin.language;

        let micro_actions = content
            .actions
            .iter()
            .take(MAX_MICRO_ACTIONS)
            .enumerate()
            .map(|(index, action)| {
                MicroAction::new(
                    index as u32 + 1,
                    action.text.get(language),
                    action.instruction.get(language),
                    action.icon,
                )
            })
            .collect();

        Insight {
            main_insight: content.insight.get(language).to_string(),
            micro_actions,
            uplifting_quote: content.quote.get(language).to_string(),
            debug_error,
            recommended_activity: None,
        }
    }
}
