//! Lenient parsing of model output into story types.
//!
//! The model is asked for strict JSON but does not always comply: code
//! fences around the payload and missing fields are common. Parsing here
//! strips the fences, defaults what it can, and reports `None` only when
//! the payload is unusable, at which point the caller substitutes a
//! synthetic fallback story instead of failing the whole pipeline.

use fabula_core::{Character, Narrative, Page, Premise, Protagonist, Scene, StoryObject};
use serde::Deserialize;

/// Strip a Markdown code fence wrapped around a JSON payload.
pub fn strip_code_fences(text: &str) -> &str {
    let mut t = text.trim();
    if let Some(rest) = t.strip_prefix("```json") {
        t = rest;
    } else if let Some(rest) = t.strip_prefix("```") {
        t = rest;
    }
    if let Some(rest) = t.strip_suffix("```") {
        t = rest;
    }
    t.trim()
}

#[derive(Debug, Deserialize)]
struct RawProtagonist {
    name: Option<String>,
    appearance: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPremise {
    title: Option<String>,
    theme: Option<String>,
    summary: Option<String>,
    world_description: Option<String>,
    protagonist: Option<RawProtagonist>,
}

/// Parse a premise response, defaulting any missing field.
///
/// Returns `None` if the payload is not JSON at all.
pub fn parse_premise(text: &str, child_name: &str) -> Option<Premise> {
    let raw: RawPremise = serde_json::from_str(strip_code_fences(text)).ok()?;

    let protagonist = match raw.protagonist {
        Some(p) => Protagonist::new(
            p.name.unwrap_or_else(|| child_name.to_string()),
            p.appearance
                .unwrap_or_else(|| format!("{child_name}, the protagonist")),
        ),
        None => Protagonist::new(
            child_name.to_string(),
            format!("{child_name}, the protagonist"),
        ),
    };

    Some(Premise {
        title: raw
            .title
            .unwrap_or_else(|| format!("The Adventures of {child_name}")),
        theme: raw.theme.unwrap_or_else(|| "adventure".to_string()),
        summary: raw
            .summary
            .unwrap_or_else(|| format!("A magical story about {child_name}")),
        world_description: raw
            .world_description
            .unwrap_or_else(|| "A magical world full of adventures".to_string()),
        protagonist,
    })
}

/// Synthetic premise used when the model response is unusable.
pub fn fallback_premise(child_name: &str) -> Premise {
    Premise {
        title: format!("The Adventures of {child_name}"),
        theme: "adventure".to_string(),
        summary: format!("A magical story where {child_name} lives a great adventure"),
        world_description: "A magical world full of surprises".to_string(),
        protagonist: Protagonist::new(
            child_name.to_string(),
            format!("{child_name}, the brave protagonist"),
        ),
    }
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(default)]
    id: u32,
    name: Option<String>,
    description: Option<String>,
}

impl RawEntry {
    fn into_parts(self) -> (u32, String, String) {
        (
            self.id,
            self.name.unwrap_or_default(),
            self.description.unwrap_or_default(),
        )
    }
}

#[derive(Debug, Deserialize)]
struct RawPage {
    number: Option<u32>,
    text: Option<String>,
    scene_description: Option<String>,
    #[serde(default)]
    character_ids: Vec<u32>,
    #[serde(default)]
    object_ids: Vec<u32>,
    scene_id: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawNarrative {
    title: Option<String>,
    theme: Option<String>,
    summary: Option<String>,
    lesson: Option<String>,
    characters: Option<Vec<RawEntry>>,
    objects: Option<Vec<RawEntry>>,
    scenes: Option<Vec<RawEntry>>,
    pages: Option<Vec<RawPage>>,
}

/// Parse a narrative-expansion response, defaulting missing lists from the
/// premise.
///
/// Returns `None` when the payload is not JSON or has no pages at all.
/// Page counts and id citations are left as the model produced them; the
/// orchestrator conforms them before trusting any id.
pub fn parse_narrative(text: &str, premise: &Premise) -> Option<Narrative> {
    let raw: RawNarrative = serde_json::from_str(strip_code_fences(text)).ok()?;
    let raw_pages = raw.pages?;
    if raw_pages.is_empty() {
        return None;
    }

    let characters = match raw.characters {
        Some(entries) if !entries.is_empty() => entries
            .into_iter()
            .map(|e| {
                let (id, name, description) = e.into_parts();
                Character::new(id, name, description)
            })
            .collect(),
        _ => vec![Character::new(
            1,
            premise.protagonist.name.clone(),
            premise.protagonist.appearance.clone(),
        )],
    };

    let objects = raw
        .objects
        .unwrap_or_default()
        .into_iter()
        .map(|e| {
            let (id, name, description) = e.into_parts();
            StoryObject::new(id, name, description)
        })
        .collect();

    let scenes = match raw.scenes {
        Some(entries) if !entries.is_empty() => entries
            .into_iter()
            .map(|e| {
                let (id, name, description) = e.into_parts();
                Scene::new(id, name, description)
            })
            .collect(),
        _ => vec![Scene::new(
            1,
            "Main scene".to_string(),
            premise.world_description.clone(),
        )],
    };

    let pages = raw_pages
        .into_iter()
        .enumerate()
        .map(|(index, page)| Page {
            number: page.number.unwrap_or(index as u32 + 1),
            text: page.text.unwrap_or_default(),
            scene_description: page.scene_description.unwrap_or_default(),
            character_ids: page.character_ids,
            object_ids: page.object_ids,
            scene_id: page.scene_id.unwrap_or(1),
        })
        .collect();

    Some(Narrative {
        title: raw.title.unwrap_or_else(|| premise.title.clone()),
        theme: raw.theme.unwrap_or_else(|| premise.theme.clone()),
        summary: raw.summary.unwrap_or_else(|| premise.summary.clone()),
        lesson: raw.lesson.unwrap_or_default(),
        characters,
        objects,
        scenes,
        pages,
    })
}

/// Synthetic narrative used when the expansion response is unusable.
pub fn fallback_narrative(premise: &Premise, page_count: u8) -> Narrative {
    let name = &premise.protagonist.name;

    let pages = (1..=u32::from(page_count))
        .map(|number| Page {
            number,
            text: format!("{name} lived a great adventure."),
            scene_description: format!("{name} in an exciting scene"),
            character_ids: vec![1],
            object_ids: Vec::new(),
            scene_id: 1,
        })
        .collect();

    Narrative {
        title: premise.title.clone(),
        theme: premise.theme.clone(),
        summary: premise.summary.clone(),
        lesson: "Courage and friendship".to_string(),
        characters: vec![Character::new(
            1,
            name.clone(),
            premise.protagonist.appearance.clone(),
        )],
        objects: Vec::new(),
        scenes: vec![Scene::new(
            1,
            "Magical world".to_string(),
            premise.world_description.clone(),
        )],
        pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fences_are_stripped() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  {}  "), "{}");
    }

    #[test]
    fn premise_parses_complete_payload() {
        let text = r#"```json
        {
            "title": "The Starlight Voyage",
            "theme": "fantasy",
            "summary": "A journey across the sky",
            "world_description": "Floating islands",
            "protagonist": {"name": "Mira", "appearance": "curly red hair"}
        }
        ```"#;

        let premise = parse_premise(text, "Mira").unwrap();
        assert_eq!(premise.title, "The Starlight Voyage");
        assert_eq!(premise.protagonist.appearance, "curly red hair");
    }

    #[test]
    fn premise_defaults_missing_fields() {
        let premise = parse_premise(r#"{"theme": "friendship"}"#, "Leo").unwrap();
        assert_eq!(premise.title, "The Adventures of Leo");
        assert_eq!(premise.theme, "friendship");
        assert_eq!(premise.protagonist.name, "Leo");
    }

    #[test]
    fn non_json_premise_is_rejected() {
        assert!(parse_premise("Once upon a time...", "Leo").is_none());
    }

    #[test]
    fn narrative_defaults_cast_and_scenes_from_premise() {
        let premise = fallback_premise("Ana");
        let text = r#"{
            "pages": [
                {"number": 1, "text": "Ana set off.", "scene_description": "Ana at dawn",
                 "character_ids": [1], "scene_id": 1}
            ]
        }"#;

        let narrative = parse_narrative(text, &premise).unwrap();
        assert_eq!(narrative.title, premise.title);
        assert_eq!(narrative.characters.len(), 1);
        assert_eq!(narrative.characters[0].name, "Ana");
        assert_eq!(narrative.scenes[0].description, premise.world_description);
    }

    #[test]
    fn narrative_without_pages_is_rejected() {
        let premise = fallback_premise("Ana");
        assert!(parse_narrative(r#"{"title": "x"}"#, &premise).is_none());
        assert!(parse_narrative(r#"{"pages": []}"#, &premise).is_none());
    }

    #[test]
    fn page_numbers_default_from_position() {
        let premise = fallback_premise("Ana");
        let text = r#"{"pages": [{"text": "a"}, {"text": "b"}]}"#;

        let narrative = parse_narrative(text, &premise).unwrap();
        assert_eq!(narrative.pages[0].number, 1);
        assert_eq!(narrative.pages[1].number, 2);
        assert_eq!(narrative.pages[1].scene_id, 1);
    }

    #[test]
    fn fallback_narrative_has_requested_pages_and_valid_refs() {
        let premise = fallback_premise("Ana");
        let narrative = fallback_narrative(&premise, 12);
        assert_eq!(narrative.pages.len(), 12);
        assert!(narrative.references_valid());
    }
}
