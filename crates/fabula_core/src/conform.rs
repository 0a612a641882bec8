//! Shape repair for narratives returned by the text model.
//!
//! The text model is asked for exactly N pages and at most three entries per
//! cast list, but its output is never trusted verbatim. This pass makes the
//! narrative safe for the rest of the pipeline:
//!
//! - cast lists are capped at [`crate::MAX_CAST_ENTRIES`] and renumbered 1..k
//! - page references are remapped through the renumbering; references to
//!   dropped entries are removed, and a missing or unknown scene id falls
//!   back to the first scene
//! - the page list is truncated or padded with synthetic pages until its
//!   length is exactly the requested count, and page numbers are rewritten
//!   to 1..N

use crate::{Character, Narrative, Page, Premise, Scene, MAX_CAST_ENTRIES};
use std::collections::HashMap;

/// Cap a list at `MAX_CAST_ENTRIES`, renumber ids 1..k, and return the
/// old-id → new-id mapping.
fn renumber<T>(entries: &mut Vec<T>, id_of: impl Fn(&T) -> u32, set_id: impl Fn(&mut T, u32)) -> HashMap<u32, u32> {
    entries.truncate(MAX_CAST_ENTRIES);
    let mut mapping = HashMap::new();
    for (index, entry) in entries.iter_mut().enumerate() {
        let new_id = index as u32 + 1;
        mapping.insert(id_of(entry), new_id);
        set_id(entry, new_id);
    }
    mapping
}

/// Conform a narrative to the requested page count and repair id references.
///
/// Returns the number of synthetic pages that were appended, which the
/// caller may want to log.
///
/// # Examples
///
/// ```
/// use fabula_core::{conform_narrative, Narrative, Premise, Protagonist};
///
/// # fn narrative_with_pages(n: usize) -> Narrative { fabula_core::test_support::narrative(n) }
/// let premise = Premise {
///     title: "T".into(), theme: "adventure".into(), summary: "S".into(),
///     world_description: "W".into(),
///     protagonist: Protagonist::new("Mira".into(), "curly hair".into()),
/// };
/// let mut narrative = narrative_with_pages(10);
/// conform_narrative(&mut narrative, &premise, 12);
/// assert_eq!(narrative.pages.len(), 12);
/// assert!(narrative.references_valid());
/// ```
pub fn conform_narrative(narrative: &mut Narrative, premise: &Premise, page_count: u8) -> usize {
    // The protagonist and at least one scene must exist even if the model
    // dropped them.
    if narrative.characters.is_empty() {
        narrative.characters.push(Character::new(
            1,
            premise.protagonist.name.clone(),
            premise.protagonist.appearance.clone(),
        ));
    }
    if narrative.scenes.is_empty() {
        narrative.scenes.push(Scene::new(
            1,
            "Main setting".to_string(),
            premise.world_description.clone(),
        ));
    }

    let character_map = renumber(&mut narrative.characters, |c| c.id, |c, id| c.id = id);
    let object_map = renumber(&mut narrative.objects, |o| o.id, |o, id| o.id = id);
    let scene_map = renumber(&mut narrative.scenes, |s| s.id, |s, id| s.id = id);

    let first_scene = narrative.scenes[0].id;

    for page in &mut narrative.pages {
        page.character_ids = page
            .character_ids
            .iter()
            .filter_map(|id| character_map.get(id).copied())
            .collect();
        page.object_ids = page
            .object_ids
            .iter()
            .filter_map(|id| object_map.get(id).copied())
            .collect();
        page.scene_id = scene_map.get(&page.scene_id).copied().unwrap_or(first_scene);
    }

    let requested = usize::from(page_count);
    narrative.pages.truncate(requested);

    let mut padded = 0;
    while narrative.pages.len() < requested {
        narrative.pages.push(Page {
            number: narrative.pages.len() as u32 + 1,
            text: format!("{} continued the adventure.", premise.protagonist.name),
            scene_description: format!(
                "{} in an exciting scene from the story",
                premise.protagonist.name
            ),
            character_ids: vec![1],
            object_ids: vec![],
            scene_id: first_scene,
        });
        padded += 1;
    }

    for (index, page) in narrative.pages.iter_mut().enumerate() {
        page.number = index as u32 + 1;
    }

    padded
}

/// Helpers for doctests and downstream crate tests.
#[doc(hidden)]
pub mod test_support {
    use crate::{Character, Narrative, Page, Scene, StoryObject};

    /// Build a plausible unconformed narrative with `n` pages.
    pub fn narrative(n: usize) -> Narrative {
        Narrative {
            title: "The Starlight Voyage".to_string(),
            theme: "adventure".to_string(),
            summary: "A journey across a sky full of islands".to_string(),
            lesson: "Courage and friendship".to_string(),
            characters: vec![
                Character::new(1, "Mira".to_string(), "curly red hair".to_string()),
                Character::new(2, "Pip".to_string(), "a small blue bird".to_string()),
            ],
            objects: vec![StoryObject::new(
                1,
                "Compass".to_string(),
                "a brass compass with a glowing needle".to_string(),
            )],
            scenes: vec![
                Scene::new(1, "Sky harbor".to_string(), "docks among the clouds".to_string()),
                Scene::new(2, "Violet sea".to_string(), "waves under two moons".to_string()),
            ],
            pages: (1..=n)
                .map(|i| Page {
                    number: i as u32,
                    text: format!("Page {} text", i),
                    scene_description: format!("Page {} scene", i),
                    character_ids: vec![1],
                    object_ids: vec![1],
                    scene_id: 1,
                })
                .collect(),
        }
    }
}
