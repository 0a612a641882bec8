//! Structured story types: the minimal premise and the full narrative.

use serde::{Deserialize, Serialize};

/// The protagonist extracted from the reference photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_new::new)]
pub struct Protagonist {
    /// Child's name
    pub name: String,
    /// Detailed physical description used to anchor visual consistency
    pub appearance: String,
}

/// Minimal story seed produced for the fast preview.
///
/// Contains just enough to generate a cover: no pages, no secondary cast.
///
/// # Examples
///
/// ```
/// use fabula_core::{Premise, Protagonist};
///
/// let premise = Premise {
///     title: "The Starlight Voyage".to_string(),
///     theme: "adventure".to_string(),
///     summary: "A journey across a sky full of islands".to_string(),
///     world_description: "Floating islands above a violet sea".to_string(),
///     protagonist: Protagonist::new("Mira".to_string(), "curly red hair".to_string()),
/// };
/// assert_eq!(premise.protagonist.name, "Mira");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Premise {
    /// Book title
    pub title: String,
    /// Overall theme (adventure, fantasy, friendship, ...)
    pub theme: String,
    /// Two-to-three line summary of the story
    pub summary: String,
    /// Description of the world the story takes place in
    pub world_description: String,
    /// The child as story protagonist
    pub protagonist: Protagonist,
}

/// A named character with a small positive integer id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_new::new)]
pub struct Character {
    /// Identifier cited on reference sheets and page prompts (renumbered 1..k)
    pub id: u32,
    /// Character name
    pub name: String,
    /// Complete physical description
    pub description: String,
}

/// A named story object with a small positive integer id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_new::new)]
pub struct StoryObject {
    /// Identifier cited on reference sheets and page prompts (renumbered 1..k)
    pub id: u32,
    /// Object name
    pub name: String,
    /// Shape, color, size, texture
    pub description: String,
}

/// A named scene with a small positive integer id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_new::new)]
pub struct Scene {
    /// Identifier cited on the scene sheet and page prompts (renumbered 1..k)
    pub id: u32,
    /// Scene name
    pub name: String,
    /// Environment, dominant colors, atmosphere
    pub description: String,
}

/// One page of the narrative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Page number, 1-based
    pub number: u32,
    /// Narrative text rendered in the overlay band
    pub text: String,
    /// Detailed visual description of what to illustrate
    pub scene_description: String,
    /// Characters appearing on this page, by sheet id
    #[serde(default)]
    pub character_ids: Vec<u32>,
    /// Objects appearing on this page, by sheet id
    #[serde(default)]
    pub object_ids: Vec<u32>,
    /// Scene this page takes place in, by sheet id
    pub scene_id: u32,
}

/// The full structured story produced by narrative expansion.
///
/// Pages reference entries in the character/object/scene lists by id. Those
/// references are only trustworthy after [`crate::conform_narrative`] has
/// renumbered the lists and repaired the citations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Narrative {
    /// Book title (carried over from the premise)
    pub title: String,
    /// Overall theme
    pub theme: String,
    /// Story summary, rendered on the back cover
    pub summary: String,
    /// What the child will learn
    #[serde(default)]
    pub lesson: String,
    /// Up to three named characters, protagonist first
    pub characters: Vec<Character>,
    /// Up to three important objects
    #[serde(default)]
    pub objects: Vec<StoryObject>,
    /// Up to three scenes
    pub scenes: Vec<Scene>,
    /// Exactly the requested number of pages after conforming
    pub pages: Vec<Page>,
}

impl Narrative {
    /// Check that every id referenced by a page exists in the corresponding list.
    pub fn references_valid(&self) -> bool {
        let has_character = |id: u32| self.characters.iter().any(|c| c.id == id);
        let has_object = |id: u32| self.objects.iter().any(|o| o.id == id);
        let has_scene = |id: u32| self.scenes.iter().any(|s| s.id == id);

        self.pages.iter().all(|page| {
            page.character_ids.iter().copied().all(has_character)
                && page.object_ids.iter().copied().all(has_object)
                && has_scene(page.scene_id)
        })
    }
}
