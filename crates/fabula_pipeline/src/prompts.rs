//! Image prompt construction.
//!
//! Visual consistency rests on one contract: the reference sheets show
//! each character, object, and scene with its numeric id printed beneath
//! it, and every page prompt cites those same ids. Sheet prompts and page
//! prompts are built here, together, so the contract lives in one place.

use fabula_core::{Narrative, Page, Premise};

/// Prompt for the illustrated cover, anchored on the reference photo.
pub fn cover_prompt(premise: &Premise, age: u8) -> String {
    format!(
        r#"Create a professional, magical CHILDREN'S BOOK COVER.

PHOTO REFERENCE:
- Attached photo of the protagonist

ARTISTIC TRANSFORMATION:
- Turn the child in the photo into an ILLUSTRATED CHARACTER in a modern children's book style
- Keep their identifiable unique features: {appearance}
- Style: colorful, expressive illustration (NOT photorealistic, NOT an edited photo)

STORY:
- Title: "{title}"
- Theme: {theme}
- World: {world}
- Reader age: {age} years old

COMPOSITION:
- The ILLUSTRATED protagonist in the foreground in a dynamic, expressive pose
- A fantastic world consistent with "{theme}" in the background
- Vibrant, saturated, appealing colors
- The title "{title}" integrated artistically into the composition
- A magical atmosphere that invites adventure

CRITICAL:
- The character must be a COMPLETE ILLUSTRATION based on the photo, not an edited or filtered photo
- It must look like it came from a professional storybook
- The child must be CLEARLY recognizable but fully transformed into children's art"#,
        appearance = premise.protagonist.appearance,
        title = premise.title,
        theme = premise.theme,
        world = premise.world_description,
        age = age,
    )
}

/// Prompt for the character/object reference sheet.
///
/// Entry 1 is anchored on the attached cover; every entry carries its id
/// so page prompts can cite it.
pub fn character_sheet_prompt(narrative: &Narrative) -> String {
    let mut entries = Vec::new();

    for character in &narrative.characters {
        if character.id == 1 {
            entries.push(format!(
                "ID {}: {} - {} (BASED FAITHFULLY ON THE ATTACHED COVER IMAGE)",
                character.id, character.name, character.description
            ));
        } else {
            entries.push(format!(
                "ID {}: {} - {}",
                character.id, character.name, character.description
            ));
        }
    }

    for object in &narrative.objects {
        entries.push(format!(
            "ID {}: {} - {}",
            object.id, object.name, object.description
        ));
    }

    format!(
        r#"Create a professional MODEL SHEET / CHARACTER REFERENCE SHEET.

ELEMENTS:
{entries}

FORMAT:
- Clean white background
- Each element clearly separated horizontally
- Each element has its ID NUMBER visible BELOW it (large and clear)
- Consistent, colorful children's illustration style
- Clear view of every character and object

CRITICAL:
- ID 1 (the protagonist) must be based FAITHFULLY on the attached cover
- The other elements are generated from their descriptions
- Every number must be CLEARLY visible below its element"#,
        entries = entries.join("\n"),
    )
}

/// Prompt for the scene reference sheet.
pub fn scene_sheet_prompt(narrative: &Narrative) -> String {
    let entries: Vec<String> = narrative
        .scenes
        .iter()
        .map(|scene| format!("ID {}: {} - {}", scene.id, scene.name, scene.description))
        .collect();

    format!(
        r#"Create a SCENE REFERENCE SHEET / BACKGROUND REFERENCE for a children's book.

SCENES:
{entries}

FORMAT:
- Each scene in a clearly divided panel
- Each scene has its ID NUMBER visible BELOW it (large and clear)
- Consistent, colorful children's illustration style
- Clear view of every environment
- Backgrounds and environments only, no characters"#,
        entries = entries.join("\n"),
    )
}

/// Prompt for a single page illustration, citing sheet ids.
pub fn page_prompt(page: &Page) -> String {
    let join = |ids: &[u32]| {
        ids.iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    };

    let characters = if page.character_ids.is_empty() {
        String::new()
    } else {
        format!(
            "Characters (use sheet IDs): {}. ",
            join(&page.character_ids)
        )
    };
    let objects = if page.object_ids.is_empty() {
        String::new()
    } else {
        format!("Objects (use sheet IDs): {}. ", join(&page.object_ids))
    };
    let scene = format!("Scene (use sheet ID): {}. ", page.scene_id);

    format!(
        r#"REFERENCES:
- First image: character sheet with numbered elements
- Second image: scene sheet with numbered environments

GENERATE A COMPLETELY NEW SCENE:

Scene: {description}
{characters}{objects}{scene}

IMPORTANT:
- The attached images are ONLY REFERENCES for existing elements
- Use the elements with the SPECIFIED IDs from the sheets
- CREATE a new illustration based on the references
- Keep the visual style consistent with the sheets
- Colorful children's style
- Leave the bottom 25% in soft colors (text goes there later)
- NO text in the image
- The IDs are the NUMBERS printed below each element on the sheets"#,
        description = if page.scene_description.is_empty() {
            &page.text
        } else {
            &page.scene_description
        },
        characters = characters,
        objects = objects,
        scene = scene,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabula_core::{test_support, Protagonist};

    #[test]
    fn sheet_and_page_prompts_cite_the_same_ids() {
        let narrative = test_support::narrative(3);
        let sheet = character_sheet_prompt(&narrative);
        let scenes = scene_sheet_prompt(&narrative);

        for character in &narrative.characters {
            assert!(sheet.contains(&format!("ID {}:", character.id)));
        }
        for scene in &narrative.scenes {
            assert!(scenes.contains(&format!("ID {}:", scene.id)));
        }

        for page in &narrative.pages {
            let prompt = page_prompt(page);
            assert!(prompt.contains(&format!("Scene (use sheet ID): {}", page.scene_id)));
            for id in &page.character_ids {
                assert!(prompt.contains(&id.to_string()));
            }
        }
    }

    #[test]
    fn protagonist_entry_is_anchored_on_the_cover() {
        let narrative = test_support::narrative(1);
        let sheet = character_sheet_prompt(&narrative);
        assert!(sheet.contains("ATTACHED COVER IMAGE"));
    }

    #[test]
    fn cover_prompt_carries_title_and_appearance() {
        let premise = fabula_core::Premise {
            title: "The Starlight Voyage".to_string(),
            theme: "adventure".to_string(),
            summary: "A sky journey".to_string(),
            world_description: "Floating islands".to_string(),
            protagonist: Protagonist::new("Mira".to_string(), "curly red hair".to_string()),
        };
        let prompt = cover_prompt(&premise, 6);
        assert!(prompt.contains("The Starlight Voyage"));
        assert!(prompt.contains("curly red hair"));
        assert!(prompt.contains("6 years old"));
    }

    #[test]
    fn page_prompt_falls_back_to_page_text() {
        let narrative = test_support::narrative(1);
        let mut page = narrative.pages[0].clone();
        page.scene_description = String::new();
        page.text = "The fox ran home.".to_string();
        assert!(page_prompt(&page).contains("The fox ran home."));
    }
}
